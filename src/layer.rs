// Copyright (C) 2022-2025 Michael Herstine <sp1ff@pobox.com>
//
// This file is part of socket-logger.
//
// socket-logger is free software: you can redistribute it and/or modify it under the terms of the
// GNU General Public License as published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// socket-logger is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without
// even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
// General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with socket-logger.  If
// not, see <http://www.gnu.org/licenses/>.

//! A [`tracing-subscriber`] [`Layer`] forwarding events to a [`SocketLogger`].
//!
//! [`tracing-subscriber`]: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/index.html
//! [`Layer`]: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/layer/trait.Layer.html
//! [`SocketLogger`]: crate::logger::SocketLogger
//!
//! ```rust,no_run
//! use socket_logger::{layer::Layer, logger::SocketLogger};
//! use tracing::info;
//! use tracing_subscriber::layer::SubscriberExt; // Needed to get `with()`
//! use tracing_subscriber::registry::Registry;
//!
//! let logger = SocketLogger::papertrail().build().unwrap();
//! let subscriber = Registry::default().with(Layer::new(logger.handle()));
//! let _guard = tracing::subscriber::set_default(subscriber);
//! info!("Hello, Papertrail.");
//! ```
//!
//! Only the event's `message` field is sent; other fields, and spans, are ignored. Events whose
//! target lies in this crate are dropped, so the logger's own diagnostics can't loop back into
//! it.

use crate::{
    facility::{Facility, Severity},
    logger::Handle,
    record::LogDetails,
    rfc5424::{AppName, Hostname, ProcId},
};

use tracing::Event;
use tracing_subscriber::layer::Context;

/// Our own events carry targets beginning with this.
const OWN_TARGET: &str = "socket_logger";

fn default_level_mapping(level: &tracing::Level) -> Severity {
    match *level {
        tracing::Level::TRACE | tracing::Level::DEBUG => Severity::LOG_DEBUG,
        tracing::Level::INFO => Severity::LOG_INFO,
        tracing::Level::WARN => Severity::LOG_WARNING,
        tracing::Level::ERROR => Severity::LOG_ERR,
    }
}

struct MessageEventVisitor {
    message: Option<String>,
}

impl tracing::field::Visit for MessageEventVisitor {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        }
    }
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            // The tracing macros pre-format `message` as `std::fmt::Arguments`, whose `Debug`
            // output carries no quotes.
            self.message = Some(format!("{:?}", value));
        }
    }
}

/// Forwards `tracing` events to a [`SocketLogger`](crate::logger::SocketLogger) through its
/// [`Handle`].
pub struct Layer {
    handle: Handle,
    facility: Facility,
    hostname: Hostname,
    appname: AppName,
    procid: Option<ProcId>,
    headers: Vec<String>,
    map_level: Box<dyn Fn(&tracing::Level) -> Severity + Send + Sync>,
}

impl Layer {
    /// A layer sending to `handle`, with hostname, application name & process id discovered
    /// from the environment.
    pub fn new(handle: Handle) -> Layer {
        Layer {
            handle,
            facility: Facility::default(),
            hostname: Hostname::default(),
            appname: AppName::default(),
            procid: Some(ProcId::default()),
            headers: Vec::new(),
            map_level: Box::new(default_level_mapping),
        }
    }
    pub fn with_facility(mut self, facility: Facility) -> Self {
        self.facility = facility;
        self
    }
    pub fn with_hostname(mut self, hostname: Hostname) -> Self {
        self.hostname = hostname;
        self
    }
    pub fn with_appname(mut self, appname: AppName) -> Self {
        self.appname = appname;
        self
    }
    pub fn with_procid(mut self, procid: Option<ProcId>) -> Self {
        self.procid = procid;
        self
    }
    /// Extra tags for the structured data (only sent if the logger has a token).
    pub fn with_headers(mut self, headers: Vec<String>) -> Self {
        self.headers = headers;
        self
    }
    /// Replace the default mapping of `tracing` levels to syslog severities.
    pub fn with_level_mapping<F>(mut self, map_level: F) -> Self
    where
        F: Fn(&tracing::Level) -> Severity + Send + Sync + 'static,
    {
        self.map_level = Box::new(map_level);
        self
    }
}

impl<S> tracing_subscriber::layer::Layer<S> for Layer
where
    S: tracing_core::Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if meta.target().starts_with(OWN_TARGET) {
            return;
        }
        let mut visitor = MessageEventVisitor { message: None };
        event.record(&mut visitor);
        let message = match visitor.message {
            Some(message) => message,
            None => return,
        };
        self.handle.log(
            LogDetails::builder()
                .severity((self.map_level)(meta.level()))
                .facility(self.facility)
                .hostname(self.hostname.clone())
                .appname(self.appname.clone())
                .procid(self.procid.clone())
                .headers(self.headers.clone())
                .build(),
            message,
        );
    }
}

#[cfg(test)]
mod test {

    use super::*;

    use crate::{logger::SocketLogger, testing::FakeConnector};

    use tracing::{debug, error, info, trace, warn};
    use tracing_subscriber::{layer::SubscriberExt, registry::Registry};

    use std::{sync::Arc, time::Duration};

    fn logger(fake: &FakeConnector) -> SocketLogger {
        SocketLogger::builder("collector.example.com", 6514)
            .connector(Arc::new(fake.clone()))
            .build()
            .unwrap()
    }

    fn layer(logger: &SocketLogger) -> Layer {
        Layer::new(logger.handle())
            .with_hostname(Hostname::try_from("bree.local".to_string()).unwrap())
            .with_appname(AppName::try_from("layer-test".to_string()).unwrap())
            .with_procid(None)
    }

    #[test]
    fn levels() {
        let fake = FakeConnector::new();
        let logger = logger(&fake);
        let subscriber = Registry::default().with(layer(&logger));
        tracing::subscriber::with_default(subscriber, || {
            trace!(target: "myapp", "a trace");
            debug!(target: "myapp", "a debug");
            info!(target: "myapp", "an info {}", 11);
            warn!(target: "myapp", "a warning");
            error!(target: "myapp", "an error");
        });
        assert!(logger.flush(Duration::from_secs(5)));
        let sent = fake.sent();
        let prefixes: Vec<&str> = sent
            .iter()
            .map(|line| line.split_once(' ').unwrap().0)
            .collect();
        assert_eq!(prefixes, vec!["<15>1", "<15>1", "<14>1", "<12>1", "<11>1"]);
        assert!(sent[2].ends_with(" bree.local layer-test - - - an info 11"));
    }

    #[test]
    fn custom_mapping_and_facility() {
        let fake = FakeConnector::new();
        let logger = logger(&fake);
        let subscriber = Registry::default().with(
            layer(&logger)
                .with_facility(Facility::LOG_LOCAL0)
                .with_level_mapping(|_| Severity::LOG_NOTICE),
        );
        tracing::subscriber::with_default(subscriber, || {
            error!(target: "myapp", "Hello, world!");
        });
        assert!(logger.flush(Duration::from_secs(5)));
        assert!(fake.sent()[0].starts_with("<133>1 "));
    }

    #[test]
    fn own_events_ignored() {
        let fake = FakeConnector::new();
        let logger = logger(&fake);
        let subscriber = Registry::default().with(layer(&logger));
        tracing::subscriber::with_default(subscriber, || {
            warn!(target: "socket_logger::connection", "disconnected");
            info!(target: "myapp", answer = 42);
            info!(target: "myapp", "kept");
        });
        assert!(logger.flush(Duration::from_secs(5)));
        let sent = fake.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].ends_with(" kept"));
    }
}
