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

//! A client-side [`syslog`] forwarder: RFC [5424] messages over a persistent TCP (by default,
//! TLS) connection to a remote log collector such as [Papertrail] or [Loggly].
//!
//! [`syslog`]: https://en.wikipedia.org/wiki/Syslog
//! [5424]: https://datatracker.ietf.org/doc/html/rfc5424
//! [Papertrail]: https://www.papertrail.com/
//! [Loggly]: https://www.loggly.com/
//!
//! # Introduction
//!
//! Hosted log collectors take syslog over TCP, usually wrapped in TLS. Writing to such a thing
//! from an application means dealing with a connection that may not be up yet when the first
//! message is logged, that may be dropped at any time by the far end, and whose writes may take
//! arbitrarily long; none of which should ever be the application's problem.
//!
//! [`SocketLogger`] handles that. Logging a message hands it to a worker thread & returns; the
//! worker formats it, queues it, connects if need be, and writes queued messages one at a time,
//! in order, each only once the previous write has completed. If the connection fails the worker
//! simply waits: the next message logged (or the next flush) triggers a reconnect.
//!
//! [`SocketLogger`]: crate::logger::SocketLogger
//!
//! # Usage
//!
//! ```no_run
//! use socket_logger::{
//!     config::TimeZone, facility::Severity, logger::SocketLogger, record::LogDetails,
//! };
//! use std::time::Duration;
//!
//! let logger = SocketLogger::rsyslog().time_zone(TimeZone::Utc).build().unwrap();
//! logger.log(
//!     LogDetails::builder()
//!         .severity(Severity::LOG_INFO)
//!         .hostname_as_string("mymachine0.example.com")
//!         .unwrap()
//!         .appname_as_string("MyApp")
//!         .unwrap()
//!         .build(),
//!     "This is message 1",
//! );
//! logger.flush(Duration::from_secs(1));
//! ```
//!
//! will send something like
//!
//! ```text
//! <14>1 2025-06-23T23:10:55.237469Z mymachine0.example.com MyApp - - - This is message 1
//! ```
//!
//! to an rsyslogd listening on TCP port 514 of the local host.
//!
//! With the `layer` feature (on by default), [`Layer`] will forward [`tracing`] events to a
//! logger:
//!
//! [`Layer`]: crate::layer::Layer
//! [`tracing`]: https://docs.rs/tracing/latest/tracing/index.html
//!
//! ```no_run
//! use socket_logger::{layer::Layer, logger::SocketLogger};
//! use tracing::info;
//! use tracing_subscriber::layer::SubscriberExt; // Needed to get `with()`
//! use tracing_subscriber::registry::Registry;
//!
//! let logger = SocketLogger::loggly("my-customer-token").build().unwrap();
//! let subscriber = Registry::default().with(Layer::new(logger.handle()));
//! tracing::subscriber::set_global_default(subscriber).unwrap();
//! info!("Hello, Loggly.");
//! ```
//!
//! See [`_docs`] for how delivery works & what it does and doesn't guarantee.

pub mod _docs;
pub mod config;
pub mod error;
pub mod facility;
pub mod formatter;
#[cfg(feature = "layer")]
pub mod layer;
pub mod logger;
pub mod record;
pub mod rfc5424;
pub mod transport;

mod connection;
mod queue;
#[cfg(test)]
mod testing;
mod worker;

pub use error::{Error, Result};
pub use logger::{Handle, SocketLogger, SocketLoggerBuilder};
