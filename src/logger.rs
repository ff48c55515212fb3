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

//! The logger facade.
//!
//! # Introduction
//!
//! [`SocketLogger`] is the public entry point: build one per collector, then call
//! [`log`](SocketLogger::log) from wherever you like. Logging never blocks & never fails; the
//! record is handed to the logger's worker thread, which formats it, queues it & delivers it over
//! a persistent TCP (by default, TLS) connection.
//!
//! ```rust,no_run
//! use socket_logger::{facility::Severity, logger::SocketLogger, record::LogDetails};
//! let logger = SocketLogger::loggly("my-customer-token").build().unwrap();
//! logger.log(
//!     LogDetails::builder()
//!         .severity(Severity::LOG_NOTICE)
//!         .hostname_as_string("mymachine.example.com")
//!         .unwrap()
//!         .appname_as_string("MyApp")
//!         .unwrap()
//!         .build(),
//!     "Hello, Loggly.",
//! );
//! ```
//!
//! # Ownership
//!
//! The [`SocketLogger`] owns the worker thread; dropping it (or calling
//! [`close`](SocketLogger::close)) stops taking records, gives the worker up to the configured
//! shutdown timeout to deliver what's queued, & shuts the connection. Adapters that need a
//! reference to the logger they can stash away (a [`Layer`](crate::layer::Layer), say) take a
//! [`Handle`]: cheap to clone, `Send + Sync`, and inert once the owner has gone.

use crate::{
    config::{Delivery, Endpoint, LoggerConfig, OverflowPolicy, TimeZone},
    error::Result,
    record::{LogDetails, LogRecord},
    transport::{Connector, TcpConnector},
    worker::{self, Command},
};

use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use tracing::{debug, warn};

use std::{sync::Arc, thread::JoinHandle, time::Duration};

pub const PAPERTRAIL_HOST: &str = "logs.papertrailapp.com";
pub const PAPERTRAIL_PORT: u16 = 46865;
pub const LOGGLY_HOST: &str = "logs-01.loggly.com";
pub const LOGGLY_PORT: u16 = 6514;
/// Loggly's private enterprise number, appended to customer tokens in the SD-ID.
pub const LOGGLY_PEN: u32 = 41058;
pub const RSYSLOG_HOST: &str = "localhost";
pub const RSYSLOG_PORT: u16 = 514;

/// A non-owning reference to a [`SocketLogger`].
#[derive(Clone, Debug)]
pub struct Handle {
    commands: Sender<Command>,
}

impl Handle {
    /// Queue `message` for delivery; returns immediately. Silently does nothing once the logger
    /// has been closed.
    pub fn log<S: Into<String>>(&self, details: LogDetails, message: S) {
        self.log_record(LogRecord::new(details, message));
    }

    pub fn log_record(&self, record: LogRecord) {
        let _ = self.commands.send(Command::Record(record));
    }

    /// Wait up to `timeout` for everything logged so far to be written; connects if need be.
    /// Returns false on timeout, on a connection failure, or if the logger's been closed.
    pub fn flush(&self, timeout: Duration) -> bool {
        let (tx, rx) = bounded(1);
        if self.commands.send(Command::Flush(tx)).is_err() {
            return false;
        }
        rx.recv_timeout(timeout).unwrap_or(false)
    }
}

/// A logger delivering RFC 5424 syslog to one remote collector.
pub struct SocketLogger {
    endpoint: Endpoint,
    handle: Handle,
    worker: Option<JoinHandle<()>>,
    shutdown_timeout: Duration,
}

impl SocketLogger {
    /// Start building a logger for the collector at `host:port`.
    pub fn builder<S: Into<String>>(host: S, port: u16) -> SocketLoggerBuilder {
        SocketLoggerBuilder::from(LoggerConfig::new(Endpoint::new(host, port)))
    }

    /// Papertrail, over TLS.
    pub fn papertrail() -> SocketLoggerBuilder {
        SocketLogger::builder(PAPERTRAIL_HOST, PAPERTRAIL_PORT)
    }

    /// Loggly, over TLS, identifying ourselves with customer token `token`.
    pub fn loggly<S: AsRef<str>>(token: S) -> SocketLoggerBuilder {
        SocketLogger::builder(LOGGLY_HOST, LOGGLY_PORT)
            .token(format!("{}@{}", token.as_ref(), LOGGLY_PEN))
    }

    /// An rsyslogd on this host, in the clear.
    pub fn rsyslog() -> SocketLoggerBuilder {
        SocketLogger::builder(RSYSLOG_HOST, RSYSLOG_PORT).tls(false)
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn handle(&self) -> Handle {
        self.handle.clone()
    }

    /// Queue `message` for delivery; returns immediately.
    pub fn log<S: Into<String>>(&self, details: LogDetails, message: S) {
        self.handle.log(details, message)
    }

    pub fn log_record(&self, record: LogRecord) {
        self.handle.log_record(record)
    }

    /// Wait up to `timeout` for everything logged so far to be written.
    pub fn flush(&self, timeout: Duration) -> bool {
        self.handle.flush(timeout)
    }

    /// Deliver what we can within the shutdown timeout, then disconnect.
    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let worker = match self.worker.take() {
            Some(worker) => worker,
            None => return,
        };
        let (tx, rx) = bounded(1);
        if self.handle.commands.send(Command::Shutdown(tx)).is_err() {
            let _ = worker.join();
            return;
        }
        match rx.recv_timeout(self.shutdown_timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if worker.join().is_err() {
                    warn!(peer = %self.endpoint, "worker thread panicked");
                }
                debug!(peer = %self.endpoint, "logger closed");
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!(peer = %self.endpoint, timeout = ?self.shutdown_timeout,
                      "worker didn't finish in time; abandoning it");
            }
        }
    }
}

impl Drop for SocketLogger {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Configures & builds a [`SocketLogger`].
pub struct SocketLoggerBuilder {
    config: LoggerConfig,
    connector: Option<Arc<dyn Connector>>,
}

impl std::convert::From<LoggerConfig> for SocketLoggerBuilder {
    fn from(config: LoggerConfig) -> Self {
        SocketLoggerBuilder {
            config,
            connector: None,
        }
    }
}

impl SocketLoggerBuilder {
    /// Speak TLS (the default) or plain TCP.
    pub fn tls(mut self, tls: bool) -> Self {
        self.config.endpoint.tls = tls;
        self
    }
    pub fn token<S: Into<String>>(mut self, token: S) -> Self {
        self.config.endpoint.token = Some(token.into());
        self
    }
    pub fn time_zone(mut self, time_zone: TimeZone) -> Self {
        self.config.endpoint.time_zone = time_zone;
        self
    }
    pub fn with_bom(mut self, with_bom: bool) -> Self {
        self.config.with_bom = with_bom;
        self
    }
    /// `None` for an unbounded queue.
    pub fn queue_capacity(mut self, capacity: Option<usize>) -> Self {
        self.config.queue_capacity = capacity;
        self
    }
    pub fn overflow_policy(mut self, overflow: OverflowPolicy) -> Self {
        self.config.overflow = overflow;
        self
    }
    pub fn delivery(mut self, delivery: Delivery) -> Self {
        self.config.delivery = delivery;
        self
    }
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }
    pub fn write_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.write_timeout = timeout;
        self
    }
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.config.shutdown_timeout = timeout;
        self
    }
    /// Connect through `connector` rather than the TCP/TLS default.
    pub fn connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = Some(connector);
        self
    }
    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }
    /// Validate the configuration & start the worker thread. Doesn't connect; that happens when
    /// the first record arrives.
    pub fn build(self) -> Result<SocketLogger> {
        self.config.validate()?;
        let connector = match self.connector {
            Some(connector) => connector,
            None => Arc::new(TcpConnector::new(&self.config)),
        };
        let (commands, worker) = worker::spawn(&self.config, connector)?;
        debug!(peer = %self.config.endpoint, tls = self.config.endpoint.tls, "logger started");
        Ok(SocketLogger {
            endpoint: self.config.endpoint,
            handle: Handle { commands },
            worker: Some(worker),
            shutdown_timeout: self.config.shutdown_timeout,
        })
    }
}
