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

//! Logger configuration.
//!
//! [`SocketLoggerBuilder`](crate::logger::SocketLoggerBuilder) assembles a [`LoggerConfig`] and
//! hands it to the worker thread; nothing in here changes after that.

use crate::error::{Error, Result};

use backtrace::Backtrace;
use chrono::FixedOffset;

use std::time::Duration;

/// Default capacity of the outbound queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 8192;
/// Default bound on establishing a connection (TCP connect plus TLS handshake).
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Default time [`SocketLogger::close`] waits for the queue to drain.
///
/// [`SocketLogger::close`]: crate::logger::SocketLogger::close
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

/// The time zone in which timestamps are rendered.
///
/// Collectors differ in what they expect; some want UTC, some want the sender's local time. The
/// offset is always written out numerically, so any choice is unambiguous on the wire.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum TimeZone {
    /// The system's local time zone
    #[default]
    Local,
    /// UTC, rendered with the `Z` designator
    Utc,
    /// A fixed offset from UTC
    Fixed(FixedOffset),
}

/// What becomes of a message whose write was under way when the connection failed.
///
/// The transport can't tell us whether such a message reached the collector.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Delivery {
    /// Drop it; the next connection resumes with the following message. A message is never
    /// sent twice, but may be lost.
    #[default]
    AtMostOnce,
    /// Keep it at the head of the queue and send it again once reconnected. A message is never
    /// lost while the logger lives, but the collector may see it twice.
    AtLeastOnce,
}

/// Which message to give up on when a bounded outbound queue is full.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Evict the oldest message that isn't currently being written.
    #[default]
    DropOldest,
    /// Discard the incoming message.
    DropNewest,
}

/// Where to send messages, and how to dress them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
    /// Upgrade to TLS immediately after connecting
    pub tls: bool,
    /// Credential placed at the front of the structured data
    pub token: Option<String>,
    pub time_zone: TimeZone,
}

impl Endpoint {
    /// An endpoint at `host:port` speaking TLS, with no token, rendering local time.
    pub fn new<S: Into<String>>(host: S, port: u16) -> Endpoint {
        Endpoint {
            host: host.into(),
            port,
            tls: true,
            token: None,
            time_zone: TimeZone::default(),
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Everything the worker thread needs to know.
#[derive(Clone, Debug)]
pub struct LoggerConfig {
    pub endpoint: Endpoint,
    /// Prefix each MSG with the UTF-8 byte order mark
    pub with_bom: bool,
    /// `None` leaves the queue unbounded
    pub queue_capacity: Option<usize>,
    pub overflow: OverflowPolicy,
    pub delivery: Delivery,
    pub connect_timeout: Duration,
    /// `None` lets a write block indefinitely
    pub write_timeout: Option<Duration>,
    pub shutdown_timeout: Duration,
}

impl LoggerConfig {
    pub fn new(endpoint: Endpoint) -> LoggerConfig {
        LoggerConfig {
            endpoint,
            with_bom: false,
            queue_capacity: Some(DEFAULT_QUEUE_CAPACITY),
            overflow: OverflowPolicy::default(),
            delivery: Delivery::default(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            write_timeout: None,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }

    /// Reject configurations that can never deliver anything.
    pub fn validate(&self) -> Result<()> {
        let invalid = |what| {
            Err(Error::InvalidConfig {
                what,
                back: Backtrace::new(),
            })
        };
        if self.endpoint.host.is_empty() {
            return invalid("empty host");
        }
        if self.endpoint.port == 0 {
            return invalid("port zero");
        }
        if self.queue_capacity == Some(0) {
            return invalid("queue capacity zero");
        }
        if self.connect_timeout.is_zero() {
            return invalid("zero connect timeout");
        }
        if self.write_timeout.map_or(false, |t| t.is_zero()) {
            return invalid("zero write timeout");
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn validation() {
        assert!(LoggerConfig::new(Endpoint::new("localhost", 514))
            .validate()
            .is_ok());
        assert!(LoggerConfig::new(Endpoint::new("", 514)).validate().is_err());
        assert!(LoggerConfig::new(Endpoint::new("localhost", 0))
            .validate()
            .is_err());

        let mut cfg = LoggerConfig::new(Endpoint::new("localhost", 514));
        cfg.queue_capacity = Some(0);
        assert!(cfg.validate().is_err());
        cfg.queue_capacity = None;
        assert!(cfg.validate().is_ok());
        cfg.write_timeout = Some(Duration::ZERO);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn endpoint_display() {
        assert_eq!(
            format!("{}", Endpoint::new("logs-01.loggly.com", 6514)),
            "logs-01.loggly.com:6514"
        );
        assert_eq!(format!("{}", Endpoint::new("::1", 5514)), "[::1]:5514");
    }
}
