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

//! # General socket-logger Documentation
//!
//! ## Introduction
//!
//! General (i.e. not documenting a particular struct or a method) documentation goes here.
//!
//! ## From a log call to bytes on the wire
//!
//! 1. [`SocketLogger::log`] wraps its arguments up as a [`LogRecord`] & sends it down an unbounded
//!    channel to the logger's worker thread. That's all the caller ever waits for.
//! 2. The worker renders the record as a single line of RFC [5424] syslog (a
//!    [`FormattedMessage`]) & appends it to the outbound queue. Records with empty messages are
//!    dropped here.
//! 3. If there's no connection, the worker starts one. Connecting (and the TLS handshake, if
//!    configured) happens on a separate "link" thread, which reports back when it's done.
//! 4. Once connected, the worker hands the message at the head of the queue to the link thread &
//!    waits. When the link reports the write complete, the worker removes that message & hands
//!    over the next.
//!
//! [`SocketLogger::log`]: crate::logger::SocketLogger::log
//! [`LogRecord`]: crate::record::LogRecord
//! [5424]: https://datatracker.ietf.org/doc/html/rfc5424
//! [`FormattedMessage`]: crate::formatter::FormattedMessage
//!
//! All of the logger's state (the queue, the connection state) lives on the worker thread, and
//! everything that changes it arrives there as a message, so no locks are involved & the order of
//! events is unambiguous.
//!
//! ## On the wire
//!
//! ```text
//! <PRI>1 TIMESTAMP HOSTNAME APP-NAME PROCID MSGID SD MSG\n
//! ```
//!
//! `PRI` is severity plus eight times facility. `TIMESTAMP` has six fractional digits & is
//! rendered in the configured time zone; UTC is written `Z`, any other offset numerically. Absent fields are `-`. Structured data is `-`,
//! unless a token is configured, in which case it's
//!
//! ```text
//! [TOKEN tag="HOSTNAME" tag="APP-NAME" tag="extra" ...]
//! ```
//!
//! which is the shape Loggly expects. Line breaks inside a message become spaces, since a newline
//! ends the frame.
//!
//! ## Delivery guarantees
//!
//! Writes are acknowledged when the bytes have been handed to the operating system, not when the
//! collector has them; TCP offers nothing better without an application-level protocol, which
//! syslog doesn't have. Within that limit:
//!
//! - messages go out in the order they were logged (per logger);
//! - at most one write is outstanding at any time;
//! - if the connection fails while a message is being written, that message is dropped under
//!   [`Delivery::AtMostOnce`] (the default) or re-sent after reconnecting under
//!   [`Delivery::AtLeastOnce`] (in which case the collector may see it twice);
//! - messages queued but not yet written survive a disconnect & go out on the next connection;
//! - nothing survives the process.
//!
//! [`Delivery::AtMostOnce`]: crate::config::Delivery::AtMostOnce
//! [`Delivery::AtLeastOnce`]: crate::config::Delivery::AtLeastOnce
//!
//! ## Reconnecting
//!
//! There is no timer. After a failure the logger stays disconnected until there's a reason to
//! connect: a new message, a [`flush`], or shutdown with messages still queued. An application
//! that stops logging doesn't spin on an unreachable collector.
//!
//! [`flush`]: crate::logger::SocketLogger::flush
//!
//! ## Back-pressure
//!
//! There isn't any. The outbound queue is bounded (8192 messages by default); once full, the
//! [`OverflowPolicy`] decides whether the oldest queued message or the new one is dropped. Drops
//! are reported through `tracing`, at most once every few seconds. Setting the capacity to `None`
//! makes the queue unbounded.
//!
//! [`OverflowPolicy`]: crate::config::OverflowPolicy
//!
//! ## Shutting down
//!
//! Dropping (or [`close`]-ing) a [`SocketLogger`] stops it taking records, then gives the worker
//! the configured shutdown timeout (two seconds by default) to deliver what's queued over the
//! current connection. If that doesn't pan out, the worker is abandoned & whatever's left is lost.
//!
//! [`close`]: crate::logger::SocketLogger::close
//! [`SocketLogger`]: crate::logger::SocketLogger
//!
//! ## The crate's own diagnostics
//!
//! The logger reports its own troubles (connection failures, dropped messages) through
//! [`tracing`]. The [`Layer`] ignores events originating in this crate, so installing it doesn't
//! set up a feedback loop.
//!
//! [`tracing`]: https://docs.rs/tracing/latest/tracing/index.html
//! [`Layer`]: crate::layer::Layer
