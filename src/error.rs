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

//! [socket-logger](crate) errors

use backtrace::Backtrace;

/// [socket-logger](crate) error type
///
/// [socket-logger](crate) eschews libraries like [thiserror], [anyhow] & [Snafu] in favor of a
/// straightforward enumeration with a few match arms chosen on the basis what the caller will need
/// to respond.
///
/// Note that none of these ever reach the caller of [`SocketLogger::log`]; delivery failures are
/// reported through [`tracing`] on the logger's worker thread. The caller only sees errors while
/// _building_ things: a logger, or the validated fields of a record.
///
/// [thiserror]: https://docs.rs/thiserror
/// [anyhow]: https://docs.rs/anyhow
/// [Snafu]: https://docs.rs/snafu/latest/snafu
/// [`SocketLogger::log`]: crate::logger::SocketLogger::log
/// [`tracing`]: https://docs.rs/tracing/latest/tracing/index.html
#[non_exhaustive]
pub enum Error {
    BadRfc5424AppName {
        name: Vec<u8>,
        back: Backtrace,
    },
    BadRfc5424Hostname {
        name: Vec<u8>,
        back: Backtrace,
    },
    BadRfc5424IpAddress,
    BadRfc5424MsgId {
        name: Vec<u8>,
        back: Backtrace,
    },
    BadRfc5424ProcId {
        name: Vec<u8>,
        back: Backtrace,
    },
    /// A name that doesn't correspond to any syslog severity
    BadSeverity {
        name: String,
        back: Backtrace,
    },
    /// A record whose message body was empty; such records are never enqueued
    EmptyMessage {
        back: Backtrace,
    },
    /// Logger configuration that can't work (port zero, a queue of capacity zero, ...)
    InvalidConfig {
        what: &'static str,
        back: Backtrace,
    },
    /// Failed to fetch the current executable (via std::env)
    NoExecutable {
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
        back: Backtrace,
    },
    /// Failed to fetch hostname (via libc)
    NoHostname {
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
        back: Backtrace,
    },
    /// Failed to start one of the logger's threads
    Spawn {
        source: std::io::Error,
        back: Backtrace,
    },
    /// TLS handshake or configuration error
    Tls {
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
        back: Backtrace,
    },
    /// General transport layer error
    Transport {
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
        back: Backtrace,
    },
}

impl Error {
    /// Wrap an I/O error as a transport error.
    pub(crate) fn transport(err: std::io::Error) -> Error {
        Error::Transport {
            source: Box::new(err),
            back: Backtrace::new(),
        }
    }
}

impl std::fmt::Display for Error {
    // `Error` is non-exhaustive so that adding variants won't be a breaking change to our
    // callers. That means the compiler won't catch us if we miss a variant here, so we
    // always include a `_` arm.
    #[allow(unreachable_patterns)]
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::BadRfc5424AppName { name, .. } => write!(
                f,
                "{:?} is not an RFC 5424 APP-NAME (at most 48 printable ASCII characters)",
                String::from_utf8_lossy(name)
            ),
            Error::BadRfc5424Hostname { name, .. } => write!(
                f,
                "{:?} is not an RFC 5424 HOSTNAME (at most 255 printable ASCII characters)",
                String::from_utf8_lossy(name)
            ),
            Error::BadRfc5424IpAddress => {
                write!(
                    f,
                    "The provided or discovered IP address is not compliant with RFC 5424"
                )
            }
            Error::BadRfc5424MsgId { name, .. } => write!(
                f,
                "{:?} is not an RFC 5424 MSGID (at most 32 printable ASCII characters)",
                String::from_utf8_lossy(name)
            ),
            Error::BadRfc5424ProcId { name, .. } => write!(
                f,
                "{:?} is not an RFC 5424 PROCID (at most 128 printable ASCII characters)",
                String::from_utf8_lossy(name)
            ),
            Error::BadSeverity { name, .. } => write!(f, "{:?} is not a syslog severity", name),
            Error::EmptyMessage { .. } => write!(f, "Refusing to format an empty message"),
            Error::InvalidConfig { what, .. } => write!(f, "Invalid logger configuration: {}", what),
            Error::NoExecutable { source, .. } => {
                write!(f, "Couldn't determine the current executable: {}", source)
            }
            Error::NoHostname { source, .. } => {
                write!(f, "Couldn't determine the hostname: {}", source)
            }
            Error::Spawn { source, .. } => write!(f, "Couldn't start a logger thread: {}", source),
            Error::Tls { source, .. } => write!(f, "TLS error: {}", source),
            Error::Transport { source, .. } => write!(f, "Transport error: {}", source),
            _ => write!(f, "Other socket-logger error"),
        }
    }
}

impl std::fmt::Debug for Error {
    // `Error` is non-exhaustive so that adding variants won't be a breaking change to our
    // callers. That means the compiler won't catch us if we miss a variant here, so we
    // always include a `_` arm.
    #[allow(unreachable_patterns)]
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::BadRfc5424AppName { back, .. }
            | Error::BadRfc5424Hostname { back, .. }
            | Error::BadRfc5424MsgId { back, .. }
            | Error::BadRfc5424ProcId { back, .. }
            | Error::BadSeverity { back, .. }
            | Error::EmptyMessage { back }
            | Error::InvalidConfig { back, .. }
            | Error::NoExecutable { back, .. }
            | Error::NoHostname { back, .. }
            | Error::Spawn { back, .. }
            | Error::Tls { back, .. }
            | Error::Transport { back, .. } => write!(f, "{}\n{:?}", self, back),
            err => write!(f, "socket-logger error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    #[allow(unreachable_patterns)]
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::NoExecutable { source, .. }
            | Error::NoHostname { source, .. }
            | Error::Tls { source, .. }
            | Error::Transport { source, .. } => Some(source.as_ref()),
            Error::Spawn { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
