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

//! syslog facility & severity defintions.
//!
//! [`Facility`] and [`Severity`] replicate the names used in `<syslog.h>`. Their combination, the
//! PRIVAL of RFC [5424] §6.2.1, is computed by [`priority`] and never stored.
//!
//! [5424]: https://datatracker.ietf.org/doc/html/rfc5424

use crate::error::{Error, Result};

use backtrace::Backtrace;

type StdResult<T, E> = std::result::Result<T, E>;

/// RFC [5424] defines twenty-four "facilities" for messages. The enumeration values duplicate the
/// constants defined in `<syslog.h>`, albeit multiplied by 8 for convenience in forming syslog
/// message headers (which again mirrors the `#define`s in `<syslog.h>`).
///
/// [5424]: https://datatracker.ietf.org/doc/html/rfc5424
///
/// Hosted collectors by and large ignore the facility; `LOG_USER` is the default.
#[allow(non_camel_case_types)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Facility {
    /// kernel messages
    LOG_KERN = 0 << 3,
    /// random user-level messages
    LOG_USER = 1 << 3,
    /// mail system
    LOG_MAIL = 2 << 3,
    /// system daemons
    LOG_DAEMON = 3 << 3,
    /// security/authorization messages
    LOG_AUTH = 4 << 3,
    /// messages generated internally by syslogd
    LOG_SYSLOG = 5 << 3,
    /// line printer subsystem
    LOG_LPR = 6 << 3,
    /// network news subsystem
    LOG_NEWS = 7 << 3,
    /// UUCP subsystem
    LOG_UUCP = 8 << 3,
    /// clock daemon
    LOG_CRON = 9 << 3,
    /// security/authorization messages (private)
    LOG_AUTHPRIV = 10 << 3,
    /// ftp daemon
    LOG_FTP = 11 << 3,
    /// NTP subsystem
    LOG_NTP = 12 << 3,
    /// log audit
    LOG_AUDIT = 13 << 3,
    /// log alert
    LOG_ALERT = 14 << 3,
    /// clock daemon (note 2)
    LOG_CLOCK = 15 << 3,
    /// reserved for local use
    LOG_LOCAL0 = 16 << 3,
    /// reserved for local use
    LOG_LOCAL1 = 17 << 3,
    /// reserved for local use
    LOG_LOCAL2 = 18 << 3,
    /// reserved for local use
    LOG_LOCAL3 = 19 << 3,
    /// reserved for local use
    LOG_LOCAL4 = 20 << 3,
    /// reserved for local use
    LOG_LOCAL5 = 21 << 3,
    /// reserved for local use
    LOG_LOCAL6 = 22 << 3,
    /// reserved for local use
    LOG_LOCAL7 = 23 << 3,
}

impl Facility {
    /// All twenty-four facilities, in numerical order.
    pub const ALL: [Facility; 24] = [
        Facility::LOG_KERN,
        Facility::LOG_USER,
        Facility::LOG_MAIL,
        Facility::LOG_DAEMON,
        Facility::LOG_AUTH,
        Facility::LOG_SYSLOG,
        Facility::LOG_LPR,
        Facility::LOG_NEWS,
        Facility::LOG_UUCP,
        Facility::LOG_CRON,
        Facility::LOG_AUTHPRIV,
        Facility::LOG_FTP,
        Facility::LOG_NTP,
        Facility::LOG_AUDIT,
        Facility::LOG_ALERT,
        Facility::LOG_CLOCK,
        Facility::LOG_LOCAL0,
        Facility::LOG_LOCAL1,
        Facility::LOG_LOCAL2,
        Facility::LOG_LOCAL3,
        Facility::LOG_LOCAL4,
        Facility::LOG_LOCAL5,
        Facility::LOG_LOCAL6,
        Facility::LOG_LOCAL7,
    ];

    /// The facility's numerical code, 0 through 23 (i.e. _not_ multiplied by 8).
    pub fn code(self) -> u8 {
        (self as u8) >> 3
    }
}

impl std::default::Default for Facility {
    /// The default facility is `LOG_USER`.
    fn default() -> Self {
        Facility::LOG_USER
    }
}

impl std::fmt::Display for Facility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> StdResult<(), std::fmt::Error> {
        write!(
            f,
            "{}",
            match self {
                Facility::LOG_KERN => "LOG_KERN",
                Facility::LOG_USER => "LOG_USER",
                Facility::LOG_MAIL => "LOG_MAIL",
                Facility::LOG_DAEMON => "LOG_DAEMON",
                Facility::LOG_AUTH => "LOG_AUTH",
                Facility::LOG_SYSLOG => "LOG_SYSLOG",
                Facility::LOG_LPR => "LOG_LPR",
                Facility::LOG_NEWS => "LOG_NEWS",
                Facility::LOG_UUCP => "LOG_UUCP",
                Facility::LOG_CRON => "LOG_CRON",
                Facility::LOG_AUTHPRIV => "LOG_AUTHPRIV",
                Facility::LOG_FTP => "LOG_FTP",
                Facility::LOG_NTP => "LOG_NTP",
                Facility::LOG_AUDIT => "LOG_AUDIT",
                Facility::LOG_ALERT => "LOG_ALERT",
                Facility::LOG_CLOCK => "LOG_CLOCK",
                Facility::LOG_LOCAL0 => "LOG_LOCAL0",
                Facility::LOG_LOCAL1 => "LOG_LOCAL1",
                Facility::LOG_LOCAL2 => "LOG_LOCAL2",
                Facility::LOG_LOCAL3 => "LOG_LOCAL3",
                Facility::LOG_LOCAL4 => "LOG_LOCAL4",
                Facility::LOG_LOCAL5 => "LOG_LOCAL5",
                Facility::LOG_LOCAL6 => "LOG_LOCAL6",
                Facility::LOG_LOCAL7 => "LOG_LOCAL7",
            }
        )
    }
}

/// RFC [5424] defines eight severity levels for messages. The enumeration values duplicate the
/// constants documented as per the `syslog()` manual [page] & defined in `<syslog.h>`.
///
/// [5424]: https://datatracker.ietf.org/doc/html/rfc5424
/// [page]: https://man7.org/linux/man-pages/man3/syslog.3.html
///
/// Front-ends with their own notion of "level" map onto this type; anything they can't place
/// should land on the [`Default`], `LOG_INFO`:
///
/// ```rust
/// use socket_logger::facility::Severity;
/// let sev: Severity = "verbose".parse().unwrap_or_default();
/// assert_eq!(sev, Severity::LOG_DEBUG);
/// let sev: Severity = "event".parse().unwrap_or_default();
/// assert_eq!(sev, Severity::LOG_INFO);
/// ```
#[allow(non_camel_case_types)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    /// system is unusable
    LOG_EMERG,
    /// action must be take immediately
    LOG_ALERT,
    /// critical conditions
    LOG_CRIT,
    /// error conditions
    LOG_ERR,
    /// warning conditions
    LOG_WARNING,
    /// normal, but significant condition
    LOG_NOTICE,
    /// informational message
    LOG_INFO,
    /// debug-level message
    LOG_DEBUG,
}

impl Severity {
    /// All eight severities, most severe first.
    pub const ALL: [Severity; 8] = [
        Severity::LOG_EMERG,
        Severity::LOG_ALERT,
        Severity::LOG_CRIT,
        Severity::LOG_ERR,
        Severity::LOG_WARNING,
        Severity::LOG_NOTICE,
        Severity::LOG_INFO,
        Severity::LOG_DEBUG,
    ];

    /// The severity's numerical code, 0 (emergency) through 7 (debug).
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl std::default::Default for Severity {
    /// The default severity is `LOG_INFO`.
    fn default() -> Self {
        Severity::LOG_INFO
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> StdResult<(), std::fmt::Error> {
        write!(
            f,
            "{}",
            match self {
                Severity::LOG_EMERG => "LOG_EMERG",
                Severity::LOG_ALERT => "LOG_ALERT",
                Severity::LOG_CRIT => "LOG_CRIT",
                Severity::LOG_ERR => "LOG_ERR",
                Severity::LOG_WARNING => "LOG_WARNING",
                Severity::LOG_NOTICE => "LOG_NOTICE",
                Severity::LOG_INFO => "LOG_INFO",
                Severity::LOG_DEBUG => "LOG_DEBUG",
            }
        )
    }
}

impl std::convert::TryFrom<u8> for Severity {
    type Error = Error;
    fn try_from(x: u8) -> StdResult<Self, Self::Error> {
        Severity::ALL
            .get(x as usize)
            .copied()
            .ok_or_else(|| Error::BadSeverity {
                name: x.to_string(),
                back: Backtrace::new(),
            })
    }
}

impl std::str::FromStr for Severity {
    type Err = Error;
    /// Accepts the `<syslog.h>` names (with or without the `LOG_` prefix) along with the spellings
    /// common in logging front-ends, case-insensitively.
    fn from_str(s: &str) -> Result<Self> {
        let lower = s.to_ascii_lowercase();
        let name = lower.strip_prefix("log_").unwrap_or(&lower);
        match name {
            "emerg" | "emergency" | "panic" => Ok(Severity::LOG_EMERG),
            "alert" => Ok(Severity::LOG_ALERT),
            "crit" | "critical" => Ok(Severity::LOG_CRIT),
            "err" | "error" => Ok(Severity::LOG_ERR),
            "warning" | "warn" => Ok(Severity::LOG_WARNING),
            "notice" => Ok(Severity::LOG_NOTICE),
            "info" | "informational" => Ok(Severity::LOG_INFO),
            "debug" | "trace" | "verbose" => Ok(Severity::LOG_DEBUG),
            _ => Err(Error::BadSeverity {
                name: s.to_owned(),
                back: Backtrace::new(),
            }),
        }
    }
}

/// Compute the RFC 5424 PRIVAL: the severity's code plus eight times the facility's code.
pub fn priority(facility: Facility, severity: Severity) -> u8 {
    facility as u8 | severity as u8
}
