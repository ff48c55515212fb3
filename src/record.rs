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

//! Log records: what a caller hands to [`SocketLogger::log`].
//!
//! A record is a message body plus its [`LogDetails`]: everything that ends up in the syslog
//! header & structured data. Adapters for logging front-ends build the details; the message text
//! is whatever the front-end produced.
//!
//! ```rust
//! use socket_logger::{facility::Severity, record::LogDetails};
//! let details = LogDetails::builder()
//!     .severity(Severity::LOG_WARNING)
//!     .hostname_as_string("mymachine.example.com")
//!     .unwrap()
//!     .appname_as_string("MyApp")
//!     .unwrap()
//!     .header("staging")
//!     .build();
//! assert_eq!(details.headers(), &["staging".to_string()]);
//! ```
//!
//! [`SocketLogger::log`]: crate::logger::SocketLogger::log

use crate::{
    error::Result,
    facility::{Facility, Severity},
    rfc5424::{AppName, Hostname, MsgId, ProcId},
};

use chrono::prelude::*;

/// Per-call metadata for a log message.
#[derive(Clone, Debug)]
pub struct LogDetails {
    severity: Severity,
    facility: Facility,
    timestamp: DateTime<Utc>,
    hostname: Hostname,
    appname: AppName,
    procid: Option<ProcId>,
    msgid: Option<MsgId>,
    headers: Vec<String>,
}

impl LogDetails {
    pub fn builder() -> LogDetailsBuilder {
        LogDetailsBuilder {
            severity: Severity::default(),
            facility: Facility::default(),
            timestamp: None,
            hostname: None,
            appname: None,
            procid: None,
            msgid: None,
            headers: Vec::new(),
        }
    }
    pub fn severity(&self) -> Severity {
        self.severity
    }
    pub fn facility(&self) -> Facility {
        self.facility
    }
    pub fn timestamp(&self) -> &DateTime<Utc> {
        &self.timestamp
    }
    pub fn hostname(&self) -> &Hostname {
        &self.hostname
    }
    pub fn appname(&self) -> &AppName {
        &self.appname
    }
    pub fn procid(&self) -> Option<&ProcId> {
        self.procid.as_ref()
    }
    pub fn msgid(&self) -> Option<&MsgId> {
        self.msgid.as_ref()
    }
    /// Extra tags, in the order they'll appear in the structured data.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }
}

/// Builds [`LogDetails`]; anything not set falls back to a sensible default.
///
/// The hostname & application name defaults are discovered from the environment, which isn't
/// free; callers logging at any volume should set them (or clone a prototype [`LogDetails`]).
pub struct LogDetailsBuilder {
    severity: Severity,
    facility: Facility,
    timestamp: Option<DateTime<Utc>>,
    hostname: Option<Hostname>,
    appname: Option<AppName>,
    procid: Option<ProcId>,
    msgid: Option<MsgId>,
    headers: Vec<String>,
}

impl LogDetailsBuilder {
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
    pub fn facility(mut self, facility: Facility) -> Self {
        self.facility = facility;
        self
    }
    /// Defaults to the moment [`build`](LogDetailsBuilder::build) is called.
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
    pub fn hostname(mut self, hostname: Hostname) -> Self {
        self.hostname = Some(hostname);
        self
    }
    pub fn hostname_as_string<S: Into<String>>(mut self, hostname: S) -> Result<Self> {
        self.hostname = Some(Hostname::try_from(hostname.into())?);
        Ok(self)
    }
    pub fn appname(mut self, appname: AppName) -> Self {
        self.appname = Some(appname);
        self
    }
    pub fn appname_as_string<S: Into<String>>(mut self, appname: S) -> Result<Self> {
        self.appname = Some(AppName::try_from(appname.into())?);
        Ok(self)
    }
    pub fn procid(mut self, procid: Option<ProcId>) -> Self {
        self.procid = procid;
        self
    }
    pub fn pid_as_string<S: Into<String>>(mut self, pid: S) -> Result<Self> {
        self.procid = Some(ProcId::try_from(pid.into())?);
        Ok(self)
    }
    pub fn msgid(mut self, msgid: Option<MsgId>) -> Self {
        self.msgid = msgid;
        self
    }
    pub fn msgid_as_string<S: Into<String>>(mut self, msgid: S) -> Result<Self> {
        self.msgid = Some(MsgId::try_from(msgid.into())?);
        Ok(self)
    }
    /// Append one extra tag.
    pub fn header<S: Into<String>>(mut self, header: S) -> Self {
        self.headers.push(header.into());
        self
    }
    /// Replace the extra tags wholesale.
    pub fn headers(mut self, headers: Vec<String>) -> Self {
        self.headers = headers;
        self
    }
    pub fn build(self) -> LogDetails {
        LogDetails {
            severity: self.severity,
            facility: self.facility,
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            hostname: self.hostname.unwrap_or_default(),
            appname: self.appname.unwrap_or_default(),
            procid: self.procid,
            msgid: self.msgid,
            headers: self.headers,
        }
    }
}

/// A log message & its details: the formatter's input.
#[derive(Clone, Debug)]
pub struct LogRecord {
    pub details: LogDetails,
    pub message: String,
}

impl LogRecord {
    pub fn new<S: Into<String>>(details: LogDetails, message: S) -> LogRecord {
        LogRecord {
            details,
            message: message.into(),
        }
    }
}
