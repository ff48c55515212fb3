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

//! RFC [5424]-compliant syslog message formatting
//!
//! [5424]: https://datatracker.ietf.org/doc/html/rfc5424
//!
//! [`Rfc5424`] turns a [`LogRecord`] into a [`FormattedMessage`]:
//!
//! ```text
//! <PRI>1 TIMESTAMP HOSTNAME APP-NAME PROCID MSGID STRUCTURED-DATA MSG\n
//! ```
//!
//! It is pure: no I/O, no shared state. The header fields it needs are validated on their way
//! into the record (see [`Hostname`], [`AppName`], [`ProcId`] & [`MsgId`]), so the only record
//! it refuses is one with an empty message.

use crate::{
    config::TimeZone,
    error::{Error, Result},
    facility::priority,
    formatter::FormattedMessage,
    record::LogRecord,
};

use backtrace::Backtrace;
use bytes::buf::BufMut;
use chrono::prelude::*;

type StdResult<T, E> = std::result::Result<T, E>;

/// RFC 5424 header fields are PRINTUSASCII (%d33-126): no spaces, no control characters.
fn is_print_us_ascii(bytes: &[u8]) -> bool {
    bytes.iter().all(|b| (33..=126).contains(b))
}

/// A [`Vec<u8>`] instance with the additional constraint that it must be one to 255 bytes of
/// printable ASCII.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hostname(Vec<u8>);

impl Hostname {
    /// An RFC 5424-compliant hostname is at most 255 bytes of printable ASCII
    pub fn new(bytes: Vec<u8>) -> Result<Hostname> {
        if !bytes.is_empty() && bytes.len() < 256 && is_print_us_ascii(&bytes) {
            Ok(Hostname(bytes))
        } else {
            Err(Error::BadRfc5424Hostname {
                name: bytes,
                back: Backtrace::new(),
            })
        }
    }
    pub fn as_str(&self) -> &str {
        // validated as ASCII on construction
        std::str::from_utf8(&self.0).unwrap_or("-")
    }
}

impl std::default::Default for Hostname {
    /// Attempt to figure-out an RFC [5424]-compliant hostname.
    ///
    /// The order of preference for the contents of the HOSTNAME field is as follows:
    ///
    /// 1.  FQDN
    /// 2.  Static IP address
    /// 3.  hostname
    /// 4.  Dynamic IP address
    /// 5.  the NILVALUE
    ///
    /// This implementation doesn't quite do that; for reasons of expedience, it will first simply
    /// try [gethostname()], then asks the OS for a local IP address, then gives up & returns "-".
    ///
    /// [5424]: https://datatracker.ietf.org/doc/html/rfc5424
    /// [gethostname()]: https://man7.org/linux/man-pages/man2/gethostname.2.html
    fn default() -> Self {
        hostname::get()
            .map_err(|err| Error::NoHostname {
                source: Box::new(err),
                back: Backtrace::new(),
            })
            // vvv :=> StdResult<Hostname, Error>
            .and_then(|hn| Hostname::new(hn.to_string_lossy().into_owned().into_bytes()))
            .or_else(|_err| {
                let ip: StdResult<std::net::IpAddr, Error> =
                    local_ip_address::local_ip().map_err(|_| Error::BadRfc5424IpAddress);
                ip.and_then(|ip| Hostname::new(ip.to_string().into_bytes()))
            }) // :=> StdResult<Hostname, Error>
            .unwrap_or_else(|_| Hostname(b"-".to_vec()))
    }
}

impl std::convert::TryFrom<String> for Hostname {
    type Error = Error;
    fn try_from(x: String) -> StdResult<Self, Self::Error> {
        Hostname::new(x.into_bytes())
    }
}

impl std::fmt::Display for Hostname {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> StdResult<(), std::fmt::Error> {
        write!(f, "{}", self.as_str())
    }
}

/// A string with the additional constraint that it is one to forty-eight bytes of printable ASCII.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppName(Vec<u8>);

impl std::fmt::Display for AppName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> StdResult<(), std::fmt::Error> {
        write!(f, "{}", self.as_str())
    }
}

impl AppName {
    pub fn new(bytes: Vec<u8>) -> Result<AppName> {
        if !bytes.is_empty() && bytes.len() < 49 && is_print_us_ascii(&bytes) {
            Ok(AppName(bytes))
        } else {
            Err(Error::BadRfc5424AppName {
                name: bytes,
                back: Backtrace::new(),
            })
        }
    }
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or("-")
    }
}

impl std::convert::TryFrom<String> for AppName {
    type Error = Error;
    fn try_from(x: String) -> StdResult<Self, Self::Error> {
        AppName::new(x.into_bytes())
    }
}

impl std::default::Default for AppName {
    /// Attempt to figure-out an RFC [5424] Application Name.
    ///
    /// The APP-NAME field SHOULD identify the device or application that originated the message.
    /// It is a string without further semantics. It is intended for filtering messages on a relay
    /// or collector.
    ///
    /// This implementation relies on [`std::env::current_exe`]. It cannot fail; if for any reason
    /// that value cannot be retrieved, or is not printable ASCII, it simply returns "-".
    ///
    /// [5424]: https://datatracker.ietf.org/doc/html/rfc5424
    fn default() -> Self {
        std::env::current_exe() // :=> StdResult<PathBuf, std::io::Error>
            .map_err(|err| Error::NoExecutable {
                source: Box::new(err),
                back: Backtrace::new(),
            })
            .and_then(|pbuf| {
                AppName::new(match pbuf.file_name() {
                    Some(os_str) => os_str.to_string_lossy().into_owned().into_bytes(),
                    None => b"-".to_vec(),
                })
            })
            .unwrap_or_else(|_| AppName(b"-".to_vec()))
    }
}

/// A string with the additional constraint that it is one to 128 bytes of printable ASCII.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcId(Vec<u8>);

impl std::fmt::Display for ProcId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> StdResult<(), std::fmt::Error> {
        write!(f, "{}", std::str::from_utf8(&self.0).unwrap_or("-"))
    }
}

impl ProcId {
    pub fn new(bytes: Vec<u8>) -> Result<ProcId> {
        if !bytes.is_empty() && bytes.len() < 129 && is_print_us_ascii(&bytes) {
            Ok(ProcId(bytes))
        } else {
            Err(Error::BadRfc5424ProcId {
                name: bytes,
                back: Backtrace::new(),
            })
        }
    }
}

impl std::convert::TryFrom<String> for ProcId {
    type Error = Error;
    fn try_from(x: String) -> StdResult<Self, Self::Error> {
        ProcId::new(x.into_bytes())
    }
}

impl std::default::Default for ProcId {
    /// While generally this field has been the OS process identifier, "PROCID is a value that is
    /// included in the message, having no interoperable meaning, except that a change in the value
    /// indicates there has been a discontinuity in syslog reporting."
    ///
    /// This implementation relies on [`std::process::id`]. It cannot fail.
    fn default() -> Self {
        ProcId(std::process::id().to_string().into_bytes())
    }
}

/// A string with the additional constraint that it is one to 32 bytes of printable ASCII.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MsgId(Vec<u8>);

impl std::fmt::Display for MsgId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> StdResult<(), std::fmt::Error> {
        write!(f, "{}", std::str::from_utf8(&self.0).unwrap_or("-"))
    }
}

impl MsgId {
    pub fn new(bytes: Vec<u8>) -> Result<MsgId> {
        if !bytes.is_empty() && bytes.len() < 33 && is_print_us_ascii(&bytes) {
            Ok(MsgId(bytes))
        } else {
            Err(Error::BadRfc5424MsgId {
                name: bytes,
                back: Backtrace::new(),
            })
        }
    }
}

impl std::convert::TryFrom<String> for MsgId {
    type Error = Error;
    fn try_from(x: String) -> StdResult<Self, Self::Error> {
        MsgId::new(x.into_bytes())
    }
}

/// Replace each line break (`\r\n`, `\n` or a lone `\r`) with a single space, so that every record
/// occupies exactly one line on the wire.
fn strip_newlines(msg: &str) -> std::borrow::Cow<'_, str> {
    if !msg.contains(['\n', '\r']) {
        return std::borrow::Cow::Borrowed(msg);
    }
    std::borrow::Cow::Owned(msg.replace("\r\n", " ").replace(['\n', '\r'], " "))
}

/// Write `s` as an RFC 5424 PARAM-VALUE: '"', '\' & ']' must be escaped with a backslash.
fn put_param_value(buf: &mut Vec<u8>, s: &str) {
    for b in s.bytes() {
        if matches!(b, b'"' | b'\\' | b']') {
            buf.put_u8(b'\\');
        }
        buf.put_u8(b);
    }
}

/// A formatter that produces RFC [5424]-conformant syslog messages.
///
/// [5424]: https://datatracker.ietf.org/doc/html/rfc5424
#[derive(Clone, Debug, Default)]
pub struct Rfc5424 {
    token: Option<String>,
    time_zone: TimeZone,
    with_bom: bool,
}

pub struct Rfc5424Builder {
    imp: Rfc5424,
}

impl Rfc5424Builder {
    /// The credential some collectors (e.g. Loggly) expect as the structured data's SD-ID.
    pub fn token(mut self, token: Option<String>) -> Self {
        self.imp.token = token.filter(|t| !t.is_empty());
        self
    }
    pub fn time_zone(mut self, time_zone: TimeZone) -> Self {
        self.imp.time_zone = time_zone;
        self
    }
    pub fn with_bom(mut self, with_bom: bool) -> Self {
        self.imp.with_bom = with_bom;
        self
    }
    pub fn build(self) -> Rfc5424 {
        self.imp
    }
}

impl Rfc5424 {
    pub fn builder() -> Rfc5424Builder {
        Rfc5424Builder {
            imp: Rfc5424::default(),
        }
    }

    /// Render `timestamp` as RFC 3339 with exactly six fractional digits; a zero offset is `Z`,
    /// anything else numeric.
    fn timestamp(&self, timestamp: &DateTime<Utc>) -> String {
        match self.time_zone {
            TimeZone::Local => timestamp
                .with_timezone(&Local)
                .to_rfc3339_opts(SecondsFormat::Micros, true),
            TimeZone::Utc => timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
            TimeZone::Fixed(offset) => timestamp
                .with_timezone(&offset)
                .to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }

    /// `-` if there's no token, else `[token tag="hostname" tag="appname" tag="extra"...]`
    fn structured_data(&self, record: &LogRecord, buf: &mut Vec<u8>) {
        let token = match &self.token {
            Some(token) => token,
            None => {
                buf.put_u8(b'-');
                return;
            }
        };
        buf.put_u8(b'[');
        buf.put_slice(token.as_bytes());
        let details = &record.details;
        for tag in [details.hostname().as_str(), details.appname().as_str()]
            .into_iter()
            .chain(details.headers().iter().map(String::as_str))
        {
            buf.put_slice(b" tag=\"");
            put_param_value(buf, tag);
            buf.put_u8(b'"');
        }
        buf.put_u8(b']');
    }

    /// Format `record` as a single line of RFC 5424 syslog.
    ///
    /// Fails only if the message is empty; such records are to be dropped.
    pub fn format(&self, record: &LogRecord) -> Result<FormattedMessage> {
        if record.message.is_empty() {
            return Err(Error::EmptyMessage {
                back: Backtrace::new(),
            });
        }
        let details = &record.details;

        let mut buf = format!(
            "<{}>1 {} ",
            priority(details.facility(), details.severity()),
            self.timestamp(details.timestamp())
        )
        .into_bytes();

        buf.put_slice(details.hostname().as_str().as_bytes());
        buf.put_slice(
            format!(
                " {} {} {} ",
                details.appname(),
                details
                    .procid()
                    .map_or_else(|| "-".to_string(), |p| p.to_string()),
                details
                    .msgid()
                    .map_or_else(|| "-".to_string(), |m| m.to_string())
            )
            .as_bytes(),
        );

        self.structured_data(record, &mut buf);
        buf.put_u8(b' ');

        // "If a syslog application encodes MSG in UTF-8, the string MUST start with the Unicode
        // byte order mask (BOM)". Hosted collectors tend to display the BOM as garbage, so it's
        // opt-in.
        if self.with_bom {
            buf.put_slice(&[0xef, 0xbb, 0xbf]);
        }

        buf.put_slice(strip_newlines(&record.message).as_bytes());
        buf.put_u8(b'\n');
        Ok(FormattedMessage::new(buf))
    }
}
