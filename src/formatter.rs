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

//! The unit of transmission.
//!
//! This module defines [`FormattedMessage`], the only thing the outbound queue holds & the only
//! thing a [`Transport`] will send.
//!
//! [`Transport`]: crate::transport::Transport

use bytes::Bytes;

use std::ops::Deref;

/// One complete, framed syslog message
/// ===================================
///
/// # Design
///
/// If the [`Transport`] trait simply took, say, a slice of `u8` then callers could mistakenly pass
/// _anything_ to it (a little endian binary representation of a `u32`, `[0; 1204]` or any silly
/// thing). I would like to enforce the rule that "The thing passed to the [`Transport`] trait must
/// have been produced by the formatter." Hence this type: it can only be constructed inside the
/// crate (by [`Rfc5424::format`]), it is never empty, and it always ends in exactly one `\n`, the
/// frame delimiter on the wire.
///
/// It's backed by [`Bytes`], so handing a copy to the connection's I/O thread while the original
/// stays at the head of the queue costs a reference count, not a copy.
///
/// [`Transport`]: crate::transport::Transport
/// [`Rfc5424::format`]: crate::rfc5424::Rfc5424::format
#[derive(Clone, PartialEq, Eq)]
pub struct FormattedMessage(Bytes);

impl FormattedMessage {
    /// `buf` must be UTF-8 & end in a single newline; the formatter guarantees both.
    pub(crate) fn new(buf: Vec<u8>) -> FormattedMessage {
        debug_assert!(buf.ends_with(b"\n"));
        FormattedMessage(Bytes::from(buf))
    }

    /// View this message as text (it's always valid UTF-8).
    pub fn as_str(&self) -> &str {
        // Only `Rfc5424::format` makes these, and it only ever writes UTF-8.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl Deref for FormattedMessage {
    type Target = [u8];
    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for FormattedMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FormattedMessage({:?})", self.as_str())
    }
}

impl std::fmt::Display for FormattedMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str().trim_end_matches('\n'))
    }
}
