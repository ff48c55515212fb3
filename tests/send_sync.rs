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

//! Send/Sync guarantees for the public types.

use socket_logger::{
    formatter::FormattedMessage,
    logger::{Handle, SocketLogger, SocketLoggerBuilder},
    record::{LogDetails, LogRecord},
    rfc5424::Rfc5424,
    transport::TcpConnector,
};
use static_assertions::assert_impl_all;

#[test]
fn logger_is_send_sync() {
    assert_impl_all!(SocketLogger: Send, Sync);
    assert_impl_all!(SocketLoggerBuilder: Send, Sync);
    assert_impl_all!(Handle: Send, Sync, Clone);
}

#[test]
fn components_are_send_sync() {
    assert_impl_all!(LogDetails: Send, Sync);
    assert_impl_all!(LogRecord: Send, Sync);
    assert_impl_all!(FormattedMessage: Send, Sync);
    assert_impl_all!(Rfc5424: Send, Sync);
    assert_impl_all!(TcpConnector: Send, Sync);
}

#[cfg(feature = "layer")]
#[test]
fn layer_is_send_sync() {
    assert_impl_all!(socket_logger::layer::Layer: Send, Sync);
}
