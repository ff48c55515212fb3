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

//! Test writing, in the clear, to an rsyslogd listening on TCP port 514 of the local host.

use socket_logger::{layer::Layer, logger::SocketLogger};
use tracing::{debug, error, info, trace, warn};
use tracing_subscriber::{
    layer::SubscriberExt, // Needed to get `with()`
    registry::Registry,
};

use std::time::Duration;

pub fn main() {
    let logger = SocketLogger::rsyslog().build().unwrap();
    // Setup the real subsriber...
    let subscriber = Registry::default().with(Layer::new(logger.handle()));
    // and install it.
    let _guard = tracing::subscriber::set_default(subscriber);

    trace!("你好, TCP socket.");
    debug!("你好, TCP socket.");
    info!("你好, TCP socket.");
    warn!("你好, TCP socket.");
    error!("你好, TCP socket.");

    if !logger.flush(Duration::from_secs(5)) {
        eprintln!("Failed to deliver everything to {}", logger.endpoint());
        std::process::exit(1);
    }
}
