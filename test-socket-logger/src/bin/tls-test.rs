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

//! Test writing over TLS to a hosted collector.
//!
//! Usage: `tls-test HOST PORT [TOKEN]`, e.g. `tls-test logs.papertrailapp.com 12345`.

use socket_logger::{
    config::TimeZone, facility::Severity, logger::SocketLogger, record::LogDetails,
};

use std::time::Duration;

pub fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: tls-test HOST PORT [TOKEN]");
        std::process::exit(2);
    }
    let port: u16 = match args[1].parse() {
        Ok(port) => port,
        Err(err) => {
            eprintln!("Bad port {}: {}", args[1], err);
            std::process::exit(2);
        }
    };

    let mut builder = SocketLogger::builder(args[0].clone(), port).time_zone(TimeZone::Utc);
    if let Some(token) = args.get(2) {
        builder = builder.token(token.clone());
    }
    let logger = builder.build().unwrap();

    for (idx, severity) in Severity::ALL.iter().rev().enumerate() {
        logger.log(
            LogDetails::builder()
                .severity(*severity)
                .appname_as_string("tls-test")
                .unwrap()
                .build(),
            format!("你好, TLS socket ({}, message {}).", severity, idx + 1),
        );
    }

    if !logger.flush(Duration::from_secs(10)) {
        eprintln!("Failed to deliver everything to {}", logger.endpoint());
        std::process::exit(1);
    }
}
