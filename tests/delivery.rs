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

//! End-to-end delivery over plain TCP to a collector on the loopback interface.

mod common;

use common::Collector;

use chrono::{TimeZone as _, Utc};
use socket_logger::{
    config::{Delivery, TimeZone},
    facility::Severity,
    logger::{SocketLogger, SocketLoggerBuilder},
    record::LogDetails,
};
use syslog_rfc5424::{SyslogFacility, SyslogSeverity};

use std::{net::TcpListener, time::Duration};

fn builder(host: &str, port: u16) -> SocketLoggerBuilder {
    SocketLogger::builder(host, port)
        .tls(false)
        .time_zone(TimeZone::Utc)
        .connect_timeout(Duration::from_secs(2))
}

fn details(hostname: &str) -> LogDetails {
    LogDetails::builder()
        .severity(Severity::LOG_INFO)
        .hostname_as_string(hostname)
        .unwrap()
        .appname_as_string("MyApp")
        .unwrap()
        .build()
}

#[test]
fn exact_line() {
    let collector = Collector::start("127.0.0.1").unwrap();
    let logger = builder("127.0.0.1", collector.port).build().unwrap();
    logger.log(
        LogDetails::builder()
            .severity(Severity::LOG_INFO)
            .timestamp(Utc.timestamp_opt(0, 0).unwrap())
            .hostname_as_string("mymachine0.example.com")
            .unwrap()
            .appname_as_string("MyApp")
            .unwrap()
            .build(),
        "This is message 1",
    );
    assert!(logger.flush(Duration::from_secs(5)));
    assert_eq!(
        collector.next_line(),
        (
            0,
            "<14>1 1970-01-01T00:00:00.000000Z mymachine0.example.com MyApp - - - This is message 1"
                .to_string()
        )
    );
}

fn in_order(host: &str) {
    let collector = match Collector::start(host) {
        Some(collector) => collector,
        None => {
            eprintln!("couldn't listen on {}; skipping", host);
            return;
        }
    };
    let logger = builder(host, collector.port).build().unwrap();
    for idx in 0..8 {
        logger.log(
            details(&format!("mymachine{}.example.com", idx)),
            format!("This is message {}", idx + 1),
        );
    }
    assert!(logger.flush(Duration::from_secs(5)));

    for (idx, (conn, line)) in collector.lines(8).into_iter().enumerate() {
        // One connection for the lot
        assert_eq!(conn, 0);
        let msg = syslog_rfc5424::parse_message(&line).unwrap();
        assert_eq!(msg.severity, SyslogSeverity::SEV_INFO);
        assert_eq!(msg.facility, SyslogFacility::LOG_USER);
        assert_eq!(
            msg.hostname,
            Some(format!("mymachine{}.example.com", idx))
        );
        assert_eq!(msg.appname, Some("MyApp".to_string()));
        assert!(msg.procid.is_none());
        assert!(msg.msgid.is_none());
        assert_eq!(msg.msg, format!("This is message {}", idx + 1));
    }
    assert!(collector.quiet_for(Duration::from_millis(100)));
}

#[test]
fn in_order_localhost() {
    in_order("localhost");
}

#[test]
fn in_order_ipv4() {
    in_order("127.0.0.1");
}

#[test]
fn in_order_ipv6() {
    in_order("::1");
}

#[test]
fn token_and_headers() {
    let collector = Collector::start("127.0.0.1").unwrap();
    let logger = builder("127.0.0.1", collector.port)
        .token("b5e0ff77@41058")
        .build()
        .unwrap();
    logger.log(
        LogDetails::builder()
            .severity(Severity::LOG_WARNING)
            .hostname_as_string("mymachine.example.com")
            .unwrap()
            .appname_as_string("MyApp")
            .unwrap()
            .header("staging")
            .header("say \"hi\"")
            .build(),
        "first line\nsecond line",
    );
    assert!(logger.flush(Duration::from_secs(5)));
    let (_, line) = collector.next_line();
    assert!(line.starts_with("<12>1 "));
    assert!(line.ends_with(
        " mymachine.example.com MyApp - - [b5e0ff77@41058 tag=\"mymachine.example.com\" \
         tag=\"MyApp\" tag=\"staging\" tag=\"say \\\"hi\\\"\"] first line second line"
    ));
}

#[test]
fn reconnects_lazily() {
    let collector = Collector::hanging_up_after("127.0.0.1", 1).unwrap();
    let logger = builder("127.0.0.1", collector.port).build().unwrap();

    logger.log(details("mymachine.example.com"), "before");
    assert!(logger.flush(Duration::from_secs(5)));
    let (conn, line) = collector.next_line();
    assert_eq!(conn, 0);
    assert!(line.ends_with(" - - - before"));
    collector.hung_up(0);
    // Give the logger a moment to notice
    std::thread::sleep(Duration::from_secs(1));

    logger.log(details("mymachine.example.com"), "after");
    assert!(logger.flush(Duration::from_secs(5)));
    let (conn, line) = collector.next_line();
    assert_eq!(conn, 1);
    assert!(line.ends_with(" - - - after"));
}

#[test]
fn write_timeout_drops_connection() {
    let collector = Collector::stalling_first("127.0.0.1").unwrap();
    let logger = builder("127.0.0.1", collector.port)
        .write_timeout(Some(Duration::from_millis(50)))
        .build()
        .unwrap();

    // Far more than the socket buffers on either end will hold.
    let big = "x".repeat(1024 * 1024);
    for _ in 0..32 {
        logger.log(details("mymachine.example.com"), big.clone());
    }
    assert!(!logger.flush(Duration::from_secs(30)));

    // The next record reconnects & everything still queued goes out on the new connection.
    logger.log(details("mymachine.example.com"), "after the stall");
    assert!(logger.flush(Duration::from_secs(30)));
    loop {
        let (conn, line) = collector.next_line();
        assert_eq!(conn, 1);
        if line.ends_with(" - - - after the stall") {
            break;
        }
    }
}

#[test]
fn flush_fails_without_collector() {
    // Grab a free port, then free it up again.
    let port = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let logger = builder("127.0.0.1", port).build().unwrap();
    logger.log(details("mymachine.example.com"), "nobody's listening");
    assert!(!logger.flush(Duration::from_secs(5)));
    // Still accepting records, still not blocking
    logger.log(details("mymachine.example.com"), "still nobody");
    logger.close();
}

#[test]
fn drop_delivers_queued() {
    let collector = Collector::start("127.0.0.1").unwrap();
    {
        let logger = builder("127.0.0.1", collector.port)
            .delivery(Delivery::AtLeastOnce)
            .build()
            .unwrap();
        for idx in 0..50 {
            logger.log(details("mymachine.example.com"), format!("message {}", idx));
        }
    }
    let lines = collector.lines(50);
    for (idx, (_, line)) in lines.iter().enumerate() {
        assert!(line.ends_with(&format!(" - - - message {}", idx)));
    }
}
