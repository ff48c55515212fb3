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

//! A toy syslog collector listening on a local TCP port.

#![allow(dead_code)]

use crossbeam_channel::{unbounded, Receiver, Sender};

use std::{
    io::{BufRead, BufReader},
    net::{TcpListener, TcpStream},
    thread,
    time::Duration,
};

/// One line received: the (zero-based) index of the connection it came in on & its text, sans
/// newline.
pub type Line = (usize, String);

pub struct Collector {
    pub port: u16,
    lines: Receiver<Line>,
    hangups: Receiver<usize>,
}

impl Collector {
    /// Listen on `addr`, port chosen by the OS. `None` if we can't bind (no IPv6 on this host, say).
    pub fn start(addr: &str) -> Option<Collector> {
        Collector::start_with(addr, None, false)
    }

    /// As [`start`](Collector::start), but each connection is closed after `lines` lines.
    pub fn hanging_up_after(addr: &str, lines: usize) -> Option<Collector> {
        Collector::start_with(addr, Some(lines), false)
    }

    /// As [`start`](Collector::start), but the first connection is accepted & then never read.
    pub fn stalling_first(addr: &str) -> Option<Collector> {
        Collector::start_with(addr, None, true)
    }

    fn start_with(
        addr: &str,
        hang_up_after: Option<usize>,
        stall_first: bool,
    ) -> Option<Collector> {
        let listener = TcpListener::bind((addr, 0)).ok()?;
        let port = listener.local_addr().ok()?.port();
        let (line_tx, lines) = unbounded();
        let (hangup_tx, hangups) = unbounded();
        thread::spawn(move || {
            for (conn, stream) in listener.incoming().enumerate() {
                let stream = match stream {
                    Ok(stream) => stream,
                    Err(_) => return,
                };
                if stall_first && conn == 0 {
                    thread::spawn(move || {
                        thread::sleep(Duration::from_secs(60));
                        drop(stream);
                    });
                    continue;
                }
                let line_tx = line_tx.clone();
                let hangup_tx = hangup_tx.clone();
                thread::spawn(move || serve(conn, stream, hang_up_after, line_tx, hangup_tx));
            }
        });
        Some(Collector {
            port,
            lines,
            hangups,
        })
    }

    /// The next line received, waiting up to five seconds.
    pub fn next_line(&self) -> Line {
        self.lines
            .recv_timeout(Duration::from_secs(5))
            .expect("no line received")
    }

    pub fn lines(&self, n: usize) -> Vec<Line> {
        (0..n).map(|_| self.next_line()).collect()
    }

    /// Nothing more arrives within `wait`.
    pub fn quiet_for(&self, wait: Duration) -> bool {
        self.lines.recv_timeout(wait).is_err()
    }

    /// Wait for the collector to hang up on connection `conn`.
    pub fn hung_up(&self, conn: usize) {
        loop {
            let which = self
                .hangups
                .recv_timeout(Duration::from_secs(5))
                .expect("never hung up");
            if which == conn {
                return;
            }
        }
    }
}

fn serve(
    conn: usize,
    stream: TcpStream,
    hang_up_after: Option<usize>,
    lines: Sender<Line>,
    hangups: Sender<usize>,
) {
    let mut reader = BufReader::new(stream);
    let mut count = 0;
    loop {
        if hang_up_after.map_or(false, |n| count >= n) {
            drop(reader);
            let _ = hangups.send(conn);
            return;
        }
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) | Err(_) => return,
            Ok(_) => {
                count += 1;
                let _ = lines.send((conn, line.trim_end_matches('\n').to_string()));
            }
        }
    }
}
