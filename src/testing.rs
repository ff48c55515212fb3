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

//! An in-memory [`Connector`] for unit tests.

use crate::{
    error::{Error, Result},
    formatter::FormattedMessage,
    transport::{Connector, Transport},
};

use std::{
    collections::HashSet,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

pub fn formatted(text: &str) -> FormattedMessage {
    FormattedMessage::new(format!("{}\n", text).into_bytes())
}

#[derive(Default)]
struct Shared {
    attempts: AtomicUsize,
    writes: AtomicUsize,
    refuse: AtomicBool,
    hung_up: AtomicBool,
    connect_delay: Mutex<Duration>,
    write_delay: Mutex<Duration>,
    /// Zero-based indices (counted across every connection) of writes that should fail
    failing_writes: Mutex<HashSet<usize>>,
    sent: Mutex<Vec<String>>,
}

/// Records what's written to it; clones share state, so keep one to inspect after handing the
/// other to the code under test.
#[derive(Clone, Default)]
pub struct FakeConnector {
    shared: Arc<Shared>,
}

impl FakeConnector {
    pub fn new() -> FakeConnector {
        FakeConnector::default()
    }
    pub fn with_connect_delay(self, delay: Duration) -> Self {
        *self.shared.connect_delay.lock().unwrap() = delay;
        self
    }
    pub fn with_write_delay(self, delay: Duration) -> Self {
        *self.shared.write_delay.lock().unwrap() = delay;
        self
    }
    pub fn failing_write(self, index: usize) -> Self {
        self.shared.failing_writes.lock().unwrap().insert(index);
        self
    }
    pub fn refusing(self, refuse: bool) -> Self {
        self.shared.refuse.store(refuse, Ordering::SeqCst);
        self
    }
    /// Make the current connection look closed by the peer.
    pub fn hang_up(&self) {
        self.shared.hung_up.store(true, Ordering::SeqCst);
    }
    pub fn attempts(&self) -> usize {
        self.shared.attempts.load(Ordering::SeqCst)
    }
    /// Bodies of the messages successfully written, in order.
    pub fn sent(&self) -> Vec<String> {
        self.shared.sent.lock().unwrap().clone()
    }
}

impl Connector for FakeConnector {
    fn connect(&self) -> Result<Box<dyn Transport>> {
        self.shared.attempts.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(*self.shared.connect_delay.lock().unwrap());
        if self.shared.refuse.load(Ordering::SeqCst) {
            return Err(Error::transport(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "refused",
            )));
        }
        self.shared.hung_up.store(false, Ordering::SeqCst);
        Ok(Box::new(FakeTransport {
            shared: Arc::clone(&self.shared),
        }))
    }
    fn peer(&self) -> String {
        "fake:514".to_string()
    }
}

struct FakeTransport {
    shared: Arc<Shared>,
}

impl Transport for FakeTransport {
    fn send(&mut self, msg: &FormattedMessage) -> Result<()> {
        let index = self.shared.writes.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(*self.shared.write_delay.lock().unwrap());
        if self.shared.failing_writes.lock().unwrap().contains(&index) {
            return Err(Error::transport(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "broken pipe",
            )));
        }
        self.shared.sent.lock().unwrap().push(msg.to_string());
        Ok(())
    }
    fn is_closed(&mut self) -> bool {
        self.shared.hung_up.load(Ordering::SeqCst)
    }
}
