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

//! The connection manager.
//!
//! [`ConnectionManager`] owns the logger's one connection to its collector & tracks its state:
//!
//! ```text
//!                connect()             LinkEvent::Connected
//! Disconnected ────────────► Connecting ───────────────────► Connected
//!      ▲                         │                               │
//!      └─────────────────────────┴───────────────────────────────┘
//!                      LinkEvent::Disconnected(err)
//! ```
//!
//! The manager itself never blocks. Each connection gets a "link" thread that connects, performs
//! the TLS handshake if configured, then performs the writes it's handed one at a time. The link
//! reports what happened as [`LinkEvent`]s on the worker's command channel, so that every state
//! change happens on the worker thread.
//!
//! There is no reconnect timer: after a failure the manager sits in `Disconnected` until someone
//! calls [`connect`](ConnectionManager::connect) again, which the worker does when the next record
//! arrives (or on flush/close).

use crate::{
    error::Error,
    formatter::FormattedMessage,
    transport::{Connector, Transport},
    worker::Command,
};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use tracing::{debug, trace, warn};

use std::{sync::Arc, thread, time::Duration};

/// How often an idle link checks whether the collector hung up.
const IDLE_CHECK_INTERVAL: Duration = Duration::from_millis(250);

/// Starts a named thread running the given closure.
pub type Spawner = fn(String, Box<dyn FnOnce() + Send + 'static>) -> std::io::Result<()>;

fn spawn_thread(name: String, f: Box<dyn FnOnce() + Send + 'static>) -> std::io::Result<()> {
    thread::Builder::new().name(name).spawn(f).map(|_| ())
}

/// Where the connection stands.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// What a link thread reports back to the worker.
#[derive(Debug)]
pub enum LinkEvent {
    /// The transport is ready for writes.
    Connected,
    /// The last write handed to the link completed.
    Wrote,
    /// Connecting, the handshake, or a write failed; or the peer hung up. The link is gone.
    Disconnected(Error),
}

/// Owns the link to the collector. Lives on, & is only touched from, the worker thread.
pub struct ConnectionManager {
    connector: Arc<dyn Connector>,
    events: Sender<Command>,
    state: ConnectionState,
    /// Identifies the current link; events from earlier links are ignored
    generation: u64,
    link: Option<Sender<FormattedMessage>>,
    spawn: Spawner,
}

impl ConnectionManager {
    pub fn new(connector: Arc<dyn Connector>, events: Sender<Command>) -> ConnectionManager {
        ConnectionManager {
            connector,
            events,
            state: ConnectionState::Disconnected,
            generation: 0,
            link: None,
            spawn: spawn_thread,
        }
    }

    /// Start link threads with `spawn` instead.
    #[cfg(test)]
    pub fn with_spawner(mut self, spawn: Spawner) -> ConnectionManager {
        self.spawn = spawn;
        self
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    pub fn is_disconnected(&self) -> bool {
        self.state == ConnectionState::Disconnected
    }

    /// Start connecting, unless we're already connected or on the way there. False if no link
    /// could be started, in which case we're still `Disconnected` & nothing will report back.
    pub fn connect(&mut self) -> bool {
        if self.state != ConnectionState::Disconnected {
            return true;
        }
        let generation = self.generation + 1;
        let (tx, rx) = unbounded();
        let connector = Arc::clone(&self.connector);
        let events = self.events.clone();
        match (self.spawn)(
            format!("socket-logger-link-{}", generation),
            Box::new(move || run_link(generation, connector, rx, events)),
        ) {
            Ok(()) => {
                debug!(peer = %self.connector.peer(), generation, "connecting");
                self.generation = generation;
                self.state = ConnectionState::Connecting;
                self.link = Some(tx);
                true
            }
            Err(err) => {
                warn!(peer = %self.connector.peer(), error = %err, "couldn't start a link thread");
                false
            }
        }
    }

    /// Hand `msg` to the link for writing. The caller must wait for [`LinkEvent::Wrote`] before
    /// writing again. Returns false if there's no live link to take it.
    pub fn write(&mut self, msg: FormattedMessage) -> bool {
        if self.state != ConnectionState::Connected {
            return false;
        }
        self.link
            .as_ref()
            .map_or(false, |link| link.send(msg).is_ok())
    }

    /// Apply an event reported by link `generation`, returning it if it's current.
    pub fn on_event(&mut self, generation: u64, event: LinkEvent) -> Option<LinkEvent> {
        if generation != self.generation || self.state == ConnectionState::Disconnected {
            trace!(generation, ?event, "ignoring event from a defunct link");
            return None;
        }
        match &event {
            LinkEvent::Connected => {
                debug!(peer = %self.connector.peer(), generation, "connected");
                self.state = ConnectionState::Connected;
            }
            LinkEvent::Wrote => (),
            LinkEvent::Disconnected(err) => {
                warn!(peer = %self.connector.peer(), generation, error = %err, "disconnected");
                self.state = ConnectionState::Disconnected;
                self.link = None;
            }
        }
        Some(event)
    }

    /// Let go of the current link, if any. Anything it's in the middle of, it finishes alone.
    pub fn disconnect(&mut self) {
        if self.link.take().is_some() {
            debug!(peer = %self.connector.peer(), generation = self.generation, "closing");
        }
        self.state = ConnectionState::Disconnected;
    }
}

/// Body of a link thread: connect, then write whatever we're handed until something breaks or the
/// manager drops its end of `writes`.
fn run_link(
    generation: u64,
    connector: Arc<dyn Connector>,
    writes: Receiver<FormattedMessage>,
    events: Sender<Command>,
) {
    let report = |event| events.send(Command::Link { generation, event }).is_ok();

    let mut transport: Box<dyn Transport> = match connector.connect() {
        Ok(transport) => transport,
        Err(err) => {
            report(LinkEvent::Disconnected(err));
            return;
        }
    };
    if !report(LinkEvent::Connected) {
        return;
    }
    loop {
        match writes.recv_timeout(IDLE_CHECK_INTERVAL) {
            Ok(msg) => {
                if let Err(err) = transport.send(&msg) {
                    report(LinkEvent::Disconnected(err));
                    return;
                }
                if !report(LinkEvent::Wrote) {
                    return;
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                if transport.is_closed() {
                    report(LinkEvent::Disconnected(Error::transport(std::io::Error::new(
                        std::io::ErrorKind::ConnectionAborted,
                        "connection closed by peer",
                    ))));
                    return;
                }
            }
            Err(RecvTimeoutError::Disconnected) => return,
        }
    }
}
