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

//! The delivery loop.
//!
//! Each logger runs one worker thread. Everything that touches the outbound queue or the
//! connection happens there, in the order the [`Command`]s arrive: records from callers, flush &
//! shutdown requests from the owner, and [`LinkEvent`]s from the connection's link thread. Since
//! only the worker ever sees that state, nothing guards it.
//!
//! The loop keeps at most one write outstanding: the head of the queue is handed to the link,
//! and the next message isn't until the link reports the write complete.

use crate::{
    config::{Delivery, LoggerConfig},
    connection::{ConnectionManager, LinkEvent},
    error::{Error, Result},
    queue::OutboundQueue,
    record::LogRecord,
    rfc5424::Rfc5424,
    transport::Connector,
};

use backtrace::Backtrace;
use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::{debug, trace, warn};

use std::{
    sync::Arc,
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

/// Messages to the worker thread.
#[derive(Debug)]
pub enum Command {
    Record(LogRecord),
    /// Reply `true` once the queue is empty, `false` if the connection fails first.
    Flush(Sender<bool>),
    /// Stop taking records, deliver what can be delivered, reply & exit.
    Shutdown(Sender<()>),
    /// Something happened on link `generation`.
    Link { generation: u64, event: LinkEvent },
}

/// Minimum interval between two warnings about overflow drops.
const DROP_WARN_INTERVAL: Duration = Duration::from_secs(5);

/// Counts messages lost to queue overflow & reports them, at most once per interval.
#[derive(Debug, Default)]
struct DropReporter {
    dropped: u64,
    last_warned: Option<Instant>,
}

impl DropReporter {
    fn record(&mut self) {
        self.dropped += 1;
    }

    fn warn_if_due(&mut self) {
        if self.dropped > 0
            && self
                .last_warned
                .map_or(true, |at| at.elapsed() >= DROP_WARN_INTERVAL)
        {
            self.flush();
        }
    }

    fn flush(&mut self) {
        if self.dropped > 0 {
            warn!(dropped = self.dropped, "outbound queue full; messages dropped");
            self.dropped = 0;
            self.last_warned = Some(Instant::now());
        }
    }
}

/// The state owned by the worker thread.
pub struct Worker {
    formatter: Rfc5424,
    queue: OutboundQueue,
    connection: ConnectionManager,
    delivery: Delivery,
    flush_waiters: Vec<Sender<bool>>,
    /// Set once a shutdown has been requested
    closing: Option<Sender<()>>,
    finished: bool,
    drops: DropReporter,
}

impl Worker {
    /// `events` must feed the channel this worker will be run on; link threads report there.
    pub fn new(
        config: &LoggerConfig,
        connector: Arc<dyn Connector>,
        events: Sender<Command>,
    ) -> Worker {
        Worker {
            formatter: Rfc5424::builder()
                .token(config.endpoint.token.clone())
                .time_zone(config.endpoint.time_zone)
                .with_bom(config.with_bom)
                .build(),
            queue: OutboundQueue::new(config.queue_capacity, config.overflow),
            connection: ConnectionManager::new(connector, events),
            delivery: config.delivery,
            flush_waiters: Vec::new(),
            closing: None,
            finished: false,
            drops: DropReporter::default(),
        }
    }

    /// Process one command.
    pub fn handle(&mut self, cmd: Command) {
        match cmd {
            Command::Record(record) => self.on_record(record),
            Command::Flush(reply) => self.on_flush(reply),
            Command::Shutdown(reply) => self.on_shutdown(reply),
            Command::Link { generation, event } => {
                match self.connection.on_event(generation, event) {
                    Some(LinkEvent::Connected) => self.drain(),
                    Some(LinkEvent::Wrote) => {
                        self.queue.acknowledge();
                        self.drain();
                    }
                    Some(LinkEvent::Disconnected(_)) => self.on_disconnected(),
                    None => (),
                }
            }
        }
        self.drops.warn_if_due();
    }

    /// Process commands until shut down.
    pub fn run(mut self, commands: Receiver<Command>) {
        while let Ok(cmd) = commands.recv() {
            self.handle(cmd);
            if self.finished {
                break;
            }
        }
        debug!("worker exiting");
    }

    fn on_record(&mut self, record: LogRecord) {
        if self.closing.is_some() || self.finished {
            trace!("logger closing; record dropped");
            return;
        }
        let msg = match self.formatter.format(&record) {
            Ok(msg) => msg,
            Err(err) => {
                trace!(error = %err, "record dropped");
                return;
            }
        };
        if self.queue.push(msg).is_some() {
            self.drops.record();
        }
        self.make_progress();
    }

    /// Connect if we have to, write if we can.
    fn make_progress(&mut self) {
        if self.connection.is_disconnected() {
            if !self.connection.connect() {
                self.on_unreachable();
            }
        } else {
            self.drain();
        }
    }

    /// Hand the head of the queue to the link, if connected & nothing's already in flight.
    fn drain(&mut self) {
        if !self.connection.is_connected() {
            return;
        }
        match self.queue.start_next() {
            Some(msg) => {
                if !self.connection.write(msg) {
                    // Never reached the link, so not sent; the link's own report of its demise is
                    // on the way.
                    self.queue.abandon(Delivery::AtLeastOnce);
                }
            }
            None if self.queue.is_empty() => self.on_drained(),
            None => (),
        }
    }

    fn on_drained(&mut self) {
        for waiter in self.flush_waiters.drain(..) {
            let _ = waiter.send(true);
        }
        if self.closing.is_some() {
            self.finish();
        }
    }

    fn on_disconnected(&mut self) {
        if self.queue.abandon(self.delivery).is_some() {
            warn!("connection lost mid-write; message may not have been delivered");
        }
        self.on_unreachable();
    }

    /// No connection, & none coming until the next record, flush or close.
    fn on_unreachable(&mut self) {
        for waiter in self.flush_waiters.drain(..) {
            let _ = waiter.send(false);
        }
        if self.closing.is_some() {
            self.finish();
        }
    }

    fn on_flush(&mut self, reply: Sender<bool>) {
        if self.queue.is_empty() {
            let _ = reply.send(true);
            return;
        }
        self.flush_waiters.push(reply);
        self.make_progress();
    }

    fn on_shutdown(&mut self, reply: Sender<()>) {
        if self.finished {
            let _ = reply.send(());
            return;
        }
        self.closing = Some(reply);
        if self.queue.is_empty() {
            self.finish();
        } else {
            self.make_progress();
        }
    }

    fn finish(&mut self) {
        self.drops.flush();
        if !self.queue.is_empty() {
            warn!(
                undelivered = self.queue.len(),
                "closing with messages still queued"
            );
        }
        for waiter in self.flush_waiters.drain(..) {
            let _ = waiter.send(false);
        }
        self.connection.disconnect();
        if let Some(reply) = self.closing.take() {
            let _ = reply.send(());
        }
        self.finished = true;
    }
}

/// Start a worker thread for `config`, returning the sender its commands go to.
pub fn spawn(
    config: &LoggerConfig,
    connector: Arc<dyn Connector>,
) -> Result<(Sender<Command>, JoinHandle<()>)> {
    let (tx, rx) = unbounded();
    let worker = Worker::new(config, connector, tx.clone());
    let handle = thread::Builder::new()
        .name(format!("socket-logger.{}", config.endpoint.host))
        .spawn(move || worker.run(rx))
        .map_err(|err| Error::Spawn {
            source: err,
            back: Backtrace::new(),
        })?;
    Ok((tx, handle))
}
