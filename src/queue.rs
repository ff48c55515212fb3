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

//! The outbound queue.
//!
//! Messages wait here, in order, until the transport acknowledges them. The head of the queue may
//! be "in flight" (written, not yet acknowledged); nothing else ever is.

use crate::{
    config::{Delivery, OverflowPolicy},
    formatter::FormattedMessage,
};

use std::collections::VecDeque;

/// FIFO of formatted messages, owned by the worker thread.
#[derive(Debug)]
pub struct OutboundQueue {
    messages: VecDeque<FormattedMessage>,
    in_flight: bool,
    capacity: Option<usize>,
    overflow: OverflowPolicy,
}

impl OutboundQueue {
    pub fn new(capacity: Option<usize>, overflow: OverflowPolicy) -> OutboundQueue {
        OutboundQueue {
            messages: VecDeque::new(),
            in_flight: false,
            capacity,
            overflow,
        }
    }

    /// Number of messages held, including one in flight.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Append `msg`. If the queue is at capacity, one message is given up on according to the
    /// overflow policy & returned. The in-flight message is never evicted.
    pub fn push(&mut self, msg: FormattedMessage) -> Option<FormattedMessage> {
        let full = self
            .capacity
            .map_or(false, |cap| self.messages.len() >= cap);
        if !full {
            self.messages.push_back(msg);
            return None;
        }
        match self.overflow {
            OverflowPolicy::DropNewest => Some(msg),
            OverflowPolicy::DropOldest => {
                let oldest = if self.in_flight { 1 } else { 0 };
                match self.messages.remove(oldest) {
                    Some(evicted) => {
                        self.messages.push_back(msg);
                        Some(evicted)
                    }
                    // capacity one & that one is being written
                    None => Some(msg),
                }
            }
        }
    }

    /// If nothing is in flight, mark the head as in flight & return (a cheap copy of) it.
    pub fn start_next(&mut self) -> Option<FormattedMessage> {
        if self.in_flight {
            return None;
        }
        let head = self.messages.front()?.clone();
        self.in_flight = true;
        Some(head)
    }

    /// The in-flight message was written; remove it.
    pub fn acknowledge(&mut self) -> Option<FormattedMessage> {
        if !self.in_flight {
            return None;
        }
        self.in_flight = false;
        self.messages.pop_front()
    }

    /// The connection failed while the head was in flight. Under at-most-once delivery the head is
    /// dropped (and returned); under at-least-once it becomes pending again.
    pub fn abandon(&mut self, delivery: Delivery) -> Option<FormattedMessage> {
        if !self.in_flight {
            return None;
        }
        self.in_flight = false;
        match delivery {
            Delivery::AtMostOnce => self.messages.pop_front(),
            Delivery::AtLeastOnce => None,
        }
    }
}

#[cfg(test)]
mod test {

    use super::*;

    fn msg(text: &str) -> FormattedMessage {
        FormattedMessage::new(format!("{}\n", text).into_bytes())
    }

    fn texts(q: &OutboundQueue) -> Vec<String> {
        q.messages.iter().map(|m| m.to_string()).collect()
    }

    #[test]
    fn fifo_single_flight() {
        let mut q = OutboundQueue::new(None, OverflowPolicy::DropOldest);
        assert!(q.start_next().is_none());
        for t in ["a", "b", "c"] {
            assert!(q.push(msg(t)).is_none());
        }
        assert_eq!(q.start_next().unwrap().to_string(), "a");
        // Only ever one in flight
        assert!(q.start_next().is_none());
        assert_eq!(q.len(), 3);
        assert_eq!(q.acknowledge().unwrap().to_string(), "a");
        assert!(q.acknowledge().is_none());
        assert_eq!(q.start_next().unwrap().to_string(), "b");
        assert_eq!(q.acknowledge().unwrap().to_string(), "b");
        assert_eq!(q.start_next().unwrap().to_string(), "c");
        assert_eq!(q.acknowledge().unwrap().to_string(), "c");
        assert!(q.is_empty());
        assert!(!q.is_in_flight());
    }

    #[test]
    fn abandon() {
        let mut q = OutboundQueue::new(None, OverflowPolicy::DropOldest);
        q.push(msg("a"));
        q.push(msg("b"));

        q.start_next();
        assert!(q.abandon(Delivery::AtLeastOnce).is_none());
        assert_eq!(texts(&q), vec!["a", "b"]);
        assert_eq!(q.start_next().unwrap().to_string(), "a");

        assert_eq!(q.abandon(Delivery::AtMostOnce).unwrap().to_string(), "a");
        assert_eq!(texts(&q), vec!["b"]);
        assert!(!q.is_in_flight());
        // nothing in flight, nothing to abandon
        assert!(q.abandon(Delivery::AtMostOnce).is_none());
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn overflow_drop_oldest() {
        let mut q = OutboundQueue::new(Some(3), OverflowPolicy::DropOldest);
        for t in ["a", "b", "c"] {
            assert!(q.push(msg(t)).is_none());
        }
        assert_eq!(q.push(msg("d")).unwrap().to_string(), "a");
        assert_eq!(texts(&q), vec!["b", "c", "d"]);

        // The in-flight head survives
        q.start_next();
        assert_eq!(q.push(msg("e")).unwrap().to_string(), "c");
        assert_eq!(texts(&q), vec!["b", "d", "e"]);
        assert_eq!(q.acknowledge().unwrap().to_string(), "b");
    }

    #[test]
    fn overflow_drop_newest() {
        let mut q = OutboundQueue::new(Some(2), OverflowPolicy::DropNewest);
        q.push(msg("a"));
        q.push(msg("b"));
        assert_eq!(q.push(msg("c")).unwrap().to_string(), "c");
        assert_eq!(texts(&q), vec!["a", "b"]);
    }

    #[test]
    fn overflow_capacity_one_in_flight() {
        let mut q = OutboundQueue::new(Some(1), OverflowPolicy::DropOldest);
        q.push(msg("a"));
        q.start_next();
        assert_eq!(q.push(msg("b")).unwrap().to_string(), "b");
        assert_eq!(texts(&q), vec!["a"]);
    }
}
