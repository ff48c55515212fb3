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

//! The syslog transport layer.
//!
//! This module defines the [`Transport`] trait that an established connection must support, the
//! [`Connector`] trait that establishes one, and the TCP (optionally TLS) implementations of both.
//!
//! Everything in here blocks; the [connection manager](crate::connection) runs it on a dedicated
//! thread so that the logger's worker never does.

use crate::{
    config::LoggerConfig,
    error::{Error, Result},
    formatter::FormattedMessage,
};

use backtrace::Backtrace;
use native_tls::{TlsConnector, TlsStream};

use std::{
    io::{ErrorKind, Read, Write},
    net::{TcpStream, ToSocketAddrs},
    time::Duration,
};

/// Upper bound on the reads one idle check will make.
const MAX_IDLE_READS: usize = 64;

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                      transport mechanisms                                      //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// Operations an established connection must support.
pub trait Transport: Send {
    /// Write `msg` in its entirety & flush it to the peer.
    ///
    /// Returning `Ok` is the write acknowledgment: the bytes have been handed to the OS. It does
    /// _not_ mean the collector has them.
    fn send(&mut self, msg: &FormattedMessage) -> Result<()>;
    /// Check, without blocking, whether the peer has gone away. Called while idle, so that a
    /// collector hanging up is noticed before the next message is written into the void.
    fn is_closed(&mut self) -> bool {
        false
    }
}

/// Establishes connections.
///
/// [`TcpConnector`] is what the logger uses unless told otherwise; the trait exists so that other
/// transports (or test doubles) can be substituted.
pub trait Connector: Send + Sync + 'static {
    /// Connect (and handshake, if need be). Blocks until the transport is ready for writes.
    fn connect(&self) -> Result<Box<dyn Transport>>;
    /// A human-readable description of the peer, for diagnostics.
    fn peer(&self) -> String;
}

/// An established TCP connection, possibly wrapped in TLS.
pub enum ActiveConnection {
    PlainTcp(TcpStream),
    Tls(Box<TlsStream<TcpStream>>),
}

impl ActiveConnection {
    fn tcp(&self) -> &TcpStream {
        match self {
            ActiveConnection::PlainTcp(stream) => stream,
            ActiveConnection::Tls(stream) => stream.get_ref(),
        }
    }
}

impl Transport for ActiveConnection {
    fn send(&mut self, msg: &FormattedMessage) -> Result<()> {
        let writer: &mut dyn Write = match self {
            ActiveConnection::PlainTcp(stream) => stream,
            ActiveConnection::Tls(stream) => stream.as_mut(),
        };
        writer.write_all(msg).map_err(Error::transport)?;
        writer.flush().map_err(Error::transport)
    }

    fn is_closed(&mut self) -> bool {
        if self.tcp().set_nonblocking(true).is_err() {
            return true;
        }
        // Consume whatever the collector sent (TLS records included) so a FIN behind it shows up.
        let reader: &mut dyn Read = match self {
            ActiveConnection::PlainTcp(stream) => stream,
            ActiveConnection::Tls(stream) => stream.as_mut(),
        };
        let closed = peer_closed(reader);
        closed || self.tcp().set_nonblocking(false).is_err()
    }
}

/// Drain whatever's readable from a nonblocking `reader`; true on end-of-stream or error.
fn peer_closed(reader: &mut dyn Read) -> bool {
    let mut buf = [0u8; 512];
    for _ in 0..MAX_IDLE_READS {
        match reader.read(&mut buf) {
            Ok(0) => return true,
            Ok(_) => (),
            Err(err) if err.kind() == ErrorKind::WouldBlock => return false,
            Err(err) if err.kind() == ErrorKind::Interrupted => (),
            Err(_) => return true,
        }
    }
    false
}

/// Connects over TCP to `host:port`, upgrading to TLS immediately if so configured.
///
/// TLS uses the platform's trust store & verifies the certificate against `host`.
#[derive(Clone, Debug)]
pub struct TcpConnector {
    peer: String,
    host: String,
    port: u16,
    tls: bool,
    connect_timeout: Duration,
    write_timeout: Option<Duration>,
    accept_invalid_certs: bool,
}

impl TcpConnector {
    pub fn new(config: &LoggerConfig) -> TcpConnector {
        TcpConnector {
            peer: config.endpoint.to_string(),
            host: config.endpoint.host.clone(),
            port: config.endpoint.port,
            tls: config.endpoint.tls,
            connect_timeout: config.connect_timeout,
            write_timeout: config.write_timeout,
            accept_invalid_certs: false,
        }
    }

    /// Skip certificate & hostname verification; for testing against self-signed collectors.
    #[cfg(test)]
    fn accepting_invalid_certs(mut self) -> TcpConnector {
        self.accept_invalid_certs = true;
        self
    }

    fn tls_connector(&self) -> Result<TlsConnector> {
        let mut builder = TlsConnector::builder();
        if self.accept_invalid_certs {
            builder.danger_accept_invalid_certs(true);
            builder.danger_accept_invalid_hostnames(true);
        }
        builder.build().map_err(|err| Error::Tls {
            source: Box::new(err),
            back: Backtrace::new(),
        })
    }

    /// Try each address `host` resolves to, in turn.
    fn connect_tcp(&self) -> Result<TcpStream> {
        let addrs = (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(Error::transport)?;
        let mut last_err = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.connect_timeout) {
                Ok(stream) => return Ok(stream),
                Err(err) => last_err = Some(err),
            }
        }
        Err(Error::transport(last_err.unwrap_or_else(|| {
            std::io::Error::new(
                ErrorKind::NotFound,
                format!("{} resolved to no addresses", self.host),
            )
        })))
    }
}

impl Connector for TcpConnector {
    fn connect(&self) -> Result<Box<dyn Transport>> {
        let stream = self.connect_tcp()?;
        stream.set_nodelay(true).map_err(Error::transport)?;
        if !self.tls {
            stream
                .set_write_timeout(self.write_timeout)
                .map_err(Error::transport)?;
            return Ok(Box::new(ActiveConnection::PlainTcp(stream)));
        }

        // Bound the handshake by the connect timeout, then put the socket back the way writes
        // want it.
        stream
            .set_read_timeout(Some(self.connect_timeout))
            .map_err(Error::transport)?;
        stream
            .set_write_timeout(Some(self.connect_timeout))
            .map_err(Error::transport)?;
        let stream = self
            .tls_connector()?
            .connect(&self.host, stream)
            .map_err(|err| Error::Tls {
                source: Box::new(err),
                back: Backtrace::new(),
            })?;
        let tcp = stream.get_ref();
        tcp.set_read_timeout(None).map_err(Error::transport)?;
        tcp.set_write_timeout(self.write_timeout)
            .map_err(Error::transport)?;
        Ok(Box::new(ActiveConnection::Tls(Box::new(stream))))
    }

    fn peer(&self) -> String {
        self.peer.clone()
    }
}
