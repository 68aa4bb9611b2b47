/*
 * Copyright (c):
 * 2026 zephyrj
 * zephyrj@protonmail.com
 *
 * This file is part of setup-crane.
 *
 * setup-crane is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * setup-crane is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with setup-crane. If not, see <https://www.gnu.org/licenses/>.
 */

use std::fmt::Display;
use std::io;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread;
use tracing::{error, info, warn};

pub const GREETING: &'static [u8] = b"Welcome to AVN PRO Server!\n";
const ACK_PREFIX: &'static [u8] = b"OK: ";
const READ_BUF_SIZE: usize = 1024;

/// Connectivity test server. Every client is greeted and then gets each chunk it sends
/// echoed back prefixed with `OK: `. Clients are served on their own thread and share
/// nothing.
pub struct EchoServer {
    listener: TcpListener
}

impl EchoServer {
    pub fn bind(host: &str, port: u16) -> io::Result<EchoServer> {
        info!("Server is starting on port {}", port);
        let listener = TcpListener::bind((host, port))?;
        info!("Server is listening on {}", listener.local_addr()?);
        Ok(EchoServer { listener })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until the listener fails
    pub fn serve(self) -> io::Result<()> {
        loop {
            let (stream, peer) = match self.listener.accept() {
                Ok(conn) => conn,
                Err(e) => {
                    error!("Failed to accept connection. {}", e.to_string());
                    return Err(e);
                }
            };
            let spawn_result = thread::Builder::new()
                .name(format!("client-{}", peer))
                .spawn(move || handle_connection(stream, peer));
            if let Err(e) = spawn_result {
                warn!("Couldn't start a thread for {}. {}", peer, e.to_string());
            }
        }
    }
}

fn handle_connection(stream: TcpStream, peer: SocketAddr) {
    info!("{} connected", peer);
    match handle_client(stream, &peer) {
        Ok(_) => info!("{} disconnected", peer),
        Err(e) => warn!("{} dropped. {}", peer, e.to_string())
    }
}

/// Greet, then acknowledge every chunk read until the client hangs up
pub fn handle_client<S: Read + Write>(mut stream: S, peer: &dyn Display) -> io::Result<()> {
    stream.write_all(GREETING)?;
    let mut buf = [0u8; READ_BUF_SIZE];
    loop {
        let n = stream.read(&mut buf)?;
        if n == 0 {
            return Ok(());
        }
        let data = &buf[..n];
        info!("[{}] {}", peer, String::from_utf8_lossy(data).trim());
        let mut reply = Vec::with_capacity(ACK_PREFIX.len() + n);
        reply.extend_from_slice(ACK_PREFIX);
        reply.extend_from_slice(data);
        stream.write_all(&reply)?;
    }
}
