// This file is part of ts_thrust_jig.
//
// Developed for the Vera Rubin Observatory Systems.
// This product includes software developed by the LSST Project
// (https://www.lsst.org).
// See the COPYRIGHT file at the top-level directory of this distribution
// for details of code ownership.
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use log::{debug, info};
use serialport::SerialPort;
use std::io::{ErrorKind, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

use crate::constants::TERMINATOR;
use crate::error::JigError;

/// Duplex line-oriented channel to the jig. Every read blocks up to the read
/// timeout. Closing the channel is the only way to abort a blocked run.
pub trait LineChannel {
    /// Set the timeout of every blocking read.
    fn set_read_timeout(&mut self, timeout: Duration) -> Result<(), JigError>;

    /// Write one line. The terminator is appended.
    fn write_line(&mut self, line: &str) -> Result<(), JigError>;

    /// Read one line without the terminator.
    fn read_line(&mut self) -> Result<String, JigError>;

    /// Close the channel. Any later read or write fails.
    fn close(&mut self);
}

/// Byte stream with a configurable read timeout.
pub trait TimeoutStream: Read + Write {
    fn set_stream_timeout(&mut self, timeout: Duration) -> std::io::Result<()>;

    /// Shut down the stream. The default does nothing.
    fn shutdown_stream(&mut self) {}
}

impl TimeoutStream for TcpStream {
    fn set_stream_timeout(&mut self, timeout: Duration) -> std::io::Result<()> {
        self.set_read_timeout(Some(timeout))
    }

    fn shutdown_stream(&mut self) {
        // Ignore the possible error.
        let _ = self.shutdown(Shutdown::Both);
    }
}

impl TimeoutStream for Box<dyn SerialPort> {
    fn set_stream_timeout(&mut self, timeout: Duration) -> std::io::Result<()> {
        self.set_timeout(timeout).map_err(std::io::Error::from)
    }
}

pub struct StreamLineChannel<S: TimeoutStream> {
    _name: String,
    _stream: Option<S>,
    // Buffer to read the received line.
    _buffer: Vec<u8>,
}

impl<S: TimeoutStream> StreamLineChannel<S> {
    /// Create a new line channel over the stream.
    ///
    /// # Arguments
    /// * `name` - Name of the channel used in the log.
    /// * `stream` - Connected stream.
    /// * `timeout` - Read timeout.
    ///
    /// # Returns
    /// A new line channel.
    pub fn new(name: &str, stream: S, timeout: Duration) -> Result<Self, JigError> {
        const DEFAULT_BUFFER_SIZE: usize = 100;

        let mut channel = Self {
            _name: String::from(name),
            _stream: Some(stream),
            _buffer: Vec::with_capacity(DEFAULT_BUFFER_SIZE),
        };
        channel.set_read_timeout(timeout)?;

        Ok(channel)
    }

    /// Check if the channel is open.
    pub fn is_open(&self) -> bool {
        self._stream.is_some()
    }

    fn stream(&mut self) -> Result<&mut S, JigError> {
        let name = &self._name;
        self._stream
            .as_mut()
            .ok_or_else(|| JigError::Transport(format!("{name} is closed")))
    }

    /// Close the stream after a failure and create the error.
    fn fail(&mut self, reason: String) -> JigError {
        self.close();
        JigError::Transport(reason)
    }
}

impl<S: TimeoutStream> LineChannel for StreamLineChannel<S> {
    fn set_read_timeout(&mut self, timeout: Duration) -> Result<(), JigError> {
        let name = self._name.clone();
        self.stream()?
            .set_stream_timeout(timeout)
            .map_err(|error| JigError::Transport(format!("{name} fails to set the timeout: {error}")))
    }

    fn write_line(&mut self, line: &str) -> Result<(), JigError> {
        let mut data = Vec::with_capacity(line.len() + TERMINATOR.len());
        data.extend_from_slice(line.as_bytes());
        data.extend_from_slice(TERMINATOR);

        let stream = self.stream()?;
        let result = stream.write_all(&data).and_then(|_| stream.flush());
        match result {
            Ok(()) => {
                debug!("{} sends: {}.", self._name, line);
                Ok(())
            }
            Err(error) => {
                let reason = format!("{} fails to write: {error}", self._name);
                Err(self.fail(reason))
            }
        }
    }

    fn read_line(&mut self) -> Result<String, JigError> {
        // Always clear the buffer before reading the data. A partial line left
        // by a timeout is dropped.
        self._buffer.clear();

        let mut byte = [0; 1];
        loop {
            let stream = self.stream()?;
            match stream.read(&mut byte) {
                Ok(0) => {
                    let reason = format!("{} is disconnected", self._name);
                    return Err(self.fail(reason));
                }

                Ok(_) => {
                    self._buffer.push(byte[0]);
                    if self._buffer.ends_with(TERMINATOR) {
                        break;
                    }
                }

                Err(error) if error.kind() == ErrorKind::Interrupted => {}

                Err(error) => {
                    let reason = match error.kind() {
                        ErrorKind::TimedOut | ErrorKind::WouldBlock => {
                            format!("{} read timed out", self._name)
                        }
                        _ => format!("{} fails to read: {error}", self._name),
                    };
                    return Err(self.fail(reason));
                }
            }
        }

        let mut end = self._buffer.len() - TERMINATOR.len();
        if end > 0 && self._buffer[end - 1] == b'\r' {
            end -= 1;
        }

        match String::from_utf8(self._buffer[..end].to_vec()) {
            Ok(line) => {
                debug!("{} receives: {}.", self._name, line);
                Ok(line)
            }
            Err(_) => {
                let reason = format!("{} receives a line that is not UTF-8", self._name);
                Err(self.fail(reason))
            }
        }
    }

    fn close(&mut self) {
        if let Some(mut stream) = self._stream.take() {
            // Ignore the possible error.
            let _ = stream.flush();
            stream.shutdown_stream();

            info!("{} is closed.", self._name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::BufRead;
    use std::io::BufReader;
    use std::net::TcpListener;

    const TIMEOUT: Duration = Duration::from_millis(100);

    fn create_channel() -> (StreamLineChannel<TcpStream>, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("Tcp listener should bind.");
        let port = listener.local_addr().unwrap().port();

        let client = TcpStream::connect(format!("127.0.0.1:{port}")).expect("Tcp stream should connect.");
        let (server, _) = listener.accept().expect("Tcp listener should accept.");

        (
            StreamLineChannel::new("jig", client, TIMEOUT).unwrap(),
            server,
        )
    }

    #[test]
    fn test_write_line() {
        let (mut channel, server) = create_channel();

        channel.write_line("Run test").unwrap();
        channel.write_line("0,0,0,0,0").unwrap();

        let mut reader = BufReader::new(server);
        let mut line = String::new();
        reader.read_line(&mut line).unwrap();
        assert_eq!(line, "Run test\n");

        line.clear();
        reader.read_line(&mut line).unwrap();
        assert_eq!(line, "0,0,0,0,0\n");
    }

    #[test]
    fn test_read_line() {
        let (mut channel, mut server) = create_channel();

        server.write_all(b"Ready\r\n1,2,3\nStopped\n").unwrap();
        server.flush().unwrap();

        assert_eq!(channel.read_line().unwrap(), "Ready");
        assert_eq!(channel.read_line().unwrap(), "1,2,3");
        assert_eq!(channel.read_line().unwrap(), "Stopped");
    }

    #[test]
    fn test_read_line_empty() {
        let (mut channel, mut server) = create_channel();

        server.write_all(b"\n\r\n").unwrap();

        assert_eq!(channel.read_line().unwrap(), "");
        assert_eq!(channel.read_line().unwrap(), "");
    }

    #[test]
    fn test_read_line_timeout() {
        let (mut channel, mut server) = create_channel();

        // Partial line without the terminator.
        server.write_all(b"12000,40").unwrap();

        assert!(matches!(
            channel.read_line(),
            Err(JigError::Transport(reason)) if reason == "jig read timed out"
        ));
        assert!(!channel.is_open());

        // Closed after the failure.
        assert!(channel.read_line().is_err());
        assert!(channel.write_line("Run test").is_err());
    }

    #[test]
    fn test_read_line_disconnected() {
        let (mut channel, server) = create_channel();

        server.shutdown(Shutdown::Both).unwrap();

        assert!(matches!(
            channel.read_line(),
            Err(JigError::Transport(reason)) if reason == "jig is disconnected"
        ));
    }

    #[test]
    fn test_read_line_not_utf8() {
        let (mut channel, mut server) = create_channel();

        server.write_all(&[0xff, 0xfe, b'\n']).unwrap();

        assert!(channel.read_line().unwrap_err().is_transport());
        assert!(!channel.is_open());
    }

    #[test]
    fn test_close() {
        let (mut channel, server) = create_channel();

        channel.close();
        assert!(!channel.is_open());

        // The peer sees the end of the stream.
        let mut reader = BufReader::new(server);
        let mut line = String::new();
        assert_eq!(reader.read_line(&mut line).unwrap(), 0);

        // Safe to close twice.
        channel.close();
        assert!(channel.set_read_timeout(TIMEOUT).is_err());
    }
}
