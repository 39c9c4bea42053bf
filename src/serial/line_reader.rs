//! Line assembly over a byte-oriented serial port.

use bytes::BytesMut;
use std::time::Duration;
use tokio::time::timeout;
use tracing::warn;

use super::port_trait::SerialPortIO;
use crate::error::{BeaconError, Result};

/// Bytes requested per read
pub const READ_CHUNK_SIZE: usize = 256;

/// NMEA sentences are at most 82 characters; anything far beyond that
/// without a newline is line noise
const MAX_LINE_BYTES: usize = 1024;

/// Splits the serial byte stream into `\n`-terminated lines
pub struct LineReader {
    port: Box<dyn SerialPortIO>,
    buffer: BytesMut,
}

impl LineReader {
    /// Wrap `port`, starting with bytes already read from it
    pub fn new(port: Box<dyn SerialPortIO>, initial: &[u8]) -> Self {
        let mut buffer = BytesMut::with_capacity(MAX_LINE_BYTES);
        buffer.extend_from_slice(initial);
        Self { port, buffer }
    }

    /// Next complete line, including its terminator
    ///
    /// Returns `Ok(None)` when no line completed within `read_timeout`;
    /// partial data stays buffered for the next call.
    ///
    /// # Errors
    ///
    /// - `NoFixSentence` when the stream has ended
    /// - `Serial` when the underlying read fails
    pub async fn next_line(&mut self, read_timeout: Duration) -> Result<Option<String>> {
        loop {
            if let Some(end) = self.buffer.iter().position(|&b| b == b'\n') {
                let line = self.buffer.split_to(end + 1);
                return Ok(Some(String::from_utf8_lossy(&line).into_owned()));
            }

            if self.buffer.len() > MAX_LINE_BYTES {
                warn!("Discarding {} bytes without a line terminator", self.buffer.len());
                self.buffer.clear();
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let n = match timeout(read_timeout, self.port.read(&mut chunk)).await {
                Err(_) => return Ok(None),
                Ok(read) => read
                    .map_err(|e| BeaconError::Serial(format!("Failed to read line: {}", e)))?,
            };

            if n == 0 {
                if self.buffer.is_empty() {
                    return Err(BeaconError::NoFixSentence(
                        "serial stream ended".to_string(),
                    ));
                }
                let rest = self.buffer.split();
                return Ok(Some(String::from_utf8_lossy(&rest).into_owned()));
            }

            self.buffer.extend_from_slice(&chunk[..n]);
        }
    }
}
