//! Trait abstraction for serial port operations to enable testing

use async_trait::async_trait;
use std::io;
use std::time::Duration;
use tokio_serial::SerialPortBuilderExt;

use crate::config::SerialConfig;
use crate::error::{BeaconError, Result};

/// Line settings used to open a candidate port (always 8N1)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialSettings {
    pub baud_rate: u32,
    /// Upper bound for a single read
    pub timeout: Duration,
}

impl From<&SerialConfig> for SerialSettings {
    fn from(config: &SerialConfig) -> Self {
        Self {
            baud_rate: config.baud_rate,
            timeout: config.timeout(),
        }
    }
}

/// Trait for serial port I/O operations
#[async_trait]
pub trait SerialPortIO: Send {
    /// Read available bytes into `buf`, returning how many were read
    ///
    /// `Ok(0)` means the stream has ended.
    async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

/// Opens serial devices by name
#[cfg_attr(test, mockall::automock)]
pub trait PortOpener {
    /// Open `name` with the given settings
    fn open(&self, name: &str, settings: &SerialSettings) -> Result<Box<dyn SerialPortIO>>;
}

/// Wrapper around tokio_serial::SerialStream that implements SerialPortIO
pub struct TokioSerialPort {
    port: tokio_serial::SerialStream,
}

impl TokioSerialPort {
    pub fn new(port: tokio_serial::SerialStream) -> Self {
        Self { port }
    }
}

#[async_trait]
impl SerialPortIO for TokioSerialPort {
    async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        use tokio::io::AsyncReadExt;
        self.port.read(buf).await
    }
}

/// Opens real devices through tokio-serial
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSerialOpener;

impl PortOpener for TokioSerialOpener {
    fn open(&self, name: &str, settings: &SerialSettings) -> Result<Box<dyn SerialPortIO>> {
        let port = tokio_serial::new(name, settings.baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .timeout(settings.timeout)
            .open_native_async()
            .map_err(|e| BeaconError::Serial(format!("Failed to open {}: {}", name, e)))?;

        Ok(Box::new(TokioSerialPort::new(port)))
    }
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::collections::VecDeque;

    /// One scripted outcome of a `read` call
    #[derive(Debug, Clone)]
    pub enum ReadStep {
        Data(Vec<u8>),
        Fail(io::ErrorKind),
        /// Never completes; exercises the read timeout
        Stall,
    }

    /// Mock serial port replaying a fixed script, then reporting end of stream
    #[derive(Debug, Default)]
    pub struct ScriptedPort {
        steps: VecDeque<ReadStep>,
    }

    impl ScriptedPort {
        pub fn new(steps: Vec<ReadStep>) -> Self {
            Self {
                steps: steps.into(),
            }
        }

        /// Port emitting each line terminated with CRLF, one read per line
        pub fn from_lines(lines: &[&str]) -> Self {
            Self::new(
                lines
                    .iter()
                    .map(|line| ReadStep::Data(format!("{}\r\n", line).into_bytes()))
                    .collect(),
            )
        }

        pub fn boxed(steps: Vec<ReadStep>) -> Result<Box<dyn SerialPortIO>> {
            Ok(Box::new(Self::new(steps)))
        }
    }

    #[async_trait]
    impl SerialPortIO for ScriptedPort {
        async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.steps.pop_front() {
                None => Ok(0),
                Some(ReadStep::Data(mut data)) => {
                    let n = data.len().min(buf.len());
                    buf[..n].copy_from_slice(&data[..n]);
                    if n < data.len() {
                        self.steps.push_front(ReadStep::Data(data.split_off(n)));
                    }
                    Ok(n)
                }
                Some(ReadStep::Fail(kind)) => Err(io::Error::new(kind, "Mock read error")),
                Some(ReadStep::Stall) => std::future::pending().await,
            }
        }
    }
}
