use std::io::{Read, Write};
use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::{debug, info, warn};

/// Serial port that is opened on first use.
///
/// Boards with an auto-reset circuit (Arduino Uno and friends) reboot when
/// the port is opened, so the first read or write waits `startup_delay`
/// before touching the line.
pub struct LazySerialPort {
    path: String,
    baud_rate: u32,
    port: Option<Box<dyn SerialPort>>,
    max_retries: u32,
    read_timeout: Duration,
    startup_delay: Duration,
}

impl LazySerialPort {
    pub fn new(
        path: impl Into<String>,
        baud_rate: u32,
        max_retries: u32,
        read_timeout: Duration,
        startup_delay: Duration,
    ) -> Self {
        LazySerialPort {
            path: path.into(),
            baud_rate,
            port: None,
            max_retries,
            read_timeout,
            startup_delay,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn open(&mut self) -> std::io::Result<()> {
        for attempt in 0..=self.max_retries {
            match serialport::new(&self.path, self.baud_rate)
                .data_bits(DataBits::Eight)
                .parity(Parity::None)
                .stop_bits(StopBits::One)
                .flow_control(FlowControl::None)
                .timeout(self.read_timeout)
                .open()
            {
                Ok(port) => {
                    info!("Opened serial port {} at {} baud", self.path, self.baud_rate);

                    if !self.startup_delay.is_zero() {
                        debug!("Waiting {:?} for the board to come up", self.startup_delay);
                        std::thread::sleep(self.startup_delay);
                    }

                    port.clear(serialport::ClearBuffer::Input)?;
                    self.port = Some(port);
                    return Ok(());
                }
                Err(e) if attempt == self.max_retries => return Err(e.into()),
                Err(e) => warn!(
                    "Failed to open {} (attempt {}/{}): {}",
                    self.path,
                    attempt + 1,
                    self.max_retries + 1,
                    e
                ),
            }
        }
        Err(std::io::Error::other("Max open retries reached"))
    }

    fn ensure_open(&mut self) -> std::io::Result<&mut Box<dyn SerialPort>> {
        if self.port.is_none() {
            self.open()?;
        }

        self.port
            .as_mut()
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotConnected, "Port not open"))
    }

    pub fn close(&mut self) {
        if self.port.take().is_some() {
            info!("Closed serial port {}", self.path);
        }
    }
}

impl Read for LazySerialPort {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.ensure_open()?.read(buf)
    }
}

impl Write for LazySerialPort {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.ensure_open()?.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.ensure_open()?.flush()
    }
}
