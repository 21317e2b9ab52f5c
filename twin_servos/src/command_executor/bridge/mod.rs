use std::io;

use commands::BridgeCommand;
use serial_bridge::{Bridge, Message};
use utilities::{command_executor::DeviceHandler, lazy_serial::LazySerialPort};

use crate::config::SerialConfig;

pub mod command_sender;
pub mod commands;

pub struct BridgeHandler {
    port: LazySerialPort,
    bridge: Bridge,
}

impl DeviceHandler for BridgeHandler {
    type Command = BridgeCommand;
}

impl BridgeHandler {
    pub fn new(bridge: Bridge, port: LazySerialPort) -> Self {
        Self { port, bridge }
    }

    pub fn from_config(config: &SerialConfig) -> Self {
        let port = LazySerialPort::new(
            config.port.clone(),
            config.baud_rate,
            config.max_retries,
            config.read_timeout(),
            config.startup_delay(),
        );

        Self::new(Bridge::new(config.settle_time()), port)
    }

    pub fn write_and_read(&mut self, message: &Message) -> io::Result<String> {
        self.bridge.write_and_read(&mut self.port, message)
    }

    pub fn close(&mut self) {
        self.port.close();
    }
}
