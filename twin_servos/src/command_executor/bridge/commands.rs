use std::io;

use utilities::command_executor::Command;

use crate::{command_executor::bridge::BridgeHandler, models::ServoCommand};

#[derive(Debug, Clone)]
pub enum BridgeCommand {
    /// Write one frame and wait for the sketch's reply.
    Exchange(ServoCommand),
}

#[derive(Debug)]
pub enum BridgeResponse {
    Reply(String),
}

impl Command for BridgeCommand {
    type Response = BridgeResponse;
    type Handler = BridgeHandler;

    fn execute(self, handler: &mut Self::Handler) -> io::Result<Self::Response> {
        match self {
            BridgeCommand::Exchange(command) => {
                let reply = handler.write_and_read(&command.message())?;
                Ok(BridgeResponse::Reply(reply))
            }
        }
    }
}
