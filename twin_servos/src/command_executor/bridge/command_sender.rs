use std::io;

use utilities::command_executor::CommandSender;

use crate::{
    command_executor::{
        CommandChannel,
        bridge::commands::{BridgeCommand, BridgeResponse},
    },
    models::ServoCommand,
};

#[derive(Clone)]
pub struct BridgeCommandSender {
    sender: CommandSender<BridgeCommand>,
}

impl BridgeCommandSender {
    pub fn new(sender: CommandSender<BridgeCommand>) -> Self {
        Self { sender }
    }

    pub async fn exchange(&self, command: ServoCommand) -> io::Result<String> {
        let response = self
            .sender
            .send_command(BridgeCommand::Exchange(command))
            .await?;

        match response {
            BridgeResponse::Reply(reply) => Ok(reply),
        }
    }
}

impl CommandChannel for BridgeCommandSender {
    async fn send(&mut self, command: ServoCommand) -> io::Result<String> {
        self.exchange(command).await
    }
}
