use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use crate::{
    command_executor::CommandChannel,
    commands::{Input, InputError, parse_input},
};

pub const PROMPT: &str = "Command for servo: ";

#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    #[error(transparent)]
    Input(InputError),

    #[error("Failed to send command: {0}")]
    Channel(io::Error),

    #[error("Terminal I/O failed: {0}")]
    Terminal(io::Error),
}

/// Line-oriented prompt that forwards typed commands to the servos.
pub struct Console<C> {
    channel: C,
}

impl<C: CommandChannel> Console<C> {
    pub fn new(channel: C) -> Self {
        Self { channel }
    }

    pub fn into_inner(self) -> C {
        self.channel
    }

    /// Prompts until `exit` or end of input. Returns how many commands were
    /// sent.
    pub async fn run<R, W>(&mut self, input: R, output: &mut W) -> Result<usize, ConsoleError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        let mut sent = 0;

        loop {
            output
                .write_all(PROMPT.as_bytes())
                .await
                .map_err(ConsoleError::Terminal)?;
            output.flush().await.map_err(ConsoleError::Terminal)?;

            let Some(line) = lines.next_line().await.map_err(ConsoleError::Terminal)? else {
                debug!("End of input");
                break;
            };

            let command = match parse_input(&line) {
                Ok(Input::Empty) => continue,
                Ok(Input::Exit) => break,
                Ok(Input::Command(command)) => command,
                Err(e) if e.is_fatal() => return Err(ConsoleError::Input(e)),
                Err(e) => {
                    output
                        .write_all(format!("{}\n", e).as_bytes())
                        .await
                        .map_err(ConsoleError::Terminal)?;
                    continue;
                }
            };

            let reply = self
                .channel
                .send(command.clone())
                .await
                .map_err(ConsoleError::Channel)?;
            debug!("{} -> {:?}", command, reply);
            sent += 1;
        }

        info!("Console closed after {} commands", sent);
        Ok(sent)
    }
}
