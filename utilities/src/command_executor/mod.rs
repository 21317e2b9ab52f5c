use std::{
    io,
    sync::mpsc::{Receiver, Sender},
};

use tokio::sync::oneshot;
use tracing::{debug, warn};

/// A request that a [`DeviceHandler`] can carry out on its own thread.
pub trait Command: Send + std::fmt::Debug {
    type Response: Send;
    type Handler: DeviceHandler<Command = Self>;

    fn execute(self, handler: &mut Self::Handler) -> io::Result<Self::Response>;
}

pub trait DeviceHandler {
    type Command: Command<Handler = Self>;
}

pub struct GenericCommand<C: Command> {
    command: C,
    response_ch: oneshot::Sender<io::Result<C::Response>>,
}

impl<C: Command> GenericCommand<C> {
    pub fn new(command: C, response_ch: oneshot::Sender<io::Result<C::Response>>) -> Self {
        Self {
            command,
            response_ch,
        }
    }

    pub fn execute(self, handler: &mut C::Handler) -> io::Result<()> {
        debug!("Executing {:?}", self.command);

        let result = self.command.execute(handler);
        if let Err(e) = &result {
            warn!("Command failed: {}", e);
        }

        self.response_ch
            .send(result)
            .map_err(|_| io::Error::other("Requester dropped before the response was sent"))
    }
}

/// Owns a device handler and runs its commands one at a time, in the order
/// they were submitted.
pub struct CommandExecutor<H: DeviceHandler + Send + 'static> {
    handler: H,
    commands_ch: Receiver<GenericCommand<H::Command>>,
    sender: Sender<GenericCommand<H::Command>>,
}

impl<H: DeviceHandler + Send + 'static> CommandExecutor<H> {
    pub fn new(handler: H) -> Self {
        let (sender, commands_ch) = std::sync::mpsc::channel();

        Self {
            handler,
            commands_ch,
            sender,
        }
    }

    pub fn sender(&self) -> CommandSender<H::Command> {
        CommandSender::new(self.sender.clone())
    }

    /// Runs until every [`CommandSender`] is dropped, then hands the
    /// handler back so the caller can release the device.
    pub fn run(self) -> H {
        let Self {
            mut handler,
            commands_ch,
            sender,
        } = self;
        drop(sender);

        let mut executed = 0usize;
        while let Ok(command) = commands_ch.recv() {
            if let Err(e) = command.execute(&mut handler) {
                warn!("{}", e);
            }
            executed += 1;
        }

        debug!("Command channel closed after {} commands", executed);
        handler
    }

    pub fn spawn(self) -> tokio::task::JoinHandle<H> {
        tokio::task::spawn_blocking(move || self.run())
    }
}

pub struct CommandSender<C: Command> {
    commands_ch: Sender<GenericCommand<C>>,
}

impl<C: Command> Clone for CommandSender<C> {
    fn clone(&self) -> Self {
        Self {
            commands_ch: self.commands_ch.clone(),
        }
    }
}

impl<C: Command> CommandSender<C> {
    pub fn new(commands_ch: Sender<GenericCommand<C>>) -> Self {
        Self { commands_ch }
    }

    pub async fn send_command(&self, command: C) -> io::Result<C::Response> {
        let (response_ch, response_rx) = oneshot::channel();
        let command = GenericCommand::new(command, response_ch);

        self.commands_ch
            .send(command)
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "Command executor stopped"))?;

        response_rx
            .await
            .map_err(|_| io::Error::other("Command executor dropped the request"))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        seen: Vec<u32>,
    }

    impl DeviceHandler for Recorder {
        type Command = Record;
    }

    #[derive(Debug)]
    enum Record {
        Push(u32),
        Fail,
    }

    impl Command for Record {
        type Response = usize;
        type Handler = Recorder;

        fn execute(self, handler: &mut Recorder) -> io::Result<usize> {
            match self {
                Record::Push(value) => {
                    handler.seen.push(value);
                    Ok(handler.seen.len())
                }
                Record::Fail => Err(io::Error::new(io::ErrorKind::TimedOut, "no reply")),
            }
        }
    }

    #[tokio::test]
    async fn test_commands_run_in_submission_order() {
        let executor = CommandExecutor::new(Recorder::default());
        let sender = executor.sender();
        let handle = executor.spawn();

        for value in [3, 1, 2] {
            sender.send_command(Record::Push(value)).await.unwrap();
        }
        drop(sender);

        let handler = handle.await.unwrap();
        assert_eq!(handler.seen, vec![3, 1, 2]);
    }

    #[tokio::test]
    async fn test_handler_error_reaches_caller_and_executor_keeps_running() {
        let executor = CommandExecutor::new(Recorder::default());
        let sender = executor.sender();
        let handle = executor.spawn();

        let err = sender.send_command(Record::Fail).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);

        assert_eq!(sender.send_command(Record::Push(7)).await.unwrap(), 1);
        drop(sender);

        assert_eq!(handle.await.unwrap().seen, vec![7]);
    }

    #[tokio::test]
    async fn test_send_after_executor_stopped_fails() {
        let executor = CommandExecutor::new(Recorder::default());
        let sender = executor.sender();
        drop(executor);

        let err = sender.send_command(Record::Push(1)).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
