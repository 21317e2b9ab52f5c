use std::io;

use crate::{command_executor::CommandChannel, models::ServoCommand};

/// Channel that records every command and answers `OK`, optionally failing
/// once a given number of commands has gone through.
#[derive(Default)]
pub struct RecordingChannel {
    pub sent: Vec<ServoCommand>,
    pub fail_after: Option<usize>,
}

impl RecordingChannel {
    pub fn failing_after(count: usize) -> Self {
        Self {
            sent: Vec::new(),
            fail_after: Some(count),
        }
    }

    pub fn wire(&self) -> Vec<String> {
        self.sent.iter().map(ToString::to_string).collect()
    }
}

impl CommandChannel for RecordingChannel {
    async fn send(&mut self, command: ServoCommand) -> io::Result<String> {
        if self.fail_after == Some(self.sent.len()) {
            return Err(io::Error::new(io::ErrorKind::TimedOut, "no reply"));
        }

        self.sent.push(command);
        Ok("OK".to_string())
    }
}
