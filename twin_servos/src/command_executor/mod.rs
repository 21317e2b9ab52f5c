use std::io;

use crate::models::ServoCommand;

pub mod bridge;

/// Request/response link to the servo sketch.
///
/// Every `send` completes before the next one starts, so commands reach
/// the board in the order they were issued.
pub trait CommandChannel {
    async fn send(&mut self, command: ServoCommand) -> io::Result<String>;
}
