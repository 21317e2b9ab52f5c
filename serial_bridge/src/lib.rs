//! Text bridge to a microcontroller sketch that reads `<name,value>` frames
//! and answers with `<...>` frames.

use std::fmt;
use std::io::{Read, Write};
use std::time::Duration;

use tracing::{debug, trace};

pub const START_MARKER: u8 = b'<';
pub const END_MARKER: u8 = b'>';

/// Longest reply payload accepted before the frame is treated as garbage.
pub const MAX_REPLY_LEN: usize = 256;

/// One outgoing frame: a command word and its integer argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    name: String,
    value: i32,
}

impl Message {
    pub fn new(name: impl Into<String>, value: i32) -> Self {
        Message {
            name: name.into(),
            value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{},{}>", self.name, self.value)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Bridge {
    settle_time: Duration,
}

impl Bridge {
    pub fn new(settle_time: Duration) -> Self {
        Bridge { settle_time }
    }

    pub fn write(&self, sender: &mut impl Write, message: &Message) -> std::io::Result<()> {
        debug!("-> {}", message);
        sender.write_all(&message.to_bytes())?;
        sender.flush()
    }

    /// Reads the next complete `<...>` frame and returns its payload.
    ///
    /// Anything received before the start marker is dropped.
    pub fn read_reply(&self, sender: &mut impl Read) -> std::io::Result<String> {
        let mut byte = [0u8; 1];
        let mut payload = Vec::new();
        let mut in_frame = false;

        loop {
            if sender.read(&mut byte)? == 0 {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "Port closed before a complete reply",
                ));
            }

            match (in_frame, byte[0]) {
                (false, START_MARKER) => in_frame = true,
                (false, other) => trace!("Dropping byte {:#04x} outside of a frame", other),
                (true, END_MARKER) => break,
                (true, START_MARKER) => payload.clear(),
                (true, other) => {
                    if payload.len() == MAX_REPLY_LEN {
                        return Err(std::io::Error::new(
                            std::io::ErrorKind::InvalidData,
                            "Reply frame too long",
                        ));
                    }
                    payload.push(other);
                }
            }
        }

        let reply = String::from_utf8(payload)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        debug!("<- <{}>", reply);

        Ok(reply)
    }

    /// Sends `message`, gives the sketch `settle_time` to act on it, then
    /// waits for its reply.
    pub fn write_and_read(
        &self,
        sender: &mut (impl Write + Read),
        message: &Message,
    ) -> std::io::Result<String> {
        self.write(sender, message)?;

        if !self.settle_time.is_zero() {
            std::thread::sleep(self.settle_time);
        }

        self.read_reply(sender)
    }
}
