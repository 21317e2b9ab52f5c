use std::fmt;

use serial_bridge::Message;

/// Argument sent with commands that take none.
pub const NO_ARGUMENT: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Command words understood by the servo sketch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandName {
    /// Select servo X and move it relative to its current position.
    XMove,
    YMove,
    /// Relative move on the currently selected servo.
    Move,
    /// Select servo X and move it to an absolute position.
    XGoto,
    YGoto,
    Goto,
    /// Select the active servo by id.
    Servo,
    Pos,
    Stop,
    Exit,
    /// Any other word; the sketch decides what it means.
    Other(String),
}

impl CommandName {
    pub fn as_str(&self) -> &str {
        match self {
            CommandName::XMove => "xmove",
            CommandName::YMove => "ymove",
            CommandName::Move => "move",
            CommandName::XGoto => "xgoto",
            CommandName::YGoto => "ygoto",
            CommandName::Goto => "goto",
            CommandName::Servo => "servo",
            CommandName::Pos => "pos",
            CommandName::Stop => "stop",
            CommandName::Exit => "exit",
            CommandName::Other(word) => word,
        }
    }

    pub fn takes_argument(&self) -> bool {
        !matches!(
            self,
            CommandName::Pos | CommandName::Stop | CommandName::Exit
        )
    }
}

impl From<&str> for CommandName {
    fn from(word: &str) -> Self {
        match word {
            "xmove" => CommandName::XMove,
            "ymove" => CommandName::YMove,
            "move" => CommandName::Move,
            "xgoto" => CommandName::XGoto,
            "ygoto" => CommandName::YGoto,
            "goto" => CommandName::Goto,
            "servo" => CommandName::Servo,
            "pos" => CommandName::Pos,
            "stop" => CommandName::Stop,
            "exit" => CommandName::Exit,
            other => CommandName::Other(other.to_string()),
        }
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServoCommand {
    pub name: CommandName,
    pub value: i32,
}

impl ServoCommand {
    pub fn new(name: CommandName, value: i32) -> Self {
        let value = if name.takes_argument() {
            value
        } else {
            NO_ARGUMENT
        };

        Self { name, value }
    }

    pub fn relative(axis: Axis, delta: i32) -> Self {
        match axis {
            Axis::X => Self::new(CommandName::XMove, delta),
            Axis::Y => Self::new(CommandName::YMove, delta),
        }
    }

    pub fn absolute(axis: Axis, position: i32) -> Self {
        match axis {
            Axis::X => Self::new(CommandName::XGoto, position),
            Axis::Y => Self::new(CommandName::YGoto, position),
        }
    }

    pub fn move_selected(delta: i32) -> Self {
        Self::new(CommandName::Move, delta)
    }

    pub fn goto_selected(position: i32) -> Self {
        Self::new(CommandName::Goto, position)
    }

    pub fn select(servo: i32) -> Self {
        Self::new(CommandName::Servo, servo)
    }

    pub fn message(&self) -> Message {
        Message::new(self.name.as_str(), self.value)
    }
}

impl fmt::Display for ServoCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}
