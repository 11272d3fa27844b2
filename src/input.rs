//! Input normalisation and the per-step command queue
//!
//! Raw host events (key names, pointer positions) are translated into
//! `Command`s. Handlers only ever enqueue intent; the session drains the
//! queue once at the start of each step.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// A player or host intent, applied at the start of the next step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Pointer/touch position in field coordinates; the paddle centres on it
    SetPaddleTarget(f32),
    MoveLeft(bool),
    MoveRight(bool),
    /// Start, advance level or launch, depending on phase
    PrimaryAction,
    TogglePause,
    Start,
    Retry,
    NextLevel,
}

/// A raw host event
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    KeyDown(String),
    KeyUp(String),
    PointerMove {
        client_x: f32,
        rect_left: f32,
        rect_width: f32,
    },
    TouchStart {
        client_x: f32,
        rect_left: f32,
        rect_width: f32,
    },
    TouchMove {
        client_x: f32,
        rect_left: f32,
        rect_width: f32,
    },
    Click,
}

impl InputEvent {
    /// Translate into zero or more commands for a field `field_width` wide
    pub fn to_commands(&self, field_width: f32) -> Vec<Command> {
        match self {
            InputEvent::KeyDown(key) => command_for_key(key, true).into_iter().collect(),
            InputEvent::KeyUp(key) => match command_for_key(key, false) {
                // Releasing these keys means nothing
                Some(Command::PrimaryAction | Command::TogglePause) | None => Vec::new(),
                Some(cmd) => vec![cmd],
            },
            InputEvent::PointerMove {
                client_x,
                rect_left,
                rect_width,
            }
            | InputEvent::TouchMove {
                client_x,
                rect_left,
                rect_width,
            } => pointer_to_field_x(*client_x, *rect_left, *rect_width, field_width)
                .map(Command::SetPaddleTarget)
                .into_iter()
                .collect(),
            InputEvent::TouchStart {
                client_x,
                rect_left,
                rect_width,
            } => {
                let mut cmds: Vec<Command> =
                    pointer_to_field_x(*client_x, *rect_left, *rect_width, field_width)
                        .map(Command::SetPaddleTarget)
                        .into_iter()
                        .collect();
                cmds.push(Command::PrimaryAction);
                cmds
            }
            InputEvent::Click => vec![Command::PrimaryAction],
        }
    }
}

/// Map a key name to a command. `pressed` is the key state for held keys.
pub fn command_for_key(key: &str, pressed: bool) -> Option<Command> {
    match key {
        "ArrowLeft" | "Left" | "a" => Some(Command::MoveLeft(pressed)),
        "ArrowRight" | "Right" | "d" => Some(Command::MoveRight(pressed)),
        " " | "Enter" => Some(Command::PrimaryAction),
        "Escape" => Some(Command::TogglePause),
        _ => None,
    }
}

/// Map a client x coordinate through the canvas rect onto field x.
///
/// Returns None when the rect has no width.
pub fn pointer_to_field_x(client_x: f32, rect_left: f32, rect_width: f32, field_width: f32) -> Option<f32> {
    if !rect_width.is_finite() || rect_width <= 0.0 || !client_x.is_finite() {
        return None;
    }
    Some((client_x - rect_left) / rect_width * field_width)
}

/// FIFO of commands waiting for the next step
#[derive(Debug, Clone, Default)]
pub struct CommandQueue {
    queue: VecDeque<Command>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cmd: Command) {
        self.queue.push_back(cmd);
    }

    /// Take every queued command, oldest first
    pub fn drain(&mut self) -> impl Iterator<Item = Command> + '_ {
        self.queue.drain(..)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
