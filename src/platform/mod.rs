//! Platform abstraction layer
//!
//! Keys are logical; a front end maps whatever it receives (browser key
//! names, terminal events) onto [`Key`] before handing it to the session.

use serde::{Deserialize, Serialize};

use crate::sim::Dir;

/// Logical input key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    /// Fire / confirm
    Action,
}

impl Key {
    /// Map a literal key name (`ArrowUp`, `w`, ` `, ...)
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ArrowUp" | "w" | "W" => Some(Key::Up),
            "ArrowDown" | "s" | "S" => Some(Key::Down),
            "ArrowLeft" | "a" | "A" => Some(Key::Left),
            "ArrowRight" | "d" | "D" => Some(Key::Right),
            " " | "Space" | "Enter" => Some(Key::Action),
            _ => None,
        }
    }

    /// Direction for movement keys
    pub fn dir(self) -> Option<Dir> {
        match self {
            Key::Up => Some(Dir::Up),
            Key::Down => Some(Dir::Down),
            Key::Left => Some(Dir::Left),
            Key::Right => Some(Dir::Right),
            Key::Action => None,
        }
    }

    pub fn from_dir(dir: Dir) -> Self {
        match dir {
            Dir::Up => Key::Up,
            Dir::Down => Key::Down,
            Dir::Left => Key::Left,
            Dir::Right => Key::Right,
        }
    }
}
