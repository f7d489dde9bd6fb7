//! Key-to-command mapping and dispatch.

use crate::calibrator::Calibrator;
use crate::report::Reporter;
use crate::session::{CalibrationSession, Signal};
use std::collections::HashMap;
use std::io;

/// Everything a key press can ask the session to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    Exit,
    Capture,
    Calibrate,
    /// Unmapped key or no key at all.
    Noop,
}

/// Built-in bindings. Case-sensitive.
pub const DEFAULT_BINDINGS: &[(char, Command)] = &[
    ('q', Command::Exit),
    ('x', Command::Exit),
    ('a', Command::Capture),
    ('s', Command::Capture),
    ('c', Command::Calibrate),
];

/// Key table used by the driving loop. Several keys may share a command.
#[derive(Clone, Debug)]
pub struct KeyMap {
    bindings: HashMap<char, Command>,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self {
            bindings: DEFAULT_BINDINGS.iter().copied().collect(),
        }
    }
}

impl KeyMap {
    /// A map with no bindings at all.
    pub fn empty() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Add or replace a binding.
    pub fn bind(mut self, key: char, command: Command) -> Self {
        self.bindings.insert(key, command);
        self
    }

    pub fn command_for(&self, key: Option<char>) -> Command {
        key.and_then(|k| self.bindings.get(&k).copied())
            .unwrap_or(Command::Noop)
    }
}

/// Run `command` against the session.
pub fn dispatch<K, R>(command: Command, session: &mut CalibrationSession<K, R>) -> io::Result<Signal>
where
    K: Calibrator,
    R: Reporter,
{
    match command {
        Command::Exit => Ok(session.request_exit()),
        Command::Capture => Ok(session.request_capture()),
        Command::Calibrate => session.calibrate(),
        Command::Noop => Ok(Signal::Declined),
    }
}
