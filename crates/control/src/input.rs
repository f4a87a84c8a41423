//! Keyboard state and input devices.

use std::collections::VecDeque;

use bitflags::bitflags;

bitflags! {
    /// Keys currently held down.
    ///
    /// Arrow keys and WASD are interchangeable.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Keys: u16 {
        const LEFT = 1 << 0;
        const RIGHT = 1 << 1;
        const UP = 1 << 2;
        const DOWN = 1 << 3;
        const A = 1 << 4;
        const D = 1 << 5;
        const W = 1 << 6;
        const S = 1 << 7;
        /// Hand brake
        const SPACE = 1 << 8;
        /// Reverse gear toggle
        const Q = 1 << 9;
        /// Autopilot toggle
        const P = 1 << 10;
        /// Quit
        const ESCAPE = 1 << 11;

        const STEER_LEFT = Self::LEFT.bits() | Self::A.bits();
        const STEER_RIGHT = Self::RIGHT.bits() | Self::D.bits();
        const ACCELERATE = Self::UP.bits() | Self::W.bits();
        const BRAKE = Self::DOWN.bits() | Self::S.bits();
    }
}

/// One tick worth of input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    pub pressed: Keys,
    /// Window closed, Escape pressed or interrupt received
    pub quit: bool,
}

impl InputSnapshot {
    pub fn keys(pressed: Keys) -> Self {
        Self {
            pressed,
            quit: pressed.contains(Keys::ESCAPE),
        }
    }

    pub fn quit() -> Self {
        Self {
            pressed: Keys::empty(),
            quit: true,
        }
    }
}

/// Polled once per tick by the session loop.
pub trait InputDevice {
    fn poll(&mut self) -> InputSnapshot;
}

/// Never presses anything and never quits.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdleInput;

impl InputDevice for IdleInput {
    fn poll(&mut self) -> InputSnapshot {
        InputSnapshot::default()
    }
}

/// Replays a fixed sequence of snapshots, then reports `after`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    script: VecDeque<InputSnapshot>,
    after: InputSnapshot,
}

impl ScriptedInput {
    pub fn new(script: impl IntoIterator<Item = InputSnapshot>) -> Self {
        Self {
            script: script.into_iter().collect(),
            after: InputSnapshot::default(),
        }
    }

    /// Script of key sets, one per tick
    pub fn from_keys(keys: impl IntoIterator<Item = Keys>) -> Self {
        Self::new(keys.into_iter().map(InputSnapshot::keys))
    }

    /// Snapshot returned once the script is exhausted
    pub fn then(mut self, after: InputSnapshot) -> Self {
        self.after = after;
        self
    }

    /// Quit as soon as the script is exhausted
    pub fn then_quit(self) -> Self {
        self.then(InputSnapshot::quit())
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl InputDevice for ScriptedInput {
    fn poll(&mut self) -> InputSnapshot {
        self.script.pop_front().unwrap_or(self.after)
    }
}

impl<T: InputDevice + ?Sized> InputDevice for Box<T> {
    fn poll(&mut self) -> InputSnapshot {
        (**self).poll()
    }
}
