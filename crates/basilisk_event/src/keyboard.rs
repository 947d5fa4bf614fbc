//! Keyboard state, keycode constants, and key-repeat emulation.
//!
//! Browsers deliver raw keydown repeats with no native repeat contract
//! the application can configure, so repeats are emulated: a two-phase
//! (initial-delay, then-interval) filter over raw keydowns. Downstream
//! text input depends on the suppressed-until-interval behavior to avoid
//! a KEYDOWN flood every animation frame.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use thiserror::Error;

/// Normalized keycode.
pub type KeyCode = u32;

#[allow(missing_docs)]
mod codes {
    use super::KeyCode;

    pub const K_BACKSPACE: KeyCode = 8;
    pub const K_TAB: KeyCode = 9;
    pub const K_RETURN: KeyCode = 13;
    pub const K_ESCAPE: KeyCode = 27;
    pub const K_SPACE: KeyCode = 32;
    pub const K_0: KeyCode = 48;
    pub const K_9: KeyCode = 57;
    pub const K_A: KeyCode = 97;
    pub const K_Z: KeyCode = 122;
    pub const K_DELETE: KeyCode = 127;
    pub const K_UP: KeyCode = 273;
    pub const K_DOWN: KeyCode = 274;
    pub const K_RIGHT: KeyCode = 275;
    pub const K_LEFT: KeyCode = 276;
    pub const K_INSERT: KeyCode = 277;
    pub const K_HOME: KeyCode = 278;
    pub const K_END: KeyCode = 279;
    pub const K_PAGEUP: KeyCode = 280;
    pub const K_PAGEDOWN: KeyCode = 281;
    pub const K_F1: KeyCode = 282;
    pub const K_F12: KeyCode = 293;
    pub const K_LSHIFT: KeyCode = 304;
    pub const K_LCTRL: KeyCode = 306;
    pub const K_LALT: KeyCode = 308;
}

pub use codes::*;

/// No modifier held.
pub const KMOD_NONE: u16 = 0x0000;
/// Shift modifier mask.
pub const KMOD_SHIFT: u16 = 0x0003;
/// Control modifier mask.
pub const KMOD_CTRL: u16 = 0x00C0;
/// Alt modifier mask.
pub const KMOD_ALT: u16 = 0x0300;

/// Input configuration errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// Key-repeat settings must not be negative.
    #[error("repeat settings must be positive integers")]
    InvalidRepeat,
}

/// Returns the name of a keycode.
///
/// Special keys get their word name; printable codes fall back to the
/// character itself.
#[must_use]
pub fn key_name(key: KeyCode) -> String {
    let name = match key {
        K_BACKSPACE => "backspace",
        K_TAB => "tab",
        K_RETURN => "return",
        K_ESCAPE => "escape",
        K_SPACE => "space",
        K_DELETE => "delete",
        K_UP => "up",
        K_DOWN => "down",
        K_RIGHT => "right",
        K_LEFT => "left",
        K_INSERT => "insert",
        K_HOME => "home",
        K_END => "end",
        K_PAGEUP => "pageup",
        K_PAGEDOWN => "pagedown",
        K_LSHIFT => "shift",
        K_LCTRL => "ctrl",
        K_LALT => "alt",
        K_F1..=K_F12 => return format!("f{}", key - K_F1 + 1),
        _ => "",
    };
    if !name.is_empty() {
        return name.to_string();
    }
    match char::from_u32(key) {
        Some(c) if !c.is_control() => c.to_string(),
        _ => format!("<{key}>"),
    }
}

/// Held state of the modifier keys.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyState {
    alt: bool,
    ctrl: bool,
    shift: bool,
}

impl KeyState {
    /// Creates a state with nothing held.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a modifier transition. Non-modifier keys are ignored.
    pub fn set_mod(&mut self, key: KeyCode, down: bool) {
        match key {
            K_LALT => self.alt = down,
            K_LCTRL => self.ctrl = down,
            K_LSHIFT => self.shift = down,
            _ => {}
        }
    }

    /// Checks whether `key` is one of the tracked modifiers.
    #[must_use]
    pub fn is_mod(key: KeyCode) -> bool {
        matches!(key, K_LALT | K_LCTRL | K_LSHIFT)
    }

    /// Returns the modifier bitmask alt|ctrl|shift.
    #[must_use]
    pub fn get_mods(&self) -> u16 {
        let mut mods = KMOD_NONE;
        if self.alt {
            mods |= KMOD_ALT;
        }
        if self.ctrl {
            mods |= KMOD_CTRL;
        }
        if self.shift {
            mods |= KMOD_SHIFT;
        }
        mods
    }
}

/// Per-key repeat bookkeeping.
#[derive(Debug, Clone, Copy)]
struct HeldKey {
    /// Still inside the initial delay window.
    in_delay: bool,
    /// Time of the last emitted keydown, in milliseconds.
    time: u64,
}

/// Two-phase key-repeat emulator.
///
/// First press emits immediately and arms the delay timer; while the key
/// stays held, raw repeats are suppressed until `delay` elapses once, then
/// one emit per `interval`. Release resets the cycle. Repeat is disabled
/// until configured: with `delay == 0` only the first press of a held key
/// emits.
#[derive(Debug, Default)]
pub struct KeyRepeat {
    delay: u32,
    interval: u32,
    held: HashMap<KeyCode, HeldKey>,
}

impl KeyRepeat {
    /// Creates a disabled repeat filter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets repeat delay and interval in milliseconds.
    ///
    /// Zero `delay` disables repeat; zero `interval` falls back to the
    /// delay.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::InvalidRepeat`] for negative settings.
    pub fn set_repeat(&mut self, delay: i32, interval: i32) -> Result<(), InputError> {
        if delay < 0 || interval < 0 {
            return Err(InputError::InvalidRepeat);
        }
        if delay == 0 {
            self.delay = 0;
            self.interval = 0;
        } else {
            self.delay = delay as u32;
            self.interval = if interval != 0 {
                interval as u32
            } else {
                delay as u32
            };
        }
        Ok(())
    }

    /// Returns the `(delay, interval)` settings.
    #[must_use]
    pub fn get_repeat(&self) -> (u32, u32) {
        (self.delay, self.interval)
    }

    /// Filters a raw keydown at `now_ms`.
    ///
    /// Returns `true` when a KEYDOWN event should be emitted.
    pub fn filter_keydown(&mut self, key: KeyCode, now_ms: u64) -> bool {
        let (delay, interval) = (self.delay, self.interval);
        match self.held.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(HeldKey {
                    in_delay: true,
                    time: now_ms,
                });
                true
            }
            Entry::Occupied(mut slot) => {
                if delay == 0 {
                    // Repeat disabled: a held key emits only its first press.
                    return false;
                }
                let held = slot.get_mut();
                if held.in_delay {
                    if now_ms.saturating_sub(held.time) < u64::from(delay) {
                        return false;
                    }
                    held.in_delay = false;
                    held.time = now_ms;
                    return true;
                }
                if now_ms.saturating_sub(held.time) >= u64::from(interval) {
                    held.time = now_ms;
                    return true;
                }
                false
            }
        }
    }

    /// Records a key release, resetting its repeat cycle.
    pub fn release(&mut self, key: KeyCode) {
        self.held.remove(&key);
    }
}
