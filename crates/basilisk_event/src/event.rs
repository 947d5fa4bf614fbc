//! Normalized input events.
//!
//! A tagged union keyed by a `u16` kind, with exactly one canonical
//! constructor per raw-browser-event kind. User-defined kinds occupy the
//! `USEREVENT..NUMEVENTS` range and carry an open key/value payload; every
//! other payload is strongly typed.

use crate::keyboard::KeyCode;

/// Event type tag.
pub type EventKind = u16;

/// No event - the sentinel returned by an empty poll.
pub const NOEVENT: EventKind = 0;
/// Window focus/visibility change.
pub const ACTIVEEVENT: EventKind = 1;
/// Key pressed.
pub const KEYDOWN: EventKind = 2;
/// Key released.
pub const KEYUP: EventKind = 3;
/// Pointer moved.
pub const MOUSEMOTION: EventKind = 4;
/// Mouse button pressed (4/5 and 6/7 are synthetic wheel buttons).
pub const MOUSEBUTTONDOWN: EventKind = 5;
/// Mouse button released.
pub const MOUSEBUTTONUP: EventKind = 6;
/// Wheel scrolled, with signed per-axis deltas.
pub const MOUSEWHEEL: EventKind = 7;
/// Pointer entered the canvas.
pub const WINDOWENTER: EventKind = 8;
/// Pointer left the canvas.
pub const WINDOWLEAVE: EventKind = 9;
/// Page close requested.
pub const QUIT: EventKind = 12;
/// First application-defined event kind.
pub const USEREVENT: EventKind = 24;
/// Exclusive upper bound of valid event kinds.
pub const NUMEVENTS: EventKind = 64;

/// Every standard (non-user) queueable kind.
pub const STANDARD_KINDS: [EventKind; 10] = [
    ACTIVEEVENT,
    KEYDOWN,
    KEYUP,
    MOUSEMOTION,
    MOUSEBUTTONDOWN,
    MOUSEBUTTONUP,
    MOUSEWHEEL,
    WINDOWENTER,
    WINDOWLEAVE,
    QUIT,
];

/// Returns the canonical name of a standard event kind.
#[must_use]
pub fn standard_name(kind: EventKind) -> Option<&'static str> {
    match kind {
        NOEVENT => Some("NoEvent"),
        ACTIVEEVENT => Some("ActiveEvent"),
        KEYDOWN => Some("KeyDown"),
        KEYUP => Some("KeyUp"),
        MOUSEMOTION => Some("MouseMotion"),
        MOUSEBUTTONDOWN => Some("MouseButtonDown"),
        MOUSEBUTTONUP => Some("MouseButtonUp"),
        MOUSEWHEEL => Some("MouseWheel"),
        WINDOWENTER => Some("WindowEnter"),
        WINDOWLEAVE => Some("WindowLeave"),
        QUIT => Some("Quit"),
        _ => None,
    }
}

/// A scalar value in a user-event payload.
#[derive(Clone, Debug, PartialEq)]
pub enum UserValue {
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating-point value.
    Float(f64),
    /// Text value.
    Text(String),
}

/// Ordered key/value payload of a user-defined event.
pub type UserData = Vec<(String, UserValue)>;

/// Event payload, one variant per family of kinds.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    /// No payload (QUIT, NOEVENT, WINDOWENTER/LEAVE).
    None,
    /// Pointer motion.
    MouseMotion {
        /// Pointer position.
        pos: (i32, i32),
        /// Change since the previous motion event.
        rel: (i32, i32),
        /// Held state of (left, middle, right).
        buttons: [bool; 3],
    },
    /// Button press or release.
    MouseButton {
        /// Pointer position.
        pos: (i32, i32),
        /// 1-based button; 4/5 vertical wheel, 6/7 horizontal wheel.
        button: u8,
    },
    /// Wheel scroll with signed deltas.
    MouseWheel {
        /// Pointer position.
        pos: (i32, i32),
        /// Horizontal delta.
        dx: i32,
        /// Vertical delta.
        dy: i32,
    },
    /// Key press or release.
    Key {
        /// Normalized keycode.
        key: KeyCode,
        /// Modifier bitmask at event time.
        mods: u16,
        /// Printable character, if any.
        unicode: Option<char>,
    },
    /// Focus/visibility change.
    Active {
        /// `true` when focus was gained.
        gain: bool,
        /// Focus category bitmask.
        state: u8,
    },
    /// Application-defined payload.
    User(UserData),
}

/// A normalized event record.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    /// Type tag.
    pub kind: EventKind,
    /// Kind-specific payload.
    pub payload: Payload,
}

impl Event {
    /// The sentinel returned when polling an empty queue.
    #[must_use]
    pub const fn no_event() -> Self {
        Self {
            kind: NOEVENT,
            payload: Payload::None,
        }
    }

    /// Page close requested.
    #[must_use]
    pub const fn quit() -> Self {
        Self {
            kind: QUIT,
            payload: Payload::None,
        }
    }

    /// Pointer motion.
    #[must_use]
    pub const fn mouse_motion(pos: (i32, i32), rel: (i32, i32), buttons: [bool; 3]) -> Self {
        Self {
            kind: MOUSEMOTION,
            payload: Payload::MouseMotion { pos, rel, buttons },
        }
    }

    /// Button press.
    #[must_use]
    pub const fn mouse_button_down(pos: (i32, i32), button: u8) -> Self {
        Self {
            kind: MOUSEBUTTONDOWN,
            payload: Payload::MouseButton { pos, button },
        }
    }

    /// Button release.
    #[must_use]
    pub const fn mouse_button_up(pos: (i32, i32), button: u8) -> Self {
        Self {
            kind: MOUSEBUTTONUP,
            payload: Payload::MouseButton { pos, button },
        }
    }

    /// Wheel scroll with signed per-axis deltas.
    #[must_use]
    pub const fn mouse_wheel(pos: (i32, i32), dx: i32, dy: i32) -> Self {
        Self {
            kind: MOUSEWHEEL,
            payload: Payload::MouseWheel { pos, dx, dy },
        }
    }

    /// Key press.
    #[must_use]
    pub const fn key_down(key: KeyCode, mods: u16, unicode: Option<char>) -> Self {
        Self {
            kind: KEYDOWN,
            payload: Payload::Key { key, mods, unicode },
        }
    }

    /// Key release.
    #[must_use]
    pub const fn key_up(key: KeyCode, mods: u16) -> Self {
        Self {
            kind: KEYUP,
            payload: Payload::Key {
                key,
                mods,
                unicode: None,
            },
        }
    }

    /// Pointer entered the canvas.
    #[must_use]
    pub const fn window_enter() -> Self {
        Self {
            kind: WINDOWENTER,
            payload: Payload::None,
        }
    }

    /// Pointer left the canvas.
    #[must_use]
    pub const fn window_leave() -> Self {
        Self {
            kind: WINDOWLEAVE,
            payload: Payload::None,
        }
    }

    /// Focus/visibility change.
    #[must_use]
    pub const fn active(gain: bool, state: u8) -> Self {
        Self {
            kind: ACTIVEEVENT,
            payload: Payload::Active { gain, state },
        }
    }

    /// Application-defined event.
    ///
    /// `kind` must lie in `USEREVENT..NUMEVENTS`; the queue registers the
    /// kind the first time such an event is posted.
    #[must_use]
    pub fn user(kind: EventKind, data: UserData) -> Self {
        debug_assert!(
            (USEREVENT..NUMEVENTS).contains(&kind),
            "user event kind {kind} outside USEREVENT..NUMEVENTS"
        );
        Self {
            kind,
            payload: Payload::User(data),
        }
    }

    /// Pointer position, for mouse-family events.
    #[must_use]
    pub const fn pos(&self) -> Option<(i32, i32)> {
        match self.payload {
            Payload::MouseMotion { pos, .. }
            | Payload::MouseButton { pos, .. }
            | Payload::MouseWheel { pos, .. } => Some(pos),
            _ => None,
        }
    }

    /// Relative motion, for MOUSEMOTION.
    #[must_use]
    pub const fn rel(&self) -> Option<(i32, i32)> {
        match self.payload {
            Payload::MouseMotion { rel, .. } => Some(rel),
            _ => None,
        }
    }

    /// Held buttons tuple, for MOUSEMOTION.
    #[must_use]
    pub const fn buttons(&self) -> Option<[bool; 3]> {
        match self.payload {
            Payload::MouseMotion { buttons, .. } => Some(buttons),
            _ => None,
        }
    }

    /// Button index, for MOUSEBUTTONDOWN/UP.
    #[must_use]
    pub const fn button(&self) -> Option<u8> {
        match self.payload {
            Payload::MouseButton { button, .. } => Some(button),
            _ => None,
        }
    }

    /// Signed wheel deltas, for MOUSEWHEEL.
    #[must_use]
    pub const fn wheel(&self) -> Option<(i32, i32)> {
        match self.payload {
            Payload::MouseWheel { dx, dy, .. } => Some((dx, dy)),
            _ => None,
        }
    }

    /// Keycode, for KEYDOWN/KEYUP.
    #[must_use]
    pub const fn key(&self) -> Option<KeyCode> {
        match self.payload {
            Payload::Key { key, .. } => Some(key),
            _ => None,
        }
    }

    /// Modifier bitmask, for KEYDOWN/KEYUP.
    #[must_use]
    pub const fn mods(&self) -> Option<u16> {
        match self.payload {
            Payload::Key { mods, .. } => Some(mods),
            _ => None,
        }
    }

    /// Printable character, for KEYDOWN.
    #[must_use]
    pub const fn unicode(&self) -> Option<char> {
        match self.payload {
            Payload::Key { unicode, .. } => unicode,
            _ => None,
        }
    }

    /// User payload, for application-defined events.
    #[must_use]
    pub fn user_data(&self) -> Option<&UserData> {
        match &self.payload {
            Payload::User(data) => Some(data),
            _ => None,
        }
    }
}
