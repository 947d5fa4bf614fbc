//! Raw-input normalization.
//!
//! The canvas host hands browser-shaped records to the dispatcher, which
//! updates held state, applies the key-repeat filter, and produces
//! normalized events into the queue. One canonical constructor per raw
//! kind; unknown raw shapes never reach this layer.

use crate::event::Event;
use crate::keyboard::{
    KeyCode, KeyRepeat, KeyState, K_BACKSPACE, K_DELETE, K_DOWN, K_END, K_ESCAPE, K_F1, K_HOME,
    K_INSERT, K_LALT, K_LCTRL, K_LEFT, K_LSHIFT, K_PAGEDOWN, K_PAGEUP, K_RETURN, K_RIGHT, K_SPACE,
    K_TAB, K_UP,
};
use crate::mouse::MouseState;
use crate::queue::EventQueue;

/// A browser-shaped input record, as delivered by the canvas handlers.
///
/// Coordinates are canvas-relative pixels. `button` follows the DOM
/// convention (0 = left, 1 = middle, 2 = right); `buttons` is the DOM
/// held-state bitmask (1 = left, 2 = right, 4 = middle).
#[derive(Clone, Debug, PartialEq)]
pub enum RawInput {
    /// Pointer moved.
    MouseMove {
        /// Canvas-relative x.
        x: i32,
        /// Canvas-relative y.
        y: i32,
        /// DOM held-buttons bitmask.
        buttons: u8,
    },
    /// Button pressed.
    MouseDown {
        /// Canvas-relative x.
        x: i32,
        /// Canvas-relative y.
        y: i32,
        /// DOM 0-based button index.
        button: u8,
    },
    /// Button released.
    MouseUp {
        /// Canvas-relative x.
        x: i32,
        /// Canvas-relative y.
        y: i32,
        /// DOM 0-based button index.
        button: u8,
    },
    /// Wheel scrolled.
    Wheel {
        /// Canvas-relative x.
        x: i32,
        /// Canvas-relative y.
        y: i32,
        /// Signed horizontal delta.
        delta_x: f64,
        /// Signed vertical delta.
        delta_y: f64,
    },
    /// Key pressed (raw - may be a browser auto-repeat).
    KeyDown {
        /// Legacy DOM keycode.
        code: u32,
        /// Printable character from the DOM key string, if one.
        ch: Option<char>,
    },
    /// Key released.
    KeyUp {
        /// Legacy DOM keycode.
        code: u32,
        /// Printable character from the DOM key string, if one.
        ch: Option<char>,
    },
    /// Pointer entered the canvas.
    PointerEnter,
    /// Pointer left the canvas.
    PointerLeave,
    /// Canvas gained input focus.
    FocusGained,
    /// Canvas lost input focus.
    FocusLost,
    /// Page close requested.
    Close,
}

/// Maps a DOM keycode plus printable character to the normalized keycode.
///
/// Printable keys normalize to their lowercase character code; special
/// keys map through the legacy-keycode table. Unmapped codes pass through
/// unchanged.
#[must_use]
pub fn normalize_key(code: u32, ch: Option<char>) -> KeyCode {
    if let Some(c) = ch {
        if !c.is_control() {
            let lower = c.to_ascii_lowercase();
            return lower as KeyCode;
        }
    }
    match code {
        8 => K_BACKSPACE,
        9 => K_TAB,
        13 => K_RETURN,
        16 => K_LSHIFT,
        17 => K_LCTRL,
        18 => K_LALT,
        27 => K_ESCAPE,
        32 => K_SPACE,
        33 => K_PAGEUP,
        34 => K_PAGEDOWN,
        35 => K_END,
        36 => K_HOME,
        37 => K_LEFT,
        38 => K_UP,
        39 => K_RIGHT,
        40 => K_DOWN,
        45 => K_INSERT,
        46 => K_DELETE,
        112..=123 => K_F1 + (code - 112),
        other => other,
    }
}

/// Input-dispatch capability object.
///
/// Owns the keyboard/mouse held-state and the key-repeat filter; the
/// canvas composes one of these next to its draw surface instead of
/// inheriting handler behavior.
#[derive(Debug, Default)]
pub struct InputDispatcher {
    /// Modifier held-state.
    pub keys: KeyState,
    /// Mouse held-state.
    pub mouse: MouseState,
    /// Key-repeat filter.
    pub repeat: KeyRepeat,
}

impl InputDispatcher {
    /// Creates a dispatcher with idle state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalizes one raw record into `queue`.
    ///
    /// `now_ms` is the host clock reading used by the repeat filter.
    pub fn handle(&mut self, raw: RawInput, queue: &mut EventQueue, now_ms: u64) {
        match raw {
            RawInput::MouseMove { x, y, buttons } => {
                let prev = self.mouse.get_pos();
                self.mouse.set_pos(x, y);
                let held = [buttons & 1 != 0, buttons & 4 != 0, buttons & 2 != 0];
                queue.produce(Event::mouse_motion((x, y), (x - prev.0, y - prev.1), held));
            }
            RawInput::MouseDown { x, y, button } => {
                let btn = button + 1;
                self.mouse.set_button(btn, true);
                queue.produce(Event::mouse_button_down((x, y), btn));
            }
            RawInput::MouseUp { x, y, button } => {
                let btn = button + 1;
                self.mouse.set_button(btn, false);
                queue.produce(Event::mouse_button_up((x, y), btn));
            }
            RawInput::Wheel {
                x,
                y,
                delta_x,
                delta_y,
            } => self.handle_wheel(queue, (x, y), delta_x, delta_y),
            RawInput::KeyDown { code, ch } => {
                let key = normalize_key(code, ch);
                if KeyState::is_mod(key) {
                    self.keys.set_mod(key, true);
                }
                if self.repeat.filter_keydown(key, now_ms) {
                    queue.produce(Event::key_down(key, self.keys.get_mods(), ch));
                } else {
                    tracing::trace!(key, "suppressed repeat keydown");
                }
            }
            RawInput::KeyUp { code, ch } => {
                let key = normalize_key(code, ch);
                if KeyState::is_mod(key) {
                    self.keys.set_mod(key, false);
                }
                self.repeat.release(key);
                queue.produce(Event::key_up(key, self.keys.get_mods()));
            }
            RawInput::PointerEnter => {
                self.mouse.set_focused(true);
                queue.produce(Event::window_enter());
            }
            RawInput::PointerLeave => {
                self.mouse.set_focused(false);
                queue.produce(Event::window_leave());
            }
            RawInput::FocusGained => queue.produce(Event::active(true, 2)),
            RawInput::FocusLost => queue.produce(Event::active(false, 2)),
            RawInput::Close => queue.produce(Event::quit()),
        }
    }

    /// Wheel normalization: one signed-delta event plus a synthetic
    /// button-style press/release pair per scrolled axis, for consumers
    /// that poll buttons instead of reading deltas.
    fn handle_wheel(&mut self, queue: &mut EventQueue, pos: (i32, i32), dx: f64, dy: f64) {
        queue.produce(Event::mouse_wheel(pos, dx as i32, dy as i32));
        if dy != 0.0 {
            let btn = if dy < 0.0 { 4 } else { 5 };
            queue.produce(Event::mouse_button_down(pos, btn));
            queue.produce(Event::mouse_button_up(pos, btn));
        }
        if dx != 0.0 {
            let btn = if dx < 0.0 { 6 } else { 7 };
            queue.produce(Event::mouse_button_down(pos, btn));
            queue.produce(Event::mouse_button_up(pos, btn));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{KEYDOWN, MOUSEBUTTONDOWN, MOUSEBUTTONUP, MOUSEMOTION, MOUSEWHEEL};
    use crate::keyboard::{K_A, KMOD_SHIFT};

    fn drain(queue: &mut EventQueue) -> Vec<Event> {
        queue.get(None)
    }

    #[test]
    fn test_mouse_motion_rel_and_buttons() {
        let mut d = InputDispatcher::new();
        let mut q = EventQueue::new();
        d.handle(RawInput::MouseMove { x: 10, y: 20, buttons: 0 }, &mut q, 0);
        d.handle(RawInput::MouseMove { x: 13, y: 18, buttons: 1 | 4 }, &mut q, 0);

        let events = drain(&mut q);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, MOUSEMOTION);
        assert_eq!(events[1].pos(), Some((13, 18)));
        assert_eq!(events[1].rel(), Some((3, -2)));
        assert_eq!(events[1].buttons(), Some([true, true, false]));
        assert_eq!(d.mouse.get_pos(), (13, 18));
    }

    #[test]
    fn test_button_events_are_one_based() {
        let mut d = InputDispatcher::new();
        let mut q = EventQueue::new();
        d.handle(RawInput::MouseDown { x: 1, y: 1, button: 2 }, &mut q, 0);
        assert_eq!(d.mouse.get_pressed(), (false, false, true));

        let events = drain(&mut q);
        assert_eq!(events[0].kind, MOUSEBUTTONDOWN);
        assert_eq!(events[0].button(), Some(3));
    }

    #[test]
    fn test_wheel_emits_delta_and_synthetic_buttons() {
        let mut d = InputDispatcher::new();
        let mut q = EventQueue::new();
        d.handle(
            RawInput::Wheel { x: 5, y: 5, delta_x: 0.0, delta_y: -3.0 },
            &mut q,
            0,
        );

        let events = drain(&mut q);
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].kind, MOUSEWHEEL);
        assert_eq!(events[0].wheel(), Some((0, -3)));
        assert_eq!(events[1].kind, MOUSEBUTTONDOWN);
        assert_eq!(events[1].button(), Some(4));
        assert_eq!(events[2].kind, MOUSEBUTTONUP);
        assert_eq!(events[2].button(), Some(4));

        // Scroll down maps to button 5, horizontal to 6/7.
        d.handle(
            RawInput::Wheel { x: 5, y: 5, delta_x: 2.0, delta_y: 1.0 },
            &mut q,
            0,
        );
        let events = drain(&mut q);
        assert_eq!(events[1].button(), Some(5));
        assert_eq!(events[3].button(), Some(7));
    }

    #[test]
    fn test_keydown_carries_mods_and_unicode() {
        let mut d = InputDispatcher::new();
        let mut q = EventQueue::new();
        d.handle(RawInput::KeyDown { code: 16, ch: None }, &mut q, 0);
        d.handle(RawInput::KeyDown { code: 65, ch: Some('A') }, &mut q, 5);

        let events = drain(&mut q);
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].kind, KEYDOWN);
        assert_eq!(events[1].key(), Some(K_A));
        assert_eq!(events[1].mods(), Some(KMOD_SHIFT));
        assert_eq!(events[1].unicode(), Some('A'));
    }

    #[test]
    fn test_repeat_filter_suppresses_raw_repeats() {
        let mut d = InputDispatcher::new();
        let mut q = EventQueue::new();
        d.repeat.set_repeat(100, 20).unwrap();

        for t in [0, 30, 60, 90, 100, 110, 120] {
            d.handle(RawInput::KeyDown { code: 65, ch: Some('a') }, &mut q, t);
        }
        // Emitted at t=0 (first), t=100 (delay elapsed), t=120 (interval).
        assert_eq!(drain(&mut q).len(), 3);

        d.handle(RawInput::KeyUp { code: 65, ch: Some('a') }, &mut q, 130);
        d.handle(RawInput::KeyDown { code: 65, ch: Some('a') }, &mut q, 131);
        let events = drain(&mut q);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, crate::event::KEYUP);
        assert_eq!(events[1].kind, KEYDOWN);
    }

    #[test]
    fn test_enter_leave_focus_and_close() {
        let mut d = InputDispatcher::new();
        let mut q = EventQueue::new();
        d.handle(RawInput::PointerEnter, &mut q, 0);
        assert!(d.mouse.get_focused());
        d.handle(RawInput::PointerLeave, &mut q, 0);
        assert!(!d.mouse.get_focused());
        d.handle(RawInput::Close, &mut q, 0);

        let events = drain(&mut q);
        assert_eq!(events[0].kind, crate::event::WINDOWENTER);
        assert_eq!(events[1].kind, crate::event::WINDOWLEAVE);
        assert_eq!(events[2].kind, crate::event::QUIT);
    }

    #[test]
    fn test_normalize_key_table() {
        assert_eq!(normalize_key(38, None), K_UP);
        assert_eq!(normalize_key(65, Some('A')), K_A);
        assert_eq!(normalize_key(113, None), K_F1 + 1);
        // Unmapped codes pass through.
        assert_eq!(normalize_key(999, None), 999);
    }
}
