//! Runtime context.
//!
//! One `Runtime` is created at startup and passed by handle to whatever
//! needs canvas, queue, or input state. There are no module-level
//! globals: every piece of mutable engine state lives here.

use std::rc::Rc;

use basilisk_event::{EventQueue, RawInput};

use crate::canvas::Canvas;
use crate::config::RuntimeConfig;
use crate::time::Clock;

/// The engine's application context.
pub struct Runtime {
    queue: EventQueue,
    canvas: Canvas,
    clock: Rc<dyn Clock>,
    config: RuntimeConfig,
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("queue", &self.queue)
            .field("canvas", &self.canvas)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Runtime {
    /// Creates the runtime, applying the startup configuration.
    #[must_use]
    pub fn new(config: RuntimeConfig, clock: Rc<dyn Clock>) -> Self {
        let mut queue = EventQueue::new();
        if let Some(allowed) = &config.allowed_events {
            queue.set_allowed(None);
            queue.set_allowed(Some(allowed.as_slice()));
        }
        let mut canvas = Canvas::new(config.width, config.height);
        if canvas
            .input_mut()
            .repeat
            .set_repeat(config.key_repeat.delay, config.key_repeat.interval)
            .is_err()
        {
            tracing::debug!("ignored negative key-repeat configuration");
        }
        Self {
            queue,
            canvas,
            clock,
            config,
        }
    }

    /// The event queue.
    #[must_use]
    pub fn queue(&self) -> &EventQueue {
        &self.queue
    }

    /// Mutable event queue, for the per-frame drain.
    pub fn queue_mut(&mut self) -> &mut EventQueue {
        &mut self.queue
    }

    /// The canvas.
    #[must_use]
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Mutable canvas.
    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    /// Startup configuration.
    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Current clock reading in milliseconds.
    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Feeds one raw browser event into the engine.
    pub fn handle_raw(&mut self, raw: RawInput) {
        let now = self.clock.now_ms();
        self.canvas.handle_raw(raw, &mut self.queue, now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KeyRepeatConfig;
    use crate::time::ManualClock;
    use basilisk_event::{event, Event};

    fn runtime(config: RuntimeConfig) -> (Runtime, Rc<ManualClock>) {
        let clock = Rc::new(ManualClock::new());
        (Runtime::new(config, Rc::clone(&clock) as Rc<dyn Clock>), clock)
    }

    #[test]
    fn test_config_applies_repeat_and_allowlist() {
        let config = RuntimeConfig {
            key_repeat: KeyRepeatConfig {
                delay: 200,
                interval: 40,
            },
            allowed_events: Some(vec![event::KEYDOWN, event::KEYUP]),
            ..RuntimeConfig::default()
        };
        let (mut rt, _clock) = runtime(config);
        assert_eq!(rt.canvas().input().repeat.get_repeat(), (200, 40));

        // Mouse events are outside the startup allow-list.
        rt.queue_mut().post(Event::mouse_button_down((0, 0), 1));
        rt.queue_mut().post(Event::key_down(97, 0, Some('a')));
        let events = rt.queue_mut().get(None);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, event::KEYDOWN);
    }

    #[test]
    fn test_handle_raw_uses_clock_for_repeat() {
        let config = RuntimeConfig {
            key_repeat: KeyRepeatConfig {
                delay: 100,
                interval: 50,
            },
            ..RuntimeConfig::default()
        };
        let (mut rt, clock) = runtime(config);

        rt.handle_raw(RawInput::KeyDown { code: 65, ch: Some('a') });
        clock.advance(60);
        rt.handle_raw(RawInput::KeyDown { code: 65, ch: Some('a') });
        clock.advance(40);
        rt.handle_raw(RawInput::KeyDown { code: 65, ch: Some('a') });

        // Emitted at t=0 and t=100; the t=60 repeat was inside the delay.
        assert_eq!(rt.queue_mut().get(None).len(), 2);
    }
}
