//! Canvas composition.
//!
//! The canvas is a plain composition: a draw surface next to an input
//! dispatcher capability, plus the dirty-region inbox the compositor
//! drains. No handler inheritance - the host wires its DOM listeners to
//! [`Canvas::handle_raw`] and its paint callback to [`Canvas::take_dirty`].

use parking_lot::Mutex;

use basilisk_core::{BufferSurface, Rect, Surface};
use basilisk_event::{EventQueue, InputDispatcher, RawInput};

/// Draw surface + input dispatcher + dirty-region inbox.
#[derive(Debug)]
pub struct Canvas {
    surface: BufferSurface,
    input: InputDispatcher,
    /// Regions queued for repaint. Shared with the compositor callback,
    /// hence the lock; contention is nil on the single UI thread.
    dirty: Mutex<Vec<Rect>>,
}

impl Canvas {
    /// Creates a canvas of the given size.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            surface: BufferSurface::new(width, height),
            input: InputDispatcher::new(),
            dirty: Mutex::new(Vec::new()),
        }
    }

    /// The draw surface.
    #[must_use]
    pub fn surface(&self) -> &BufferSurface {
        &self.surface
    }

    /// Mutable draw surface, for the per-frame clear/draw calls.
    pub fn surface_mut(&mut self) -> &mut BufferSurface {
        &mut self.surface
    }

    /// The input dispatcher.
    #[must_use]
    pub fn input(&self) -> &InputDispatcher {
        &self.input
    }

    /// Mutable input dispatcher (repeat settings, held-state queries).
    pub fn input_mut(&mut self) -> &mut InputDispatcher {
        &mut self.input
    }

    /// Feeds one raw browser event through the dispatcher into `queue`.
    pub fn handle_raw(&mut self, raw: RawInput, queue: &mut EventQueue, now_ms: u64) {
        self.input.handle(raw, queue, now_ms);
    }

    /// Queues regions for repaint.
    ///
    /// Rects are clipped to the surface; empty results are dropped.
    pub fn update(&self, rects: &[Rect]) {
        let bounds = self.surface.get_rect();
        let mut dirty = self.dirty.lock();
        for r in rects {
            let clipped = r.clip(bounds);
            if !clipped.is_empty() {
                dirty.push(clipped);
            }
        }
    }

    /// Queues a full-surface repaint.
    pub fn flip(&self) {
        let bounds = self.surface.get_rect();
        let mut dirty = self.dirty.lock();
        dirty.clear();
        dirty.push(bounds);
    }

    /// Drains the queued repaint regions - the compositor's feed.
    #[must_use]
    pub fn take_dirty(&self) -> Vec<Rect> {
        let mut dirty = self.dirty.lock();
        std::mem::take(&mut *dirty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use basilisk_event::Event;

    #[test]
    fn test_update_clips_and_accumulates() {
        let canvas = Canvas::new(100, 100);
        canvas.update(&[Rect::new(10, 10, 20, 20), Rect::new(90, 90, 50, 50)]);
        canvas.update(&[Rect::new(-5, -5, 2, 2)]);

        let dirty = canvas.take_dirty();
        assert_eq!(dirty, vec![Rect::new(10, 10, 20, 20), Rect::new(90, 90, 10, 10)]);
        assert!(canvas.take_dirty().is_empty());
    }

    #[test]
    fn test_flip_replaces_with_full_surface() {
        let canvas = Canvas::new(64, 48);
        canvas.update(&[Rect::new(1, 1, 2, 2)]);
        canvas.flip();
        assert_eq!(canvas.take_dirty(), vec![Rect::new(0, 0, 64, 48)]);
    }

    #[test]
    fn test_handle_raw_reaches_queue() {
        let mut canvas = Canvas::new(32, 32);
        let mut queue = EventQueue::new();
        canvas.handle_raw(RawInput::MouseDown { x: 4, y: 5, button: 0 }, &mut queue, 0);

        let events = queue.get(None);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0], Event::mouse_button_down((4, 5), 1));
        assert_eq!(canvas.input().mouse.get_pressed(), (true, false, false));
    }
}
