//! Bounded key-event queue between the keyboard surface and the pipeline.
//!
//! A global listener pushes events from the UI thread; the control loop
//! consumes them with non-blocking polls. The queue is bounded at 32
//! entries and overflow drops the newest event, so a wedged consumer can
//! never grow memory.

use std::collections::VecDeque;
use std::sync::Mutex;

/// Maximum number of buffered key events.
pub const KEY_QUEUE_CAPACITY: usize = 32;

/// A single key press as seen by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    /// A printable character key.
    Char(char),
    Space,
    Enter,
    /// Any key the pipeline has no use for.
    Other,
}

/// Bounded multi-producer key-event queue.
///
/// All methods take `&self`; the queue is intended to be shared behind an
/// `Arc` between the listener and the control loop.
#[derive(Debug, Default)]
pub struct KeyQueue {
    events: Mutex<VecDeque<KeyEvent>>,
}

impl KeyQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push an event, dropping it when the queue is full.
    pub fn push(&self, event: KeyEvent) {
        let mut events = self.events.lock().unwrap();
        if events.len() < KEY_QUEUE_CAPACITY {
            events.push_back(event);
        }
    }

    /// Pop the oldest pending event, if any (non-blocking).
    pub fn poll(&self) -> Option<KeyEvent> {
        self.events.lock().unwrap().pop_front()
    }

    /// Discard all pending events.
    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    /// Drain pending events until `key` is found.
    ///
    /// Events before the match are consumed; events after it stay queued.
    pub fn was_key_pressed(&self, key: char) -> bool {
        let mut events = self.events.lock().unwrap();
        while let Some(event) = events.pop_front() {
            if event == KeyEvent::Char(key) {
                return true;
            }
        }
        false
    }

    /// Drain pending events until a space press is found.
    pub fn was_space_pressed(&self) -> bool {
        let mut events = self.events.lock().unwrap();
        while let Some(event) = events.pop_front() {
            if event == KeyEvent::Space {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_poll_in_order() {
        let queue = KeyQueue::new();
        queue.push(KeyEvent::Char('a'));
        queue.push(KeyEvent::Space);

        assert_eq!(queue.poll(), Some(KeyEvent::Char('a')));
        assert_eq!(queue.poll(), Some(KeyEvent::Space));
        assert_eq!(queue.poll(), None);
    }

    #[test]
    fn test_overflow_drops_newest() {
        let queue = KeyQueue::new();
        for _ in 0..KEY_QUEUE_CAPACITY {
            queue.push(KeyEvent::Char('x'));
        }
        queue.push(KeyEvent::Char('q'));

        let mut drained = 0;
        while let Some(event) = queue.poll() {
            assert_eq!(event, KeyEvent::Char('x'));
            drained += 1;
        }
        assert_eq!(drained, KEY_QUEUE_CAPACITY);
    }

    #[test]
    fn test_was_key_pressed_consumes_up_to_match() {
        let queue = KeyQueue::new();
        queue.push(KeyEvent::Char('a'));
        queue.push(KeyEvent::Char('q'));
        queue.push(KeyEvent::Char('b'));

        assert!(queue.was_key_pressed('q'));
        // 'b' was queued after the match and survives.
        assert_eq!(queue.poll(), Some(KeyEvent::Char('b')));
    }

    #[test]
    fn test_was_key_pressed_misses_drain_everything() {
        let queue = KeyQueue::new();
        queue.push(KeyEvent::Char('a'));
        queue.push(KeyEvent::Other);

        assert!(!queue.was_key_pressed('q'));
        assert_eq!(queue.poll(), None);
    }

    #[test]
    fn test_was_space_pressed() {
        let queue = KeyQueue::new();
        queue.push(KeyEvent::Char('a'));
        queue.push(KeyEvent::Space);
        assert!(queue.was_space_pressed());
        assert!(!queue.was_space_pressed());
    }

    #[test]
    fn test_clear() {
        let queue = KeyQueue::new();
        queue.push(KeyEvent::Char('a'));
        queue.clear();
        assert_eq!(queue.poll(), None);
    }
}
