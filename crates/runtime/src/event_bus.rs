use crate::frame::Frame;

/// An event stamped with the frame it happened in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event<E> {
    pub frame_index: u64,
    pub payload: E,
}

/// Queue of typed events, drained by whoever presents them.
#[derive(Debug)]
pub struct EventBus<E> {
    events: Vec<Event<E>>,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self { events: Vec::new() }
    }
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, frame: Frame, payload: E) {
        self.events.push(Event {
            frame_index: frame.index,
            payload,
        });
    }

    pub fn events(&self) -> &[Event<E>] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn drain(&mut self) -> Vec<Event<E>> {
        std::mem::take(&mut self.events)
    }
}
