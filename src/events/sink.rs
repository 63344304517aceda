use super::Event;

/// Receiver of interaction events published by the engine.
pub trait EventSink {
    fn send(&self, event: Event);
}

impl EventSink for std::sync::mpsc::Sender<Event> {
    fn send(&self, event: Event) {
        // a dropped receiver only means nobody listens anymore
        let _ = std::sync::mpsc::Sender::send(self, event);
    }
}

#[cfg(feature = "events")]
impl EventSink for crossbeam::channel::Sender<Event> {
    fn send(&self, event: Event) {
        let _ = crossbeam::channel::Sender::send(self, event);
    }
}
