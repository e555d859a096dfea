use std::sync::mpsc::Sender;

use crate::types::PlotEvent;

/// Receiver of the notifications a plot publishes while processing data.
pub trait EventSink {
    fn emit(&mut self, event: PlotEvent);
}

/// Discards every event.
impl EventSink for () {
    fn emit(&mut self, _event: PlotEvent) {}
}

/// Forwards events to another thread; a hung-up receiver is ignored.
impl EventSink for Sender<PlotEvent> {
    fn emit(&mut self, event: PlotEvent) {
        self.send(event).ok();
    }
}

/// Keeps every event in order of emission.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<PlotEvent>,
}

impl RecordingSink {
    pub fn count(&self, wanted: &PlotEvent) -> usize {
        self.events.iter().filter(|e| *e == wanted).count()
    }

    pub fn take(&mut self) -> Vec<PlotEvent> {
        std::mem::take(&mut self.events)
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: PlotEvent) {
        self.events.push(event);
    }
}
