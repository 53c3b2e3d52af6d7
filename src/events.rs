//! Tracking event fan-out.
//!
//! The tracking collaborator reports found/lost once; everything interested
//! (lifecycle, UI chrome, audio cues) subscribes here instead of the
//! collaborator knowing its consumers.

/// Event emitted by the tracking collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingEvent {
    /// The image target became visible
    TargetFound,
    /// The image target was lost
    TargetLost,
}

/// Observer of tracking events.
pub trait TrackingListener {
    fn on_tracking_event(&mut self, event: TrackingEvent);
}

/// Subscribe/notify registry for tracking events. Single-threaded;
/// listeners are invoked in subscription order between frame ticks.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Box<dyn TrackingListener>>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Box<dyn TrackingListener>) {
        self.listeners.push(listener);
    }

    pub fn notify(&mut self, event: TrackingEvent) {
        for listener in &mut self.listeners {
            listener.on_tracking_event(event);
        }
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder {
        seen: Rc<RefCell<Vec<TrackingEvent>>>,
    }

    impl TrackingListener for Recorder {
        fn on_tracking_event(&mut self, event: TrackingEvent) {
            self.seen.borrow_mut().push(event);
        }
    }

    #[test]
    fn test_fanout_to_all_listeners() {
        let first = Rc::new(RefCell::new(Vec::new()));
        let second = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        bus.subscribe(Box::new(Recorder { seen: Rc::clone(&first) }));
        bus.subscribe(Box::new(Recorder { seen: Rc::clone(&second) }));

        bus.notify(TrackingEvent::TargetFound);
        bus.notify(TrackingEvent::TargetLost);

        assert_eq!(*first.borrow(), vec![TrackingEvent::TargetFound, TrackingEvent::TargetLost]);
        assert_eq!(*second.borrow(), *first.borrow());
    }
}
