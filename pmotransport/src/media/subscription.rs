use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam_channel::Sender;

/// Identifies one media subscription. Ids increase monotonically per binder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// What the media element reported.
#[derive(Clone, Debug, PartialEq)]
pub enum MediaEventKind {
    /// Native time-update tick, position in fractional seconds.
    TimeUpdate { position_secs: f64 },
    Playing,
    Paused,
    /// Natural end of the media. Not emitted while natively looping.
    Ended,
    Failed { reason: String },
}

/// A media notification stamped with the subscription it was emitted for.
#[derive(Clone, Debug, PartialEq)]
pub struct MediaEvent {
    pub subscription: SubscriptionId,
    pub kind: MediaEventKind,
}

/// Sending half handed to a backend when a handle is opened.
///
/// Once the matching [`Subscription`] is closed the sink silently refuses
/// further events.
#[derive(Clone, Debug)]
pub struct EventSink {
    id: SubscriptionId,
    tx: Sender<MediaEvent>,
    open: Arc<AtomicBool>,
}

impl EventSink {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    /// Returns `false` when the event was not delivered.
    pub fn emit(&self, kind: MediaEventKind) -> bool {
        if !self.is_open() {
            return false;
        }
        self.tx
            .send(MediaEvent {
                subscription: self.id,
                kind,
            })
            .is_ok()
    }
}

/// Binder-side half of a subscription. Closing it, explicitly or on drop,
/// cuts the paired [`EventSink`] off.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    open: Arc<AtomicBool>,
}

impl Subscription {
    pub fn new(id: SubscriptionId, tx: Sender<MediaEvent>) -> (Self, EventSink) {
        let open = Arc::new(AtomicBool::new(true));
        let sink = EventSink {
            id,
            tx,
            open: Arc::clone(&open),
        };
        (Self { id, open }, sink)
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn close(&self) {
        self.open.store(false, Ordering::Release);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.close();
    }
}
