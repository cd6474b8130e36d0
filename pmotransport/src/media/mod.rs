//! Media binding: the seam to a playable media element and the binder that
//! keeps it in step with the transport state.

mod binder;
mod capabilities;
mod simulated;
mod subscription;

pub use binder::MediaBinder;
pub use capabilities::{MediaBackend, MediaHandle};
pub use simulated::{MediaCommand, SimulatedBackend, SimulatedHandle};
pub use subscription::{EventSink, MediaEvent, MediaEventKind, Subscription, SubscriptionId};
