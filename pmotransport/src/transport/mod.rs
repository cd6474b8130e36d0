//! Transport state: the play queue, the current position and the
//! playing/looping/shuffling flags.

mod snapshot;
mod store;

pub use snapshot::TransportSnapshot;
pub use store::TransportStore;
