//! pmoconfig extension for the player session

use std::time::Duration;

use anyhow::bail;

use crate::transport::TransportStore;

/// Initial transport flags read from the `player` section.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransportDefaults {
    pub shuffle: bool,
    pub looping: bool,
}

impl TransportDefaults {
    /// Empty store with these flags already set.
    pub fn store(&self) -> TransportStore {
        let mut store = TransportStore::new();
        if self.shuffle {
            store.toggle_shuffle();
        }
        if self.looping {
            store.toggle_loop();
        }
        store
    }
}

/// Extension trait for pmoconfig::Config
pub trait TransportConfigExt {
    /// Interval between two progress ticks of the simulated clock.
    fn tick_interval(&self) -> anyhow::Result<Duration>;

    fn transport_defaults(&self) -> anyhow::Result<TransportDefaults>;
}

impl TransportConfigExt for pmoconfig::Config {
    fn tick_interval(&self) -> anyhow::Result<Duration> {
        let millis = self.get_tick_interval_ms()?;
        if millis == 0 {
            bail!("player.tick_interval_ms must be greater than zero");
        }
        Ok(Duration::from_millis(millis))
    }

    fn transport_defaults(&self) -> anyhow::Result<TransportDefaults> {
        Ok(TransportDefaults {
            shuffle: self.get_start_shuffled()?,
            looping: self.get_start_looping()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_build_flagged_store() {
        let store = TransportDefaults {
            shuffle: true,
            looping: false,
        }
        .store();
        assert!(store.is_shuffling());
        assert!(!store.is_looping());
        assert!(store.is_empty());
    }
}
