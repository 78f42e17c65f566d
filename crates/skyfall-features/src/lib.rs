//! Bundled SkyFall features.
//!
//! [`catalog`] is the registration list the host hands to the lifecycle
//! manager. Between them the features cover every shape the dispatchers
//! know about:
//!
//! | feature | shape |
//! |---|---|
//! | [`SessionClock`], [`ProcessStats`] | HUD |
//! | [`FavoritePets`] | slot render + slot interaction |
//! | [`LevelNumber`] | slot render |
//! | [`EventMonitor`] | full event system |
//! | [`Heartbeat`] | self-managed, listens for ticks on the bus |
//!
//! [`Watermark`] is a plain HUD renderable with no lifecycle.

use skyfall_config::ConfigHandle;
use skyfall_core::registry::FeatureCatalog;

pub mod clock;
pub mod format;
pub mod heartbeat;
pub mod levels;
pub mod monitor;
pub mod pets;
pub mod slots;
pub mod stats;
pub mod watermark;

pub use clock::SessionClock;
pub use heartbeat::Heartbeat;
pub use levels::LevelNumber;
pub use monitor::EventMonitor;
pub use pets::FavoritePets;
pub use stats::ProcessStats;
pub use watermark::Watermark;

/// Every bundled feature, each reading its predicate from `config`.
pub fn catalog(config: &ConfigHandle) -> FeatureCatalog {
    let mut catalog = FeatureCatalog::new();

    let c = config.clone();
    catalog.register(move || Ok(SessionClock::new(c.clone())));
    let c = config.clone();
    catalog.register(move || Ok(ProcessStats::new(c.clone())));
    let c = config.clone();
    catalog.register(move || Ok(FavoritePets::new(c.clone())));
    let c = config.clone();
    catalog.register(move || Ok(LevelNumber::new(c.clone())));
    let c = config.clone();
    catalog.register(move || Ok(EventMonitor::new(c.clone())));
    let c = config.clone();
    catalog.register(move || Ok(Heartbeat::new(c.clone())));

    catalog
}
