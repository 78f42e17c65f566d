//! Feature runtime for the SkyFall client extension.
//!
//! Features are discovered from a [`registry::FeatureCatalog`], started and
//! stopped by the [`lifecycle::FeatureManager`] as configuration changes,
//! and fed host events through the [`bus::EventBus`] by the capability
//! dispatchers in [`dispatch`]. Everything here runs on the host's main
//! thread; the shared state is `Rc`/`RefCell` based and not `Send`.

pub mod bus;
pub mod canvas;
pub mod dispatch;
pub mod event;
pub mod fault;
pub mod feature;
pub mod item;
pub mod lifecycle;
pub mod logging;
pub mod registry;
pub mod services;

#[cfg(test)]
pub(crate) mod testing;
