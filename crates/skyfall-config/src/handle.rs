use std::cell::RefCell;
use std::rc::Rc;

use crate::schema::SkyfallConfig;

/// Shared live view of the configuration.
///
/// Clones point at the same config. Feature predicates call
/// [`read`](ConfigHandle::read) on every dispatch; the host mutates through
/// [`update`](ConfigHandle::update) between frames and then re-syncs
/// feature states.
#[derive(Debug, Clone, Default)]
pub struct ConfigHandle(Rc<RefCell<SkyfallConfig>>);

impl ConfigHandle {
    pub fn new(config: SkyfallConfig) -> Self {
        Self(Rc::new(RefCell::new(config)))
    }

    /// Run `f` against the current config.
    ///
    /// Panics if called from inside [`update`](ConfigHandle::update).
    pub fn read<R>(&self, f: impl FnOnce(&SkyfallConfig) -> R) -> R {
        f(&self.0.borrow())
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut SkyfallConfig) -> R) -> R {
        f(&mut self.0.borrow_mut())
    }

    pub fn snapshot(&self) -> SkyfallConfig {
        self.0.borrow().clone()
    }
}
