//! Capability dispatchers.
//!
//! Each dispatcher owns the features exposing one capability, wires itself
//! to the [`EventBus`](crate::bus::EventBus) on its first registration, and
//! forwards bus events to members that are running and still want to load.

mod generic;
mod hud;
mod slot;

pub use generic::GenericDispatcher;
pub use hud::{HudDispatcher, SharedRenderable};
pub use slot::SlotDispatcher;

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;
use serde::Serialize;

use crate::fault::contain;
use crate::feature::{Feature, FeatureHandle};

/// Listener priority the dispatchers wire at.
pub const DISPATCH_PRIORITY: i32 = 0;

/// Snapshot of a dispatcher's membership.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatcherStats {
    pub registered: usize,
    pub active: usize,
    pub wired: bool,
}

/// Feature set keyed by id, iterated in registration order.
///
/// Stored as an immutable slice that is replaced on every change, so a
/// forwarder iterating a snapshot is unaffected by a member starting or
/// stopping another feature mid-dispatch.
pub(crate) struct Membership {
    members: RefCell<Rc<[FeatureHandle]>>,
}

impl Membership {
    pub(crate) fn new() -> Self {
        Self {
            members: RefCell::new(Rc::from(Vec::new())),
        }
    }

    /// Add `feature`; false when a member with the same id is present.
    pub(crate) fn insert(&self, feature: &FeatureHandle) -> bool {
        if self.contains(feature.id()) {
            return false;
        }
        let mut next = self.snapshot().to_vec();
        next.push(feature.clone());
        *self.members.borrow_mut() = Rc::from(next);
        true
    }

    pub(crate) fn remove(&self, id: &str) -> bool {
        if !self.contains(id) {
            return false;
        }
        let next: Vec<FeatureHandle> = self
            .snapshot()
            .iter()
            .filter(|member| member.id() != id)
            .cloned()
            .collect();
        *self.members.borrow_mut() = Rc::from(next);
        true
    }

    pub(crate) fn contains(&self, id: &str) -> bool {
        self.members.borrow().iter().any(|member| member.id() == id)
    }

    pub(crate) fn snapshot(&self) -> Rc<[FeatureHandle]> {
        self.members.borrow().clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.members.borrow().len()
    }

    pub(crate) fn active(&self) -> usize {
        self.members
            .borrow()
            .iter()
            .filter(|member| member.is_running())
            .count()
    }
}

/// Forward one event to every eligible member.
///
/// A member is skipped when it is stopped, when its predicate is false, or
/// when it is already borrowed by a callback further up the stack. Errors
/// and panics are logged per member and the fan-out continues.
pub(crate) fn forward(
    members: &[FeatureHandle],
    phase: &'static str,
    mut call: impl FnMut(&mut dyn Feature) -> Result<()>,
) {
    for member in members {
        if !member.is_running() {
            continue;
        }

        let Some(mut body) = member.body_mut() else {
            tracing::warn!(feature = member.name(), phase, "feature busy, skipping dispatch");
            continue;
        };

        let outcome = contain(|| {
            if !body.should_load() {
                return Ok(());
            }
            call(body.as_mut())
        });
        drop(body);

        if let Err(fault) = outcome {
            tracing::error!(feature = member.name(), phase, error = %fault, "feature callback failed");
        }
    }
}
