use std::cell::Cell;
use std::rc::{Rc, Weak};

use anyhow::Result;

use super::{forward, DispatcherStats, Membership, DISPATCH_PRIORITY};
use crate::bus::EventBus;
use crate::event::{Event, SlotClick, SlotPostRender, SlotPreRender, SlotRender};
use crate::feature::{FeatureHandle, SlotRenderable};

/// Forwards slot render phases and slot clicks.
///
/// Renderable and interactable features are tracked separately; a feature
/// joins whichever sets its capabilities name.
#[derive(Clone)]
pub struct SlotDispatcher {
    inner: Rc<SlotInner>,
}

struct SlotInner {
    bus: EventBus,
    renderable: Membership,
    interactable: Membership,
    wired: Cell<bool>,
}

impl SlotDispatcher {
    pub fn new(bus: EventBus) -> Self {
        Self {
            inner: Rc::new(SlotInner {
                bus,
                renderable: Membership::new(),
                interactable: Membership::new(),
                wired: Cell::new(false),
            }),
        }
    }

    /// Add `feature` to the sets matching its capabilities. Returns true if
    /// it joined at least one of them.
    pub fn register(&self, feature: &FeatureHandle) -> bool {
        let caps = feature.capabilities();
        let mut added = false;

        if caps.slot_render && self.inner.renderable.insert(feature) {
            tracing::info!(feature = feature.name(), "registered slot renderable feature");
            added = true;
        }
        if caps.slot_interact && self.inner.interactable.insert(feature) {
            tracing::info!(feature = feature.name(), "registered slot interactable feature");
            added = true;
        }

        if added {
            self.wire();
        }
        added
    }

    pub fn unregister(&self, feature: &FeatureHandle) -> bool {
        let mut removed = false;

        if self.inner.renderable.remove(feature.id()) {
            tracing::info!(feature = feature.name(), "unregistered slot renderable feature");
            removed = true;
        }
        if self.inner.interactable.remove(feature.id()) {
            tracing::info!(feature = feature.name(), "unregistered slot interactable feature");
            removed = true;
        }
        removed
    }

    pub fn contains_renderable(&self, id: &str) -> bool {
        self.inner.renderable.contains(id)
    }

    pub fn contains_interactable(&self, id: &str) -> bool {
        self.inner.interactable.contains(id)
    }

    pub fn is_wired(&self) -> bool {
        self.inner.wired.get()
    }

    /// Counts distinct features across both sets.
    pub fn stats(&self) -> DispatcherStats {
        let mut members: Vec<FeatureHandle> = self.inner.renderable.snapshot().to_vec();
        for member in self.inner.interactable.snapshot().iter() {
            if !members.iter().any(|m| m.id() == member.id()) {
                members.push(member.clone());
            }
        }
        DispatcherStats {
            registered: members.len(),
            active: members.iter().filter(|m| m.is_running()).count(),
            wired: self.is_wired(),
        }
    }

    fn wire(&self) {
        if self.inner.wired.replace(true) {
            return;
        }

        let weak = Rc::downgrade(&self.inner);
        listen_render(
            &self.inner.bus,
            &weak,
            "slot pre-render",
            |slot: &mut dyn SlotRenderable, event: &mut SlotPreRender| slot.on_slot_pre_render(event),
        );
        listen_render(
            &self.inner.bus,
            &weak,
            "slot render",
            |slot: &mut dyn SlotRenderable, event: &mut SlotRender| slot.on_slot_render(event),
        );
        listen_render(
            &self.inner.bus,
            &weak,
            "slot post-render",
            |slot: &mut dyn SlotRenderable, event: &mut SlotPostRender| {
                slot.on_slot_post_render(event)
            },
        );

        let inner = weak.clone();
        self.inner
            .bus
            .listen(DISPATCH_PRIORITY, move |event: &mut SlotClick| {
                let Some(inner) = inner.upgrade() else {
                    return Ok(());
                };
                let members = inner.interactable.snapshot();
                forward(&members, "slot click", |feature| {
                    match feature.as_slot_interactable() {
                        Some(slot) => slot.on_slot_click(&mut *event),
                        None => Ok(()),
                    }
                });
                Ok(())
            });

        tracing::info!("slot event system initialized");
    }
}

fn listen_render<E: Event>(
    bus: &EventBus,
    inner: &Weak<SlotInner>,
    phase: &'static str,
    call: fn(&mut dyn SlotRenderable, &mut E) -> Result<()>,
) {
    let inner = inner.clone();
    bus.listen(DISPATCH_PRIORITY, move |event: &mut E| {
        let Some(inner) = inner.upgrade() else {
            return Ok(());
        };
        let members = inner.renderable.snapshot();
        forward(&members, phase, |feature| match feature.as_slot_renderable() {
            Some(slot) => call(slot, &mut *event),
            None => Ok(()),
        });
        Ok(())
    });
}
