use std::rc::Rc;

use crate::bus::EventBus;
use crate::dispatch::{GenericDispatcher, HudDispatcher, SlotDispatcher};
use crate::feature::FeatureHandle;

/// One-time activation of the host adapter.
///
/// The adapter translates host callbacks into bus events. It is activated
/// the first time a dispatched feature starts and stays wired for the rest
/// of the process.
pub trait HostBridge {
    /// Wire the host callbacks. Calling it again must be a no-op.
    fn initialize(&self);

    fn is_initialized(&self) -> bool;
}

/// The bus, the three capability dispatchers, and the host bridge.
///
/// Built once by the application root and passed to the lifecycle.
pub struct FeatureServices {
    bus: EventBus,
    hud: HudDispatcher,
    slot: SlotDispatcher,
    generic: GenericDispatcher,
    bridge: Option<Rc<dyn HostBridge>>,
}

impl FeatureServices {
    pub fn new(bus: EventBus) -> Self {
        Self {
            hud: HudDispatcher::new(bus.clone()),
            slot: SlotDispatcher::new(bus.clone()),
            generic: GenericDispatcher::new(bus.clone()),
            bus,
            bridge: None,
        }
    }

    pub fn with_bridge(mut self, bridge: Rc<dyn HostBridge>) -> Self {
        self.bridge = Some(bridge);
        self
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn hud(&self) -> &HudDispatcher {
        &self.hud
    }

    pub fn slot(&self) -> &SlotDispatcher {
        &self.slot
    }

    pub fn generic(&self) -> &GenericDispatcher {
        &self.generic
    }

    pub fn bridge(&self) -> Option<&Rc<dyn HostBridge>> {
        self.bridge.as_ref()
    }

    /// True when `feature` is a member of every dispatcher its
    /// capabilities name.
    pub fn is_registered(&self, feature: &FeatureHandle) -> bool {
        let caps = feature.capabilities();
        if caps.generic {
            return self.generic.contains(feature.id());
        }
        (!caps.hud || self.hud.contains(feature.id()))
            && (!caps.slot_render || self.slot.contains_renderable(feature.id()))
            && (!caps.slot_interact || self.slot.contains_interactable(feature.id()))
    }

    pub(crate) fn register(&self, feature: &FeatureHandle) {
        let caps = feature.capabilities();
        if caps.generic {
            self.generic.register(feature);
            return;
        }
        if caps.hud {
            self.hud.register(feature);
        }
        if caps.is_slot() {
            self.slot.register(feature);
        }
    }

    pub(crate) fn unregister(&self, feature: &FeatureHandle) {
        let caps = feature.capabilities();
        if caps.generic {
            self.generic.unregister(feature);
            return;
        }
        if caps.hud {
            self.hud.unregister(feature);
        }
        if caps.is_slot() {
            self.slot.unregister(feature);
        }
    }

    pub(crate) fn activate_bridge(&self) {
        match &self.bridge {
            Some(bridge) => bridge.initialize(),
            None => tracing::debug!("no host bridge attached, skipping activation"),
        }
    }
}
