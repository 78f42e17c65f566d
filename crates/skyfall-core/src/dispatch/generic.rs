use std::cell::Cell;
use std::rc::{Rc, Weak};

use anyhow::Result;

use super::{forward, DispatcherStats, Membership, DISPATCH_PRIORITY};
use crate::bus::EventBus;
use crate::event::{
    Event, HudPostRender, HudPreRender, HudRender, SlotClick, SlotPostRender, SlotPreRender,
    SlotRender,
};
use crate::feature::{EventHandler, FeatureHandle};

/// Forwards every HUD and slot event to features implementing
/// [`EventHandler`].
#[derive(Clone)]
pub struct GenericDispatcher {
    inner: Rc<GenericInner>,
}

struct GenericInner {
    bus: EventBus,
    features: Membership,
    wired: Cell<bool>,
}

type Call<E> = fn(&mut dyn EventHandler, &mut E) -> Result<()>;

impl GenericDispatcher {
    pub fn new(bus: EventBus) -> Self {
        Self {
            inner: Rc::new(GenericInner {
                bus,
                features: Membership::new(),
                wired: Cell::new(false),
            }),
        }
    }

    pub fn register(&self, feature: &FeatureHandle) -> bool {
        if !self.inner.features.insert(feature) {
            return false;
        }
        tracing::info!(feature = feature.name(), "registered feature for events");
        self.wire();
        true
    }

    pub fn unregister(&self, feature: &FeatureHandle) -> bool {
        let removed = self.inner.features.remove(feature.id());
        if removed {
            tracing::info!(feature = feature.name(), "unregistered feature from events");
        }
        removed
    }

    pub fn contains(&self, id: &str) -> bool {
        self.inner.features.contains(id)
    }

    pub fn is_wired(&self) -> bool {
        self.inner.wired.get()
    }

    pub fn stats(&self) -> DispatcherStats {
        DispatcherStats {
            registered: self.inner.features.len(),
            active: self.inner.features.active(),
            wired: self.is_wired(),
        }
    }

    fn wire(&self) {
        if self.inner.wired.replace(true) {
            return;
        }

        let weak = Rc::downgrade(&self.inner);
        let bus = &self.inner.bus;
        listen::<HudPreRender>(bus, &weak, "hud pre-render", |f, e| f.on_hud_pre_render(e));
        listen::<HudRender>(bus, &weak, "hud render", |f, e| f.on_hud_render(e));
        listen::<HudPostRender>(bus, &weak, "hud post-render", |f, e| f.on_hud_post_render(e));
        listen::<SlotPreRender>(bus, &weak, "slot pre-render", |f, e| f.on_slot_pre_render(e));
        listen::<SlotRender>(bus, &weak, "slot render", |f, e| f.on_slot_render(e));
        listen::<SlotPostRender>(bus, &weak, "slot post-render", |f, e| {
            f.on_slot_post_render(e)
        });
        listen::<SlotClick>(bus, &weak, "slot click", |f, e| f.on_slot_click(e));

        tracing::info!(
            features = self.inner.features.len(),
            "feature event system initialized"
        );
    }
}

fn listen<E: Event>(bus: &EventBus, inner: &Weak<GenericInner>, phase: &'static str, call: Call<E>) {
    let inner = inner.clone();
    bus.listen(DISPATCH_PRIORITY, move |event: &mut E| {
        let Some(inner) = inner.upgrade() else {
            return Ok(());
        };
        let members = inner.features.snapshot();
        forward(&members, phase, |feature| match feature.as_event_handler() {
            Some(handler) => call(handler, &mut *event),
            None => Ok(()),
        });
        Ok(())
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{events, Log, Probe};

    fn running(probe: &Probe) -> FeatureHandle {
        let handle = probe.handle();
        handle.running_flag().set(true);
        handle
    }

    #[test]
    fn wires_all_seven_events_once() {
        let bus = EventBus::new();
        let generic = GenericDispatcher::new(bus.clone());
        generic.register(&running(&Probe::generic("a")));
        generic.register(&running(&Probe::generic("b")));

        assert_eq!(bus.listener_count::<HudPreRender>(), 1);
        assert_eq!(bus.listener_count::<HudRender>(), 1);
        assert_eq!(bus.listener_count::<HudPostRender>(), 1);
        assert_eq!(bus.listener_count::<SlotPreRender>(), 1);
        assert_eq!(bus.listener_count::<SlotRender>(), 1);
        assert_eq!(bus.listener_count::<SlotPostRender>(), 1);
        assert_eq!(bus.listener_count::<SlotClick>(), 1);
    }

    #[test]
    fn every_event_reaches_the_handler() {
        let bus = EventBus::new();
        let generic = GenericDispatcher::new(bus.clone());
        let probe = Probe::generic("monitor");
        generic.register(&running(&probe));

        bus.publish(&mut events::hud_pre());
        bus.publish(&mut events::hud());
        bus.publish(&mut events::hud_post());
        bus.publish(&mut events::slot_pre());
        bus.publish(&mut events::slot_render());
        bus.publish(&mut events::slot_post());
        bus.publish(&mut events::click());
        assert_eq!(probe.events().len(), 7);
        assert_eq!(probe.count("click"), 1);
    }

    #[test]
    fn members_are_visited_in_registration_order() {
        let bus = EventBus::new();
        let generic = GenericDispatcher::new(bus.clone());
        let log = Log::default();
        let first = Probe::generic("first").with_log(&log);
        let second = Probe::generic("second").with_log(&log);
        generic.register(&running(&second));
        generic.register(&running(&first));

        bus.publish(&mut events::hud());
        assert_eq!(*log.borrow(), vec!["second:hud", "first:hud"]);
    }

    #[test]
    fn stats_track_running_members() {
        let bus = EventBus::new();
        let generic = GenericDispatcher::new(bus);
        let idle = Probe::generic("idle").handle();
        generic.register(&running(&Probe::generic("live")));
        generic.register(&idle);
        assert_eq!(
            generic.stats(),
            DispatcherStats { registered: 2, active: 1, wired: true }
        );
    }
}
