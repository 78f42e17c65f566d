use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use anyhow::Result;

use super::{forward, DispatcherStats, Membership, DISPATCH_PRIORITY};
use crate::bus::EventBus;
use crate::event::{Event, HudPostRender, HudPreRender, HudRender};
use crate::fault::contain;
use crate::feature::{FeatureHandle, HudRenderable};

/// A HUD renderable that is not a feature. It has no lifecycle and
/// receives every HUD event while registered.
pub type SharedRenderable = Rc<RefCell<dyn HudRenderable>>;

/// Forwards the three HUD render phases to HUD-capable features.
#[derive(Clone)]
pub struct HudDispatcher {
    inner: Rc<HudInner>,
}

struct HudInner {
    bus: EventBus,
    features: Membership,
    renderables: RefCell<Rc<[SharedRenderable]>>,
    wired: Cell<bool>,
}

impl HudDispatcher {
    pub fn new(bus: EventBus) -> Self {
        Self {
            inner: Rc::new(HudInner {
                bus,
                features: Membership::new(),
                renderables: RefCell::new(Rc::from(Vec::new())),
                wired: Cell::new(false),
            }),
        }
    }

    /// Add `feature`. Returns false if it was already a member.
    pub fn register(&self, feature: &FeatureHandle) -> bool {
        if !self.inner.features.insert(feature) {
            return false;
        }
        tracing::info!(feature = feature.name(), "registered HUD feature");
        self.wire();
        true
    }

    pub fn unregister(&self, feature: &FeatureHandle) -> bool {
        let removed = self.inner.features.remove(feature.id());
        if removed {
            tracing::info!(feature = feature.name(), "unregistered HUD feature");
        }
        removed
    }

    /// Add a renderable that is not managed by the lifecycle.
    ///
    /// Membership is by pointer identity.
    pub fn register_renderable(&self, renderable: SharedRenderable) -> bool {
        let current = self.renderables();
        if current.iter().any(|r| Rc::ptr_eq(r, &renderable)) {
            return false;
        }
        let mut next = current.to_vec();
        next.push(renderable);
        *self.inner.renderables.borrow_mut() = Rc::from(next);
        tracing::info!("registered standalone HUD renderable");
        self.wire();
        true
    }

    pub fn unregister_renderable(&self, renderable: &SharedRenderable) -> bool {
        let current = self.renderables();
        if !current.iter().any(|r| Rc::ptr_eq(r, renderable)) {
            return false;
        }
        let next: Vec<SharedRenderable> = current
            .iter()
            .filter(|r| !Rc::ptr_eq(r, renderable))
            .cloned()
            .collect();
        *self.inner.renderables.borrow_mut() = Rc::from(next);
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.inner.features.contains(id)
    }

    pub fn is_wired(&self) -> bool {
        self.inner.wired.get()
    }

    pub fn stats(&self) -> DispatcherStats {
        DispatcherStats {
            registered: self.inner.features.len() + self.renderables().len(),
            active: self.inner.features.active() + self.renderables().len(),
            wired: self.is_wired(),
        }
    }

    fn renderables(&self) -> Rc<[SharedRenderable]> {
        self.inner.renderables.borrow().clone()
    }

    fn wire(&self) {
        if self.inner.wired.replace(true) {
            return;
        }

        let weak = Rc::downgrade(&self.inner);
        listen(
            &self.inner.bus,
            &weak,
            "hud pre-render",
            |hud: &mut dyn HudRenderable, event: &mut HudPreRender| hud.on_hud_pre_render(event),
        );
        listen(
            &self.inner.bus,
            &weak,
            "hud render",
            |hud: &mut dyn HudRenderable, event: &mut HudRender| hud.on_hud_render(event),
        );
        listen(
            &self.inner.bus,
            &weak,
            "hud post-render",
            |hud: &mut dyn HudRenderable, event: &mut HudPostRender| hud.on_hud_post_render(event),
        );

        tracing::info!("HUD event system initialized");
    }
}

fn listen<E: Event>(
    bus: &EventBus,
    inner: &Weak<HudInner>,
    phase: &'static str,
    call: fn(&mut dyn HudRenderable, &mut E) -> Result<()>,
) {
    let inner = inner.clone();
    bus.listen(DISPATCH_PRIORITY, move |event: &mut E| {
        let Some(inner) = inner.upgrade() else {
            return Ok(());
        };

        let members = inner.features.snapshot();
        forward(&members, phase, |feature| match feature.as_hud_renderable() {
            Some(hud) => call(hud, &mut *event),
            None => Ok(()),
        });

        let renderables = inner.renderables.borrow().clone();
        for renderable in renderables.iter() {
            let Ok(mut renderable) = renderable.try_borrow_mut() else {
                tracing::warn!(phase, "standalone HUD renderable busy, skipping");
                continue;
            };
            if let Err(fault) = contain(|| call(&mut *renderable, &mut *event)) {
                tracing::error!(phase, error = %fault, "standalone HUD renderable failed");
            }
        }
        Ok(())
    });
}
