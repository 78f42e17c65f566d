use std::cell::{Cell, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use anyhow::{anyhow, Result};
use serde::Serialize;

use crate::bus::EventBus;
use crate::event::{
    HudPostRender, HudPreRender, HudRender, SlotClick, SlotPostRender, SlotPreRender, SlotRender,
};
use crate::fault::contain;
use crate::services::FeatureServices;

/// Callbacks for the three HUD render phases.
///
/// Every method defaults to a no-op, so an implementor only overrides the
/// phases it draws in.
pub trait HudRenderable {
    fn on_hud_pre_render(&mut self, _event: &mut HudPreRender) -> Result<()> {
        Ok(())
    }

    fn on_hud_render(&mut self, _event: &mut HudRender) -> Result<()> {
        Ok(())
    }

    fn on_hud_post_render(&mut self, _event: &mut HudPostRender) -> Result<()> {
        Ok(())
    }
}

/// Callbacks for the container slot render phases.
pub trait SlotRenderable {
    fn on_slot_pre_render(&mut self, _event: &mut SlotPreRender) -> Result<()> {
        Ok(())
    }

    /// May swap, hide, or strip the tooltip of the slot being drawn.
    fn on_slot_render(&mut self, _event: &mut SlotRender) -> Result<()> {
        Ok(())
    }

    fn on_slot_post_render(&mut self, _event: &mut SlotPostRender) -> Result<()> {
        Ok(())
    }
}

pub trait SlotInteractable {
    /// Cancel the event to make the host drop the click.
    fn on_slot_click(&mut self, _event: &mut SlotClick) -> Result<()> {
        Ok(())
    }
}

/// The full event set, dispatched by the
/// [`GenericDispatcher`](crate::dispatch::GenericDispatcher).
pub trait EventHandler: HudRenderable + SlotRenderable + SlotInteractable {}

/// A unit of optional behavior.
///
/// A feature is constructed once by the [`FeatureCatalog`](crate::registry::FeatureCatalog)
/// and then started and stopped by the lifecycle manager as its
/// [`should_load`](Feature::should_load) predicate changes. Which events it
/// receives is decided by the capability accessors: each returns `Some`
/// when the feature implements the matching trait.
///
/// A feature that returns `Some` from
/// [`as_event_handler`](Feature::as_event_handler) is dispatched through
/// the generic dispatcher only; its other accessors are ignored.
/// A feature with no capability at all is self-managed and may subscribe
/// to the bus itself in [`on_init`](Feature::on_init).
pub trait Feature {
    /// Stable identifier, unique across the catalog (e.g. `"favorite_pets"`).
    fn id(&self) -> &'static str;

    /// Human-readable name used in logs and the console.
    fn name(&self) -> &'static str;

    /// Whether the feature should be running under the current configuration.
    ///
    /// Evaluated on every sync pass and again before every forwarded event.
    fn should_load(&self) -> bool;

    /// Called after the feature is marked running and registered with its
    /// dispatchers.
    fn on_init(&mut self, _ctx: &InitContext) -> Result<()> {
        Ok(())
    }

    /// Called before the feature is unregistered and marked stopped.
    fn on_terminate(&mut self) -> Result<()> {
        Ok(())
    }

    fn as_event_handler(&mut self) -> Option<&mut dyn EventHandler> {
        None
    }

    fn as_hud_renderable(&mut self) -> Option<&mut dyn HudRenderable> {
        None
    }

    fn as_slot_renderable(&mut self) -> Option<&mut dyn SlotRenderable> {
        None
    }

    fn as_slot_interactable(&mut self) -> Option<&mut dyn SlotInteractable> {
        None
    }
}

/// Handed to [`Feature::on_init`].
///
/// Self-managed features subscribe to the bus here and keep a clone of
/// the running flag so their listeners can ignore events while stopped.
pub struct InitContext<'a> {
    pub bus: &'a EventBus,
    pub running: RunningFlag,
}

/// Shared view of a feature's running state.
///
/// Only the lifecycle writes it; listeners and dispatchers read it.
#[derive(Debug, Clone, Default)]
pub struct RunningFlag(Rc<Cell<bool>>);

impl RunningFlag {
    pub fn get(&self) -> bool {
        self.0.get()
    }

    pub(crate) fn set(&self, running: bool) {
        self.0.set(running);
    }
}

/// Which capability traits a feature exposes, probed once at discovery.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub generic: bool,
    pub hud: bool,
    pub slot_render: bool,
    pub slot_interact: bool,
}

impl Capabilities {
    pub fn probe(feature: &mut dyn Feature) -> Self {
        if feature.as_event_handler().is_some() {
            return Self {
                generic: true,
                ..Self::default()
            };
        }
        Self {
            generic: false,
            hud: feature.as_hud_renderable().is_some(),
            slot_render: feature.as_slot_renderable().is_some(),
            slot_interact: feature.as_slot_interactable().is_some(),
        }
    }

    pub fn is_slot(&self) -> bool {
        self.slot_render || self.slot_interact
    }

    /// True when at least one dispatcher forwards events to the feature.
    pub fn is_dispatched(&self) -> bool {
        self.generic || self.hud || self.is_slot()
    }

    pub fn kind(&self) -> FeatureKind {
        match (self.generic, self.hud, self.is_slot()) {
            (true, _, _) => FeatureKind::Event,
            (false, true, false) => FeatureKind::Hud,
            (false, false, true) => FeatureKind::Slot,
            (false, true, true) => FeatureKind::Mixed,
            (false, false, false) => FeatureKind::Legacy,
        }
    }

    /// Short capability labels for discovery logs.
    pub fn labels(&self) -> Vec<&'static str> {
        if self.generic {
            return vec!["Full Event System"];
        }
        let mut labels = Vec::new();
        if self.hud {
            labels.push("HUD");
        }
        if self.slot_render {
            labels.push("Slot Rendering");
        }
        if self.slot_interact {
            labels.push("Slot Interaction");
        }
        if labels.is_empty() {
            labels.push("Legacy/Custom");
        }
        labels
    }
}

/// The dispatch shape of a feature, used for grouping in logs and stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    Event,
    Hud,
    Slot,
    Mixed,
    Legacy,
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FeatureKind::Event => "Full Event System",
            FeatureKind::Hud => "HUD Event System",
            FeatureKind::Slot => "Slot Event System",
            FeatureKind::Mixed => "HUD + Slot",
            FeatureKind::Legacy => "Legacy/Custom",
        };
        f.write_str(label)
    }
}

struct FeatureCell {
    id: &'static str,
    name: &'static str,
    capabilities: Capabilities,
    running: RunningFlag,
    body: RefCell<Box<dyn Feature>>,
}

/// Shared handle to a discovered feature.
///
/// Identity, name and capabilities are captured at construction so the
/// dispatchers can inspect a handle without borrowing the feature itself.
#[derive(Clone)]
pub struct FeatureHandle(Rc<FeatureCell>);

impl FeatureHandle {
    pub fn new(mut feature: Box<dyn Feature>) -> Self {
        let capabilities = Capabilities::probe(feature.as_mut());
        Self(Rc::new(FeatureCell {
            id: feature.id(),
            name: feature.name(),
            capabilities,
            running: RunningFlag::default(),
            body: RefCell::new(feature),
        }))
    }

    pub fn id(&self) -> &'static str {
        self.0.id
    }

    pub fn name(&self) -> &'static str {
        self.0.name
    }

    pub fn capabilities(&self) -> Capabilities {
        self.0.capabilities
    }

    pub fn kind(&self) -> FeatureKind {
        self.0.capabilities.kind()
    }

    pub fn is_running(&self) -> bool {
        self.0.running.get()
    }

    pub fn running_flag(&self) -> RunningFlag {
        self.0.running.clone()
    }

    /// Evaluate the feature's predicate. `None` while the feature is
    /// borrowed by a callback further up the stack.
    pub fn should_load(&self) -> Option<bool> {
        self.0.body.try_borrow().ok().map(|body| body.should_load())
    }

    /// Start the feature. A no-op when it is already running.
    ///
    /// The feature is marked running and registered with its dispatchers
    /// before [`Feature::on_init`] runs; a failing hook is returned to the
    /// caller but leaves the feature running.
    pub fn init(&self, services: &FeatureServices) -> Result<()> {
        if self.is_running() {
            return Ok(());
        }

        self.0.running.set(true);
        services.register(self);
        if self.0.capabilities.is_dispatched() {
            services.activate_bridge();
        }

        let ctx = InitContext {
            bus: services.bus(),
            running: self.running_flag(),
        };
        self.hook(|feature| feature.on_init(&ctx))
    }

    /// Stop the feature. A no-op when it is already stopped.
    ///
    /// [`Feature::on_terminate`] runs first; the feature is unregistered and
    /// marked stopped even when the hook fails.
    pub fn terminate(&self, services: &FeatureServices) -> Result<()> {
        if !self.is_running() {
            return Ok(());
        }

        let outcome = self.hook(|feature| feature.on_terminate());
        services.unregister(self);
        self.0.running.set(false);
        outcome
    }

    /// Borrow the feature mutably, failing if a callback already holds it.
    pub(crate) fn body_mut(&self) -> Option<RefMut<'_, Box<dyn Feature>>> {
        self.0.body.try_borrow_mut().ok()
    }

    fn hook(&self, call: impl FnOnce(&mut dyn Feature) -> Result<()>) -> Result<()> {
        let mut body = self
            .body_mut()
            .ok_or_else(|| anyhow!("feature `{}` is busy", self.0.id))?;
        contain(|| call(body.as_mut())).map_err(anyhow::Error::new)
    }
}

impl fmt::Debug for FeatureHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureHandle")
            .field("id", &self.0.id)
            .field("name", &self.0.name)
            .field("capabilities", &self.0.capabilities)
            .field("running", &self.is_running())
            .finish()
    }
}
