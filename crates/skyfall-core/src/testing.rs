//! Scriptable feature used across the crate's tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use anyhow::{bail, Result};

use crate::event::{
    HudPostRender, HudPreRender, HudRender, SlotClick, SlotPostRender, SlotPreRender, SlotRender,
};
use crate::feature::{
    EventHandler, Feature, FeatureHandle, HudRenderable, InitContext, SlotInteractable,
    SlotRenderable,
};

pub(crate) type Log = Rc<RefCell<Vec<String>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Shape {
    Generic,
    Hud,
    Slot,
    Legacy,
}

/// A feature whose predicate and failures are driven from the test, and
/// which records every callback as `"<id>:<phase>"`.
#[derive(Clone)]
pub(crate) struct Probe {
    id: &'static str,
    shape: Shape,
    log: Log,
    should_load: Rc<Cell<bool>>,
    fail_init: Rc<Cell<bool>>,
    fail_terminate: Rc<Cell<bool>>,
    fail_events: Rc<Cell<bool>>,
    panic_predicate: Rc<Cell<bool>>,
}

impl Probe {
    pub(crate) fn new(id: &'static str, shape: Shape) -> Self {
        Self {
            id,
            shape,
            log: Log::default(),
            should_load: Rc::new(Cell::new(true)),
            fail_init: Rc::new(Cell::new(false)),
            fail_terminate: Rc::new(Cell::new(false)),
            fail_events: Rc::new(Cell::new(false)),
            panic_predicate: Rc::new(Cell::new(false)),
        }
    }

    pub(crate) fn hud(id: &'static str) -> Self {
        Self::new(id, Shape::Hud)
    }

    pub(crate) fn slot(id: &'static str) -> Self {
        Self::new(id, Shape::Slot)
    }

    pub(crate) fn generic(id: &'static str) -> Self {
        Self::new(id, Shape::Generic)
    }

    pub(crate) fn legacy(id: &'static str) -> Self {
        Self::new(id, Shape::Legacy)
    }

    /// Record into `log` instead of a private one.
    pub(crate) fn with_log(mut self, log: &Log) -> Self {
        self.log = log.clone();
        self
    }

    pub(crate) fn set_should_load(&self, value: bool) {
        self.should_load.set(value);
    }

    pub(crate) fn fail_init(&self) {
        self.fail_init.set(true);
    }

    pub(crate) fn fail_terminate(&self) {
        self.fail_terminate.set(true);
    }

    /// Make `should_load` panic while `value` is set.
    pub(crate) fn set_predicate_panics(&self, value: bool) {
        self.panic_predicate.set(value);
    }

    pub(crate) fn fail_events(&self) {
        self.fail_events.set(true);
    }

    pub(crate) fn events(&self) -> Vec<String> {
        self.log.borrow().clone()
    }

    /// How many times `phase` was recorded for this probe.
    pub(crate) fn count(&self, phase: &str) -> usize {
        let tag = format!("{}:{}", self.id, phase);
        self.log.borrow().iter().filter(|entry| **entry == tag).count()
    }

    pub(crate) fn handle(&self) -> FeatureHandle {
        FeatureHandle::new(Box::new(self.clone()))
    }

    fn record(&self, phase: &str) -> Result<()> {
        self.log.borrow_mut().push(format!("{}:{}", self.id, phase));
        if self.fail_events.get() {
            bail!("{} failed in {}", self.id, phase);
        }
        Ok(())
    }
}

impl Feature for Probe {
    fn id(&self) -> &'static str {
        self.id
    }

    fn name(&self) -> &'static str {
        self.id
    }

    fn should_load(&self) -> bool {
        if self.panic_predicate.get() {
            panic!("{} predicate blew up", self.id);
        }
        self.should_load.get()
    }

    fn on_init(&mut self, _ctx: &InitContext) -> Result<()> {
        self.log.borrow_mut().push(format!("{}:init", self.id));
        if self.fail_init.get() {
            bail!("{} refused to start", self.id);
        }
        Ok(())
    }

    fn on_terminate(&mut self) -> Result<()> {
        self.log.borrow_mut().push(format!("{}:terminate", self.id));
        if self.fail_terminate.get() {
            bail!("{} refused to stop", self.id);
        }
        Ok(())
    }

    fn as_event_handler(&mut self) -> Option<&mut dyn EventHandler> {
        match self.shape {
            Shape::Generic => Some(self),
            _ => None,
        }
    }

    fn as_hud_renderable(&mut self) -> Option<&mut dyn HudRenderable> {
        match self.shape {
            Shape::Hud => Some(self),
            _ => None,
        }
    }

    fn as_slot_renderable(&mut self) -> Option<&mut dyn SlotRenderable> {
        match self.shape {
            Shape::Slot => Some(self),
            _ => None,
        }
    }

    fn as_slot_interactable(&mut self) -> Option<&mut dyn SlotInteractable> {
        match self.shape {
            Shape::Slot => Some(self),
            _ => None,
        }
    }
}

impl HudRenderable for Probe {
    fn on_hud_pre_render(&mut self, _event: &mut HudPreRender) -> Result<()> {
        self.record("hud_pre")
    }

    fn on_hud_render(&mut self, _event: &mut HudRender) -> Result<()> {
        self.record("hud")
    }

    fn on_hud_post_render(&mut self, _event: &mut HudPostRender) -> Result<()> {
        self.record("hud_post")
    }
}

impl SlotRenderable for Probe {
    fn on_slot_pre_render(&mut self, _event: &mut SlotPreRender) -> Result<()> {
        self.record("slot_pre")
    }

    fn on_slot_render(&mut self, _event: &mut SlotRender) -> Result<()> {
        self.record("slot")
    }

    fn on_slot_post_render(&mut self, _event: &mut SlotPostRender) -> Result<()> {
        self.record("slot_post")
    }
}

impl SlotInteractable for Probe {
    fn on_slot_click(&mut self, _event: &mut SlotClick) -> Result<()> {
        self.record("click")
    }
}

impl EventHandler for Probe {}

/// Fresh instances of every event, drawing into a throwaway canvas.
pub(crate) mod events {
    use crate::canvas::RecordingCanvas;
    use crate::event::*;
    use crate::item::{ItemStack, Slot, SlotActionType, SlotContainer};

    fn stack() -> ItemStack {
        ItemStack::new("stone", "Stone")
    }

    fn slot() -> Slot {
        Slot::new(0, 0, SlotContainer::Chest, stack())
    }

    pub(crate) fn hud_pre() -> HudPreRender {
        HudPreRender::new(RecordingCanvas::context(10, 4).0, 0.5)
    }

    pub(crate) fn hud() -> HudRender {
        HudRender::new(RecordingCanvas::context(10, 4).0, 0.5)
    }

    pub(crate) fn hud_post() -> HudPostRender {
        HudPostRender::new(RecordingCanvas::context(10, 4).0, 0.5)
    }

    pub(crate) fn slot_pre() -> SlotPreRender {
        SlotPreRender::new(RecordingCanvas::context(10, 4).0, slot(), stack(), "Chest")
    }

    pub(crate) fn slot_render() -> SlotRender {
        SlotRender::new(RecordingCanvas::context(10, 4).0, slot(), stack(), "Chest")
    }

    pub(crate) fn slot_post() -> SlotPostRender {
        SlotPostRender::new(RecordingCanvas::context(10, 4).0, slot(), stack(), "Chest")
    }

    pub(crate) fn click() -> SlotClick {
        SlotClick::new(
            Some(slot()),
            0,
            0,
            SlotActionType::Pickup,
            "Chest",
            ItemStack::empty(),
            Some(stack()),
        )
    }
}
