//! Host adapter: turns host callbacks into bus events.
//!
//! This is the only crate that knows the shape of host callbacks. The host
//! calls into [`EventBridge`] from its render and input paths; the bridge
//! builds the matching event, publishes it, and hands back whatever the
//! host needs to honour (slot replacement, click cancellation).

use std::cell::Cell;

use skyfall_core::bus::EventBus;
use skyfall_core::canvas::DrawContext;
use skyfall_core::event::{
    ClientTick, Event, HudPostRender, HudPreRender, HudRender, SlotClick, SlotPostRender,
    SlotPreRender, SlotRender,
};
use skyfall_core::item::{ItemStack, Slot, SlotActionType};
use skyfall_core::services::HostBridge;

/// Adapter between the host and the [`EventBus`].
///
/// Render and click calls are inert until [`HostBridge::initialize`] has
/// run, which the lifecycle does when the first dispatched feature starts.
/// Ticks are always published: self-managed features listen for them
/// without ever activating the bridge.
pub struct EventBridge {
    bus: EventBus,
    initialized: Cell<bool>,
    hud_hidden: Cell<bool>,
    tick: Cell<u64>,
}

impl EventBridge {
    pub fn new(bus: EventBus) -> Self {
        Self {
            bus,
            initialized: Cell::new(false),
            hud_hidden: Cell::new(false),
            tick: Cell::new(0),
        }
    }

    /// Host reports whether the HUD is currently hidden (F1-style toggle).
    pub fn set_hud_hidden(&self, hidden: bool) {
        self.hud_hidden.set(hidden);
    }

    pub fn is_hud_hidden(&self) -> bool {
        self.hud_hidden.get()
    }

    /// One HUD render pass: Pre, Main, then Post.
    ///
    /// Returns false when the pass was skipped.
    pub fn render_hud(&self, ctx: &DrawContext, delta: f32) -> bool {
        if !self.initialized.get() || self.hud_hidden.get() {
            return false;
        }
        self.bus.publish(&mut HudPreRender::new(ctx.clone(), delta));
        self.bus.publish(&mut HudRender::new(ctx.clone(), delta));
        self.bus.publish(&mut HudPostRender::new(ctx.clone(), delta));
        true
    }

    pub fn slot_pre_render(&self, ctx: &DrawContext, slot: &Slot, screen_title: &str) {
        if !self.initialized.get() {
            return;
        }
        let mut event =
            SlotPreRender::new(ctx.clone(), slot.clone(), slot.stack.clone(), screen_title);
        self.bus.publish(&mut event);
    }

    /// Main slot pass. The returned event tells the host what to draw:
    /// [`SlotRender::replacement`], [`SlotRender::is_hidden`] and
    /// [`SlotRender::is_tooltip_hidden`]. Before initialization the event
    /// is returned untouched.
    pub fn slot_render(&self, ctx: &DrawContext, slot: &Slot, screen_title: &str) -> SlotRender {
        let mut event =
            SlotRender::new(ctx.clone(), slot.clone(), slot.stack.clone(), screen_title);
        if self.initialized.get() {
            self.bus.publish(&mut event);
        }
        event
    }

    pub fn slot_post_render(&self, ctx: &DrawContext, slot: &Slot, screen_title: &str) {
        if !self.initialized.get() {
            return;
        }
        let mut event =
            SlotPostRender::new(ctx.clone(), slot.clone(), slot.stack.clone(), screen_title);
        self.bus.publish(&mut event);
    }

    /// A click on a slot of the open screen. The host must drop the
    /// interaction when the returned event is cancelled.
    pub fn slot_click(
        &self,
        slot: Option<&Slot>,
        slot_id: i32,
        button: i32,
        action: SlotActionType,
        screen_title: &str,
        cursor: ItemStack,
    ) -> SlotClick {
        let original = slot.map(|s| s.stack.clone());
        let mut event = SlotClick::new(
            slot.cloned(),
            slot_id,
            button,
            action,
            screen_title,
            cursor,
            original,
        );
        if self.initialized.get() {
            self.bus.publish(&mut event);
            if event.is_cancelled() {
                tracing::debug!(slot_id, %action, "slot click cancelled by a feature");
            }
        }
        event
    }

    /// Publish the next [`ClientTick`] and return its number.
    pub fn client_tick(&self) -> u64 {
        let tick = self.tick.get().wrapping_add(1);
        self.tick.set(tick);
        self.bus.publish(&mut ClientTick::new(tick));
        tick
    }
}

impl HostBridge for EventBridge {
    fn initialize(&self) {
        if self.initialized.replace(true) {
            return;
        }
        tracing::info!("event bridge initialized");
    }

    fn is_initialized(&self) -> bool {
        self.initialized.get()
    }
}
