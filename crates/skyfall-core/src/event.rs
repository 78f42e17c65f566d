use std::any::Any;

use crate::canvas::DrawContext;
use crate::item::{ItemStack, Slot, SlotActionType};

/// A payload that can travel over the [`EventBus`](crate::bus::EventBus).
///
/// Every event carries a cancellation flag. The bus checks it before each
/// listener and stops dispatching the instance as soon as it is set.
pub trait Event: Any {
    fn is_cancelled(&self) -> bool;

    /// Mark the event cancelled. There is no way to un-cancel.
    fn cancel(&mut self);
}

/// Implement [`Event`] for structs that own a `cancelled: bool` field.
#[macro_export]
macro_rules! impl_event {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::event::Event for $ty {
                fn is_cancelled(&self) -> bool {
                    self.cancelled
                }

                fn cancel(&mut self) {
                    self.cancelled = true;
                }
            }
        )+
    };
}

// ── HUD render phases ──

/// Published before the main HUD pass of a frame.
#[derive(Clone)]
pub struct HudPreRender {
    pub ctx: DrawContext,
    pub delta: f32,
    cancelled: bool,
}

/// The main HUD pass. Features draw their overlays here.
#[derive(Clone)]
pub struct HudRender {
    pub ctx: DrawContext,
    pub delta: f32,
    cancelled: bool,
}

/// Published after every HUD overlay has been drawn.
#[derive(Clone)]
pub struct HudPostRender {
    pub ctx: DrawContext,
    pub delta: f32,
    cancelled: bool,
}

impl HudPreRender {
    pub fn new(ctx: DrawContext, delta: f32) -> Self {
        Self {
            ctx,
            delta,
            cancelled: false,
        }
    }
}

impl HudRender {
    pub fn new(ctx: DrawContext, delta: f32) -> Self {
        Self {
            ctx,
            delta,
            cancelled: false,
        }
    }
}

impl HudPostRender {
    pub fn new(ctx: DrawContext, delta: f32) -> Self {
        Self {
            ctx,
            delta,
            cancelled: false,
        }
    }
}

// ── Slot render phases ──

/// Published before a container slot is drawn.
#[derive(Clone)]
pub struct SlotPreRender {
    pub ctx: DrawContext,
    pub slot: Slot,
    pub original: ItemStack,
    pub screen_title: String,
    cancelled: bool,
}

/// The main slot pass.
///
/// Listeners may swap the rendered stack, hide the slot entirely, or
/// suppress its tooltip. The host reads the outcome back after publishing.
#[derive(Clone)]
pub struct SlotRender {
    pub ctx: DrawContext,
    pub slot: Slot,
    pub original: ItemStack,
    pub screen_title: String,
    replacement: ItemStack,
    hidden: bool,
    tooltip_hidden: bool,
    cancelled: bool,
}

/// Published after a container slot has been drawn.
#[derive(Clone)]
pub struct SlotPostRender {
    pub ctx: DrawContext,
    pub slot: Slot,
    pub original: ItemStack,
    pub screen_title: String,
    cancelled: bool,
}

impl SlotPreRender {
    pub fn new(
        ctx: DrawContext,
        slot: Slot,
        original: ItemStack,
        screen_title: impl Into<String>,
    ) -> Self {
        Self {
            ctx,
            slot,
            original,
            screen_title: screen_title.into(),
            cancelled: false,
        }
    }
}

impl SlotRender {
    pub fn new(
        ctx: DrawContext,
        slot: Slot,
        original: ItemStack,
        screen_title: impl Into<String>,
    ) -> Self {
        Self {
            ctx,
            slot,
            replacement: original.clone(),
            original,
            screen_title: screen_title.into(),
            hidden: false,
            tooltip_hidden: false,
            cancelled: false,
        }
    }

    /// Render `stack` in place of the slot's real contents.
    pub fn replace_with(&mut self, stack: ItemStack) {
        self.replacement = stack;
    }

    pub fn hide(&mut self) {
        self.hidden = true;
    }

    pub fn hide_tooltip(&mut self) {
        self.tooltip_hidden = true;
    }

    /// The stack the host should draw. Equals `original` unless replaced.
    pub fn replacement(&self) -> &ItemStack {
        &self.replacement
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn is_tooltip_hidden(&self) -> bool {
        self.tooltip_hidden
    }
}

impl SlotPostRender {
    pub fn new(
        ctx: DrawContext,
        slot: Slot,
        original: ItemStack,
        screen_title: impl Into<String>,
    ) -> Self {
        Self {
            ctx,
            slot,
            original,
            screen_title: screen_title.into(),
            cancelled: false,
        }
    }
}

// ── Slot interaction ──

/// A click on a container slot. Cancelling it tells the host to drop the
/// interaction.
#[derive(Debug, Clone)]
pub struct SlotClick {
    pub slot: Option<Slot>,
    pub slot_id: i32,
    pub button: i32,
    pub action: SlotActionType,
    pub screen_title: String,
    pub cursor: ItemStack,
    pub original: Option<ItemStack>,
    cancelled: bool,
}

impl SlotClick {
    pub fn new(
        slot: Option<Slot>,
        slot_id: i32,
        button: i32,
        action: SlotActionType,
        screen_title: impl Into<String>,
        cursor: ItemStack,
        original: Option<ItemStack>,
    ) -> Self {
        Self {
            slot,
            slot_id,
            button,
            action,
            screen_title: screen_title.into(),
            cursor,
            original,
            cancelled: false,
        }
    }
}

// ── Ticks ──

/// One host client tick. Not forwarded by any dispatcher; self-managed
/// features subscribe to it on the bus directly.
#[derive(Debug, Clone)]
pub struct ClientTick {
    pub tick: u64,
    cancelled: bool,
}

impl ClientTick {
    pub fn new(tick: u64) -> Self {
        Self {
            tick,
            cancelled: false,
        }
    }
}

impl_event!(
    HudPreRender,
    HudRender,
    HudPostRender,
    SlotPreRender,
    SlotRender,
    SlotPostRender,
    SlotClick,
    ClientTick,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::RecordingCanvas;
    use crate::item::SlotContainer;

    fn pet() -> ItemStack {
        ItemStack::new("pet", "[Lvl 12] Wolf")
    }

    #[test]
    fn cancel_is_sticky() {
        let mut ev = ClientTick::new(1);
        assert!(!ev.is_cancelled());
        ev.cancel();
        ev.cancel();
        assert!(ev.is_cancelled());
    }

    #[test]
    fn slot_render_defaults_to_original() {
        let (ctx, _canvas) = RecordingCanvas::context(4, 2);
        let slot = Slot::new(3, 3, SlotContainer::Chest, pet());
        let ev = SlotRender::new(ctx, slot, pet(), "Pets");
        assert_eq!(ev.replacement(), &pet());
        assert!(!ev.is_hidden());
        assert!(!ev.is_tooltip_hidden());
    }

    #[test]
    fn slot_render_mutators() {
        let (ctx, _canvas) = RecordingCanvas::context(4, 2);
        let slot = Slot::new(3, 3, SlotContainer::Chest, pet());
        let mut ev = SlotRender::new(ctx, slot, pet(), "Pets");
        ev.replace_with(pet().with_count(12));
        ev.hide();
        ev.hide_tooltip();
        assert_eq!(ev.replacement().count, 12);
        assert_eq!(ev.original.count, 1);
        assert!(ev.is_hidden());
        assert!(ev.is_tooltip_hidden());
    }

    #[test]
    fn slot_click_keeps_payload() {
        let ev = SlotClick::new(
            None,
            -999,
            0,
            SlotActionType::Pickup,
            "Storage",
            ItemStack::empty(),
            None,
        );
        assert!(ev.slot.is_none());
        assert_eq!(ev.slot_id, -999);
        assert_eq!(ev.screen_title, "Storage");
        assert!(!ev.is_cancelled());
    }
}
