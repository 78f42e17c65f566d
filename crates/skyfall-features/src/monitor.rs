use anyhow::Result;
use skyfall_config::ConfigHandle;
use skyfall_core::canvas::Rgb;
use skyfall_core::event::{HudPostRender, HudPreRender, SlotClick, SlotRender};
use skyfall_core::feature::{
    EventHandler, Feature, HudRenderable, InitContext, SlotInteractable, SlotRenderable,
};

/// Per-category counts of dispatched events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventCounts {
    pub hud_frames: u64,
    pub slot_renders: u64,
    pub clicks: u64,
}

/// Developer overlay that receives the full event set and draws running
/// totals in the top-right corner of the HUD.
pub struct EventMonitor {
    config: ConfigHandle,
    counts: EventCounts,
}

impl EventMonitor {
    pub fn new(config: ConfigHandle) -> Self {
        Self {
            config,
            counts: EventCounts::default(),
        }
    }

    pub fn counts(&self) -> EventCounts {
        self.counts
    }

    fn summary(&self) -> String {
        let c = &self.counts;
        format!(
            "hud {} | slots {} | clicks {}",
            c.hud_frames, c.slot_renders, c.clicks
        )
    }
}

impl Feature for EventMonitor {
    fn id(&self) -> &'static str {
        "event_monitor"
    }

    fn name(&self) -> &'static str {
        "Event Monitor"
    }

    fn should_load(&self) -> bool {
        self.config.read(|c| c.dev.event_monitor)
    }

    fn on_init(&mut self, _ctx: &InitContext) -> Result<()> {
        self.counts = EventCounts::default();
        Ok(())
    }

    fn as_event_handler(&mut self) -> Option<&mut dyn EventHandler> {
        Some(self)
    }
}

impl HudRenderable for EventMonitor {
    fn on_hud_pre_render(&mut self, _event: &mut HudPreRender) -> Result<()> {
        self.counts.hud_frames += 1;
        Ok(())
    }

    fn on_hud_post_render(&mut self, event: &mut HudPostRender) -> Result<()> {
        let text = self.summary();
        let (width, _) = event.ctx.size();
        let x = width.saturating_sub(text.chars().count() as u16);
        event.ctx.draw_text(x, 0, &text, Rgb::GRAY);
        Ok(())
    }
}

impl SlotRenderable for EventMonitor {
    fn on_slot_render(&mut self, _event: &mut SlotRender) -> Result<()> {
        self.counts.slot_renders += 1;
        Ok(())
    }
}

impl SlotInteractable for EventMonitor {
    fn on_slot_click(&mut self, event: &mut SlotClick) -> Result<()> {
        self.counts.clicks += 1;
        tracing::debug!(
            slot_id = event.slot_id,
            button = event.button,
            action = %event.action,
            screen = %event.screen_title,
            "slot click"
        );
        Ok(())
    }
}

impl EventHandler for EventMonitor {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::{chest, pet, Harness};
    use skyfall_core::item::{ItemStack, SlotActionType};
    use skyfall_core::registry::FeatureCatalog;

    fn start(config: &ConfigHandle) -> Harness {
        let mut catalog = FeatureCatalog::new();
        let c = config.clone();
        catalog.register(move || Ok(EventMonitor::new(c.clone())));
        Harness::start(&catalog)
    }

    #[test]
    fn counts_and_draws_every_category() {
        let config = ConfigHandle::default();
        config.update(|c| c.dev.event_monitor = true);
        let h = start(&config);
        let slot = chest(10, pet("[Lvl 1] Bee", "bee"));

        h.bridge.slot_render(&h.ctx, &slot, "Storage");
        h.bridge.slot_render(&h.ctx, &slot, "Storage");
        h.bridge.slot_click(
            Some(&slot),
            slot.id,
            0,
            SlotActionType::QuickMove,
            "Storage",
            ItemStack::empty(),
        );
        h.bridge.render_hud(&h.ctx, 0.0);

        let texts = h.texts();
        assert_eq!(texts, vec!["hud 1 | slots 2 | clicks 1"]);
    }

    #[test]
    fn summary_is_right_aligned() {
        let config = ConfigHandle::default();
        config.update(|c| c.dev.event_monitor = true);
        let h = start(&config);
        h.bridge.render_hud(&h.ctx, 0.0);

        let canvas = h.canvas.borrow();
        let skyfall_core::canvas::DrawOp::Text { x, text, .. } = &canvas.ops[0] else {
            panic!("expected text");
        };
        assert_eq!(*x as usize + text.chars().count(), 40);
    }

    #[test]
    fn not_registered_with_capability_dispatchers() {
        let config = ConfigHandle::default();
        config.update(|c| c.dev.event_monitor = true);
        let h = start(&config);
        let services = h.manager.services();
        assert!(services.generic().contains("event_monitor"));
        assert!(!services.hud().contains("event_monitor"));
        assert!(!services.slot().contains_renderable("event_monitor"));
    }
}
