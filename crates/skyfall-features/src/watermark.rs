use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;
use skyfall_core::canvas::Rgb;
use skyfall_core::dispatch::SharedRenderable;
use skyfall_core::event::HudPostRender;
use skyfall_core::feature::HudRenderable;

/// Version tag in the bottom-right corner of the HUD.
///
/// Not a feature: it has no predicate or lifecycle and is registered
/// straight with the HUD dispatcher, which forwards every HUD event to it.
pub struct Watermark {
    text: String,
}

impl Watermark {
    pub fn new() -> Self {
        Self {
            text: format!("SkyFall v{}", env!("CARGO_PKG_VERSION")),
        }
    }

    pub fn shared() -> SharedRenderable {
        Rc::new(RefCell::new(Self::new()))
    }
}

impl Default for Watermark {
    fn default() -> Self {
        Self::new()
    }
}

impl HudRenderable for Watermark {
    fn on_hud_post_render(&mut self, event: &mut HudPostRender) -> Result<()> {
        let (width, height) = event.ctx.size();
        let x = width.saturating_sub(self.text.chars().count() as u16);
        event
            .ctx
            .draw_text(x, height.saturating_sub(1), &self.text, Rgb::GRAY);
        Ok(())
    }
}
