use std::time::Instant;

use anyhow::Result;
use skyfall_config::ConfigHandle;
use skyfall_core::canvas::Rgb;
use skyfall_core::event::HudRender;
use skyfall_core::feature::{Feature, HudRenderable, InitContext};

use crate::format::format_elapsed;

const ID: &str = "session_clock";

/// Time since the feature was last started, drawn on the HUD.
pub struct SessionClock {
    config: ConfigHandle,
    started: Option<Instant>,
}

impl SessionClock {
    pub fn new(config: ConfigHandle) -> Self {
        Self {
            config,
            started: None,
        }
    }

    fn label(&self, now: Instant) -> String {
        let secs = self
            .started
            .map_or(0, |started| now.saturating_duration_since(started).as_secs());
        format!("Session {}", format_elapsed(secs))
    }
}

impl Feature for SessionClock {
    fn id(&self) -> &'static str {
        ID
    }

    fn name(&self) -> &'static str {
        "Session Clock"
    }

    fn should_load(&self) -> bool {
        self.config.read(|c| c.hud.clock)
    }

    fn on_init(&mut self, _ctx: &InitContext) -> Result<()> {
        self.started = Some(Instant::now());
        Ok(())
    }

    fn on_terminate(&mut self) -> Result<()> {
        self.started = None;
        Ok(())
    }

    fn as_hud_renderable(&mut self) -> Option<&mut dyn HudRenderable> {
        Some(self)
    }
}

impl HudRenderable for SessionClock {
    fn on_hud_render(&mut self, event: &mut HudRender) -> Result<()> {
        let element = self.config.read(|c| c.hud.element(ID));
        if element.enabled {
            let label = self.label(Instant::now());
            event.ctx.draw_text(element.x, element.y, &label, Rgb::AQUA);
        }
        Ok(())
    }
}
