use std::time::Instant;

use anyhow::Result;
use skyfall_config::ConfigHandle;
use skyfall_core::canvas::Rgb;
use skyfall_core::event::HudRender;
use skyfall_core::feature::{Feature, HudRenderable, InitContext};

use crate::format::{format_bytes, format_percent};

pub mod telemetry;

use telemetry::{ProcessSample, TelemetryCollector};

const ID: &str = "process_stats";

/// CPU and memory of the host process, two HUD lines.
///
/// The collector only exists while the feature runs.
pub struct ProcessStats {
    config: ConfigHandle,
    telemetry: Option<TelemetryCollector>,
}

impl ProcessStats {
    pub fn new(config: ConfigHandle) -> Self {
        Self {
            config,
            telemetry: None,
        }
    }
}

fn lines(sample: &ProcessSample) -> [String; 2] {
    let own_cpu = sample.self_cpu.unwrap_or(f32::NAN);
    let rss = sample.self_rss.map_or_else(|| "--".to_string(), format_bytes);
    [
        format!(
            "CPU {} (sys {})",
            format_percent(own_cpu),
            format_percent(sample.cpu_global)
        ),
        format!("RSS {rss} / {} used", format_bytes(sample.mem_used)),
    ]
}

impl Feature for ProcessStats {
    fn id(&self) -> &'static str {
        ID
    }

    fn name(&self) -> &'static str {
        "Process Stats"
    }

    fn should_load(&self) -> bool {
        self.config.read(|c| c.hud.process_stats)
    }

    fn on_init(&mut self, _ctx: &InitContext) -> Result<()> {
        self.telemetry = Some(TelemetryCollector::new());
        Ok(())
    }

    fn on_terminate(&mut self) -> Result<()> {
        self.telemetry = None;
        Ok(())
    }

    fn as_hud_renderable(&mut self) -> Option<&mut dyn HudRenderable> {
        Some(self)
    }
}

impl HudRenderable for ProcessStats {
    fn on_hud_render(&mut self, event: &mut HudRender) -> Result<()> {
        let Some(telemetry) = self.telemetry.as_mut() else {
            return Ok(());
        };
        let element = self.config.read(|c| c.hud.element(ID));
        if !element.enabled {
            return Ok(());
        }

        telemetry.maybe_refresh(Instant::now());
        for (row, line) in lines(telemetry.sample()).iter().enumerate() {
            event
                .ctx
                .draw_text(element.x, element.y.saturating_add(row as u16), line, Rgb::GREEN);
        }
        Ok(())
    }
}
