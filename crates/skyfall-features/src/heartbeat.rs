use std::cell::Cell;
use std::rc::Rc;

use anyhow::Result;
use skyfall_config::ConfigHandle;
use skyfall_core::event::ClientTick;
use skyfall_core::feature::{Feature, InitContext};

/// Logs a line every `dev.heartbeat_interval` client ticks.
///
/// Self-managed: it has no capability, so no dispatcher forwards to it. It
/// subscribes to [`ClientTick`] on the bus the first time it starts and
/// checks its running flag on every tick, since bus listeners cannot be
/// removed.
pub struct Heartbeat {
    config: ConfigHandle,
    beats: Rc<Cell<u64>>,
    subscribed: bool,
}

impl Heartbeat {
    pub fn new(config: ConfigHandle) -> Self {
        Self {
            config,
            beats: Rc::new(Cell::new(0)),
            subscribed: false,
        }
    }

    /// Shared beat counter.
    pub fn beats(&self) -> Rc<Cell<u64>> {
        self.beats.clone()
    }
}

impl Feature for Heartbeat {
    fn id(&self) -> &'static str {
        "heartbeat"
    }

    fn name(&self) -> &'static str {
        "Heartbeat"
    }

    fn should_load(&self) -> bool {
        self.config.read(|c| c.dev.heartbeat)
    }

    fn on_init(&mut self, ctx: &InitContext) -> Result<()> {
        if self.subscribed {
            return Ok(());
        }
        self.subscribed = true;

        let running = ctx.running.clone();
        let config = self.config.clone();
        let beats = self.beats.clone();
        ctx.bus.listen::<ClientTick, _>(0, move |tick| {
            if !running.get() {
                return Ok(());
            }
            let interval = config.read(|c| c.dev.heartbeat_interval).max(1);
            if tick.tick % interval == 0 {
                beats.set(beats.get() + 1);
                tracing::info!(tick = tick.tick, beats = beats.get(), "heartbeat");
            }
            Ok(())
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::Harness;
    use skyfall_core::registry::FeatureCatalog;
    use skyfall_core::services::HostBridge;

    fn start(config: &ConfigHandle) -> (Harness, Rc<Cell<u64>>) {
        let beats = Rc::new(std::cell::RefCell::new(None));
        let sink = beats.clone();
        let mut catalog = FeatureCatalog::new();
        let c = config.clone();
        catalog.register(move || {
            let heartbeat = Heartbeat::new(c.clone());
            *sink.borrow_mut() = Some(heartbeat.beats());
            Ok(heartbeat)
        });
        let harness = Harness::start(&catalog);
        let counter = beats.borrow_mut().take().unwrap();
        (harness, counter)
    }

    fn enabled(interval: u64) -> ConfigHandle {
        let config = ConfigHandle::default();
        config.update(|c| {
            c.dev.heartbeat = true;
            c.dev.heartbeat_interval = interval;
        });
        config
    }

    #[test]
    fn beats_on_interval() {
        let (h, beats) = start(&enabled(3));
        for _ in 0..10 {
            h.bridge.client_tick();
        }
        assert_eq!(beats.get(), 3);
    }

    #[test]
    fn does_not_activate_the_bridge() {
        let (h, _) = start(&enabled(1));
        assert!(h.manager.get("heartbeat").unwrap().is_running());
        assert!(!h.bridge.is_initialized());
    }

    #[test]
    fn silent_while_stopped_and_subscribes_once() {
        let config = enabled(1);
        let (h, beats) = start(&config);
        h.bridge.client_tick();
        assert_eq!(beats.get(), 1);

        config.update(|c| c.dev.heartbeat = false);
        h.manager.sync_states();
        h.bridge.client_tick();
        assert_eq!(beats.get(), 1);

        config.update(|c| c.dev.heartbeat = true);
        h.manager.sync_states();
        h.bridge.client_tick();
        assert_eq!(beats.get(), 2);

        let bus = h.manager.services().bus();
        assert_eq!(bus.listener_count::<ClientTick>(), 1);
    }
}
