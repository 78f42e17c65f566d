//! The simulated game client.
//!
//! [`Host`] plays the part of the game: it owns the feature runtime, feeds
//! HUD and slot render passes through the [`EventBridge`] every frame,
//! turns key presses into slot clicks and forwards console input to the
//! command registry.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use anyhow::Context;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use skyfall_bridge::EventBridge;
use skyfall_config::ConfigStore;
use skyfall_core::bus::EventBus;
use skyfall_core::canvas::{Canvas, DrawContext};
use skyfall_core::event::Event;
use skyfall_core::item::{ItemStack, Slot, SlotActionType, SlotContainer};
use skyfall_core::lifecycle::FeatureManager;
use skyfall_core::logging::LogBuffer;
use skyfall_core::services::{FeatureServices, HostBridge};
use skyfall_features::{pets, Watermark};
use skyfall_ui::canvas::TextCanvas;
use skyfall_ui::console::{render_console, Console};
use skyfall_ui::inventory::{grid_size, SlotView, CELL_HEIGHT, CELL_WIDTH, COLUMNS};
use skyfall_ui::layout::host_layout;
use skyfall_ui::shell::{hud_canvas_size, render_shell, ShellView};

use crate::command::{self, CommandContext, CommandOutput, CommandRegistry};
use crate::screens::{self, Screen};
use crate::tps::TickCounter;

pub const HUD_HEIGHT: u16 = 6;
const MAX_CONSOLE_LINES: usize = 1000;
/// Slot id the game reports for clicks outside any slot.
const OUTSIDE_SLOT_ID: i32 = -999;

pub struct Host {
    store: ConfigStore,
    manager: FeatureManager,
    bridge: Rc<EventBridge>,
    log_buffer: LogBuffer,
    console: Console,
    commands: CommandRegistry,
    ticks: TickCounter,
    screens: Vec<Screen>,
    screen: usize,
    cursor: usize,
    /// Stack carried on the mouse cursor.
    held: ItemStack,
    hud_ctx: DrawContext,
    hud: Rc<RefCell<TextCanvas>>,
    status: String,
    last_frame: Instant,
}

impl Host {
    pub fn new(log_buffer: LogBuffer, store: ConfigStore) -> anyhow::Result<Self> {
        let bus = EventBus::new();
        let bridge = Rc::new(EventBridge::new(bus.clone()));
        let services =
            FeatureServices::new(bus).with_bridge(bridge.clone() as Rc<dyn HostBridge>);
        services.hud().register_renderable(Watermark::shared());

        let mut manager = FeatureManager::new(services);
        let report = manager
            .initialize(&skyfall_features::catalog(&store.handle()))
            .context("feature discovery failed")?;

        let (hud_ctx, hud) = TextCanvas::context(1, 1);
        let screens = screens::all();
        let status = format!("{} features running", manager.stats().running);

        let mut console = Console::new(MAX_CONSOLE_LINES);
        for line in command::report_lines(&report) {
            console.print(line);
        }

        Ok(Self {
            store,
            manager,
            bridge,
            log_buffer,
            console,
            commands: command::builtin_registry(),
            ticks: TickCounter::default(),
            screens,
            screen: 0,
            cursor: 0,
            held: ItemStack::empty(),
            hud_ctx,
            hud,
            status,
            last_frame: Instant::now(),
        })
    }

    fn screen(&self) -> &Screen {
        &self.screens[self.screen]
    }

    /// Drain new entries from the shared log buffer into the console.
    pub fn sync_logs(&mut self) {
        if let Ok(mut buf) = self.log_buffer.lock() {
            for entry in buf.drain(..) {
                self.console.push(entry);
            }
        }
    }

    /// One client tick.
    pub fn tick(&mut self, now: Instant) {
        self.bridge.client_tick();
        self.ticks.tick(now);
    }

    pub fn save(&self, reason: &str) {
        if let Err(err) = self.store.save(reason) {
            tracing::error!(error = %err, reason, "failed to save config");
        }
    }

    /// Stop every feature and write the config.
    pub fn shutdown(&self) {
        self.manager.shutdown();
        self.save("shutdown");
    }

    pub fn draw(&mut self, f: &mut Frame) {
        let area = f.area();
        let views = self.slot_views();
        let rects = host_layout(area, HUD_HEIGHT, grid_size(&views));
        self.render_hud(hud_canvas_size(&rects));

        let hud = self.hud.borrow();
        let screen = &self.screens[self.screen];
        render_shell(
            f,
            rects,
            ShellView {
                screen_title: &screen.title,
                status_line: &self.status,
                hud: &hud,
                views: &views,
                cursor: self.cursor,
            },
        );

        if self.console.is_visible() {
            render_console(f, area, &self.console, self.ticks.tps());
        }
    }

    fn render_hud(&mut self, (width, height): (u16, u16)) {
        let now = Instant::now();
        let delta = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        {
            let mut hud = self.hud.borrow_mut();
            if hud.size() == (width, height) {
                hud.clear();
            } else {
                hud.resize(width, height);
            }
        }
        self.bridge.render_hud(&self.hud_ctx, delta);
    }

    /// Run the three slot passes for every slot of the open screen.
    fn slot_views(&self) -> Vec<SlotView> {
        let screen = self.screen();
        screen
            .slots
            .iter()
            .map(|slot| self.slot_view(slot, &screen.title))
            .collect()
    }

    fn slot_view(&self, slot: &Slot, title: &str) -> SlotView {
        let (ctx, canvas) = TextCanvas::context(CELL_WIDTH, CELL_HEIGHT);
        self.bridge.slot_pre_render(&ctx, slot, title);
        let render = self.bridge.slot_render(&ctx, slot, title);
        self.bridge.slot_post_render(&ctx, slot, title);

        let backdrop = canvas.borrow().clone();
        SlotView {
            slot: slot.clone(),
            shown: render.replacement().clone(),
            hidden: render.is_hidden(),
            tooltip_hidden: render.is_tooltip_hidden(),
            backdrop,
        }
    }

    /// Move the slot cursor by whole grid cells, clamped to the screen.
    pub fn move_cursor(&mut self, dx: i32, dy: i32) {
        let len = self.screen().slots.len();
        if len == 0 {
            return;
        }
        let columns = COLUMNS as i32;
        let rows = len.div_ceil(COLUMNS) as i32;
        let col = (self.cursor as i32 % columns + dx).clamp(0, columns - 1);
        let row = (self.cursor as i32 / columns + dy).clamp(0, rows - 1);
        self.cursor = ((row * columns + col) as usize).min(len - 1);
    }

    pub fn cycle_screen(&mut self) {
        self.screen = (self.screen + 1) % self.screens.len();
        self.cursor = self.cursor.min(self.screen().slots.len().saturating_sub(1));
        let title = self.screen().title.clone();
        tracing::info!(screen = %title, "opened screen");
        self.status = format!("opened {title}");
    }

    pub fn toggle_hud(&mut self) {
        let hidden = !self.bridge.is_hud_hidden();
        self.bridge.set_hud_hidden(hidden);
        self.status = if hidden { "HUD hidden" } else { "HUD shown" }.to_string();
    }

    /// Click the slot under the cursor with the left button.
    ///
    /// A cancelled click leaves the screen untouched.
    pub fn click(&mut self, action: SlotActionType) {
        let screen = &self.screens[self.screen];
        let slot = screen.slots.get(self.cursor);
        let slot_id = slot.map_or(OUTSIDE_SLOT_ID, |s| s.id);
        let event =
            self.bridge
                .slot_click(slot, slot_id, 0, action, &screen.title, self.held.clone());
        if event.is_cancelled() {
            self.status = format!("click on slot {slot_id} blocked");
            return;
        }

        let cursor = self.cursor;
        let screen = &mut self.screens[self.screen];
        let Some(from) = screen.slots.get(cursor) else {
            return;
        };
        match action {
            SlotActionType::QuickMove => {
                if from.stack.is_empty() {
                    return;
                }
                let target = if from.in_chest() {
                    SlotContainer::Player
                } else {
                    SlotContainer::Chest
                };
                match screen.first_empty(target) {
                    Some(to) => {
                        let stack = std::mem::take(&mut screen.slots[cursor].stack);
                        self.status = format!("moved {} to slot {}", stack.name, screen.slots[to].id);
                        screen.slots[to].stack = stack;
                    }
                    None => self.status = "no room to move that".to_string(),
                }
            }
            _ => {
                std::mem::swap(&mut screen.slots[cursor].stack, &mut self.held);
                self.status = if self.held.is_empty() {
                    "cursor empty".to_string()
                } else {
                    format!("holding {}", self.held.name)
                };
            }
        }
    }

    /// Flip the favourite mark on the hovered pet and re-sync features.
    pub fn toggle_favorite(&mut self) {
        let screen = &self.screens[self.screen];
        let outcome = screen.slots.get(self.cursor).and_then(|slot| {
            pets::toggle_favorite(&self.store.handle(), slot, &screen.title)
                .map(|favorite| (favorite, slot.stack.name.clone()))
        });
        self.status = match outcome {
            Some((true, name)) => format!("{name} is now a favourite"),
            Some((false, name)) => format!("{name} is no longer a favourite"),
            None => "only pets in the pets menu can be favourited".to_string(),
        };
        self.manager.sync_states();
    }

    /// Run a console command. Returns true when the app should quit.
    pub fn dispatch_command(&mut self, input: &str) -> bool {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return false;
        }
        self.console.print(format!("> {trimmed}"));

        let mut ctx = CommandContext {
            manager: &self.manager,
            store: &self.store,
            console: &mut self.console,
        };
        match self.commands.execute(trimmed, &mut ctx) {
            CommandOutput::Lines(lines) => {
                for line in lines {
                    self.console.print(line);
                }
                self.status = format!("{} features running", self.manager.stats().running);
                false
            }
            CommandOutput::Quit => true,
        }
    }

    /// Handle one key press. Returns true when the app should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        // Tilde always toggles the console
        if matches!(key.code, KeyCode::Char('`') | KeyCode::Char('~')) {
            self.console.toggle();
            return false;
        }

        if self.console.is_visible() {
            match key.code {
                KeyCode::Enter => {
                    let input = self.console.submit();
                    return self.dispatch_command(&input);
                }
                KeyCode::Backspace => self.console.backspace(),
                KeyCode::Left => self.console.cursor_left(),
                KeyCode::Right => self.console.cursor_right(),
                KeyCode::Up => self.console.history_prev(),
                KeyCode::Down => self.console.history_next(),
                KeyCode::PageUp => self.console.scroll_up(10),
                KeyCode::PageDown => self.console.scroll_down(10),
                KeyCode::Esc => self.console.toggle(),
                KeyCode::Char(c) => self.console.insert_char(c),
                _ => {}
            }
            return false;
        }

        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Left => self.move_cursor(-1, 0),
            KeyCode::Right => self.move_cursor(1, 0),
            KeyCode::Up => self.move_cursor(0, -1),
            KeyCode::Down => self.move_cursor(0, 1),
            KeyCode::Enter if key.modifiers.contains(KeyModifiers::SHIFT) => {
                self.click(SlotActionType::QuickMove)
            }
            KeyCode::Enter => self.click(SlotActionType::Pickup),
            KeyCode::Tab => self.cycle_screen(),
            KeyCode::Char('f') => self.toggle_favorite(),
            KeyCode::Char('h') => self.toggle_hud(),
            _ => {}
        }
        false
    }
}
