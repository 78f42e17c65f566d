use std::collections::HashMap;

use serde_json::json;
use skyfall_config::ConfigStore;
use skyfall_core::lifecycle::{FeatureManager, SyncReport};
use skyfall_ui::console::Console;

/// Output from a command execution.
pub enum CommandOutput {
    /// Lines to display in the console.
    Lines(Vec<String>),
    /// Signal that the app should quit.
    Quit,
}

/// Context available to commands during execution.
pub struct CommandContext<'a> {
    pub manager: &'a FeatureManager,
    pub store: &'a ConfigStore,
    pub console: &'a mut Console,
}

/// A console command.
pub trait Command {
    fn name(&self) -> &str;
    fn aliases(&self) -> &[&str] {
        &[]
    }
    fn description(&self) -> &str;
    fn usage(&self) -> &str {
        self.name()
    }
    fn execute(&self, args: &[&str], ctx: &mut CommandContext) -> CommandOutput;
}

/// Registry of console commands. `help` is answered by the registry itself.
#[derive(Default)]
pub struct CommandRegistry {
    commands: Vec<Box<dyn Command>>,
    lookup: HashMap<String, usize>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, cmd: Box<dyn Command>) {
        let idx = self.commands.len();
        self.lookup.insert(cmd.name().to_string(), idx);
        for alias in cmd.aliases() {
            self.lookup.insert(alias.to_string(), idx);
        }
        self.commands.push(cmd);
    }

    pub fn execute(&self, input: &str, ctx: &mut CommandContext) -> CommandOutput {
        let parts: Vec<&str> = input.split_whitespace().collect();
        let Some((&name, args)) = parts.split_first() else {
            return CommandOutput::Lines(vec![]);
        };

        if name == "help" || name == "?" {
            return CommandOutput::Lines(self.help(args.first().copied()));
        }

        match self.lookup.get(name) {
            Some(&idx) => self.commands[idx].execute(args, ctx),
            None => CommandOutput::Lines(vec![format!(
                "unknown command: '{name}'. Type 'help' for available commands."
            )]),
        }
    }

    pub fn commands(&self) -> &[Box<dyn Command>] {
        &self.commands
    }

    fn help(&self, topic: Option<&str>) -> Vec<String> {
        if let Some(topic) = topic {
            return match self.lookup.get(topic) {
                Some(&idx) => {
                    let cmd = &self.commands[idx];
                    vec![format!("usage: {}", cmd.usage()), format!("  {}", cmd.description())]
                }
                None => vec![format!("no such command: '{topic}'")],
            };
        }

        let mut lines = vec![format!("  {:24} {}", "help [command]", "List commands or show usage")];
        lines.extend(self.commands.iter().map(|cmd| {
            let aliases = cmd.aliases();
            if aliases.is_empty() {
                format!("  {:24} {}", cmd.usage(), cmd.description())
            } else {
                format!(
                    "  {:24} {} (aliases: {})",
                    cmd.usage(),
                    cmd.description(),
                    aliases.join(", ")
                )
            }
        }));
        lines
    }
}

/// Console lines describing one sync pass.
pub fn report_lines(report: &SyncReport) -> Vec<String> {
    if report.is_noop() {
        return vec!["no feature changed state".into()];
    }
    let mut lines = Vec::new();
    lines.extend(report.started.iter().map(|id| format!("started {id}")));
    lines.extend(report.stopped.iter().map(|id| format!("stopped {id}")));
    lines.extend(
        report
            .failed
            .iter()
            .map(|(id, err)| format!("{id} failed to change state: {err}")),
    );
    lines
}

fn usage(cmd: &dyn Command) -> CommandOutput {
    CommandOutput::Lines(vec![format!("usage: {}", cmd.usage())])
}

// ── Built-in commands ──

pub struct FeaturesCommand;

impl Command for FeaturesCommand {
    fn name(&self) -> &str {
        "features"
    }
    fn aliases(&self) -> &[&str] {
        &["ls"]
    }
    fn description(&self) -> &str {
        "List discovered features and whether they run"
    }

    fn execute(&self, _args: &[&str], ctx: &mut CommandContext) -> CommandOutput {
        let lines = ctx
            .manager
            .features()
            .into_iter()
            .map(|f| {
                let state = if f.running { "running" } else { "stopped" };
                format!("  {:16} {:8} {:20} {}", f.id, state, f.name, f.kind)
            })
            .collect();
        CommandOutput::Lines(lines)
    }
}

pub struct GetCommand;

impl Command for GetCommand {
    fn name(&self) -> &str {
        "get"
    }
    fn description(&self) -> &str {
        "Show a config value"
    }
    fn usage(&self) -> &str {
        "get <path>"
    }

    fn execute(&self, args: &[&str], ctx: &mut CommandContext) -> CommandOutput {
        let [path] = args else {
            return usage(self);
        };
        let line = match ctx.store.handle().read(|c| c.get_path(path)) {
            Ok(value) => format!("{path} = {value}"),
            Err(err) => err.to_string(),
        };
        CommandOutput::Lines(vec![line])
    }
}

pub struct ToggleCommand;

impl Command for ToggleCommand {
    fn name(&self) -> &str {
        "toggle"
    }
    fn aliases(&self) -> &[&str] {
        &["t"]
    }
    fn description(&self) -> &str {
        "Flip a boolean config value and re-sync features"
    }
    fn usage(&self) -> &str {
        "toggle <path>"
    }

    fn execute(&self, args: &[&str], ctx: &mut CommandContext) -> CommandOutput {
        let [path] = args else {
            return usage(self);
        };
        match ctx.store.handle().update(|c| c.toggle_path(path)) {
            Ok(value) => {
                tracing::info!(path, value, "config toggled");
                let mut lines = vec![format!("{path} = {value}")];
                lines.extend(report_lines(&ctx.manager.sync_states()));
                CommandOutput::Lines(lines)
            }
            Err(err) => CommandOutput::Lines(vec![err.to_string()]),
        }
    }
}

pub struct SetCommand;

impl Command for SetCommand {
    fn name(&self) -> &str {
        "set"
    }
    fn description(&self) -> &str {
        "Set a config value and re-sync features"
    }
    fn usage(&self) -> &str {
        "set <path> <value>"
    }

    fn execute(&self, args: &[&str], ctx: &mut CommandContext) -> CommandOutput {
        let Some((path, value)) = args.split_first().filter(|(_, rest)| !rest.is_empty()) else {
            return usage(self);
        };
        let raw = value.join(" ");
        match ctx.store.handle().update(|c| c.set_path(path, &raw)) {
            Ok(()) => {
                tracing::info!(path, value = %raw, "config set");
                let mut lines = vec![format!("{path} = {raw}")];
                lines.extend(report_lines(&ctx.manager.sync_states()));
                CommandOutput::Lines(lines)
            }
            Err(err) => CommandOutput::Lines(vec![err.to_string()]),
        }
    }
}

pub struct SyncCommand;

impl Command for SyncCommand {
    fn name(&self) -> &str {
        "sync"
    }
    fn description(&self) -> &str {
        "Start or stop features to match the config"
    }

    fn execute(&self, _args: &[&str], ctx: &mut CommandContext) -> CommandOutput {
        CommandOutput::Lines(report_lines(&ctx.manager.sync_states()))
    }
}

pub struct StatsCommand;

impl Command for StatsCommand {
    fn name(&self) -> &str {
        "stats"
    }
    fn description(&self) -> &str {
        "Feature and dispatcher counters as JSON"
    }

    fn execute(&self, _args: &[&str], ctx: &mut CommandContext) -> CommandOutput {
        let services = ctx.manager.services();
        let stats = json!({
            "features": ctx.manager.stats(),
            "dispatchers": {
                "hud": services.hud().stats(),
                "slot": services.slot().stats(),
                "generic": services.generic().stats(),
            },
        });
        match serde_json::to_string_pretty(&stats) {
            Ok(text) => CommandOutput::Lines(text.lines().map(str::to_string).collect()),
            Err(err) => CommandOutput::Lines(vec![format!("failed to encode stats: {err}")]),
        }
    }
}

pub struct SaveCommand;

impl Command for SaveCommand {
    fn name(&self) -> &str {
        "save"
    }
    fn description(&self) -> &str {
        "Write the config file"
    }

    fn execute(&self, _args: &[&str], ctx: &mut CommandContext) -> CommandOutput {
        let line = match ctx.store.save("console command") {
            Ok(()) => format!("saved {}", ctx.store.path().display()),
            Err(err) => format!("save failed: {err}"),
        };
        CommandOutput::Lines(vec![line])
    }
}

pub struct ReloadCommand;

impl Command for ReloadCommand {
    fn name(&self) -> &str {
        "reload"
    }
    fn description(&self) -> &str {
        "Re-read the config file and re-sync features"
    }

    fn execute(&self, _args: &[&str], ctx: &mut CommandContext) -> CommandOutput {
        match ctx.store.reload() {
            Ok(()) => CommandOutput::Lines(report_lines(&ctx.manager.sync_states())),
            Err(err) => CommandOutput::Lines(vec![format!("reload failed: {err}")]),
        }
    }
}

pub struct ClearCommand;

impl Command for ClearCommand {
    fn name(&self) -> &str {
        "clear"
    }
    fn aliases(&self) -> &[&str] {
        &["cls"]
    }
    fn description(&self) -> &str {
        "Clear console log"
    }

    fn execute(&self, _args: &[&str], ctx: &mut CommandContext) -> CommandOutput {
        ctx.console.clear();
        CommandOutput::Lines(vec![])
    }
}

pub struct QuitCommand;

impl Command for QuitCommand {
    fn name(&self) -> &str {
        "quit"
    }
    fn aliases(&self) -> &[&str] {
        &["exit", "q"]
    }
    fn description(&self) -> &str {
        "Save and exit"
    }

    fn execute(&self, _args: &[&str], _ctx: &mut CommandContext) -> CommandOutput {
        CommandOutput::Quit
    }
}

/// Create a registry with all built-in commands.
pub fn builtin_registry() -> CommandRegistry {
    let mut reg = CommandRegistry::new();
    reg.register(Box::new(FeaturesCommand));
    reg.register(Box::new(GetCommand));
    reg.register(Box::new(ToggleCommand));
    reg.register(Box::new(SetCommand));
    reg.register(Box::new(SyncCommand));
    reg.register(Box::new(StatsCommand));
    reg.register(Box::new(SaveCommand));
    reg.register(Box::new(ReloadCommand));
    reg.register(Box::new(ClearCommand));
    reg.register(Box::new(QuitCommand));
    reg
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyfall_core::bus::EventBus;
    use skyfall_core::services::FeatureServices;

    struct Fixture {
        _dir: tempfile::TempDir,
        store: ConfigStore,
        manager: FeatureManager,
        console: Console,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let store = ConfigStore::load(dir.path()).unwrap();
            let mut manager = FeatureManager::new(FeatureServices::new(EventBus::new()));
            manager
                .initialize(&skyfall_features::catalog(&store.handle()))
                .unwrap();
            Self {
                _dir: dir,
                store,
                manager,
                console: Console::new(100),
            }
        }

        fn run(&mut self, input: &str) -> Vec<String> {
            let mut ctx = CommandContext {
                manager: &self.manager,
                store: &self.store,
                console: &mut self.console,
            };
            match builtin_registry().execute(input, &mut ctx) {
                CommandOutput::Lines(lines) => lines,
                CommandOutput::Quit => vec!["<quit>".into()],
            }
        }

        fn running(&self, id: &str) -> bool {
            self.manager
                .features()
                .iter()
                .any(|f| f.id == id && f.running)
        }
    }

    #[test]
    fn report_lines_cover_each_outcome() {
        let report = SyncReport {
            started: vec!["session_clock"],
            stopped: vec!["heartbeat"],
            failed: vec![("favorite_pets", "refused to stop".to_string())],
        };
        assert_eq!(
            report_lines(&report),
            vec![
                "started session_clock",
                "stopped heartbeat",
                "favorite_pets failed to change state: refused to stop",
            ]
        );
        assert_eq!(
            report_lines(&SyncReport::default()),
            vec!["no feature changed state"]
        );
    }

    #[test]
    fn unknown_and_empty_input() {
        let mut fx = Fixture::new();
        assert!(fx.run("   ").is_empty());
        assert!(fx.run("warp hub")[0].starts_with("unknown command: 'warp'"));
    }

    #[test]
    fn help_lists_every_command_and_shows_usage() {
        let mut fx = Fixture::new();
        let lines = fx.run("help");
        assert_eq!(lines.len(), builtin_registry().commands().len() + 1);
        assert!(lines.iter().any(|l| l.contains("toggle <path>")));
        assert_eq!(fx.run("? set")[0], "usage: set <path> <value>");
    }

    #[test]
    fn features_lists_running_state() {
        let mut fx = Fixture::new();
        let lines = fx.run("ls");
        assert_eq!(lines.len(), 6);
        let clock = lines.iter().find(|l| l.contains("session_clock")).unwrap();
        assert!(clock.contains("running"));
        let monitor = lines.iter().find(|l| l.contains("event_monitor")).unwrap();
        assert!(monitor.contains("stopped"));
    }

    #[test]
    fn toggle_starts_and_stops_features() {
        let mut fx = Fixture::new();
        let lines = fx.run("toggle dev.event_monitor");
        assert_eq!(lines, vec!["dev.event_monitor = true", "started event_monitor"]);
        assert!(fx.running("event_monitor"));

        let lines = fx.run("toggle dev.event_monitor");
        assert_eq!(lines[1], "stopped event_monitor");
        assert!(!fx.running("event_monitor"));
    }

    #[test]
    fn toggle_reports_bad_paths() {
        let mut fx = Fixture::new();
        assert!(fx.run("toggle dev.heartbeat_interval")[0].contains("not a boolean"));
        assert_eq!(fx.run("toggle")[0], "usage: toggle <path>");
    }

    #[test]
    fn set_joins_the_value_and_resyncs() {
        let mut fx = Fixture::new();
        let lines = fx.run(r#"set inventory.pet_menu.favorites ["pet-0001", "pet-0002"]"#);
        assert_eq!(lines[0], r#"inventory.pet_menu.favorites = ["pet-0001", "pet-0002"]"#);
        assert_eq!(lines[1], "started favorite_pets");
        assert!(fx
            .store
            .handle()
            .read(|c| c.inventory.pet_menu.is_favorite("pet-0002")));
        assert_eq!(fx.run("set hud.clock")[0], "usage: set <path> <value>");
    }

    #[test]
    fn get_and_sync() {
        let mut fx = Fixture::new();
        assert_eq!(fx.run("get dev.heartbeat_interval"), vec!["dev.heartbeat_interval = 100"]);
        assert_eq!(fx.run("sync"), vec!["no feature changed state"]);
    }

    #[test]
    fn stats_is_json() {
        let mut fx = Fixture::new();
        let text = fx.run("stats").join("\n");
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["features"]["total"], 6);
        assert_eq!(value["features"]["running"], 2);
        assert!(value["dispatchers"]["hud"]["registered"].is_number());
    }

    #[test]
    fn save_and_reload_round_trip() {
        let mut fx = Fixture::new();
        fx.run("toggle hud.clock");
        assert!(fx.run("save")[0].starts_with("saved "));

        fx.run("set hud.clock true");
        let lines = fx.run("reload");
        assert_eq!(lines, vec!["stopped session_clock"]);
        assert!(!fx.store.handle().read(|c| c.hud.clock));
    }

    #[test]
    fn clear_and_quit() {
        let mut fx = Fixture::new();
        fx.console.print("hello");
        assert!(fx.run("cls").is_empty());
        assert!(fx.console.lines().is_empty());
        assert_eq!(fx.run("exit"), vec!["<quit>"]);
    }
}
