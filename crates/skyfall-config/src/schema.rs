use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root of `config.toml`.
///
/// Every section defaults independently, so a file written by an older
/// build with missing keys still loads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkyfallConfig {
    pub hud: HudConfig,
    pub inventory: InventoryConfig,
    pub dev: DevConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HudConfig {
    /// Session clock overlay.
    pub clock: bool,
    /// Process CPU/memory overlay.
    pub process_stats: bool,
    /// Per-element placement, keyed by feature id.
    pub elements: BTreeMap<String, HudElementConfig>,
}

impl Default for HudConfig {
    fn default() -> Self {
        let mut elements = BTreeMap::new();
        elements.insert("session_clock".to_string(), HudElementConfig::at(1, 1));
        elements.insert("process_stats".to_string(), HudElementConfig::at(1, 3));
        Self {
            clock: true,
            process_stats: false,
            elements,
        }
    }
}

impl HudConfig {
    /// Placement for `id`, or an enabled element at the origin.
    pub fn element(&self, id: &str) -> HudElementConfig {
        self.elements.get(id).cloned().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HudElementConfig {
    pub x: u16,
    pub y: u16,
    pub enabled: bool,
}

impl HudElementConfig {
    pub fn at(x: u16, y: u16) -> Self {
        Self { x, y, enabled: true }
    }
}

impl Default for HudElementConfig {
    fn default() -> Self {
        Self::at(0, 0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    pub pet_menu: PetMenuConfig,
    /// Show attribute levels as stack counts in the attribute menu.
    pub level_numbers: bool,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            pet_menu: PetMenuConfig::default(),
            level_numbers: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PetMenuConfig {
    /// Hide pets that are neither favourite nor active.
    pub favorites_only: bool,
    /// Item uuids of favourite pets.
    pub favorites: Vec<String>,
    pub highlight_active: bool,
    pub highlight_color: String,
    pub active_color: String,
}

impl Default for PetMenuConfig {
    fn default() -> Self {
        Self {
            favorites_only: false,
            favorites: Vec::new(),
            highlight_active: false,
            highlight_color: "#FFAA00".to_string(),
            active_color: "#00FF00".to_string(),
        }
    }
}

impl PetMenuConfig {
    pub fn is_favorite(&self, uuid: &str) -> bool {
        self.favorites.iter().any(|f| f == uuid)
    }

    /// Add or remove `uuid`. Returns whether it is now a favourite.
    pub fn toggle_favorite(&mut self, uuid: &str) -> bool {
        if let Some(pos) = self.favorites.iter().position(|f| f == uuid) {
            self.favorites.remove(pos);
            false
        } else {
            self.favorites.push(uuid.to_string());
            true
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DevConfig {
    /// Draw a live count of dispatched events.
    pub event_monitor: bool,
    /// Log a line every `heartbeat_interval` client ticks.
    pub heartbeat: bool,
    pub heartbeat_interval: u64,
}

impl Default for DevConfig {
    fn default() -> Self {
        Self {
            event_monitor: false,
            heartbeat: false,
            heartbeat_interval: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config: SkyfallConfig = toml::from_str("").unwrap();
        assert_eq!(config, SkyfallConfig::default());
        assert!(config.hud.clock);
        assert!(config.inventory.level_numbers);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let raw = r#"
[inventory.pet_menu]
favorites_only = true
favorites = ["abc"]
"#;
        let config: SkyfallConfig = toml::from_str(raw).unwrap();
        assert!(config.inventory.pet_menu.favorites_only);
        assert!(config.inventory.pet_menu.is_favorite("abc"));
        assert_eq!(config.inventory.pet_menu.highlight_color, "#FFAA00");
        assert!(config.inventory.level_numbers);
    }

    #[test]
    fn toggle_favorite_flips_membership() {
        let mut pets = PetMenuConfig::default();
        assert!(pets.toggle_favorite("u1"));
        assert!(pets.is_favorite("u1"));
        assert!(!pets.toggle_favorite("u1"));
        assert!(pets.favorites.is_empty());
    }

    #[test]
    fn unknown_element_falls_back_to_origin() {
        let hud = HudConfig::default();
        assert_eq!(hud.element("session_clock"), HudElementConfig::at(1, 1));
        assert_eq!(hud.element("nope"), HudElementConfig::at(0, 0));
    }
}
