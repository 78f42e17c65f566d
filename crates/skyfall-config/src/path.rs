//! Dotted-path access to config values (`inventory.pet_menu.favorites_only`).
//!
//! Edits go through a `toml::Value` copy of the config and are only
//! committed when the edited tree still deserializes, so a bad value never
//! leaves the config half-updated.

use toml::Value;

use crate::error::ConfigError;
use crate::schema::SkyfallConfig;

impl SkyfallConfig {
    /// Look up the value at `path`.
    pub fn get_path(&self, path: &str) -> Result<Value, ConfigError> {
        let root = Value::try_from(self)?;
        lookup(&root, path).cloned()
    }

    /// Replace the value at `path` with `raw`.
    ///
    /// `raw` is parsed as a TOML value and must have the same type as the
    /// current one. A bare word is accepted for string keys.
    pub fn set_path(&mut self, path: &str, raw: &str) -> Result<(), ConfigError> {
        let mut root = Value::try_from(&*self)?;
        let slot = lookup_mut(&mut root, path)?;
        let value = parse_like(slot, raw).ok_or_else(|| ConfigError::InvalidValue {
            path: path.to_string(),
            reason: format!("expected {}, got `{raw}`", slot.type_str()),
        })?;
        *slot = value;
        self.commit(path, root)
    }

    /// Flip the boolean at `path` and return its new value.
    pub fn toggle_path(&mut self, path: &str) -> Result<bool, ConfigError> {
        let mut root = Value::try_from(&*self)?;
        let slot = lookup_mut(&mut root, path)?;
        let Value::Boolean(current) = *slot else {
            return Err(ConfigError::InvalidValue {
                path: path.to_string(),
                reason: format!("{} is not a boolean", slot.type_str()),
            });
        };
        *slot = Value::Boolean(!current);
        self.commit(path, root)?;
        Ok(!current)
    }

    fn commit(&mut self, path: &str, root: Value) -> Result<(), ConfigError> {
        *self = root.try_into().map_err(|e: toml::de::Error| ConfigError::InvalidValue {
            path: path.to_string(),
            reason: e.message().to_string(),
        })?;
        Ok(())
    }
}

fn lookup<'a>(root: &'a Value, path: &str) -> Result<&'a Value, ConfigError> {
    let mut node = root;
    for segment in segments(path)? {
        node = node
            .as_table()
            .and_then(|table| table.get(segment))
            .ok_or_else(|| ConfigError::UnknownKey(path.to_string()))?;
    }
    Ok(node)
}

fn lookup_mut<'a>(root: &'a mut Value, path: &str) -> Result<&'a mut Value, ConfigError> {
    let mut node = root;
    for segment in segments(path)? {
        node = node
            .as_table_mut()
            .and_then(|table| table.get_mut(segment))
            .ok_or_else(|| ConfigError::UnknownKey(path.to_string()))?;
    }
    Ok(node)
}

fn segments(path: &str) -> Result<Vec<&str>, ConfigError> {
    let parts: Vec<&str> = path.split('.').collect();
    if parts.iter().any(|p| p.trim().is_empty()) {
        return Err(ConfigError::UnknownKey(path.to_string()));
    }
    Ok(parts)
}

/// Parse `raw` into a value of the same TOML type as `current`.
fn parse_like(current: &Value, raw: &str) -> Option<Value> {
    let raw = raw.trim();
    let parsed = toml::from_str::<toml::Table>(&format!("v = {raw}"))
        .ok()
        .and_then(|mut table| table.remove("v"));

    match (current, parsed) {
        (Value::String(_), Some(Value::String(s))) => Some(Value::String(s)),
        (Value::String(_), _) => Some(Value::String(raw.to_string())),
        (current, Some(value)) if current.same_type(&value) => Some(value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_reads_nested_values() {
        let config = SkyfallConfig::default();
        assert_eq!(config.get_path("hud.clock").unwrap(), Value::Boolean(true));
        assert_eq!(
            config.get_path("dev.heartbeat_interval").unwrap(),
            Value::Integer(100)
        );
        assert_eq!(
            config.get_path("hud.elements.session_clock.x").unwrap(),
            Value::Integer(1)
        );
    }

    #[test]
    fn toggle_flips_booleans() {
        let mut config = SkyfallConfig::default();
        assert!(!config.toggle_path("hud.clock").unwrap());
        assert!(!config.hud.clock);
        assert!(config.toggle_path("hud.clock").unwrap());
        assert!(config.hud.clock);
    }

    #[test]
    fn toggle_rejects_non_booleans() {
        let mut config = SkyfallConfig::default();
        let err = config.toggle_path("dev.heartbeat_interval").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        assert_eq!(config, SkyfallConfig::default());
    }

    #[test]
    fn set_parses_by_existing_type() {
        let mut config = SkyfallConfig::default();
        config.set_path("dev.heartbeat_interval", "20").unwrap();
        config.set_path("inventory.pet_menu.highlight_color", "#123456").unwrap();
        config
            .set_path("inventory.pet_menu.favorites", r#"["a", "b"]"#)
            .unwrap();
        config.set_path("dev.heartbeat", "true").unwrap();

        assert_eq!(config.dev.heartbeat_interval, 20);
        assert_eq!(config.inventory.pet_menu.highlight_color, "#123456");
        assert_eq!(config.inventory.pet_menu.favorites, vec!["a", "b"]);
        assert!(config.dev.heartbeat);
    }

    #[test]
    fn set_rejects_type_mismatch_and_leaves_config_alone() {
        let mut config = SkyfallConfig::default();
        assert!(config.set_path("hud.clock", "maybe").is_err());
        assert!(config.set_path("dev.heartbeat_interval", "\"ten\"").is_err());
        assert_eq!(config, SkyfallConfig::default());
    }

    #[test]
    fn set_rejects_values_that_do_not_fit_the_schema() {
        let mut config = SkyfallConfig::default();
        let err = config.set_path("hud.elements.session_clock.x", "-4").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        assert_eq!(config.hud.element("session_clock").x, 1);
    }

    #[test]
    fn unknown_paths_are_reported() {
        let mut config = SkyfallConfig::default();
        for path in ["hud.nope", "nope", "hud..clock", "hud.clock.deeper", ""] {
            let err = config.toggle_path(path).unwrap_err();
            assert!(matches!(err, ConfigError::UnknownKey(_)), "{path}");
        }
    }
}
