//! User-tunable alert configuration.
//!
//! Four knobs, all persisted through the injected settings store:
//! which priority classes get alerted, how far ahead of the start the
//! alert surfaces, how long it stays visible, and whether it makes noise.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Alert configuration.
///
/// Serialized to/from TOML by the file-backed settings store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Priority classes that qualify for an alert.
    #[serde(default = "default_priority_filter")]
    pub priority_filter: BTreeSet<u32>,
    /// Seconds before the start at which the alert surfaces. 0 disables
    /// alerting entirely.
    #[serde(default = "default_lead_secs")]
    pub lead_secs: u64,
    /// Seconds the alert stays visible. 0 means "host default".
    #[serde(default)]
    pub display_secs: u64,
    /// Whether a sound accompanies the alert.
    #[serde(default = "default_true")]
    pub audio_enabled: bool,
}

// Default functions
fn default_priority_filter() -> BTreeSet<u32> {
    BTreeSet::from([3, 5])
}
fn default_lead_secs() -> u64 {
    1800
}
fn default_true() -> bool {
    true
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            priority_filter: default_priority_filter(),
            lead_secs: default_lead_secs(),
            display_secs: 0,
            audio_enabled: true,
        }
    }
}

/// Partial configuration update. `None` fields keep the current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertConfigPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_filter: Option<BTreeSet<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_enabled: Option<bool>,
}

impl AlertConfig {
    /// Merge a partial update into this configuration.
    pub fn apply(&mut self, patch: &AlertConfigPatch) {
        if let Some(filter) = &patch.priority_filter {
            self.priority_filter = filter.clone();
        }
        if let Some(lead) = patch.lead_secs {
            self.lead_secs = lead;
        }
        if let Some(display) = patch.display_secs {
            self.display_secs = display;
        }
        if let Some(audio) = patch.audio_enabled {
            self.audio_enabled = audio;
        }
    }

    /// Look up a field by key, rendered as a string.
    pub fn get(&self, key: &str) -> Option<String> {
        let root = serde_json::to_value(self).ok()?;
        let value = root.get(key)?;
        Some(match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    /// Set a field by key from a string value.
    ///
    /// The value is parsed according to the field's current type:
    /// booleans as `true`/`false`, numbers as integers, and the priority
    /// filter as a JSON array (e.g. `[3,5]`).
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut root = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        let obj = root
            .as_object_mut()
            .ok_or_else(|| invalid("not an object".into()))?;
        let existing = obj
            .get(key)
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

        let new_value = match existing {
            serde_json::Value::Bool(_) => {
                serde_json::Value::Bool(value.parse::<bool>().map_err(|e| invalid(e.to_string()))?)
            }
            serde_json::Value::Number(_) => {
                serde_json::Value::Number(value.parse::<u64>().map_err(|e| invalid(e.to_string()))?.into())
            }
            serde_json::Value::Array(_) => {
                serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
            }
            _ => serde_json::Value::String(value.into()),
        };

        obj.insert(key.to_string(), new_value);
        *self = serde_json::from_value(root).map_err(|e| invalid(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = AlertConfig::default();
        assert_eq!(cfg.priority_filter, BTreeSet::from([3, 5]));
        assert_eq!(cfg.lead_secs, 1800);
        assert_eq!(cfg.display_secs, 0);
        assert!(cfg.audio_enabled);
    }

    #[test]
    fn patch_merges_only_present_fields() {
        let mut cfg = AlertConfig::default();
        cfg.apply(&AlertConfigPatch {
            lead_secs: Some(60),
            audio_enabled: Some(false),
            ..Default::default()
        });
        assert_eq!(cfg.lead_secs, 60);
        assert!(!cfg.audio_enabled);
        // Untouched fields keep their values.
        assert_eq!(cfg.priority_filter, BTreeSet::from([3, 5]));
        assert_eq!(cfg.display_secs, 0);
    }

    #[test]
    fn get_and_set_by_key() {
        let mut cfg = AlertConfig::default();
        assert_eq!(cfg.get("lead_secs").as_deref(), Some("1800"));
        assert_eq!(cfg.get("priority_filter").as_deref(), Some("[3,5]"));
        assert_eq!(cfg.get("nope"), None);

        cfg.set("lead_secs", "300").unwrap();
        assert_eq!(cfg.lead_secs, 300);

        cfg.set("audio_enabled", "false").unwrap();
        assert!(!cfg.audio_enabled);

        cfg.set("priority_filter", "[1,2,7]").unwrap();
        assert_eq!(cfg.priority_filter, BTreeSet::from([1, 2, 7]));
    }

    #[test]
    fn set_rejects_unknown_keys_and_bad_values() {
        let mut cfg = AlertConfig::default();
        assert!(matches!(
            cfg.set("volume", "50"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            cfg.set("lead_secs", "soon"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            cfg.set("audio_enabled", "yes"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn toml_round_trip() {
        let mut cfg = AlertConfig::default();
        cfg.lead_secs = 600;
        cfg.priority_filter = BTreeSet::from([5]);
        let serialized = toml::to_string(&cfg).unwrap();
        let parsed: AlertConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let parsed: AlertConfig = toml::from_str("lead_secs = 120\n").unwrap();
        assert_eq!(parsed.lead_secs, 120);
        assert_eq!(parsed.priority_filter, BTreeSet::from([3, 5]));
        assert!(parsed.audio_enabled);
    }
}
