use serde::Deserialize;
use thiserror::Error;

use idlc_rt::config::{env_key, env_value, parse_flag};

const CONFIG_NAME: &str = "idlc";
pub const DEFAULT_MAX_INHERITANCE_DEPTH: usize = 64;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid value `{value}` for {key}")]
    InvalidOverride { key: String, value: String },
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Report duplicate member identifiers as errors rather than warnings.
    pub strict_members: bool,
    pub max_inheritance_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strict_members: false,
            max_inheritance_depth: DEFAULT_MAX_INHERITANCE_DEPTH,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    idlc: Config,
}

impl Config {
    /// Reads the `[idlc]` table; other tables are ignored.
    pub fn from_toml_str(src: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(src)?;
        Ok(file.idlc)
    }

    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|field| env_value(CONFIG_NAME, field))
    }

    /// Applies overrides looked up by field name, e.g. `strict_members`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("strict_members") {
            self.strict_members = parse_flag(&value).ok_or_else(|| invalid("strict_members", &value))?;
        }
        if let Some(value) = lookup("max_inheritance_depth") {
            self.max_inheritance_depth = value
                .trim()
                .parse()
                .map_err(|_| invalid("max_inheritance_depth", &value))?;
        }
        Ok(self)
    }
}

fn invalid(field: &str, value: &str) -> ConfigError {
    ConfigError::InvalidOverride {
        key: env_key(CONFIG_NAME, field),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_table_uses_defaults() {
        let config = Config::from_toml_str("[other]\nkey = 1\n").expect("parse");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn reads_idlc_table() {
        let src = "[idlc]\nstrict_members = true\nmax_inheritance_depth = 8\n";
        let config = Config::from_toml_str(src).expect("parse");
        assert!(config.strict_members);
        assert_eq!(config.max_inheritance_depth, 8);
    }

    #[test]
    fn rejects_wrong_value_types() {
        let err = Config::from_toml_str("[idlc]\nstrict_members = \"sure\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn overrides_replace_file_values() {
        let config = Config::default()
            .with_overrides(|field| match field {
                "strict_members" => Some("yes".to_string()),
                "max_inheritance_depth" => Some(" 3 ".to_string()),
                _ => None,
            })
            .expect("overrides");
        assert!(config.strict_members);
        assert_eq!(config.max_inheritance_depth, 3);
    }

    #[test]
    fn bad_override_names_the_env_key() {
        let err = Config::default()
            .with_overrides(|field| (field == "max_inheritance_depth").then(|| "deep".to_string()))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid value `deep` for IDLC_MAX_INHERITANCE_DEPTH"
        );
    }
}
