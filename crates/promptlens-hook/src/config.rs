use promptlens_discovery::DiscoveryConfig;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// `text` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Get the global config path: ~/.promptlens/promptlens.toml
    fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".promptlens").join("promptlens.toml"))
    }

    /// Load configuration with layered approach:
    /// 1. Global config: ~/.promptlens/promptlens.toml (optional)
    /// 2. Local override: ./promptlens.toml (optional)
    /// 3. Environment variables (highest priority), e.g. `PROMPTLENS__DISCOVERY__MAX_MATCHES=3`
    ///
    /// Nothing is written to disk; a missing file simply contributes no values.
    pub fn load() -> anyhow::Result<Self> {
        // Load .env file from current directory
        dotenvy::dotenv().ok();

        let mut config_builder = config::Config::builder();

        // Layer 1: Global config
        if let Some(path) = Self::global_config_path() {
            config_builder = config_builder.add_source(config::File::from(path).required(false));
        }

        let config = config_builder
            // Layer 2: Local workspace config
            .add_source(config::File::with_name("promptlens").required(false))
            // Layer 3: Environment variables with PROMPTLENS__ prefix
            .add_source(
                config::Environment::with_prefix("PROMPTLENS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.format, "text");
        assert!(config.discovery.enabled);
    }

    #[test]
    fn test_sections_override_defaults() {
        let toml_str = r#"
            [discovery]
            enabled = false
            max_matches = 3
            global_root = "/opt/shared"

            [logging]
            level = "debug"
            format = "json"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert!(!config.discovery.enabled);
        assert_eq!(config.discovery.max_matches, 3);
        assert_eq!(config.discovery.scan_timeout_ms, 2000);
        assert_eq!(
            config.discovery.global_root.as_deref(),
            Some(Path::new("/opt/shared"))
        );
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_global_config_path() {
        if let Some(path) = Config::global_config_path() {
            assert!(path.ends_with(".promptlens/promptlens.toml"));
        }
    }
}
