//! Configuration loading for the language server
//!
//! Settings come from an optional YAML file in the workspace root and are
//! then overridden by client-supplied options.

use crate::context::DEFAULT_LOOKBACK;
use crate::preview::DEFAULT_PREVIEW_URL;
use crate::resolver::DEFAULT_CAPACITY;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file names tried in the workspace root, in order
pub const CONFIG_FILES: [&str; 4] = [
    ".nicegui-lsp.yaml",
    ".nicegui-lsp.yml",
    "nicegui-lsp.yaml",
    "nicegui-lsp.yml",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Main engine configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub engine: EngineSettings,
    pub assets: AssetSettings,
    pub completion: CompletionSettings,
    pub analyzer: AnalyzerSettings,
    pub preview: PreviewSettings,
}

/// Core engine settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Server name
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Look for a config file and assets in the workspace root
    pub workspace_discovery: bool,
}

/// Where the knowledge base files live
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssetSettings {
    /// Directories tried relative to the workspace root and the executable
    pub search_paths: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompletionSettings {
    /// Also trigger completion on quote characters. Trigger characters are
    /// advertised once at initialize, so a later change is enforced by
    /// `accepts_trigger` instead.
    pub enable_string_suggestions: bool,
    /// Characters scanned backwards from the cursor
    pub lookback_chars: usize,
    /// Entries per resolver cache
    pub cache_capacity: usize,
}

/// External type-analysis service
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyzerSettings {
    pub enabled: bool,
    /// Program and arguments of a stdio language server
    pub command: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PreviewSettings {
    pub url: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            name: "nicegui-lsp".to_string(),
            log_level: "info".to_string(),
            workspace_discovery: true,
        }
    }
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            search_paths: vec![
                "assets".to_string(),
                ".nicegui-lsp/assets".to_string(),
                "share/nicegui-lsp/assets".to_string(),
                "../share/nicegui-lsp/assets".to_string(),
            ],
        }
    }
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            enable_string_suggestions: true,
            lookback_chars: DEFAULT_LOOKBACK,
            cache_capacity: DEFAULT_CAPACITY,
        }
    }
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            command: vec!["pyright-langserver".to_string(), "--stdio".to_string()],
        }
    }
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_PREVIEW_URL.to_string(),
        }
    }
}

/// Options sent by the client in `initializationOptions` or settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientSettings {
    pub enable_string_suggestions: Option<bool>,
    pub preview: Option<ClientPreviewSettings>,
    /// Flattened form of `preview.url`
    #[serde(rename = "preview.url")]
    pub preview_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClientPreviewSettings {
    pub url: Option<String>,
}

impl EngineConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the first config file found in the workspace root
    pub fn load_default(workspace_root: &Path) -> Self {
        for name in CONFIG_FILES {
            let candidate = workspace_root.join(name);
            if !candidate.exists() {
                continue;
            }
            match Self::load(&candidate) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", candidate.display());
                    return config;
                }
                Err(e) => tracing::warn!("{}", e),
            }
        }

        Self::default()
    }

    /// Apply client options; malformed options are ignored with a warning
    pub fn apply_client_settings(&mut self, options: &Value) {
        let settings: ClientSettings = match serde_json::from_value(options.clone()) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Ignoring malformed client settings: {}", e);
                return;
            }
        };

        if let Some(enabled) = settings.enable_string_suggestions {
            self.completion.enable_string_suggestions = enabled;
        }
        let url = settings
            .preview
            .and_then(|preview| preview.url)
            .or(settings.preview_url);
        if let Some(url) = url {
            self.preview.url = url;
        }
    }

    /// Whether a completion request sent for `trigger` should be served
    pub fn accepts_trigger(&self, trigger: Option<&str>) -> bool {
        match trigger {
            Some("'") | Some("\"") => self.completion.enable_string_suggestions,
            _ => true,
        }
    }

    /// Completion trigger characters
    pub fn trigger_characters(&self) -> Vec<String> {
        let mut chars: Vec<String> = [".", "(", "=", ":", ";", " "]
            .iter()
            .map(|c| c.to_string())
            .collect();
        if self.completion.enable_string_suggestions {
            chars.push("'".to_string());
            chars.push("\"".to_string());
        }
        chars
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.engine.name, "nicegui-lsp");
        assert_eq!(config.engine.log_level, "info");
        assert!(config.completion.enable_string_suggestions);
        assert_eq!(config.completion.lookback_chars, 4096);
        assert_eq!(config.completion.cache_capacity, 512);
        assert_eq!(config.analyzer.command[0], "pyright-langserver");
        assert_eq!(config.preview.url, "http://localhost:8080");
    }

    #[test]
    fn test_load_config_from_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("settings.yaml");

        let yaml = r#"
engine:
  log_level: debug
completion:
  enable_string_suggestions: false
  cache_capacity: 64
analyzer:
  command: [basedpyright-langserver, --stdio]
preview:
  url: https://app.example.com
"#;
        fs::write(&config_path, yaml).unwrap();

        let config = EngineConfig::load(&config_path).unwrap();
        assert_eq!(config.engine.log_level, "debug");
        assert_eq!(config.engine.name, "nicegui-lsp");
        assert!(!config.completion.enable_string_suggestions);
        assert_eq!(config.completion.cache_capacity, 64);
        assert_eq!(config.completion.lookback_chars, 4096);
        assert_eq!(config.analyzer.command, vec!["basedpyright-langserver", "--stdio"]);
        assert_eq!(config.preview.url, "https://app.example.com");
    }

    #[test]
    fn test_load_errors() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.yaml");
        assert!(matches!(EngineConfig::load(&missing), Err(ConfigError::Read { .. })));

        let broken = temp_dir.path().join("broken.yaml");
        fs::write(&broken, "engine: [unclosed").unwrap();
        assert!(matches!(EngineConfig::load(&broken), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_load_default_config() {
        let temp_dir = TempDir::new().unwrap();
        let config = EngineConfig::load_default(temp_dir.path());
        assert_eq!(config.engine.name, "nicegui-lsp");

        fs::write(
            temp_dir.path().join(".nicegui-lsp.yml"),
            "engine:\n  name: custom-name\n",
        )
        .unwrap();
        let config = EngineConfig::load_default(temp_dir.path());
        assert_eq!(config.engine.name, "custom-name");
    }

    #[test]
    fn test_broken_file_falls_back_to_defaults() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(".nicegui-lsp.yaml"), "completion: [unclosed").unwrap();
        let config = EngineConfig::load_default(temp_dir.path());
        assert_eq!(config.completion.lookback_chars, 4096);
    }

    #[test]
    fn test_client_settings_override() {
        let mut config = EngineConfig::default();
        config.apply_client_settings(&json!({
            "enableStringSuggestions": false,
            "preview": {"url": "https://localhost:9000"}
        }));
        assert!(!config.completion.enable_string_suggestions);
        assert_eq!(config.preview.url, "https://localhost:9000");

        config.apply_client_settings(&json!({"preview.url": "http://127.0.0.1:8081"}));
        assert_eq!(config.preview.url, "http://127.0.0.1:8081");

        config.apply_client_settings(&json!({"enableStringSuggestions": "yes"}));
        assert!(!config.completion.enable_string_suggestions);
    }

    #[test]
    fn test_trigger_characters() {
        let mut config = EngineConfig::default();
        assert!(config.trigger_characters().contains(&"'".to_string()));

        config.completion.enable_string_suggestions = false;
        let chars = config.trigger_characters();
        assert!(!chars.contains(&"'".to_string()));
        assert!(chars.contains(&".".to_string()));
    }

    #[test]
    fn test_quote_triggers_follow_runtime_settings() {
        let mut config = EngineConfig::default();
        assert!(config.accepts_trigger(Some("'")));

        config.apply_client_settings(&json!({"enableStringSuggestions": false}));
        assert!(!config.accepts_trigger(Some("'")));
        assert!(!config.accepts_trigger(Some("\"")));
        assert!(config.accepts_trigger(Some(".")));
        assert!(config.accepts_trigger(None));

        config.apply_client_settings(&json!({"enableStringSuggestions": true}));
        assert!(config.accepts_trigger(Some("\"")));
    }
}
