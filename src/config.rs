use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::engine::repair::RepairStrategy;
use crate::model::catalog;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    /// Bounds every model call; a timeout fails the turn with state unchanged.
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:1234".into(),
            model: "local-model".into(),
            temperature: 0.7,
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:7860".into(),
            timeout_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub model: ModelConfig,
    pub image: ImageConfig,
    pub repair: RepairStrategy,
    pub healing_keywords: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            image: ImageConfig::default(),
            repair: RepairStrategy::default(),
            healing_keywords: catalog::HEALING_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
        }
    }
}

fn config_path() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("questloom");
    fs::create_dir_all(&path).ok();
    path.push("config.json");
    path
}

/// Lenient load: a missing or unreadable file falls back to defaults.
pub fn load_config() -> EngineConfig {
    let path = config_path();
    fs::read_to_string(path)
        .ok()
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

pub fn save_config(config: &EngineConfig) {
    let path = config_path();
    if let Ok(json) = serde_json::to_string_pretty(config) {
        let _ = fs::write(path, json);
    }
}
