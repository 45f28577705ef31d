//! 程序配置

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tagscope_core::config::SessionConfig;
use tracing::Level;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 日志级别（trace/debug/info/warn/error）
    pub log_level: String,
    /// 未指定坐标时新图形的放置间距
    pub placement_step: f64,
    pub session: SessionConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            placement_step: 120.0,
            session: SessionConfig::default(),
        }
    }
}

impl AppConfig {
    /// 从 JSON 文件加载
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn level(&self) -> Result<Level> {
        self.log_level
            .parse()
            .map_err(|_| anyhow::anyhow!("Unknown log level: {}", self.log_level))
    }
}
