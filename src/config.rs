use crate::cli::ExportFormat;
use crate::error::{Result, SerialAuditError};
use serde::{Deserialize, Serialize};
use serial_audit_common::MatchConfig;
use std::path::{Path, PathBuf};

/// 既定のシリアル列（社内シリアル・社外シリアル）
pub const DEFAULT_COLUMNS: [&str; 2] = ["SERIAL FISICO INTERNO", "SERIAL FISICO EXTERNO"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// 照合に使う列名（順序どおりに連結）
    pub columns: Vec<String>,
    pub matching: MatchConfig,
    pub default_format: ExportFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect(),
            matching: MatchConfig::default(),
            default_format: ExportFormat::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// 指定パスから読み込む（ファイルがなければ初期値）
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        tracing::debug!(path = %config_path.display(), "loading config");
        let content = std::fs::read_to_string(config_path)?;
        serde_json::from_str(&content).map_err(|e| {
            SerialAuditError::Config(format!(
                "{} を読み込めません: {}（`serial-audit config --reset` で初期化できます）",
                config_path.display(),
                e
            ))
        })
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    /// 既存ファイルを読まずに初期値で上書きする
    ///
    /// 壊れた設定ファイルからの復旧にも使う。
    pub fn reset() -> Result<Self> {
        Self::reset_at(&Self::config_path()?)
    }

    pub fn reset_at(config_path: &Path) -> Result<Self> {
        let config = Self::default();
        config.save_to(config_path)?;
        Ok(config)
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| SerialAuditError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("serial-audit").join("config.json"))
    }

    pub fn set_columns(&mut self, columns: Vec<String>) -> Result<()> {
        let columns: Vec<String> = columns
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        if columns.is_empty() {
            return Err(SerialAuditError::Config("列名を1つ以上指定してください".into()));
        }
        self.columns = columns;
        self.save()
    }

    pub fn set_pattern(&mut self, pattern: String) -> Result<()> {
        let matching = MatchConfig {
            pattern,
            ..self.matching.clone()
        };
        // 保存前にコンパイルできるか確認
        matching.validate()?;
        self.matching = matching;
        self.save()
    }
}
