//! 照合設定
//!
//! UIやCLIから自由に編集される設定を、閉じた項目集合として表現する。
//! 検証は `MatchConfig::validate` に集約し、照合開始前に一度だけ行う。

use crate::error::{Error, Result};
use crate::extractor::Pattern;
use serde::{Deserialize, Serialize};

/// 既定の抽出パターン（英数字と - _ / . が6文字以上連続）
pub const DEFAULT_PATTERN: &str = r"[A-Za-z0-9\-_/\.]{6,}";

/// 正規化ルール
///
/// 適用順は固定: 大文字化 → 許可文字以外の除去 → 先頭ゼロの除去
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NormalizationRules {
    /// 英数字以外で残す文字（例: "-/"）
    pub keep_chars: String,
    /// 数字列の先頭ゼロを除去する
    pub strip_leading_zeros: bool,
}

impl NormalizationRules {
    /// 許可リストに含まれるか
    pub fn keeps(&self, c: char) -> bool {
        c.is_alphanumeric() || self.keep_chars.contains(c)
    }
}

/// 照合設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct MatchConfig {
    /// 候補抽出用の正規表現
    pub pattern: String,
    pub normalization_rules: NormalizationRules,
    /// 近似一致を有効にする
    pub fuzzy_enabled: bool,
    /// 近似一致で許容する最大編集距離
    pub max_distance: usize,
    pub case_sensitive: bool,
    /// 未検出シリアルに付ける候補の最大件数（0で無効）
    pub suggest_limit: usize,
    /// 候補として提示する最大編集距離
    pub suggest_distance: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.to_string(),
            normalization_rules: NormalizationRules::default(),
            fuzzy_enabled: false,
            max_distance: 1,
            case_sensitive: false,
            suggest_limit: 3,
            suggest_distance: 1,
        }
    }
}

impl MatchConfig {
    /// JSONファイルから読み込み
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// JSON文字列から読み込み
    ///
    /// 負の `maxDistance` や未知の項目はここで設定エラーになる。
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("照合設定を解析できません: {}", e)))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// 設定の整合性を検証し、抽出パターンをコンパイルする
    pub fn validate(&self) -> Result<Pattern> {
        if self.pattern.trim().is_empty() {
            return Err(Error::Config("抽出パターンが空です".into()));
        }
        if self.suggest_limit > 0 && self.suggest_distance == 0 {
            return Err(Error::Config(
                "候補提示を有効にする場合は suggestDistance を1以上にしてください".into(),
            ));
        }

        Pattern::compile(&self.pattern)
    }
}
