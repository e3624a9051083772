//! エラー型定義
//!
//! 照合エンジンが返すエラーは設定不備のみ。
//! 入力データ（シリアル・文書テキスト）の不備はすべて判定結果に吸収される。

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// 設定エラー（実行前に検出されるもの）かどうか
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Config(_) | Error::Pattern(_) | Error::Json(_))
    }
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
