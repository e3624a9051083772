use thiserror::Error;

#[derive(Error, Debug)]
pub enum SerialAuditError {
    #[error(transparent)]
    Common(#[from] serial_audit_common::Error),

    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("未対応のファイル形式です: {0}")]
    UnsupportedFormat(String),

    #[error("表の読み込みに失敗: {0}")]
    Spreadsheet(String),

    #[error("PDF読み込みエラー: {0}")]
    Pdf(String),

    #[error("CSV読み込みエラー: {0}")]
    Csv(#[from] csv::Error),

    #[error("列が見つかりません: {requested:?}（利用可能な列: {available:?}）")]
    ColumnNotFound {
        requested: Vec<String>,
        available: Vec<String>,
    },

    #[error("照合対象のシリアルがありません: {0}")]
    NoSerials(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("Excel生成エラー: {0}")]
    ExcelGeneration(String),

    #[error("入力エラー: {0}")]
    Interactive(String),
}

pub type Result<T> = std::result::Result<T, SerialAuditError>;
