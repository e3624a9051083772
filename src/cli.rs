use crate::error::Result;
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use serial_audit_common::MatchConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "serial-audit")]
#[command(about = "シリアル台帳と輸入申告書（TXT/PDF）の照合ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// シリアル台帳と1つの文書を照合してレポートを出力
    Check {
        /// シリアル台帳（XLSX/XLS/ODS/CSV）
        #[arg(required = true)]
        serials: PathBuf,

        /// 文書（TXT/PDF）
        #[arg(required = true)]
        document: PathBuf,

        /// シリアル列名（複数指定可、省略時は設定の列）
        #[arg(short, long = "column")]
        columns: Vec<String>,

        #[command(flatten)]
        matching: MatchArgs,

        /// 出力形式 (excel/json/csv/all)
        #[arg(short, long)]
        format: Option<ExportFormat>,

        /// 出力ファイル/ディレクトリ
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 列が見つからない場合に対話的に選択する
        #[arg(short, long)]
        interactive: bool,
    },

    /// フォルダ内の全文書を同じ台帳と照合
    Batch {
        /// シリアル台帳（XLSX/XLS/ODS/CSV）
        #[arg(required = true)]
        serials: PathBuf,

        /// 文書フォルダ
        #[arg(required = true)]
        folder: PathBuf,

        /// サブフォルダも再帰的にスキャン
        #[arg(short = 'r', long)]
        recursive: bool,

        /// シリアル列名（複数指定可）
        #[arg(short, long = "column")]
        columns: Vec<String>,

        #[command(flatten)]
        matching: MatchArgs,

        /// 出力形式 (excel/json/csv/all)
        #[arg(short, long)]
        format: Option<ExportFormat>,

        /// 出力ディレクトリ（デフォルト: 文書フォルダ）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 台帳の列名と先頭行を表示
    Columns {
        /// シリアル台帳（XLSX/XLS/ODS/CSV）
        #[arg(required = true)]
        serials: PathBuf,

        /// 表示する行数
        #[arg(short = 'n', long, default_value = "10")]
        rows: usize,
    },

    /// 設定を表示/編集
    Config {
        /// シリアル列名を設定（カンマ区切り）
        #[arg(long, value_delimiter = ',')]
        set_columns: Option<Vec<String>>,

        /// 抽出パターン（正規表現）を設定
        #[arg(long)]
        set_pattern: Option<String>,

        /// 設定を初期値に戻す
        #[arg(long)]
        reset: bool,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

/// 照合設定の上書きオプション
#[derive(Args, Clone, Debug, Default)]
pub struct MatchArgs {
    /// 照合設定JSONファイル（設定ファイルの値を置き換える）
    #[arg(long)]
    pub match_config: Option<PathBuf>,

    /// 候補抽出パターン（正規表現）
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// 近似一致を有効にする
    #[arg(long)]
    pub fuzzy: bool,

    /// 近似一致の最大編集距離
    #[arg(long)]
    pub max_distance: Option<usize>,

    /// 正規化で残す記号（例: "-/"）
    #[arg(long)]
    pub keep: Option<String>,

    /// 数字列の先頭ゼロを無視する
    #[arg(long)]
    pub strip_leading_zeros: bool,

    /// 大文字・小文字を区別する
    #[arg(long)]
    pub case_sensitive: bool,

    /// 未検出シリアルに近い候補を最大N件表示
    #[arg(long)]
    pub suggest: Option<usize>,

    /// 候補として表示する最大編集距離
    #[arg(long)]
    pub suggest_distance: Option<usize>,
}

impl MatchArgs {
    /// 基本設定にオプションを重ねた照合設定を作る
    pub fn resolve(&self, base: &MatchConfig) -> Result<MatchConfig> {
        let mut config = match &self.match_config {
            Some(path) => MatchConfig::from_file(path)?,
            None => base.clone(),
        };

        if let Some(pattern) = &self.pattern {
            config.pattern = pattern.clone();
        }
        if self.fuzzy {
            config.fuzzy_enabled = true;
        }
        if let Some(max_distance) = self.max_distance {
            config.max_distance = max_distance;
        }
        if let Some(keep) = &self.keep {
            config.normalization_rules.keep_chars = keep.clone();
        }
        if self.strip_leading_zeros {
            config.normalization_rules.strip_leading_zeros = true;
        }
        if self.case_sensitive {
            config.case_sensitive = true;
        }
        if let Some(limit) = self.suggest {
            config.suggest_limit = limit;
        }
        if let Some(distance) = self.suggest_distance {
            config.suggest_distance = distance;
        }

        config.validate()?;
        Ok(config)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Excel,
    Json,
    Csv,
    All,
}

impl ExportFormat {
    /// 出力する拡張子の一覧
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            ExportFormat::Excel => &["xlsx"],
            ExportFormat::Json => &["json"],
            ExportFormat::Csv => &["csv"],
            ExportFormat::All => &["xlsx", "json", "csv"],
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "all" => Ok(ExportFormat::All),
            _ => Err(format!("Unknown format: {}. Use excel, json, csv, or all", s)),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Excel => write!(f, "excel"),
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Csv => write!(f, "csv"),
            ExportFormat::All => write!(f, "all"),
        }
    }
}
