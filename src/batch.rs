//! 複数文書の一括照合
//!
//! 同じ台帳を文書ごとに独立して照合する。照合エンジンは共有状態を持たないため
//! 文書単位で並列に実行する。

use crate::cli::ExportFormat;
use crate::document::{is_supported_document, read_document};
use crate::error::{Result, SerialAuditError};
use crate::export::{export_report_as, report_stem, ExportContext};
use crate::source::SerialCell;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serial_audit_common::{reconcile_rows, MatchConfig, SourceRow, Summary};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 1文書分の結果
#[derive(Debug)]
pub struct BatchOutcome {
    pub document: PathBuf,
    pub result: Result<BatchSuccess>,
}

#[derive(Debug)]
pub struct BatchSuccess {
    pub summary: Summary,
    pub outputs: Vec<PathBuf>,
}

/// フォルダ内の文書（TXT/PDF）を列挙する（パス順）
pub fn scan_documents(folder: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Err(SerialAuditError::FolderNotFound(folder.display().to_string()));
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut documents: Vec<PathBuf> = WalkDir::new(folder)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file() && is_supported_document(p))
        .collect();

    documents.sort();
    Ok(documents)
}

/// 文書ごとに重ならないレポート名を決める
///
/// 同じファイル名（拡張子なし）の文書が複数あれば拡張子を名前に含め、
/// それでも重なる場合は連番を付ける。大文字・小文字は区別しない。
pub fn report_names(documents: &[PathBuf]) -> Vec<String> {
    let stem_of = |path: &PathBuf| {
        path.file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "document".to_string())
    };

    let mut stem_counts: HashMap<String, usize> = HashMap::new();
    for path in documents {
        *stem_counts.entry(stem_of(path).to_lowercase()).or_default() += 1;
    }

    let mut used = HashSet::new();
    documents
        .iter()
        .map(|path| {
            let stem = stem_of(path);
            let base = if stem_counts[&stem.to_lowercase()] > 1 {
                match path.extension() {
                    Some(ext) => format!("{}_{}", stem, ext.to_string_lossy()),
                    None => stem,
                }
            } else {
                stem
            };

            let mut name = base.clone();
            let mut n = 2;
            while !used.insert(name.to_lowercase()) {
                name = format!("{}_{}", base, n);
                n += 1;
            }
            report_stem(&name)
        })
        .collect()
}

/// 全文書を照合してレポートを書き出す
///
/// 1文書の失敗で他の文書の処理は止めない。
pub fn run_batch(
    cells: &[SerialCell],
    documents: &[PathBuf],
    config: &MatchConfig,
    format: ExportFormat,
    output_dir: &Path,
) -> Result<Vec<BatchOutcome>> {
    // 設定不備は全文書共通なので先に検出する
    config.validate()?;
    std::fs::create_dir_all(output_dir)?;

    let rows: Vec<SourceRow> = cells.iter().map(SerialCell::to_source_row).collect();
    // 並列に書き出す前に出力名の衝突を解消しておく
    let names = report_names(documents);

    let progress = ProgressBar::new(documents.len() as u64);
    if let Ok(style) = ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}") {
        progress.set_style(style.progress_chars("=> "));
    }

    let outcomes: Vec<BatchOutcome> = documents
        .par_iter()
        .zip(names.par_iter())
        .map(|(path, name)| {
            let result = process_document(path, &rows, cells, config, format, output_dir, name);
            if let Err(e) = &result {
                tracing::warn!(document = %path.display(), error = %e, "document failed");
            }
            progress.inc(1);
            BatchOutcome {
                document: path.clone(),
                result,
            }
        })
        .collect();

    progress.finish_and_clear();
    Ok(outcomes)
}

fn process_document(
    path: &Path,
    rows: &[SourceRow],
    cells: &[SerialCell],
    config: &MatchConfig,
    format: ExportFormat,
    output_dir: &Path,
    report_name: &str,
) -> Result<BatchSuccess> {
    let document = read_document(path)?;
    if document.is_blank() {
        tracing::warn!(document = %path.display(), "document has no text");
    }

    let report = reconcile_rows(rows, &document.text, config)?;
    let context = ExportContext {
        document: &document,
        config,
    };
    let outputs = export_report_as(&report, cells, &context, format, output_dir, report_name)?;

    Ok(BatchSuccess {
        summary: report.summary(),
        outputs,
    })
}
