pub mod csv;
pub mod excel;
pub mod json;

use crate::cli::ExportFormat;
use crate::document::Document;
use crate::error::Result;
use crate::source::SerialCell;
use serde::Serialize;
use serial_audit_common::{MatchConfig, Report, VerdictKind};
use std::path::{Path, PathBuf};

/// レポート1行分（台帳のシリアル1件）
#[derive(Debug, Clone, Serialize)]
pub struct ReportRow {
    pub row: usize,
    pub column: String,
    pub serial: String,
    pub key: String,
    pub verdict: VerdictKind,
    pub matched_text: Option<String>,
    pub offset: Option<usize>,
    pub distance: Option<usize>,
    pub suggestions: String,
}

/// 出力に付ける付帯情報
#[derive(Debug, Clone)]
pub struct ExportContext<'a> {
    pub document: &'a Document,
    pub config: &'a MatchConfig,
}

/// 判定と台帳セルを並べてレポート行を作る
///
/// 判定は台帳セルと同じ順序で並んでいる。
pub fn report_rows(report: &Report, cells: &[SerialCell]) -> Vec<ReportRow> {
    report
        .verdicts()
        .iter()
        .enumerate()
        .map(|(i, verdict)| ReportRow {
            row: verdict.serial.row,
            column: cells.get(i).map(|c| c.column.clone()).unwrap_or_default(),
            serial: verdict.serial.raw.clone(),
            key: verdict.serial.key.clone(),
            verdict: verdict.kind,
            matched_text: verdict.matched.as_ref().map(|c| c.text.clone()),
            offset: verdict.matched.as_ref().map(|c| c.offset),
            distance: verdict.distance,
            suggestions: verdict
                .suggestions
                .iter()
                .map(|s| format!("{} (d={})", s.key, s.distance))
                .collect::<Vec<_>>()
                .join(", "),
        })
        .collect()
}

fn output_path_for_format(output: &Path, stem: &str, extension: &str) -> PathBuf {
    if output.is_dir() || output.extension().is_none() {
        output.join(format!("{}.{}", stem, extension))
    } else {
        output.with_extension(extension)
    }
}

/// 文書名からレポートのファイル名（拡張子なし）を作る
pub fn report_stem(document_stem: &str) -> String {
    format!("{}_照合結果", document_stem)
}

/// 指定形式でレポートを書き出し、出力したパスを返す
pub fn export_report(
    report: &Report,
    cells: &[SerialCell],
    context: &ExportContext<'_>,
    format: ExportFormat,
    output: &Path,
) -> Result<Vec<PathBuf>> {
    let stem = report_stem(&context.document.stem());
    export_report_as(report, cells, context, format, output, &stem)
}

/// ファイル名を指定して書き出す
///
/// 出力先がディレクトリの場合に `stem` を使う。
pub fn export_report_as(
    report: &Report,
    cells: &[SerialCell],
    context: &ExportContext<'_>,
    format: ExportFormat,
    output: &Path,
    stem: &str,
) -> Result<Vec<PathBuf>> {
    if output.extension().is_none() {
        std::fs::create_dir_all(output)?;
    }

    let rows = report_rows(report, cells);
    let mut written = Vec::new();

    for extension in format.extensions() {
        let path = output_path_for_format(output, stem, extension);
        match *extension {
            "xlsx" => excel::generate_excel(report, &rows, context, &path)?,
            "json" => json::generate_json(report, context, &path)?,
            _ => csv::generate_csv(&rows, &path)?,
        }
        tracing::debug!(path = %path.display(), "report written");
        written.push(path);
    }

    Ok(written)
}
