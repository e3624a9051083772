//! Excel出力
//!
//! 「照合結果」シートに1シリアル1行、「サマリー」シートに集計を書く。

use super::{ExportContext, ReportRow};
use crate::error::{Result, SerialAuditError};
use rust_xlsxwriter::*;
use serial_audit_common::{Report, VerdictKind};
use std::path::Path;

const RESULT_HEADERS: [(&str, f64); 9] = [
    ("行", 6.0),
    ("列", 24.0),
    ("シリアル", 22.0),
    ("正規化キー", 20.0),
    ("判定", 12.0),
    ("文書中の表記", 22.0),
    ("位置", 9.0),
    ("距離", 7.0),
    ("近い候補", 36.0),
];

fn excel_error(context: &'static str) -> impl Fn(XlsxError) -> SerialAuditError {
    move |e| SerialAuditError::ExcelGeneration(format!("{}: {}", context, e))
}

pub fn generate_excel(
    report: &Report,
    rows: &[ReportRow],
    context: &ExportContext<'_>,
    output_path: &Path,
) -> Result<()> {
    let mut workbook = Workbook::new();

    write_results_sheet(workbook.add_worksheet(), rows)?;
    write_summary_sheet(workbook.add_worksheet(), report, context)?;

    workbook
        .save(output_path)
        .map_err(excel_error("Excel保存エラー"))
}

fn verdict_format(kind: VerdictKind) -> Format {
    let color = match kind {
        VerdictKind::Exact => 0xC6EFCE,
        VerdictKind::Approximate => 0xFFEB9C,
        VerdictKind::Missing => 0xFFC7CE,
    };
    Format::new()
        .set_background_color(Color::RGB(color))
        .set_align(FormatAlign::Center)
        .set_border(FormatBorder::Hair)
}

fn write_results_sheet(worksheet: &mut Worksheet, rows: &[ReportRow]) -> Result<()> {
    worksheet
        .set_name("照合結果")
        .map_err(excel_error("シート名設定エラー"))?;

    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xF5F5F5))
        .set_align(FormatAlign::Center)
        .set_border(FormatBorder::Thin);
    let exact = verdict_format(VerdictKind::Exact);
    let approximate = verdict_format(VerdictKind::Approximate);
    let missing = verdict_format(VerdictKind::Missing);

    for (col, (label, width)) in RESULT_HEADERS.iter().enumerate() {
        let col = col as u16;
        worksheet
            .write_string_with_format(0, col, *label, &header_format)
            .map_err(excel_error("ヘッダー書き込みエラー"))?;
        worksheet
            .set_column_width(col, *width)
            .map_err(excel_error("列幅設定エラー"))?;
    }

    for (i, row) in rows.iter().enumerate() {
        let r = i as u32 + 1;
        let verdict_cell = match row.verdict {
            VerdictKind::Exact => &exact,
            VerdictKind::Approximate => &approximate,
            VerdictKind::Missing => &missing,
        };

        worksheet
            .write_number(r, 0, row.row as f64)
            .map_err(excel_error("値書き込みエラー"))?;
        worksheet
            .write_string(r, 1, &row.column)
            .map_err(excel_error("値書き込みエラー"))?;
        worksheet
            .write_string(r, 2, &row.serial)
            .map_err(excel_error("値書き込みエラー"))?;
        worksheet
            .write_string(r, 3, &row.key)
            .map_err(excel_error("値書き込みエラー"))?;
        worksheet
            .write_string_with_format(r, 4, row.verdict.label(), verdict_cell)
            .map_err(excel_error("値書き込みエラー"))?;
        if let Some(text) = &row.matched_text {
            worksheet
                .write_string(r, 5, text)
                .map_err(excel_error("値書き込みエラー"))?;
        }
        if let Some(offset) = row.offset {
            worksheet
                .write_number(r, 6, offset as f64)
                .map_err(excel_error("値書き込みエラー"))?;
        }
        if let Some(distance) = row.distance {
            worksheet
                .write_number(r, 7, distance as f64)
                .map_err(excel_error("値書き込みエラー"))?;
        }
        if !row.suggestions.is_empty() {
            worksheet
                .write_string(r, 8, &row.suggestions)
                .map_err(excel_error("値書き込みエラー"))?;
        }
    }

    worksheet
        .set_freeze_panes(1, 0)
        .map_err(excel_error("ウィンドウ枠固定エラー"))?;
    worksheet
        .autofilter(0, 0, rows.len() as u32, RESULT_HEADERS.len() as u16 - 1)
        .map_err(excel_error("フィルター設定エラー"))?;

    Ok(())
}

fn write_summary_sheet(worksheet: &mut Worksheet, report: &Report, context: &ExportContext<'_>) -> Result<()> {
    worksheet
        .set_name("サマリー")
        .map_err(excel_error("シート名設定エラー"))?;

    let label_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xF5F5F5))
        .set_border(FormatBorder::Hair);
    worksheet
        .set_column_width(0, 18.0)
        .map_err(excel_error("列幅設定エラー"))?;
    worksheet
        .set_column_width(1, 70.0)
        .map_err(excel_error("列幅設定エラー"))?;

    let summary = report.summary();
    let found_rate = if summary.total == 0 {
        0.0
    } else {
        summary.found_count() as f64 / summary.total as f64 * 100.0
    };
    let config = context.config;

    let entries: Vec<(&str, String)> = vec![
        ("文書", context.document.file_name()),
        ("SHA-256", context.document.sha256()),
        ("文字数", context.document.char_count().to_string()),
        ("総数", summary.total.to_string()),
        ("一致", summary.exact_count.to_string()),
        ("近似一致", summary.approximate_count.to_string()),
        ("未検出", summary.missing_count.to_string()),
        ("検出率", format!("{:.1}%", found_rate)),
        ("抽出パターン", config.pattern.clone()),
        (
            "近似一致設定",
            if config.fuzzy_enabled {
                format!("有効（最大距離 {}）", config.max_distance)
            } else {
                "無効".to_string()
            },
        ),
        ("先頭ゼロ除去", yes_no(config.normalization_rules.strip_leading_zeros).to_string()),
        ("大文字小文字区別", yes_no(config.case_sensitive).to_string()),
        ("生成日時", chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()),
    ];

    for (i, (label, value)) in entries.iter().enumerate() {
        let r = i as u32;
        worksheet
            .write_string_with_format(r, 0, *label, &label_format)
            .map_err(excel_error("ラベル書き込みエラー"))?;
        worksheet
            .write_string(r, 1, value)
            .map_err(excel_error("値書き込みエラー"))?;
    }

    Ok(())
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "あり"
    } else {
        "なし"
    }
}
