//! 照合の全体制御
//!
//! 正規化 → 候補抽出 → 照合 → 集計 を一度だけ実行してレポートを返す。
//! 設定の検証以外で失敗することはない。

use crate::config::MatchConfig;
use crate::error::Result;
use crate::extractor::extract;
use crate::matcher::match_serials;
use crate::normalizer::normalize;
use crate::types::{Candidate, ExpectedSerial, Report, SourceRow};

/// 期待シリアル列と文書テキストを照合する
///
/// 行番号は並び順（1始まり）になる。
pub fn reconcile<S: AsRef<str>>(
    expected_raw: &[S],
    document_text: &str,
    config: &MatchConfig,
) -> Result<Report> {
    let rows: Vec<SourceRow> = expected_raw
        .iter()
        .enumerate()
        .map(|(i, raw)| SourceRow::new(i + 1, raw.as_ref()))
        .collect();
    reconcile_rows(&rows, document_text, config)
}

/// 行番号付きの期待シリアルと文書テキストを照合する
pub fn reconcile_rows(rows: &[SourceRow], document_text: &str, config: &MatchConfig) -> Result<Report> {
    let pattern = config.validate()?;

    let expected: Vec<ExpectedSerial> = rows
        .iter()
        .map(|row| ExpectedSerial {
            raw: row.raw.clone(),
            key: normalize(&row.raw, config),
            row: row.row,
        })
        .collect();

    let candidates: Vec<Candidate> = extract(document_text, &pattern, config).collect();
    tracing::debug!(
        expected = expected.len(),
        candidates = candidates.len(),
        pattern = pattern.as_str(),
        "reconciling"
    );

    let report = Report::new(match_serials(&expected, &candidates, config));

    let summary = report.summary();
    tracing::info!(
        exact = summary.exact_count,
        approximate = summary.approximate_count,
        missing = summary.missing_count,
        total = summary.total,
        "reconciliation finished"
    );

    Ok(report)
}
