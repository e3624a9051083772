//! 照合データの型定義
//!
//! - ExpectedSerial: 台帳（Excel/CSV）側の期待シリアル
//! - Candidate: 文書テキストから抽出した候補
//! - Verdict: シリアルごとの判定
//! - Report: 判定一覧と集計

use serde::{Deserialize, Serialize};

/// 呼び出し側から渡される生のシリアル（行番号付き）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRow {
    /// 元データ上の行番号
    pub row: usize,
    /// 生の値
    pub raw: String,
}

impl SourceRow {
    pub fn new(row: usize, raw: impl Into<String>) -> Self {
        Self { row, raw: raw.into() }
    }
}

/// 期待シリアル
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedSerial {
    pub raw: String,
    /// 正規化キー
    pub key: String,
    pub row: usize,
}

/// 文書から抽出した候補
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// 文書中の文字列そのまま
    pub text: String,
    /// 正規化キー
    pub key: String,
    /// 文書先頭からの文字オフセット（バイトではない）
    pub offset: usize,
}

/// 判定の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerdictKind {
    Exact,
    Approximate,
    Missing,
}

impl VerdictKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerdictKind::Exact => "EXACT",
            VerdictKind::Approximate => "APPROXIMATE",
            VerdictKind::Missing => "MISSING",
        }
    }

    /// 表示用ラベル
    pub fn label(&self) -> &'static str {
        match self {
            VerdictKind::Exact => "一致",
            VerdictKind::Approximate => "近似一致",
            VerdictKind::Missing => "未検出",
        }
    }
}

impl std::fmt::Display for VerdictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 未検出シリアルに対する「近い候補」
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub key: String,
    pub distance: usize,
    /// 最初の出現位置
    pub offset: usize,
}

/// シリアルごとの判定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub serial: ExpectedSerial,
    pub kind: VerdictKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched: Option<Candidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<Suggestion>,
}

impl Verdict {
    pub fn exact(serial: ExpectedSerial, candidate: Candidate) -> Self {
        Self {
            serial,
            kind: VerdictKind::Exact,
            matched: Some(candidate),
            distance: Some(0),
            suggestions: Vec::new(),
        }
    }

    pub fn approximate(serial: ExpectedSerial, candidate: Candidate, distance: usize) -> Self {
        Self {
            serial,
            kind: VerdictKind::Approximate,
            matched: Some(candidate),
            distance: Some(distance),
            suggestions: Vec::new(),
        }
    }

    pub fn missing(serial: ExpectedSerial) -> Self {
        Self {
            serial,
            kind: VerdictKind::Missing,
            matched: None,
            distance: None,
            suggestions: Vec::new(),
        }
    }

    pub fn is_found(&self) -> bool {
        self.kind != VerdictKind::Missing
    }
}

/// 集計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub exact_count: usize,
    pub approximate_count: usize,
    pub missing_count: usize,
    pub total: usize,
}

impl Summary {
    pub fn from_verdicts(verdicts: &[Verdict]) -> Self {
        let mut summary = Summary {
            total: verdicts.len(),
            ..Default::default()
        };
        for verdict in verdicts {
            match verdict.kind {
                VerdictKind::Exact => summary.exact_count += 1,
                VerdictKind::Approximate => summary.approximate_count += 1,
                VerdictKind::Missing => summary.missing_count += 1,
            }
        }
        summary
    }

    /// 検出数（一致 + 近似一致）
    pub fn found_count(&self) -> usize {
        self.exact_count + self.approximate_count
    }
}

/// 照合レポート
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    verdicts: Vec<Verdict>,
    summary: Summary,
}

impl Report {
    pub fn new(verdicts: Vec<Verdict>) -> Self {
        let summary = Summary::from_verdicts(&verdicts);
        Self { verdicts, summary }
    }

    pub fn verdicts(&self) -> &[Verdict] {
        &self.verdicts
    }

    pub fn summary(&self) -> Summary {
        self.summary
    }

    /// 未検出の判定のみ
    pub fn missing(&self) -> impl Iterator<Item = &Verdict> {
        self.verdicts.iter().filter(|v| v.kind == VerdictKind::Missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serial(raw: &str, row: usize) -> ExpectedSerial {
        ExpectedSerial {
            raw: raw.to_string(),
            key: raw.to_uppercase(),
            row,
        }
    }

    fn candidate(text: &str, offset: usize) -> Candidate {
        Candidate {
            text: text.to_string(),
            key: text.to_uppercase(),
            offset,
        }
    }

    #[test]
    fn test_summary_counts() {
        let verdicts = vec![
            Verdict::exact(serial("a1", 1), candidate("A1", 0)),
            Verdict::approximate(serial("a2", 2), candidate("A3", 5), 1),
            Verdict::missing(serial("b1", 3)),
            Verdict::missing(serial("b2", 4)),
        ];
        let report = Report::new(verdicts);
        let summary = report.summary();

        assert_eq!(summary.exact_count, 1);
        assert_eq!(summary.approximate_count, 1);
        assert_eq!(summary.missing_count, 2);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.found_count(), 2);
        assert_eq!(report.missing().count(), 2);
    }

    #[test]
    fn test_verdict_constructors() {
        let exact = Verdict::exact(serial("x", 1), candidate("X", 0));
        assert_eq!(exact.distance, Some(0));
        assert!(exact.is_found());

        let missing = Verdict::missing(serial("y", 2));
        assert!(missing.matched.is_none());
        assert!(missing.distance.is_none());
        assert!(!missing.is_found());
    }

    #[test]
    fn test_verdict_kind_serialization() {
        let json = serde_json::to_string(&VerdictKind::Approximate).unwrap();
        assert_eq!(json, "\"APPROXIMATE\"");
        assert_eq!(VerdictKind::Missing.to_string(), "MISSING");
    }

    #[test]
    fn test_missing_verdict_skips_empty_fields() {
        let json = serde_json::to_string(&Verdict::missing(serial("q1", 1))).unwrap();
        assert!(!json.contains("matched"));
        assert!(!json.contains("distance"));
        assert!(!json.contains("suggestions"));
    }
}
