//! 期待シリアルと候補の照合
//!
//! ## 処理フロー
//! 1. 候補を正規化キーでまとめる（出現順を保持）
//! 2. 完全一致: キーが存在すれば最初の出現に一致
//! 3. 近似一致: 編集距離が上限以内の最良キーを選ぶ
//!
//! 候補は消費しない。同じ出現が複数の期待シリアルに一致してよい。

use crate::config::MatchConfig;
use crate::types::{Candidate, ExpectedSerial, Suggestion, Verdict};
use std::collections::HashMap;

/// 同じキーを持つ候補の集まり
#[derive(Debug)]
struct KeyGroup<'a> {
    key: &'a str,
    chars: Vec<char>,
    occurrences: Vec<&'a Candidate>,
}

impl<'a> KeyGroup<'a> {
    fn first(&self) -> &'a Candidate {
        self.occurrences[0]
    }
}

/// 正規化キー → 出現一覧のインデックス
#[derive(Debug, Default)]
pub struct CandidateIndex<'a> {
    groups: Vec<KeyGroup<'a>>,
    positions: HashMap<&'a str, usize>,
}

impl<'a> CandidateIndex<'a> {
    /// 候補列からインデックスを作る
    ///
    /// 空キーの候補は登録しない（空一致を防ぐ）。
    pub fn build(candidates: &'a [Candidate]) -> Self {
        let mut index = Self::default();

        for candidate in candidates {
            if candidate.key.is_empty() {
                continue;
            }
            match index.positions.get(candidate.key.as_str()) {
                Some(&pos) => index.groups[pos].occurrences.push(candidate),
                None => {
                    index.positions.insert(candidate.key.as_str(), index.groups.len());
                    index.groups.push(KeyGroup {
                        key: candidate.key.as_str(),
                        chars: candidate.key.chars().collect(),
                        occurrences: vec![candidate],
                    });
                }
            }
        }

        index
    }

    /// 異なるキーの数
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// キーの最初の出現（オフセット最小）
    pub fn first_occurrence(&self, key: &str) -> Option<&'a Candidate> {
        self.positions.get(key).map(|&pos| self.groups[pos].first())
    }

    /// キーの出現回数
    pub fn occurrences(&self, key: &str) -> usize {
        self.positions
            .get(key)
            .map(|&pos| self.groups[pos].occurrences.len())
            .unwrap_or(0)
    }

    /// 距離 `1..=max_distance` のキーを優先順に並べて返す
    ///
    /// 優先順: 距離 → 長さの差 → 最初の出現位置 → キーの辞書順
    fn ranked_near(&self, key: &[char], max_distance: usize) -> Vec<(usize, &KeyGroup<'a>)> {
        let mut near: Vec<(usize, &KeyGroup<'a>)> = self
            .groups
            .iter()
            .filter_map(|group| {
                bounded_levenshtein(key, &group.chars, max_distance)
                    .filter(|&d| d > 0)
                    .map(|d| (d, group))
            })
            .collect();

        near.sort_by(|(da, a), (db, b)| {
            da.cmp(db)
                .then_with(|| key.len().abs_diff(a.chars.len()).cmp(&key.len().abs_diff(b.chars.len())))
                .then_with(|| a.first().offset.cmp(&b.first().offset))
                .then_with(|| a.key.cmp(b.key))
        });
        near
    }

    /// 最良の近似キーを探す
    fn best_approximate(&self, key: &[char], max_distance: usize) -> Option<(usize, &'a Candidate)> {
        let mut best: Option<(usize, &KeyGroup<'a>)> = None;

        for group in &self.groups {
            let Some(distance) = bounded_levenshtein(key, &group.chars, max_distance) else {
                continue;
            };
            let better = match best {
                None => true,
                Some((best_distance, current)) => {
                    (distance, key.len().abs_diff(group.chars.len()), group.first().offset, group.key)
                        < (
                            best_distance,
                            key.len().abs_diff(current.chars.len()),
                            current.first().offset,
                            current.key,
                        )
                }
            };
            if better {
                best = Some((distance, group));
            }
        }

        best.map(|(distance, group)| (distance, group.first()))
    }
}

/// 期待シリアルを候補と照合する
///
/// 結果は `expected` と同じ順序・同じ件数になる。
pub fn match_serials(
    expected: &[ExpectedSerial],
    candidates: &[Candidate],
    config: &MatchConfig,
) -> Vec<Verdict> {
    let index = CandidateIndex::build(candidates);
    tracing::debug!(
        candidates = candidates.len(),
        distinct_keys = index.len(),
        "candidate index built"
    );

    // 重複した期待キーの近似探索を繰り返さない
    let mut approximate_cache: HashMap<&str, Option<(usize, &Candidate)>> = HashMap::new();

    expected
        .iter()
        .map(|serial| {
            if serial.key.is_empty() {
                return Verdict::missing(serial.clone());
            }

            if let Some(candidate) = index.first_occurrence(&serial.key) {
                return Verdict::exact(serial.clone(), candidate.clone());
            }

            if config.fuzzy_enabled {
                let found = *approximate_cache
                    .entry(serial.key.as_str())
                    .or_insert_with(|| {
                        let chars: Vec<char> = serial.key.chars().collect();
                        index.best_approximate(&chars, config.max_distance)
                    });
                if let Some((distance, candidate)) = found {
                    return Verdict::approximate(serial.clone(), candidate.clone(), distance);
                }
            }

            let mut verdict = Verdict::missing(serial.clone());
            if config.suggest_limit > 0 {
                verdict.suggestions = suggest(&index, &serial.key, config);
            }
            verdict
        })
        .collect()
}

/// 未検出シリアルに近いキーを列挙する
fn suggest(index: &CandidateIndex<'_>, key: &str, config: &MatchConfig) -> Vec<Suggestion> {
    let chars: Vec<char> = key.chars().collect();
    index
        .ranked_near(&chars, config.suggest_distance)
        .into_iter()
        .take(config.suggest_limit)
        .map(|(distance, group)| Suggestion {
            key: group.key.to_string(),
            distance,
            offset: group.first().offset,
        })
        .collect()
}

/// 2つの文字列の編集距離（上限付き）
///
/// 距離が `max` を超える場合は `None`。
pub fn edit_distance(a: &str, b: &str, max: usize) -> Option<usize> {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    bounded_levenshtein(&a, &b, max)
}

/// 上限付きレーベンシュタイン距離
///
/// 長さの差が上限を超えるペアは計算しない。
/// 行の最小値が上限を超えた時点で打ち切る（以降の行で値は小さくならない）。
fn bounded_levenshtein(a: &[char], b: &[char], max: usize) -> Option<usize> {
    if a.len().abs_diff(b.len()) > max {
        return None;
    }
    if a.is_empty() || b.is_empty() {
        return Some(a.len().max(b.len()));
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        let mut row_min = curr[0];

        for (j, cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
            row_min = row_min.min(curr[j + 1]);
        }

        if row_min > max {
            return None;
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    let distance = prev[b.len()];
    (distance <= max).then_some(distance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VerdictKind;

    fn serial(key: &str, row: usize) -> ExpectedSerial {
        ExpectedSerial {
            raw: key.to_string(),
            key: key.to_string(),
            row,
        }
    }

    fn candidate(key: &str, offset: usize) -> Candidate {
        Candidate {
            text: key.to_string(),
            key: key.to_string(),
            offset,
        }
    }

    fn fuzzy(max_distance: usize) -> MatchConfig {
        MatchConfig {
            fuzzy_enabled: true,
            max_distance,
            ..Default::default()
        }
    }

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("", "abc", 5), Some(3));
        assert_eq!(edit_distance("abc", "abc", 0), Some(0));
        assert_eq!(edit_distance("abc", "abd", 1), Some(1));
        assert_eq!(edit_distance("kitten", "sitting", 3), Some(3));
        assert_eq!(edit_distance("kitten", "sitting", 2), None);
    }

    #[test]
    fn test_edit_distance_length_pruning() {
        assert_eq!(edit_distance("AB", "ABCDE", 2), None);
        assert_eq!(edit_distance("AB", "ABCD", 2), Some(2));
    }

    #[test]
    fn test_edit_distance_early_exit_matches_full() {
        // 打ち切りあり/なしで結果が一致すること
        let pairs = [("ABCDEF", "UVWXYZ"), ("AB1234", "AB1235"), ("SERIAL", "SERIES")];
        for (a, b) in pairs {
            let full = edit_distance(a, b, usize::MAX / 2).unwrap();
            for max in 0..=6 {
                let bounded = edit_distance(a, b, max);
                if full <= max {
                    assert_eq!(bounded, Some(full), "{} {} max={}", a, b, max);
                } else {
                    assert_eq!(bounded, None, "{} {} max={}", a, b, max);
                }
            }
        }
    }

    #[test]
    fn test_index_groups_by_key() {
        let candidates = vec![candidate("A1", 0), candidate("B2", 3), candidate("A1", 6), candidate("", 9)];
        let index = CandidateIndex::build(&candidates);
        assert_eq!(index.len(), 2);
        assert_eq!(index.occurrences("A1"), 2);
        assert_eq!(index.first_occurrence("A1").unwrap().offset, 0);
        assert!(index.first_occurrence("").is_none());
    }

    #[test]
    fn test_exact_uses_first_occurrence() {
        let candidates = vec![candidate("ABC123", 10), candidate("ABC123", 40)];
        let verdicts = match_serials(&[serial("ABC123", 1)], &candidates, &MatchConfig::default());
        assert_eq!(verdicts[0].kind, VerdictKind::Exact);
        assert_eq!(verdicts[0].matched.as_ref().unwrap().offset, 10);
        assert_eq!(verdicts[0].distance, Some(0));
    }

    #[test]
    fn test_exact_not_consumed() {
        let candidates = vec![candidate("ABC123", 0)];
        let expected = vec![serial("ABC123", 1), serial("ABC123", 2)];
        let verdicts = match_serials(&expected, &candidates, &MatchConfig::default());
        assert!(verdicts.iter().all(|v| v.kind == VerdictKind::Exact));
    }

    #[test]
    fn test_fuzzy_disabled_is_missing() {
        let candidates = vec![candidate("AB1235", 0)];
        let verdicts = match_serials(&[serial("AB1234", 1)], &candidates, &MatchConfig::default());
        assert_eq!(verdicts[0].kind, VerdictKind::Missing);
        assert!(verdicts[0].distance.is_none());
    }

    #[test]
    fn test_approximate_within_bound() {
        let candidates = vec![candidate("AB1235", 0)];
        let verdicts = match_serials(&[serial("AB1234", 1)], &candidates, &fuzzy(1));
        assert_eq!(verdicts[0].kind, VerdictKind::Approximate);
        assert_eq!(verdicts[0].distance, Some(1));
        assert_eq!(verdicts[0].matched.as_ref().unwrap().text, "AB1235");
    }

    #[test]
    fn test_max_distance_zero_is_exact_only() {
        let candidates = vec![candidate("AB1235", 0)];
        let verdicts = match_serials(&[serial("AB1234", 1)], &candidates, &fuzzy(0));
        assert_eq!(verdicts[0].kind, VerdictKind::Missing);
    }

    #[test]
    fn test_tie_break_prefers_smaller_length_difference() {
        // どちらも距離1。"AB12" は長さが1違う
        let candidates = vec![candidate("AB12", 0), candidate("AB124", 10)];
        let verdicts = match_serials(&[serial("AB125", 1)], &candidates, &fuzzy(1));
        assert_eq!(verdicts[0].matched.as_ref().unwrap().key, "AB124");
    }

    #[test]
    fn test_tie_break_prefers_lowest_offset() {
        let candidates = vec![candidate("AB126", 5), candidate("XB125", 12), candidate("XB125", 30)];
        let verdicts = match_serials(&[serial("AB125", 1)], &candidates, &fuzzy(1));
        let matched = verdicts[0].matched.as_ref().unwrap();
        assert_eq!(matched.key, "AB126");
        assert_eq!(matched.offset, 5);

        // 辞書順より出現位置が優先
        let candidates = vec![candidate("XB125", 2), candidate("AB126", 9)];
        let verdicts = match_serials(&[serial("AB125", 1)], &candidates, &fuzzy(1));
        assert_eq!(verdicts[0].matched.as_ref().unwrap().key, "XB125");
    }

    #[test]
    fn test_smallest_distance_wins() {
        let candidates = vec![candidate("AB1299", 0), candidate("AB1239", 10)];
        let verdicts = match_serials(&[serial("AB1234", 1)], &candidates, &fuzzy(2));
        assert_eq!(verdicts[0].matched.as_ref().unwrap().key, "AB1239");
        assert_eq!(verdicts[0].distance, Some(1));
    }

    #[test]
    fn test_empty_key_never_matches() {
        let candidates = vec![candidate("", 0), candidate("A", 1)];
        let verdicts = match_serials(&[serial("", 1)], &candidates, &fuzzy(3));
        assert_eq!(verdicts[0].kind, VerdictKind::Missing);
    }

    #[test]
    fn test_empty_candidates_all_missing() {
        let expected = vec![serial("A1", 1), serial("B2", 2)];
        let verdicts = match_serials(&expected, &[], &fuzzy(2));
        assert!(verdicts.iter().all(|v| v.kind == VerdictKind::Missing));
    }

    #[test]
    fn test_suggestions_for_missing() {
        let candidates = vec![candidate("AB1299", 0), candidate("AB1235", 10), candidate("AB1236", 20)];
        let config = MatchConfig {
            suggest_limit: 2,
            suggest_distance: 2,
            ..Default::default()
        };
        let verdicts = match_serials(&[serial("AB1234", 1)], &candidates, &config);
        assert_eq!(verdicts[0].kind, VerdictKind::Missing);

        let keys: Vec<&str> = verdicts[0].suggestions.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["AB1235", "AB1236"]);
        assert_eq!(verdicts[0].suggestions[0].distance, 1);
    }

    #[test]
    fn test_no_suggestions_when_found() {
        let candidates = vec![candidate("AB1234", 0), candidate("AB1235", 10)];
        let config = MatchConfig {
            suggest_limit: 3,
            ..Default::default()
        };
        let verdicts = match_serials(&[serial("AB1234", 1)], &candidates, &config);
        assert!(verdicts[0].suggestions.is_empty());
    }
}
