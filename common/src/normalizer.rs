//! シリアルの正規化
//!
//! 比較用のキーを作る。失敗しない純粋関数で、空や記号だけの入力は空キーになる。

use crate::config::{MatchConfig, NormalizationRules};

/// 生の文字列を比較キーに変換する
pub fn normalize(raw: &str, config: &MatchConfig) -> String {
    normalize_with(raw, &config.normalization_rules, config.case_sensitive)
}

/// ルールを直接指定して正規化する
pub fn normalize_with(raw: &str, rules: &NormalizationRules, case_sensitive: bool) -> String {
    let mut key = String::with_capacity(raw.len());

    for c in raw.chars() {
        if case_sensitive {
            if rules.keeps(c) {
                key.push(c);
            }
        } else {
            // 大文字化で複数文字になる場合がある（ß → SS）
            for upper in c.to_uppercase() {
                if rules.keeps(upper) {
                    key.push(upper);
                }
            }
        }
    }

    if rules.strip_leading_zeros {
        strip_leading_zeros(&key)
    } else {
        key
    }
}

/// 各数字列の先頭ゼロを除去する（数字は最低1桁残す）
///
/// `SN00045` → `SN45`, `A000` → `A0`
fn strip_leading_zeros(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut chars = key.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '0' || out.ends_with(|p: char| p.is_ascii_digit()) {
            out.push(c);
            continue;
        }

        // 数字列の先頭にある '0'
        match chars.peek() {
            Some(next) if next.is_ascii_digit() => {}
            _ => out.push(c),
        }
    }

    out
}
