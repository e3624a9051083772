//! 文書テキストからの候補抽出
//!
//! 正規表現の左端優先・非重複マッチで候補を切り出し、
//! 正規化キーと文字オフセットを付ける。

use crate::config::{MatchConfig, DEFAULT_PATTERN};
use crate::error::Result;
use crate::normalizer::normalize;
use crate::types::Candidate;
use regex::Regex;

lazy_static::lazy_static! {
    static ref DEFAULT_REGEX: Regex = Regex::new(DEFAULT_PATTERN).unwrap();
}

/// コンパイル済みの抽出パターン
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
}

impl Pattern {
    /// パターンをコンパイルする
    ///
    /// 既定パターンはコンパイル済みのものを共有する。
    pub fn compile(pattern: &str) -> Result<Self> {
        if pattern == DEFAULT_PATTERN {
            return Ok(Self::default_pattern());
        }
        let regex = Regex::new(pattern)?;
        Ok(Self { regex })
    }

    /// 既定パターン
    pub fn default_pattern() -> Self {
        Self {
            regex: DEFAULT_REGEX.clone(),
        }
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

/// 文書テキストから候補を抽出する
///
/// 遅延評価のイテレータを返す。同じ入力で呼び直せば同じ列が得られる。
pub fn extract<'a>(text: &'a str, pattern: &'a Pattern, config: &'a MatchConfig) -> Candidates<'a> {
    Candidates {
        text,
        matches: pattern.regex.find_iter(text),
        config,
        byte_pos: 0,
        char_pos: 0,
    }
}

/// 候補のイテレータ
pub struct Candidates<'a> {
    text: &'a str,
    matches: regex::Matches<'a, 'a>,
    config: &'a MatchConfig,
    // バイト位置→文字位置の変換を前回位置から差分で進める
    byte_pos: usize,
    char_pos: usize,
}

impl Iterator for Candidates<'_> {
    type Item = Candidate;

    fn next(&mut self) -> Option<Candidate> {
        loop {
            let m = self.matches.next()?;
            if m.is_empty() {
                continue;
            }

            self.char_pos += self.text[self.byte_pos..m.start()].chars().count();
            self.byte_pos = m.start();

            return Some(Candidate {
                text: m.as_str().to_string(),
                key: normalize(m.as_str(), self.config),
                offset: self.char_pos,
            });
        }
    }
}
