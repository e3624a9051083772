//! Serial Audit Common Library
//!
//! 期待シリアル一覧と文書テキストを照合するエンジン。
//! ファイルやネットワークには触れない。

pub mod config;
pub mod error;
pub mod extractor;
pub mod matcher;
pub mod normalizer;
pub mod reconciler;
pub mod types;

pub use config::{MatchConfig, NormalizationRules, DEFAULT_PATTERN};
pub use error::{Error, Result};
pub use extractor::{extract, Candidates, Pattern};
pub use matcher::{edit_distance, match_serials, CandidateIndex};
pub use normalizer::normalize;
pub use reconciler::{reconcile, reconcile_rows};
pub use types::{Candidate, ExpectedSerial, Report, SourceRow, Suggestion, Summary, Verdict, VerdictKind};
