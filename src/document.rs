//! 文書テキストの読み込み
//!
//! TXT はそのまま、PDF はページごとのテキストを抽出して連結する。
//! スキャンPDF（画像のみ）はテキストが空になるため、事前にOCRが必要。

use crate::error::{Result, SerialAuditError};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

const TEXT_EXTENSIONS: &[&str] = &["txt", "text"];
const PDF_EXTENSIONS: &[&str] = &["pdf"];

/// 読み込んだ文書
#[derive(Debug, Clone)]
pub struct Document {
    pub path: PathBuf,
    pub text: String,
}

impl Document {
    /// ファイル名（拡張子なし）
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "document".to_string())
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// テキストが空白のみか
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// テキストのSHA-256（16進）
    pub fn sha256(&self) -> String {
        hex::encode(Sha256::digest(self.text.as_bytes()))
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// テキストファイルか
pub fn is_text_document(path: &Path) -> bool {
    TEXT_EXTENSIONS.contains(&extension_of(path).as_str())
}

pub fn is_pdf_document(path: &Path) -> bool {
    PDF_EXTENSIONS.contains(&extension_of(path).as_str())
}

/// 照合できる文書か（TXT/PDF）
pub fn is_supported_document(path: &Path) -> bool {
    is_text_document(path) || is_pdf_document(path)
}

/// 文書を読み込む
///
/// TXT: 不正なUTF-8は置換文字に変換し、先頭のBOMは除去する。
/// PDF: テキスト層を抽出する。テキスト層がなければ空文字列になる。
pub fn read_document(path: &Path) -> Result<Document> {
    if !path.exists() {
        return Err(SerialAuditError::FileNotFound(path.display().to_string()));
    }

    let text = if is_text_document(path) {
        read_text(path)?
    } else if is_pdf_document(path) {
        read_pdf(path)?
    } else {
        return Err(SerialAuditError::UnsupportedFormat(format!(
            "{}（TXT/PDFに対応。画像は事前にOCRでテキスト化してください）",
            path.display()
        )));
    };

    Ok(Document {
        path: path.to_path_buf(),
        text,
    })
}

fn read_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(text.strip_prefix('\u{feff}').unwrap_or(&text[..]).to_string())
}

/// PDFのテキスト層をページ順に連結する
///
/// 読めないページは空として扱い、残りのページを続けて読む。
fn read_pdf(path: &Path) -> Result<String> {
    let pdf = lopdf::Document::load(path)
        .map_err(|e| SerialAuditError::Pdf(format!("{}: {}", path.display(), e)))?;

    let mut pages = Vec::new();
    for page_number in pdf.get_pages().into_keys() {
        match pdf.extract_text(&[page_number]) {
            Ok(text) => pages.push(text),
            Err(e) => {
                tracing::warn!(path = %path.display(), page = page_number, error = %e, "page text not extracted");
                pages.push(String::new());
            }
        }
    }

    let text = pages.join("\n").trim().to_string();
    tracing::debug!(path = %path.display(), pages = pages.len(), chars = text.chars().count(), "pdf text extracted");
    Ok(text)
}
