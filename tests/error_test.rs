//! エラーケーステスト
//!
//! 入力ファイル・設定の不備でのエラーハンドリングを検証

use serial_audit::batch;
use serial_audit::cli::MatchArgs;
use serial_audit::document;
use serial_audit::error::SerialAuditError;
use serial_audit::source;
use serial_audit_common::MatchConfig;
use std::path::Path;
use tempfile::tempdir;

/// 存在しない台帳を読み込んだ場合
#[test]
fn test_read_nonexistent_table() {
    let result = source::read_table(Path::new("/nonexistent/path/serials.xlsx"));
    assert!(matches!(result, Err(SerialAuditError::FileNotFound(_))));
}

/// 未対応形式の台帳
#[test]
fn test_read_unsupported_table() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("serials.docx");
    std::fs::write(&path, "dummy").unwrap();

    let result = source::read_table(&path);
    assert!(matches!(result, Err(SerialAuditError::UnsupportedFormat(_))));
}

/// 指定列がない台帳
#[test]
fn test_load_serials_column_not_found() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("serials.csv");
    std::fs::write(&path, "Item,Serial\n1,AB-001\n").unwrap();

    let err = source::load_serials(&path, &["Lote".to_string()]).unwrap_err();
    match err {
        SerialAuditError::ColumnNotFound { requested, available } => {
            assert_eq!(requested, vec!["Lote"]);
            assert_eq!(available, vec!["Item", "Serial"]);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

/// 画像は事前にOCRが必要
#[test]
fn test_read_image_document_rejected() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("acta.png");
    std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

    let result = document::read_document(&path);
    assert!(matches!(result, Err(SerialAuditError::UnsupportedFormat(_))));
}

/// PDFとして読めないファイル
#[test]
fn test_read_corrupt_pdf() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("acta.pdf");
    std::fs::write(&path, "not a pdf at all").unwrap();

    let result = document::read_document(&path);
    assert!(matches!(result, Err(SerialAuditError::Pdf(_))));
}

/// 空のフォルダをスキャンした場合
#[test]
fn test_scan_empty_folder() {
    let dir = tempdir().expect("Failed to create temp dir");
    let result = batch::scan_documents(dir.path(), true);

    // 空フォルダはエラーではなく空のVecを返す
    assert!(result.unwrap().is_empty());
}

/// 不正な正規表現はCLI上書きの時点で設定エラーになる
#[test]
fn test_invalid_pattern_override() {
    let args = MatchArgs {
        pattern: Some("[unclosed".to_string()),
        ..Default::default()
    };
    let err = args.resolve(&MatchConfig::default()).unwrap_err();

    match err {
        SerialAuditError::Common(inner) => assert!(inner.is_configuration()),
        other => panic!("unexpected error: {:?}", other),
    }
}

/// SerialAuditErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        SerialAuditError::Config("テスト設定エラー".to_string()),
        SerialAuditError::FileNotFound("serials.xlsx".to_string()),
        SerialAuditError::FolderNotFound("/actas".to_string()),
        SerialAuditError::NoSerials("serials.csv".to_string()),
        SerialAuditError::ExcelGeneration("書き込み失敗".to_string()),
    ];

    for err in errors {
        let msg = err.to_string();
        assert!(!msg.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}
