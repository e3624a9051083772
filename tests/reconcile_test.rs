//! 台帳読み込みから照合・一括処理までの統合テスト

use serial_audit::batch::{run_batch, scan_documents};
use serial_audit::cli::ExportFormat;
use serial_audit::config::DEFAULT_COLUMNS;
use serial_audit::document::read_document;
use serial_audit::source::{load_serials, SerialCell};
use serial_audit_common::{reconcile_rows, MatchConfig, SourceRow, VerdictKind};
use tempfile::tempdir;

const LEDGER: &str = "\
ITEM,SERIAL FISICO INTERNO,SERIAL FISICO EXTERNO
1,sn-00045,EXT-7781
2,,EXT-7782
3,sn-00045,ZZZ-0000
";

fn default_columns() -> Vec<String> {
    DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect()
}

/// CSV台帳は列ごとに上から集め、空セルを除き重複を残す
#[test]
fn test_load_serials_from_csv() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("serials.csv");
    std::fs::write(&path, LEDGER).unwrap();

    let cells = load_serials(&path, &default_columns()).unwrap();
    let values: Vec<&str> = cells.iter().map(|c| c.value.as_str()).collect();
    assert_eq!(values, vec!["sn-00045", "sn-00045", "EXT-7781", "EXT-7782", "ZZZ-0000"]);

    let rows: Vec<usize> = cells.iter().map(|c| c.row).collect();
    assert_eq!(rows, vec![2, 4, 2, 3, 4]);
    assert_eq!(cells[2].column, "SERIAL FISICO EXTERNO");
}

/// BOM付きの文書でも先頭のシリアルを拾える
#[test]
fn test_reconcile_csv_against_text() {
    let dir = tempdir().expect("Failed to create temp dir");
    let ledger = dir.path().join("serials.csv");
    std::fs::write(&ledger, LEDGER).unwrap();
    let doc_path = dir.path().join("acta.txt");
    std::fs::write(&doc_path, "\u{feff}SN000045 recibido. Externos: EXT-7781 / EXT7783").unwrap();

    let cells = load_serials(&ledger, &default_columns()).unwrap();
    let document = read_document(&doc_path).unwrap();
    let rows: Vec<SourceRow> = cells.iter().map(SerialCell::to_source_row).collect();

    let mut config = MatchConfig {
        fuzzy_enabled: true,
        ..Default::default()
    };
    config.normalization_rules.strip_leading_zeros = true;

    let report = reconcile_rows(&rows, &document.text, &config).unwrap();
    let kinds: Vec<VerdictKind> = report.verdicts().iter().map(|v| v.kind).collect();
    assert_eq!(
        kinds,
        vec![
            VerdictKind::Exact,
            VerdictKind::Exact,
            VerdictKind::Exact,
            VerdictKind::Approximate,
            VerdictKind::Missing,
        ]
    );

    let first = report.verdicts()[0].matched.as_ref().unwrap();
    assert_eq!(first.text, "SN000045");
    assert_eq!(first.key, "SN45");
    assert_eq!(first.offset, 0);

    // 行番号は台帳の行がそのまま残る
    assert_eq!(report.verdicts()[1].serial.row, 4);

    let summary = report.summary();
    assert_eq!(summary.total, 5);
    assert_eq!(summary.found_count(), 4);
}

/// 読めない文書があっても他の文書は処理される
#[test]
fn test_batch_continues_after_failure() {
    let dir = tempdir().expect("Failed to create temp dir");
    let docs = dir.path().join("actas");
    std::fs::create_dir_all(&docs).unwrap();
    std::fs::write(docs.join("a.txt"), "EXT-7781 EXT-7782").unwrap();
    std::fs::write(docs.join("b.txt"), "").unwrap();

    let ledger = dir.path().join("serials.csv");
    std::fs::write(&ledger, LEDGER).unwrap();
    let cells = load_serials(&ledger, &default_columns()).unwrap();

    let mut documents = scan_documents(&docs, false).unwrap();
    assert_eq!(documents.len(), 2);
    documents.push(docs.join("missing.txt"));

    let out = dir.path().join("reports");
    let outcomes = run_batch(&cells, &documents, &MatchConfig::default(), ExportFormat::Json, &out).unwrap();
    assert_eq!(outcomes.len(), 3);

    let a = outcomes[0].result.as_ref().expect("a.txt は成功するはず");
    assert_eq!(a.summary.exact_count, 2);
    assert_eq!(a.outputs, vec![out.join("a_照合結果.json")]);
    assert!(a.outputs[0].exists());

    // 空の文書はすべて未検出
    let b = outcomes[1].result.as_ref().expect("b.txt は成功するはず");
    assert_eq!(b.summary.missing_count, 5);

    assert!(outcomes[2].result.is_err());
}
