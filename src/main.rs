use clap::Parser;
use serial_audit::{batch, cli, column_selector, config, document, error, export, source};
use cli::{Cli, Commands};
use config::Config;
use error::{Result, SerialAuditError};
use serial_audit_common::{reconcile_rows, SourceRow, VerdictKind};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// 未検出シリアルの表示件数
const MISSING_PREVIEW: usize = 20;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Check { serials, document, columns, matching, format, output, interactive } => {
            println!("🔎 serial-audit - シリアル照合\n");

            let config = Config::load()?;
            let match_config = matching.resolve(&config.matching)?;
            let columns = if columns.is_empty() { config.columns.clone() } else { columns };

            // 1. 台帳読み込み
            println!("[1/4] 台帳を読み込み中...");
            let table = source::read_table(&serials)?;
            let indices = match table.resolve_columns(&columns) {
                Ok(indices) => indices,
                Err(SerialAuditError::ColumnNotFound { .. }) if interactive => {
                    column_selector::select_columns_interactive(&table, &columns)?
                }
                Err(e) => return Err(e),
            };
            let cells = table.collect_serials(&indices);
            if cells.is_empty() {
                return Err(SerialAuditError::NoSerials(serials.display().to_string()));
            }
            println!("✔ {}件のシリアルを読み込み\n", cells.len());

            // 2. 文書読み込み
            println!("[2/4] 文書を読み込み中...");
            let doc = document::read_document(&document)?;
            println!("✔ {}文字を読み込み", doc.char_count());
            if doc.is_blank() {
                println!("⚠ 文書にテキストがありません。スキャンPDFの場合はOCRでテキスト化してください（すべて未検出になります）");
            }
            println!();

            // 3. 照合
            println!("[3/4] 照合中...{}", if match_config.fuzzy_enabled { " (近似一致有効)" } else { "" });
            let rows: Vec<SourceRow> = cells.iter().map(|c| c.to_source_row()).collect();
            let report = reconcile_rows(&rows, &doc.text, &match_config)?;
            let summary = report.summary();
            println!("✔ 照合完了\n");

            println!("結果:");
            println!("  ✅ 一致: {}", summary.exact_count);
            println!("  〰 近似一致: {}", summary.approximate_count);
            println!("  ❌ 未検出: {}", summary.missing_count);
            println!("  合計: {}", summary.total);

            let missing: Vec<_> = report.missing().collect();
            if !missing.is_empty() {
                println!("\n未検出シリアル（先頭{}件）:", MISSING_PREVIEW.min(missing.len()));
                for verdict in missing.iter().take(MISSING_PREVIEW) {
                    let hints = verdict
                        .suggestions
                        .iter()
                        .map(|s| format!("{} (d={})", s.key, s.distance))
                        .collect::<Vec<_>>();
                    if hints.is_empty() {
                        println!("  - 行{}: {}", verdict.serial.row, verdict.serial.raw);
                    } else {
                        println!("  - 行{}: {} → 候補: {}", verdict.serial.row, verdict.serial.raw, hints.join(", "));
                    }
                }
            }
            for verdict in report.verdicts().iter().filter(|v| v.kind == VerdictKind::Approximate) {
                tracing::debug!(
                    serial = %verdict.serial.raw,
                    matched = verdict.matched.as_ref().map(|c| c.text.as_str()).unwrap_or(""),
                    distance = verdict.distance.unwrap_or(0),
                    "approximate match"
                );
            }

            // 4. 出力
            println!("\n[4/4] レポートを出力中...");
            let format = format.unwrap_or(config.default_format);
            let output_dir = output.unwrap_or_else(|| default_output_dir(&document));
            let context = export::ExportContext {
                document: &doc,
                config: &match_config,
            };
            for path in export::export_report(&report, &cells, &context, format, &output_dir)? {
                println!("✔ 出力: {}", path.display());
            }

            println!("\n✅ 照合完了");
        }

        Commands::Batch { serials, folder, recursive, columns, matching, format, output } => {
            println!("🚀 serial-audit - 一括照合\n");

            let config = Config::load()?;
            let match_config = matching.resolve(&config.matching)?;
            let columns = if columns.is_empty() { config.columns.clone() } else { columns };

            println!("[1/3] 台帳を読み込み中...");
            let cells = source::load_serials(&serials, &columns)?;
            if cells.is_empty() {
                return Err(SerialAuditError::NoSerials(serials.display().to_string()));
            }
            println!("✔ {}件のシリアルを読み込み\n", cells.len());

            println!("[2/3] 文書をスキャン中...");
            let documents = batch::scan_documents(&folder, recursive)?;
            println!("✔ {}件の文書を検出\n", documents.len());
            if documents.is_empty() {
                println!("⚠ 対象の文書（.txt/.pdf）がありません");
                return Ok(());
            }

            println!("[3/3] 照合中...");
            let format = format.unwrap_or(config.default_format);
            let output_dir = output.unwrap_or_else(|| folder.clone());
            let outcomes = batch::run_batch(&cells, &documents, &match_config, format, &output_dir)?;

            let mut failures = Vec::new();
            for outcome in &outcomes {
                match &outcome.result {
                    Ok(success) => {
                        let s = success.summary;
                        println!(
                            "  ✔ {}: 一致 {} / 近似 {} / 未検出 {} (計 {})",
                            outcome.document.display(),
                            s.exact_count,
                            s.approximate_count,
                            s.missing_count,
                            s.total
                        );
                    }
                    Err(e) => failures.push((outcome.document.clone(), e.to_string())),
                }
            }

            if !failures.is_empty() {
                println!("\n⚠ {}件の文書で失敗:", failures.len());
                for (path, message) in &failures {
                    println!("  - {}: {}", path.display(), message);
                }
            }

            println!("\n✅ 一括照合完了（出力先: {}）", output_dir.display());
        }

        Commands::Columns { serials, rows } => {
            let table = source::read_table(&serials)?;

            println!("列 ({}件):", table.headers.len());
            for (i, header) in table.headers.iter().enumerate() {
                println!("  {}) {}", i + 1, header);
            }

            println!("\n先頭{}行:", rows.min(table.rows.len()));
            for row in table.rows.iter().take(rows) {
                println!("  {}", row.join(" | "));
            }
        }

        Commands::Config { set_columns, set_pattern, reset, show } => {
            // --reset は壊れた設定ファイルを読まずに上書きする
            let mut config = if reset {
                let config = Config::reset()?;
                println!("✔ 設定を初期値に戻しました");
                config
            } else {
                Config::load()?
            };

            if let Some(columns) = set_columns {
                config.set_columns(columns)?;
                println!("✔ シリアル列を設定しました");
            }

            if let Some(pattern) = set_pattern {
                config.set_pattern(pattern)?;
                println!("✔ 抽出パターンを設定しました");
            }

            if show {
                println!("設定:");
                println!("  ファイル: {}", Config::config_path()?.display());
                println!("  シリアル列: {}", config.columns.join(", "));
                println!("  抽出パターン: {}", config.matching.pattern);
                println!("  近似一致: {}", if config.matching.fuzzy_enabled { "有効" } else { "無効" });
                println!("  最大編集距離: {}", config.matching.max_distance);
                println!("  出力形式: {}", config.default_format);
            }
        }
    }

    Ok(())
}

fn default_output_dir(document: &Path) -> PathBuf {
    document
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}
