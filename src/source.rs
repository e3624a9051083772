//! シリアル台帳の読み込み
//!
//! XLSX/XLS/ODS は先頭シートを calamine で、CSV は csv クレートで読む。
//! 1行目をヘッダーとして扱い、列名は大文字・小文字と前後の空白を無視して照合する。

use crate::error::{Result, SerialAuditError};
use calamine::{open_workbook_auto, Data, Reader};
use serial_audit_common::SourceRow;
use std::path::Path;

const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// 読み込んだ表
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// 台帳の1セル分のシリアル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialCell {
    /// 表計算ソフト上の行番号（ヘッダーが1行目）
    pub row: usize,
    pub column: String,
    pub value: String,
}

impl SerialCell {
    pub fn to_source_row(&self) -> SourceRow {
        SourceRow::new(self.row, self.value.clone())
    }
}

/// ファイルを拡張子に応じて読み込む
pub fn read_table(path: &Path) -> Result<Table> {
    if !path.exists() {
        return Err(SerialAuditError::FileNotFound(path.display().to_string()));
    }

    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let table = if ext == "csv" {
        read_csv(path)?
    } else if SPREADSHEET_EXTENSIONS.contains(&ext.as_str()) {
        read_spreadsheet(path)?
    } else {
        return Err(SerialAuditError::UnsupportedFormat(format!(
            "{}（XLSX/XLS/ODS/CSVに対応）",
            path.display()
        )));
    };

    tracing::debug!(
        path = %path.display(),
        columns = table.headers.len(),
        rows = table.rows.len(),
        "table loaded"
    );
    Ok(table)
}

fn read_spreadsheet(path: &Path) -> Result<Table> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| SerialAuditError::Spreadsheet(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| SerialAuditError::Spreadsheet("シートがありません".into()))?
        .map_err(|e| SerialAuditError::Spreadsheet(e.to_string()))?;

    let mut rows = range.rows().map(|row| row.iter().map(cell_to_string).collect::<Vec<_>>());
    let headers = rows.next().unwrap_or_default();
    Ok(Table {
        headers,
        rows: rows.collect(),
    })
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        // 整数値の数値セルは小数点なしで表示
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}

fn read_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)?;

    let headers = reader.headers()?.iter().map(|h| h.to_string()).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(|v| v.to_string()).collect());
    }

    Ok(Table { headers, rows })
}

impl Table {
    /// 列名を大文字・小文字を区別せずに解決し、列番号を返す
    pub fn resolve_columns(&self, requested: &[String]) -> Result<Vec<usize>> {
        let mut indices = Vec::with_capacity(requested.len());
        let mut missing = Vec::new();

        for name in requested {
            let wanted = name.trim().to_lowercase();
            match self.headers.iter().position(|h| h.trim().to_lowercase() == wanted) {
                Some(i) => indices.push(i),
                None => missing.push(name.clone()),
            }
        }

        if !missing.is_empty() {
            return Err(SerialAuditError::ColumnNotFound {
                requested: missing,
                available: self.headers.clone(),
            });
        }
        Ok(indices)
    }

    /// 指定列のシリアルを列順に集める
    ///
    /// 空セルは除外する。重複はそのまま残す。
    pub fn collect_serials(&self, columns: &[usize]) -> Vec<SerialCell> {
        let mut cells = Vec::new();

        for &col in columns {
            let column = self.headers.get(col).cloned().unwrap_or_default();
            for (i, row) in self.rows.iter().enumerate() {
                let value = row.get(col).map(|v| v.trim()).unwrap_or("");
                if value.is_empty() {
                    continue;
                }
                cells.push(SerialCell {
                    row: i + 2,
                    column: column.trim().to_string(),
                    value: value.to_string(),
                });
            }
        }

        cells
    }
}

/// 台帳を読み込み、指定列のシリアルを返す
pub fn load_serials(path: &Path, columns: &[String]) -> Result<Vec<SerialCell>> {
    let table = read_table(path)?;
    let indices = table.resolve_columns(columns)?;
    Ok(table.collect_serials(&indices))
}
