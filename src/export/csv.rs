use super::ReportRow;
use crate::error::Result;
use std::path::Path;

/// レポート行をCSVで書き出す
pub fn generate_csv(rows: &[ReportRow], output_path: &Path) -> Result<()> {
    let mut writer = ::csv::Writer::from_path(output_path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
