use super::ExportContext;
use crate::error::Result;
use serde::Serialize;
use serial_audit_common::{MatchConfig, Report};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    document: String,
    document_sha256: String,
    config: &'a MatchConfig,
    report: &'a Report,
}

/// レポートをJSONで書き出す（生成日時は含めない）
pub fn generate_json(report: &Report, context: &ExportContext<'_>, output_path: &Path) -> Result<()> {
    let payload = JsonReport {
        document: context.document.file_name(),
        document_sha256: context.document.sha256(),
        config: context.config,
        report,
    };

    let writer = BufWriter::new(File::create(output_path)?);
    serde_json::to_writer_pretty(writer, &payload)?;
    Ok(())
}
