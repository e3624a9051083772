//! 列の対話式選択モジュール

use crate::error::{Result, SerialAuditError};
use crate::source::Table;
use dialoguer::MultiSelect;
use std::io::IsTerminal;

/// 対話式でシリアル列を選ぶ
///
/// 選んだ順ではなく表の列順で返す。
pub fn select_columns_interactive(table: &Table, requested: &[String]) -> Result<Vec<usize>> {
    if !std::io::stdin().is_terminal() {
        return Err(SerialAuditError::Interactive(
            "端末から実行されていないため列を選択できません".into(),
        ));
    }

    println!("\n⚠ 指定された列が見つかりません: {}", requested.join(", "));
    println!("📋 シリアル列を選択してください（スペースで選択、Enterで確定）:\n");

    let labels: Vec<String> = table
        .headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{}) {}", i + 1, h.trim()))
        .collect();

    let selected = MultiSelect::new()
        .with_prompt("シリアル列")
        .items(&labels)
        .interact()
        .map_err(|e| SerialAuditError::Interactive(e.to_string()))?;

    if selected.is_empty() {
        return Err(SerialAuditError::Interactive("列が選択されませんでした".into()));
    }

    for &i in &selected {
        println!("→ {} を使用", table.headers[i].trim());
    }
    Ok(selected)
}
