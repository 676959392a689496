//! Split-rule parsing and display
//!
//! Files carry their chunking strategy as a serialized JSON rule:
//! separator rules (separator plus cut position) and, for tabular formats,
//! a row-slice length. Legacy records have no rule at all and are shown as
//! the default separator literal with newlines escaped.

use serde::Deserialize;

/// Separator used before split rules existed
pub const LEGACY_SEPARATOR: &str = "\n\n";

const TABULAR_SUFFIXES: &[&str] = &["csv", "xlsx", "xls"];

/// Deserialized form of a file's `split_rule` field
#[derive(Debug, Default, Deserialize)]
pub struct FileSplitRule {
  /// Separator-based chunking rules, applied in order
  #[serde(default)]
  pub separator_rules: Vec<SeparatorRule>,

  /// Row-slice rule for spreadsheet formats
  #[serde(default)]
  pub excel_rule: Option<ExcelRule>,
}

/// One separator and which side of it the cut lands on
#[derive(Debug, Deserialize)]
pub struct SeparatorRule {
  pub separator: String,

  #[serde(default)]
  pub separator_position: SeparatorPosition,
}

/// Whether the separator stays with the chunk before or after the cut
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeparatorPosition {
  #[default]
  After,
  Before,
}

/// Row-slice rule for `.csv`/`.xlsx`/`.xls` files
#[derive(Debug, Deserialize)]
pub struct ExcelRule {
  pub slice_length: u32,
}

/// Escape control characters so separators are readable in one line
pub fn escape_separator(separator: &str) -> String {
  separator.replace('\n', "\\n").replace('\t', "\\t").replace('\r', "\\r")
}

fn is_tabular(file_name: &str) -> bool {
  file_name
    .rsplit_once('.')
    .map(|(_, suffix)| TABULAR_SUFFIXES.contains(&suffix.to_lowercase().as_str()))
    .unwrap_or(false)
}

/// Render a file's split rule as a one-line strategy summary
///
/// Tolerates missing or unparseable rules (legacy data). Spreadsheet
/// suffixes with a row-slice rule win over any separator rules present.
pub fn strategy_summary(file_name: &str, split_rule: Option<&str>) -> String {
  let rule = split_rule
    .and_then(|raw| serde_json::from_str::<FileSplitRule>(raw).ok());

  let Some(rule) = rule else {
    return escape_separator(LEGACY_SEPARATOR);
  };

  if is_tabular(file_name) {
    if let Some(excel) = &rule.excel_rule {
      return format!("每 {} 行作为一个分段", excel.slice_length);
    }
  }

  if rule.separator_rules.is_empty() {
    return escape_separator(LEGACY_SEPARATOR);
  }

  let parts: Vec<String> = rule
    .separator_rules
    .iter()
    .map(|r| {
      let position = match r.separator_position {
        SeparatorPosition::Before => "切分点前",
        SeparatorPosition::After => "切分点后",
      };
      format!("\"{}\"（{}）", escape_separator(&r.separator), position)
    })
    .collect();

  format!("按分隔符切分：{}", parts.join("；"))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_rule_renders_legacy_literal_escaped() {
    assert_eq!(strategy_summary("report.pdf", None), "\\n\\n");
  }

  #[test]
  fn unparseable_rule_falls_back_to_legacy_literal() {
    assert_eq!(strategy_summary("report.pdf", Some("not json")), "\\n\\n");
  }

  #[test]
  fn csv_with_excel_rule_renders_row_slice_summary() {
    let rule = r#"{
      "separator_rules": [{"separator": "\n\n", "separator_position": "after"}],
      "excel_rule": {"slice_length": 100}
    }"#;
    assert_eq!(strategy_summary("table.csv", Some(rule)), "每 100 行作为一个分段");
    assert_eq!(strategy_summary("table.XLSX", Some(rule)), "每 100 行作为一个分段");
    assert_eq!(strategy_summary("table.xls", Some(rule)), "每 100 行作为一个分段");
  }

  #[test]
  fn non_tabular_file_ignores_excel_rule() {
    let rule = r#"{
      "separator_rules": [{"separator": "\n\n", "separator_position": "after"}],
      "excel_rule": {"slice_length": 100}
    }"#;
    assert_eq!(
      strategy_summary("notes.md", Some(rule)),
      "按分隔符切分：\"\\n\\n\"（切分点后）"
    );
  }

  #[test]
  fn separators_are_listed_with_positions() {
    let rule = r#"{
      "separator_rules": [
        {"separator": "。", "separator_position": "before"},
        {"separator": "\n", "separator_position": "after"}
      ]
    }"#;
    assert_eq!(
      strategy_summary("notes.txt", Some(rule)),
      "按分隔符切分：\"。\"（切分点前）；\"\\n\"（切分点后）"
    );
  }

  #[test]
  fn empty_rule_object_renders_legacy_literal() {
    assert_eq!(strategy_summary("notes.txt", Some("{}")), "\\n\\n");
  }
}
