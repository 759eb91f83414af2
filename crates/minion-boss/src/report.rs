use comfy_table::{presets::UTF8_FULL, Table};
use minion_core::TaskOutcome;

/// Output format for collected results
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    Table,
    Json,
    Yaml,
}

pub fn results_table(results: &[TaskOutcome]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["ID", "Time (s)"]);
    for outcome in results {
        table.add_row(vec![
            outcome.identifier.to_string(),
            format!("{:.6}", outcome.elapsed_secs),
        ]);
    }
    table
}

pub fn render(results: &[TaskOutcome], format: Format) -> anyhow::Result<String> {
    let rendered = match format {
        Format::Table => results_table(results).to_string(),
        Format::Json => serde_json::to_string_pretty(results)?,
        Format::Yaml => serde_yaml::to_string(results)?,
    };
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcomes() -> Vec<TaskOutcome> {
        vec![
            TaskOutcome { identifier: 0, elapsed_secs: 0.25 },
            TaskOutcome { identifier: 7, elapsed_secs: 1.5 },
        ]
    }

    #[test]
    fn test_table_has_row_per_result() {
        let rendered = results_table(&outcomes()).to_string();
        assert!(rendered.contains("ID"));
        assert!(rendered.contains("Time (s)"));
        assert!(rendered.contains("0.250000"));
        assert!(rendered.contains("1.500000"));
        assert_eq!(results_table(&outcomes()).row_iter().count(), 2);
    }

    #[test]
    fn test_json_uses_field_names() {
        let rendered = render(&outcomes(), Format::Json).unwrap();
        let parsed: Vec<serde_json::Value> = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1]["identifier"], 7);
        assert_eq!(parsed[1]["elapsed_secs"], 1.5);
    }

    #[test]
    fn test_empty_yaml() {
        assert_eq!(render(&[], Format::Yaml).unwrap().trim(), "[]");
    }
}
