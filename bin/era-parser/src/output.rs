use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use anyhow::{Context, bail};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Serialize)]
pub struct EraInfo {
    pub network: String,
    pub era_number: u64,
    pub start_slot: u64,
    pub end_slot: u64,
}

#[derive(Debug, Serialize)]
struct JsonEnvelope<'a, T: Serialize> {
    era_info: &'a EraInfo,
    data_type: &'a str,
    record_count: usize,
    export_timestamp: DateTime<Utc>,
    data: &'a [T],
}

enum Format {
    Json,
    JsonLines,
    Csv,
}

impl Format {
    fn from_path(path: &Path) -> anyhow::Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("jsonl") => Ok(Format::JsonLines),
            Some("csv") => Ok(Format::Csv),
            Some("json") | None => Ok(Format::Json),
            Some("parquet") => bail!("parquet output is not implemented by this exporter"),
            Some(other) => bail!("unrecognized output extension: {other}"),
        }
    }
}

/// Writes `rows` to `path` in the format selected by its extension
/// (`.json`, `.jsonl`, `.csv`). `export_timestamp` is supplied by the
/// caller, not computed here, since workflow scripts can't call
/// `Utc::now()` mid-run and this keeps the function itself pure.
pub fn write_dataset<T: Serialize>(
    path: &Path,
    era_info: &EraInfo,
    data_type: &str,
    rows: &[T],
    export_timestamp: DateTime<Utc>,
) -> anyhow::Result<()> {
    match Format::from_path(path)? {
        Format::Json => write_json(path, era_info, data_type, rows, export_timestamp),
        Format::JsonLines => write_jsonl(path, era_info, data_type, rows, export_timestamp),
        Format::Csv => write_csv(path, rows),
    }
}

fn write_json<T: Serialize>(
    path: &Path,
    era_info: &EraInfo,
    data_type: &str,
    rows: &[T],
    export_timestamp: DateTime<Utc>,
) -> anyhow::Result<()> {
    let envelope = JsonEnvelope {
        era_info,
        data_type,
        record_count: rows.len(),
        export_timestamp,
        data: rows,
    };
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &envelope)?;
    Ok(())
}

fn write_jsonl<T: Serialize>(
    path: &Path,
    era_info: &EraInfo,
    data_type: &str,
    rows: &[T],
    export_timestamp: DateTime<Utc>,
) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    let metadata = serde_json::json!({
        "era_info": era_info,
        "data_type": data_type,
        "record_count": rows.len(),
        "export_timestamp": export_timestamp,
    });
    serde_json::to_writer(&mut writer, &metadata)?;
    writer.write_all(b"\n")?;

    for row in rows {
        serde_json::to_writer(&mut writer, row)?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}

fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "# record_count={}", rows.len())?;

    let Some(first) = rows.first() else {
        return Ok(());
    };
    let Value::Object(first_fields) = serde_json::to_value(first)? else {
        bail!("row type did not serialize to a JSON object");
    };
    let columns: Vec<String> = first_fields.keys().cloned().collect();
    writeln!(writer, "{}", columns.join(","))?;

    for row in rows {
        let Value::Object(fields) = serde_json::to_value(row)? else {
            bail!("row type did not serialize to a JSON object");
        };
        let cells: Vec<String> = columns.iter().map(|col| csv_cell(fields.get(col))).collect();
        writeln!(writer, "{}", cells.join(","))?;
    }
    Ok(())
}

fn csv_cell(value: Option<&Value>) -> String {
    let raw = match value {
        None | Some(Value::Null) => return String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };
    if raw.contains(',') || raw.contains('"') || raw.contains('\n') {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_format_from_extension() {
        assert!(matches!(Format::from_path(Path::new("out.json")).unwrap(), Format::Json));
        assert!(matches!(Format::from_path(Path::new("out.jsonl")).unwrap(), Format::JsonLines));
        assert!(matches!(Format::from_path(Path::new("out.csv")).unwrap(), Format::Csv));
        assert!(Format::from_path(Path::new("out.parquet")).is_err());
    }

    #[test]
    fn csv_cell_quotes_values_containing_commas() {
        assert_eq!(csv_cell(Some(&Value::String("a,b".to_string()))), "\"a,b\"");
        assert_eq!(csv_cell(Some(&Value::String("plain".to_string()))), "plain");
        assert_eq!(csv_cell(None), "");
    }

    #[derive(Serialize)]
    struct Row {
        slot: u64,
        label: String,
    }

    fn sample_info() -> EraInfo {
        EraInfo { network: "mainnet".to_string(), era_number: 100, start_slot: 3200000, end_slot: 3208191 }
    }

    #[test]
    fn write_json_wraps_rows_in_envelope() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let rows = vec![Row { slot: 1, label: "a".to_string() }, Row { slot: 2, label: "b".to_string() }];
        write_dataset(&path, &sample_info(), "blocks", &rows, Utc::now()).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let parsed: Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed["data_type"], "blocks");
        assert_eq!(parsed["record_count"], 2);
        assert_eq!(parsed["data"][0]["slot"], 1);
    }

    #[test]
    fn write_jsonl_emits_metadata_line_then_one_row_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jsonl");
        let rows = vec![Row { slot: 1, label: "a".to_string() }];
        write_dataset(&path, &sample_info(), "blocks", &rows, Utc::now()).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        let metadata: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(metadata["record_count"], 1);
        let row: Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(row["slot"], 1);
    }

    #[test]
    fn write_csv_emits_header_comment_and_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let rows = vec![Row { slot: 1, label: "a,b".to_string() }];
        write_dataset(&path, &sample_info(), "blocks", &rows, Utc::now()).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "# record_count=1");
        assert_eq!(lines[1], "slot,label");
        assert_eq!(lines[2], "1,\"a,b\"");
    }
}
