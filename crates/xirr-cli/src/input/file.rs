use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use xirr_core::{Direction, RawEntry};

/// One CSV line. Cells stay text so the amount reaches the parse step
/// exactly as typed; an empty direction cell falls back to the default.
#[derive(Deserialize)]
struct CsvRow {
    #[serde(default)]
    label: String,
    #[serde(default)]
    direction: Option<Direction>,
    #[serde(default)]
    amount: String,
    #[serde(default)]
    date: String,
}

impl From<CsvRow> for RawEntry {
    fn from(row: CsvRow) -> Self {
        RawEntry {
            label: row.label,
            direction: row.direction.unwrap_or_default(),
            amount: row.amount,
            date: row.date,
        }
    }
}

/// Read a JSON file and deserialise into a typed struct.
pub fn read_json<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = fs::read_to_string(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
    let value: T = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?;
    Ok(value)
}

/// Read form entries from a CSV file with a `label,direction,amount,date`
/// header. Empty cells are kept as blank fields, not errors.
pub fn read_entries_csv(path: &str) -> Result<Vec<RawEntry>, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let file = fs::File::open(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
    let entries = entries_from_csv(file)
        .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?;
    Ok(entries)
}

pub fn entries_from_csv<R: Read>(reader: R) -> Result<Vec<RawEntry>, csv::Error> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    rdr.deserialize::<CsvRow>()
        .map(|row| row.map(RawEntry::from))
        .collect()
}

/// Resolve and validate the path, preventing directory traversal.
fn resolve_path(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    let canonical = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    if !canonical.exists() {
        return Err(format!("File not found: {}", canonical.display()).into());
    }

    if !canonical.is_file() {
        return Err(format!("Not a file: {}", canonical.display()).into());
    }

    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_from_csv() {
        let data = "label,direction,amount,date\n\
                    Initial capital,out,100000,2023-01-01\n\
                    Dividend,withdrawal,\"20,000\",2023-07-01\n\
                    ,contribution,,\n";
        let entries = entries_from_csv(data.as_bytes()).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].direction, Direction::Contribution);
        assert_eq!(entries[0].amount, "100000");
        assert_eq!(entries[1].direction, Direction::Withdrawal);
        assert_eq!(entries[1].amount, "20,000");
        assert!(entries[2].is_blank());
    }

    #[test]
    fn test_entries_from_csv_blank_row_is_kept_blank() {
        let data = "label,direction,amount,date\n\
                    A,out,100,2023-01-01\n\
                    ,,,\n";
        let entries = entries_from_csv(data.as_bytes()).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[1].is_blank());
        assert_eq!(entries[1].direction, Direction::Contribution);
    }

    #[test]
    fn test_entries_from_csv_keeps_amount_text() {
        let data = "label,direction,amount,date\n\
                    big,out,12345678901234567.89,2023-01-01\n\
                    sci,in,1e3,2023-06-01\n";
        let entries = entries_from_csv(data.as_bytes()).unwrap();
        assert_eq!(entries[0].amount, "12345678901234567.89");
        assert_eq!(entries[1].amount, "1e3");
        assert_eq!(entries[1].direction, Direction::Withdrawal);
    }

    #[test]
    fn test_missing_file() {
        let err = read_entries_csv("does/not/exist.csv").unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }
}
