use std::path::PathBuf;

use async_trait::async_trait;

use super::{LedgerStore, StoreError};
use crate::models::Table;

/// One `<name>.csv` file per logical table under a data directory.
#[derive(Debug, Clone)]
pub struct CsvFileStore {
    dir: PathBuf,
}

impl CsvFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.csv"))
    }
}

/// Parse CSV bytes. The first record is the header; ragged rows are kept
/// as-is and padded later by the loader.
pub fn parse_csv(bytes: &[u8]) -> Result<Table, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let columns = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(str::to_string).collect());
    }

    Ok(Table { columns, rows })
}

pub fn render_csv(table: &Table) -> Result<Vec<u8>, StoreError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }

    writer.into_inner().map_err(|e| StoreError::Io(e.into_error()))
}

#[async_trait]
impl LedgerStore for CsvFileStore {
    async fn read_table(&self, name: &str) -> Result<Table, StoreError> {
        let path = self.path_for(name);
        let bytes = match tokio::fs::read(&path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(name.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        Ok(parse_csv(&bytes)?)
    }

    /// Writes to a sibling temp file and renames it over the target, so a
    /// crash mid-write never leaves a truncated table behind.
    async fn write_table(&self, name: &str, table: &Table) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let bytes = render_csv(table)?;
        let path = self.path_for(name);
        let tmp = self.dir.join(format!(".{name}.csv.tmp"));
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;

        tracing::debug!(
            table = name,
            rows = table.rows.len(),
            path = %path.display(),
            "CSV table written"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quoted_and_ragged() {
        let table =
            parse_csv(b"Date,Event,Stake\n2024-01-01,\"Arsenal, London\",10\n2024-01-02\n")
                .unwrap();
        assert_eq!(table.columns, vec!["Date", "Event", "Stake"]);
        assert_eq!(table.rows[0][1], "Arsenal, London");
        assert_eq!(table.rows[1], vec!["2024-01-02"]);
    }

    #[test]
    fn test_render_then_parse() {
        let table = Table {
            columns: vec!["a".into(), "b".into()],
            rows: vec![vec!["x, y".into(), "".into()]],
        };
        let bytes = render_csv(&table).unwrap();
        assert_eq!(parse_csv(&bytes).unwrap(), table);
    }

    #[test]
    fn test_empty_file_has_no_columns() {
        let table = parse_csv(b"").unwrap();
        assert!(table.columns.is_empty());
        assert!(table.rows.is_empty());
    }
}
