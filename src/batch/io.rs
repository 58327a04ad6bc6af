//! CSV input and output for batch runs.

use csv::{ReaderBuilder, WriterBuilder};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::info;

use super::table::{BatchRow, Table, RESULT_COLUMNS};
use crate::error::Result;

/// Load a headered CSV file. Files ending in `.gz` are decompressed.
pub fn read_csv(path: &Path) -> Result<Table> {
    info!("Loading rows from {}", path.display());

    let file = File::open(path)?;
    let reader: Box<dyn Read> = if path.extension().map_or(false, |e| e == "gz") {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };

    let table = read_table(reader)?;
    info!("Loaded {} rows", table.len());
    Ok(table)
}

/// Parse CSV from any reader. Rows may have fewer or more fields than the
/// header.
pub fn read_table<R: Read>(reader: R) -> Result<Table> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader
        .headers()?
        .iter()
        .map(str::to_string)
        .collect();
    let mut table = Table::new(headers);

    for record in csv_reader.records() {
        let record = record?;
        table.push_row(record.iter().map(str::to_string).collect());
    }

    Ok(table)
}

/// Write the table to a CSV file
pub fn write_csv(table: &Table, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    write_table(table, file)?;
    info!("Wrote {} rows to {}", table.len(), path.display());
    Ok(())
}

/// Write the table with its result columns.
///
/// Result columns already present in the input are overwritten in place,
/// missing ones are appended after the original columns.
pub fn write_table<W: Write>(table: &Table, writer: W) -> Result<()> {
    let mut headers: Vec<String> = table.headers().to_vec();
    let result_indices: Vec<usize> = RESULT_COLUMNS
        .iter()
        .map(|name| match headers.iter().position(|h| h == name) {
            Some(idx) => idx,
            None => {
                headers.push(name.to_string());
                headers.len() - 1
            }
        })
        .collect();

    let mut csv_writer = WriterBuilder::new().flexible(true).from_writer(writer);
    csv_writer.write_record(&headers)?;

    for row in table.rows() {
        let mut record: Vec<String> = row.values().to_vec();
        if record.len() < headers.len() {
            record.resize(headers.len(), String::new());
        }
        for (idx, value) in result_indices.iter().zip(result_values(row)) {
            record[*idx] = value;
        }
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush()?;
    Ok(())
}

fn result_values(row: &BatchRow) -> [String; 5] {
    match row.result() {
        Some(r) => [
            r.latitude.to_string(),
            r.longitude.to_string(),
            r.matched_address.clone(),
            r.match_level.to_string(),
            r.confidence.to_string(),
        ],
        None => Default::default(),
    }
}
