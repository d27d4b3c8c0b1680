use std::{fs::File, path::Path};

use csv::Writer;
use log::info;

use crate::bigquery::ResultTable;
use crate::error::Result;

/// Writes the result as CSV: a header row, then one record per row with
/// nulls as empty fields.
pub fn write_csv<P: AsRef<Path>>(filename: P, table: &ResultTable) -> Result<()> {
    let file = File::create(&filename)?;
    let mut wtr = Writer::from_writer(file);

    wtr.write_record(&table.columns)?;

    for row in &table.rows {
        wtr.write_record(row.iter().map(|cell| cell.as_deref().unwrap_or("")))?;
    }
    wtr.flush()?;
    info!("CSV file written successfully: {:?}", filename.as_ref());

    Ok(())
}
