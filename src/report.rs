//! Listing output: table rendering and CSV export for previously pinned files.

use comfy_table::{presets::UTF8_FULL, Table};

use crate::error::Result;
use crate::storage::StoredFile;

const HEADERS: [&str; 3] = ["File Name", "CID", "Created"];

/// Render the file listing as a table for the terminal.
pub fn render_table(files: &[StoredFile]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(HEADERS);
    for file in files {
        table.add_row([
            file.display_name().to_string(),
            file.cid.clone(),
            file.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ]);
    }
    table.to_string()
}

/// Write the listing as CSV to any writer, same columns as the table.
pub fn write_csv<W: std::io::Write>(files: &[StoredFile], out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(HEADERS).map_err(io_err)?;
    for file in files {
        writer
            .write_record([
                file.display_name().to_string(),
                file.cid.clone(),
                file.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ])
            .map_err(io_err)?;
    }
    writer.flush()?;
    Ok(())
}

fn io_err(e: csv::Error) -> crate::error::Error {
    crate::error::Error::Io(std::io::Error::other(e))
}
