//! Export command for downloading the record CSV.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use pt_api::{Client, CsvExport};

pub async fn run<W: Write>(writer: &mut W, client: &Client, output: Option<&Path>) -> Result<()> {
    let export = client
        .export()
        .await
        .with_context(|| format!("failed to download export from {}", client.base_url()))?;

    let Some(export) = export else {
        writeln!(writer, "No records to export.")?;
        return Ok(());
    };

    let path = save(&export, output)?;
    writeln!(
        writer,
        "Saved {} bytes to {}",
        export.content.len(),
        path.display()
    )?;
    Ok(())
}

/// Writes the export to `output`, or to the server-provided file name in the
/// current directory.
fn save(export: &CsvExport, output: Option<&Path>) -> Result<PathBuf> {
    let path = output.map_or_else(|| PathBuf::from(&export.filename), Path::to_path_buf);
    fs::write(&path, &export.content)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}
