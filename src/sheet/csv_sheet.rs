use anyhow::{bail, Context, Result};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::{
    header_position, replace_file, ColumnMap, HighlightSink, HighlightStyle, Row, RowSource, Sheet,
    COL_LINK,
};

/// A headered CSV file acting as both row source and highlight sink.
///
/// Writing keeps every original column in order and sets the marker column
/// (appended if missing) to the highlight or clear color of each row. The new
/// file is written next to the target and renamed over it.
#[derive(Debug)]
pub struct CsvSheet {
    path: PathBuf,
    output: Option<PathBuf>,
    style: HighlightStyle,
    loaded: Option<LoadedSheet>,
}

#[derive(Debug)]
struct LoadedSheet {
    headers: StringRecord,
    records: Vec<StringRecord>,
}

impl CsvSheet {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            output: None,
            style: HighlightStyle::default(),
            loaded: None,
        }
    }

    /// Write highlights to `output` instead of back into the source file
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_style(mut self, style: HighlightStyle) -> Self {
        self.style = style;
        self
    }

    fn loaded(&mut self) -> Result<&LoadedSheet> {
        let sheet = match self.loaded.take() {
            Some(sheet) => sheet,
            None => read_sheet(&self.path)?,
        };
        Ok(self.loaded.insert(sheet))
    }
}

fn read_sheet(path: &Path) -> Result<LoadedSheet> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open sheet {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read header of {}", path.display()))?
        .clone();
    let records = reader
        .records()
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Failed to read rows of {}", path.display()))?;

    info!("Loaded {} rows from {}", records.len(), path.display());
    Ok(LoadedSheet { headers, records })
}

impl Sheet for CsvSheet {
    fn target_path(&self) -> &Path {
        self.output.as_deref().unwrap_or(&self.path)
    }
}

impl RowSource for CsvSheet {
    fn read_rows(&mut self) -> Result<Vec<Row>> {
        let path = self.path.clone();
        let sheet = self.loaded()?;

        let Some(columns) = ColumnMap::locate(sheet.headers.iter()) else {
            bail!("Sheet {} has no {} column", path.display(), COL_LINK);
        };
        debug!("Column positions: {:?}", columns);

        let rows = sheet
            .records
            .iter()
            .map(|record| columns.row(|i| record.get(i).unwrap_or("").to_string()))
            .collect();

        Ok(rows)
    }
}

impl HighlightSink for CsvSheet {
    fn write_highlights(&mut self, flags: &[bool]) -> Result<()> {
        let style = self.style.clone();
        let target = self.target_path().to_path_buf();
        let sheet = self.loaded()?;

        if flags.len() != sheet.records.len() {
            bail!(
                "Got {} highlight flags for {} rows",
                flags.len(),
                sheet.records.len()
            );
        }

        replace_file(&target, |temp| write_marked(temp, sheet, flags, &style))?;

        info!(
            "Wrote {} highlighted of {} rows to {}",
            flags.iter().filter(|&&flag| flag).count(),
            flags.len(),
            target.display()
        );
        Ok(())
    }
}

fn write_marked(path: &Path, sheet: &LoadedSheet, flags: &[bool], style: &HighlightStyle) -> Result<()> {
    let mut headers = sheet.headers.clone();
    let marker = match header_position(headers.iter(), &style.column) {
        Some(index) => index,
        None => {
            headers.push_field(&style.column);
            headers.len() - 1
        }
    };

    let mut writer = WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    writer.write_record(&headers)?;

    for (line, (record, &flag)) in sheet.records.iter().zip(flags).enumerate() {
        if record.len() > sheet.headers.len() {
            warn!("Row {} has {} fields, keeping the first {}", line + 1, record.len(), sheet.headers.len());
        }
        let mut out = StringRecord::with_capacity(record.as_slice().len(), headers.len());
        for i in 0..headers.len() {
            if i == marker {
                out.push_field(style.marker(flag));
            } else {
                out.push_field(record.get(i).unwrap_or(""));
            }
        }
        writer.write_record(&out)?;
    }

    writer
        .flush()
        .with_context(|| format!("Failed to flush {}", path.display()))?;
    Ok(())
}
