use anyhow::{anyhow, bail, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use umya_spreadsheet::{reader, writer, Spreadsheet, Worksheet};

use super::{
    replace_file, ColumnMap, HighlightSink, HighlightStyle, Row, RowSource, Sheet, COL_LINK,
};

// Row 1 holds the headers
const HEADER_ROW: u32 = 1;
const FIRST_DATA_ROW: u32 = 2;

/// One worksheet of an `.xlsx` workbook.
///
/// Highlights are solid background fills over every cell of a data row, so
/// the workbook keeps its columns unchanged. Other worksheets are written back
/// as they were read.
pub struct XlsxSheet {
    path: PathBuf,
    output: Option<PathBuf>,
    sheet_name: String,
    style: HighlightStyle,
    book: Option<Spreadsheet>,
}

impl XlsxSheet {
    pub fn open(path: impl Into<PathBuf>, sheet_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            output: None,
            sheet_name: sheet_name.into(),
            style: HighlightStyle::default(),
            book: None,
        }
    }

    /// Write highlights to `output` instead of back into the source workbook
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_style(mut self, style: HighlightStyle) -> Self {
        self.style = style;
        self
    }

    fn book(&mut self) -> Result<&mut Spreadsheet> {
        let book = match self.book.take() {
            Some(book) => book,
            None => {
                let book = reader::xlsx::read(&self.path)
                    .map_err(|e| anyhow!("Failed to open workbook {}: {:?}", self.path.display(), e))?;
                info!("Loaded workbook {}", self.path.display());
                book
            }
        };
        Ok(self.book.insert(book))
    }

    fn worksheet(&mut self) -> Result<&mut Worksheet> {
        let name = self.sheet_name.clone();
        let path = self.path.clone();
        let sheets = self.book()?.get_sheet_collection_mut();

        let index = match sheets.iter().position(|ws| ws.get_name() == name) {
            Some(index) => index,
            None if !sheets.is_empty() => {
                warn!(
                    "Workbook {} has no sheet '{}', using '{}'",
                    path.display(),
                    name,
                    sheets[0].get_name()
                );
                0
            }
            None => bail!("Workbook {} has no sheets", path.display()),
        };
        Ok(&mut sheets[index])
    }
}

/// Number of rows below the header
fn data_rows(ws: &Worksheet) -> u32 {
    ws.get_highest_row().saturating_sub(HEADER_ROW)
}

/// `FFFF00` becomes `FFFFFF00`; eight-digit values are taken as ARGB already
fn argb(color: &str) -> String {
    let color = color.trim_start_matches('#').to_ascii_uppercase();
    if color.len() == 6 {
        format!("FF{}", color)
    } else {
        color
    }
}

impl Sheet for XlsxSheet {
    fn target_path(&self) -> &Path {
        self.output.as_deref().unwrap_or(&self.path)
    }
}

impl RowSource for XlsxSheet {
    fn read_rows(&mut self) -> Result<Vec<Row>> {
        let path = self.path.clone();
        let ws = self.worksheet()?;

        let headers: Vec<String> = (1..=ws.get_highest_column())
            .map(|col| ws.get_value((col, HEADER_ROW)))
            .collect();
        let Some(columns) = ColumnMap::locate(headers.iter().map(String::as_str)) else {
            bail!("Sheet {} has no {} column", path.display(), COL_LINK);
        };
        debug!("Column positions in '{}': {:?}", ws.get_name(), columns);

        let rows: Vec<Row> = (FIRST_DATA_ROW..=ws.get_highest_row())
            .map(|row| columns.row(|i| ws.get_value((i as u32 + 1, row))))
            .collect();

        info!("Read {} rows from sheet '{}' of {}", rows.len(), ws.get_name(), path.display());
        Ok(rows)
    }
}

impl HighlightSink for XlsxSheet {
    fn write_highlights(&mut self, flags: &[bool]) -> Result<()> {
        let style = self.style.clone();
        let target = self.target_path().to_path_buf();
        let ws = self.worksheet()?;

        let rows = data_rows(ws) as usize;
        if flags.len() != rows {
            bail!("Got {} highlight flags for {} rows", flags.len(), rows);
        }

        let last_col = ws.get_highest_column().max(1);
        for (row, &flag) in (FIRST_DATA_ROW..).zip(flags) {
            let color = argb(style.marker(flag));
            for col in 1..=last_col {
                ws.get_style_mut((col, row)).set_background_color(color.as_str());
            }
        }

        let book = self.book()?;
        replace_file(&target, |temp| {
            writer::xlsx::write(&*book, temp)
                .map_err(|e| anyhow!("Failed to write workbook {}: {:?}", temp.display(), e))
        })?;

        info!(
            "Filled {} highlighted of {} rows in {}",
            flags.iter().filter(|&&flag| flag).count(),
            flags.len(),
            target.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use uuid::Uuid;

    fn temp_workbook(sheet_name: &str, cells: &[&[&str]]) -> PathBuf {
        let mut book = umya_spreadsheet::new_file();
        let ws = book.new_sheet(sheet_name).unwrap();
        for (r, values) in cells.iter().enumerate() {
            for (c, value) in values.iter().enumerate() {
                if !value.is_empty() {
                    ws.get_cell_mut((c as u32 + 1, r as u32 + 1)).set_value(*value);
                }
            }
        }

        let path = std::env::temp_dir().join(format!("job_dedup_sheet_{}.xlsx", Uuid::new_v4()));
        writer::xlsx::write(&book, &path).unwrap();
        path
    }

    fn fill(path: &Path, sheet_name: &str, col: u32, row: u32) -> Option<String> {
        let book = reader::xlsx::read(path).unwrap();
        let ws = book
            .get_sheet_collection()
            .iter()
            .find(|ws| ws.get_name() == sheet_name)
            .unwrap();
        ws.get_style((col, row))
            .get_background_color()
            .map(|color| color.get_argb().to_string())
    }

    #[test]
    fn test_argb() {
        assert_eq!(argb("FFFF00"), "FFFFFF00");
        assert_eq!(argb("#ffffff"), "FFFFFFFF");
        assert_eq!(argb("80FF0000"), "80FF0000");
    }

    #[test]
    fn test_read_rows_from_named_sheet() {
        let path = temp_workbook(
            "Main",
            &[
                &["NO", "Link", "RESUME", "COMPANY NAME", "JOB TITLE"],
                &["1", "https://acme.com/jobs/1", " Res A ", "Acme", "Engineer"],
                &["2", "https://acme.com/jobs/2", "", "Acme", "Designer"],
            ],
        );
        let mut sheet = XlsxSheet::open(&path, "Main");
        let rows = sheet.read_rows().unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].link, "https://acme.com/jobs/1");
        assert_eq!(rows[0].resume.as_deref(), Some("Res A"));
        assert_eq!(rows[1].job_title, "Designer");
        assert!(rows[1].resume.is_none());
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_missing_sheet_falls_back_to_first() {
        let path = temp_workbook("Main", &[&["NO", "LINK"], &["1", "https://a.com"]]);
        // new_file() starts with an empty "Sheet1" ahead of "Main"
        let err = XlsxSheet::open(&path, "Bids").read_rows().unwrap_err();
        assert!(err.to_string().contains("no LINK column"));
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_write_fills_rows() {
        let path = temp_workbook(
            "Main",
            &[
                &["NO", "LINK", "COMPANY NAME"],
                &["1", "https://a.com", "A"],
                &["2", "https://www.a.com/", "A"],
            ],
        );
        let mut sheet = XlsxSheet::open(&path, "Main");
        assert_eq!(sheet.read_rows().unwrap().len(), 2);
        sheet.write_highlights(&[false, true]).unwrap();

        assert_eq!(fill(&path, "Main", 1, 2).as_deref(), Some("FFFFFFFF"));
        assert_eq!(fill(&path, "Main", 3, 2).as_deref(), Some("FFFFFFFF"));
        assert_eq!(fill(&path, "Main", 1, 3).as_deref(), Some("FFFFFF00"));
        assert_eq!(fill(&path, "Main", 3, 3).as_deref(), Some("FFFFFF00"));

        // values are untouched
        let rows = XlsxSheet::open(&path, "Main").read_rows().unwrap();
        assert_eq!(rows[1].link, "https://www.a.com/");
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_write_to_output_leaves_source() {
        let path = temp_workbook("Main", &[&["NO", "LINK"], &["1", "https://a.com"]]);
        let output = std::env::temp_dir().join(format!("job_dedup_out_{}.xlsx", Uuid::new_v4()));

        let mut sheet = XlsxSheet::open(&path, "Main").with_output(&output);
        assert_eq!(sheet.target_path(), output.as_path());
        sheet.write_highlights(&[true]).unwrap();

        assert_eq!(fill(&output, "Main", 2, 2).as_deref(), Some("FFFFFF00"));
        assert_eq!(fill(&path, "Main", 2, 2), None);
        fs::remove_file(path).unwrap();
        fs::remove_file(output).unwrap();
    }

    #[test]
    fn test_flag_count_must_match() {
        let path = temp_workbook("Main", &[&["NO", "LINK"], &["1", "https://a.com"]]);
        let mut sheet = XlsxSheet::open(&path, "Main");
        assert!(sheet.write_highlights(&[true, false]).is_err());
        fs::remove_file(path).unwrap();
    }
}
