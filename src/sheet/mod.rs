//! Tabular collaborators of the dedup pass: where rows come from and where
//! the per-row highlight decision goes.

pub mod csv_sheet;
pub mod memory;
pub mod xlsx_sheet;

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

pub use csv_sheet::CsvSheet;
pub use memory::MemorySheet;
pub use xlsx_sheet::XlsxSheet;

// Column headers of the application sheet
pub const COL_NO: &str = "NO";
pub const COL_LINK: &str = "LINK";
pub const COL_RESUME: &str = "RESUME";
pub const COL_COMPANY: &str = "COMPANY NAME";
pub const COL_JOB_TITLE: &str = "JOB TITLE";

/// One job application entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    pub no: String,
    pub link: String,
    pub resume: Option<String>,
    pub company_name: String,
    pub job_title: String,
}

impl Row {
    pub fn new(no: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            no: no.into(),
            link: link.into(),
            ..Self::default()
        }
    }

    pub fn with_resume(mut self, resume: impl Into<String>) -> Self {
        let resume = resume.into();
        self.resume = if resume.trim().is_empty() { None } else { Some(resume) };
        self
    }

    pub fn with_posting(mut self, company_name: impl Into<String>, job_title: impl Into<String>) -> Self {
        self.company_name = company_name.into();
        self.job_title = job_title.into();
        self
    }
}

/// Something rows can be read from, once, in sheet order
pub trait RowSource {
    fn read_rows(&mut self) -> Result<Vec<Row>>;
}

/// Something that persists one highlight flag per row, in the order the rows
/// were read
pub trait HighlightSink {
    fn write_highlights(&mut self, flags: &[bool]) -> Result<()>;
}

/// A file-backed sheet that is both source and sink
pub trait Sheet: RowSource + HighlightSink {
    /// File the highlights end up in
    fn target_path(&self) -> &Path;
}

/// Marker written for highlighted and plain rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightStyle {
    /// Column holding the marker in text formats; added when missing
    pub column: String,
    /// RGB hex fill of duplicate rows
    pub duplicate_color: String,
    pub clear_color: String,
}

impl Default for HighlightStyle {
    fn default() -> Self {
        Self {
            column: "HIGHLIGHT".to_string(),
            duplicate_color: "FFFF00".to_string(),
            clear_color: "FFFFFF".to_string(),
        }
    }
}

impl HighlightStyle {
    pub fn marker(&self, highlighted: bool) -> &str {
        if highlighted {
            &self.duplicate_color
        } else {
            &self.clear_color
        }
    }
}

/// Where to find a sheet and how to mark it
#[derive(Debug, Clone)]
pub struct SheetOptions {
    pub path: PathBuf,
    pub output: Option<PathBuf>,
    /// Worksheet of a workbook; ignored for CSV
    pub sheet_name: String,
    pub style: HighlightStyle,
}

/// Opens `options.path` as a workbook when it ends in `.xlsx`/`.xlsm`, as CSV
/// otherwise
pub fn open_sheet(options: &SheetOptions) -> Box<dyn Sheet> {
    let is_workbook = options
        .path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("xlsx") || ext.eq_ignore_ascii_case("xlsm"))
        .unwrap_or(false);

    if is_workbook {
        debug!("Opening {} as a workbook", options.path.display());
        let sheet = XlsxSheet::open(&options.path, &options.sheet_name).with_style(options.style.clone());
        Box::new(match &options.output {
            Some(output) => sheet.with_output(output),
            None => sheet,
        })
    } else {
        debug!("Opening {} as CSV", options.path.display());
        let sheet = CsvSheet::open(&options.path).with_style(options.style.clone());
        Box::new(match &options.output {
            Some(output) => sheet.with_output(output),
            None => sheet,
        })
    }
}

/// Writes a sibling temp file with `write` and renames it over `target`; the
/// temp file is removed when writing fails
pub(crate) fn replace_file<F>(target: &Path, write: F) -> Result<()>
where
    F: FnOnce(&Path) -> Result<()>,
{
    let name = target
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "sheet".to_string());
    let temp = target.with_file_name(format!(".{}.{}.tmp", name, Uuid::new_v4()));

    if let Err(e) = write(&temp) {
        if let Err(cleanup) = fs::remove_file(&temp) {
            debug!("Could not remove {}: {}", temp.display(), cleanup);
        }
        return Err(e);
    }
    fs::rename(&temp, target)
        .with_context(|| format!("Failed to replace {} with {}", target.display(), temp.display()))
}

/// Positions of the known columns in a header row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ColumnMap {
    pub link: usize,
    pub no: Option<usize>,
    pub resume: Option<usize>,
    pub company: Option<usize>,
    pub job_title: Option<usize>,
}

impl ColumnMap {
    /// None when there is no LINK column
    pub fn locate<'a, I>(headers: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let headers: Vec<&str> = headers.into_iter().collect();
        let find = |name: &str| header_position(headers.iter().copied(), name);

        Some(Self {
            link: find(COL_LINK)?,
            no: find(COL_NO),
            resume: find(COL_RESUME),
            company: find(COL_COMPANY),
            job_title: find(COL_JOB_TITLE),
        })
    }

    /// Builds a row from a field getter taking 0-based column positions
    pub fn row<F>(&self, field: F) -> Row
    where
        F: Fn(usize) -> String,
    {
        let get = |index: Option<usize>| index.map(&field).unwrap_or_default().trim().to_string();
        Row {
            no: get(self.no),
            link: get(Some(self.link)),
            resume: Some(get(self.resume)).filter(|r| !r.is_empty()),
            company_name: get(self.company),
            job_title: get(self.job_title),
        }
    }
}

/// Header lookup ignoring surrounding whitespace, a BOM and ASCII case
pub(crate) fn header_position<'a, I>(headers: I, name: &str) -> Option<usize>
where
    I: IntoIterator<Item = &'a str>,
{
    headers
        .into_iter()
        .position(|header| header.trim_start_matches('\u{feff}').trim().eq_ignore_ascii_case(name))
}
