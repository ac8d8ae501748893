use anyhow::{bail, Result};

use super::{HighlightSink, Row, RowSource};

/// Sheet kept entirely in memory, for embedding and tests
#[derive(Debug, Clone, Default)]
pub struct MemorySheet {
    rows: Vec<Row>,
    highlights: Option<Vec<bool>>,
}

impl MemorySheet {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows, highlights: None }
    }

    /// Flags from the last write, if any
    pub fn highlights(&self) -> Option<&[bool]> {
        self.highlights.as_deref()
    }
}

impl RowSource for MemorySheet {
    fn read_rows(&mut self) -> Result<Vec<Row>> {
        Ok(self.rows.clone())
    }
}

impl HighlightSink for MemorySheet {
    fn write_highlights(&mut self, flags: &[bool]) -> Result<()> {
        if flags.len() != self.rows.len() {
            bail!("Got {} highlight flags for {} rows", flags.len(), self.rows.len());
        }
        self.highlights = Some(flags.to_vec());
        Ok(())
    }
}
