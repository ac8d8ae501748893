//! Single pass over the application sheet that flags rows pointing at a
//! posting already listed above them.

pub mod report;
pub mod resume;

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

use crate::canonicalizer::{canonical_key, clean_link, CleanupPolicy};
use crate::sheet::{HighlightSink, Row, RowSource};

pub use report::{DedupReport, Duplicate, DuplicatePair};
pub use resume::{ResumeCount, ResumeUsage};

/// How a row's link is turned into its dedup key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum KeyStrategy {
    /// Loose cleanup: tracking queries and apply suffixes removed
    #[default]
    Cleanup,
    /// Full canonical key of the resolved target
    Canonical,
}

/// Dedup key of a link, or None when the cell is blank
pub fn dedup_key(link: &str, strategy: KeyStrategy, policy: &CleanupPolicy) -> Option<String> {
    let link = link.trim();
    if link.is_empty() {
        return None;
    }

    Some(match strategy {
        KeyStrategy::Cleanup => clean_link(link, policy),
        KeyStrategy::Canonical => canonical_key(link),
    })
}

#[derive(Debug, Clone, Default)]
pub struct Deduplicator {
    strategy: KeyStrategy,
    policy: CleanupPolicy,
}

impl Deduplicator {
    pub fn new(strategy: KeyStrategy, policy: CleanupPolicy) -> Self {
        Self { strategy, policy }
    }

    /// Walks the rows in order. A row is a duplicate when its key already
    /// belongs to an earlier row; rows without a link are never flagged.
    ///
    /// # Arguments
    /// * `rows` - Sheet rows in sheet order
    ///
    /// # Returns
    /// * `DedupReport` - One highlight flag per row, the duplicates found and
    ///   how often each resume was used
    #[instrument(level = "debug", skip_all, fields(rows = rows.len(), strategy = ?self.strategy))]
    pub fn process(&self, rows: &[Row]) -> DedupReport {
        let mut first_seen: HashMap<String, &str> = HashMap::with_capacity(rows.len());
        let mut resume_usage = ResumeUsage::default();
        let mut duplicates = Vec::new();
        let mut highlights = Vec::with_capacity(rows.len());

        for row in rows {
            if let Some(resume) = &row.resume {
                resume_usage.record(resume);
            }

            let Some(key) = dedup_key(&row.link, self.strategy, &self.policy) else {
                warn!("Row {} has no link, skipping", row.no);
                highlights.push(false);
                continue;
            };
            debug!("Row {} keyed as {}", row.no, key);

            match first_seen.entry(key) {
                Entry::Vacant(slot) => {
                    slot.insert(&row.no);
                    highlights.push(false);
                }
                Entry::Occupied(slot) => {
                    info!(
                        "{} {}\t\t{} (same posting as row {})",
                        row.no,
                        row.company_name,
                        row.job_title,
                        slot.get()
                    );
                    duplicates.push(Duplicate {
                        no: row.no.clone(),
                        first_no: slot.get().to_string(),
                        company_name: row.company_name.clone(),
                        job_title: row.job_title.clone(),
                        key: slot.key().clone(),
                    });
                    highlights.push(true);
                }
            }
        }

        info!(
            "Processed {} rows, {} duplicates, {} distinct resumes",
            rows.len(),
            duplicates.len(),
            resume_usage.distinct()
        );

        DedupReport {
            total_rows: rows.len(),
            duplicates,
            highlights,
            resume_usage,
        }
    }

    /// Reads every row from the sheet, dedups them and writes the highlight
    /// flags back to it
    pub fn run<T>(&self, sheet: &mut T) -> Result<DedupReport>
    where
        T: RowSource + HighlightSink + ?Sized,
    {
        let rows = sheet.read_rows().context("Failed to read rows")?;
        let report = self.process(&rows);
        sheet
            .write_highlights(&report.highlights)
            .context("Failed to write highlights")?;
        Ok(report)
    }
}

/// Every pair of rows (earlier row first) whose links are the same posting
/// by canonical key. Rows with a blank link are left out.
pub fn find_duplicate_pairs(rows: &[Row]) -> Vec<DuplicatePair> {
    let keyed: Vec<(&Row, String)> = rows
        .iter()
        .filter(|row| !row.link.trim().is_empty())
        .map(|row| (row, canonical_key(row.link.trim())))
        .collect();

    let mut pairs = Vec::new();
    for (i, (first, first_key)) in keyed.iter().enumerate() {
        for (second, second_key) in &keyed[i + 1..] {
            if first_key == second_key {
                pairs.push(DuplicatePair {
                    first_no: first.no.clone(),
                    second_no: second.no.clone(),
                    first_link: first.link.clone(),
                    second_link: second.link.clone(),
                });
            }
        }
    }

    debug!("Found {} duplicate pairs among {} linked rows", pairs.len(), keyed.len());
    pairs
}
