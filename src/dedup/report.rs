use serde::Serialize;

use super::resume::{ResumeCount, ResumeUsage};

/// A row whose link was already seen earlier in the sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Duplicate {
    pub no: String,
    /// NO of the earliest row with the same key
    pub first_no: String,
    pub company_name: String,
    pub job_title: String,
    pub key: String,
}

/// Two rows whose links resolve to the same canonical key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicatePair {
    pub first_no: String,
    pub second_no: String,
    pub first_link: String,
    pub second_link: String,
}

/// Outcome of one dedup pass over a sheet
#[derive(Debug, Clone)]
pub struct DedupReport {
    pub total_rows: usize,
    pub duplicates: Vec<Duplicate>,
    /// One flag per row, in sheet order
    pub highlights: Vec<bool>,
    pub resume_usage: ResumeUsage,
}

impl DedupReport {
    pub fn duplicated_ids(&self) -> Vec<&str> {
        self.duplicates.iter().map(|d| d.no.as_str()).collect()
    }

    pub fn duplicate_count(&self) -> usize {
        self.duplicates.len()
    }

    pub fn top_resumes(&self, limit: usize) -> Vec<ResumeCount> {
        let mut ranked = self.resume_usage.ranked();
        ranked.truncate(limit);
        ranked
    }

    /// JSON summary with the `limit` most used resumes
    pub fn summary_json(&self, limit: usize) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&serde_json::json!({
            "total_rows": self.total_rows,
            "duplicate_count": self.duplicate_count(),
            "duplicated_ids": self.duplicated_ids(),
            "duplicates": self.duplicates,
            "resume_stats": self.top_resumes(limit),
        }))
    }
}
