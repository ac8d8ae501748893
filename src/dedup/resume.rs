use serde::Serialize;
use std::collections::HashMap;

/// How many rows used a given resume
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResumeCount {
    pub resume: String,
    pub count: usize,
}

/// Resume usage accumulated over one pass, keyed by the resume id with all
/// whitespace removed
#[derive(Debug, Clone, Default)]
pub struct ResumeUsage {
    counts: Vec<ResumeCount>,
    index: HashMap<String, usize>,
}

impl ResumeUsage {
    /// Counts one use; blank ids are ignored
    pub fn record(&mut self, resume: &str) {
        let id: String = resume.chars().filter(|c| !c.is_whitespace()).collect();
        if id.is_empty() {
            return;
        }

        match self.index.get(&id) {
            Some(&position) => self.counts[position].count += 1,
            None => {
                self.index.insert(id.clone(), self.counts.len());
                self.counts.push(ResumeCount { resume: id, count: 1 });
            }
        }
    }

    pub fn count(&self, resume: &str) -> usize {
        self.index.get(resume).map_or(0, |&position| self.counts[position].count)
    }

    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// Most used first; equal counts keep first-seen order
    pub fn ranked(&self) -> Vec<ResumeCount> {
        let mut ranked = self.counts.clone();
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_is_ignored() {
        let mut usage = ResumeUsage::default();
        usage.record("Backend v2");
        usage.record(" Backend\tv2 ");
        usage.record("   ");
        assert_eq!(usage.count("Backendv2"), 2);
        assert_eq!(usage.distinct(), 1);
    }

    #[test]
    fn test_ranked_is_stable() {
        let mut usage = ResumeUsage::default();
        for resume in ["b", "a", "c", "a", "c", "d"] {
            usage.record(resume);
        }
        let ranked: Vec<(String, usize)> = usage
            .ranked()
            .into_iter()
            .map(|entry| (entry.resume, entry.count))
            .collect();
        assert_eq!(
            ranked,
            vec![
                ("a".to_string(), 2),
                ("c".to_string(), 2),
                ("b".to_string(), 1),
                ("d".to_string(), 1),
            ]
        );
    }
}
