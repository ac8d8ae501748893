use once_cell::sync::Lazy;
use std::collections::HashMap;

/// How a known redirector host hides the real destination of a link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectorRule {
    /// The host identifies postings by a job key; any link carrying the key is
    /// rebuilt as `https://<host>/viewjob?<param>=<key>`
    JobKey { param: &'static str },
    /// The real destination is percent-encoded inside a query parameter
    TargetParam { param: &'static str },
}

impl RedirectorRule {
    /// Name of the query parameter the rule reads
    pub fn param(&self) -> &'static str {
        match self {
            RedirectorRule::JobKey { param } | RedirectorRule::TargetParam { param } => param,
        }
    }
}

// One line per redirector host
pub static REDIRECTORS: Lazy<HashMap<&'static str, RedirectorRule>> = Lazy::new(|| {
    HashMap::from([
        ("www.indeed.com", RedirectorRule::JobKey { param: "jk" }),
        ("www.wiraa.com", RedirectorRule::TargetParam { param: "source" }),
    ])
});

/// Looks up the rule for an exact host name
pub fn redirector_for(host: &str) -> Option<RedirectorRule> {
    REDIRECTORS.get(host).copied()
}
