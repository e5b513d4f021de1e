use regex::{Regex, RegexBuilder};

use crate::settings::Settings;

pub const SITE_WILDCARD: char = '*';

/// One entry of the active-site list.
#[derive(Clone, Debug)]
pub enum SitePattern {
    /// Plain pattern, matched by substring containment.
    Contains(String),
    /// Wildcard pattern, `*` standing for any run of characters, unanchored.
    Glob(Regex),
}

impl SitePattern {
    pub fn parse(raw: &str) -> Option<Self> {
        let pattern = raw.trim().to_ascii_lowercase();
        if pattern.is_empty() {
            return None;
        }
        if pattern.contains(SITE_WILDCARD) {
            glob_to_regex(&pattern).map(SitePattern::Glob)
        } else {
            Some(SitePattern::Contains(pattern))
        }
    }

    pub fn matches(&self, hostname: &str) -> bool {
        match self {
            SitePattern::Contains(needle) => hostname.contains(needle.as_str()),
            SitePattern::Glob(regex) => regex.is_match(hostname),
        }
    }
}

fn glob_to_regex(pattern: &str) -> Option<Regex> {
    let source = pattern
        .split(SITE_WILDCARD)
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    RegexBuilder::new(&source)
        .case_insensitive(true)
        .build()
        .ok()
}

/// Compiled form of `activeSites`, rebuilt whenever the list changes.
#[derive(Clone, Debug, Default)]
pub struct SiteMatcher {
    patterns: Vec<SitePattern>,
}

impl SiteMatcher {
    pub fn new<S: AsRef<str>>(sites: &[S]) -> Self {
        Self {
            patterns: sites
                .iter()
                .filter_map(|site| SitePattern::parse(site.as_ref()))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn matches(&self, hostname: &str) -> bool {
        let hostname = hostname.trim().to_ascii_lowercase();
        self.patterns.iter().any(|pattern| pattern.matches(&hostname))
    }
}

pub fn is_eligible(hostname: &str, settings: &Settings) -> bool {
    settings.allow_any_website || SiteMatcher::new(&settings.active_sites).matches(hostname)
}
