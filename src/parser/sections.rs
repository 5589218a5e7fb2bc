use regex::Regex;

use crate::error::Result;

/// Carries the current jurisdiction forward across pages.
///
/// A page switches the jurisdiction only when it names one AND carries the
/// section marker; every other page inherits the previous state.
#[derive(Debug, Clone)]
pub struct SectionTracker {
    names: Regex,
    marker: String,
    current: Option<String>,
}

impl SectionTracker {
    pub fn new(names: &[String], marker: &str) -> Result<Self> {
        let mut sorted: Vec<&String> = names.iter().filter(|n| !n.is_empty()).collect();
        // Longest first so "WEST VIRGINIA" beats "VIRGINIA" at the same offset.
        sorted.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        sorted.dedup();
        let alternation = sorted
            .iter()
            .map(|n| regex::escape(n))
            .collect::<Vec<_>>()
            .join("|");
        let names = if alternation.is_empty() {
            Regex::new(r"\b\B")?
        } else {
            Regex::new(&format!(r"\b(?:{})\b", alternation))?
        };
        Ok(SectionTracker {
            names,
            marker: marker.to_string(),
            current: None,
        })
    }

    /// The jurisdiction a page declares, if it is a header page.
    pub fn detect<'t>(&self, text: &'t str) -> Option<&'t str> {
        if !text.contains(&self.marker) {
            return None;
        }
        self.names.find(text).map(|m| m.as_str())
    }

    /// Update state from one page. Returns the label when the page is a
    /// header page.
    pub fn observe(&mut self, text: &str) -> Option<&str> {
        let found = self.detect(text)?.to_string();
        self.current = Some(found);
        self.current.as_deref()
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Every jurisdiction name on a page, marker or not.
    pub fn mentions<'t>(&self, text: &'t str) -> Vec<&'t str> {
        self.names.find_iter(text).map(|m| m.as_str()).collect()
    }
}
