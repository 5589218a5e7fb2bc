use std::collections::BTreeMap;

use crate::directory::{Brand, Directory, LocalityConfidence, Record, ServiceTier};
use crate::error::Result;
use crate::parser::patterns::find_headers;
use crate::parser::sections::SectionTracker;
use crate::source::PageSource;

/// Per-jurisdiction counts after a run.
pub fn print_summary(dir: &Directory, terminal_bucket: &str) {
    println!("\nSummary:");
    let mut total = 0;
    for (label, section) in dir.iter() {
        if label == terminal_bucket {
            continue;
        }
        total += section.records.len();
        if !section.records.is_empty() {
            println!("  {}: {} stations", label, section.records.len());
        }
    }
    let terminals = dir.get(terminal_bucket).map_or(0, |s| s.terminals.len());
    println!("  Terminals: {}", terminals);
    println!("\n  Total stations: {}", total);
}

#[derive(Debug, Clone, Default)]
pub struct OverviewFilter {
    pub jurisdiction: Option<String>,
    pub tier: Option<String>,
    pub brand: Option<String>,
    pub limit: usize,
}

pub fn overview_rows<'a>(dir: &'a Directory, filter: &OverviewFilter) -> Vec<&'a Record> {
    let brand = filter.brand.as_deref().and_then(Brand::parse);
    dir.records()
        .filter(|r| {
            filter
                .jurisdiction
                .as_deref()
                .map_or(true, |j| r.jurisdiction.eq_ignore_ascii_case(j))
        })
        .filter(|r| {
            filter
                .tier
                .as_deref()
                .map_or(true, |t| r.service_tier.as_str().eq_ignore_ascii_case(t))
        })
        .filter(|r| filter.brand.is_none() || Some(r.brand) == brand)
        .take(filter.limit)
        .collect()
}

pub fn print_overview(rows: &[&Record]) {
    println!(
        "{:>3} | {:<26} | {:<14} | {:<5} | {:<9} | {:<24} | {:<14}",
        "#", "Station", "Jurisdiction", "Brand", "Tier", "Locality", "Phone"
    );
    println!("{}", "-".repeat(112));
    for (i, r) in rows.iter().enumerate() {
        let locality = match (&r.locality_region_postal, &r.unverified_locality) {
            (Some(l), _) => l.clone(),
            (None, Some(u)) => format!("?{}", u),
            (None, None) => "-".into(),
        };
        println!(
            "{:>3} | {:<26} | {:<14} | {:<5} | {:<9} | {:<24} | {:<14}",
            i + 1,
            truncate(&r.raw_name, 26),
            truncate(&r.jurisdiction, 14),
            r.brand.as_str(),
            r.service_tier.as_str(),
            truncate(&locality, 24),
            r.phone.as_deref().unwrap_or("-"),
        );
    }
    println!("\n{} stations", rows.len());
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    pub stations: usize,
    pub terminals: usize,
    pub by_tier: BTreeMap<&'static str, usize>,
    pub by_brand: BTreeMap<&'static str, usize>,
    /// Region code from verified localities ("AL", "ON", ...).
    pub by_region: BTreeMap<String, usize>,
    pub jurisdictions_with_stations: usize,
    pub empty_jurisdictions: usize,
    pub low_confidence: usize,
}

pub fn stats(dir: &Directory, terminal_bucket: &str) -> Stats {
    let mut s = Stats::default();
    for tier in ServiceTier::ALL {
        s.by_tier.insert(tier.as_str(), 0);
    }
    s.terminals = dir.terminals().count();
    for (label, section) in dir.iter() {
        if label == terminal_bucket {
            continue;
        }
        if section.records.is_empty() {
            s.empty_jurisdictions += 1;
        } else {
            s.jurisdictions_with_stations += 1;
        }
        for r in &section.records {
            s.stations += 1;
            *s.by_tier.entry(r.service_tier.as_str()).or_default() += 1;
            *s.by_brand.entry(r.brand.as_str()).or_default() += 1;
            if r.locality_confidence == LocalityConfidence::Low {
                s.low_confidence += 1;
            }
            if let Some(loc) = r.locality() {
                *s.by_region.entry(loc.region).or_default() += 1;
            }
        }
    }
    s
}

impl Stats {
    pub fn print(&self) {
        println!("Stations:       {}", self.stations);
        for (tier, n) in &self.by_tier {
            println!("  {:<12} {}", tier, n);
        }
        for (brand, n) in &self.by_brand {
            println!("  {:<12} {}", brand, n);
        }
        if !self.by_region.is_empty() {
            let regions: Vec<String> = self
                .by_region
                .iter()
                .map(|(region, n)| format!("{} {}", region, n))
                .collect();
            println!("  Regions:     {}", regions.join(", "));
        }
        println!("Terminals:      {}", self.terminals);
        println!(
            "Jurisdictions:  {} with stations, {} empty",
            self.jurisdictions_with_stations, self.empty_jurisdictions
        );
        println!("Low-confidence localities: {}", self.low_confidence);
    }
}

/// Why a jurisdiction's pages did or did not contribute records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageInspection {
    pub page: usize,
    pub has_marker: bool,
    pub ta: Vec<String>,
    pub petro: Vec<String>,
}

pub fn inspect(
    source: &dyn PageSource,
    tracker: &SectionTracker,
    name: &str,
    marker: &str,
) -> Result<Vec<PageInspection>> {
    let mut out = Vec::new();
    for index in 0..source.page_count() {
        let text = source.page_text(index)?;
        if !tracker.mentions(&text).iter().any(|m| m.eq_ignore_ascii_case(name)) {
            continue;
        }
        let (mut ta, mut petro) = (Vec::new(), Vec::new());
        for h in find_headers(&text) {
            match h.brand {
                Brand::Ta => ta.push(h.identifier),
                Brand::Petro => petro.push(h.identifier),
            }
        }
        out.push(PageInspection {
            page: index + 1,
            has_marker: text.contains(marker),
            ta,
            petro,
        });
    }
    Ok(out)
}

pub fn print_inspection(name: &str, pages: &[PageInspection]) {
    if pages.is_empty() {
        println!("{} does not appear on any page.", name);
        return;
    }
    let listed: Vec<String> = pages.iter().map(|p| p.page.to_string()).collect();
    println!("{} appears on pages: {}", name, listed.join(", "));
    for p in pages {
        println!(
            "  page {:>4}: marker {:<3} | TA {:>2} {:?} | PETRO {:>2} {:?}",
            p.page,
            if p.has_marker { "yes" } else { "no" },
            p.ta.len(),
            p.ta,
            p.petro.len(),
            p.petro,
        );
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Settings, DEFAULT_SECTION_MARKER, DEFAULT_TERMINAL_BUCKET};
    use crate::parser::Extractor;
    use crate::source::FormFeedDump;

    fn directory() -> Directory {
        let mut ex = Extractor::new(&Settings::default()).unwrap();
        ex.process_page(1, "ALABAMA\nSITE TYPE KEY\n#348 PETRO Shorter ★\n428 Main Street\nShorter, AL 36075");
        ex.process_page(2, "#016 TA Tuscaloosa\n● Limited\nButtermilk Road\nCottondale AL");
        ex.process_page(3, "ALASKA\nSITE TYPE KEY");
        ex.finish()
    }

    #[test]
    fn stats_counts() {
        let s = stats(&directory(), DEFAULT_TERMINAL_BUCKET);
        assert_eq!(s.stations, 2);
        assert_eq!(s.by_tier["Exclusive"], 1);
        assert_eq!(s.by_tier["Limited"], 1);
        assert_eq!(s.by_tier["Unknown"], 0);
        assert_eq!(s.by_brand["PETRO"], 1);
        assert_eq!(s.jurisdictions_with_stations, 1);
        assert_eq!(s.empty_jurisdictions, 1);
        assert_eq!(s.low_confidence, 1);
        assert_eq!(s.by_region.get("AL"), Some(&1));
        assert_eq!(s.by_region.len(), 1);
        assert_eq!(s.terminals, 0);
    }

    #[test]
    fn overview_filters() {
        let dir = directory();
        let all = overview_rows(&dir, &OverviewFilter { limit: 50, ..Default::default() });
        assert_eq!(all.len(), 2);
        let ta = overview_rows(
            &dir,
            &OverviewFilter {
                brand: Some("ta".into()),
                limit: 50,
                ..Default::default()
            },
        );
        assert_eq!(ta.len(), 1);
        assert_eq!(ta[0].identifier, "016");
        let exclusive = overview_rows(
            &dir,
            &OverviewFilter {
                tier: Some("exclusive".into()),
                jurisdiction: Some("alabama".into()),
                limit: 50,
                ..Default::default()
            },
        );
        assert_eq!(exclusive.len(), 1);
        let limited = overview_rows(&dir, &OverviewFilter { limit: 1, ..Default::default() });
        assert_eq!(limited.len(), 1);
    }

    #[test]
    fn inspect_lists_pages_and_brands() {
        let dump = FormFeedDump::from_text(
            "ALABAMA\nSITE TYPE KEY\n#348 PETRO Shorter\n#016 TA Tuscaloosa\x0cnothing\x0cALABAMA map legend",
        );
        let tracker =
            SectionTracker::new(&Settings::default().jurisdictions(), DEFAULT_SECTION_MARKER).unwrap();
        let pages = inspect(&dump, &tracker, "ALABAMA", DEFAULT_SECTION_MARKER).unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].page, 1);
        assert!(pages[0].has_marker);
        assert_eq!(pages[0].ta, vec!["016"]);
        assert_eq!(pages[0].petro, vec!["348"]);
        assert_eq!(pages[1].page, 3);
        assert!(!pages[1].has_marker);
    }

    #[test]
    fn truncate_long_names() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("#348 PETRO Shorter Alabama", 10), "#348 PE...");
    }
}
