pub mod extract;
pub mod html;
pub mod locality;
pub mod patterns;
pub mod sections;
pub mod spans;

use tracing::debug;

use crate::config::Settings;
use crate::directory::{Directory, TerminalRecord};
use crate::error::Result;
use crate::source::PageSource;
use sections::SectionTracker;

/// What one page contributed, for progress and logging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageOutcome {
    pub page: usize,
    /// Set when this page is a jurisdiction header page.
    pub header: Option<String>,
    pub records: usize,
    /// Record headers seen before any jurisdiction was established.
    pub dropped: usize,
    pub terminal: bool,
}

/// Page-by-page builder of one [`Directory`].
///
/// Pages must be fed in document order: the current jurisdiction is carried
/// forward from the last header page.
pub struct Extractor {
    settings: Settings,
    tracker: SectionTracker,
    directory: Directory,
    terminals: Vec<TerminalRecord>,
}

impl Extractor {
    pub fn new(settings: &Settings) -> Result<Self> {
        let tracker = SectionTracker::new(&settings.jurisdictions(), &settings.section_marker)?;
        Ok(Extractor {
            settings: settings.clone(),
            tracker,
            directory: Directory::new(),
            terminals: Vec::new(),
        })
    }

    /// Process one page; `page` is 1-based.
    pub fn process_page(&mut self, page: usize, text: &str) -> PageOutcome {
        let mut outcome = PageOutcome {
            page,
            ..PageOutcome::default()
        };

        if self.settings.terminal_pages().contains(&page) && text.contains(&self.settings.terminal_marker) {
            match extract::terminal::extract(text, page, &self.settings.terminal_marker) {
                Some(t) => {
                    self.terminals.push(t);
                    outcome.terminal = true;
                }
                None => debug!(page, "terminal block without a name, skipped"),
            }
        }

        if let Some(label) = self.tracker.observe(text) {
            let label = label.to_string();
            let section = self.directory.section_mut(&label);
            section.header_page.get_or_insert(page);
            outcome.header = Some(label);
        }

        let headers = patterns::find_headers(text);
        if headers.is_empty() {
            return outcome;
        }
        let Some(jurisdiction) = self.tracker.current().map(str::to_string) else {
            debug!(page, count = headers.len(), "record headers before any jurisdiction, dropped");
            outcome.dropped = headers.len();
            return outcome;
        };

        let spans = spans::split_spans(text, &headers);
        let section = self.directory.section_mut(&jurisdiction);
        for (header, span) in headers.iter().zip(spans) {
            let record = extract::station::build(&text[span], header, &jurisdiction, page);
            section.records.push(record);
        }
        outcome.records = headers.len();
        outcome
    }

    /// Close the run: the terminal bucket is always the last key.
    pub fn finish(mut self) -> Directory {
        let bucket = self.directory.section_mut(&self.settings.terminal_bucket);
        bucket.terminals.append(&mut self.terminals);
        self.directory
    }
}

/// Run the text pipeline over every page of `source`, in order.
pub fn extract_pages(
    source: &dyn PageSource,
    settings: &Settings,
    mut on_page: impl FnMut(&PageOutcome),
) -> Result<Directory> {
    let mut extractor = Extractor::new(settings)?;
    for index in 0..source.page_count() {
        let text = source.page_text(index)?;
        let outcome = extractor.process_page(index + 1, &text);
        on_page(&outcome);
    }
    Ok(extractor.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{Brand, ServiceTier};
    use crate::source::FormFeedDump;

    fn run(pages: &[&str]) -> Directory {
        let mut ex = Extractor::new(&Settings::default()).unwrap();
        for (i, text) in pages.iter().enumerate() {
            ex.process_page(i + 1, text);
        }
        ex.finish()
    }

    #[test]
    fn header_page_without_records_then_sticky() {
        let dir = run(&[
            "ALABAMA\nSITE TYPE KEY\n★ Exclusive  ● Primary/Limited",
            "#348 PETRO Shorter\n428 Main Street\nShorter, AL 36075\n",
        ]);
        let alabama = dir.get("ALABAMA").unwrap();
        assert_eq!(alabama.header_page, Some(1));
        assert_eq!(alabama.records.len(), 1);
        assert_eq!(alabama.records[0].jurisdiction, "ALABAMA");
        assert_eq!(alabama.records[0].source_page, Some(2));
    }

    #[test]
    fn empty_header_page_creates_bucket() {
        let dir = run(&["ALABAMA\nSITE TYPE KEY"]);
        assert_eq!(dir.get("ALABAMA").unwrap().records.len(), 0);
    }

    #[test]
    fn headers_before_any_jurisdiction_are_dropped() {
        let mut ex = Extractor::new(&Settings::default()).unwrap();
        let outcome = ex.process_page(1, "#001 TA Nowhere\n1 Road\nTown, AL 35000");
        assert_eq!(outcome.dropped, 1);
        assert_eq!(outcome.records, 0);
        let dir = ex.finish();
        assert_eq!(dir.records().count(), 0);
    }

    #[test]
    fn records_go_to_jurisdiction_current_at_their_page() {
        let dir = run(&[
            "ALABAMA\nSITE TYPE KEY\n#348 PETRO Shorter\nShorter, AL 36075",
            "ARIZONA\nSITE TYPE KEY\n#100 TA Phoenix\nPhoenix, AZ 85001",
            "#101 TA Tucson\nTucson, AZ 85701",
        ]);
        let al: Vec<&str> = dir.get("ALABAMA").unwrap().records.iter().map(|r| r.identifier.as_str()).collect();
        let az: Vec<&str> = dir.get("ARIZONA").unwrap().records.iter().map(|r| r.identifier.as_str()).collect();
        assert_eq!(al, vec!["348"]);
        assert_eq!(az, vec!["100", "101"]);
    }

    #[test]
    fn terminal_bucket_is_last_and_window_limited() {
        let mut settings = Settings::default();
        settings.terminal_first_page = 2;
        settings.terminal_last_page = 3;
        let mut ex = Extractor::new(&settings).unwrap();
        ex.process_page(1, "Covenant Logistics: Outside Window");
        ex.process_page(2, "Covenant Logistics: Chattanooga\nPhone: (423) 821-1212");
        ex.process_page(3, "Phone: (423) 000-0000\nno name here");
        ex.process_page(4, "ALABAMA\nSITE TYPE KEY");
        let dir = ex.finish();
        let labels: Vec<&str> = dir.labels().collect();
        assert_eq!(labels, vec!["ALABAMA", "COVENANT_TERMINALS"]);
        let terminals = &dir.get("COVENANT_TERMINALS").unwrap().terminals;
        assert_eq!(terminals.len(), 1);
        assert_eq!(terminals[0].name, "Covenant Logistics: Chattanooga");
    }

    #[test]
    fn nameless_terminal_does_not_stop_later_blocks() {
        let mut settings = Settings::default();
        settings.terminal_first_page = 1;
        let mut ex = Extractor::new(&settings).unwrap();
        let first = ex.process_page(1, "Covenant Logistics:\nPhone: (423) 821-1212\n");
        let second = ex.process_page(2, "Covenant Logistics: Dallas\nSHOWERS: YES");
        assert!(!first.terminal);
        assert!(second.terminal);
        let dir = ex.finish();
        let terminals = &dir.get("COVENANT_TERMINALS").unwrap().terminals;
        assert_eq!(terminals.len(), 1);
        assert_eq!(terminals[0].name, "Covenant Logistics: Dallas");
    }

    #[test]
    fn fixture_book() {
        let dump = FormFeedDump::open("tests/fixtures/fuel_book.txt").unwrap();
        let mut settings = Settings::default();
        settings.terminal_first_page = 1;
        settings.terminal_last_page = 2;
        let dir = extract_pages(&dump, &settings, |_| {}).unwrap();

        let labels: Vec<&str> = dir.labels().collect();
        assert_eq!(labels, vec!["ALABAMA", "ARIZONA", "COVENANT_TERMINALS"]);

        let alabama = dir.get("ALABAMA").unwrap();
        assert_eq!(alabama.records.len(), 4);
        let shorter = alabama.records.iter().find(|r| r.identifier == "348").unwrap();
        assert_eq!(shorter.brand, Brand::Petro);
        assert_eq!(shorter.street_address.as_deref(), Some("428 Main Street"));
        assert_eq!(shorter.locality_region_postal.as_deref(), Some("Shorter, AL 36075"));
        assert_eq!(shorter.service_tier, ServiceTier::Exclusive);

        let tuscaloosa = alabama.records.iter().find(|r| r.identifier == "016").unwrap();
        assert_eq!(tuscaloosa.street_address.as_deref(), Some("3501 Buttermilk Road"));
        assert_eq!(tuscaloosa.locality_region_postal.as_deref(), Some("Cottondale, AL 35453"));
        assert_eq!(tuscaloosa.service_tier, ServiceTier::Limited);

        let terminals = &dir.get("COVENANT_TERMINALS").unwrap().terminals;
        assert_eq!(terminals.len(), 1);

        for (_, section) in dir.iter() {
            for r in &section.records {
                assert!(r.source_page >= section.header_page);
                if let (Some(street), Some(loc)) = (&r.street_address, &r.locality_region_postal) {
                    assert_ne!(street, loc);
                }
            }
        }
    }
}
