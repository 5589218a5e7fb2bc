use std::ops::RangeInclusive;
use std::path::Path;

use serde::Deserialize;

use crate::error::Result;

pub const DEFAULT_SECTION_MARKER: &str = "SITE TYPE KEY";
pub const DEFAULT_TERMINAL_MARKER: &str = "Covenant Logistics:";
pub const DEFAULT_TERMINAL_BUCKET: &str = "COVENANT_TERMINALS";

pub const US_STATES: &[&str] = &[
    "ALABAMA", "ALASKA", "ARIZONA", "ARKANSAS", "CALIFORNIA", "COLORADO",
    "CONNECTICUT", "DELAWARE", "FLORIDA", "GEORGIA", "HAWAII", "IDAHO",
    "ILLINOIS", "INDIANA", "IOWA", "KANSAS", "KENTUCKY", "LOUISIANA",
    "MAINE", "MARYLAND", "MASSACHUSETTS", "MICHIGAN", "MINNESOTA",
    "MISSISSIPPI", "MISSOURI", "MONTANA", "NEBRASKA", "NEVADA",
    "NEW HAMPSHIRE", "NEW JERSEY", "NEW MEXICO", "NEW YORK",
    "NORTH CAROLINA", "NORTH DAKOTA", "OHIO", "OKLAHOMA", "OREGON",
    "PENNSYLVANIA", "RHODE ISLAND", "SOUTH CAROLINA", "SOUTH DAKOTA",
    "TENNESSEE", "TEXAS", "UTAH", "VERMONT", "VIRGINIA", "WASHINGTON",
    "WEST VIRGINIA", "WISCONSIN", "WYOMING",
];

/// Extraction settings.
///
/// Layered as: built-in defaults, then `fuelbook.toml` (or an explicit
/// `--config` file), then `FUELBOOK_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Phrase that, together with a jurisdiction name, marks a header page.
    pub section_marker: String,
    /// Phrase that marks a terminal block page.
    pub terminal_marker: String,
    /// Directory key that holds terminal records.
    pub terminal_bucket: String,
    /// First page (1-based, inclusive) scanned for terminal blocks.
    pub terminal_first_page: usize,
    /// Last page (1-based, inclusive) scanned for terminal blocks.
    pub terminal_last_page: usize,
    /// Jurisdiction names recognised in addition to the US states.
    pub extra_jurisdictions: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            section_marker: DEFAULT_SECTION_MARKER.to_string(),
            terminal_marker: DEFAULT_TERMINAL_MARKER.to_string(),
            terminal_bucket: DEFAULT_TERMINAL_BUCKET.to_string(),
            terminal_first_page: 10,
            terminal_last_page: 20,
            extra_jurisdictions: Vec::new(),
        }
    }
}

impl Settings {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = ::config::Config::builder();
        builder = match path {
            Some(p) => builder.add_source(::config::File::from(p)),
            None => builder.add_source(::config::File::with_name("fuelbook").required(false)),
        };
        let settings = builder
            .add_source(
                ::config::Environment::with_prefix("FUELBOOK")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("extra_jurisdictions"),
            )
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    pub fn jurisdictions(&self) -> Vec<String> {
        US_STATES
            .iter()
            .map(|s| s.to_string())
            .chain(self.extra_jurisdictions.iter().map(|s| s.trim().to_uppercase()))
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Terminal window as 1-based page numbers.
    pub fn terminal_pages(&self) -> RangeInclusive<usize> {
        self.terminal_first_page..=self.terminal_last_page
    }
}
