use std::sync::LazyLock;

use regex::Regex;

use crate::directory::Brand;

/// `#348 PETRO Shorter`: symbol, 3-digit identifier, brand, rest of line.
pub static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#(\d{3})[ \t]+(TA|PETRO|Petro)\b[^\n]*").unwrap());
pub static LOCALITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*[A-Z]{2}\s+\d{5}").unwrap());
pub static LOCALITY_PARTS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([^,]+),\s*([A-Z]{2})\s+(\d{5})").unwrap());

// Station contact fields
pub static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Ph:[ \t]*(\(\d{3}\)\s*\d{3}-\d{4})").unwrap());
pub static FAX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Fx:[ \t]*(\(\d{3}\)\s*\d{3}-\d{4})").unwrap());
pub static NAVIGO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"NaviGo:[ \t]*([A-Z0-9-]+)").unwrap());
pub static CONTACT_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(Ph|Fx|NaviGo):").unwrap());
/// Number half of a phone that wrapped after its area code.
pub static PHONE_TAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{3}-\d{4}$").unwrap());

// Terminal block fields
pub static TERMINAL_ADDRESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d+[ \t]+[^,\n]+(?:\n[^,\n]+)?,[ \t]*[A-Z]{2}[ \t]+\d{5}").unwrap()
});
pub static TERMINAL_PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Phone:[ \t]*(\(\d{3}\)\s*\d{3}-\d{4})").unwrap());
pub static TERMINAL_NAVIGO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"NAVIGO ID:[ \t]*([A-Z0-9-]+)").unwrap());
pub static SHOWERS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"SHOWERS:[ \t]*([A-Z0-9]+)").unwrap());
pub static SHOP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"SHOP:[ \t]*([A-Z]+)").unwrap());
pub static PARKING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"PARKING SPOTS:[ \t]*(\d+)").unwrap());

// Markup-tree labels
pub static ID_IN_NAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#(\d{3})").unwrap());
pub static BRAND_IN_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(TA|PETRO|Petro)\b").unwrap());
pub static LABEL_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:📍|❌|🇨🇦)\s*").unwrap());
pub static TERMINALS_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)COVENANT.*TERMINALS").unwrap());

pub const EXCLUSIVE_GLYPH: char = '★';
pub const TIER_GLYPH: char = '●';
pub const AMENITIES_MARKER: &str = "AMENITIES:";

/// One record header located in a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMatch {
    pub start: usize,
    /// End of the `#NNN BRAND` token; the next header is searched from here.
    pub token_end: usize,
    pub identifier: String,
    pub brand: Brand,
    pub raw_name: String,
}

pub fn find_headers(text: &str) -> Vec<HeaderMatch> {
    HEADER_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let brand_match = caps.get(2)?;
            Some(HeaderMatch {
                start: whole.start(),
                token_end: brand_match.end(),
                identifier: caps[1].to_string(),
                brand: Brand::parse(brand_match.as_str())?,
                raw_name: whole.as_str().trim().to_string(),
            })
        })
        .collect()
}

/// "City, ST 12345" shape: comma, 2-letter uppercase region, 5-digit code.
pub fn is_locality(text: &str) -> bool {
    LOCALITY_RE.is_match(text)
}

/// Group 1 of the first match, whitespace squashed (a wrapped phone
/// becomes one line).
pub fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text).map(|c| squash_whitespace(&c[1]))
}

/// Collapse internal whitespace (including line breaks) to single spaces.
pub fn squash_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
