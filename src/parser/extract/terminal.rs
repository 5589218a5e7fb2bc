use crate::directory::TerminalRecord;
use crate::parser::patterns::{
    capture, squash_whitespace, AMENITIES_MARKER, PARKING_RE, SHOP_RE, SHOWERS_RE,
    TERMINAL_ADDRESS_RE, TERMINAL_NAVIGO_RE, TERMINAL_PHONE_RE,
};

/// Parse a terminal block page. `None` when the marker line names nothing.
pub fn extract(text: &str, page: usize, marker: &str) -> Option<TerminalRecord> {
    // A bare marker line carries no name.
    let name = text
        .lines()
        .find(|l| l.contains(marker))
        .map(str::trim)
        .filter(|l| !l.replacen(marker, "", 1).trim().is_empty())?
        .to_string();

    let street_address = TERMINAL_ADDRESS_RE
        .find(text)
        .map(|m| squash_whitespace(m.as_str()));

    let showers = text
        .contains("SHOWERS:")
        .then(|| capture(&SHOWERS_RE, text).unwrap_or_else(|| "NO".to_string()));
    let shop = text
        .contains("SHOP:")
        .then(|| capture(&SHOP_RE, text).unwrap_or_else(|| "NO".to_string()));
    let parking_capacity = text.contains("PARKING SPOTS:").then(|| {
        capture(&PARKING_RE, text)
            .and_then(|n| n.parse::<u32>().ok())
            .unwrap_or(0)
    });

    Some(TerminalRecord {
        name,
        street_address,
        phone: capture(&TERMINAL_PHONE_RE, text),
        external_id: capture(&TERMINAL_NAVIGO_RE, text),
        amenities: amenities(text),
        showers,
        shop,
        parking_capacity,
        source_page: Some(page),
    })
}

/// Bulleted lines after the AMENITIES marker, up to the first non-bullet line.
fn amenities(text: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut lines = text.lines().skip_while(|l| !l.contains(AMENITIES_MARKER));
    if lines.next().is_none() {
        return items;
    }
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match line.strip_prefix('-') {
            Some(item) => items.push(item.trim().to_string()),
            None => break,
        }
    }
    items
}
