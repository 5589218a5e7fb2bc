use crate::directory::LocalityConfidence;

use super::patterns::is_locality;

/// The two candidate fragments, supplied by whichever ingestion path found them.
#[derive(Debug, Clone, Copy)]
pub enum Candidates<'a> {
    /// Text pages: the first two non-header lines of a record span, in order.
    Lines {
        first: Option<&'a str>,
        second: Option<&'a str>,
    },
    /// Markup cards: explicitly labeled `Location:` / `Exit:` fragments plus
    /// the `Address:` value when the card has one.
    Labeled {
        location: Option<&'a str>,
        exit: Option<&'a str>,
        address: Option<&'a str>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Assignment {
    pub street_address: Option<String>,
    pub locality_region_postal: Option<String>,
    /// Best guess kept when no fragment passed the format test.
    pub unverified_locality: Option<String>,
    pub exit_info: Option<String>,
    pub confidence: LocalityConfidence,
}

/// Decide which fragment is "City, ST 12345" and which is the street line.
///
/// A fragment that passes the format test always wins the locality slot,
/// whatever its position. When neither passes, nothing is written to
/// `locality_region_postal`; the guess goes to `unverified_locality` and the
/// assignment is marked low confidence.
pub fn classify(candidates: Candidates<'_>) -> Assignment {
    let mut out = match candidates {
        Candidates::Lines { first, second } => {
            let (first, second) = (non_empty(first), non_empty(second));
            match (first, second) {
                (Some(l1), l2) if is_locality(l1) => Assignment {
                    locality_region_postal: Some(l1.to_string()),
                    street_address: l2.map(str::to_string),
                    ..Assignment::default()
                },
                (l1, Some(l2)) if is_locality(l2) => Assignment {
                    street_address: l1.map(str::to_string),
                    locality_region_postal: Some(l2.to_string()),
                    ..Assignment::default()
                },
                (l1, l2) => Assignment {
                    street_address: l1.map(str::to_string),
                    unverified_locality: l2.map(str::to_string),
                    confidence: LocalityConfidence::Low,
                    ..Assignment::default()
                },
            }
        }
        Candidates::Labeled {
            location,
            exit,
            address,
        } => {
            let (location, exit, address) = (non_empty(location), non_empty(exit), non_empty(address));
            if let Some(loc) = location.filter(|l| is_locality(l)) {
                Assignment {
                    street_address: address.map(str::to_string),
                    locality_region_postal: Some(loc.to_string()),
                    exit_info: exit.map(str::to_string),
                    ..Assignment::default()
                }
            } else if let Some(ex) = exit.filter(|e| is_locality(e)) {
                Assignment {
                    street_address: address.or(location).map(str::to_string),
                    locality_region_postal: Some(ex.to_string()),
                    ..Assignment::default()
                }
            } else {
                Assignment {
                    street_address: address.map(str::to_string),
                    unverified_locality: location.or(exit).map(str::to_string),
                    confidence: LocalityConfidence::Low,
                    ..Assignment::default()
                }
            }
        }
    };

    // A duplicated line must not end up as both street and locality.
    if out.street_address.is_some()
        && (out.street_address == out.locality_region_postal
            || out.street_address == out.unverified_locality)
    {
        out.street_address = None;
    }
    out
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}
