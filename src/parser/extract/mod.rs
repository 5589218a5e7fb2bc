pub mod station;
pub mod terminal;

use crate::directory::ServiceTier;
use crate::parser::patterns::{EXCLUSIVE_GLYPH, TIER_GLYPH};

/// ★ marks an exclusive site; ● marks a primary or limited one, spelled out
/// nearby. No glyph means the tier is unknown.
pub fn tier_from_glyphs(span: &str) -> ServiceTier {
    if span.contains(EXCLUSIVE_GLYPH) {
        ServiceTier::Exclusive
    } else if span.contains(TIER_GLYPH) {
        if span.contains("Primary") {
            ServiceTier::Primary
        } else if span.contains("Limited") {
            ServiceTier::Limited
        } else {
            ServiceTier::Primary
        }
    } else {
        ServiceTier::Unknown
    }
}
