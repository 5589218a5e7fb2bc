use crate::directory::Record;
use crate::parser::locality::{classify, Candidates};
use crate::parser::patterns::{
    capture, HeaderMatch, CONTACT_LINE_RE, EXCLUSIVE_GLYPH, FAX_RE, NAVIGO_RE, PHONE_RE,
    PHONE_TAIL_RE, TIER_GLYPH,
};

use super::tier_from_glyphs;

/// Build one record from its span (header line included).
pub fn build(span: &str, header: &HeaderMatch, jurisdiction: &str, page: usize) -> Record {
    // Contact lines and glyph legends are found by pattern, not by position.
    let lines: Vec<&str> = span
        .lines()
        .skip(1)
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .filter(|l| !CONTACT_LINE_RE.is_match(l) && !PHONE_TAIL_RE.is_match(l))
        .filter(|l| !l.starts_with(EXCLUSIVE_GLYPH) && !l.starts_with(TIER_GLYPH))
        .collect();

    let assignment = classify(Candidates::Lines {
        first: lines.first().copied(),
        second: lines.get(1).copied(),
    });

    Record {
        identifier: header.identifier.clone(),
        brand: header.brand,
        raw_name: header.raw_name.clone(),
        street_address: assignment.street_address,
        locality_region_postal: assignment.locality_region_postal,
        unverified_locality: assignment.unverified_locality,
        locality_confidence: assignment.confidence,
        exit_info: lines.get(2).map(|l| l.to_string()),
        phone: capture(&PHONE_RE, span),
        fax: capture(&FAX_RE, span),
        external_id: capture(&NAVIGO_RE, span),
        service_tier: tier_from_glyphs(span),
        source_page: Some(page),
        jurisdiction: jurisdiction.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{Brand, LocalityConfidence, ServiceTier};
    use crate::parser::patterns::find_headers;

    fn build_one(span: &str) -> Record {
        let header = find_headers(span).remove(0);
        build(span, &header, "ALABAMA", 22)
    }

    #[test]
    fn petro_shorter() {
        let r = build_one(
            "#348 PETRO Shorter\n428 Main Street\nShorter, AL 36075\nI-85, Exit 22\nPh: (334) 727-3354\n",
        );
        assert_eq!(r.identifier, "348");
        assert_eq!(r.brand, Brand::Petro);
        assert_eq!(r.raw_name, "#348 PETRO Shorter");
        assert_eq!(r.street_address.as_deref(), Some("428 Main Street"));
        assert_eq!(r.locality_region_postal.as_deref(), Some("Shorter, AL 36075"));
        assert_eq!(r.exit_info.as_deref(), Some("I-85, Exit 22"));
        assert_eq!(r.phone.as_deref(), Some("(334) 727-3354"));
        assert_eq!(r.fax, None);
        assert_eq!(r.source_page, Some(22));
        assert_eq!(r.jurisdiction, "ALABAMA");
    }

    #[test]
    fn petro_shorter_swapped() {
        let r = build_one("#348 PETRO Shorter\nShorter, AL 36075\n428 Main Street\n");
        assert_eq!(r.street_address.as_deref(), Some("428 Main Street"));
        assert_eq!(r.locality_region_postal.as_deref(), Some("Shorter, AL 36075"));
        assert_eq!(r.identifier, "348");
        assert_eq!(r.brand, Brand::Petro);
    }

    #[test]
    fn contact_fields_anywhere_in_span() {
        let r = build_one(
            "#016 TA Tuscaloosa\nNaviGo: TA-016\n3501 Buttermilk Road\nFx: (205) 554-0000\nCottondale, AL 35453\nPh: (205) 554-0215",
        );
        assert_eq!(r.street_address.as_deref(), Some("3501 Buttermilk Road"));
        assert_eq!(r.locality_region_postal.as_deref(), Some("Cottondale, AL 35453"));
        assert_eq!(r.external_id.as_deref(), Some("TA-016"));
        assert_eq!(r.fax.as_deref(), Some("(205) 554-0000"));
        assert_eq!(r.phone.as_deref(), Some("(205) 554-0215"));
        assert_eq!(r.exit_info, None);
    }

    #[test]
    fn empty_navigo_label_leaves_id_absent() {
        let r = build_one("#348 PETRO Shorter\n428 Main Street\nShorter, AL 36075\nNaviGo:\nPh: (334) 727-3354");
        assert_eq!(r.external_id, None);
        assert_eq!(r.phone.as_deref(), Some("(334) 727-3354"));
        assert_eq!(r.exit_info, None);
    }

    #[test]
    fn wrapped_phone_is_one_value_and_not_exit_info() {
        let r = build_one("#348 PETRO Shorter\n428 Main Street\nShorter, AL 36075\nPh: (334)\n727-3354");
        assert_eq!(r.phone.as_deref(), Some("(334) 727-3354"));
        assert_eq!(r.exit_info, None);
        assert_eq!(r.locality_region_postal.as_deref(), Some("Shorter, AL 36075"));
    }

    #[test]
    fn header_only_span() {
        let r = build_one("#016 TA Tuscaloosa\n");
        assert_eq!(r.identifier, "016");
        assert_eq!(r.street_address, None);
        assert_eq!(r.locality_region_postal, None);
        assert_eq!(r.unverified_locality, None);
        assert_eq!(r.service_tier, ServiceTier::Unknown);
    }

    #[test]
    fn ambiguous_lines_flagged() {
        let r = build_one("#016 TA Tuscaloosa\nButtermilk Road\nCottondale AL\n");
        assert_eq!(r.locality_confidence, LocalityConfidence::Low);
        assert_eq!(r.locality_region_postal, None);
        assert_eq!(r.unverified_locality.as_deref(), Some("Cottondale AL"));
    }

    #[test]
    fn glyph_lines_are_not_fields() {
        let r = build_one("#016 TA Tuscaloosa\n★\n3501 Buttermilk Road\nCottondale, AL 35453\n");
        assert_eq!(r.service_tier, ServiceTier::Exclusive);
        assert_eq!(r.street_address.as_deref(), Some("3501 Buttermilk Road"));
    }
}
