use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::config::Settings;
use crate::directory::{Brand, Directory, Record, ServiceTier, TerminalRecord};
use crate::error::{ExtractError, Result};
use crate::parser::extract::tier_from_glyphs;
use crate::parser::locality::{classify, Candidates};
use crate::parser::patterns::{
    squash_whitespace, BRAND_IN_NAME_RE, ID_IN_NAME_RE, LABEL_MARKER_RE, TERMINALS_HEADING_RE,
};

struct Selectors {
    state_section: Selector,
    state_label: Selector,
    station_card: Selector,
    station_name: Selector,
    brand_badge: Selector,
    site_type: Selector,
    station_details: Selector,
    div: Selector,
    heading: Selector,
    terminal_card: Selector,
    terminal_name: Selector,
    terminal_details: Selector,
}

impl Selectors {
    fn new() -> Result<Self> {
        Ok(Selectors {
            state_section: selector("div.state-section")?,
            state_label: selector("div.state-header span")?,
            station_card: selector("div.station-card")?,
            station_name: selector("div.station-name")?,
            brand_badge: selector("div.brand-badge")?,
            site_type: selector("div.site-type")?,
            station_details: selector("div.station-details")?,
            div: selector("div")?,
            heading: selector("h2")?,
            terminal_card: selector("div.terminal-card")?,
            terminal_name: selector("div.terminal-name")?,
            terminal_details: selector("div.terminal-details")?,
        })
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ExtractError::Selector {
        selector: css.to_string(),
        message: format!("{:?}", e),
    })
}

fn text_of(el: ElementRef<'_>) -> String {
    squash_whitespace(&el.text().collect::<String>())
}

fn first_text(scope: ElementRef<'_>, sel: &Selector) -> Option<String> {
    scope
        .select(sel)
        .next()
        .map(text_of)
        .filter(|t| !t.is_empty())
}

/// `Label: value` rows inside a details block.
#[derive(Debug, Default)]
struct Details {
    address: Option<String>,
    location: Option<String>,
    exit: Option<String>,
    phone: Option<String>,
    fax: Option<String>,
    navigo: Option<String>,
}

impl Details {
    fn read(block: ElementRef<'_>, div: &Selector) -> Details {
        let mut d = Details::default();
        for row in block.select(div) {
            let text = text_of(row);
            let value = |prefix: &str| text.strip_prefix(prefix).map(|v| v.trim().to_string());
            if let Some(v) = value("Address:") {
                d.address = Some(v);
            } else if let Some(v) = value("Location:") {
                d.location = Some(v);
            } else if let Some(v) = value("Exit:") {
                d.exit = Some(v);
            } else if let Some(v) = value("Phone:") {
                d.phone = Some(v);
            } else if let Some(v) = value("Fax:") {
                d.fax = Some(v);
            } else if let Some(v) = value("NaviGo ID:") {
                d.navigo = Some(v);
            }
        }
        d
    }
}

/// Build a [`Directory`] from the review HTML. Same shape as the text path.
pub fn extract_html(html: &str, settings: &Settings) -> Result<Directory> {
    let sel = Selectors::new()?;
    let document = Html::parse_document(html);
    let mut directory = Directory::new();

    for section in document.select(&sel.state_section) {
        let Some(raw_label) = first_text(section, &sel.state_label) else {
            continue;
        };
        let label = LABEL_MARKER_RE.replace(&raw_label, "").trim().to_string();
        if label.is_empty() || label.to_uppercase().contains("COVENANT") {
            continue;
        }

        let records: Vec<Record> = section
            .select(&sel.station_card)
            .filter_map(|card| station_card(card, &label, &sel))
            .collect();
        debug!(jurisdiction = %label, records = records.len(), "state section");
        directory.section_mut(&label).records.extend(records);
    }

    let terminals = terminal_cards(&document, &sel);
    directory
        .section_mut(&settings.terminal_bucket)
        .terminals
        .extend(terminals);
    Ok(directory)
}

fn station_card(card: ElementRef<'_>, jurisdiction: &str, sel: &Selectors) -> Option<Record> {
    let Some(name) = first_text(card, &sel.station_name) else {
        debug!(jurisdiction, "station card without a name, skipped");
        return None;
    };
    let identifier = ID_IN_NAME_RE.captures(&name).map(|c| c[1].to_string());
    let brand = first_text(card, &sel.brand_badge)
        .and_then(|b| Brand::parse(&b))
        .or_else(|| {
            BRAND_IN_NAME_RE
                .captures(&name)
                .and_then(|c| Brand::parse(&c[1]))
        });
    let (Some(identifier), Some(brand)) = (identifier, brand) else {
        debug!(jurisdiction, name = %name, "station card without identifier or brand, skipped");
        return None;
    };

    let service_tier = match first_text(card, &sel.site_type).map(|t| ServiceTier::from_label(&t)) {
        Some(tier) if tier != ServiceTier::Unknown => tier,
        _ => tier_from_glyphs(&text_of(card)),
    };

    let details = card
        .select(&sel.station_details)
        .next()
        .map(|block| Details::read(block, &sel.div))
        .unwrap_or_default();
    let assignment = classify(Candidates::Labeled {
        location: details.location.as_deref(),
        exit: details.exit.as_deref(),
        address: details.address.as_deref(),
    });

    let source_page = card
        .value()
        .attr("data-page")
        .and_then(|p| p.trim().parse::<usize>().ok());

    Some(Record {
        identifier,
        brand,
        raw_name: name,
        street_address: assignment.street_address,
        locality_region_postal: assignment.locality_region_postal,
        unverified_locality: assignment.unverified_locality,
        locality_confidence: assignment.confidence,
        exit_info: assignment.exit_info,
        phone: details.phone,
        fax: details.fax,
        external_id: details.navigo,
        service_tier,
        source_page,
        jurisdiction: jurisdiction.to_string(),
    })
}

/// Terminal cards live in the `covenant-section` that follows the
/// "COVENANT ... TERMINALS" heading.
fn terminal_cards(document: &Html, sel: &Selectors) -> Vec<TerminalRecord> {
    let Some(heading) = document
        .select(&sel.heading)
        .find(|h| TERMINALS_HEADING_RE.is_match(&text_of(*h)))
    else {
        return Vec::new();
    };
    let Some(container) = heading
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "div" && el.value().classes().any(|c| c == "covenant-section"))
    else {
        return Vec::new();
    };

    container
        .select(&sel.terminal_card)
        .filter_map(|card| {
            let Some(name) = first_text(card, &sel.terminal_name) else {
                debug!("terminal card without a name, skipped");
                return None;
            };
            let details = card
                .select(&sel.terminal_details)
                .next()
                .map(|block| Details::read(block, &sel.div))
                .unwrap_or_default();
            Some(TerminalRecord {
                name,
                street_address: details.address,
                phone: details.phone,
                external_id: details.navigo,
                amenities: Vec::new(),
                showers: None,
                shop: None,
                parking_capacity: None,
                source_page: card
                    .value()
                    .attr("data-page")
                    .and_then(|p| p.trim().parse::<usize>().ok()),
            })
        })
        .collect()
}
