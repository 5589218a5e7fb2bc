use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::parser::patterns::LOCALITY_PARTS_RE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Brand {
    #[serde(rename = "TA")]
    Ta,
    #[serde(rename = "PETRO")]
    Petro,
}

impl Brand {
    pub fn parse(token: &str) -> Option<Brand> {
        match token.trim().to_uppercase().as_str() {
            "TA" => Some(Brand::Ta),
            "PETRO" => Some(Brand::Petro),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Brand::Ta => "TA",
            Brand::Petro => "PETRO",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceTier {
    Exclusive,
    Primary,
    Limited,
    Unknown,
}

impl ServiceTier {
    pub const ALL: [ServiceTier; 4] = [
        ServiceTier::Exclusive,
        ServiceTier::Primary,
        ServiceTier::Limited,
        ServiceTier::Unknown,
    ];

    /// Map a free-form label ("Exclusive Site", "primary") onto a tier.
    pub fn from_label(label: &str) -> ServiceTier {
        let lower = label.to_lowercase();
        if lower.contains("exclusive") {
            ServiceTier::Exclusive
        } else if lower.contains("primary") {
            ServiceTier::Primary
        } else if lower.contains("limited") {
            ServiceTier::Limited
        } else {
            ServiceTier::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceTier::Exclusive => "Exclusive",
            ServiceTier::Primary => "Primary",
            ServiceTier::Limited => "Limited",
            ServiceTier::Unknown => "Unknown",
        }
    }
}

/// Whether `locality_region_postal` was confirmed by the format test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalityConfidence {
    #[default]
    Verified,
    /// Neither candidate passed; the best guess sits in `unverified_locality`.
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub identifier: String,
    pub brand: Brand,
    pub raw_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locality_region_postal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unverified_locality: Option<String>,
    #[serde(default)]
    pub locality_confidence: LocalityConfidence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fax: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    pub service_tier: ServiceTier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_page: Option<usize>,
    pub jurisdiction: String,
}

impl Record {
    pub fn locality(&self) -> Option<Locality> {
        self.locality_region_postal.as_deref().and_then(Locality::parse)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminalRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub amenities: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub showers: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shop: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parking_capacity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_page: Option<usize>,
}

/// "City, ST 12345" split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locality {
    pub city: String,
    pub region: String,
    pub postal: String,
}

impl Locality {
    pub fn parse(text: &str) -> Option<Locality> {
        let caps = LOCALITY_PARTS_RE.captures(text)?;
        Some(Locality {
            city: caps[1].trim().to_string(),
            region: caps[2].to_string(),
            postal: caps[3].to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(default)]
    pub records: Vec<Record>,
    #[serde(default)]
    pub terminals: Vec<TerminalRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_page: Option<usize>,
}

/// Jurisdiction label → section, in first-encounter order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Directory {
    entries: Vec<(String, Section)>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the section for `label`, appending an empty one if absent.
    pub fn section_mut(&mut self, label: &str) -> &mut Section {
        let idx = match self.entries.iter().position(|(k, _)| k == label) {
            Some(i) => i,
            None => {
                self.entries.push((label.to_string(), Section::default()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx].1
    }

    pub fn get(&self, label: &str) -> Option<&Section> {
        self.entries.iter().find(|(k, _)| k == label).map(|(_, s)| s)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Section)> {
        self.entries.iter().map(|(k, s)| (k.as_str(), s))
    }

    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.entries.iter().flat_map(|(_, s)| &s.records)
    }

    pub fn terminals(&self) -> impl Iterator<Item = &TerminalRecord> {
        self.entries.iter().flat_map(|(_, s)| &s.terminals)
    }
}

impl Serialize for Directory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, section) in &self.entries {
            map.serialize_entry(label, section)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Directory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DirectoryVisitor;

        impl<'de> Visitor<'de> for DirectoryVisitor {
            type Value = Directory;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of jurisdiction label to section")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Directory, A::Error> {
                let mut entries: Vec<(String, Section)> = Vec::new();
                while let Some((label, section)) = access.next_entry::<String, Section>()? {
                    match entries.iter_mut().find(|(k, _)| *k == label) {
                        Some(existing) => existing.1 = section,
                        None => entries.push((label, section)),
                    }
                }
                Ok(Directory { entries })
            }
        }

        deserializer.deserialize_map(DirectoryVisitor)
    }
}
