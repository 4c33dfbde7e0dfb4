use std::fmt;

use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::error::{Error, Result};

/// Two-digit administrative code, e.g. `"01"`.
pub type RegionCode = String;

/// Fold a display string into the form used for name comparisons.
///
/// Applies NFD decomposition, drops combining marks, folds `đ`/`Đ` to `d`,
/// lowercases, and trims surrounding whitespace.
pub fn normalize_text(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| match c {
            'đ' | 'Đ' => 'd',
            other => other,
        })
        .collect::<String>()
        .to_lowercase()
        .trim()
        .to_string()
}

/// Returns `true` when `code` is exactly two ASCII digits.
pub fn is_valid_code(code: &str) -> bool {
    code.len() == 2 && code.bytes().all(|b| b.is_ascii_digit())
}

/// Region row as stored in `provinces.json`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct RegionRecord {
    pub code: String,
    pub name: String,
    pub full_name: String,
    #[serde(default)]
    pub code_name: Option<String>,
    #[serde(default)]
    pub name_en: Option<String>,
    #[serde(default)]
    pub full_name_en: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// Canonical administrative region.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Region {
    pub code: RegionCode,
    pub name: String,
    pub full_name: String,
    pub code_name: Option<String>,
    pub name_en: Option<String>,
    pub full_name_en: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Declared adjacency from the source data, in source order.
    pub neighbors: Vec<RegionCode>,
    #[serde(skip)]
    normalized_name: String,
    #[serde(skip)]
    normalized_full_name: String,
}

impl Region {
    /// Build a region from a source record and its declared neighbors.
    pub fn from_record(record: RegionRecord, neighbors: Vec<RegionCode>) -> Result<Self> {
        let code = record.code.trim().to_string();
        if !is_valid_code(&code) {
            return Err(Error::InvalidRegion {
                code,
                message: "code must be exactly two digits".to_string(),
            });
        }
        if record.name.trim().is_empty() {
            return Err(Error::InvalidRegion {
                code,
                message: "name must not be blank".to_string(),
            });
        }
        if record.full_name.trim().is_empty() {
            return Err(Error::InvalidRegion {
                code,
                message: "full name must not be blank".to_string(),
            });
        }

        Ok(Self {
            normalized_name: normalize_text(&record.name),
            normalized_full_name: normalize_text(&record.full_name),
            code,
            name: record.name.trim().to_string(),
            full_name: record.full_name.trim().to_string(),
            code_name: record.code_name,
            name_en: record.name_en,
            full_name_en: record.full_name_en,
            latitude: record.latitude,
            longitude: record.longitude,
            neighbors,
        })
    }

    pub fn normalized_name(&self) -> &str {
        &self.normalized_name
    }

    pub fn normalized_full_name(&self) -> &str {
        &self.normalized_full_name
    }

    /// `(latitude, longitude)` when both are known.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(code: &str, name: &str) -> RegionRecord {
        RegionRecord {
            code: code.to_string(),
            name: name.to_string(),
            full_name: format!("Tỉnh {name}"),
            code_name: None,
            name_en: None,
            full_name_en: None,
            latitude: Some(21.0),
            longitude: Some(105.8),
        }
    }

    #[test]
    fn normalize_strips_diacritics_and_case() {
        assert_eq!(normalize_text("  Hà Nội "), "ha noi");
        assert_eq!(normalize_text("Thừa Thiên Huế"), "thua thien hue");
    }

    #[test]
    fn normalize_folds_d_with_stroke() {
        assert_eq!(normalize_text("Đà Nẵng"), "da nang");
        assert_eq!(normalize_text("Điện Biên"), "dien bien");
    }

    #[test]
    fn code_validation_requires_two_digits() {
        assert!(is_valid_code("01"));
        assert!(!is_valid_code("1"));
        assert!(!is_valid_code("001"));
        assert!(!is_valid_code("a1"));
    }

    #[test]
    fn from_record_rejects_bad_code_and_blank_name() {
        assert!(matches!(
            Region::from_record(record("1", "Hà Nội"), Vec::new()),
            Err(Error::InvalidRegion { .. })
        ));
        assert!(matches!(
            Region::from_record(record("01", "   "), Vec::new()),
            Err(Error::InvalidRegion { .. })
        ));
    }

    #[test]
    fn coordinates_require_both_components() {
        let mut rec = record("01", "Hà Nội");
        let region = Region::from_record(rec.clone(), Vec::new()).expect("valid");
        assert_eq!(region.coordinates(), Some((21.0, 105.8)));

        rec.longitude = None;
        let region = Region::from_record(rec, Vec::new()).expect("valid");
        assert_eq!(region.coordinates(), None);
    }
}
