use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::region::{normalize_text, Region, RegionCode, RegionRecord};

/// Maximum number of names carried by [`Error::RegionNotFound`].
pub const MAX_SUGGESTIONS: usize = 5;

/// Minimum Jaro-Winkler similarity for a name to be offered as a suggestion.
const SIMILARITY_THRESHOLD: f64 = 0.75;

/// How an identifier was matched to a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Code,
    Name,
    Fuzzy,
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            MatchKind::Code => "code",
            MatchKind::Name => "name",
            MatchKind::Fuzzy => "fuzzy",
        };
        f.write_str(value)
    }
}

/// A resolved identifier together with the rule that matched it.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Resolution<'a> {
    pub region: &'a Region,
    pub matched_by: MatchKind,
}

/// Canonical region records keyed by code, populated once.
///
/// Regions keep their insertion order, which is the order used by name
/// lookups and searches; the first match in that order wins.
#[derive(Debug, Default)]
pub struct RegionRegistry {
    regions: Vec<Region>,
    index: HashMap<RegionCode, usize>,
    initialized: bool,
}

impl RegionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate the registry from region rows and the code → neighbors map.
    ///
    /// Every adjacency key and every neighbor must name a declared region.
    /// Fails with [`Error::AlreadyInitialized`] unless [`reset`](Self::reset)
    /// was called first.
    pub fn initialize(
        &mut self,
        records: Vec<RegionRecord>,
        adjacency: &HashMap<RegionCode, Vec<RegionCode>>,
    ) -> Result<()> {
        if self.initialized {
            return Err(Error::AlreadyInitialized);
        }

        let mut regions = Vec::with_capacity(records.len());
        let mut index = HashMap::with_capacity(records.len());
        for record in records {
            let code = record.code.trim().to_string();
            let neighbors = adjacency.get(&code).cloned().unwrap_or_default();
            let region = Region::from_record(record, neighbors)?;
            if index.contains_key(&region.code) {
                return Err(Error::DuplicateRegion { code: region.code });
            }
            index.insert(region.code.clone(), regions.len());
            regions.push(region);
        }

        let mut keys: Vec<&RegionCode> = adjacency.keys().collect();
        keys.sort();
        for key in keys {
            if !index.contains_key(key) {
                return Err(Error::UnknownAdjacencyKey { code: key.clone() });
            }
        }
        for region in &regions {
            for neighbor in &region.neighbors {
                if !index.contains_key(neighbor) {
                    return Err(Error::UnknownNeighbor {
                        code: region.code.clone(),
                        neighbor: neighbor.clone(),
                    });
                }
            }
        }

        debug!(regions = regions.len(), "region registry initialized");
        self.regions = regions;
        self.index = index;
        self.initialized = true;
        Ok(())
    }

    /// Clear all records so the registry can be initialized again.
    pub fn reset(&mut self) {
        self.regions.clear();
        self.index.clear();
        self.initialized = false;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn count(&self) -> usize {
        self.regions.len()
    }

    /// All regions in insertion order.
    pub fn all(&self) -> Result<&[Region]> {
        self.ensure_initialized()?;
        Ok(&self.regions)
    }

    /// Exact code lookup. Purely numeric input shorter than two digits is
    /// zero-padded, so `"1"` finds `"01"`.
    pub fn get_by_code(&self, code: &str) -> Result<Option<&Region>> {
        self.ensure_initialized()?;
        let code = code.trim();
        let padded = if !code.is_empty() && code.bytes().all(|b| b.is_ascii_digit()) {
            format!("{code:0>2}")
        } else {
            code.to_string()
        };
        Ok(self.index.get(&padded).map(|&idx| &self.regions[idx]))
    }

    /// Name lookup against short and full names after normalization.
    ///
    /// With `fuzzy`, falls back to substring containment when no exact
    /// normalized match exists.
    pub fn get_by_name(&self, name: &str, fuzzy: bool) -> Result<Option<&Region>> {
        Ok(self.lookup_name(name, fuzzy)?.map(|(region, _)| region))
    }

    /// Regions whose normalized name or full name contains `query`, in
    /// insertion order, capped at `limit`. An empty query matches every region.
    pub fn search(&self, query: &str, limit: Option<usize>) -> Result<Vec<&Region>> {
        self.ensure_initialized()?;
        let needle = normalize_text(query);
        let limit = limit.unwrap_or(usize::MAX);
        Ok(self
            .regions
            .iter()
            .filter(|region| contains_normalized(region, &needle))
            .take(limit)
            .collect())
    }

    /// Resolve an identifier to exactly one region.
    pub fn resolve(&self, identifier: &str, fuzzy: bool) -> Result<&Region> {
        self.resolve_match(identifier, fuzzy)
            .map(|resolution| resolution.region)
    }

    /// Resolve an identifier, reporting which rule matched.
    ///
    /// Tries an exact code, then an exact normalized name, then (with `fuzzy`)
    /// substring containment. Fails with [`Error::RegionNotFound`] carrying
    /// ranked suggestions.
    pub fn resolve_match(&self, identifier: &str, fuzzy: bool) -> Result<Resolution<'_>> {
        self.ensure_initialized()?;
        let trimmed = identifier.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidInput {
                field: "identifier".to_string(),
                message: "must not be empty".to_string(),
                value: Some(identifier.to_string()),
            });
        }

        if let Some(region) = self.get_by_code(trimmed)? {
            return Ok(Resolution {
                region,
                matched_by: MatchKind::Code,
            });
        }

        if let Some((region, matched_by)) = self.lookup_name(trimmed, fuzzy)? {
            return Ok(Resolution { region, matched_by });
        }

        Err(Error::RegionNotFound {
            identifier: trimmed.to_string(),
            suggestions: self.suggestions(trimmed, MAX_SUGGESTIONS)?,
        })
    }

    /// Names to offer when `query` could not be resolved.
    ///
    /// Substring matches come first in insertion order, then names ranked by
    /// Jaro-Winkler similarity over normalized text.
    pub fn suggestions(&self, query: &str, limit: usize) -> Result<Vec<String>> {
        let mut names: Vec<String> = self
            .search(query, Some(limit))?
            .into_iter()
            .map(|region| region.name.clone())
            .collect();
        if names.len() >= limit {
            return Ok(names);
        }

        let needle = normalize_text(query);
        let mut scored: Vec<(f64, &Region)> = self
            .regions
            .iter()
            .map(|region| {
                let by_name = strsim::jaro_winkler(&needle, region.normalized_name());
                let by_full = strsim::jaro_winkler(&needle, region.normalized_full_name());
                (by_name.max(by_full), region)
            })
            .filter(|(score, _)| *score > SIMILARITY_THRESHOLD)
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.code.cmp(&b.1.code)));

        for (_, region) in scored {
            if names.len() >= limit {
                break;
            }
            if !names.contains(&region.name) {
                names.push(region.name.clone());
            }
        }
        Ok(names)
    }

    fn lookup_name(&self, name: &str, fuzzy: bool) -> Result<Option<(&Region, MatchKind)>> {
        self.ensure_initialized()?;
        let needle = normalize_text(name);
        if needle.is_empty() {
            return Ok(None);
        }

        let exact = self.regions.iter().find(|region| {
            region.normalized_name() == needle || region.normalized_full_name() == needle
        });
        if let Some(region) = exact {
            return Ok(Some((region, MatchKind::Name)));
        }

        if fuzzy {
            if let Some(region) = self
                .regions
                .iter()
                .find(|region| contains_normalized(region, &needle))
            {
                return Ok(Some((region, MatchKind::Fuzzy)));
            }
        }

        Ok(None)
    }

    fn ensure_initialized(&self) -> Result<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(Error::NotInitialized)
        }
    }
}

fn contains_normalized(region: &Region, needle: &str) -> bool {
    region.normalized_name().contains(needle) || region.normalized_full_name().contains(needle)
}
