use super::switching::{SwitchingError, SwitchingWindow};
use serde::Deserialize;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Pair-specific coefficients of the repulsion `A·exp(−B·r)`.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct BuckinghamCoefficients {
    pub a: f64,
    pub b: f64,
}

impl BuckinghamCoefficients {
    pub fn new(a: f64, b: f64) -> Self {
        Self { a, b }
    }
}

/// One site of one monomer type, e.g. the oxygen (site 0) of `h2o`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SiteKey {
    pub monomer_id: String,
    pub site: usize,
}

impl SiteKey {
    pub fn new(monomer_id: &str, site: usize) -> Self {
        Self {
            monomer_id: monomer_id.to_string(),
            site,
        }
    }
}

impl fmt::Display for SiteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.monomer_id, self.site)
    }
}

/// An unordered pair of sites, stored with the smaller [`SiteKey`] first.
///
/// Building the key for `(x, y)` and for `(y, x)` yields the same value, which is what
/// makes a lookup independent of the order in which the two sites are named.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PairKey {
    first: SiteKey,
    second: SiteKey,
}

impl PairKey {
    pub fn canonical(a: SiteKey, b: SiteKey) -> Self {
        if a <= b {
            Self {
                first: a,
                second: b,
            }
        } else {
            Self {
                first: b,
                second: a,
            }
        }
    }

    pub fn new(mon_id1: &str, site1: usize, mon_id2: &str, site2: usize) -> Self {
        Self::canonical(SiteKey::new(mon_id1, site1), SiteKey::new(mon_id2, site2))
    }

    pub fn first(&self) -> &SiteKey {
        &self.first
    }

    pub fn second(&self) -> &SiteKey {
        &self.second
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.first, self.second)
    }
}

fn canonical_monomer_pair(mon_id1: &str, mon_id2: &str) -> (String, String) {
    if mon_id1 <= mon_id2 {
        (mon_id1.to_string(), mon_id2.to_string())
    } else {
        (mon_id2.to_string(), mon_id1.to_string())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    #[error(
        "Conflicting coefficients for {key}: registered (A={}, B={}), new (A={}, B={})",
        .existing.a, .existing.b, .new.a, .new.b
    )]
    ConflictingEntry {
        key: PairKey,
        existing: BuckinghamCoefficients,
        new: BuckinghamCoefficients,
    },
}

/// The registered Buckingham coefficients of a simulation.
///
/// Holds at most one entry per unordered site pair, plus the set of monomer-type pairs
/// for which the repulsion term is switched on. An empty set enables every registered
/// entry.
#[derive(Debug, Clone, Default)]
pub struct CoefficientTable {
    pub(super) entries: HashMap<PairKey, BuckinghamCoefficients>,
    pub(super) enabled_pairs: HashSet<(String, String)>,
}

impl CoefficientTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers coefficients for a site pair.
    ///
    /// Registering the same pair again (in either order) with identical coefficients is
    /// accepted; different coefficients are rejected.
    pub fn insert(
        &mut self,
        mon_id1: &str,
        site1: usize,
        mon_id2: &str,
        site2: usize,
        coefficients: BuckinghamCoefficients,
    ) -> Result<(), TableError> {
        let key = PairKey::new(mon_id1, site1, mon_id2, site2);
        match self.entries.entry(key) {
            Entry::Occupied(entry) => {
                if *entry.get() == coefficients {
                    warn!(pair = %entry.key(), "Duplicate Buckingham entry ignored");
                    Ok(())
                } else {
                    Err(TableError::ConflictingEntry {
                        key: entry.key().clone(),
                        existing: *entry.get(),
                        new: coefficients,
                    })
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(coefficients);
                Ok(())
            }
        }
    }

    pub fn enable_pair(&mut self, mon_id1: &str, mon_id2: &str) {
        self.enabled_pairs
            .insert(canonical_monomer_pair(mon_id1, mon_id2));
    }

    pub fn is_enabled(&self, mon_id1: &str, mon_id2: &str) -> bool {
        self.enabled_pairs.is_empty()
            || self
                .enabled_pairs
                .contains(&canonical_monomer_pair(mon_id1, mon_id2))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PairKey, &BuckinghamCoefficients)> {
        self.entries.iter()
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct CutoffConfig {
    pub inner: f64,
    pub outer: f64,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RepulsionConfig {
    #[serde(default)]
    pub pairs: Vec<(String, String)>,
    pub cutoff: CutoffConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TableRecord {
    pub mon_id1: String,
    pub site1: usize,
    pub mon_id2: String,
    pub site2: usize,
    pub a: f64,
    pub b: f64,
}

/// Everything the repulsion term needs from configuration: the switching window and
/// the coefficient table.
#[derive(Debug, Clone)]
pub struct RepulsionParams {
    pub switching: SwitchingWindow,
    pub table: CoefficientTable,
}

#[derive(Debug, Error)]
pub enum ParamLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Invalid coefficient table: {0}")]
    Table(#[from] TableError),
    #[error("Invalid cutoff: {0}")]
    Cutoff(#[from] SwitchingError),
}

impl RepulsionParams {
    pub fn load(config_path: &Path, table_path: &Path) -> Result<Self, ParamLoadError> {
        let config = Self::load_config(config_path)?;
        let switching = SwitchingWindow::new(config.cutoff.inner, config.cutoff.outer)?;

        let mut table = Self::load_table_csv(table_path)?;
        for (mon_id1, mon_id2) in &config.pairs {
            table.enable_pair(mon_id1, mon_id2);
        }

        info!(
            entries = table.len(),
            enabled_pairs = config.pairs.len(),
            inner = switching.inner(),
            outer = switching.outer(),
            "Loaded Buckingham repulsion parameters"
        );
        Ok(Self { switching, table })
    }

    fn load_config(path: &Path) -> Result<RepulsionConfig, ParamLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| ParamLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ParamLoadError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })
    }

    fn load_table_csv(path: &Path) -> Result<CoefficientTable, ParamLoadError> {
        let mut reader = csv::Reader::from_path(path).map_err(|e| ParamLoadError::Csv {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;

        let mut table = CoefficientTable::new();
        for result in reader.deserialize::<TableRecord>() {
            let record = result.map_err(|e| ParamLoadError::Csv {
                path: path.to_string_lossy().to_string(),
                source: e,
            })?;
            table.insert(
                &record.mon_id1,
                record.site1,
                &record.mon_id2,
                record.site2,
                BuckinghamCoefficients::new(record.a, record.b),
            )?;
        }
        debug!(path = %path.display(), entries = table.len(), "Read coefficient table");
        Ok(table)
    }
}
