//! # Dataset Loader
//!
//! Reads the dumpsite observation CSV once per process lifetime, coerces the
//! coordinate columns to numeric, drops rows without a usable location, and
//! back-fills the derived helper columns when the source file predates them.
//!
//! The loaded table is immutable and shared via `Arc`; everything downstream
//! (filtering, map building, aggregation, export) works on views over it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::Serialize;
use tracing::info;

// --- env defaults & names ---
pub const DEFAULT_DATASET_PATH: &str = "data/GeoCycle_Dashboard_Ready_Final.csv";
pub const ENV_DATASET_PATH: &str = "DATASET_PATH";

/// Column headers of the source table, in export order.
pub const COLUMNS: [&str; 14] = [
    "Dumpsite Name",
    "Ward",
    "Waste Types",
    "Waste Management Actors",
    "Community Interventions",
    "Reasons for Dumping",
    "Proposed Interventions",
    "Photo URL",
    "Latitude",
    "Longitude",
    "_WasteCategory",
    "_Alert",
    "_ReasonsNormalized",
    "_InterventionsNormalized",
];

/// One dumpsite observation row, post-coercion.
///
/// Coordinates are guaranteed finite; the four derived fields always exist
/// (defaulted when missing from the source file).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub name: String,
    pub ward: String,
    pub waste_types: String,
    pub actors: String,
    pub community_interventions: String,
    pub reasons: String,
    pub proposed_interventions: String,
    pub photo_url: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Derived `_WasteCategory`: one of a small fixed set, or empty.
    pub waste_category: String,
    /// Derived `_Alert`: health/burning hazard flag.
    pub alert: bool,
    /// Derived `_ReasonsNormalized`: comma-separated token string.
    pub reasons_normalized: String,
    /// Derived `_InterventionsNormalized`: comma-separated token string.
    pub interventions_normalized: String,
}

/// The full loaded table. Constructed once per path, never mutated.
#[derive(Debug)]
pub struct Dataset {
    pub path: PathBuf,
    pub records: Vec<Record>,
}

static CACHE: Lazy<Mutex<HashMap<PathBuf, Arc<Dataset>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Resolve the dataset path from `$DATASET_PATH`, falling back to the default.
pub fn dataset_path() -> PathBuf {
    std::env::var(ENV_DATASET_PATH)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATASET_PATH))
}

/// Load the dataset at `path`, memoized per path for the process lifetime.
///
/// The file is assumed static; there is no invalidation. A missing or
/// unreadable file is the only fatal condition.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Arc<Dataset>> {
    let path = path.as_ref();
    {
        let cache = CACHE.lock().expect("dataset cache mutex poisoned");
        if let Some(ds) = cache.get(path) {
            return Ok(Arc::clone(ds));
        }
    }

    let ds = Arc::new(read_table(path)?);
    CACHE
        .lock()
        .expect("dataset cache mutex poisoned")
        .insert(path.to_path_buf(), Arc::clone(&ds));
    Ok(ds)
}

fn read_table(path: &Path) -> Result<Dataset> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("reading dataset from {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("reading header row of {}", path.display()))?
        .clone();
    let col = |name: &str| headers.iter().position(|h| h == name);

    let idx_lat = col("Latitude").ok_or_else(|| anyhow!("missing 'Latitude' column"))?;
    let idx_lon = col("Longitude").ok_or_else(|| anyhow!("missing 'Longitude' column"))?;
    let idx_name = col("Dumpsite Name");
    let idx_ward = col("Ward");
    let idx_waste = col("Waste Types");
    let idx_actors = col("Waste Management Actors");
    let idx_community = col("Community Interventions");
    let idx_reasons = col("Reasons for Dumping");
    let idx_proposed = col("Proposed Interventions");
    let idx_photo = col("Photo URL");
    // Derived columns are optional; missing ones get defaults.
    let idx_category = col("_WasteCategory");
    let idx_alert = col("_Alert");
    let idx_reasons_norm = col("_ReasonsNormalized");
    let idx_inter_norm = col("_InterventionsNormalized");

    let mut records = Vec::new();
    let mut dropped = 0usize;

    for row in reader.records() {
        let row = row.with_context(|| format!("reading row of {}", path.display()))?;
        let field = |idx: Option<usize>| idx.and_then(|i| row.get(i)).unwrap_or("").to_string();

        let lat = parse_coordinate(row.get(idx_lat));
        let lon = parse_coordinate(row.get(idx_lon));
        let (Some(latitude), Some(longitude)) = (lat, lon) else {
            dropped += 1;
            continue;
        };

        records.push(Record {
            name: field(idx_name),
            ward: field(idx_ward),
            waste_types: field(idx_waste),
            actors: field(idx_actors),
            community_interventions: field(idx_community),
            reasons: field(idx_reasons),
            proposed_interventions: field(idx_proposed),
            photo_url: field(idx_photo),
            latitude,
            longitude,
            waste_category: field(idx_category),
            alert: parse_alert(&field(idx_alert)),
            reasons_normalized: field(idx_reasons_norm),
            interventions_normalized: field(idx_inter_norm),
        });
    }

    if dropped > 0 {
        info!(
            dropped,
            kept = records.len(),
            "dropped rows with unparseable coordinates"
        );
    }

    Ok(Dataset {
        path: path.to_path_buf(),
        records,
    })
}

/// Coerce a coordinate cell to a finite number; anything else is "missing".
fn parse_coordinate(cell: Option<&str>) -> Option<f64> {
    cell.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// The source file comes out of a pandas export, so the alert flag may be
/// spelled `True`/`False`. Accept `true`/`1` case-insensitively.
fn parse_alert(cell: &str) -> bool {
    matches!(cell.trim().to_ascii_lowercase().as_str(), "true" | "1")
}
