//! # Export
//!
//! Serializes the current filtered view back to CSV bytes for download:
//! UTF-8, comma-delimited, header row, no index column. Byte buffers are
//! cached by a content hash of the view so repeated identical downloads
//! skip re-serialization.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use metrics::counter;
use once_cell::sync::Lazy;
use sha2::{Digest, Sha256};

use crate::dataset::COLUMNS;
use crate::filter::FilteredView;

/// File name offered for the download artifact.
pub const EXPORT_FILE_NAME: &str = "GeoCycle_filtered.csv";

static CSV_CACHE: Lazy<Mutex<HashMap<[u8; 32], Arc<Vec<u8>>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// CSV bytes for the view, from cache when an identical view was serialized
/// before. Cache entries live for the process lifetime, like the dataset.
pub fn to_csv_bytes(view: &FilteredView) -> Result<Arc<Vec<u8>>> {
    let key = cache_key(view);
    {
        let cache = CSV_CACHE.lock().expect("export cache mutex poisoned");
        if let Some(bytes) = cache.get(&key) {
            counter!("dashboard_export_cache_hits_total").increment(1);
            return Ok(Arc::clone(bytes));
        }
    }

    counter!("dashboard_export_cache_misses_total").increment(1);
    let bytes = Arc::new(write_csv(view)?);
    CSV_CACHE
        .lock()
        .expect("export cache mutex poisoned")
        .insert(key, Arc::clone(&bytes));
    Ok(bytes)
}

/// Two views have equal content iff they retain the same rows of the same
/// source file, so the digest covers the path plus the retained indices.
fn cache_key(view: &FilteredView) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(view.dataset().path.display().to_string().as_bytes());
    for &i in view.indices() {
        hasher.update((i as u64).to_le_bytes());
    }
    hasher.finalize().into()
}

fn write_csv(view: &FilteredView) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(COLUMNS).context("writing CSV header")?;
    for r in view.iter() {
        let lat = r.latitude.to_string();
        let lon = r.longitude.to_string();
        writer
            .write_record([
                r.name.as_str(),
                r.ward.as_str(),
                r.waste_types.as_str(),
                r.actors.as_str(),
                r.community_interventions.as_str(),
                r.reasons.as_str(),
                r.proposed_interventions.as_str(),
                r.photo_url.as_str(),
                lat.as_str(),
                lon.as_str(),
                r.waste_category.as_str(),
                // pandas spelling, so a re-import parses the same flags
                if r.alert { "True" } else { "False" },
                r.reasons_normalized.as_str(),
                r.interventions_normalized.as_str(),
            ])
            .context("writing CSV row")?;
    }
    writer
        .into_inner()
        .context("flushing CSV writer")
}
