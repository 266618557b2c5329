//! # Marker Palette
//!
//! Configurable mapping from waste category to map marker color.
//!
//! - Loads from a JSON config when present (colors + fallback).
//! - Falls back to a built-in `default_seed()` reproducing the original
//!   dashboard's table.
//! - An alert flag overrides any category color with the alert color.

use serde::Deserialize;
use std::{collections::HashMap, fs, path::Path};

pub const DEFAULT_PALETTE_CONFIG_PATH: &str = "config/palette.json";
pub const ENV_PALETTE_CONFIG_PATH: &str = "PALETTE_CONFIG_PATH";

/// Color applied unconditionally to alert-flagged markers.
pub const ALERT_COLOR: &str = "red";

/// Category→color lookup, loaded from JSON or defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct Palette {
    /// Color used when a category has no entry.
    #[serde(default = "default_fallback_color")]
    pub fallback: String,
    /// Explicit colors per canonical waste category.
    #[serde(default)]
    pub colors: HashMap<String, String>,
}

fn default_fallback_color() -> String {
    "blue".to_string()
}

impl Default for Palette {
    fn default() -> Self {
        Self::default_seed()
    }
}

impl Palette {
    /// Load from a JSON file, falling back to `default_seed()` on any error.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(path) {
            Ok(s) => serde_json::from_str(&s).unwrap_or_else(|_| Self::default_seed()),
            Err(_) => Self::default_seed(),
        }
    }

    /// Load using `$PALETTE_CONFIG_PATH`, then the default path, then the seed.
    pub fn load_default() -> Self {
        if let Ok(p) = std::env::var(ENV_PALETTE_CONFIG_PATH) {
            return Self::load_from_file(p);
        }
        let default = Path::new(DEFAULT_PALETTE_CONFIG_PATH);
        if default.exists() {
            return Self::load_from_file(default);
        }
        Self::default_seed()
    }

    /// Resolve the marker color for a category; `alert` wins unconditionally.
    pub fn color_for(&self, category: &str, alert: bool) -> &str {
        if alert {
            return ALERT_COLOR;
        }
        self.colors
            .get(category)
            .map(String::as_str)
            .unwrap_or(&self.fallback)
    }

    /// Built-in seed matching the original dashboard's category table.
    pub fn default_seed() -> Self {
        let mut colors = HashMap::new();
        for (k, v) in [
            ("Organic", "green"),
            ("Plastic", "red"),
            ("Paper", "orange"),
            ("Glass", "blue"),
            ("Metal", "gray"),
            ("E-waste", "black"),
            ("Mixed", "purple"),
            ("Others", "lightgray"),
            ("Unknown", "beige"),
        ] {
            colors.insert(k.to_string(), v.to_string());
        }
        Self {
            fallback: default_fallback_color(),
            colors,
        }
    }
}
