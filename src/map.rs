//! # Map Renderer
//!
//! Builds the marker model consumed by the Leaflet front end: a center point,
//! one clustered marker per filtered record with category-resolved color and
//! icon, and a rich-text popup assembled from row fields. Missing fields
//! degrade to placeholder text; this path has no failure mode.

use serde::Serialize;

use crate::dataset::Record;
use crate::filter::FilteredView;
use crate::palette::Palette;

/// Fallback center (Eldoret) used when the filtered view is empty.
pub const DEFAULT_CENTER: [f64; 2] = [0.5167, 35.2833];
pub const DEFAULT_ZOOM: u8 = 12;

const ICON_ALERT: &str = "exclamation-sign";
const ICON_NORMAL: &str = "trash";
const MISSING_FIELD: &str = "—";

#[derive(Debug, Clone, Serialize)]
pub struct MapModel {
    pub center: [f64; 2],
    pub zoom: u8,
    /// Markers are grouped client-side; a flat list is all the UI needs.
    pub cluster: bool,
    pub markers: Vec<Marker>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Marker {
    pub lat: f64,
    pub lon: f64,
    pub color: String,
    pub icon: &'static str,
    pub popup_html: String,
}

/// Build the map model for the current filtered view.
pub fn build(view: &FilteredView, palette: &Palette) -> MapModel {
    let markers: Vec<Marker> = view
        .iter()
        .map(|r| Marker {
            lat: r.latitude,
            lon: r.longitude,
            color: palette.color_for(&r.waste_category, r.alert).to_string(),
            icon: if r.alert { ICON_ALERT } else { ICON_NORMAL },
            popup_html: popup_html(r),
        })
        .collect();

    MapModel {
        center: center_of(view),
        zoom: DEFAULT_ZOOM,
        cluster: true,
        markers,
    }
}

/// Arithmetic mean of retained coordinates; fixed default when empty.
fn center_of(view: &FilteredView) -> [f64; 2] {
    if view.is_empty() {
        return DEFAULT_CENTER;
    }
    let n = view.len() as f64;
    let (lat_sum, lon_sum) = view
        .iter()
        .fold((0.0, 0.0), |(la, lo), r| (la + r.latitude, lo + r.longitude));
    [lat_sum / n, lon_sum / n]
}

/// Fixed popup template. Every value is HTML-escaped; blank fields show a
/// placeholder, and a thumbnail is appended only for a non-blank photo URL.
fn popup_html(r: &Record) -> String {
    let mut html = format!(
        "<b>Dumpsite:</b> {}<br><b>Ward:</b> {}<br><b>Waste Types:</b> {}\
         <br><b>Actors:</b> {}<br><b>Community Action:</b> {}\
         <br><b>Reasons:</b> {}<br><b>Proposed Interventions:</b> {}",
        escaped_or(&r.name, "Unnamed"),
        escaped_or(&r.ward, "Unknown"),
        escaped_or(&r.waste_types, MISSING_FIELD),
        escaped_or(&r.actors, MISSING_FIELD),
        escaped_or(&r.community_interventions, MISSING_FIELD),
        escaped_or(&r.reasons, MISSING_FIELD),
        escaped_or(&r.proposed_interventions, MISSING_FIELD),
    );
    if !r.photo_url.trim().is_empty() {
        html.push_str(&format!(
            "<br><img src=\"{}\" width=\"220\">",
            html_escape::encode_double_quoted_attribute(r.photo_url.trim())
        ));
    }
    html
}

fn escaped_or(value: &str, placeholder: &str) -> String {
    if value.trim().is_empty() {
        placeholder.to_string()
    } else {
        html_escape::encode_text(value).into_owned()
    }
}
