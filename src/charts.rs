//! # Aggregation & Chart Builder
//!
//! Three independent aggregations over the filtered view: waste category
//! counts per ward (stacked bar chart), reason-token frequency (bar chart),
//! and intervention-token frequency (word cloud weights). Each carries a
//! placeholder message instead of empty data when the filter leaves nothing.

use std::collections::HashMap;

use serde::Serialize;

use crate::filter::FilteredView;

pub const EMPTY_FILTER_NOTE: &str = "No data in current filter.";
pub const EMPTY_REASONS_NOTE: &str = "No non-empty 'Reasons for Dumping' yet — chart hidden.";
pub const EMPTY_INTERVENTIONS_NOTE: &str =
    "No non-empty 'Proposed Interventions' yet — word cloud hidden.";

/// Literal marker a pandas export leaves behind for missing values.
const MISSING_MARKER: &str = "<NA>";
const UNKNOWN_CATEGORY: &str = "Unknown";

/// Stacked bar chart of dumpsite counts per (ward, category).
#[derive(Debug, Clone, Serialize)]
pub struct WardChart {
    /// Wards in descending-total order, for the chart's y-axis sort.
    pub ward_order: Vec<String>,
    pub rows: Vec<WardRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WardRow {
    pub ward: String,
    pub category: String,
    pub count: usize,
}

/// Descending-frequency bar chart of free-text tokens.
#[derive(Debug, Clone, Serialize)]
pub struct FrequencyChart {
    pub rows: Vec<TokenCount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenCount {
    pub token: String,
    pub count: usize,
}

/// Word-cloud model: tokens with counts plus a relative weight in (0, 1]
/// (count over max count) so the front end can scale font sizes.
#[derive(Debug, Clone, Serialize)]
pub struct WordCloud {
    pub entries: Vec<CloudEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CloudEntry {
    pub token: String,
    pub count: usize,
    pub weight: f64,
}

/// Group records by (ward, normalized category) and count. Empty categories
/// collapse into "Unknown"; wards are ordered by descending total.
pub fn waste_by_ward(view: &FilteredView) -> WardChart {
    if view.is_empty() {
        return WardChart {
            ward_order: Vec::new(),
            rows: Vec::new(),
            placeholder: Some(EMPTY_FILTER_NOTE),
        };
    }

    let mut counts: HashMap<(String, String), usize> = HashMap::new();
    let mut totals: HashMap<String, usize> = HashMap::new();
    for r in view.iter() {
        let category = if r.waste_category.is_empty() {
            UNKNOWN_CATEGORY.to_string()
        } else {
            r.waste_category.clone()
        };
        *counts.entry((r.ward.clone(), category)).or_default() += 1;
        *totals.entry(r.ward.clone()).or_default() += 1;
    }

    let mut ward_order: Vec<String> = totals.keys().cloned().collect();
    ward_order.sort_by(|a, b| totals[b].cmp(&totals[a]).then_with(|| a.cmp(b)));

    let rank: HashMap<&str, usize> = ward_order
        .iter()
        .enumerate()
        .map(|(i, w)| (w.as_str(), i))
        .collect();

    let mut rows: Vec<WardRow> = counts
        .into_iter()
        .map(|((ward, category), count)| WardRow {
            ward,
            category,
            count,
        })
        .collect();
    rows.sort_by(|a, b| {
        rank[a.ward.as_str()]
            .cmp(&rank[b.ward.as_str()])
            .then_with(|| a.category.cmp(&b.category))
    });

    WardChart {
        ward_order,
        rows,
        placeholder: None,
    }
}

/// Token frequency over the normalized-reasons field.
pub fn reason_frequency(view: &FilteredView) -> FrequencyChart {
    let rows = count_tokens(view.iter().map(|r| r.reasons_normalized.as_str()));
    if rows.is_empty() {
        FrequencyChart {
            rows,
            placeholder: Some(EMPTY_REASONS_NOTE),
        }
    } else {
        FrequencyChart {
            rows,
            placeholder: None,
        }
    }
}

/// Token frequency over the normalized-interventions field, weighted for the
/// word cloud.
pub fn intervention_cloud(view: &FilteredView) -> WordCloud {
    let rows = count_tokens(view.iter().map(|r| r.interventions_normalized.as_str()));
    if rows.is_empty() {
        return WordCloud {
            entries: Vec::new(),
            placeholder: Some(EMPTY_INTERVENTIONS_NOTE),
        };
    }
    let max = rows[0].count as f64;
    let entries = rows
        .into_iter()
        .map(|tc| CloudEntry {
            weight: tc.count as f64 / max,
            token: tc.token,
            count: tc.count,
        })
        .collect();
    WordCloud {
        entries,
        placeholder: None,
    }
}

/// Split a comma-separated normalized field into trimmed, non-blank tokens,
/// dropping the literal missing-value marker.
pub fn tokens(field: &str) -> impl Iterator<Item = &str> {
    field
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty() && *t != MISSING_MARKER)
}

/// Count the token multiset; descending count, ties by token for determinism.
fn count_tokens<'a, I>(fields: I) -> Vec<TokenCount>
where
    I: Iterator<Item = &'a str>,
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for field in fields {
        for tok in tokens(field) {
            *counts.entry(tok).or_default() += 1;
        }
    }
    let mut rows: Vec<TokenCount> = counts
        .into_iter()
        .map(|(token, count)| TokenCount {
            token: token.to_string(),
            count,
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.token.cmp(&b.token)));
    rows
}
