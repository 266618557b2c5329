// tests/pipeline.rs
//
// End-to-end checks over the load → filter → aggregate/export pipeline,
// driven through the library surface with on-disk CSV fixtures.

use std::collections::BTreeSet;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use geocycle_dashboard::{charts, dataset, export, filter, map, FilterSelection, Palette};

fn write_fixture(content: &str) -> PathBuf {
    let mut f = tempfile::NamedTempFile::new().expect("temp csv");
    f.write_all(content.as_bytes()).expect("write fixture");
    let (_file, path) = f.keep().expect("keep fixture");
    path
}

fn load_fixture(content: &str) -> Arc<dataset::Dataset> {
    dataset::load(write_fixture(content)).expect("load fixture")
}

fn set(vals: &[&str]) -> BTreeSet<String> {
    vals.iter().map(|s| s.to_string()).collect()
}

const FIXTURE: &str = "\
Dumpsite Name,Ward,Waste Types,Waste Management Actors,Latitude,Longitude,_WasteCategory,_Alert,_ReasonsNormalized,_InterventionsNormalized\n\
A,Kapsoya,Plastic,County,0.52,35.28,Plastic,True,\"Lack of bins, Negligence,\",More bins\n\
B,Langas,Organic,Community,0.51,35.27,Organic,False,Negligence,Fencing\n\
C,Kapsoya,Organic,County,bad-lat,35.29,Organic,False,,\n\
D,Huruma,Mixed,NGO,0.50,,Mixed,False,,\n";

#[test]
fn loader_drops_rows_with_bad_coordinates() {
    let ds = load_fixture(FIXTURE);
    let names: Vec<&str> = ds.records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["A", "B"], "C and D have unusable coordinates");
}

#[test]
fn empty_selection_equals_selecting_every_distinct_value() {
    let ds = load_fixture(FIXTURE);
    let opts = filter::options(&ds);

    let everything = FilterSelection {
        wards: opts.wards.iter().cloned().collect(),
        waste_types: opts.waste_types.iter().cloned().collect(),
        actors: opts.actors.iter().cloned().collect(),
        alerts_only: false,
    };
    let none = FilterSelection::default();

    assert_eq!(
        everything.apply(&ds).indices(),
        none.apply(&ds).indices()
    );
}

#[test]
fn full_selection_export_round_trips_row_count() {
    let ds = load_fixture(FIXTURE);
    let view = FilterSelection::default().apply(&ds);
    let bytes = export::to_csv_bytes(&view).expect("serialize");

    let mut reader = csv::Reader::from_reader(bytes.as_slice());
    let rows = reader.records().count();
    assert_eq!(rows, ds.records.len());
}

#[test]
fn exported_csv_reloads_to_an_identical_table() {
    let ds = load_fixture(FIXTURE);
    let view = FilterSelection::default().apply(&ds);
    let bytes = export::to_csv_bytes(&view).expect("serialize");

    let reloaded_path = write_fixture(std::str::from_utf8(&bytes).expect("utf8"));
    let reloaded = dataset::load(&reloaded_path).expect("reload export");
    let original: Vec<_> = view.iter().cloned().collect();
    assert_eq!(reloaded.records, original);
}

#[test]
fn kapsoya_alert_scenario() {
    let ds = load_fixture(FIXTURE);

    let alerts_only = FilterSelection {
        alerts_only: true,
        ..Default::default()
    };
    let view = alerts_only.apply(&ds);
    let kept: Vec<&str> = view.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(kept, vec!["A"], "alerts_only keeps the Kapsoya record");

    let langas = FilterSelection {
        wards: set(&["Langas"]),
        ..Default::default()
    };
    assert!(
        langas.apply(&ds).iter().all(|r| r.name != "A"),
        "ward selection excludes the Kapsoya record"
    );
}

#[test]
fn trailing_blank_reason_token_is_dropped_end_to_end() {
    let ds = load_fixture(FIXTURE);
    let view = FilterSelection {
        wards: set(&["Kapsoya"]),
        ..Default::default()
    }
    .apply(&ds);

    let chart = charts::reason_frequency(&view);
    let tokens: Vec<&str> = chart.rows.iter().map(|r| r.token.as_str()).collect();
    assert_eq!(tokens, vec!["Lack of bins", "Negligence"]);
}

#[test]
fn empty_view_gives_default_center_and_three_placeholders() {
    let ds = load_fixture(FIXTURE);
    let view = FilterSelection {
        wards: set(&["Nowhere"]),
        ..Default::default()
    }
    .apply(&ds);
    assert!(view.is_empty());

    let model = map::build(&view, &Palette::default_seed());
    assert_eq!(model.center, map::DEFAULT_CENTER);

    assert!(charts::waste_by_ward(&view).placeholder.is_some());
    assert!(charts::reason_frequency(&view).placeholder.is_some());
    assert!(charts::intervention_cloud(&view).placeholder.is_some());
}
