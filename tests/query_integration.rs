//! End-to-end tests: load fixture files from disk, link, query and write results.

use std::io::Write;

use chrono::NaiveDate;
use neo_explorer::cli::{self, InspectArgs, QueryArgs};
use neo_explorer::{create_filters, limit, load_database, Criteria, NeoDatabase};
use tempfile::NamedTempFile;

// ==================== Helper Functions ====================

const NEOS_CSV: &str = "\
id,spkid,full_name,pdes,name,prefix,neo,pha,H,G,M1,M2,K1,K2,PC,diameter,extent,albedo
a0000433,2000433,433 Eros (A898 PA),433,Eros,,Y,N,10.4,0.46,,,,,,16.84,34.4x11.2x11.2,0.25
a0001036,2001036,1036 Ganymed (A924 UB),1036,Ganymed,,Y,N,9.25,0.3,,,,,,37.675,,0.238
a0001566,2001566,1566 Icarus (1949 MA),1566,Icarus,,Y,Y,16.35,,,,,,,1,,0.51
bK19A00A,3840000,(2019 AA),2019 AA,,,Y,N,21.1,,,,,,,,,
";

const CAD_JSON: &str = r#"{
  "signature": {"source": "NASA/JPL SBDB Close Approach Data API", "version": "1.1"},
  "count": "6",
  "fields": ["des", "orbit_id", "jd", "cd", "dist", "dist_min", "dist_max", "v_rel", "v_inf", "t_sigma_f", "h"],
  "data": [
    ["433", "659", "2415020.5", "1900-Dec-27 01:30", "0.314929", "0.3149", "0.3149", "5.5509", "5.5474", "< 00:01", "10.4"],
    ["2019 AA", "1", "2415021.5", "2019-Dec-31 12:00", "0.0412", "0.04", "0.05", "11.2", "11.1", "00:02", "21.1"],
    ["1566", "120", "2415022.5", "2020-Jan-01 00:00", "0.0423", "0.04", "0.05", "30.3", "30.3", "00:01", "16.35"],
    ["99999", "1", "2415023.5", "2020-Jan-01 06:00", "0.0100", "0.01", "0.01", "3.0", "3.0", "00:01", "25.0"],
    ["433", "659", "2415024.5", "2020-Jan-02 00:00", "0.15", "0.15", "0.15", "5.0", "5.0", "00:01", "10.4"],
    ["1036", "1", "2415025.5", "2024-Oct-13 09:27", "0.3713", "0.37", "0.37", "13.9", "13.9", "00:01", "9.25"]
  ]
}"#;

fn temp_file(content: &str, suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    write!(file, "{}", content).unwrap();
    file
}

fn load_fixture() -> NeoDatabase {
    let neos = temp_file(NEOS_CSV, ".csv");
    let cad = temp_file(CAD_JSON, ".json");
    load_database(neos.path(), cad.path()).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn query_times(db: &NeoDatabase, criteria: &Criteria) -> Vec<String> {
    let filters = create_filters(criteria);
    db.query(&filters).map(|ca| ca.time_str()).collect()
}

// ==================== Loading & Linking ====================

#[test]
fn test_loads_and_links_fixture() {
    let db = load_fixture();
    assert_eq!(db.neo_count(), 4);
    assert_eq!(db.approach_count(), 6);

    let eros = db.get_by_designation("433").unwrap();
    let first = db.approaches_of(eros).next().unwrap();
    assert_eq!(first.neo().unwrap().fullname(), "433 (Eros)");
    assert_eq!(db.approaches_of(eros).count(), 2);

    assert!(db.get_by_name("Icarus").unwrap().hazardous);
    assert!(db.get_by_name("").is_none());
    assert!(db.get_by_designation("99999").is_none());
}

#[test]
fn test_every_linked_approach_appears_once_under_its_neo() {
    let db = load_fixture();
    let linked: usize = db.neos().iter().map(|neo| neo.approach_ids().len()).sum();
    assert_eq!(linked, 5);

    for neo in db.neos() {
        for approach in db.approaches_of(neo) {
            assert_eq!(approach.designation, neo.designation);
            assert_eq!(db.neo_of(approach.approach()).unwrap().designation, neo.designation);
        }
    }
}

#[test]
fn test_missing_files_are_errors() {
    let cad = temp_file(CAD_JSON, ".json");
    let missing = std::path::Path::new("/nonexistent/neos.csv");
    assert!(load_database(missing, cad.path()).is_err());
}

// ==================== Queries ====================

#[test]
fn test_example_scenario_distance_bounds() {
    let db = load_fixture();
    let on_jan_2 = Criteria {
        date: Some(date(2020, 1, 2)),
        distance_max: Some(0.2),
        ..Criteria::default()
    };
    assert_eq!(query_times(&db, &on_jan_2), ["2020-01-02 00:00"]);

    let too_close = Criteria {
        date: Some(date(2020, 1, 2)),
        distance_max: Some(0.1),
        ..Criteria::default()
    };
    assert!(query_times(&db, &too_close).is_empty());
}

#[test]
fn test_no_filters_yield_all_in_order() {
    let db = load_fixture();
    let times = query_times(&db, &Criteria::default());
    assert_eq!(
        times,
        [
            "1900-12-27 01:30",
            "2019-12-31 12:00",
            "2020-01-01 00:00",
            "2020-01-01 06:00",
            "2020-01-02 00:00",
            "2024-10-13 09:27",
        ]
    );
}

#[test]
fn test_combined_criteria_match_hand_computed_subset() {
    let db = load_fixture();

    let window = Criteria {
        start_date: Some(date(2019, 12, 31)),
        end_date: Some(date(2020, 1, 2)),
        velocity_min: Some(5.0),
        ..Criteria::default()
    };
    assert_eq!(
        query_times(&db, &window),
        ["2019-12-31 12:00", "2020-01-01 00:00", "2020-01-02 00:00"]
    );

    let hazardous = Criteria {
        hazardous: Some(true),
        ..Criteria::default()
    };
    assert_eq!(query_times(&db, &hazardous), ["2020-01-01 00:00"]);

    // The unlinked "99999" approach never passes NEO-dependent filters.
    let harmless = Criteria {
        hazardous: Some(false),
        date: Some(date(2020, 1, 1)),
        ..Criteria::default()
    };
    assert!(query_times(&db, &harmless).is_empty());

    // Unknown diameters (2019 AA) never satisfy diameter bounds.
    let small = Criteria {
        diameter_max: Some(20.0),
        ..Criteria::default()
    };
    assert_eq!(
        query_times(&db, &small),
        ["1900-12-27 01:30", "2020-01-01 00:00", "2020-01-02 00:00"]
    );
}

#[test]
fn test_limit_over_query() {
    let db = load_fixture();
    let all = db.approach_count();
    assert_eq!(limit(db.query(&[]), None).count(), all);
    assert_eq!(limit(db.query(&[]), Some(0)).count(), all);
    assert_eq!(limit(db.query(&[]), Some(100)).count(), all);

    let first_two: Vec<String> = limit(db.query(&[]), Some(2)).map(|ca| ca.time_str()).collect();
    assert_eq!(first_two, ["1900-12-27 01:30", "2019-12-31 12:00"]);
}

// ==================== CLI ====================

#[test]
fn test_inspect_output() {
    let db = load_fixture();
    let mut out = Vec::new();
    let args = InspectArgs {
        pdes: None,
        name: Some("Eros".into()),
        verbose: true,
    };
    cli::inspect(&db, &args, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(
        text,
        "NEO 433 (Eros) has a diameter of 16.840 km and is not potentially hazardous.\n\
         - On 1900-12-27 01:30, '433 (Eros)' approaches Earth at a distance of 0.31 au and a velocity of 5.55 km/s.\n\
         - On 2020-01-02 00:00, '433 (Eros)' approaches Earth at a distance of 0.15 au and a velocity of 5.00 km/s.\n"
    );

    let mut out = Vec::new();
    let args = InspectArgs {
        pdes: Some("nope".into()),
        name: None,
        verbose: false,
    };
    cli::inspect(&db, &args, &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "No matching NEOs exist in the database.\n");
}

#[test]
fn test_query_prints_limited_results() {
    let db = load_fixture();
    let mut out = Vec::new();
    let args = QueryArgs {
        max_distance: Some(0.05),
        limit: Some(2),
        ..QueryArgs::default()
    };
    cli::query(&db, &args, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("On 2019-12-31 12:00, '2019 AA'"));
    assert!(lines[1].contains("'1566 (Icarus)'"));
}

#[test]
fn test_query_writes_outfile() {
    let db = load_fixture();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("results.json");

    let mut out = Vec::new();
    let args = QueryArgs {
        filters: vec!["velocity>=10".parse().unwrap()],
        outfile: Some(path.clone()),
        ..QueryArgs::default()
    };
    cli::query(&db, &args, &mut out).unwrap();

    let written: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let rows = written.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["neo"]["designation"], "2019 AA");
    assert_eq!(rows[2]["neo"]["name"], "Ganymed");
}
