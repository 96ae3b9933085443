use std::fs;
use std::path::PathBuf;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use tempfile::TempDir;

use agentwatch::engine::{build_availability_index, build_baseline_sets, classify};
use agentwatch::ingest::{read_availability, read_baseline};
use agentwatch::store::{BaselineStore, OsClass};
use agentwatch::{export, IngestError};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn reference_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 1, 31)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn full_flow_all_agents_available() {
    let dir = TempDir::new().unwrap();
    let now = reference_now();

    let baseline_path = write_file(
        &dir,
        "windows_baseline.csv",
        "Domain,Agent Name\nDomain1,WIN-HOST01\nDomain1,WIN-HOST02\nDomain2,WIN-HOST03\n",
    );

    let mut store = BaselineStore::open(&dir.path().join("agents.db")).unwrap();
    let records = read_baseline(&baseline_path).unwrap();
    store.replace_all(OsClass::Windows, &records).unwrap();

    let stamp = now.format(DATE_FORMAT).to_string();
    let availability_path = write_file(
        &dir,
        "windows_avail.csv",
        &format!(
            "Domain,Agent Name,Last Available Date\n\
             Domain1,WIN-HOST01,{stamp}\n\
             Domain1,WIN-HOST02,{stamp}\n\
             Domain2,WIN-HOST03,{stamp}\n"
        ),
    );

    let baseline = store.agents_by_domain(OsClass::Windows).unwrap();
    let rows = read_availability(&availability_path).unwrap();
    let index = build_availability_index(&rows).unwrap();
    let results = classify(&baseline, &index, now);

    assert_eq!(results["Domain1"].available.len(), 2);
    assert_eq!(results["Domain1"].not_available.len(), 0);
    assert_eq!(results["Domain1"].percentage(), 100.0);
    assert_eq!(results["Domain2"].available.len(), 1);
}

#[test]
fn missing_agent_is_not_available_at_two_thirds() {
    let now = reference_now();
    let baseline = build_baseline_sets(
        &[
            ("Domain1", "WIN-HOST01"),
            ("Domain1", "WIN-HOST02"),
            ("Domain1", "WIN-HOST03"),
        ]
        .map(|(domain, agent)| agentwatch::ingest::BaselineRecord {
            domain: domain.to_string(),
            agent_name: agent.to_string(),
        }),
    );

    let stamp = now.format(DATE_FORMAT).to_string();
    let rows = vec![
        agentwatch::ingest::AvailabilityRecord {
            domain: "Domain1".to_string(),
            agent_name: "WIN-HOST01".to_string(),
            timestamp_raw: stamp.clone(),
        },
        agentwatch::ingest::AvailabilityRecord {
            domain: "Domain1".to_string(),
            agent_name: "WIN-HOST03".to_string(),
            timestamp_raw: stamp,
        },
    ];
    let index = build_availability_index(&rows).unwrap();
    let results = classify(&baseline, &index, now);

    let result = &results["Domain1"];
    assert!(result.available.contains("WIN-HOST01"));
    assert!(result.available.contains("WIN-HOST03"));
    assert!(result.not_available.contains("WIN-HOST02"));
    assert!((result.percentage() - 66.66666666666667).abs() < 1e-9);
}

#[test]
fn agent_seen_25_hours_ago_is_stale() {
    let dir = TempDir::new().unwrap();
    let now = reference_now();
    let old = (now - Duration::hours(25)).format(DATE_FORMAT).to_string();
    let recent = now.format(DATE_FORMAT).to_string();

    let baseline_path = write_file(
        &dir,
        "baseline.csv",
        "Domain,Agent Name\nDomain1,WIN-HOST01\nDomain1,WIN-HOST02\nDomain1,WIN-HOST03\n",
    );
    let availability_path = write_file(
        &dir,
        "avail.csv",
        &format!(
            "Domain,Agent Name,Last Available Date\n\
             Domain1,WIN-HOST01,{recent}\n\
             Domain1,WIN-HOST02,{old}\n\
             Domain1,WIN-HOST03,{recent}\n"
        ),
    );

    let baseline = build_baseline_sets(&read_baseline(&baseline_path).unwrap());
    let index = build_availability_index(&read_availability(&availability_path).unwrap()).unwrap();
    let results = classify(&baseline, &index, now);

    let result = &results["Domain1"];
    assert_eq!(result.available.len(), 2);
    assert!(result.not_available.contains("WIN-HOST02"));
    // Stale, but its last-seen timestamp is still on record.
    assert_eq!(
        result.last_seen["WIN-HOST02"].format(DATE_FORMAT).to_string(),
        old
    );
}

#[test]
fn comma_bearing_dates_survive_ingestion_end_to_end() {
    let dir = TempDir::new().unwrap();
    let now = reference_now();

    let baseline_path = write_file(&dir, "baseline.csv", "Domain,Agent Name\nDomainX,HOST01\n");
    let availability_path = write_file(
        &dir,
        "avail.csv",
        "\"Domain\",\"Agent Name\",\"Last Available Date\"\n\
         \"DomainX\",\"HOST01\",Jan 31, 2026 @ 11:38:00.504\n",
    );

    let baseline = build_baseline_sets(&read_baseline(&baseline_path).unwrap());
    let rows = read_availability(&availability_path).unwrap();
    assert_eq!(rows[0].timestamp_raw, "Jan 31, 2026 @ 11:38:00.504");

    let index = build_availability_index(&rows).unwrap();
    let results = classify(&baseline, &index, now);
    assert!(results["DomainX"].available.contains("HOST01"));
}

#[test]
fn empty_availability_file_marks_everyone_not_available() {
    let dir = TempDir::new().unwrap();
    let now = reference_now();

    let baseline_path = write_file(
        &dir,
        "baseline.csv",
        "Domain,Agent Name\nDomain1,WIN-HOST01\nDomain1,WIN-HOST02\nDomain1,WIN-HOST03\n",
    );
    let availability_path = write_file(&dir, "avail.csv", "");

    let baseline = build_baseline_sets(&read_baseline(&baseline_path).unwrap());
    let rows = read_availability(&availability_path).unwrap();
    assert!(rows.is_empty());

    let index = build_availability_index(&rows).unwrap();
    let results = classify(&baseline, &index, now);

    let result = &results["Domain1"];
    assert_eq!(result.available.len(), 0);
    assert_eq!(result.not_available.len(), 3);
    assert_eq!(result.percentage(), 0.0);
}

#[test]
fn wrong_availability_headers_fail_with_header_mismatch() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "avail.csv", "Wrong,Headers\nDomain1,HOST01,now\n");

    let err = read_availability(&path).unwrap_err();
    assert!(matches!(err, IngestError::HeaderMismatch { .. }));
    assert!(err.to_string().contains("Wrong"));
}

#[test]
fn duplicate_feed_rows_resolve_to_the_latest_timestamp() {
    let dir = TempDir::new().unwrap();
    let now = reference_now();
    let older = (now - Duration::hours(30)).format(DATE_FORMAT).to_string();
    let newer = (now - Duration::hours(1)).format(DATE_FORMAT).to_string();

    let availability_path = write_file(
        &dir,
        "avail.csv",
        &format!(
            "Domain,Agent Name,Last Available Date\n\
             Domain1,HOST01,{newer}\n\
             Domain1,HOST01,{older}\n"
        ),
    );

    let rows = read_availability(&availability_path).unwrap();
    let index = build_availability_index(&rows).unwrap();
    let key = ("HOST01".to_string(), "Domain1".to_string());
    assert_eq!(index[&key].format(DATE_FORMAT).to_string(), newer);
}

#[test]
fn store_round_trip_matches_direct_set_construction() {
    let dir = TempDir::new().unwrap();
    let baseline_path = write_file(
        &dir,
        "baseline.csv",
        "Domain,Agent Name\nDomain1,LIN-HOST01\nDomain1,LIN-HOST02\nDomain2,LIN-HOST03\n",
    );

    let records = read_baseline(&baseline_path).unwrap();
    let direct = build_baseline_sets(&records);

    let mut store = BaselineStore::open(&dir.path().join("agents.db")).unwrap();
    store.replace_all(OsClass::Linux, &records).unwrap();
    let stored = store.agents_by_domain(OsClass::Linux).unwrap();

    assert_eq!(direct, stored);
}

#[test]
fn reports_are_written_for_classified_results() {
    let dir = TempDir::new().unwrap();
    let now = reference_now();
    let stamp = now.format(DATE_FORMAT).to_string();

    let baseline_path = write_file(
        &dir,
        "baseline.csv",
        "Domain,Agent Name\nDomain1,WIN-HOST01\nDomain1,WIN-HOST02\n",
    );
    let availability_path = write_file(
        &dir,
        "avail.csv",
        &format!("Domain,Agent Name,Last Available Date\nDomain1,WIN-HOST01,{stamp}\n"),
    );

    let baseline = build_baseline_sets(&read_baseline(&baseline_path).unwrap());
    let index = build_availability_index(&read_availability(&availability_path).unwrap()).unwrap();
    let windows_results = classify(&baseline, &index, now);
    let linux_results = agentwatch::DomainResults::new();

    let sections = [
        (OsClass::Windows, &windows_results),
        (OsClass::Linux, &linux_results),
    ];

    let reports_dir = dir.path().join("reports");
    fs::create_dir_all(&reports_dir).unwrap();

    let sheets = export::write_sheet_reports(&reports_dir, "report", &sections).unwrap();
    let document = export::write_document_report(&reports_dir, "report", &sections, now).unwrap();

    assert_eq!(sheets.len(), 2);
    assert!(sheets.iter().all(|p| p.exists()));
    assert!(document.exists());

    let sheet = fs::read_to_string(&sheets[0]).unwrap();
    assert!(sheet.contains("WIN-HOST02,Not Available,N/A"));

    let doc = fs::read_to_string(&document).unwrap();
    assert!(doc.contains("## Windows - Domain1"));
    assert!(doc.contains("**Availability:** 50.0%"));
}
