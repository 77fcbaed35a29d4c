#![forbid(unsafe_code)]
use chrono::NaiveDate;
use kitplan::{
    io, AssignmentDates, JsonStorage, Kit, KitId, KitStatus, KitType, OrgId, Planner, Show,
    ShowId, Storage, SuggestOptions,
};
use std::fs;
use tempfile::tempdir;

fn d(m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, m, day).unwrap()
}

#[test]
fn import_kits_with_optional_columns() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("kits.csv");
    fs::write(
        &path,
        "id,name,code,kit_type,home_base,current_location,ship_days,return_days,status,packing_list,replacement_value\n\
         k1,Booth A,BA-01,Flagship,Lyon,Paris,3,5,maintenance,banner:2;table,12000\n\
         k2,Booth B,,compact,Nantes,,1,1\n",
    )
    .unwrap();

    let acme = OrgId::new("acme");
    let kits = io::import_kits_csv(&path, &acme).unwrap();
    assert_eq!(kits.len(), 2);

    let k1 = &kits[0];
    assert_eq!(k1.id, KitId::new("k1"));
    assert_eq!(k1.org, acme);
    assert_eq!(k1.kit_type, KitType::Flagship);
    assert_eq!(k1.code.as_deref(), Some("BA-01"));
    assert_eq!(k1.current_location.as_deref(), Some("Paris"));
    assert_eq!(k1.status, KitStatus::Maintenance);
    assert_eq!(k1.contents.len(), 2);
    assert_eq!(k1.contents[0].quantity, 2);
    assert_eq!(k1.contents[1].quantity, 1);
    assert_eq!(k1.replacement_value, Some(12000.0));

    let k2 = &kits[1];
    assert_eq!(k2.code, None);
    assert_eq!(k2.status, KitStatus::Available);
    assert_eq!((k2.default_ship_days, k2.default_return_days), (1, 1));
}

#[test]
fn import_rejects_bad_rows_with_line_number() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("kits.csv");
    fs::write(
        &path,
        "id,name,code,kit_type,home_base,current_location,ship_days,return_days\n\
         k1,Booth A,,standard,Lyon,,-1,2\n",
    )
    .unwrap();

    let err = io::import_kits_csv(&path, &OrgId::default()).unwrap_err();
    assert!(format!("{err:#}").contains("kit row 1"));
}

#[test]
fn import_shows_tolerates_missing_dates() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("shows.csv");
    fs::write(
        &path,
        "id,name,location,start,end\n\
         s1,Salon du Vin,Bordeaux,2025-04-10,2025-04-12\n\
         s2,TBD,Lille,,\n",
    )
    .unwrap();

    let shows = io::import_shows_csv(&path, &OrgId::default()).unwrap();
    assert_eq!(shows.len(), 2);
    assert_eq!(shows[0].start, Some(d(4, 10)));
    assert_eq!(shows[0].end, Some(d(4, 12)));
    assert_eq!(shows[1].start, None);
    assert!(io::parse_date("2025-13-01").is_err());
}

#[test]
fn report_csv_layout() {
    let mut p = Planner::new();
    p.upsert_kit(
        Kit::new(OrgId::default(), "Booth A", KitType::Standard, "Lyon", 2, 2)
            .with_id(KitId::new("k1")),
    )
    .unwrap();
    p.upsert_show(
        Show::new(OrgId::default(), "Salon", "Nice", Some(d(4, 10)), Some(d(4, 12)))
            .with_id(ShowId::new("s1")),
    )
    .unwrap();
    p.upsert_show(
        Show::new(OrgId::default(), "TBD", "Nice", None, None).with_id(ShowId::new("s2")),
    )
    .unwrap();

    let report = p.auto_assign(&OrgId::default(), &SuggestOptions::default());
    let mut buf = Vec::new();
    io::write_report_csv(&mut buf, &report).unwrap();
    let csv = String::from_utf8(buf).unwrap();

    insta::assert_snapshot!(csv.trim_end(), @r###"
    show_id,kit_id,window_start,window_end,confidence,conflicts,reason
    s1,k1,2025-04-08,2025-04-14,0.60,0,Booth A (standard) is free over 2025-04-08..2025-04-14; no booking within 14 days
    s2,,,,,,missing dates
    "###);
}

#[test]
fn ledger_survives_a_save_load_cycle() {
    let dir = tempdir().unwrap();
    let storage = JsonStorage::open(dir.path().join("ledger.json")).unwrap();
    assert!(!storage.exists());
    assert!(storage.load_or_default().unwrap().kits.is_empty());

    let mut p = Planner::new();
    p.upsert_kit(
        Kit::new(OrgId::default(), "Booth A", KitType::Standard, "Lyon", 2, 2)
            .with_id(KitId::new("k1")),
    )
    .unwrap();
    p.upsert_show(
        Show::new(OrgId::default(), "Salon", "Nice", Some(d(4, 10)), Some(d(4, 12)))
            .with_id(ShowId::new("s1")),
    )
    .unwrap();
    let dates = AssignmentDates {
        ship_date: Some(d(4, 7)),
        ..Default::default()
    };
    let id = p
        .assign_manual(&KitId::new("k1"), &ShowId::new("s1"), dates)
        .unwrap();
    storage.save(p.ledger()).unwrap();

    let reloaded = Planner::from_ledger(storage.load().unwrap());
    assert_eq!(reloaded.ledger().assignments, p.ledger().assignments);
    assert_eq!(reloaded.assignment_window(&id).unwrap().start, d(4, 7));

    let out = dir.path().join("assignments.csv");
    io::export_assignments_csv(&out, &reloaded).unwrap();
    let written = fs::read_to_string(out).unwrap();
    assert!(written.starts_with("id,kit_id,show_id,status,window_start,window_end,ai_confidence"));
    assert!(written.contains(",k1,s1,planned,2025-04-07,2025-04-14,"));
}
