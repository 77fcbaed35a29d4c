#![forbid(unsafe_code)]
use chrono::NaiveDate;
use kitplan::{
    AssignmentDates, AssignmentStatus, Kit, KitId, KitStatus, KitType, OrgId, Planner, Show,
    ShowId,
};

fn d(m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, m, day).unwrap()
}

fn k() -> KitId {
    KitId::new("Flagship-1")
}

/// Flagship-1 réservé pour X [1-5 mars] puis Y [15-18 mars].
fn booked() -> Planner {
    let mut p = Planner::new();
    let mut kit = Kit::new(OrgId::default(), "Flagship-1", KitType::Flagship, "Lyon", 3, 5)
        .with_id(k());
    kit.current_location = Some("Entrepôt Lyon".into());
    p.upsert_kit(kit).unwrap();
    for (id, start, end) in [("X", d(3, 1), d(3, 5)), ("Y", d(3, 15), d(3, 18))] {
        p.upsert_show(
            Show::new(OrgId::default(), id, "Paris", Some(start), Some(end)).with_id(ShowId::new(id)),
        )
        .unwrap();
        p.assign_manual(&k(), &ShowId::new(id), AssignmentDates::default())
            .unwrap();
    }
    p
}

#[test]
fn busy_kit_is_free_the_day_after_its_window() {
    let p = booked();
    let a = p.availability(&k(), d(3, 2)).unwrap();
    assert_eq!(a.status, KitStatus::Assigned);
    assert!(a.current_assignment.is_some());
    assert_eq!(a.available_from, d(3, 11));
    assert_eq!(a.current_location.as_deref(), Some("Entrepôt Lyon"));

    let next = a.next_assignment.unwrap();
    assert_eq!(next.show_id, ShowId::new("Y"));
    assert_eq!(next.window.start, d(3, 12));
    assert_eq!(next.window.end, d(3, 23));
}

#[test]
fn idle_kit_is_available_now() {
    let p = booked();
    let a = p.availability(&k(), d(3, 11)).unwrap();
    assert_eq!(a.status, KitStatus::Available);
    assert_eq!(a.current_assignment, None);
    assert_eq!(a.available_from, d(3, 11));
    assert_eq!(a.next_assignment.unwrap().show_id, ShowId::new("Y"));

    let later = p.availability(&k(), d(4, 1)).unwrap();
    assert_eq!(later.status, KitStatus::Available);
    assert!(later.next_assignment.is_none());
}

#[test]
fn shipped_kit_is_in_transit() {
    let mut p = booked();
    let x = p
        .ledger()
        .assignments
        .iter()
        .find(|a| a.show_id == ShowId::new("X"))
        .map(|a| a.id.clone())
        .unwrap();
    p.transition(&x, AssignmentStatus::Confirmed).unwrap();
    p.update_dates(
        &x,
        AssignmentDates {
            ship_date: Some(d(2, 26)),
            ..Default::default()
        },
    )
    .unwrap();
    p.transition(&x, AssignmentStatus::Shipped).unwrap();

    assert_eq!(p.availability(&k(), d(2, 27)).unwrap().status, KitStatus::InTransit);
}

#[test]
fn maintenance_flag_wins_over_bookings() {
    let mut p = booked();
    let mut kit = p.ledger().find_kit(&k()).cloned().unwrap();
    kit.status = KitStatus::Maintenance;
    p.upsert_kit(kit).unwrap();

    assert_eq!(p.availability(&k(), d(4, 1)).unwrap().status, KitStatus::Maintenance);
    assert_eq!(p.availability(&k(), d(3, 2)).unwrap().status, KitStatus::Maintenance);
}

#[test]
fn report_covers_active_kits_of_the_organisation() {
    let mut p = booked();
    p.upsert_kit(
        Kit::new(OrgId::new("acme"), "Acme", KitType::Compact, "Nice", 1, 1)
            .with_id(KitId::new("acme-1")),
    )
    .unwrap();

    let report = p.availability_report(&OrgId::default(), d(3, 2));
    assert_eq!(report.len(), 1);
    assert_eq!(report[0].kit_id, k());
    assert!(p.availability(&KitId::new("ghost"), d(3, 2)).is_err());
}
