#![forbid(unsafe_code)]
use chrono::{Duration, NaiveDate};
use kitplan::{overlap_days, overlaps, DateWindow};
use proptest::prelude::*;

fn d(m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, m, day).unwrap()
}

fn window_from(offset: i64, len: i64) -> DateWindow {
    let start = d(1, 1) + Duration::days(offset);
    DateWindow::new(start, start + Duration::days(len)).unwrap()
}

#[test]
fn touching_endpoints_conflict_for_one_day() {
    let a = DateWindow::new(d(1, 1), d(1, 5)).unwrap();
    let b = DateWindow::new(d(1, 5), d(1, 10)).unwrap();
    assert!(overlaps(&a, &b));
    assert_eq!(overlap_days(&a, &b), 1);
}

#[test]
fn next_day_is_free() {
    let a = DateWindow::new(d(1, 1), d(1, 5)).unwrap();
    let b = DateWindow::new(d(1, 6), d(1, 10)).unwrap();
    assert!(!overlaps(&a, &b));
    assert_eq!(overlap_days(&a, &b), 0);
}

#[test]
fn inverted_window_is_rejected() {
    assert!(DateWindow::new(d(1, 5), d(1, 4)).is_err());
    let single = DateWindow::new(d(1, 5), d(1, 5)).unwrap();
    assert_eq!(single.days(), 1);
}

proptest! {
    #[test]
    fn overlap_is_symmetric(a in 0i64..400, la in 0i64..40, b in 0i64..400, lb in 0i64..40) {
        let w1 = window_from(a, la);
        let w2 = window_from(b, lb);
        prop_assert_eq!(overlaps(&w1, &w2), overlaps(&w2, &w1));
        prop_assert_eq!(overlap_days(&w1, &w2), overlap_days(&w2, &w1));
    }

    #[test]
    fn overlap_days_agrees_with_overlaps(a in 0i64..400, la in 0i64..40, b in 0i64..400, lb in 0i64..40) {
        let w1 = window_from(a, la);
        let w2 = window_from(b, lb);
        prop_assert_eq!(overlaps(&w1, &w2), overlap_days(&w1, &w2) > 0);
        prop_assert!(overlap_days(&w1, &w2) <= w1.days().min(w2.days()));
    }
}
