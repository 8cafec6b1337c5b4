//! Property tests for alignment invariants.
//!
//! Uses proptest to verify:
//! 1. Outer join keeps exactly the union of dates and never invents values
//! 2. Equity outer merges commute
//! 3. Inner join keeps exactly the intersection of dates
//! 4. Dates stay unique and ascending after any merge sequence

use chrono::{Duration, NaiveDate};
use pricegrid_core::data::{ClosingSeries, JoinKind, SeriesTable};
use proptest::prelude::*;
use std::collections::BTreeSet;

// ── Strategies (proptest) ────────────────────────────────────────────

fn base() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 2).unwrap()
}

fn arb_series(symbol: &'static str) -> impl Strategy<Value = ClosingSeries> {
    prop::collection::btree_map(0i64..120, 1.0..500.0_f64, 1..60).prop_map(move |points| {
        ClosingSeries::new(
            symbol,
            points
                .into_iter()
                .map(|(offset, close)| (base() + Duration::days(offset), close)),
        )
    })
}

fn dates_of(series: &ClosingSeries) -> BTreeSet<NaiveDate> {
    series.points.keys().copied().collect()
}

// ── 1. Outer join completeness ───────────────────────────────────────

proptest! {
    #[test]
    fn outer_join_is_union(a in arb_series("AAA"), b in arb_series("BBB")) {
        let mut table = SeriesTable::new();
        table.merge(Some(a.clone()), JoinKind::Outer);
        table.merge(Some(b.clone()), JoinKind::Outer);

        let expected: BTreeSet<NaiveDate> = dates_of(&a).union(&dates_of(&b)).copied().collect();
        let actual: BTreeSet<NaiveDate> = table.dates().collect();
        prop_assert_eq!(actual, expected);

        for date in table.dates() {
            prop_assert_eq!(table.get(date, "AAA"), a.points.get(&date).copied());
            prop_assert_eq!(table.get(date, "BBB"), b.points.get(&date).copied());
        }
    }

    // ── 2. Commutativity ─────────────────────────────────────────────

    #[test]
    fn outer_merges_commute(a in arb_series("AAA"), b in arb_series("BBB"), c in arb_series("CCC")) {
        let mut forward = SeriesTable::new();
        for s in [a.clone(), b.clone(), c.clone()] {
            forward.merge(Some(s), JoinKind::Outer);
        }
        let mut backward = SeriesTable::new();
        for s in [c, b, a] {
            backward.merge(Some(s), JoinKind::Outer);
        }

        let fwd_dates: Vec<NaiveDate> = forward.dates().collect();
        let bwd_dates: Vec<NaiveDate> = backward.dates().collect();
        prop_assert_eq!(fwd_dates, bwd_dates);
        for date in forward.dates() {
            for symbol in ["AAA", "BBB", "CCC"] {
                prop_assert_eq!(forward.get(date, symbol), backward.get(date, symbol));
            }
        }
    }

    // ── 3. Inner join restriction ────────────────────────────────────

    #[test]
    fn inner_join_is_intersection(a in arb_series("AAA"), r in arb_series("^TYX")) {
        let mut table = SeriesTable::from_series(a.clone());
        table.merge(Some(r.clone()), JoinKind::Inner);

        let expected: BTreeSet<NaiveDate> =
            dates_of(&a).intersection(&dates_of(&r)).copied().collect();
        let actual: BTreeSet<NaiveDate> = table.dates().collect();
        prop_assert_eq!(actual, expected);
        for date in table.dates() {
            prop_assert!(table.get(date, "^TYX").is_some());
        }
    }

    // ── 4. Ordering ──────────────────────────────────────────────────

    #[test]
    fn dates_stay_sorted_and_unique(
        a in arb_series("AAA"),
        b in arb_series("BBB"),
        r in arb_series("^OEX"),
    ) {
        let mut table = SeriesTable::new();
        table.merge(Some(a), JoinKind::Outer);
        table.merge(Some(b), JoinKind::Outer);
        table.merge(Some(r), JoinKind::Inner);

        let dates: Vec<NaiveDate> = table.dates().collect();
        for pair in dates.windows(2) {
            prop_assert!(pair[0] < pair[1]);
        }
    }
}

#[test]
fn strict_subset_reference_shrinks_table_exactly() {
    let dates: Vec<NaiveDate> = (0..10).map(|i| base() + Duration::days(i)).collect();
    let equity = ClosingSeries::new("AAA", dates.iter().map(|d| (*d, 1.0)));
    let subset = [dates[2], dates[3], dates[7]];
    let reference = ClosingSeries::new("^TYX", subset.iter().map(|d| (*d, 4.0)));

    let mut table = SeriesTable::from_series(equity);
    table.merge(Some(reference), JoinKind::Inner);

    let kept: Vec<NaiveDate> = table.dates().collect();
    assert_eq!(kept, subset.to_vec());
}
