//! Integration tests for the interval pricer and the valuation stitcher.
//!
//! Tests cover:
//! - Share counts and daily values for a known two-stock basket
//! - Forward/backward fill priority on gapped price histories
//! - Compounding of the ending value into the next interval
//! - Date-conditioned exclusion rules and weight renormalisation
//! - Boundary-date handling for both policies
//! - Fatal missing-data errors and their propagation
//! - Reproducibility of repeated runs

mod common;

use approx::assert_relative_eq;
use common::*;
use portval::adapters::cached_price_store::CachedPriceStore;
use portval::domain::error::PortvalError;
use portval::domain::exclusion::{ExclusionRule, ExclusionRules, ExclusionWhen};
use portval::domain::interval::{WeightMode, price_interval};
use portval::domain::snapshot::{Holding, build_snapshots};
use portval::domain::stitcher::{BoundaryPolicy, StitchConfig, stitch};

fn config(initial_value: f64, out_of_sample_days: i64, boundary: BoundaryPolicy) -> StitchConfig {
    StitchConfig {
        initial_value,
        out_of_sample_days,
        weight_mode: WeightMode::Weighted,
        boundary,
    }
}

fn two_interval_store() -> MockPriceStore {
    MockPriceStore::new()
        .with_prices("A", &[("2024-01-01", 50.0), ("2024-01-03", 55.0)])
        .with_prices("B", &[("2024-01-01", 20.0), ("2024-01-03", 18.0)])
        .with_prices(
            "C",
            &[("2024-01-03", 10.0), ("2024-01-04", 11.0), ("2024-01-05", 12.0)],
        )
}

fn two_interval_schedule() -> Vec<portval::domain::snapshot::RebalanceSnapshot> {
    build_snapshots(&[
        weight("2024-01-01", "A", 0.6),
        weight("2024-01-01", "B", 0.4),
        weight("2024-01-03", "C", 1.0),
    ])
    .unwrap()
}

mod interval_pricer {
    use super::*;

    #[test]
    fn weighted_two_stock_scenario() {
        let store = MockPriceStore::new()
            .with_prices("A", &[("2024-01-01", 50.0), ("2024-01-02", 55.0)])
            .with_prices("B", &[("2024-01-01", 20.0), ("2024-01-02", 18.0)]);
        let holdings = vec![Holding::new("B", 0.4), Holding::new("A", 0.6)];

        let iv = price_interval(
            &store,
            date(2024, 1, 1),
            date(2024, 1, 2),
            &holdings,
            1000.0,
            WeightMode::Weighted,
        )
        .unwrap();

        assert_eq!(iv.positions[0].symbol, "A");
        assert_relative_eq!(iv.positions[0].shares, 12.0, epsilon = 1e-9);
        assert_relative_eq!(iv.positions[1].shares, 20.0, epsilon = 1e-9);
        assert_relative_eq!(iv.points[1].value, 1020.0, epsilon = 1e-9);
    }

    #[test]
    fn equal_mode_splits_capital_evenly() {
        let store = MockPriceStore::new()
            .with_prices("A", &[("2024-01-01", 50.0)])
            .with_prices("B", &[("2024-01-01", 20.0)])
            .with_prices("C", &[("2024-01-01", 7.0)]);
        let holdings = vec![
            Holding::new("A", 0.7),
            Holding::new("B", 0.2),
            Holding::new("C", 0.1),
        ];

        let iv = price_interval(
            &store,
            date(2024, 1, 1),
            date(2024, 1, 1),
            &holdings,
            900.0,
            WeightMode::Equal,
        )
        .unwrap();

        for position in &iv.positions {
            assert_relative_eq!(position.start_value(), 300.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn interior_gap_takes_previous_price() {
        let store = MockPriceStore::new().with_prices(
            "A",
            &[("2024-01-01", 10.0), ("2024-01-02", 20.0), ("2024-01-05", 40.0)],
        );

        let iv = price_interval(
            &store,
            date(2024, 1, 1),
            date(2024, 1, 5),
            &[Holding::new("A", 1.0)],
            10.0,
            WeightMode::Weighted,
        )
        .unwrap();

        // one share; value equals the filled price
        let values: Vec<f64> = iv.points.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![10.0, 20.0, 20.0, 20.0, 40.0]);
    }

    #[test]
    fn leading_gap_takes_first_price() {
        let store = MockPriceStore::new()
            .with_prices("A", &[("2023-12-20", 1.0), ("2024-01-03", 30.0), ("2024-01-04", 33.0)]);

        let iv = price_interval(
            &store,
            date(2024, 1, 1),
            date(2024, 1, 4),
            &[Holding::new("A", 1.0)],
            30.0,
            WeightMode::Weighted,
        )
        .unwrap();

        // the pre-window 1.0 observation is never used
        assert_eq!(iv.positions[0].start_price, 30.0);
        let values: Vec<f64> = iv.points.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![30.0, 30.0, 30.0, 33.0]);
    }

    #[test]
    fn dense_axis_covers_non_trading_days() {
        let store = MockPriceStore::new()
            .with_prices("A", &[("2024-01-05", 10.0), ("2024-01-08", 11.0)]);

        let iv = price_interval(
            &store,
            date(2024, 1, 5),
            date(2024, 1, 8),
            &[Holding::new("A", 1.0)],
            10.0,
            WeightMode::Weighted,
        )
        .unwrap();

        let dates: Vec<_> = iv.points.iter().map(|p| p.date).collect();
        assert_eq!(
            dates,
            vec![date(2024, 1, 5), date(2024, 1, 6), date(2024, 1, 7), date(2024, 1, 8)]
        );
    }

    #[test]
    fn no_data_in_window_is_fatal() {
        let store = MockPriceStore::new()
            .with_prices("A", &[("2024-01-01", 10.0)])
            .with_prices("B", &[("2023-06-01", 5.0)]);

        let err = price_interval(
            &store,
            date(2024, 1, 1),
            date(2024, 1, 31),
            &[Holding::new("A", 0.5), Holding::new("B", 0.5)],
            1.0,
            WeightMode::Weighted,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            PortvalError::NoPriceData { ref symbol, start, end }
                if symbol == "B" && start == date(2024, 1, 1) && end == date(2024, 1, 31)
        ));
    }

    #[test]
    fn store_error_is_propagated() {
        let store = MockPriceStore::new().with_error("A", "disk on fire");
        let err = price_interval(
            &store,
            date(2024, 1, 1),
            date(2024, 1, 2),
            &[Holding::new("A", 1.0)],
            1.0,
            WeightMode::Weighted,
        )
        .unwrap_err();
        assert!(matches!(err, PortvalError::DataAccess { .. }));
    }
}

mod stitcher {
    use super::*;

    #[test]
    fn ending_value_rolls_into_next_interval() {
        let store = two_interval_store();
        let valuation = stitch(
            &store,
            &two_interval_schedule(),
            &ExclusionRules::none(),
            &config(1000.0, 2, BoundaryPolicy::Deduplicate),
        )
        .unwrap();

        assert_eq!(valuation.intervals.len(), 2);
        assert_relative_eq!(valuation.intervals[0].end_value, 1020.0, epsilon = 1e-9);
        assert_eq!(
            valuation.intervals[1].start_value,
            valuation.intervals[0].end_value
        );
        assert_eq!(valuation.intervals[0].holdings, vec!["A", "B"]);
        assert_eq!(valuation.intervals[1].holdings, vec!["C"]);
        assert_eq!(valuation.intervals[1].end, date(2024, 1, 5));

        // 102 shares of C: 1020 → 1122 → 1224
        let values = valuation.values();
        assert_relative_eq!(values[3], 1122.0, epsilon = 1e-9);
        assert_relative_eq!(values[4], 1224.0, epsilon = 1e-9);
    }

    #[test]
    fn continuity_holds_across_every_boundary() {
        let store = MockPriceStore::new()
            .with_ramp("A", "2024-01-01", 120, 10.0, 0.25)
            .with_ramp("B", "2024-01-01", 120, 50.0, -0.1)
            .with_ramp("C", "2024-01-01", 120, 5.0, 0.05);
        let snapshots = build_snapshots(&[
            weight("2024-01-01", "A", 0.5),
            weight("2024-01-01", "B", 0.5),
            weight("2024-02-01", "B", 0.2),
            weight("2024-02-01", "C", 0.8),
            weight("2024-03-01", "A", 0.3),
            weight("2024-03-01", "B", 0.3),
            weight("2024-03-01", "C", 0.4),
        ])
        .unwrap();

        let valuation = stitch(
            &store,
            &snapshots,
            &ExclusionRules::none(),
            &config(1.0, 30, BoundaryPolicy::Deduplicate),
        )
        .unwrap();

        for pair in valuation.intervals.windows(2) {
            assert_eq!(pair[1].start_value, pair[0].end_value);
            assert_eq!(pair[0].end, pair[1].start);
        }
        assert_eq!(valuation.intervals[0].start_value, 1.0);
        assert_eq!(
            valuation.final_value(),
            Some(valuation.intervals[2].end_value)
        );
    }

    #[test]
    fn dedupe_keeps_each_date_once() {
        let store = two_interval_store();
        let valuation = stitch(
            &store,
            &two_interval_schedule(),
            &ExclusionRules::none(),
            &config(1000.0, 2, BoundaryPolicy::Deduplicate),
        )
        .unwrap();

        let dates = valuation.dates();
        assert_eq!(dates.len(), 5);
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
        // boundary carries the earlier interval's closing value
        assert_eq!(dates[2], date(2024, 1, 3));
        assert_eq!(valuation.points[2].value, valuation.intervals[0].end_value);
    }

    #[test]
    fn duplicate_keeps_raw_concatenation() {
        let store = two_interval_store();
        let valuation = stitch(
            &store,
            &two_interval_schedule(),
            &ExclusionRules::none(),
            &config(1000.0, 2, BoundaryPolicy::Duplicate),
        )
        .unwrap();

        let dates = valuation.dates();
        assert_eq!(dates.len(), 6);
        assert_eq!(dates[2], date(2024, 1, 3));
        assert_eq!(dates[3], date(2024, 1, 3));
        assert_relative_eq!(valuation.points[2].value, 1020.0, epsilon = 1e-9);
        assert_relative_eq!(valuation.points[3].value, 1020.0, epsilon = 1e-9);
    }

    #[test]
    fn date_conditioned_exclusion_applies_only_when_triggered() {
        let store = MockPriceStore::new()
            .with_ramp("A", "2024-01-01", 90, 10.0, 0.0)
            .with_ramp("X", "2024-01-01", 90, 20.0, 0.0);
        let snapshots = build_snapshots(&[
            weight("2024-01-01", "A", 0.5),
            weight("2024-01-01", "X", 0.5),
            weight("2024-02-01", "A", 0.5),
            weight("2024-02-01", "X", 0.5),
        ])
        .unwrap();
        let rules = ExclusionRules::new(vec![ExclusionRule::new(
            "X",
            ExclusionWhen::EndsAfter(date(2024, 2, 15)),
        )]);

        let valuation = stitch(&store, &snapshots, &rules, &config(100.0, 20, BoundaryPolicy::Deduplicate))
            .unwrap();

        // first interval ends 2024-02-01: X kept
        assert_eq!(valuation.intervals[0].holdings, vec!["A", "X"]);
        assert!(valuation.intervals[0].excluded.is_empty());
        // second interval ends 2024-02-21: X dropped, A renormalised to the full value
        assert_eq!(valuation.intervals[1].holdings, vec!["A"]);
        assert_eq!(valuation.intervals[1].excluded, vec!["X"]);
        assert_relative_eq!(valuation.intervals[1].end_value, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn missing_data_aborts_whole_run() {
        let store = MockPriceStore::new()
            .with_prices("A", &[("2024-01-01", 10.0), ("2024-01-10", 11.0)])
            .with_prices("B", &[("2024-01-01", 10.0)]);
        let snapshots = build_snapshots(&[
            weight("2024-01-01", "A", 1.0),
            weight("2024-01-05", "B", 1.0),
        ])
        .unwrap();

        let err = stitch(&store, &snapshots, &ExclusionRules::none(), &config(1.0, 5, BoundaryPolicy::Deduplicate))
            .unwrap_err();

        assert!(matches!(
            err,
            PortvalError::NoPriceData { ref symbol, start, end }
                if symbol == "B" && start == date(2024, 1, 5) && end == date(2024, 1, 10)
        ));
    }

    #[test]
    fn basket_emptied_by_rules_is_an_error() {
        let store = MockPriceStore::new().with_prices("X", &[("2024-01-01", 10.0)]);
        let snapshots = build_snapshots(&[weight("2024-01-01", "X", 1.0)]).unwrap();
        let rules = ExclusionRules::new(vec![ExclusionRule::new("X", ExclusionWhen::Always)]);

        let err = stitch(&store, &snapshots, &rules, &config(1.0, 5, BoundaryPolicy::Deduplicate))
            .unwrap_err();
        assert!(matches!(err, PortvalError::EmptyBasket { .. }));
    }

    #[test]
    fn repeated_runs_are_identical() {
        let store = MockPriceStore::new()
            .with_ramp("A", "2024-01-01", 60, 13.7, 0.31)
            .with_ramp("B", "2024-01-01", 60, 91.3, -0.17)
            .with_ramp("C", "2024-01-01", 60, 3.3, 0.07);
        let snapshots = build_snapshots(&[
            weight("2024-01-01", "C", 0.1),
            weight("2024-01-01", "A", 0.37),
            weight("2024-01-01", "B", 0.53),
            weight("2024-01-20", "B", 0.9),
            weight("2024-01-20", "A", 0.1),
        ])
        .unwrap();
        let cfg = config(1.0, 25, BoundaryPolicy::Deduplicate);

        let first = stitch(&store, &snapshots, &ExclusionRules::none(), &cfg).unwrap();
        let second = stitch(&store, &snapshots, &ExclusionRules::none(), &cfg).unwrap();

        let bits = |v: &[f64]| v.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
        assert_eq!(first.dates(), second.dates());
        assert_eq!(bits(&first.values()), bits(&second.values()));
    }

    #[test]
    fn cached_store_loads_each_symbol_once() {
        let inner = MockPriceStore::new()
            .with_ramp("A", "2024-01-01", 60, 10.0, 0.1)
            .with_ramp("B", "2024-01-01", 60, 20.0, 0.1);
        let store = CachedPriceStore::new(inner);
        let snapshots = build_snapshots(&[
            weight("2024-01-01", "A", 0.5),
            weight("2024-01-01", "B", 0.5),
            weight("2024-01-15", "A", 0.5),
            weight("2024-01-15", "B", 0.5),
            weight("2024-02-01", "A", 1.0),
        ])
        .unwrap();

        stitch(&store, &snapshots, &ExclusionRules::none(), &config(1.0, 10, BoundaryPolicy::Deduplicate))
            .unwrap();

        assert_eq!(store.cached_len(), 2);
    }
}
