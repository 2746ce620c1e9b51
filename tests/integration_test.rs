//! Integration tests for the indicator engine.
//!
//! Tests cover:
//! - Engine driver with mock ports: cache hits, persistence, fail-fast
//! - Full pipeline over the file adapters in a temporary data directory
//! - Idempotence: a second run leaves result files byte-identical
//! - The two-day extrema and volatility scenarios end to end

mod common;

use common::*;
use std::fs;
use tast::adapters::daily_file_adapter::DailyFileAdapter;
use tast::adapters::registry_file_adapter::RegistryFileAdapter;
use tast::adapters::tsv_result_store::TsvResultStore;
use tast::domain::engine::{Engine, InstrumentState};
use tast::domain::error::TastError;
use tast::domain::indicator::{IndicatorFamily, IndicatorValue, PeriodRange};
use tast::ports::result_store_port::ResultStore;
use tempfile::TempDir;

fn two_day_history() -> Vec<DailyRecord> {
    vec![
        DailyRecord {
            code: "ABC".into(),
            date: date(2020, 1, 1),
            previous_date: None,
            open: 9.0,
            close: 9.0,
            high: 10.0,
            low: 8.0,
            volume: 100,
        },
        DailyRecord {
            code: "ABC".into(),
            date: date(2020, 1, 2),
            previous_date: Some(date(2020, 1, 1)),
            open: 10.0,
            close: 11.0,
            high: 12.0,
            low: 9.0,
            volume: 200,
        },
    ]
}

mod engine_with_mock_ports {
    use super::*;

    #[test]
    fn cache_miss_computes_and_persists_complete_set() {
        let history = MockHistoryPort::new().with_records("ABC", two_day_history());
        let store = MemoryResultStore::new();
        let engine = Engine::new(&history, &store, IndicatorFamily::Extrema, 4);

        let state = engine.process_instrument("ABC").unwrap();
        assert_eq!(state, InstrumentState::Persisted);

        let saved = store.saved.borrow();
        let set = saved.get("ABC").unwrap();
        assert!(set.ensure_complete(PeriodRange::SUPPORTED).is_ok());
        assert_eq!(set.series.len(), 49);

        let period_two = set.get(2).unwrap();
        assert_eq!(
            period_two[0].value,
            IndicatorValue::Extrema { min: 8.0, max: 10.0 }
        );
        assert_eq!(
            period_two[1].value,
            IndicatorValue::Extrema { min: 8.0, max: 12.0 }
        );
    }

    #[test]
    fn cache_hit_skips_computation() {
        let history = MockHistoryPort::new().with_records("ABC", two_day_history());
        let store = MemoryResultStore::new().with_cached("ABC");
        let engine = Engine::new(&history, &store, IndicatorFamily::Volatility, 4);

        let state = engine.process_instrument("ABC").unwrap();

        assert_eq!(state, InstrumentState::Skipped);
        assert_eq!(*store.save_calls.borrow(), 0);
        // history is fetched before the cache check
        assert_eq!(history.calls.borrow().as_slice(), ["ABC"]);
    }

    #[test]
    fn run_all_reports_persisted_and_skipped() {
        let start = date(2021, 6, 1);
        let history = MockHistoryPort::new()
            .with_records("AAA", generate_records("AAA", start, 60, 10.0))
            .with_records("BBB", generate_records("BBB", start, 60, 20.0))
            .with_records("CCC", generate_records("CCC", start, 60, 30.0));
        let store = MemoryResultStore::new().with_cached("BBB");
        let registry = MockRegistry::new(&["AAA", "BBB", "CCC"]);

        let summary = Engine::new(&history, &store, IndicatorFamily::Extrema, 3)
            .run_all(&registry)
            .unwrap();

        assert_eq!(summary.persisted, vec!["AAA".to_string(), "CCC".to_string()]);
        assert_eq!(summary.skipped, vec!["BBB".to_string()]);
        assert_eq!(*store.save_calls.borrow(), 2);
    }

    #[test]
    fn run_all_stops_at_first_error() {
        let start = date(2021, 6, 1);
        let history = MockHistoryPort::new()
            .with_records("AAA", generate_records("AAA", start, 10, 10.0))
            .with_error("BBB", "corrupt history")
            .with_records("CCC", generate_records("CCC", start, 10, 30.0));
        let store = MemoryResultStore::new();
        let registry = MockRegistry::new(&["AAA", "BBB", "CCC"]);

        let err = Engine::new(&history, &store, IndicatorFamily::Volatility, 2)
            .run_all(&registry)
            .unwrap_err();

        assert!(matches!(err, TastError::Format { .. }));
        assert!(store.saved.borrow().contains_key("AAA"));
        assert!(!store.saved.borrow().contains_key("CCC"));
        assert_eq!(history.calls.borrow().as_slice(), ["AAA", "BBB"]);
    }

    #[test]
    fn missing_history_fails_instrument() {
        let history = MockHistoryPort::new();
        let store = MemoryResultStore::new();
        let engine = Engine::new(&history, &store, IndicatorFamily::Extrema, 2);

        assert!(matches!(
            engine.process_instrument("NOPE"),
            Err(TastError::NoData { .. })
        ));
        assert_eq!(*store.save_calls.borrow(), 0);
    }
}

mod file_pipeline {
    use super::*;

    fn seed(data_dir: &std::path::Path) {
        write_registry(data_dir, &["ABC", "XYZ"]);
        let daily = DailyFileAdapter::new(data_dir.to_path_buf());
        daily.write_history("ABC", &two_day_history()).unwrap();
        daily
            .write_history("XYZ", &generate_records("XYZ", date(2022, 1, 3), 80, 50.0))
            .unwrap();
    }

    #[test]
    fn both_families_persist_expected_lines() {
        let dir = TempDir::new().unwrap();
        seed(dir.path());
        let registry = RegistryFileAdapter::new(dir.path().to_path_buf());
        let history = DailyFileAdapter::new(dir.path().to_path_buf());

        for family in IndicatorFamily::ALL {
            let store = TsvResultStore::new(dir.path().to_path_buf(), family);
            let summary = Engine::new(&history, &store, family, 4)
                .run_all(&registry)
                .unwrap();
            assert_eq!(summary.persisted.len(), 2);
        }

        let extrema = fs::read_to_string(dir.path().join("ABC").join("PeroidExterma.txt")).unwrap();
        let lines: Vec<&str> = extrema.lines().collect();
        assert_eq!(lines.len(), 49 * 2);
        assert_eq!(lines[0], "2\t20200101\t10.000000\t8.000000");
        assert_eq!(lines[1], "2\t20200102\t12.000000\t8.000000");

        let turtle = fs::read_to_string(dir.path().join("ABC").join("Turtle.txt")).unwrap();
        let lines: Vec<&str> = turtle.lines().collect();
        assert_eq!(lines.len(), 49 * 2);
        assert_eq!(lines[0], "2\t20200101\t5.000000\t10.000000");
        assert_eq!(lines[1], "2\t20200102\t4.000000\t3.000000");
        assert_eq!(lines[2], "3\t20200101\t3.333333\t10.000000");
    }

    #[test]
    fn second_run_is_idempotent() {
        let dir = TempDir::new().unwrap();
        seed(dir.path());
        let registry = RegistryFileAdapter::new(dir.path().to_path_buf());
        let history = DailyFileAdapter::new(dir.path().to_path_buf());
        let store = TsvResultStore::new(dir.path().to_path_buf(), IndicatorFamily::Extrema);
        let engine = Engine::new(&history, &store, IndicatorFamily::Extrema, 8);

        let first = engine.run_all(&registry).unwrap();
        assert_eq!(first.persisted.len(), 2);
        let before = fs::read(store.result_path("XYZ")).unwrap();

        let second = engine.run_all(&registry).unwrap();
        assert!(second.persisted.is_empty());
        assert_eq!(second.skipped.len(), 2);
        assert_eq!(fs::read(store.result_path("XYZ")).unwrap(), before);
    }

    #[test]
    fn existing_file_is_trusted_regardless_of_content() {
        let dir = TempDir::new().unwrap();
        seed(dir.path());
        let history = DailyFileAdapter::new(dir.path().to_path_buf());
        let store = TsvResultStore::new(dir.path().to_path_buf(), IndicatorFamily::Volatility);
        fs::write(store.result_path("ABC"), "garbage").unwrap();

        let state = Engine::new(&history, &store, IndicatorFamily::Volatility, 2)
            .process_instrument("ABC")
            .unwrap();

        assert_eq!(state, InstrumentState::Skipped);
        assert_eq!(fs::read_to_string(store.result_path("ABC")).unwrap(), "garbage");
    }

    #[test]
    fn persisted_set_loads_back() {
        let dir = TempDir::new().unwrap();
        seed(dir.path());
        let history = DailyFileAdapter::new(dir.path().to_path_buf());
        let store = TsvResultStore::new(dir.path().to_path_buf(), IndicatorFamily::Extrema);

        Engine::new(&history, &store, IndicatorFamily::Extrema, 4)
            .process_instrument("XYZ")
            .unwrap();

        let loaded = store.load("XYZ").unwrap();
        assert!(loaded.ensure_complete(PeriodRange::SUPPORTED).is_ok());
        for (period, points) in &loaded.series {
            assert_eq!(points.len(), 80);
            assert!(points.windows(2).all(|w| w[0].date < w[1].date));
            assert!(points.iter().all(|p| p.period == *period));
        }
    }
}
