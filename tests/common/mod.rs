#![allow(dead_code)]

use chrono::NaiveDate;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
pub use tast::domain::daily::DailyRecord;
use tast::domain::error::TastError;
use tast::domain::fanout::PeriodResultSet;
use tast::ports::history_port::HistoryPort;
use tast::ports::registry_port::{Instrument, RegistryPort};
use tast::ports::result_store_port::ResultStore;

pub struct MockHistoryPort {
    pub data: HashMap<String, Vec<DailyRecord>>,
    pub errors: HashMap<String, String>,
    pub calls: RefCell<Vec<String>>,
}

impl MockHistoryPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_records(mut self, code: &str, records: Vec<DailyRecord>) -> Self {
        self.data.insert(code.to_string(), records);
        self
    }

    pub fn with_error(mut self, code: &str, reason: &str) -> Self {
        self.errors.insert(code.to_string(), reason.to_string());
        self
    }
}

impl HistoryPort for MockHistoryPort {
    fn daily_history(&self, code: &str) -> Result<Vec<DailyRecord>, TastError> {
        self.calls.borrow_mut().push(code.to_string());
        if let Some(reason) = self.errors.get(code) {
            return Err(TastError::format(code, 1, reason.clone()));
        }
        self.data
            .get(code)
            .cloned()
            .ok_or_else(|| TastError::NoData { code: code.into() })
    }
}

pub struct MockRegistry {
    pub codes: Vec<String>,
}

impl MockRegistry {
    pub fn new(codes: &[&str]) -> Self {
        Self {
            codes: codes.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl RegistryPort for MockRegistry {
    fn instruments(&self) -> Result<Vec<Instrument>, TastError> {
        Ok(self
            .codes
            .iter()
            .map(|c| Instrument {
                code: c.clone(),
                display_name: format!("{c} Corp"),
            })
            .collect())
    }
}

/// In-memory store that records every save.
pub struct MemoryResultStore {
    pub saved: RefCell<HashMap<String, PeriodResultSet>>,
    pub preexisting: HashSet<String>,
    pub save_calls: RefCell<usize>,
}

impl MemoryResultStore {
    pub fn new() -> Self {
        Self {
            saved: RefCell::new(HashMap::new()),
            preexisting: HashSet::new(),
            save_calls: RefCell::new(0),
        }
    }

    pub fn with_cached(mut self, code: &str) -> Self {
        self.preexisting.insert(code.to_string());
        self
    }
}

impl ResultStore for MemoryResultStore {
    fn exists(&self, code: &str) -> bool {
        self.preexisting.contains(code) || self.saved.borrow().contains_key(code)
    }

    fn save(&self, code: &str, results: &PeriodResultSet) -> Result<(), TastError> {
        *self.save_calls.borrow_mut() += 1;
        self.saved
            .borrow_mut()
            .insert(code.to_string(), results.clone());
        Ok(())
    }

    fn load(&self, code: &str) -> Result<PeriodResultSet, TastError> {
        self.saved.borrow().get(code).cloned().ok_or_else(|| {
            TastError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, code.to_string()))
        })
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Ascending, linked history with a gently rising price.
pub fn generate_records(code: &str, start: NaiveDate, count: usize, start_price: f64) -> Vec<DailyRecord> {
    (0..count)
        .map(|i| {
            let date = start + chrono::Duration::days(i as i64);
            let price = start_price + i as f64;
            DailyRecord {
                code: code.to_string(),
                date,
                previous_date: (i > 0).then(|| date - chrono::Duration::days(1)),
                open: price,
                close: price + 0.5,
                high: price + 1.0,
                low: price - 1.0,
                volume: 1000,
            }
        })
        .collect()
}

pub fn write_registry(data_dir: &Path, codes: &[&str]) {
    let content: String = codes
        .iter()
        .map(|c| format!("{c}\t{c} Inc.\t{c}\n"))
        .collect();
    fs::write(data_dir.join("stocks.txt"), content).unwrap();
}

pub fn write_config(dir: &Path, data_dir: &Path) -> std::path::PathBuf {
    let path = dir.join("config.ini");
    fs::write(
        &path,
        format!(
            "[path]\ndatadir = {}\n\n[engine]\nworkers = 4\n",
            data_dir.display()
        ),
    )
    .unwrap();
    path
}
