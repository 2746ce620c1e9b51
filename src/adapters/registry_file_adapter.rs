//! Instrument registry file adapter.
//!
//! `<data_dir>/stocks.txt`, one instrument per line: `code englishName localName`.

use std::path::PathBuf;

use crate::adapters::tsv;
use crate::domain::error::TastError;
use crate::ports::registry_port::{Instrument, RegistryPort};

pub const REGISTRY_FILE_NAME: &str = "stocks.txt";

pub struct RegistryFileAdapter {
    data_dir: PathBuf,
}

impl RegistryFileAdapter {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn registry_path(&self) -> PathBuf {
        self.data_dir.join(REGISTRY_FILE_NAME)
    }
}

impl RegistryPort for RegistryFileAdapter {
    fn instruments(&self) -> Result<Vec<Instrument>, TastError> {
        let path = self.registry_path();
        let source = path.display().to_string();
        let mut instruments = Vec::new();

        for (line, row) in tsv::read_records(&path)? {
            tsv::expect_fields(&source, line, &row, 3)?;
            let code = row[0].trim().to_uppercase();
            if code.is_empty() {
                return Err(TastError::format(&source, line, "empty instrument code"));
            }
            instruments.push(Instrument {
                code,
                display_name: row[1].trim().to_string(),
            });
        }

        Ok(instruments)
    }
}
