//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::daily_file_adapter::{DailyFileAdapter, read_raw_export};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::registry_file_adapter::RegistryFileAdapter;
use crate::adapters::tsv_result_store::TsvResultStore;
use crate::domain::daily::format_date;
use crate::domain::engine::{Engine, RunSummary};
use crate::domain::error::TastError;
use crate::domain::fanout::default_workers;
use crate::domain::indicator::{IndicatorFamily, IndicatorValue};
use crate::domain::normalize::normalize;
use crate::logging::init_logging;
use crate::ports::config_port::ConfigPort;
use crate::ports::registry_port::RegistryPort;
use crate::ports::result_store_port::ResultStore;

#[derive(Parser, Debug)]
#[command(name = "tast", about = "Period indicator computation and caching")]
pub struct Cli {
    /// INI configuration file
    #[arg(short, long, global = true, default_value = "config.ini")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute and persist indicators for every registered instrument
    Update {
        /// Only this family (extrema or volatility); both when omitted
        #[arg(long)]
        family: Option<IndicatorFamily>,
    },
    /// Normalize a scraped daily export into the canonical history file
    Import {
        #[arg(long)]
        code: String,
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Print a persisted indicator file
    Show {
        #[arg(long)]
        code: String,
        #[arg(long)]
        family: IndicatorFamily,
        #[arg(long)]
        period: Option<usize>,
    },
    /// List registered instruments and their cache status
    List,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub log_path: Option<PathBuf>,
    pub workers: usize,
}

pub fn build_settings(adapter: &dyn ConfigPort) -> Result<Settings, TastError> {
    let data_dir = PathBuf::from(adapter.require_string("path", "datadir")?);
    let log_path = adapter
        .get_string("path", "logpath")
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from);
    let workers = match adapter.get_int("engine", "workers", 0) {
        n if n > 0 => n as usize,
        _ => default_workers(),
    };

    Ok(Settings {
        data_dir,
        log_path,
        workers,
    })
}

pub fn load_settings(path: &Path) -> Result<Settings, TastError> {
    let adapter = FileConfigAdapter::from_file(path).map_err(|e| TastError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })?;
    build_settings(&adapter)
}

pub fn run(cli: Cli) -> ExitCode {
    let settings = match load_settings(&cli.config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    if let Err(e) = init_logging(settings.log_path.as_deref()) {
        eprintln!("error: failed to initialise logging: {e}");
        return (&e).into();
    }

    let result = match cli.command {
        Command::Update { family } => {
            let families = match family {
                Some(f) => vec![f],
                None => IndicatorFamily::ALL.to_vec(),
            };
            run_update(&settings, &families).map(|summaries| {
                for (family, summary) in families.iter().zip(&summaries) {
                    eprintln!(
                        "{family}: {} persisted, {} skipped",
                        summary.persisted.len(),
                        summary.skipped.len()
                    );
                }
            })
        }
        Command::Import { code, input } => run_import(&settings, &code, &input).map(|written| {
            if written {
                eprintln!("{} imported", code.to_uppercase());
            } else {
                eprintln!("{} already has a daily history, left unchanged", code.to_uppercase());
            }
        }),
        Command::Show {
            code,
            family,
            period,
        } => run_show(&settings, &code, family, period).map(|lines| {
            for line in lines {
                println!("{line}");
            }
        }),
        Command::List => run_list(&settings).map(|lines| {
            for line in lines {
                println!("{line}");
            }
        }),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "run aborted");
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Run each family over the whole registry, in order, failing fast.
pub fn run_update(
    settings: &Settings,
    families: &[IndicatorFamily],
) -> Result<Vec<RunSummary>, TastError> {
    let registry = RegistryFileAdapter::new(settings.data_dir.clone());
    let history = DailyFileAdapter::new(settings.data_dir.clone());

    families
        .iter()
        .map(|&family| {
            let store = TsvResultStore::new(settings.data_dir.clone(), family);
            Engine::new(&history, &store, family, settings.workers).run_all(&registry)
        })
        .collect()
}

/// Returns `false` when a canonical history already exists and was kept.
pub fn run_import(settings: &Settings, code: &str, input: &Path) -> Result<bool, TastError> {
    let code = code.trim().to_uppercase();
    let adapter = DailyFileAdapter::new(settings.data_dir.clone());
    if adapter.has_history(&code) {
        tracing::info!(code = %code, "daily history cached, import skipped");
        return Ok(false);
    }

    let rows = read_raw_export(input)?;
    let records = normalize(&code, &rows, &input.display().to_string())?;
    adapter.write_history(&code, &records)?;
    tracing::info!(code = %code, days = records.len(), "daily history imported");
    Ok(true)
}

pub fn run_show(
    settings: &Settings,
    code: &str,
    family: IndicatorFamily,
    period: Option<usize>,
) -> Result<Vec<String>, TastError> {
    let store = TsvResultStore::new(settings.data_dir.clone(), family);
    let results = store.load(&code.trim().to_uppercase())?;

    let mut lines = Vec::new();
    for (p, points) in &results.series {
        if period.is_some_and(|wanted| wanted != *p) {
            continue;
        }
        for point in points {
            let values = match point.value {
                IndicatorValue::Extrema { min, max } => format!("min={min:.6}\tmax={max:.6}"),
                IndicatorValue::Volatility {
                    true_range,
                    average_true_range,
                } => format!("tr={true_range:.6}\tatr={average_true_range:.6}"),
            };
            lines.push(format!("{p}\t{}\t{values}", format_date(point.date)));
        }
    }
    Ok(lines)
}

pub fn run_list(settings: &Settings) -> Result<Vec<String>, TastError> {
    let registry = RegistryFileAdapter::new(settings.data_dir.clone());
    let history = DailyFileAdapter::new(settings.data_dir.clone());
    let stores: Vec<TsvResultStore> = IndicatorFamily::ALL
        .iter()
        .map(|&f| TsvResultStore::new(settings.data_dir.clone(), f))
        .collect();

    let lines = registry
        .instruments()?
        .into_iter()
        .map(|instrument| {
            let mut line = format!(
                "{}\t{}\thistory={}",
                instrument.code,
                instrument.display_name,
                history.has_history(&instrument.code)
            );
            for store in &stores {
                line.push_str(&format!("\t{}={}", store.family(), store.exists(&instrument.code)));
            }
            line
        })
        .collect();
    Ok(lines)
}
