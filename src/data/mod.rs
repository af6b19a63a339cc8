//! Data layer: loading, windowing, projection and normalisation.
//!
//! Architecture:
//! ```text
//!  .csv / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → RecordBatch (types inferred per column)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  date column → Date32, keep rows inside the window
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  project  │  keep the six display columns
//!   └──────────┘
//!        │
//!        ▼
//!   ┌───────────┐
//!   │ normalize  │  canonical date text, stable sort → ProcessedTable
//!   └───────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  options  │  distinct locations → country selector
//!   └──────────┘
//! ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod options;
pub mod project;

use std::path::Path;

use arrow::util::pretty::pretty_format_batches;

use crate::error::LoadResult;
use filter::{DatePolicy, DateWindow};
use model::ProcessedTable;

/// Run the whole startup pipeline for one dataset file.
pub fn build_processed_table(path: &Path, window: &DateWindow, policy: DatePolicy) -> LoadResult<ProcessedTable> {
    let raw = loader::load_file(path)?;
    let windowed = filter::filter_window(&raw, window, policy)?;
    let projected = project::project_display_columns(&windowed)?;
    if log::log_enabled!(log::Level::Debug) {
        let head = projected.slice(0, projected.num_rows().min(5));
        if let Ok(preview) = pretty_format_batches(&[head]) {
            log::debug!("Projected columns:\n{preview}");
        }
    }
    let table = normalize::normalize(&projected)?;
    log::info!("Processed table ready: {} rows", table.len());
    Ok(table)
}
