use std::fs::File;
use std::io::{self, Seek};
use std::path::Path;
use std::sync::Arc;

use arrow::compute::concat_batches;
use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::model::DATE;
use crate::error::{LoadError, LoadResult};

const BATCH_SIZE: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the raw dataset into a single record batch.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, types inferred per column over the whole file
/// * `.parquet` – any Parquet file, e.g. one written by `generate_sample`
///
/// The `date` column of a CSV file is always read as text; coercion to a
/// calendar date happens in the window filter.
pub fn load_file(path: &Path) -> LoadResult<RecordBatch> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let batch = match ext.as_str() {
        "csv" => load_csv(path),
        "parquet" | "pq" => load_parquet(path),
        _ => Err(LoadError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }?;

    log::info!(
        "Loaded {} rows x {} columns from {}",
        batch.num_rows(),
        batch.num_columns(),
        path.display()
    );
    Ok(batch)
}

fn open(path: &Path) -> LoadResult<File> {
    File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => LoadError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => parse_error(path, ArrowError::ExternalError(Box::new(e))),
    })
}

fn parse_error(path: &Path, source: ArrowError) -> LoadError {
    LoadError::Parse {
        path: path.to_path_buf(),
        source,
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> LoadResult<RecordBatch> {
    let mut file = open(path)?;

    let format = Format::default().with_header(true);
    let (inferred, _) = format
        .infer_schema(&mut file, None)
        .map_err(|e| parse_error(path, e))?;
    let schema = date_as_text(&inferred);

    file.rewind()
        .map_err(|e| parse_error(path, ArrowError::ExternalError(Box::new(e))))?;

    let reader = ReaderBuilder::new(schema.clone())
        .with_header(true)
        .with_batch_size(BATCH_SIZE)
        .build(file)
        .map_err(|e| parse_error(path, e))?;

    let batches = reader
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| parse_error(path, e))?;

    concat_batches(&schema, &batches).map_err(|e| parse_error(path, e))
}

/// Inference would turn ISO dates into `Date32`; keep them as text instead.
fn date_as_text(schema: &Schema) -> SchemaRef {
    let fields: Vec<Field> = schema
        .fields()
        .iter()
        .map(|f| {
            if f.name() == DATE {
                Field::new(DATE, DataType::Utf8, true)
            } else {
                f.as_ref().clone()
            }
        })
        .collect();
    Arc::new(Schema::new(fields))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Works with files written by Pandas (`df.to_parquet()`), Polars
/// (`df.write_parquet()`) and `generate_sample --format parquet`.
fn load_parquet(path: &Path) -> LoadResult<RecordBatch> {
    let file = open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| parse_error(path, ArrowError::ParquetError(e.to_string())))?;
    let schema = builder.schema().clone();
    let reader = builder
        .with_batch_size(BATCH_SIZE)
        .build()
        .map_err(|e| parse_error(path, ArrowError::ParquetError(e.to_string())))?;

    let batches = reader
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| parse_error(path, e))?;

    concat_batches(&schema, &batches).map_err(|e| parse_error(path, e))
}
