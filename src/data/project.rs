use arrow::record_batch::RecordBatch;

use super::model::DISPLAY_COLUMNS;
use crate::error::{LoadError, LoadResult};

/// Keep exactly `columns`, in that order.
///
/// Arrow arrays are immutable and reference counted, so the result shares
/// buffers with `batch` but can never observe or cause a change to it.
pub fn project(batch: &RecordBatch, columns: &[&str]) -> LoadResult<RecordBatch> {
    let schema = batch.schema();
    let indices = columns
        .iter()
        .map(|name| {
            schema.index_of(name).map_err(|_| LoadError::MissingColumn {
                column: name.to_string(),
            })
        })
        .collect::<LoadResult<Vec<usize>>>()?;

    Ok(batch.project(&indices)?)
}

/// Project onto the six display columns.
pub fn project_display_columns(batch: &RecordBatch) -> LoadResult<RecordBatch> {
    project(batch, &DISPLAY_COLUMNS)
}
