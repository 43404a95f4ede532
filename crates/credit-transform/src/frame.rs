//! Working table the pipeline steps operate on.

use polars::prelude::*;

use credit_common::{column_values, dataframe_from_raw, value_column};
use credit_model::{RawRecordSet, Value};

use crate::error::{NormalizeError, Result, Step};

/// A dataset's rows as a polars `DataFrame`.
#[derive(Debug, Clone)]
pub(crate) struct WorkingFrame {
    dataset: String,
    data: DataFrame,
}

impl WorkingFrame {
    pub(crate) fn from_raw(dataset: &str, raw: &RawRecordSet) -> Result<Self> {
        Ok(Self {
            dataset: dataset.to_string(),
            data: dataframe_from_raw(raw)?,
        })
    }

    pub(crate) fn dataset(&self) -> &str {
        &self.dataset
    }

    pub(crate) fn height(&self) -> usize {
        self.data.height()
    }

    pub(crate) fn has_column(&self, column: &str) -> bool {
        self.data.get_column_index(column).is_some()
    }

    /// Column the step cannot run without.
    pub(crate) fn require(&self, column: &str, step: Step) -> Result<&Column> {
        self.data
            .column(column)
            .map_err(|_| NormalizeError::schema(&self.dataset, step, vec![column.to_string()]))
    }

    pub(crate) fn values(&self, column: &str, step: Step) -> Result<Vec<Value>> {
        Ok(column_values(self.require(column, step)?)?)
    }

    /// `Float64` view of a column; text cells read as null.
    pub(crate) fn numeric(&self, column: &str, step: Step) -> Result<Float64Chunked> {
        let column = self.require(column, step)?.cast(&DataType::Float64)?;
        Ok(column.f64()?.clone())
    }

    /// Adds `column`, replacing any column of the same name.
    pub(crate) fn put(&mut self, column: Column) -> Result<()> {
        self.data.with_column(column)?;
        Ok(())
    }

    pub(crate) fn put_values(&mut self, name: &str, cells: &[Value]) -> Result<()> {
        self.put(value_column(name, cells))
    }

    /// Keeps rows whose mask entry is `true`; returns the number dropped.
    pub(crate) fn retain(&mut self, mask: &BooleanChunked) -> Result<usize> {
        let before = self.data.height();
        self.data = self.data.filter(mask)?;
        Ok(before - self.data.height())
    }
}
