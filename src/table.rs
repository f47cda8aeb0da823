use crate::{
    error::PredictError,
    features::{COLUMNS, FeatureRow, FeatureValue},
};

/// Feature rows bound to the fixed column list.
///
/// Column identity is purely positional: the table only guarantees that every
/// row carries exactly one value per column. Interpreting the values is left
/// to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    rows: Vec<FeatureRow>,
}

impl FeatureTable {
    /// Assembles a table from raw rows.
    ///
    /// # Errors
    /// Returns `PredictError::ShapeMismatch` for the first row whose length
    /// differs from the column count. Rows are never truncated or padded.
    pub fn from_rows(rows: Vec<FeatureRow>) -> Result<Self, PredictError> {
        if let Some((row, values)) = rows
            .iter()
            .enumerate()
            .find(|(_, values)| values.len() != COLUMNS.len())
        {
            return Err(PredictError::ShapeMismatch {
                row,
                got: values.len(),
                expected: COLUMNS.len(),
            });
        }

        Ok(Self { rows })
    }

    pub fn columns(&self) -> &'static [&'static str] {
        &COLUMNS
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    /// Position of `name` in the column list.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        COLUMNS.iter().position(|c| *c == name)
    }

    /// Iterates over the values of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &FeatureValue>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }
}
