//! Feature matrix assembly.
//!
//! Joins the sparse TF-IDF block and the dense metadata block into one
//! matrix per batch. Text columns come first, the twelve metadata columns
//! after, so the assembled width is always vocabulary size + 12. The width
//! is fixed by the fitted vectorizer, never recomputed at inference time.

use ndarray::Array2;

use crate::error::{PipelineError, Result};
use crate::features::metadata::METADATA_WIDTH;
use crate::text::SparseRow;

/// Densifies row-aligned text and metadata blocks into an `Array2<f64>`.
#[derive(Debug, Clone, Copy)]
pub struct FeatureAssembler {
    text_width: usize,
}

impl FeatureAssembler {
    /// `text_width` is the fitted vocabulary size.
    pub fn new(text_width: usize) -> Self {
        Self { text_width }
    }

    /// Total assembled column count.
    pub fn total_width(&self) -> usize {
        self.text_width + METADATA_WIDTH
    }

    /// Concatenate aligned blocks into one matrix of shape
    /// (rows, text_width + 12).
    pub fn assemble(
        &self,
        text_rows: &[SparseRow],
        metadata_rows: &[[f64; METADATA_WIDTH]],
    ) -> Result<Array2<f64>> {
        if text_rows.len() != metadata_rows.len() {
            return Err(PipelineError::Internal(format!(
                "feature blocks are misaligned: {} text rows vs {} metadata rows",
                text_rows.len(),
                metadata_rows.len()
            )));
        }

        let mut matrix = Array2::zeros((text_rows.len(), self.total_width()));
        for (row, (text, metadata)) in text_rows.iter().zip(metadata_rows.iter()).enumerate() {
            for &(column, weight) in text {
                if column >= self.text_width {
                    return Err(PipelineError::Internal(format!(
                        "text column {} exceeds vocabulary width {}",
                        column, self.text_width
                    )));
                }
                matrix[[row, column]] = weight;
            }
            for (offset, &value) in metadata.iter().enumerate() {
                matrix[[row, self.text_width + offset]] = value;
            }
        }
        Ok(matrix)
    }
}
