pub mod email;
pub mod prediction;

pub use email::{EmailRecord, LabeledExample, Priority};
pub use prediction::PredictionResult;
