pub mod normalize;
pub mod vectorizer;

pub use normalize::{normalize, normalize_email, normalize_lossy};
pub use vectorizer::{SparseRow, TfidfVectorizer};
