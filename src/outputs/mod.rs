//! Output writers for both pipeline stages.
//!
//! # Submodules
//!
//! - [`json`]: Persists raw category batches collected from the API
//! - [`csv`]: Writes flattened tables produced by the normalizer
//!
//! # Output Structure
//!
//! ```text
//! data/raw/
//! ├── business_articles_2025-05-06.json   # collect
//! └── health_articles_2025-05-06.json
//!
//! out_dir/
//! ├── business_articles_2025-05-06.csv    # normalize, one per input
//! ├── health_articles_2025-05-06.csv
//! └── all_articles.csv                    # combined
//! ```

pub mod csv;
pub mod json;
