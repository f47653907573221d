/// Data layer: core types, loading, and nearest-match lookup.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse bytes → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  validate required columns → Vec<Row>
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  lookup   │  (Dataset, Query) → Option<MatchResult>
///   └──────────┘
/// ```

pub mod error;
pub mod loader;
pub mod lookup;
pub mod model;
pub mod sample;

pub use error::{FormatError, LookupError};
pub use loader::{load_bytes, load_file, SourceFormat};
pub use lookup::find_nearest;
pub use model::{Dataset, MatchResult, Query, Row};
