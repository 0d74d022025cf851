//! Query module: read-mostly analytics over the loaded dataset
//!
//! All operations are plain function calls taking primitive arguments and
//! returning records or aggregate structs; transport, serialization format,
//! and authentication belong to whatever external layer sits on top.

mod engine;
mod stats;

pub use engine::{QueryEngine, MAX_PAGE_SIZE, MAX_TOP_RATED};
pub use stats::{print_category_stats, print_overview, CategoryStats, StatsOverview};
