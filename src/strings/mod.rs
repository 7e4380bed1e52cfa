// Mon Jan 19 2026 - Alex

pub mod pool;

pub use pool::{PoolString, StringPool};
