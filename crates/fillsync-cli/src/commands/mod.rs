//! Command implementations

mod rollback;
mod sync;

pub use rollback::run_rollback;
pub use sync::run_sync;
