//! Kernel module - server infrastructure and dependencies.

pub mod cache;
pub mod deps;
pub mod test_dependencies;
pub mod traits;

pub use cache::Cache;
pub use deps::{MsgCentralAdapter, ServerDeps};
pub use test_dependencies::MockOtpService;
pub use traits::*;
