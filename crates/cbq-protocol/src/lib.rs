//! Shared types for cbioquery: the operation catalogue, resolved intents,
//! typed operations, data results and per-turn replies.

pub mod intent;
pub mod operations;
pub mod output;
pub mod query;

pub use intent::*;
pub use operations::*;
pub use output::*;
pub use query::*;
