//! plait_core: Foundational types shared by every stage of the pipeline.
//!
//! Source positions and ranges, plus the error type reported when an
//! extension is registered incorrectly on a builder.

pub mod error;
pub mod text;

pub use error::{BuildError, OperatorClass};
pub use text::{Position, Range};
