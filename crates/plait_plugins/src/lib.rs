//! plait_plugins: Ready-made parser plugins.
//!
//! Each plugin implements [`plait_parser::Plugin`] and is installed with
//! [`ParserBuilder::plugin`](plait_parser::ParserBuilder::plugin).

mod non_null;
mod power;

pub use non_null::NonNullAssertion;
pub use power::PowerOperator;
