//! plait_printer: AST to text output.
//!
//! Renders a syntax tree back to source text, compact or pretty, through a
//! [`Writer`] that tracks the generated position of everything it writes.

mod render;
mod writer;

pub use render::{quote_string, Render};
pub use writer::{SourceMapping, Writer};

use plait_ast::Program;
use plait_options::RenderOptions;

/// Render a program to a string.
pub fn print(program: &Program, options: &RenderOptions) -> String {
    let mut writer = Writer::new(options);
    program.render(&mut writer);
    writer.finish().0
}
