//! plait_tests: End-to-end harness.
//!
//! A [`Pipeline`] pairs a configured parser builder with render options so
//! scenario tests can go from source text to output in one call.

use plait_ast::Program;
use plait_core::error::BuildError;
use plait_diagnostics::ErrorReport;
use plait_emitter::{Emitter, RenderOutput};
use plait_options::{PlaitConfig, RenderOptions};
use plait_parser::{ParserBuilder, Plugin};
use plait_plugins::{NonNullAssertion, PowerOperator};

#[derive(Clone, Default)]
pub struct Pipeline {
    builder: ParserBuilder,
    render: RenderOptions,
}

impl Pipeline {
    pub fn new(builder: ParserBuilder, render: RenderOptions) -> Self {
        Self { builder, render }
    }

    pub fn from_config(config: &PlaitConfig) -> Self {
        Self::new(
            ParserBuilder::new().with_options(config.parse),
            config.render.clone(),
        )
    }

    /// The default pipeline with every bundled plugin installed.
    pub fn with_bundled_plugins(render: RenderOptions) -> Result<Self, BuildError> {
        Self::new(ParserBuilder::new(), render)
            .plugin(&PowerOperator)?
            .plugin(&NonNullAssertion)
    }

    pub fn plugin(mut self, plugin: &dyn Plugin) -> Result<Self, BuildError> {
        self.builder.plugin(plugin)?;
        Ok(self)
    }

    pub fn builder_mut(&mut self) -> &mut ParserBuilder {
        &mut self.builder
    }

    pub fn render_options(&self) -> &RenderOptions {
        &self.render
    }

    pub fn parse(&self, source: &str) -> Result<Program, ErrorReport> {
        let (program, errors) = self.builder.build(source).parse_program();
        if errors.is_empty() {
            Ok(program)
        } else {
            Err(ErrorReport::new(source, errors))
        }
    }

    /// Parse then render. Any parse error fails the whole run.
    pub fn compile(&self, source: &str) -> Result<RenderOutput, ErrorReport> {
        let program = self.parse(source)?;
        Ok(Emitter::new(self.render.clone())
            .with_source_content(source)
            .emit(&program))
    }
}

/// Compile with the built-in grammar only.
pub fn compile(source: &str, render: &RenderOptions) -> Result<RenderOutput, ErrorReport> {
    Pipeline::new(ParserBuilder::new(), render.clone()).compile(source)
}
