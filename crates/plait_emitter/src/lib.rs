//! plait_emitter: Rendered output with source maps.
//!
//! Coordinates output generation:
//! 1. Render the tree through the printer
//! 2. Collect the mappings recorded while rendering
//! 3. Encode them into a version 3 source map

use plait_ast::Program;
use plait_options::RenderOptions;
use plait_printer::{Render, Writer};
use plait_sourcemap::{SourceMapBuilder, SourceMapV3};

/// The emitter renders programs under one set of options.
#[derive(Debug, Clone, Default)]
pub struct Emitter {
    options: RenderOptions,
    /// Original text, embedded as `sourcesContent` when set.
    source_content: Option<String>,
}

/// The result of rendering a program.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOutput {
    pub code: String,
    /// Present when source maps were requested.
    pub source_map: Option<SourceMapV3>,
}

impl RenderOutput {
    /// The source map as JSON, if one was produced.
    pub fn source_map_json(&self) -> Option<Result<String, serde_json::Error>> {
        self.source_map.as_ref().map(SourceMapV3::to_json)
    }
}

impl Emitter {
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            source_content: None,
        }
    }

    /// Embed the original source text in produced source maps.
    pub fn with_source_content(mut self, source: impl Into<String>) -> Self {
        self.source_content = Some(source.into());
        self
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    #[tracing::instrument(level = "debug", skip_all, fields(mode = ?self.options.mode))]
    pub fn emit(&self, program: &Program) -> RenderOutput {
        let mut writer = Writer::new(&self.options);
        program.render(&mut writer);
        let (code, mappings) = writer.finish();

        let source_map = mappings.map(|mappings| {
            let mut builder = SourceMapBuilder::new();
            if let Some(file) = &self.options.file {
                builder = builder.with_file(file.clone());
            }
            builder.add_source(self.options.source_name.clone(), self.source_content.clone());
            for mapping in &mappings {
                builder.map(mapping.generated, mapping.original, mapping.name.as_deref());
            }
            tracing::debug!(mappings = mappings.len(), "built source map");
            builder.build()
        });

        RenderOutput { code, source_map }
    }
}

/// Render `program` under `options`.
pub fn render(program: &Program, options: &RenderOptions) -> RenderOutput {
    Emitter::new(options.clone()).emit(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use plait_ast::*;
    use plait_core::text::{Position, Range};
    use pretty_assertions::assert_eq;

    fn span(column: u32, len: u32) -> Range {
        Range::new(Position::new(0, column), Position::new(0, column + len))
    }

    /// `let x = 5`
    fn let_x() -> Program {
        let decl = Statement::Variable(VariableDeclaration {
            kind: DeclarationKind::Let,
            declarators: vec![VariableDeclarator {
                name: Identifier::new("x", span(4, 1)),
                init: Some(Expression::Integer(IntegerLiteral {
                    value: 5,
                    raw: "5".into(),
                    span: span(8, 1),
                })),
            }],
            span: span(0, 9),
        });
        Program::new(vec![decl], span(0, 9))
    }

    #[test]
    fn test_no_source_map_unless_requested() {
        let output = render(&let_x(), &RenderOptions::compact());
        assert_eq!(output.code, "let x=5;");
        assert!(output.source_map.is_none());
        assert!(output.source_map_json().is_none());
    }

    #[test]
    fn test_source_map_segments() {
        let output = render(&let_x(), &RenderOptions::compact().with_source_map());
        let map = output.source_map.unwrap();
        assert_eq!(map.version, 3);
        assert_eq!(map.sources, vec!["input.js".to_string()]);
        assert_eq!(map.names, vec!["x".to_string()]);
        assert_eq!(map.mappings, "AAAA,IAAIA,EAAI");
        assert!(map.sources_content.is_none());
    }

    #[test]
    fn test_file_and_source_content() {
        let mut options = RenderOptions::pretty().with_source_map();
        options.file = Some("out.js".into());
        options.source_name = "main.js".into();
        let output = Emitter::new(options)
            .with_source_content("let x = 5")
            .emit(&let_x());
        assert_eq!(output.code, "let x = 5;\n");
        let json = output.source_map_json().unwrap().unwrap();
        assert_eq!(
            json,
            r#"{"version":3,"file":"out.js","sources":["main.js"],"sourcesContent":["let x = 5"],"names":["x"],"mappings":"AAAA,IAAIA,IAAI"}"#
        );
    }
}
