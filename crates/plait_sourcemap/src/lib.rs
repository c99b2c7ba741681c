//! plait_sourcemap: Source map generation.
//!
//! Generates V3 source maps correlating rendered output back to the token
//! positions of the original source.

pub mod vlq;

use indexmap::IndexSet;
use plait_core::text::Position;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceMapError {
    #[error("invalid base64 digit `{0}` in mappings")]
    InvalidBase64(char),
    #[error("mappings end in the middle of a VLQ value")]
    UnterminatedVlq,
    #[error("VLQ value does not fit in 64 bits")]
    VlqOverflow,
    #[error("mapping segment has {0} fields; expected 1, 4 or 5")]
    InvalidSegment(usize),
    #[error("mapping segment decodes to a negative position")]
    NegativePosition,
}

/// A single mapping entry, in absolute coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mapping {
    pub generated_line: u32,
    pub generated_column: u32,
    pub source_index: u32,
    pub original_line: u32,
    pub original_column: u32,
    pub name_index: Option<u32>,
}

impl Mapping {
    pub fn generated(&self) -> Position {
        Position::new(self.generated_line, self.generated_column)
    }

    pub fn original(&self) -> Position {
        Position::new(self.original_line, self.original_column)
    }
}

/// The serialized V3 source map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMapV3 {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources_content: Option<Vec<Option<String>>>,
    pub names: Vec<String>,
    pub mappings: String,
}

impl SourceMapV3 {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Decode `mappings` back into absolute entries.
    pub fn decoded_mappings(&self) -> Result<Vec<Mapping>, SourceMapError> {
        decode_mappings(&self.mappings)
    }
}

/// A source map builder that accumulates mappings.
#[derive(Debug, Clone, Default)]
pub struct SourceMapBuilder {
    file: Option<String>,
    sources: Vec<String>,
    sources_content: Vec<Option<String>>,
    names: IndexSet<String>,
    mappings: Vec<Mapping>,
}

impl SourceMapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn add_source(&mut self, source: impl Into<String>, content: Option<String>) -> u32 {
        let idx = self.sources.len() as u32;
        self.sources.push(source.into());
        self.sources_content.push(content);
        idx
    }

    /// Index of `name` in the names table, adding it if new.
    pub fn add_name(&mut self, name: &str) -> u32 {
        match self.names.get_index_of(name) {
            Some(idx) => idx as u32,
            None => {
                let (idx, _) = self.names.insert_full(name.to_string());
                idx as u32
            }
        }
    }

    pub fn add_mapping(&mut self, mapping: Mapping) {
        self.mappings.push(mapping);
    }

    /// Record that output at `generated` came from `original` in the first
    /// source.
    pub fn map(&mut self, generated: Position, original: Position, name: Option<&str>) {
        let name_index = name.map(|n| self.add_name(n));
        self.add_mapping(Mapping {
            generated_line: generated.line,
            generated_column: generated.column,
            source_index: 0,
            original_line: original.line,
            original_column: original.column,
            name_index,
        });
    }

    pub fn mappings(&self) -> &[Mapping] {
        &self.mappings
    }

    /// Encode the `mappings` field.
    pub fn encode_mappings(&self) -> String {
        let mut sorted = self.mappings.clone();
        sorted.sort_by_key(|m| (m.generated_line, m.generated_column));

        let mut out = String::new();
        let mut line = 0;
        let mut prev_column: i64 = 0;
        let mut prev_source: i64 = 0;
        let mut prev_original_line: i64 = 0;
        let mut prev_original_column: i64 = 0;
        let mut prev_name: i64 = 0;
        let mut first_in_line = true;

        for mapping in &sorted {
            while line < mapping.generated_line {
                out.push(';');
                line += 1;
                prev_column = 0;
                first_in_line = true;
            }
            if !first_in_line {
                out.push(',');
            }
            first_in_line = false;

            vlq::encode(i64::from(mapping.generated_column) - prev_column, &mut out);
            prev_column = i64::from(mapping.generated_column);
            vlq::encode(i64::from(mapping.source_index) - prev_source, &mut out);
            prev_source = i64::from(mapping.source_index);
            vlq::encode(i64::from(mapping.original_line) - prev_original_line, &mut out);
            prev_original_line = i64::from(mapping.original_line);
            vlq::encode(i64::from(mapping.original_column) - prev_original_column, &mut out);
            prev_original_column = i64::from(mapping.original_column);
            if let Some(name) = mapping.name_index {
                vlq::encode(i64::from(name) - prev_name, &mut out);
                prev_name = i64::from(name);
            }
        }
        out
    }

    pub fn build(&self) -> SourceMapV3 {
        let has_content = self.sources_content.iter().any(Option::is_some);
        SourceMapV3 {
            version: 3,
            file: self.file.clone(),
            sources: self.sources.clone(),
            sources_content: has_content.then(|| self.sources_content.clone()),
            names: self.names.iter().cloned().collect(),
            mappings: self.encode_mappings(),
        }
    }

    /// Encode the source map as a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        self.build().to_json()
    }
}

/// Decode a `mappings` string into absolute entries. Segments that carry
/// only a generated column are skipped.
pub fn decode_mappings(mappings: &str) -> Result<Vec<Mapping>, SourceMapError> {
    let mut out = Vec::new();
    let mut source: i64 = 0;
    let mut original_line: i64 = 0;
    let mut original_column: i64 = 0;
    let mut name: i64 = 0;

    for (line, segments) in mappings.split(';').enumerate() {
        let mut column: i64 = 0;
        for segment in segments.split(',').filter(|s| !s.is_empty()) {
            let fields = vlq::decode(segment)?;
            match fields.len() {
                1 => {
                    column += fields[0];
                    continue;
                }
                4 | 5 => {}
                n => return Err(SourceMapError::InvalidSegment(n)),
            }
            column += fields[0];
            source += fields[1];
            original_line += fields[2];
            original_column += fields[3];
            let name_index = match fields.get(4) {
                Some(delta) => {
                    name += delta;
                    Some(to_u32(name)?)
                }
                None => None,
            };
            out.push(Mapping {
                generated_line: line as u32,
                generated_column: to_u32(column)?,
                source_index: to_u32(source)?,
                original_line: to_u32(original_line)?,
                original_column: to_u32(original_column)?,
                name_index,
            });
        }
    }
    Ok(out)
}

fn to_u32(value: i64) -> Result<u32, SourceMapError> {
    u32::try_from(value).map_err(|_| SourceMapError::NegativePosition)
}
