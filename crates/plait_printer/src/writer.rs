//! The output sink.
//!
//! Whitespace requests are deferred. [`Writer::space`] and
//! [`Writer::newline`] only record the strongest request seen so far; it is
//! resolved when the next piece of text arrives, after any indentation
//! change. Requests left over at the end are dropped, so output never ends
//! in trailing whitespace.

use plait_core::text::Position;
use plait_options::{RenderMode, RenderOptions};

/// Pending whitespace. A newline outranks a space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Whitespace {
    None,
    Space,
    Newline,
}

/// A generated position tied to the source position it was rendered from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMapping {
    pub generated: Position,
    pub original: Position,
    /// Set for identifier-producing text.
    pub name: Option<String>,
}

pub struct Writer {
    output: String,
    mode: RenderMode,
    terminators: bool,
    indent_width: usize,
    indent_level: usize,
    pending: Whitespace,
    /// Where the next character will land.
    cursor: Position,
    last_char: Option<char>,
    mappings: Option<Vec<SourceMapping>>,
}

impl Writer {
    pub fn new(options: &RenderOptions) -> Self {
        Self {
            output: String::with_capacity(4096),
            mode: options.mode,
            terminators: options.emits_terminators(),
            indent_width: options.indent_width,
            indent_level: 0,
            pending: Whitespace::None,
            cursor: Position::default(),
            last_char: None,
            mappings: options.source_map.then(Vec::new),
        }
    }

    #[inline]
    pub fn is_pretty(&self) -> bool {
        self.mode == RenderMode::Pretty
    }

    /// Whether statements end with `;`.
    #[inline]
    pub fn emits_terminators(&self) -> bool {
        self.terminators
    }

    /// Position the next written character will occupy, ignoring any
    /// whitespace still pending.
    pub fn cursor(&self) -> Position {
        self.cursor
    }

    // ========================================================================
    // Whitespace
    // ========================================================================

    /// Request a space before the next text. Compact mode ignores it.
    pub fn space(&mut self) {
        if self.is_pretty() {
            self.pending = self.pending.max(Whitespace::Space);
        }
    }

    /// Request a line break before the next text. Compact mode ignores it.
    pub fn newline(&mut self) {
        if self.is_pretty() {
            self.pending = Whitespace::Newline;
        }
    }

    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    pub fn dedent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    // ========================================================================
    // Text
    // ========================================================================

    pub fn write(&mut self, text: &str) {
        self.prepare(text);
        self.push(text);
    }

    /// Write text rendered from the source token at `original`.
    pub fn write_mapped(&mut self, text: &str, original: Position, name: Option<&str>) {
        self.prepare(text);
        let generated = self.cursor;
        if let Some(mappings) = self.mappings.as_mut() {
            mappings.push(SourceMapping {
                generated,
                original,
                name: name.map(str::to_string),
            });
        }
        self.push(text);
    }

    /// Resolve pending whitespace ahead of `text`. With nothing pending, a
    /// single space is still inserted where the two tokens would fuse.
    fn prepare(&mut self, text: &str) {
        let Some(first) = text.chars().next() else {
            return;
        };
        match std::mem::replace(&mut self.pending, Whitespace::None) {
            Whitespace::Newline if !self.output.is_empty() => {
                self.push("\n");
                let indent = " ".repeat(self.indent_level * self.indent_width);
                self.push(&indent);
            }
            Whitespace::Newline => {}
            Whitespace::Space => self.push(" "),
            Whitespace::None => {
                if self.last_char.is_some_and(|last| would_fuse(last, first)) {
                    self.push(" ");
                }
            }
        }
    }

    fn push(&mut self, text: &str) {
        for c in text.chars() {
            if c == '\n' {
                self.cursor = Position::new(self.cursor.line + 1, 0);
            } else {
                self.cursor = self.cursor.next_column();
            }
        }
        if let Some(last) = text.chars().last() {
            self.last_char = Some(last);
        }
        self.output.push_str(text);
    }

    /// The rendered text and, when enabled, the recorded mappings. Pretty
    /// output ends with a line break.
    pub fn finish(mut self) -> (String, Option<Vec<SourceMapping>>) {
        if self.is_pretty() && !self.output.is_empty() {
            self.output.push('\n');
        }
        (self.output, self.mappings)
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Whether `left` immediately followed by `right` would scan differently
/// from the two tokens they end and begin.
fn would_fuse(left: char, right: char) -> bool {
    (is_word_char(left) && is_word_char(right))
        || (left == '+' && right == '+')
        || (left == '-' && right == '-')
        || (left == '/' && (right == '/' || right == '*'))
}
