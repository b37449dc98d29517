//! Output buffer that tracks the generated line and column.
//!
//! Columns are counted in UTF-16 code units, the unit source-map consumers
//! expect.

use dtsz_common::SourcePos;
use dtsz_common::source_map::{Mapping, SourceMapGenerator};

#[derive(Debug)]
pub struct SourceWriter {
    output: String,
    line: u32,
    column: u32,
    source_map: Option<SourceMapGenerator>,
}

impl SourceWriter {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            output: String::with_capacity(capacity),
            line: 0,
            column: 0,
            source_map: None,
        }
    }

    pub fn enable_source_map(&mut self, file: impl Into<String>) {
        self.source_map = Some(SourceMapGenerator::new(file));
    }

    pub fn has_source_map(&self) -> bool {
        self.source_map.is_some()
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn column(&self) -> u32 {
        self.column
    }

    /// Write text that contains no newline.
    pub fn write(&mut self, text: &str) {
        self.output.push_str(text);
        self.column += text.encode_utf16().count() as u32;
    }

    /// Write text that may span several lines.
    pub fn write_multiline(&mut self, text: &str) {
        let mut lines = text.split('\n');
        if let Some(first) = lines.next() {
            self.write(first);
        }
        for line in lines {
            self.write_line();
            self.write(line);
        }
    }

    /// Write `text`, mapping its first column back to `pos` in `source`.
    pub fn write_node(&mut self, text: &str, source: &str, pos: SourcePos) {
        self.add_mapping(source, pos);
        self.write(text);
    }

    /// Record a mapping for the current output position.
    pub fn add_mapping(&mut self, source: &str, pos: SourcePos) {
        let (line, column) = (self.line, self.column);
        if let Some(generator) = &mut self.source_map {
            let source_index = generator.add_source(source);
            generator.add_mapping(Mapping {
                generated_line: line,
                generated_column: column,
                source_index,
                original_line: pos.line,
                original_column: pos.column,
            });
        }
    }

    pub fn write_line(&mut self) {
        self.output.push('\n');
        self.line += 1;
        self.column = 0;
    }

    /// Whether nothing has been written on the current line yet.
    pub fn is_at_line_start(&self) -> bool {
        self.column == 0
    }

    pub fn source_map_json(&self) -> Option<String> {
        self.source_map.as_ref().map(SourceMapGenerator::to_json)
    }

    pub fn finish(self) -> (String, Option<String>) {
        let map = self.source_map_json();
        (self.output, map)
    }
}

#[cfg(test)]
#[path = "../tests/source_writer.rs"]
mod tests;
