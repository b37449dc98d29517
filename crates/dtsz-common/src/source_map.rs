//! Source Map v3 generation.
//!
//! The emitter records one mapping per emitted declaration, pointing back to
//! the module and position the declaration came from. Mappings are encoded
//! with the standard base64 VLQ scheme.

use rustc_hash::FxHashMap;

const BASE64_CHARS: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// A single generated → original position mapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Mapping {
    pub generated_line: u32,
    pub generated_column: u32,
    pub source_index: u32,
    pub original_line: u32,
    pub original_column: u32,
}

/// Accumulates mappings and serializes them as a v3 source map.
#[derive(Debug, Default)]
pub struct SourceMapGenerator {
    file: String,
    sources: Vec<String>,
    source_indices: FxHashMap<String, u32>,
    mappings: Vec<Mapping>,
}

impl SourceMapGenerator {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            ..Self::default()
        }
    }

    /// Register a source file, returning its index in `sources`.
    pub fn add_source(&mut self, source: &str) -> u32 {
        if let Some(&idx) = self.source_indices.get(source) {
            return idx;
        }
        let idx = self.sources.len() as u32;
        self.sources.push(source.to_string());
        self.source_indices.insert(source.to_string(), idx);
        idx
    }

    pub fn add_mapping(&mut self, mapping: Mapping) {
        self.mappings.push(mapping);
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn mappings(&self) -> &[Mapping] {
        &self.mappings
    }

    /// Encode the `mappings` field.
    pub fn encode_mappings(&self) -> String {
        let mut sorted = self.mappings.clone();
        sorted.sort_by_key(|m| (m.generated_line, m.generated_column));

        let mut out = String::new();
        let mut current_line = 0u32;
        let mut prev_column = 0i64;
        let mut prev_source = 0i64;
        let mut prev_original_line = 0i64;
        let mut prev_original_column = 0i64;
        let mut first_in_line = true;

        for m in &sorted {
            while current_line < m.generated_line {
                out.push(';');
                current_line += 1;
                prev_column = 0;
                first_in_line = true;
            }
            if !first_in_line {
                out.push(',');
            }
            first_in_line = false;

            encode_vlq(&mut out, i64::from(m.generated_column) - prev_column);
            encode_vlq(&mut out, i64::from(m.source_index) - prev_source);
            encode_vlq(&mut out, i64::from(m.original_line) - prev_original_line);
            encode_vlq(&mut out, i64::from(m.original_column) - prev_original_column);

            prev_column = i64::from(m.generated_column);
            prev_source = i64::from(m.source_index);
            prev_original_line = i64::from(m.original_line);
            prev_original_column = i64::from(m.original_column);
        }

        out
    }

    /// Serialize to source map JSON.
    pub fn to_json(&self) -> String {
        serde_json::json!({
            "version": 3,
            "file": self.file,
            "sourceRoot": "",
            "sources": self.sources,
            "names": [],
            "mappings": self.encode_mappings(),
        })
        .to_string()
    }
}

/// Append the base64 VLQ encoding of `value` to `out`.
pub fn encode_vlq(out: &mut String, value: i64) {
    let mut vlq = if value < 0 {
        ((-value) << 1) | 1
    } else {
        value << 1
    };
    loop {
        let mut digit = (vlq & 0b1_1111) as usize;
        vlq >>= 5;
        if vlq > 0 {
            digit |= 0b10_0000;
        }
        out.push(BASE64_CHARS[digit] as char);
        if vlq == 0 {
            break;
        }
    }
}

#[cfg(test)]
#[path = "../tests/source_map.rs"]
mod tests;
