use colored::Colorize;
use dtsz_common::{Diagnostic, DiagnosticCategory};

pub struct Reporter {
    color: bool,
}

impl Reporter {
    pub fn new(color: bool) -> Self {
        Reporter { color }
    }

    /// One line per diagnostic, each terminated by a newline.
    pub fn render(&self, diagnostics: &[Diagnostic]) -> String {
        let mut out = String::new();
        for diagnostic in diagnostics {
            out.push_str(&self.format_diagnostic(diagnostic));
            out.push('\n');
        }
        out
    }

    pub fn format_diagnostic(&self, diagnostic: &Diagnostic) -> String {
        let file = if diagnostic.file.is_empty() {
            "<unknown>"
        } else {
            diagnostic.file.as_str()
        };
        let file = if self.color {
            file.cyan().to_string()
        } else {
            file.to_string()
        };

        format!(
            "{} - {} {}: {}",
            file,
            self.format_category(diagnostic.category),
            self.format_code(diagnostic.code),
            diagnostic.message_text
        )
    }

    /// `2 errors, 1 warning in 3 bundles.`
    pub fn summary(&self, diagnostics: &[Diagnostic], bundles: usize) -> String {
        let errors = diagnostics.iter().filter(|d| d.is_error()).count();
        let warnings = diagnostics
            .iter()
            .filter(|d| d.category == DiagnosticCategory::Warning)
            .count();
        let plural = |n: usize, word: &str| {
            if n == 1 {
                format!("{n} {word}")
            } else {
                format!("{n} {word}s")
            }
        };
        let text = format!(
            "{}, {} in {}.",
            plural(errors, "error"),
            plural(warnings, "warning"),
            plural(bundles, "bundle")
        );
        if !self.color {
            return text;
        }
        if errors > 0 {
            text.red().to_string()
        } else if warnings > 0 {
            text.yellow().to_string()
        } else {
            text.green().to_string()
        }
    }

    fn format_category(&self, category: DiagnosticCategory) -> String {
        let label = match category {
            DiagnosticCategory::Error => "error",
            DiagnosticCategory::Warning => "warning",
            DiagnosticCategory::Suggestion => "suggestion",
            DiagnosticCategory::Message => "message",
        };

        if !self.color {
            return label.to_string();
        }

        match category {
            DiagnosticCategory::Error => label.red().bold().to_string(),
            DiagnosticCategory::Warning => label.yellow().bold().to_string(),
            DiagnosticCategory::Suggestion => label.blue().bold().to_string(),
            DiagnosticCategory::Message => label.cyan().bold().to_string(),
        }
    }

    fn format_code(&self, code: u32) -> String {
        let label = format!("DTSZ{code}");
        if self.color {
            label.bright_blue().to_string()
        } else {
            label
        }
    }
}

#[cfg(test)]
#[path = "../tests/reporter.rs"]
mod tests;
