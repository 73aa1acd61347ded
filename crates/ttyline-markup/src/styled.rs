//! The styled-run model produced by evaluation.

use console::Style;

use crate::width::str_width;

/// A span of literal text under one composed style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledRun {
    pub text: String,
    /// Comma-joined style names, outermost first. Empty for the default style.
    pub spec: String,
    pub style: Style,
}

impl StyledRun {
    pub fn is_default(&self) -> bool {
        self.spec.is_empty()
    }
}

/// An ordered sequence of styled runs.
///
/// Pushing text with the same spec as the last run extends that run, so two
/// texts with the same content and styling always have the same runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyledText {
    runs: Vec<StyledRun>,
}

impl StyledText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text with the default style.
    pub fn plain_text(text: &str) -> Self {
        let mut out = Self::new();
        out.push_str(text, "", &Style::new());
        out
    }

    pub fn push_str(&mut self, text: &str, spec: &str, style: &Style) {
        if text.is_empty() {
            return;
        }
        match self.runs.last_mut() {
            Some(last) if last.spec == spec => last.text.push_str(text),
            _ => self.runs.push(StyledRun {
                text: text.to_string(),
                spec: spec.to_string(),
                style: style.clone(),
            }),
        }
    }

    pub fn push_char(&mut self, c: char, spec: &str, style: &Style) {
        let mut buf = [0u8; 4];
        self.push_str(c.encode_utf8(&mut buf), spec, style);
    }

    /// Appends every run of `other`, merging at the seam.
    pub fn append(&mut self, other: &StyledText) {
        for run in &other.runs {
            self.push_str(&run.text, &run.spec, &run.style);
        }
    }

    pub fn runs(&self) -> &[StyledRun] {
        &self.runs
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// The text with all styling removed.
    pub fn plain(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Display width in terminal columns.
    pub fn columns(&self) -> usize {
        self.runs.iter().map(|r| str_width(&r.text)).sum()
    }

    pub fn char_count(&self) -> usize {
        self.runs.iter().map(|r| r.text.chars().count()).sum()
    }

    /// Serializes back to markup.
    ///
    /// Literal markup characters are escaped and styled runs are wrapped in
    /// `@{spec ...}`, so evaluating the result inside another template
    /// reproduces these runs nested under the template's own scopes.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        for run in &self.runs {
            if run.is_default() {
                escape_into(&mut out, &run.text);
            } else {
                out.push_str("@{");
                out.push_str(&run.spec);
                out.push(' ');
                escape_into(&mut out, &run.text);
                out.push('}');
            }
        }
        out
    }

    /// Renders the runs as a terminal string.
    ///
    /// With `ansi` set every styled run is wrapped in escape sequences
    /// regardless of what the attached terminal supports.
    pub fn render(&self, ansi: bool) -> String {
        if !ansi {
            return self.plain();
        }
        self.runs
            .iter()
            .map(|run| {
                run.style
                    .clone()
                    .force_styling(true)
                    .apply_to(run.text.as_str())
                    .to_string()
            })
            .collect()
    }
}

impl std::fmt::Display for StyledText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.plain())
    }
}

/// Escapes the characters markup treats specially.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_into(&mut out, text);
    out
}

fn escape_into(out: &mut String, text: &str) {
    for c in text.chars() {
        if matches!(c, '\\' | '@' | '{' | '}') {
            out.push('\\');
        }
        out.push(c);
    }
}
