//! Line-oriented Markdown builder
//!
//! Lines are collected in order and joined with `\n` on [`DocumentBuilder::build`].
//! Used for the dashboard documents and for prompts assembled from data.

/// A fluent builder for Markdown documents
///
/// ```
/// use energy_prompt::DocumentBuilder;
///
/// let doc = DocumentBuilder::new()
///     .heading(1, "📊 Energy Weekly Dashboard")
///     .blank()
///     .bullet("**Crude (Ex-SPR)**: 430,000 bbl")
///     .build();
///
/// assert_eq!(doc, "# 📊 Energy Weekly Dashboard\n\n- **Crude (Ex-SPR)**: 430,000 bbl");
/// ```
#[derive(Debug, Clone, Default)]
pub struct DocumentBuilder {
    lines: Vec<String>,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one line (may itself contain newlines)
    pub fn line(mut self, content: impl Into<String>) -> Self {
        self.lines.push(content.into());
        self
    }

    /// Append several lines
    pub fn lines<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines.extend(items.into_iter().map(Into::into));
        self
    }

    /// Append an empty line
    pub fn blank(self) -> Self {
        self.line("")
    }

    /// Markdown heading, level clamped to 1..=6
    pub fn heading(self, level: u8, title: impl Into<String>) -> Self {
        let hashes = "#".repeat(usize::from(level.clamp(1, 6)));
        self.line(format!("{hashes} {}", title.into()))
    }

    pub fn bullet(self, content: impl Into<String>) -> Self {
        self.line(format!("- {}", content.into()))
    }

    pub fn numbered(self, num: usize, content: impl Into<String>) -> Self {
        self.line(format!("{num}. {}", content.into()))
    }

    /// Items numbered from 1 with the given marker, e.g. `")"` gives `1) item`
    pub fn numbered_list<I, S>(mut self, marker: &str, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for (i, item) in items.into_iter().enumerate() {
            self = self.line(format!("{}{marker} {}", i + 1, item.into()));
        }
        self
    }

    /// Bold key followed by a value: `**key** value`
    pub fn field(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.line(format!("**{}** {}", key.into(), value.into()))
    }

    /// Fenced block; the body is trimmed
    pub fn code_block(self, language: &str, body: &str) -> Self {
        self.line(format!("```{language}"))
            .line(body.trim())
            .line("```")
    }

    pub fn image(self, alt: &str, file: &str) -> Self {
        self.line(format!("![{alt}]({file})"))
    }

    /// `---` surrounded by blank lines
    pub fn rule(self) -> Self {
        self.blank().line("---").blank()
    }

    /// Append `content` only when `condition` holds
    pub fn when(self, condition: bool, content: impl Into<String>) -> Self {
        if condition { self.line(content) } else { self }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn build(self) -> String {
        self.lines.join("\n")
    }
}

impl From<DocumentBuilder> for String {
    fn from(builder: DocumentBuilder) -> Self {
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_joined_with_newline() {
        let doc = DocumentBuilder::new().line("a").blank().line("b").build();
        assert_eq!(doc, "a\n\nb");
    }

    #[test]
    fn test_heading_levels() {
        let doc = DocumentBuilder::new()
            .heading(2, "1. Visão rápida")
            .heading(9, "deep")
            .heading(0, "top")
            .build();
        assert_eq!(doc, "## 1. Visão rápida\n###### deep\n# top");
    }

    #[test]
    fn test_numbered_list_marker() {
        let doc = DocumentBuilder::new()
            .numbered_list(")", ["Preço spot", "Oferta"])
            .numbered(3, "Demanda")
            .build();
        assert_eq!(doc, "1) Preço spot\n2) Oferta\n3. Demanda");
    }

    #[test]
    fn test_code_block_and_rule() {
        let doc = DocumentBuilder::new()
            .code_block("text", "\nresumo\n")
            .rule()
            .build();
        assert_eq!(doc, "```text\nresumo\n```\n\n---\n");
    }

    #[test]
    fn test_field_image_and_when() {
        let doc = DocumentBuilder::new()
            .field("Referência semanal:", "2024-05-03")
            .image("Gas 12w", "gas_12w.png")
            .when(false, "hidden")
            .when(true, "shown")
            .build();
        assert_eq!(
            doc,
            "**Referência semanal:** 2024-05-03\n![Gas 12w](gas_12w.png)\nshown"
        );
    }

    #[test]
    fn test_empty() {
        assert!(DocumentBuilder::new().is_empty());
        let s: String = DocumentBuilder::new().line("x").into();
        assert_eq!(s, "x");
    }
}
