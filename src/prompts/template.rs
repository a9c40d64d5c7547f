use std::collections::HashMap;

use crate::budget::BudgetError;

/// An immutable prompt with `{{ placeholder }}` markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    name: String,
    content: String,
}

/// One piece of a parsed template.
enum Segment<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}

impl PromptTemplate {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Placeholder names in order of first appearance.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for seg in self.segments() {
            if let Segment::Placeholder(name) = seg {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Substitutes every placeholder with its value.
    ///
    /// Values are inserted verbatim and never re-scanned, so a README that
    /// happens to contain `{{ ... }}` is left alone. Unused values are ignored.
    pub fn render(&self, vars: &HashMap<&str, &str>) -> Result<String, BudgetError> {
        let mut out = String::with_capacity(self.content.len());
        for seg in self.segments() {
            match seg {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(name) => {
                    let value = vars.get(name).ok_or_else(|| BudgetError::MissingVariable {
                        template: self.name.clone(),
                        variable: name.to_string(),
                    })?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }

    fn segments(&self) -> Vec<Segment<'_>> {
        let mut segments = Vec::new();
        let mut rest = self.content.as_str();

        while let Some(open) = rest.find("{{") {
            let after_open = &rest[open + 2..];
            let Some(close) = after_open.find("}}") else {
                break;
            };
            let name = after_open[..close].trim();
            if is_identifier(name) {
                segments.push(Segment::Literal(&rest[..open]));
                segments.push(Segment::Placeholder(name));
            } else {
                // Not a placeholder: keep the braces as literal text
                segments.push(Segment::Literal(&rest[..open + 2 + close + 2]));
            }
            rest = &after_open[close + 2..];
        }

        segments.push(Segment::Literal(rest));
        segments
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
