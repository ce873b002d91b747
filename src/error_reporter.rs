//! Turn raw schema diagnostics into field-level validation errors
//!
//! libxml2 names the offending element in its message text, as a Clark-style
//! token followed by a quote:
//!
//! ```text
//! Element '{http://www.portalfiscal.inf.br/cte}nCT': This element is not expected.
//! ```
//!
//! The reporter recovers the local name from that token, looks the first element
//! with that name up in the document and formats a message around both. The
//! recovery is best effort: anything it cannot find becomes a sentinel.

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::document::XmlDocument;
use crate::libxml2::RawViolation;

/// Language of formatted diagnostics
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum MessageLanguage {
    #[default]
    English,
    Portuguese,
}

impl MessageLanguage {
    pub fn unknown_field(&self) -> &'static str {
        match self {
            MessageLanguage::English => "unknown field",
            MessageLanguage::Portuguese => "campo desconhecido",
        }
    }

    pub fn value_not_found(&self) -> &'static str {
        match self {
            MessageLanguage::English => "value not found",
            MessageLanguage::Portuguese => "valor não encontrado",
        }
    }

    fn format(&self, line: u32, column: u32, field: &str, value: &str) -> String {
        match self {
            MessageLanguage::English => format!(
                "Line {}, column {}: field '{}' with value '{}' is invalid.",
                line, column, field, value
            ),
            MessageLanguage::Portuguese => format!(
                "Linha {}, coluna {}: Coluna '{}' com o valor '{}' é inválida.",
                line, column, field, value
            ),
        }
    }
}

impl std::str::FromStr for MessageLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "english" | "en" => Ok(MessageLanguage::English),
            "portuguese" | "pt" | "pt-br" => Ok(MessageLanguage::Portuguese),
            other => Err(format!("unknown language '{}'", other)),
        }
    }
}

/// One structured diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub line: u32,
    pub column: u32,
    /// Local name of the offending element, or the "unknown field" sentinel
    pub field_name: String,
    /// Trimmed text of the first matching element, or the "value not found" sentinel
    pub field_value: String,
    /// Formatted, human-readable message
    pub message: String,
    /// Message exactly as the schema engine produced it
    pub engine_message: String,
}

pub struct ErrorReporter {
    token: Option<Regex>,
    language: MessageLanguage,
}

impl ErrorReporter {
    /// Build a reporter recognizing field tokens under any of `namespaces`
    pub fn new<I, S>(namespaces: I, language: MessageLanguage) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let alternatives: Vec<String> = namespaces
            .into_iter()
            .map(|namespace| regex::escape(namespace.as_ref()))
            .collect();

        let token = if alternatives.is_empty() {
            None
        } else {
            let pattern = format!(r"\{{({})\}}([^']*)'", alternatives.join("|"));
            match Regex::new(&pattern) {
                Ok(regex) => Some(regex),
                Err(e) => {
                    warn!(error = %e, "field token pattern rejected; field names will be unknown");
                    None
                }
            }
        };

        Self { token, language }
    }

    /// Namespace and local field name of the leftmost token in `message`
    pub fn extract_field<'m>(&self, message: &'m str) -> Option<(&'m str, &'m str)> {
        let captures = self.token.as_ref()?.captures(message)?;
        let namespace = captures.get(1)?.as_str();
        let field = captures.get(2)?.as_str();
        Some((namespace, field))
    }

    /// One `ValidationError` per violation, in the same order
    pub fn report(
        &self,
        violations: &[RawViolation],
        document: &XmlDocument,
    ) -> Vec<ValidationError> {
        violations
            .iter()
            .map(|violation| self.describe(violation, document))
            .collect()
    }

    fn describe(&self, violation: &RawViolation, document: &XmlDocument) -> ValidationError {
        let (field_name, field_value) = match self.extract_field(&violation.message) {
            Some((namespace, field)) => {
                let value = self
                    .lookup_value(document, namespace, field)
                    .unwrap_or_else(|| self.language.value_not_found().to_string());
                (field.to_string(), value)
            }
            None => (
                self.language.unknown_field().to_string(),
                self.language.value_not_found().to_string(),
            ),
        };

        ValidationError {
            line: violation.line,
            column: violation.column,
            message: self
                .language
                .format(violation.line, violation.column, &field_name, &field_value),
            field_name,
            field_value,
            engine_message: violation.message.clone(),
        }
    }

    fn lookup_value(&self, document: &XmlDocument, namespace: &str, field: &str) -> Option<String> {
        let text = document.first_element_text(namespace, field)?;
        let trimmed = text.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
}
