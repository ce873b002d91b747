//! Document type classification by root namespace

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::NamespaceMapping;
use crate::document::QualifiedName;

/// Namespace of CT-e (Conhecimento de Transporte eletrônico) documents
pub const CTE_NAMESPACE: &str = "http://www.portalfiscal.inf.br/cte";

/// Namespace of NF-e (Nota Fiscal eletrônica) documents
pub const NFE_NAMESPACE: &str = "http://www.portalfiscal.inf.br/nfe";

/// Fiscal document standards this crate knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DocumentType {
    #[serde(rename = "CT-e")]
    Cte,
    #[serde(rename = "NF-e")]
    Nfe,
    #[serde(rename = "unknown")]
    Unknown,
}

impl DocumentType {
    pub fn is_known(&self) -> bool {
        !matches!(self, DocumentType::Unknown)
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocumentType::Cte => "CT-e",
            DocumentType::Nfe => "NF-e",
            DocumentType::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Maps a root element to its `DocumentType`
///
/// Mappings are tested in order and the first whose `{uri}` prefixes the root's
/// Clark name wins. Configuration validation keeps URIs unique, so at most one
/// can match.
#[derive(Debug, Clone)]
pub struct TypeClassifier {
    mappings: Vec<NamespaceMapping>,
}

impl TypeClassifier {
    pub fn new(mappings: Vec<NamespaceMapping>) -> Self {
        Self { mappings }
    }

    pub fn classify(&self, root: &QualifiedName) -> DocumentType {
        let clark = root.clark_name();
        self.mappings
            .iter()
            .find(|mapping| clark.starts_with(&format!("{{{}}}", mapping.uri)))
            .map(|mapping| mapping.document_type)
            .unwrap_or(DocumentType::Unknown)
    }

    /// Configured namespace URIs, in classification order
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.mappings.iter().map(|mapping| mapping.uri.as_str())
    }
}

impl Default for TypeClassifier {
    fn default() -> Self {
        Self::new(NamespaceMapping::defaults())
    }
}
