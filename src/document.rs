//! Parsed XML documents
//!
//! Well-formedness is decided by libxml2, which also builds the tree that gets
//! validated. Root classification and field-value lookup read that same tree,
//! so every encoding libxml2 accepts is classified and searched alike.

use crate::error::DocumentError;
use crate::libxml2::{LibXml2Wrapper, XmlDocPtr};

/// Namespace URI plus local name of an element
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    pub namespace: Option<String>,
    pub local_name: String,
}

impl QualifiedName {
    pub fn new(namespace: Option<String>, local_name: String) -> Self {
        Self {
            namespace,
            local_name,
        }
    }

    /// `{namespace}local` (Clark notation), or the bare local name
    pub fn clark_name(&self) -> String {
        match &self.namespace {
            Some(namespace) => format!("{{{}}}{}", namespace, self.local_name),
            None => self.local_name.clone(),
        }
    }
}

/// A well-formed document, owned by the validation call that parsed it
pub struct XmlDocument {
    tree: XmlDocPtr,
    root: QualifiedName,
}

impl XmlDocument {
    /// Parse `content`; a document is either rejected here or has exactly one root
    pub fn parse(engine: &LibXml2Wrapper, content: &[u8]) -> Result<Self, DocumentError> {
        let tree = engine.parse_document(content)?;
        let (namespace, local_name) = tree.root_element().ok_or_else(|| DocumentError::Internal {
            details: "document has no root element".to_string(),
        })?;

        Ok(Self {
            tree,
            root: QualifiedName::new(namespace, local_name),
        })
    }

    pub fn root(&self) -> &QualifiedName {
        &self.root
    }

    pub(crate) fn tree(&self) -> &XmlDocPtr {
        &self.tree
    }

    /// Direct text of the first element named `{namespace}local_name`
    ///
    /// Scans the whole document in document order, root included. The text is
    /// what precedes the element's first child element (text and CDATA),
    /// untrimmed. Comments between text runs do not end the text:
    /// `<cUF><!-- c -->35</cUF>` reads as `35`. `None` when no element matches.
    pub fn first_element_text(&self, namespace: &str, local_name: &str) -> Option<String> {
        self.tree.first_element_text(namespace, local_name)
    }
}
