//! Structural validation of parsed documents
//!
//! Conformance checking (presence, ordering, cardinality, simple-type facets) is
//! left entirely to libxml2. This layer runs it against the right schema and
//! hands back every diagnostic the engine raised, in engine order.

use std::sync::Arc;

use tracing::debug;

use crate::document::XmlDocument;
use crate::error::DocumentError;
use crate::libxml2::{LibXml2Wrapper, SchemaCheck, XmlSchemaPtr};

pub struct Validator {
    engine: Arc<LibXml2Wrapper>,
}

impl Validator {
    pub fn new(engine: Arc<LibXml2Wrapper>) -> Self {
        Self { engine }
    }

    /// Check a well-formed document against a compiled schema
    ///
    /// `Invalid` always carries at least one violation. Engine failures that are
    /// not violations (context allocation, negative return codes) become
    /// `DocumentError::Internal`.
    pub fn check(
        &self,
        document: &XmlDocument,
        schema: &XmlSchemaPtr,
    ) -> Result<SchemaCheck, DocumentError> {
        let check = self.engine.validate_document(schema, document.tree())?;

        match &check {
            SchemaCheck::Valid => debug!(root = %document.root().clark_name(), "document is valid"),
            SchemaCheck::Invalid { violations } => debug!(
                root = %document.root().clark_name(),
                violations = violations.len(),
                "document has schema violations"
            ),
        }

        Ok(check)
    }
}
