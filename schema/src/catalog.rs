use std::path::Path;

use serde_json::Value;
use taskforge_store::ArtifactStore;
use taskforge_store::StoreError;
use taskforge_store::StoreMode;
use taskforge_store::ValidationRejection;
use taskforge_store::ValidationRequest;
use taskforge_store::WritePayload;
use taskforge_store::WriteValidator;

use crate::document::SchemaDocument;
use crate::validate::validate_value;

/// Loads schema documents from an artifact tree and exposes them as the
/// store's pre-write validation hook.
///
/// The catalog reads through its own read-only store so the hook can never
/// mutate the tree it guards, and schema refs are sandboxed exactly like
/// artifact paths.
pub struct SchemaCatalog {
    store: ArtifactStore,
}

impl SchemaCatalog {
    pub fn new(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let store = ArtifactStore::new(root)?.with_mode(StoreMode::ReadOnly);
        Ok(Self { store })
    }

    /// Load a schema document by store-relative ref, e.g. `schemas/task.json`.
    pub fn load(&self, schema_ref: &str) -> Result<SchemaDocument, StoreError> {
        self.store.read_json(schema_ref)
    }

    /// Validate `value` against the schema at `schema_ref`, returning the
    /// rendered violations. An error here means the schema itself could not
    /// be loaded, which is distinct from the document being invalid.
    pub fn check(&self, schema_ref: &str, value: &Value) -> Result<Vec<String>, StoreError> {
        let schema = self.load(schema_ref)?;
        Ok(validate_value(&schema, value)
            .iter()
            .map(ToString::to_string)
            .collect())
    }
}

impl WriteValidator for SchemaCatalog {
    fn validate(&self, request: &ValidationRequest<'_>) -> Result<(), ValidationRejection> {
        let text_value;
        let value = match request.payload {
            WritePayload::Json(value) => value,
            // Text payloads are validated as JSON strings, which lets a
            // schema constrain them with pattern/minLength.
            WritePayload::Text(text) => {
                text_value = Value::String(text.to_string());
                &text_value
            }
        };
        let violations = self.check(request.schema, value).map_err(|err| {
            ValidationRejection::new(vec![format!(
                "schema {} could not be loaded: {err}",
                request.schema
            )])
        })?;
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationRejection::new(violations))
        }
    }
}
