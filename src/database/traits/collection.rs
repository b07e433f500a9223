use crate::schema::CollectionValidator;
use crate::AdminResult;
use async_trait::async_trait;

/// Collection lifecycle and schema validation.
#[async_trait]
pub trait CollectionManager {
    /// Names of every collection in the database, views excluded.
    async fn collection_names(&self) -> AdminResult<Vec<String>>;

    /// Creates an empty collection. Errors when the collection already exists.
    async fn create_collection(&self, collection_name: &str) -> AdminResult<()>;

    /// Attaches the validator to an existing collection, replacing any previous one.
    async fn install_validator(&self, validator: &CollectionValidator) -> AdminResult<()>;
}
