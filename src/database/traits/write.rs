use crate::AdminResult;
use async_trait::async_trait;
use bson::Document;

#[async_trait]
pub trait WriteOperations {
    /// Inserts a single document. A document rejected by the collection's validator
    /// comes back as an error.
    async fn insert_one(&self, collection_name: &str, document: Document) -> AdminResult<()>;

    /// Returns the number of deleted documents.
    async fn delete_one(&self, collection_name: &str, filter: Document) -> AdminResult<u64>;
}
