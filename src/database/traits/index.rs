use crate::database::index::{ExistingIndex, IndexDefinition, SearchIndexDefinition};
use crate::AdminResult;
use async_trait::async_trait;

#[async_trait]
pub trait IndexCatalog {
    /// Lists every index on the collection, including the default `_id_` index.
    /// Errors when the collection does not exist.
    async fn list_indexes(&self, collection_name: &str) -> AdminResult<Vec<ExistingIndex>>;

    /// Asks the server to build the index. Name and key conflicts come back as errors.
    async fn create_index(
        &self,
        collection_name: &str,
        definition: &IndexDefinition,
    ) -> AdminResult<()>;
}

#[async_trait]
pub trait SearchIndexManager {
    /// Submits a search index build and returns the name the engine accepted.
    async fn create_search_index(&self, definition: &SearchIndexDefinition) -> AdminResult<String>;
}
