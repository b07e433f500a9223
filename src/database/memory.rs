//! In-memory stand-in for a MongoDB database, used by the unit tests.
//!
//! It follows the server's index rules closely enough to exercise the provisioner:
//! every collection starts with `_id_`, a second index on identical keys is
//! rejected whatever its name, and a name may not be reused for other keys.

use crate::database::index::{ExistingIndex, IndexDefinition, KeyPattern, SearchIndexDefinition};
use crate::database::traits::{
    AdminDatabase, CollectionManager, ConnectionTestable, DocumentStream, IndexCatalog,
    ReadOperations, SearchIndexManager, WriteOperations,
};
use crate::schema::CollectionValidator;
use crate::{AdminError, AdminResult};
use async_trait::async_trait;
use bson::Document;
use futures_util::StreamExt;
use std::collections::BTreeMap;
use std::sync::Mutex;

type RejectRule = Box<dyn Fn(&str, &Document) -> bool + Send + Sync>;

#[derive(Debug, Default, Clone)]
pub(crate) struct MemoryCollection {
    pub(crate) indexes: Vec<ExistingIndex>,
    pub(crate) documents: Vec<Document>,
    pub(crate) validator: Option<CollectionValidator>,
}

impl MemoryCollection {
    fn new() -> Self {
        Self {
            indexes: vec![ExistingIndex::new("_id_", KeyPattern::new().ascending("_id"))],
            ..Self::default()
        }
    }
}

#[derive(Default)]
pub(crate) struct MemoryDatabase {
    collections: Mutex<BTreeMap<String, MemoryCollection>>,
    create_index_calls: Mutex<Vec<(String, String)>>,
    search_indexes: Mutex<Vec<SearchIndexDefinition>>,
    pipelines: Mutex<Vec<(String, Vec<Document>)>>,
    reject_rule: Option<RejectRule>,
    fail_listing: bool,
    fail_search_indexes: bool,
    fail_aggregations: bool,
    fail_collection_listing: bool,
    uncreatable_collections: Vec<String>,
    failing_validators: Vec<String>,
}

impl MemoryDatabase {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_collection(self, name: &str) -> Self {
        self.lock_collections()
            .entry(name.to_string())
            .or_insert_with(MemoryCollection::new);
        self
    }

    pub(crate) fn with_index(self, collection_name: &str, name: &str, key_pattern: KeyPattern) -> Self {
        self.lock_collections()
            .entry(collection_name.to_string())
            .or_insert_with(MemoryCollection::new)
            .indexes
            .push(ExistingIndex::new(name, key_pattern));
        self
    }

    pub(crate) fn with_documents(self, collection_name: &str, documents: Vec<Document>) -> Self {
        self.lock_collections()
            .entry(collection_name.to_string())
            .or_insert_with(MemoryCollection::new)
            .documents
            .extend(documents);
        self
    }

    /// Inserts for which the rule returns true fail like a document validation error.
    pub(crate) fn rejecting(mut self, rule: impl Fn(&str, &Document) -> bool + Send + Sync + 'static) -> Self {
        self.reject_rule = Some(Box::new(rule));
        self
    }

    pub(crate) fn failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    pub(crate) fn failing_search_indexes(mut self) -> Self {
        self.fail_search_indexes = true;
        self
    }

    pub(crate) fn failing_aggregations(mut self) -> Self {
        self.fail_aggregations = true;
        self
    }

    pub(crate) fn failing_collection_listing(mut self) -> Self {
        self.fail_collection_listing = true;
        self
    }

    pub(crate) fn failing_collection_creation(mut self, collection_name: &str) -> Self {
        self.uncreatable_collections.push(collection_name.to_string());
        self
    }

    /// `collMod` on this collection fails as if the server rejected the schema.
    pub(crate) fn failing_validator(mut self, collection_name: &str) -> Self {
        self.failing_validators.push(collection_name.to_string());
        self
    }

    pub(crate) fn collection(&self, name: &str) -> Option<MemoryCollection> {
        self.lock_collections().get(name).cloned()
    }

    pub(crate) fn indexes(&self, collection_name: &str) -> Vec<ExistingIndex> {
        self.collection(collection_name)
            .map(|collection| collection.indexes)
            .unwrap_or_default()
    }

    pub(crate) fn create_index_calls(&self) -> Vec<(String, String)> {
        self.create_index_calls.lock().unwrap().clone()
    }

    pub(crate) fn search_indexes(&self) -> Vec<SearchIndexDefinition> {
        self.search_indexes.lock().unwrap().clone()
    }

    pub(crate) fn pipelines(&self) -> Vec<(String, Vec<Document>)> {
        self.pipelines.lock().unwrap().clone()
    }

    fn lock_collections(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, MemoryCollection>> {
        self.collections.lock().unwrap()
    }
}

impl AdminDatabase for MemoryDatabase {
    fn database_name(&self) -> &str {
        "memory"
    }
}

#[async_trait]
impl ConnectionTestable for MemoryDatabase {
    async fn test_database_connection(&self) -> AdminResult<()> {
        Ok(())
    }
}

#[async_trait]
impl IndexCatalog for MemoryDatabase {
    async fn list_indexes(&self, collection_name: &str) -> AdminResult<Vec<ExistingIndex>> {
        if self.fail_listing {
            return Err(AdminError::Generic("listIndexes is unavailable".into()));
        }

        self.lock_collections()
            .get(collection_name)
            .map(|collection| collection.indexes.clone())
            .ok_or_else(|| AdminError::Generic(format!("ns does not exist: memory.{}", collection_name)))
    }

    async fn create_index(&self, collection_name: &str, definition: &IndexDefinition) -> AdminResult<()> {
        self.create_index_calls
            .lock()
            .unwrap()
            .push((collection_name.to_string(), definition.name.clone()));

        if definition.key_pattern.is_empty() {
            return Err(AdminError::IndexError("Index keys cannot be empty".into()));
        }

        let mut collections = self.lock_collections();
        let collection = collections
            .entry(collection_name.to_string())
            .or_insert_with(MemoryCollection::new);

        if let Some(existing) = collection.indexes.iter().find(|index| index.name == definition.name) {
            if existing.key_pattern == definition.key_pattern {
                return Ok(());
            }
            return Err(AdminError::IndexError(format!(
                "An existing index has the same name as the requested index. Requested index: {}, existing index: {}",
                definition.key_pattern, existing.key_pattern
            )));
        }

        if let Some(existing) = collection
            .indexes
            .iter()
            .find(|index| index.key_pattern == definition.key_pattern)
        {
            return Err(AdminError::IndexError(format!(
                "Index already exists with a different name: {}",
                existing.name
            )));
        }

        collection
            .indexes
            .push(ExistingIndex::new(definition.name.clone(), definition.key_pattern.clone()));
        Ok(())
    }
}

#[async_trait]
impl SearchIndexManager for MemoryDatabase {
    async fn create_search_index(&self, definition: &SearchIndexDefinition) -> AdminResult<String> {
        if self.fail_search_indexes {
            return Err(AdminError::Generic(
                "Search indexes are only available on Atlas".into(),
            ));
        }

        self.search_indexes.lock().unwrap().push(definition.clone());
        Ok(definition.name.clone())
    }
}

#[async_trait]
impl CollectionManager for MemoryDatabase {
    async fn collection_names(&self) -> AdminResult<Vec<String>> {
        if self.fail_collection_listing {
            return Err(AdminError::Generic("listCollections is unavailable".into()));
        }
        Ok(self.lock_collections().keys().cloned().collect())
    }

    async fn create_collection(&self, collection_name: &str) -> AdminResult<()> {
        if self.uncreatable_collections.iter().any(|name| name == collection_name) {
            return Err(AdminError::Generic(format!(
                "not authorized on memory to execute command {{ create: \"{}\" }}",
                collection_name
            )));
        }

        let mut collections = self.lock_collections();
        if collections.contains_key(collection_name) {
            return Err(AdminError::Generic(format!(
                "Collection memory.{} already exists",
                collection_name
            )));
        }
        collections.insert(collection_name.to_string(), MemoryCollection::new());
        Ok(())
    }

    async fn install_validator(&self, validator: &CollectionValidator) -> AdminResult<()> {
        if self.failing_validators.contains(&validator.collection) {
            return Err(AdminError::Generic(format!(
                "Parsing of collection validator failed for memory.{}",
                validator.collection
            )));
        }

        let mut collections = self.lock_collections();
        let collection = collections.get_mut(&validator.collection).ok_or_else(|| {
            AdminError::Generic(format!("ns does not exist: memory.{}", validator.collection))
        })?;
        collection.validator = Some(validator.clone());
        Ok(())
    }
}

#[async_trait]
impl WriteOperations for MemoryDatabase {
    async fn insert_one(&self, collection_name: &str, document: Document) -> AdminResult<()> {
        if let Some(rule) = &self.reject_rule {
            if rule(collection_name, &document) {
                return Err(AdminError::Generic("Document failed validation".into()));
            }
        }

        self.lock_collections()
            .entry(collection_name.to_string())
            .or_insert_with(MemoryCollection::new)
            .documents
            .push(document);
        Ok(())
    }

    async fn delete_one(&self, collection_name: &str, filter: Document) -> AdminResult<u64> {
        let mut collections = self.lock_collections();
        let Some(collection) = collections.get_mut(collection_name) else {
            return Ok(0);
        };

        let position = collection.documents.iter().position(|document| {
            filter
                .iter()
                .all(|(key, value)| document.get(key) == Some(value))
        });

        match position {
            Some(position) => {
                collection.documents.remove(position);
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

#[async_trait]
impl ReadOperations for MemoryDatabase {
    /// Records the pipeline and yields the collection's documents untouched.
    async fn aggregate(&self, collection_name: &str, pipeline: Vec<Document>) -> AdminResult<DocumentStream> {
        if self.fail_aggregations {
            return Err(AdminError::Generic("$lookup is not allowed in this context".into()));
        }

        self.pipelines
            .lock()
            .unwrap()
            .push((collection_name.to_string(), pipeline));

        let documents = self
            .collection(collection_name)
            .map(|collection| collection.documents)
            .unwrap_or_default();

        Ok(futures_util::stream::iter(documents.into_iter().map(Ok)).boxed())
    }
}
