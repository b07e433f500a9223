use crate::database::{
    index::{ExistingIndex, IndexDefinition, SearchIndexDefinition},
    mongodb::database_builder::MongodbDatabaseBuilder,
    traits::{
        AdminDatabase, CollectionManager, ConnectionTestable, DocumentStream, IndexCatalog,
        ReadOperations, SearchIndexManager, WriteOperations,
    },
};
use crate::schema::CollectionValidator;
use crate::{AdminError, AdminResult};
use async_trait::async_trait;
use futures_util::{StreamExt, TryStreamExt};
use mongodb::{bson::Document, Client, Database, IndexModel, SearchIndexModel};
use tracing::debug;

pub struct MongodbDatabase {
    client: Client,
    db: Database,
}

impl MongodbDatabase {
    pub fn builder() -> MongodbDatabaseBuilder {
        MongodbDatabaseBuilder::new()
    }

    pub(crate) fn new(client: Client, db: Database) -> Self {
        Self { client, db }
    }

    pub async fn shutdown(self) {
        self.client.shutdown().await;
    }
}

impl AdminDatabase for MongodbDatabase {
    fn database_name(&self) -> &str {
        self.db.name()
    }
}

#[async_trait]
impl ConnectionTestable for MongodbDatabase {
    async fn test_database_connection(&self) -> AdminResult<()> {
        self.db.list_collection_names().await?;
        Ok(())
    }
}

#[async_trait]
impl IndexCatalog for MongodbDatabase {
    async fn list_indexes(&self, collection_name: &str) -> AdminResult<Vec<ExistingIndex>> {
        let indexes: Vec<IndexModel> = self
            .db
            .collection::<Document>(collection_name)
            .list_indexes()
            .await?
            .try_collect()
            .await?;

        Ok(indexes.into_iter().map(ExistingIndex::from).collect())
    }

    async fn create_index(
        &self,
        collection_name: &str,
        definition: &IndexDefinition,
    ) -> AdminResult<()> {
        let index_model = IndexModel::try_from(definition)?;
        debug!(
            collection = collection_name,
            keys = %index_model.keys,
            "Sending createIndexes",
        );

        self.db
            .collection::<Document>(collection_name)
            .create_index(index_model)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl SearchIndexManager for MongodbDatabase {
    async fn create_search_index(&self, definition: &SearchIndexDefinition) -> AdminResult<String> {
        let name = self
            .db
            .collection::<Document>(&definition.collection)
            .create_search_index(SearchIndexModel::from(definition))
            .await?;
        Ok(name)
    }
}

#[async_trait]
impl CollectionManager for MongodbDatabase {
    async fn collection_names(&self) -> AdminResult<Vec<String>> {
        Ok(self.db.list_collection_names().await?)
    }

    async fn create_collection(&self, collection_name: &str) -> AdminResult<()> {
        self.db.create_collection(collection_name).await?;
        Ok(())
    }

    async fn install_validator(&self, validator: &CollectionValidator) -> AdminResult<()> {
        let reply = self.db.run_command(validator.to_command()).await?;

        // collMod reports failures through `ok: 0` on some server versions instead of an error
        match reply.get("ok").and_then(|ok| ok.as_f64().or_else(|| ok.as_i32().map(f64::from))) {
            Some(ok) if ok != 1.0 => Err(AdminError::Generic(format!(
                "collMod on `{}` was not acknowledged: {}",
                validator.collection, reply
            ))),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl WriteOperations for MongodbDatabase {
    async fn insert_one(&self, collection_name: &str, document: Document) -> AdminResult<()> {
        self.db
            .collection::<Document>(collection_name)
            .insert_one(document)
            .await?;
        Ok(())
    }

    async fn delete_one(&self, collection_name: &str, filter: Document) -> AdminResult<u64> {
        let result = self
            .db
            .collection::<Document>(collection_name)
            .delete_one(filter)
            .await?;
        Ok(result.deleted_count)
    }
}

#[async_trait]
impl ReadOperations for MongodbDatabase {
    async fn aggregate(
        &self,
        collection_name: &str,
        pipeline: Vec<Document>,
    ) -> AdminResult<DocumentStream> {
        let cursor = self
            .db
            .collection::<Document>(collection_name)
            .aggregate(pipeline)
            .await?;

        Ok(cursor.map_err(AdminError::from).boxed())
    }
}
