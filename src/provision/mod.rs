//! Idempotent index provisioning.
//!
//! [`IndexProvisioner::ensure_index`] is a single check-then-act cycle: it lists the
//! collection's indexes, looks for one with a structurally identical key pattern and
//! only asks the server to build the index when none exists. Nothing here raises;
//! every outcome comes back as an [`IndexProvisionResult`].
//!
//! Two runs racing from different processes can both see "no match" and both
//! attempt creation. The server then either accepts the identical request twice or
//! rejects the loser, which surfaces as [`IndexProvisionStatus::Failed`].

pub mod plan;

use crate::database::index::{ExistingIndex, IndexDefinition};
use crate::database::traits::IndexCatalog;
use serde_derive::{Deserialize, Serialize};
use std::fmt::Display;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IndexProvisionStatus {
    Created,
    AlreadyCorrect,
    /// An index on the same keys exists under another name; nothing was created.
    SkippedDuplicateKeys { existing_name: String },
    Failed { message: String },
}

impl IndexProvisionStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexProvisionResult {
    pub collection: String,
    pub index_name: String,
    #[serde(flatten)]
    pub status: IndexProvisionStatus,
}

impl Display for IndexProvisionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.status {
            IndexProvisionStatus::Created => {
                write!(f, "[OK] Created index `{}` on `{}`", self.index_name, self.collection)
            }
            IndexProvisionStatus::AlreadyCorrect => write!(
                f,
                "[SKIP] Index `{}` on `{}` already exists and is correct",
                self.index_name, self.collection
            ),
            IndexProvisionStatus::SkippedDuplicateKeys { existing_name } => write!(
                f,
                "[SKIP] `{}` already has an identical index named `{}`; `{}` was not created",
                self.collection, existing_name, self.index_name
            ),
            IndexProvisionStatus::Failed { message } => write!(
                f,
                "[ERROR] Could not create `{}` on `{}`: {}",
                self.index_name, self.collection, message
            ),
        }
    }
}

pub struct IndexProvisioner<'a, C: IndexCatalog + Sync + ?Sized> {
    catalog: &'a C,
}

impl<'a, C: IndexCatalog + Sync + ?Sized> IndexProvisioner<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        Self { catalog }
    }

    /// Makes sure an index with exactly `definition`'s key pattern exists on the collection.
    pub async fn ensure_index(
        &self,
        collection_name: &str,
        definition: &IndexDefinition,
    ) -> IndexProvisionResult {
        let status = self.provision(collection_name, definition).await;
        let result = IndexProvisionResult {
            collection: collection_name.to_string(),
            index_name: definition.name.clone(),
            status,
        };

        match result.status {
            IndexProvisionStatus::Failed { .. } => error!("{}", result),
            _ => info!("{}", result),
        }
        result
    }

    /// Runs [`Self::ensure_index`] for each definition in order. A failed definition
    /// does not stop the ones after it.
    pub async fn provision_batch(
        &self,
        collection_name: &str,
        definitions: &[IndexDefinition],
    ) -> Vec<IndexProvisionResult> {
        let mut results = Vec::with_capacity(definitions.len());
        for definition in definitions {
            results.push(self.ensure_index(collection_name, definition).await);
        }
        results
    }

    async fn provision(&self, collection_name: &str, definition: &IndexDefinition) -> IndexProvisionStatus {
        if collection_name.trim().is_empty() {
            return IndexProvisionStatus::Failed {
                message: "collection name must not be empty".into(),
            };
        }

        let existing = self.existing_indexes(collection_name).await;

        if let Some(found) = find_matching_index(&existing, definition) {
            return if found.name == definition.name {
                IndexProvisionStatus::AlreadyCorrect
            } else {
                IndexProvisionStatus::SkippedDuplicateKeys {
                    existing_name: found.name.clone(),
                }
            };
        }

        debug!(
            collection = collection_name,
            index = definition.name.as_str(),
            keys = %definition.key_pattern,
            "No index with matching keys, creating",
        );

        match self.catalog.create_index(collection_name, definition).await {
            Ok(()) => IndexProvisionStatus::Created,
            Err(e) => IndexProvisionStatus::Failed { message: e.to_string() },
        }
    }

    /// Always re-queried; a missing collection or a failed listing counts as no indexes.
    async fn existing_indexes(&self, collection_name: &str) -> Vec<ExistingIndex> {
        match self.catalog.list_indexes(collection_name).await {
            Ok(indexes) => indexes,
            Err(e) => {
                warn!(
                    "Could not list indexes for collection `{}`, assuming none exist: {}",
                    collection_name, e
                );
                Vec::new()
            }
        }
    }
}

/// Finds an existing index whose key pattern equals the definition's, regardless of name.
pub fn find_matching_index<'e>(
    existing: &'e [ExistingIndex],
    definition: &IndexDefinition,
) -> Option<&'e ExistingIndex> {
    existing
        .iter()
        .find(|index| index.key_pattern == definition.key_pattern)
}
