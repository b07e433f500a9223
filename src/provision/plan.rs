//! The indexes the GlobalMarket collections are expected to carry.

use super::{IndexProvisionResult, IndexProvisioner};
use crate::database::index::{IndexDefinition, KeyPattern, SearchIndexDefinition};
use crate::database::traits::{IndexCatalog, SearchIndexManager};
use bson::doc;
use serde_derive::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionIndexPlan {
    pub collection: String,
    pub indexes: Vec<IndexDefinition>,
}

impl CollectionIndexPlan {
    fn new(collection: &str, indexes: Vec<IndexDefinition>) -> Self {
        Self {
            collection: collection.to_string(),
            indexes,
        }
    }
}

/// Collection plans in the order they are provisioned.
pub fn index_plan() -> Vec<CollectionIndexPlan> {
    vec![
        CollectionIndexPlan::new(
            "products",
            vec![
                IndexDefinition::new("idx_product_id_unique", KeyPattern::new().ascending("product_id")).unique(),
                IndexDefinition::new("idx_category_main", KeyPattern::new().ascending("category.main")),
                IndexDefinition::new(
                    "idx_category_price_desc",
                    KeyPattern::new()
                        .ascending("category.main")
                        .descending("pricing.actual_price"),
                ),
            ],
        ),
        CollectionIndexPlan::new(
            "sales",
            vec![
                IndexDefinition::new("idx_fk_product_id", KeyPattern::new().ascending("product_id")),
                IndexDefinition::new("idx_sale_date", KeyPattern::new().descending("sale_date")),
                IndexDefinition::new(
                    "idx_city_amount",
                    KeyPattern::new()
                        .ascending("shipping.city")
                        .descending("total_amount"),
                ),
            ],
        ),
        CollectionIndexPlan::new(
            "users",
            vec![IndexDefinition::new("idx_email_unique", KeyPattern::new().ascending("email")).unique()],
        ),
        CollectionIndexPlan::new(
            "reviews",
            vec![IndexDefinition::new(
                "idx_reviews_product_rating",
                KeyPattern::new().ascending("product_id").descending("rating"),
            )],
        ),
    ]
}

/// Full-text search over product names and descriptions, faceted by main category.
pub fn product_search_index() -> SearchIndexDefinition {
    SearchIndexDefinition {
        collection: "products".into(),
        name: "default".into(),
        definition: doc! {
            "mappings": {
                "dynamic": false,
                "fields": {
                    "name": { "type": "string", "analyzer": "lucene.standard" },
                    "description": { "type": "string", "analyzer": "lucene.standard" },
                    "category": {
                        "type": "document",
                        "fields": { "main": { "type": "stringFacet" } },
                    },
                },
            },
        },
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SearchIndexOutcome {
    Requested { name: String },
    /// Non-Atlas deployments and already existing search indexes end up here.
    NotRequested { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanReport {
    pub search_index: SearchIndexOutcome,
    pub indexes: Vec<IndexProvisionResult>,
}

impl PlanReport {
    pub fn failures(&self) -> usize {
        self.indexes
            .iter()
            .filter(|result| result.status.is_failure())
            .count()
    }
}

/// Requests the search index, then provisions every collection plan in order.
pub async fn provision_plan<D>(db: &D, plans: &[CollectionIndexPlan], search_index: &SearchIndexDefinition) -> PlanReport
where
    D: IndexCatalog + SearchIndexManager + Sync + ?Sized,
{
    let total_steps = plans.len() + 1;

    info!("[1/{}] Requesting search index `{}` on `{}`", total_steps, search_index.name, search_index.collection);
    let search_index = match db.create_search_index(search_index).await {
        Ok(name) => {
            info!("[OK] Search index `{}` requested", name);
            SearchIndexOutcome::Requested { name }
        }
        Err(e) => {
            info!("[INFO] Search index status: {}", e);
            SearchIndexOutcome::NotRequested { message: e.to_string() }
        }
    };

    let provisioner = IndexProvisioner::new(db);
    let mut indexes = Vec::new();
    for (step, plan) in plans.iter().enumerate() {
        info!("[{}/{}] Provisioning indexes on `{}`", step + 2, total_steps, plan.collection);
        indexes.extend(provisioner.provision_batch(&plan.collection, &plan.indexes).await);
    }

    PlanReport { search_index, indexes }
}
