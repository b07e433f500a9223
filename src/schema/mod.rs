//! `$jsonSchema` validators and their installation through `collMod`.

pub mod integrity;
pub mod rules;

use crate::database::traits::CollectionManager;
use crate::AdminResult;
use bson::{doc, Document};
use serde_derive::{Deserialize, Serialize};
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationLevel {
    Off,
    Strict,
    Moderate,
}

impl ValidationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Strict => "strict",
            Self::Moderate => "moderate",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationAction {
    Error,
    Warn,
}

impl ValidationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionValidator {
    pub collection: String,
    /// Body of the `$jsonSchema` operator.
    pub schema: Document,
    pub level: ValidationLevel,
    pub action: ValidationAction,
}

impl CollectionValidator {
    /// A validator that rejects every non-conforming insert and update.
    pub fn strict(collection: impl Into<String>, schema: Document) -> Self {
        Self {
            collection: collection.into(),
            schema,
            level: ValidationLevel::Strict,
            action: ValidationAction::Error,
        }
    }

    /// The `collMod` command that attaches this validator to its collection.
    pub fn to_command(&self) -> Document {
        doc! {
            "collMod": self.collection.as_str(),
            "validator": { "$jsonSchema": self.schema.clone() },
            "validationLevel": self.level.as_str(),
            "validationAction": self.action.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorOutcome {
    pub collection: String,
    /// `None` when the validator was installed.
    pub error: Option<String>,
}

/// Creates the collections that do not exist yet and returns the names it created.
///
/// Only the initial listing can fail the call. A collection that cannot be created
/// is logged and skipped so the rest are still attempted.
pub async fn ensure_collections<D>(db: &D, names: &[&str]) -> AdminResult<Vec<String>>
where
    D: CollectionManager + Sync + ?Sized,
{
    let existing = db.collection_names().await?;
    let mut created = Vec::new();

    for name in names {
        if existing.iter().any(|collection| collection == name) {
            continue;
        }
        match db.create_collection(name).await {
            Ok(()) => {
                info!("[INFO] Collection `{}` created", name);
                created.push(name.to_string());
            }
            Err(e) => warn!("[WARN] Collection `{}` could not be created: {}", name, e),
        }
    }

    Ok(created)
}

/// Installs each validator, reporting failures inline so the remaining ones still run.
///
/// Missing collections are created first. When that step fails the validators are
/// applied anyway; a collection that really is missing shows up as a failed outcome.
pub async fn install_validators<D>(db: &D, validators: &[CollectionValidator]) -> Vec<ValidatorOutcome>
where
    D: CollectionManager + Sync + ?Sized,
{
    let names: Vec<&str> = validators.iter().map(|v| v.collection.as_str()).collect();
    if let Err(e) = ensure_collections(db, &names).await {
        warn!("[WARN] Could not list collections, applying validators as is: {}", e);
    }

    let mut outcomes = Vec::with_capacity(validators.len());
    for validator in validators {
        info!("[PROCESS] Applying validation rules to `{}`", validator.collection);
        let error = match db.install_validator(validator).await {
            Ok(()) => {
                info!("[OK] Schema for `{}` applied", validator.collection);
                None
            }
            Err(e) => {
                error!("[ERROR] Schema for `{}` was not applied: {}", validator.collection, e);
                Some(e.to_string())
            }
        };
        outcomes.push(ValidatorOutcome {
            collection: validator.collection.clone(),
            error,
        });
    }

    outcomes
}
