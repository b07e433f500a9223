//! Smoke tests run against the live validators: inserts that must be rejected and
//! one that must be accepted.

use crate::database::traits::WriteOperations;
use bson::{doc, Document};
use serde_derive::{Deserialize, Serialize};
use tracing::{error, info, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expectation {
    Rejected,
    /// The inserted document is deleted again with this filter.
    Accepted { cleanup_filter: Document },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrityCheck {
    pub description: String,
    pub collection: String,
    pub document: Document,
    pub expectation: Expectation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckOutcome {
    Passed,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckReport {
    pub description: String,
    #[serde(flatten)]
    pub outcome: CheckOutcome,
}

impl CheckReport {
    /// True when the insert behaved as expected.
    pub fn passed(&self) -> bool {
        self.outcome == CheckOutcome::Passed
    }
}

/// Two inserts the validators must refuse and one well-formed product they must accept.
pub fn default_checks() -> Vec<IntegrityCheck> {
    vec![
        IntegrityCheck {
            description: "negative price is rejected".into(),
            collection: "products".into(),
            document: doc! {
                "product_id": "TEST_FAIL_01",
                "name": "Invalid product",
                "category": { "main": "Test" },
                "pricing": { "discounted_price": -50.0, "actual_price": 100.0 },
                "rating": { "average": 4.5, "count": 10 },
            },
            expectation: Expectation::Rejected,
        },
        IntegrityCheck {
            description: "malformed email is rejected".into(),
            collection: "users".into(),
            document: doc! {
                "user_id": "TEST_FAIL_02",
                "name": "Invalid user",
                "email": "email_without_at.com",
            },
            expectation: Expectation::Rejected,
        },
        IntegrityCheck {
            description: "valid product is accepted".into(),
            collection: "products".into(),
            document: doc! {
                "product_id": "TEST_SUCCESS_01",
                "name": "Valid test product",
                "category": { "main": "Electronics", "sub": ["Test"] },
                "pricing": {
                    "discounted_price": 100.0,
                    "actual_price": 150.0,
                    "discount_percentage": 33.3,
                    "currency": "USD",
                },
                "rating": { "average": 5.0, "count": 1 },
            },
            expectation: Expectation::Accepted {
                cleanup_filter: doc! { "product_id": "TEST_SUCCESS_01" },
            },
        },
    ]
}

/// Runs every check in order. Each outcome is logged and reported; none of them stops the run.
pub async fn run_checks<D>(db: &D, checks: &[IntegrityCheck]) -> Vec<CheckReport>
where
    D: WriteOperations + Sync + ?Sized,
{
    let mut reports = Vec::with_capacity(checks.len());
    for check in checks {
        let outcome = run_check(db, check).await;
        match &outcome {
            CheckOutcome::Passed => info!("[SUCCESS] {}", check.description),
            CheckOutcome::Failed { reason } => error!("[FAILURE] {}: {}", check.description, reason),
        }
        reports.push(CheckReport {
            description: check.description.clone(),
            outcome,
        });
    }
    reports
}

async fn run_check<D>(db: &D, check: &IntegrityCheck) -> CheckOutcome
where
    D: WriteOperations + Sync + ?Sized,
{
    // Rejection is the expected path for most checks, so the insert error is data here
    let inserted = db.insert_one(&check.collection, check.document.clone()).await;

    match (&check.expectation, inserted) {
        (Expectation::Rejected, Err(_)) => CheckOutcome::Passed,
        (Expectation::Rejected, Ok(())) => CheckOutcome::Failed {
            reason: "the document was accepted (false negative)".into(),
        },
        (Expectation::Accepted { cleanup_filter }, Ok(())) => {
            // Remove the accepted document so the check leaves no trace
            match db.delete_one(&check.collection, cleanup_filter.clone()).await {
                Ok(0) => warn!("Test document in `{}` was already gone", check.collection),
                Ok(_) => {}
                Err(e) => warn!("Could not remove test document from `{}`: {}", check.collection, e),
            }
            CheckOutcome::Passed
        }
        (Expectation::Accepted { .. }, Err(e)) => CheckOutcome::Failed {
            reason: format!("valid data was rejected: {}", e),
        },
    }
}
