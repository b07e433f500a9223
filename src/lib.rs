mod error;

pub mod analytics;
pub mod config;
pub mod database;
pub mod provision;
pub mod schema;

pub use config::AdminConfig;
pub use database::index::{ExistingIndex, IndexDefinition, IndexKeyKind, KeyPattern, SearchIndexDefinition};
pub use database::mongodb::{MongodbDatabase, MongodbDatabaseBuilder};
pub use database::traits::AdminDatabase;
pub use error::{AdminError, AdminResult};
pub use provision::{IndexProvisionResult, IndexProvisionStatus, IndexProvisioner};
