pub use admin::AdminDatabase;
pub use collection::CollectionManager;
pub use connection_testable::ConnectionTestable;
pub use index::{IndexCatalog, SearchIndexManager};
pub use read::{DocumentStream, ReadOperations};
pub use write::WriteOperations;

mod admin;
mod collection;
mod connection_testable;
mod index;
mod read;
mod write;
