use super::{
    collection::CollectionManager,
    connection_testable::ConnectionTestable,
    index::{IndexCatalog, SearchIndexManager},
    read::ReadOperations,
    write::WriteOperations,
};

/// Everything the administrative commands need from a database handle.
pub trait AdminDatabase
where
    Self: IndexCatalog
        + SearchIndexManager
        + CollectionManager
        + WriteOperations
        + ReadOperations
        + ConnectionTestable
        + Send
        + Sync,
{
    /// Name of the database every operation runs against.
    fn database_name(&self) -> &str;
}
