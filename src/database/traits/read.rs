use crate::AdminResult;
use async_trait::async_trait;
use bson::Document;
use futures_util::stream::BoxStream;

/// Lazily yielded aggregation output.
pub type DocumentStream = BoxStream<'static, AdminResult<Document>>;

#[async_trait]
pub trait ReadOperations {
    /// Runs an aggregation on the collection. Documents are pulled from the cursor as
    /// the stream is polled.
    async fn aggregate(
        &self,
        collection_name: &str,
        pipeline: Vec<Document>,
    ) -> AdminResult<DocumentStream>;
}
