use crate::AdminResult;
use async_trait::async_trait;

#[async_trait]
pub trait ConnectionTestable {
    /// Issues a cheap command so an unreachable server is detected before any work starts.
    async fn test_database_connection(&self) -> AdminResult<()>;
}
