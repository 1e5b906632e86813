use async_trait::async_trait;

use crate::domains::reply::ChatReply;
use crate::error::Result;

/// The chat backend as seen by a session.
///
/// Probe failures come back as `RouteVizError::Http` when the backend
/// answered with a non-2xx status and as `RouteVizError::Connectivity` when
/// it could not be reached at all.
#[async_trait]
pub trait BackendGateway: Send + Sync {
    fn base_url(&self) -> &str;
    async fn health(&self) -> Result<()>;
    async fn terminal_output(&self) -> Result<()>;
    async fn chat(&self, message: &str) -> Result<ChatReply>;
}
