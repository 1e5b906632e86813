use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;

/// A unit of periodic work driven by [`crate::scheduler::Scheduler`].
#[async_trait]
pub trait ScheduledJob: Send + Sync {
    fn name(&self) -> &str;
    fn period(&self) -> Duration;

    /// Whether the first run happens at start instead of one period later.
    fn runs_at_start(&self) -> bool {
        false
    }

    async fn tick(&self) -> Result<()>;
}
