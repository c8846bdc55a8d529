//! Arbiter port
//!
//! The arbiter returns raw text; interpretation into a verdict happens in the
//! domain so malformed output can never raise.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
#[error("Arbitration failed: {0}")]
pub struct ArbitrationError(pub String);

/// Reconciles several specialist conclusions
#[async_trait]
pub trait Arbiter: Send + Sync {
    /// `responses` holds `(agent_name, content)` for every usable response
    async fn arbitrate(
        &self,
        task_description: &str,
        responses: &[(String, String)],
    ) -> Result<String, ArbitrationError>;
}
