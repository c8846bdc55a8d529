//! Capability port and pool
//!
//! A capability is a stateless specialist exposing
//! `process(context) -> AgentResponse`. The [`CapabilityPool`] is built once
//! at process start and passed explicitly to the scheduler and planner.

use super::llm_gateway::GatewayError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use workforce_domain::{AgentResponse, ExecutionContext};

/// Transient failure classes (retried)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransientKind {
    Network,
    Timeout,
    RateLimited,
    Provider,
}

/// Permanent failure classes (never retried)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermanentKind {
    Validation,
    ContentPolicy,
    Auth,
    Provider,
}

/// Errors a capability may fail with
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CapabilityError {
    #[error("Transient failure ({kind:?}): {message}")]
    Transient { kind: TransientKind, message: String },

    #[error("Permanent failure ({kind:?}): {message}")]
    Permanent { kind: PermanentKind, message: String },
}

impl CapabilityError {
    pub fn transient(kind: TransientKind, message: impl Into<String>) -> Self {
        CapabilityError::Transient {
            kind,
            message: message.into(),
        }
    }

    pub fn permanent(kind: PermanentKind, message: impl Into<String>) -> Self {
        CapabilityError::Permanent {
            kind,
            message: message.into(),
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, CapabilityError::Transient { .. })
    }
}

impl From<GatewayError> for CapabilityError {
    fn from(err: GatewayError) -> Self {
        let message = err.to_string();
        match err {
            GatewayError::RateLimited => Self::transient(TransientKind::RateLimited, message),
            GatewayError::Timeout => Self::transient(TransientKind::Timeout, message),
            GatewayError::ConnectionError(_) => Self::transient(TransientKind::Network, message),
            GatewayError::ProviderError { .. } if err.is_transient() => {
                Self::transient(TransientKind::Provider, message)
            }
            GatewayError::ProviderError { .. } => {
                Self::permanent(PermanentKind::Provider, message)
            }
            GatewayError::AuthError(_) => Self::permanent(PermanentKind::Auth, message),
            GatewayError::ContentPolicy(_) => {
                Self::permanent(PermanentKind::ContentPolicy, message)
            }
        }
    }
}

/// A specialist unit of work
#[async_trait]
pub trait Capability: Send + Sync {
    /// Registered name, referenced by `TaskNode::capability`
    fn name(&self) -> &str;

    /// One-line description shown to the planner
    fn description(&self) -> &str;

    /// Execute one node
    async fn process(&self, context: &ExecutionContext) -> Result<AgentResponse, CapabilityError>;
}

/// Name → capability registry with a designated generalist fallback
#[derive(Clone)]
pub struct CapabilityPool {
    capabilities: HashMap<String, Arc<dyn Capability>>,
    /// Registration order, for stable listings
    order: Vec<String>,
    generalist: String,
}

impl CapabilityPool {
    /// Create an empty pool whose fallback capability is `generalist`
    pub fn new(generalist: impl Into<String>) -> Self {
        Self {
            capabilities: HashMap::new(),
            order: Vec::new(),
            generalist: generalist.into(),
        }
    }

    /// Register a capability; a later registration under the same name replaces the earlier one
    pub fn register(mut self, capability: Arc<dyn Capability>) -> Self {
        let name = capability.name().to_string();
        if self.capabilities.insert(name.clone(), capability).is_none() {
            self.order.push(name);
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Capability>> {
        self.capabilities.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.capabilities.contains_key(name)
    }

    /// Name of the fallback capability
    pub fn generalist(&self) -> &str {
        &self.generalist
    }

    /// Whether the generalist is actually registered
    pub fn has_generalist(&self) -> bool {
        self.contains(&self.generalist)
    }

    pub fn names(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    /// `(name, description)` pairs in registration order
    pub fn descriptors(&self) -> Vec<(String, String)> {
        self.order
            .iter()
            .filter_map(|name| self.capabilities.get(name))
            .map(|c| (c.name().to_string(), c.description().to_string()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }
}

impl std::fmt::Debug for CapabilityPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityPool")
            .field("capabilities", &self.order)
            .field("generalist", &self.generalist)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo(&'static str);

    #[async_trait]
    impl Capability for Echo {
        fn name(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            "echoes the instruction"
        }

        async fn process(
            &self,
            context: &ExecutionContext,
        ) -> Result<AgentResponse, CapabilityError> {
            Ok(AgentResponse::new(self.0, context.instruction.clone()))
        }
    }

    #[test]
    fn test_pool_registration_order() {
        let pool = CapabilityPool::new("legal_advisor")
            .register(Arc::new(Echo("contract_reviewer")))
            .register(Arc::new(Echo("legal_advisor")))
            .register(Arc::new(Echo("contract_reviewer")));

        assert_eq!(pool.len(), 2);
        assert_eq!(pool.names(), vec!["contract_reviewer", "legal_advisor"]);
        assert!(pool.has_generalist());
        assert!(pool.get("risk_assessor").is_none());
    }

    #[test]
    fn test_gateway_error_mapping() {
        assert!(CapabilityError::from(GatewayError::RateLimited).is_transient());
        assert!(CapabilityError::from(GatewayError::Timeout).is_transient());
        assert!(
            CapabilityError::from(GatewayError::ProviderError {
                status: Some(500),
                message: "oops".into()
            })
            .is_transient()
        );
        assert_eq!(
            CapabilityError::from(GatewayError::ContentPolicy("no".into())),
            CapabilityError::permanent(
                PermanentKind::ContentPolicy,
                "Content rejected by provider policy: no"
            )
        );
        assert!(!CapabilityError::from(GatewayError::AuthError("key".into())).is_transient());
    }

    #[tokio::test]
    async fn test_process_through_pool() {
        let pool = CapabilityPool::new("echo").register(Arc::new(Echo("echo")));
        let ctx = ExecutionContext::new("task", "T1", "hello");
        let response = pool.get("echo").unwrap().process(&ctx).await.unwrap();
        assert_eq!(response.content, "hello");
    }
}
