//! Legacy policy administration system.
//!
//! The real system is not reachable from this service; [`DummyLegacyApi`]
//! stands in for it with a fixed record and a small artificial latency.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// One coverage line of a policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coverage {
    #[serde(rename = "type")]
    pub kind: String,
    pub limit: u64,
}

/// Policy record as returned by the legacy system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRecord {
    pub policy_number: String,
    pub holder: String,
    pub policy_type: String,
    pub sum_insured: u64,
    pub effective_date: String,
    pub expiry_date: String,
    pub coverage: Vec<Coverage>,
}

/// Lookup of policy records by number.
#[async_trait::async_trait]
pub trait PolicyLookup: Send + Sync {
    async fn lookup(&self, policy_number: &str) -> anyhow::Result<PolicyRecord>;
}

/// Stand-in for the legacy API.
#[derive(Debug, Clone)]
pub struct DummyLegacyApi {
    latency: Duration,
}

impl Default for DummyLegacyApi {
    fn default() -> Self {
        Self {
            latency: Duration::from_millis(100),
        }
    }
}

impl DummyLegacyApi {
    #[must_use]
    pub fn with_latency(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait::async_trait]
impl PolicyLookup for DummyLegacyApi {
    async fn lookup(&self, policy_number: &str) -> anyhow::Result<PolicyRecord> {
        tokio::time::sleep(self.latency).await;
        tracing::debug!(policy_number, "Legacy policy lookup");

        Ok(PolicyRecord {
            policy_number: policy_number.to_string(),
            holder: "RK".to_string(),
            policy_type: "Life insurance".to_string(),
            sum_insured: 275_000,
            effective_date: "2023-06-01".to_string(),
            expiry_date: "2050-06-01".to_string(),
            coverage: vec![
                Coverage {
                    kind: "Death".to_string(),
                    limit: 200_000,
                },
                Coverage {
                    kind: "TPD".to_string(),
                    limit: 50_000,
                },
                Coverage {
                    kind: "Critical Illness".to_string(),
                    limit: 50_000,
                },
            ],
        })
    }
}
