//! Retry policy definitions

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fixed-interval retry policy for a single call site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first
    pub max_attempts: u32,

    /// Delay between a failed attempt and the next one
    #[serde(with = "millis")]
    pub delay: Duration,
}

impl RetryPolicy {
    /// Create a policy
    pub const fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// Cluster role binding get-or-create: a freshly created binding may take
    /// a while to become visible
    pub const ROLE_BINDING: RetryPolicy = RetryPolicy::new(3, Duration::from_secs(10));

    /// Helm initialisation, seen to fail intermittently on public clouds
    pub const HELM_INIT: RetryPolicy = RetryPolicy::new(3, Duration::from_secs(2));

    /// Ingress chart install: one attempt plus three retries
    pub const INGRESS_CHART: RetryPolicy = RetryPolicy::new(4, Duration::from_secs(1));
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_site_policies() {
        assert_eq!(RetryPolicy::ROLE_BINDING.max_attempts, 3);
        assert_eq!(RetryPolicy::ROLE_BINDING.delay, Duration::from_secs(10));
        assert_eq!(RetryPolicy::HELM_INIT.delay, Duration::from_secs(2));
        assert_eq!(RetryPolicy::INGRESS_CHART.max_attempts, 4);
    }

    #[test]
    fn test_yaml_round_trip_uses_millis() {
        let policy: RetryPolicy =
            serde_yaml_ng::from_str("max-attempts: 5\ndelay: 250\n").unwrap();
        assert_eq!(policy, RetryPolicy::new(5, Duration::from_millis(250)));
    }
}
