//! Bounded polling waits
//!
//! Every wait polls at a fixed interval until the check succeeds or the
//! wall-clock bound expires. Expiry is always an error carrying the bound.
//! Errors from an individual poll are treated as "not yet": a deployment
//! that does not exist yet or a flaky API call must not end the wait early.

use crate::traits::KubeClient;
use kubeprep_core::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

/// Interval between polls
pub const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Bound for an ingress deployment to become ready
pub const DEPLOYMENT_READY_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Bound for a load balancer to be assigned an address
pub const EXTERNAL_IP_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Bound for a platform-injected ingress controller to appear and be ready
pub const INJECTED_INGRESS_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Poll `check` until it yields a value or `timeout` elapses
pub async fn poll_until<T, F, Fut>(
    what: &str,
    timeout: Duration,
    interval: Duration,
    mut check: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let start = Instant::now();

    loop {
        match check().await {
            Ok(Some(value)) => return Ok(value),
            Ok(None) => {}
            Err(e) => debug!("Waiting for {}: {}", what, e),
        }

        let elapsed = start.elapsed();
        if elapsed >= timeout {
            return Err(Error::timeout(what, timeout));
        }
        tokio::time::sleep(interval.min(timeout - elapsed)).await;
    }
}

/// Wait until a deployment has at least one ready pod
pub async fn wait_for_deployment_ready(
    kube: &dyn KubeClient,
    namespace: &str,
    name: &str,
    timeout: Duration,
) -> Result<()> {
    info!("Waiting for deployment {}/{} to be ready", namespace, name);
    let what = format!("deployment {namespace}/{name} to be ready");
    poll_until(&what, timeout, POLL_INTERVAL, move || async move {
        let ready = kube.deployment_ready_pods(namespace, name).await?;
        Ok((ready > 0).then_some(()))
    })
    .await
}

/// Wait until a service has a load-balancer IP or hostname
pub async fn wait_for_external_address(
    kube: &dyn KubeClient,
    namespace: &str,
    service: &str,
    timeout: Duration,
) -> Result<String> {
    info!(
        "Waiting for external loadbalancer to be created and update the nginx-ingress-controller service in {} namespace",
        namespace
    );
    let what = format!("an external address on service {namespace}/{service}");
    poll_until(&what, timeout, POLL_INTERVAL, move || async move {
        kube.service_external_address(namespace, service).await
    })
    .await
}
