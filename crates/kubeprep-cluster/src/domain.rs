//! Wildcard DNS domains

use crate::traits::DomainResolver;
use async_trait::async_trait;
use kubeprep_core::{Error, Result};
use std::net::IpAddr;
use tracing::debug;

/// Wildcard DNS service resolving `<ip>.nip.io` to `<ip>`
pub const NIP_IO: &str = "nip.io";

/// Derives `<ip>.nip.io`, resolving hostnames to an IPv4 address first
#[derive(Debug, Clone, Copy, Default)]
pub struct NipIoResolver;

impl NipIoResolver {
    pub fn new() -> Self {
        Self
    }
}

/// The nip.io domain for an IP address
pub fn nip_io_domain(ip: &IpAddr) -> String {
    format!("{ip}.{NIP_IO}")
}

#[async_trait]
impl DomainResolver for NipIoResolver {
    async fn domain_for(&self, address: &str) -> Result<String> {
        let address = address.trim();
        if address.is_empty() {
            return Err(Error::invalid_config("cannot derive a domain from an empty address"));
        }

        if let Ok(ip) = address.parse::<IpAddr>() {
            return Ok(nip_io_domain(&ip));
        }

        debug!("Resolving hostname {}", address);
        let ip = tokio::net::lookup_host((address, 80))
            .await?
            .map(|addr| addr.ip())
            .find(IpAddr::is_ipv4)
            .ok_or_else(|| Error::not_found("IPv4 address for host", address))?;
        Ok(nip_io_domain(&ip))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ip_address_domain() {
        let domain = NipIoResolver.domain_for("35.1.2.3").await.unwrap();
        assert_eq!(domain, "35.1.2.3.nip.io");
    }

    #[tokio::test]
    async fn test_empty_address_is_error() {
        assert!(NipIoResolver.domain_for("  ").await.is_err());
    }
}
