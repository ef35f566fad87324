//! Postal-code address lookup.
//!
//! Resolves a CEP (Brazilian 8-digit postal code) to a street address
//! behind the [`AddressProvider`] trait. The in-repo reference is
//! [`FixedAddressProvider`], which answers every well-formed CEP with the
//! same static address after a simulated latency; a real integration
//! implements the same trait against an external resolution service.

use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Resolved street address for a CEP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub district: String,
    pub city: String,
    /// Two-letter federated-state code.
    pub state: String,
}

/// Lookup failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    /// Input is not an 8-digit CEP after stripping formatting.
    #[error("malformed CEP: {0:?}")]
    InvalidCep(String),

    /// The provider itself failed (connectivity, quota, ...).
    #[error("provider failure: {0}")]
    Provider(String),
}

/// Address resolution by postal code.
///
/// `Ok(None)` means the CEP is well-formed but unknown to the provider;
/// malformed input is an error, never a silent miss.
pub trait AddressProvider {
    fn lookup(&self, cep: &str) -> Result<Option<Address>, LookupError>;
}

/// Strip formatting and enforce the 8-digit shape.
pub fn canonical_cep(cep: &str) -> Result<String, LookupError> {
    let stripped: String = cep.chars().filter(|c| c.is_ascii_digit()).collect();
    if stripped.len() == 8 {
        Ok(stripped)
    } else {
        Err(LookupError::InvalidCep(cep.to_string()))
    }
}

/// Reference provider: one static address for every well-formed CEP,
/// returned after a fixed latency. A stand-in for the real resolution
/// service, useful for demos and UI work without network access.
#[derive(Debug, Clone)]
pub struct FixedAddressProvider {
    address: Address,
    latency: Duration,
}

impl FixedAddressProvider {
    /// Provider with the default address and latency.
    pub fn new() -> Self {
        Self {
            address: Address {
                street: "Praça da Sé".into(),
                district: "Sé".into(),
                city: "São Paulo".into(),
                state: "SP".into(),
            },
            latency: Duration::from_millis(400),
        }
    }

    /// Provider that answers immediately.
    pub fn instant() -> Self {
        Self::new().with_latency(Duration::ZERO)
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_address(mut self, address: Address) -> Self {
        self.address = address;
        self
    }
}

impl Default for FixedAddressProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl AddressProvider for FixedAddressProvider {
    fn lookup(&self, cep: &str) -> Result<Option<Address>, LookupError> {
        let cep = canonical_cep(cep)?;
        if !self.latency.is_zero() {
            thread::sleep(self.latency);
        }
        debug!(%cep, "resolved address from fixed provider");
        Ok(Some(self.address.clone()))
    }
}
