//! Client configuration.
//!
//! `ClientConfig` is fixed when a `JsonClient` is built. It derives
//! `Deserialize` so an embedding application can keep it in its own config
//! file; every field has a default.

use serde::Deserialize;

/// How the TLS layer checks the server certificate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificateVerification {
    /// The chain must be trusted, unexpired, and valid for the requested host.
    #[default]
    Full,
    /// No checks at all: wrong host names, self-signed, expired and untrusted
    /// certificates are all accepted. Only for endpoints whose certificates
    /// are known to be broken, e.g. internal hosts reached by IP.
    Disabled,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Restrict the transport to `https://` addresses.
    pub use_tls: bool,
    /// Ignored unless `use_tls` is set.
    pub certificate_verification: CertificateVerification,
}

impl ClientConfig {
    /// Plaintext, full verification.
    pub fn plain() -> Self {
        Self::default()
    }

    /// HTTPS only, full verification.
    pub fn tls() -> Self {
        Self {
            use_tls: true,
            ..Self::default()
        }
    }

    /// Turn off certificate verification entirely.
    pub fn accept_invalid_certs(mut self) -> Self {
        self.certificate_verification = CertificateVerification::Disabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_plaintext_and_verified() {
        let config = ClientConfig::default();
        assert!(!config.use_tls);
        assert_eq!(config.certificate_verification, CertificateVerification::Full);
    }

    #[test]
    fn deserializes_with_missing_fields() {
        let config: ClientConfig = serde_json::from_str(r#"{"use_tls":true}"#).unwrap();
        assert_eq!(config, ClientConfig::tls());
    }

    #[test]
    fn deserializes_disabled_verification() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"use_tls":true,"certificate_verification":"disabled"}"#).unwrap();
        assert_eq!(config, ClientConfig::tls().accept_invalid_certs());
    }

    #[test]
    fn rejects_unknown_verification_mode() {
        let result: Result<ClientConfig, _> =
            serde_json::from_str(r#"{"certificate_verification":"sometimes"}"#);
        assert!(result.is_err());
    }
}
