use std::env;
use std::fmt;

use url::Url;

/// An accepted asset. Both the code and the issuing account must match for a
/// payment to pass the whitelist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub code: String,
    pub issuer: String,
}

/// Immutable gateway policy, loaded once per process and shared read-only by
/// every in-flight dispatch.
#[derive(Clone)]
pub struct GatewayConfig {
    /// Whitelist of accepted assets.
    pub assets: Vec<Asset>,
    /// The account this gateway receives payments on.
    pub receiving_account: String,
    /// Ledger API base URL used to resolve transaction memos.
    pub horizon: String,
    /// Compliance server base URL. `None` disables compliance negotiation.
    pub compliance: Option<String>,
    /// Merchant callback notified of each accepted payment.
    pub receive_callback: String,
    /// Strkey-encoded seed used to MAC webhook payloads. `None` disables the
    /// MAC header.
    pub mac_key: Option<String>,
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("assets", &self.assets)
            .field("receiving_account", &self.receiving_account)
            .field("horizon", &self.horizon)
            .field("compliance", &self.compliance)
            .field("receive_callback", &self.receive_callback)
            .field("mac_key", &self.mac_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let assets_raw =
            env::var("BRIDGE_ASSETS").map_err(|_| ConfigError::MissingRequired("BRIDGE_ASSETS"))?;
        let assets = parse_asset_list(&assets_raw)?;

        let receiving_account = env::var("BRIDGE_RECEIVING_ACCOUNT")
            .map_err(|_| ConfigError::MissingRequired("BRIDGE_RECEIVING_ACCOUNT"))?;
        stellar_strkey::ed25519::PublicKey::from_string(&receiving_account)
            .map_err(|_| ConfigError::InvalidAccount(receiving_account.clone()))?;

        let horizon = env::var("BRIDGE_HORIZON_URL")
            .map_err(|_| ConfigError::MissingRequired("BRIDGE_HORIZON_URL"))?;
        Url::parse(&horizon).map_err(|_| ConfigError::InvalidUrl(horizon.clone()))?;

        let receive_callback = env::var("BRIDGE_RECEIVE_CALLBACK")
            .map_err(|_| ConfigError::MissingRequired("BRIDGE_RECEIVE_CALLBACK"))?;
        Url::parse(&receive_callback)
            .map_err(|_| ConfigError::InvalidUrl(receive_callback.clone()))?;

        let compliance = env::var("BRIDGE_COMPLIANCE_URL")
            .ok()
            .filter(|s| !s.is_empty());
        if let Some(ref base) = compliance {
            Url::parse(base).map_err(|_| ConfigError::InvalidUrl(base.clone()))?;
        }

        let mac_key = env::var("BRIDGE_MAC_KEY").ok().filter(|s| !s.is_empty());
        if let Some(ref seed) = mac_key {
            // Dispatches fail per-call on a broken key; flag it at startup too.
            if bridge_protocols::mac::decode_seed(seed).is_err() {
                tracing::warn!(
                    "BRIDGE_MAC_KEY does not decode as a signing seed — \
                     webhook deliveries will fail until it is corrected"
                );
            }
        } else {
            tracing::warn!("BRIDGE_MAC_KEY not set — webhook payloads will be unauthenticated");
        }

        Ok(Self {
            assets,
            receiving_account,
            horizon,
            compliance,
            receive_callback,
            mac_key,
        })
    }

    /// Pure whitelist predicate over (code, issuer).
    pub fn is_asset_allowed(&self, code: &str, issuer: &str) -> bool {
        self.assets
            .iter()
            .any(|a| a.code == code && a.issuer == issuer)
    }
}

/// Parse a comma-separated `CODE:ISSUER` list, e.g.
/// `USD:GD4I...XRR,EUR:GD4I...XRR`.
pub fn parse_asset_list(raw: &str) -> Result<Vec<Asset>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|entry| {
            let (code, issuer) = entry
                .split_once(':')
                .ok_or_else(|| ConfigError::InvalidAsset(entry.to_string()))?;
            if code.is_empty() || issuer.is_empty() {
                return Err(ConfigError::InvalidAsset(entry.to_string()));
            }
            Ok(Asset {
                code: code.to_string(),
                issuer: issuer.to_string(),
            })
        })
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingRequired(&'static str),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("invalid account id: {0}")]
    InvalidAccount(String),

    #[error("invalid asset entry: {0} (expected CODE:ISSUER)")]
    InvalidAsset(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    const ISSUER: &str = "GD4I7AFSLZGTDL34TQLWJOM2NHLIIOEKD5RHHZUW54HERBLSIRKUOXRR";

    fn config_with_assets(assets: Vec<Asset>) -> GatewayConfig {
        GatewayConfig {
            assets,
            receiving_account: "GATKP6ZQM5CSLECPMTAC5226PE367QALCPM6AFHTSULPPZMT62OOPMQB"
                .to_string(),
            horizon: "http://horizon.local".to_string(),
            compliance: None,
            receive_callback: "http://receive.callback".to_string(),
            mac_key: Some("SABLR5HOI2IUOYB27TR4TO7HWDJIGSRJTT4UUTXXZOFVVPGQKJ5ME43J".to_string()),
        }
    }

    #[test]
    fn test_parse_asset_list() {
        let assets = parse_asset_list(&format!("USD:{ISSUER}, EUR:{ISSUER}")).unwrap();
        assert_eq!(assets.len(), 2);
        assert_eq!(assets[0].code, "USD");
        assert_eq!(assets[1].code, "EUR");
        assert_eq!(assets[0].issuer, ISSUER);
    }

    #[test]
    fn test_parse_asset_list_rejects_bare_code() {
        assert!(parse_asset_list("USD").is_err());
        assert!(parse_asset_list("USD:").is_err());
        assert!(parse_asset_list(&format!(":{ISSUER}")).is_err());
    }

    #[test]
    fn test_asset_requires_code_and_issuer_match() {
        let config = config_with_assets(vec![Asset {
            code: "USD".to_string(),
            issuer: ISSUER.to_string(),
        }]);

        assert!(config.is_asset_allowed("USD", ISSUER));
        assert!(!config.is_asset_allowed("EUR", ISSUER));
        assert!(!config.is_asset_allowed(
            "USD",
            "GC4WWLMUGZJMRVJM7JUVVZBY3LJ5HL4RKIPADEGKEMLAAJEDRONUGYG7"
        ));
    }

    #[test]
    fn test_debug_redacts_mac_key() {
        let config = config_with_assets(vec![]);
        let rendered = format!("{config:?}");
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("SABLR5"));
    }

    #[test]
    fn test_from_env() {
        // All env mutation lives in this one test to keep the suite
        // parallel-safe.
        env::remove_var("BRIDGE_ASSETS");
        assert!(matches!(
            GatewayConfig::from_env(),
            Err(ConfigError::MissingRequired("BRIDGE_ASSETS"))
        ));

        env::set_var("BRIDGE_ASSETS", format!("USD:{ISSUER}"));
        env::set_var(
            "BRIDGE_RECEIVING_ACCOUNT",
            "GATKP6ZQM5CSLECPMTAC5226PE367QALCPM6AFHTSULPPZMT62OOPMQB",
        );
        env::set_var("BRIDGE_HORIZON_URL", "http://horizon.local");
        env::set_var("BRIDGE_RECEIVE_CALLBACK", "http://receive.callback");
        env::remove_var("BRIDGE_COMPLIANCE_URL");
        env::remove_var("BRIDGE_MAC_KEY");

        let config = GatewayConfig::from_env().unwrap();
        assert_eq!(config.assets.len(), 1);
        assert!(config.compliance.is_none());
        assert!(config.mac_key.is_none());

        env::set_var("BRIDGE_RECEIVE_CALLBACK", "not a url");
        assert!(matches!(
            GatewayConfig::from_env(),
            Err(ConfigError::InvalidUrl(_))
        ));
    }
}
