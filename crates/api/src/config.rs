//! Process configuration read from the environment.

use std::net::SocketAddr;

use anyhow::Context;

pub const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    /// Expected `iss` claim; unchecked when `None`.
    pub jwt_issuer: Option<String>,
    pub seed_demo_data: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_issuer: None,
            seed_demo_data: true,
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (the environment in production, a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let bind_addr = match lookup("FLEETGATE_BIND_ADDR") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("FLEETGATE_BIND_ADDR is not a socket address: {raw}"))?,
            None => defaults.bind_addr,
        };

        let jwt_secret = lookup("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            defaults.jwt_secret
        });

        let jwt_issuer = lookup("JWT_ISSUER").filter(|s| !s.trim().is_empty());

        let seed_demo_data = match lookup("FLEETGATE_SEED_DEMO_DATA") {
            Some(raw) => parse_flag(&raw).with_context(|| format!("FLEETGATE_SEED_DEMO_DATA must be a boolean: {raw}"))?,
            None => defaults.seed_demo_data,
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            jwt_issuer,
            seed_demo_data,
        })
    }
}

fn parse_flag(raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("unrecognized flag value {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from(pairs: &[(&str, &str)]) -> anyhow::Result<ApiConfig> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        ApiConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = from(&[]).unwrap();
        assert_eq!(cfg.bind_addr.port(), 8080);
        assert_eq!(cfg.jwt_secret, DEV_JWT_SECRET);
        assert!(cfg.jwt_issuer.is_none());
        assert!(cfg.seed_demo_data);
    }

    #[test]
    fn values_are_read() {
        let cfg = from(&[
            ("FLEETGATE_BIND_ADDR", "127.0.0.1:9000"),
            ("JWT_SECRET", "s3cret"),
            ("JWT_ISSUER", "fleetgate"),
            ("FLEETGATE_SEED_DEMO_DATA", "off"),
        ])
        .unwrap();
        assert_eq!(cfg.bind_addr.to_string(), "127.0.0.1:9000");
        assert_eq!(cfg.jwt_secret, "s3cret");
        assert_eq!(cfg.jwt_issuer.as_deref(), Some("fleetgate"));
        assert!(!cfg.seed_demo_data);
    }

    #[test]
    fn bad_values_are_errors() {
        assert!(from(&[("FLEETGATE_BIND_ADDR", "nowhere")]).is_err());
        assert!(from(&[("FLEETGATE_SEED_DEMO_DATA", "maybe")]).is_err());
    }
}
