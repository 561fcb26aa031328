// Copyright (c) 2025 - Cowboy AI, Inc.
//! Process configuration
//!
//! Read once at startup from the environment and immutable afterwards.
//!
//! | Variable | Default | Effect |
//! |---|---|---|
//! | `NATS_URI` | `nats://localhost:4222` | broker address(es), comma separated |
//! | `NATS_CLIENT_NAME` | `resource-connector` | connection name |
//! | `NATS_CONNECT_ATTEMPTS` | `5` | initial connection attempts |
//! | `CONNECTORS` | empty | subjects to subscribe to |
//! | `ERNEST_CRYPTO_KEY` | unset | key handed to event constructors |
//! | `CONNECTOR_CRYPTO_KEY` | unset | read when `ERNEST_CRYPTO_KEY` is unset or blank |
//! | `CONNECTOR_RESOURCES` | every kind | resource tags to register |
//! | `CONNECTOR_REPLY_REDIRECTION` | `true` | answer on the reply address when asked to |

use std::fmt;
use std::sync::Arc;

use crate::errors::{ConnectorError, ConnectorResult};
use crate::nats::NatsConfig;
use crate::resources::ResourceKind;
use crate::subjects::parse_list;

pub const ENV_NATS_URI: &str = "NATS_URI";
pub const ENV_NATS_CLIENT_NAME: &str = "NATS_CLIENT_NAME";
pub const ENV_NATS_CONNECT_ATTEMPTS: &str = "NATS_CONNECT_ATTEMPTS";
pub const ENV_CONNECTORS: &str = "CONNECTORS";
pub const ENV_CRYPTO_KEY: &str = "ERNEST_CRYPTO_KEY";
pub const ENV_CRYPTO_KEY_FALLBACK: &str = "CONNECTOR_CRYPTO_KEY";
pub const ENV_RESOURCES: &str = "CONNECTOR_RESOURCES";
pub const ENV_REPLY_REDIRECTION: &str = "CONNECTOR_REPLY_REDIRECTION";

/// Shared secret used by handlers to decrypt payloads.
///
/// `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct CryptoKey(Arc<str>);

impl CryptoKey {
    /// Wrap a key; blank keys are rejected
    pub fn new(key: impl AsRef<str>) -> Option<Self> {
        let key = key.as_ref();
        if key.trim().is_empty() {
            None
        } else {
            Some(Self(Arc::from(key)))
        }
    }

    /// The raw key material
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CryptoKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CryptoKey(<redacted>)")
    }
}

/// Connector configuration
#[derive(Debug, Clone)]
pub struct ConnectorConfig {
    /// Broker connection settings
    pub nats: NatsConfig,
    /// Subjects to subscribe to
    pub connectors: Vec<String>,
    /// Payload decryption key, if the deployment uses one
    pub crypto_key: Option<CryptoKey>,
    /// Resource kinds to register in the routing table
    pub resources: Vec<ResourceKind>,
    /// Whether `expects_response` messages are answered on their reply address
    pub reply_redirection: bool,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            nats: NatsConfig {
                name: "resource-connector".to_string(),
                ..NatsConfig::default()
            },
            connectors: Vec::new(),
            crypto_key: None,
            resources: ResourceKind::ALL.to_vec(),
            reply_redirection: true,
        }
    }
}

impl ConnectorConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> ConnectorResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> ConnectorResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(uri) = lookup(ENV_NATS_URI) {
            let servers = parse_list(&uri);
            if !servers.is_empty() {
                config.nats.servers = servers;
            }
        }

        if let Some(name) = lookup(ENV_NATS_CLIENT_NAME).filter(|n| !n.trim().is_empty()) {
            config.nats.name = name.trim().to_string();
        }

        if let Some(raw) = lookup(ENV_NATS_CONNECT_ATTEMPTS) {
            config.nats.connect_attempts = raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|attempts| *attempts > 0)
                .ok_or_else(|| {
                    ConnectorError::Configuration(format!(
                        "{} must be a positive integer, got '{}'",
                        ENV_NATS_CONNECT_ATTEMPTS, raw
                    ))
                })?;
        }

        config.connectors = lookup(ENV_CONNECTORS)
            .map(|raw| parse_list(&raw))
            .unwrap_or_default();

        config.crypto_key = lookup(ENV_CRYPTO_KEY)
            .and_then(CryptoKey::new)
            .or_else(|| lookup(ENV_CRYPTO_KEY_FALLBACK).and_then(CryptoKey::new));

        if let Some(raw) = lookup(ENV_RESOURCES) {
            let resources = parse_resources(&raw)?;
            if !resources.is_empty() {
                config.resources = resources;
            }
        }

        if let Some(raw) = lookup(ENV_REPLY_REDIRECTION) {
            config.reply_redirection = parse_flag(&raw).ok_or_else(|| {
                ConnectorError::Configuration(format!(
                    "{} must be a boolean, got '{}'",
                    ENV_REPLY_REDIRECTION, raw
                ))
            })?;
        }

        Ok(config)
    }

    /// Fail unless at least one subject is configured
    pub fn require_connectors(&self) -> ConnectorResult<()> {
        if self.connectors.is_empty() {
            return Err(ConnectorError::Configuration(format!(
                "no connectors configured, please specify connectors on env var {}",
                ENV_CONNECTORS
            )));
        }
        Ok(())
    }
}

fn parse_resources(raw: &str) -> ConnectorResult<Vec<ResourceKind>> {
    let mut kinds = Vec::new();
    for tag in parse_list(raw) {
        let kind = ResourceKind::from_tag(&tag).ok_or_else(|| {
            ConnectorError::Configuration(format!("unknown resource '{}' in {}", tag, ENV_RESOURCES))
        })?;
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    Ok(kinds)
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
