// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::error::ConfigurationError;
use std::fmt;

pub const DEFAULT_METRIC_KEY_PREFIX: &str = "DxVif";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// The Direct Connect virtual interface being monitored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceId {
    pub connection_id: String,
    pub virtual_interface_id: String,
}

impl ResourceId {
    pub fn new(connection_id: impl Into<String>, virtual_interface_id: impl Into<String>) -> Self {
        Self {
            connection_id: connection_id.into(),
            virtual_interface_id: virtual_interface_id.into(),
        }
    }
}

/// Raw credential inputs. Which of them is used is decided by
/// [`crate::credentials::CredentialSource::select`].
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CredentialSettings {
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub role_arn: Option<String>,
}

impl CredentialSettings {
    pub fn new(
        access_key_id: Option<String>,
        secret_access_key: Option<String>,
        role_arn: Option<String>,
    ) -> Self {
        Self {
            access_key_id: non_empty(access_key_id),
            secret_access_key: non_empty(secret_access_key),
            role_arn: non_empty(role_arn),
        }
    }
}

// Never print the secret key.
impl fmt::Debug for CredentialSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSettings")
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "<redacted>"),
            )
            .field("role_arn", &self.role_arn)
            .finish()
    }
}

/// Process-wide configuration, built once at startup and only read afterwards.
#[derive(Debug, Clone)]
pub struct PluginConfig {
    /// Prefix of every emitted metric key
    pub metric_key_prefix: String,
    pub credentials: CredentialSettings,
    /// Overrides the region found by the default provider chain
    pub region: Option<String>,
    pub resource: ResourceId,
    /// Log level (e.g., trace, debug, info, warn, error)
    pub log_level: String,
}

impl PluginConfig {
    /// Normalizes the raw inputs (empty strings count as unset) and validates the result.
    pub fn new(
        metric_key_prefix: Option<String>,
        credentials: CredentialSettings,
        region: Option<String>,
        resource: ResourceId,
        log_level: Option<String>,
    ) -> Result<Self, ConfigurationError> {
        let config = Self {
            metric_key_prefix: non_empty(metric_key_prefix)
                .unwrap_or_else(|| DEFAULT_METRIC_KEY_PREFIX.to_string()),
            credentials: CredentialSettings::new(
                credentials.access_key_id,
                credentials.secret_access_key,
                credentials.role_arn,
            ),
            region: non_empty(region),
            resource: ResourceId {
                connection_id: resource.connection_id.trim().to_string(),
                virtual_interface_id: resource.virtual_interface_id.trim().to_string(),
            },
            log_level: non_empty(log_level)
                .map(|level| level.to_lowercase())
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.resource.connection_id.is_empty() {
            return Err(ConfigurationError::MissingIdentifier(
                "direct-connect-connection",
            ));
        }
        if self.resource.virtual_interface_id.is_empty() {
            return Err(ConfigurationError::MissingIdentifier(
                "virtual-interface-id",
            ));
        }

        if let Some(role_arn) = &self.credentials.role_arn {
            validate_role_arn(role_arn)?;
        }

        validate_log_level(&self.log_level)?;

        Ok(())
    }
}

pub fn validate_log_level(level: &str) -> Result<(), ConfigurationError> {
    if VALID_LOG_LEVELS.contains(&level) {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidLogLevel(level.to_string()))
    }
}

/// Accepts `arn:<partition>:iam::<account>:role/<path/name>`.
pub fn validate_role_arn(role_arn: &str) -> Result<(), ConfigurationError> {
    let invalid = || ConfigurationError::InvalidRoleArn(role_arn.to_string());

    let parts: Vec<&str> = role_arn.splitn(6, ':').collect();
    let [prefix, partition, service, region, account, resource] = parts.as_slice() else {
        return Err(invalid());
    };

    if *prefix != "arn" || partition.is_empty() || *service != "iam" || !region.is_empty() {
        return Err(invalid());
    }
    if account.len() != 12 || !account.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    match resource.strip_prefix("role/") {
        Some(name) if !name.is_empty() && !name.ends_with('/') => Ok(()),
        _ => Err(invalid()),
    }
}

/// Trims the value and maps blank strings to `None`.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
