// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use aws_config::{sts::AssumeRoleProvider, BehaviorVersion, ConfigLoader, Region, SdkConfig};
use aws_credential_types::provider::ProvideCredentials;
use aws_credential_types::Credentials;
use aws_sdk_cloudwatch::error::DisplayErrorContext;
use std::fmt;
use tracing::debug;

use crate::config::CredentialSettings;
use crate::error::ConfigurationError;

pub const ASSUME_ROLE_SESSION_NAME: &str = "mackerel-plugin-aws-dx-vif";
const STATIC_PROVIDER_NAME: &str = "mackerel-plugin-aws-dx-vif-static";

/// How the CloudWatch client obtains its credentials.
#[derive(Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Default chain credentials exchanged for temporary role credentials.
    AssumeRole { role_arn: String },
    Static {
        access_key_id: String,
        secret_access_key: String,
    },
    /// Environment, shared config files, instance metadata...
    DefaultChain,
}

impl CredentialSource {
    /// A role ARN wins over a static key pair; a half-filled key pair
    /// falls back to the default chain. Blank values count as unset.
    pub fn select(settings: &CredentialSettings) -> Self {
        if let Some(role_arn) = filled(&settings.role_arn) {
            return CredentialSource::AssumeRole {
                role_arn: role_arn.to_string(),
            };
        }
        match (
            filled(&settings.access_key_id),
            filled(&settings.secret_access_key),
        ) {
            (Some(access_key_id), Some(secret_access_key)) => CredentialSource::Static {
                access_key_id: access_key_id.to_string(),
                secret_access_key: secret_access_key.to_string(),
            },
            _ => CredentialSource::DefaultChain,
        }
    }
}

fn filled(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::AssumeRole { role_arn } => write!(f, "assume-role {role_arn}"),
            CredentialSource::Static { access_key_id, .. } => write!(f, "static {access_key_id}"),
            CredentialSource::DefaultChain => f.write_str("default credential chain"),
        }
    }
}

impl fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CredentialSource({self})")
    }
}

fn loader(region: Option<&str>) -> ConfigLoader {
    let loader = aws_config::defaults(BehaviorVersion::latest());
    match region {
        Some(region) => loader.region(Region::new(region.to_string())),
        None => loader,
    }
}

/// Builds the shared AWS configuration for `settings`.
///
/// The credentials are resolved once before returning, so a bad key pair or
/// a refused assume-role surfaces here rather than on the first query.
pub async fn load_sdk_config(
    settings: &CredentialSettings,
    region: Option<&str>,
) -> Result<SdkConfig, ConfigurationError> {
    let source = CredentialSource::select(settings);
    debug!("Resolving AWS credentials from {source}");

    let config_loader = match &source {
        CredentialSource::AssumeRole { role_arn } => {
            let base_config = loader(region).load().await;
            let provider = AssumeRoleProvider::builder(role_arn.as_str())
                .session_name(ASSUME_ROLE_SESSION_NAME)
                .configure(&base_config)
                .build()
                .await;
            loader(region).credentials_provider(provider)
        }
        CredentialSource::Static {
            access_key_id,
            secret_access_key,
        } => loader(region).credentials_provider(Credentials::new(
            access_key_id.as_str(),
            secret_access_key.as_str(),
            None,
            None,
            STATIC_PROVIDER_NAME,
        )),
        CredentialSource::DefaultChain => loader(region),
    };
    let sdk_config = config_loader.load().await;

    if sdk_config.region().is_none() {
        return Err(ConfigurationError::MissingRegion);
    }

    let provider = sdk_config.credentials_provider().ok_or_else(|| {
        ConfigurationError::Credentials(format!("{source}: no credentials provider"))
    })?;
    provider.provide_credentials().await.map_err(|err| {
        ConfigurationError::Credentials(format!("{source}: {}", DisplayErrorContext(&err)))
    })?;

    debug!(
        "AWS credentials resolved from {source} in region {:?}",
        sdk_config.region()
    );
    Ok(sdk_config)
}
