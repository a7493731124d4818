// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

use std::io;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use aws_dx_vif::{
    cloudwatch::CloudWatchConnector,
    config::{self, CredentialSettings, PluginConfig, ResourceId},
    error::ConfigurationError,
    plugin::{self, OutputMode, RunError},
};

/// mackerel-agent plugin for AWS Direct Connect virtual interface metrics
#[derive(Debug, Parser)]
#[command(name = "mackerel-plugin-aws-dx-vif", version)]
struct Cli {
    /// Metric Key Prefix
    #[arg(long, default_value = config::DEFAULT_METRIC_KEY_PREFIX)]
    metric_key_prefix: String,

    /// AWS Access Key ID
    #[arg(long, env = "AWS_ACCESS_KEY_ID", hide_env_values = true)]
    access_key_id: Option<String>,

    /// AWS Secret Access Key ID
    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    secret_key_id: Option<String>,

    /// AWS Region
    #[arg(long, env = "AWS_DEFAULT_REGION")]
    region: Option<String>,

    /// IAM Role ARN for assume role
    #[arg(long)]
    role_arn: Option<String>,

    /// Resource ID of Direct Connect Virtual Interface
    #[arg(long, default_value = "")]
    virtual_interface_id: String,

    /// Resource ID of Direct Connect
    #[arg(long, default_value = "")]
    direct_connect_connection: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "DXVIF_LOG_LEVEL", default_value = config::DEFAULT_LOG_LEVEL)]
    log_level: String,
}

impl Cli {
    fn into_config(self) -> Result<PluginConfig, ConfigurationError> {
        PluginConfig::new(
            Some(self.metric_key_prefix),
            CredentialSettings::new(self.access_key_id, self.secret_key_id, self.role_arn),
            self.region,
            ResourceId::new(self.direct_connect_connection, self.virtual_interface_id),
            Some(self.log_level),
        )
    }
}

/// Invalid levels fall back to the default so the error can still be logged.
fn effective_log_level(log_level: &str) -> String {
    let level = log_level.trim().to_lowercase();
    if config::validate_log_level(&level).is_ok() {
        level
    } else {
        config::DEFAULT_LOG_LEVEL.to_string()
    }
}

fn env_filter(log_level: &str) -> EnvFilter {
    EnvFilter::new(format!(
        "aws_config=warn,aws_smithy_runtime=warn,hyper=off,rustls=off,{}",
        effective_log_level(log_level)
    ))
}

fn init_logging(log_level: &str) {
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(env_filter(log_level))
        .with_writer(io::stderr)
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true)
        .without_time()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("setting default subscriber failed: {e}");
    }
}

async fn run(config: &PluginConfig, mode: OutputMode) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match plugin::run(config, &CloudWatchConnector, &mut out, mode).await {
        Ok(()) => Ok(()),
        Err(RunError::Output(e)) => Err(e).context("writing metrics to stdout"),
        Err(e) => Err(e.into()),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let config = match cli.into_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    debug!("Loaded configuration: {config:?}");

    match run(&config, OutputMode::from_env()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    const AWS_ENV: [&str; 4] = [
        "AWS_ACCESS_KEY_ID",
        "AWS_SECRET_ACCESS_KEY",
        "AWS_DEFAULT_REGION",
        "DXVIF_LOG_LEVEL",
    ];

    fn clear_env() {
        for var in AWS_ENV {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_flags_build_config() {
        clear_env();
        let cli = Cli::try_parse_from([
            "mackerel-plugin-aws-dx-vif",
            "--metric-key-prefix",
            "dx-tokyo",
            "--access-key-id",
            "AKIDEXAMPLE",
            "--secret-key-id",
            "SECRET",
            "--region",
            "ap-northeast-1",
            "--virtual-interface-id",
            "dxvif-ffabcd12",
            "--direct-connect-connection",
            "dxcon-fg5678gh",
        ])
        .unwrap();

        let config = cli.into_config().unwrap();
        assert_eq!(config.metric_key_prefix, "dx-tokyo");
        assert_eq!(config.region.as_deref(), Some("ap-northeast-1"));
        assert_eq!(
            config.credentials.access_key_id.as_deref(),
            Some("AKIDEXAMPLE")
        );
        assert_eq!(config.credentials.role_arn, None);
        assert_eq!(
            config.resource,
            ResourceId::new("dxcon-fg5678gh", "dxvif-ffabcd12")
        );
        assert_eq!(config.log_level, "info");
    }

    #[test]
    #[serial]
    fn test_env_defaults() {
        clear_env();
        env::set_var("AWS_ACCESS_KEY_ID", "AKIDFROMENV");
        env::set_var("AWS_SECRET_ACCESS_KEY", "SECRETFROMENV");
        env::set_var("AWS_DEFAULT_REGION", "us-west-2");
        env::set_var("DXVIF_LOG_LEVEL", "debug");

        let cli = Cli::try_parse_from([
            "mackerel-plugin-aws-dx-vif",
            "--virtual-interface-id",
            "dxvif-ffabcd12",
            "--direct-connect-connection",
            "dxcon-fg5678gh",
        ])
        .unwrap();
        let config = cli.into_config().unwrap();
        clear_env();

        assert_eq!(config.metric_key_prefix, "DxVif");
        assert_eq!(
            config.credentials.access_key_id.as_deref(),
            Some("AKIDFROMENV")
        );
        assert_eq!(
            config.credentials.secret_access_key.as_deref(),
            Some("SECRETFROMENV")
        );
        assert_eq!(config.region.as_deref(), Some("us-west-2"));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    #[serial]
    fn test_missing_virtual_interface_is_rejected() {
        clear_env();
        let cli = Cli::try_parse_from([
            "mackerel-plugin-aws-dx-vif",
            "--direct-connect-connection",
            "dxcon-fg5678gh",
        ])
        .unwrap();
        assert!(matches!(
            cli.into_config(),
            Err(ConfigurationError::MissingIdentifier("virtual-interface-id"))
        ));
    }

    #[test]
    #[serial]
    fn test_empty_prefix_uses_default() {
        clear_env();
        let cli = Cli::try_parse_from([
            "mackerel-plugin-aws-dx-vif",
            "--metric-key-prefix",
            "",
            "--virtual-interface-id",
            "dxvif-ffabcd12",
            "--direct-connect-connection",
            "dxcon-fg5678gh",
        ])
        .unwrap();
        assert_eq!(cli.into_config().unwrap().metric_key_prefix, "DxVif");
    }

    #[test]
    fn test_effective_log_level() {
        assert_eq!(effective_log_level("verbose"), "info");
        assert_eq!(effective_log_level(" WARN "), "warn");
        assert_eq!(effective_log_level("trace"), "trace");
    }
}
