// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::metrics::Statistic;
use std::time::SystemTime;

/// Errors raised while building the configuration or the CloudWatch client.
/// All of them abort the run before any metric is queried.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Missing required identifier: {0}")]
    MissingIdentifier(&'static str),

    #[error("Invalid role ARN '{0}'")]
    InvalidRoleArn(String),

    #[error("Invalid log level '{0}'. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("No AWS region configured")]
    MissingRegion,

    #[error("Failed to resolve AWS credentials: {0}")]
    Credentials(String),
}

/// Errors raised for a single metric. The report substitutes zero for the
/// affected metric and carries on with the next one.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MetricError {
    #[error("GetMetricStatistics failed: {0}")]
    Query(String),

    #[error("fetch no datapoints for {metric} : {virtual_interface}")]
    NoData {
        metric: String,
        virtual_interface: String,
    },

    #[error("cannot build a query window ending at {0:?}")]
    InvalidWindow(SystemTime),

    #[error("no timestamped datapoint to select from")]
    EmptySampleSet,

    #[error("unsupported statistic '{0}'")]
    UnsupportedStatistic(String),

    #[error("datapoint carries no {0} value")]
    MissingStatisticValue(Statistic),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_display() {
        let error = ConfigurationError::MissingIdentifier("virtual-interface-id");
        assert_eq!(
            error.to_string(),
            "Missing required identifier: virtual-interface-id"
        );

        let error = ConfigurationError::InvalidRoleArn("role".to_string());
        assert_eq!(error.to_string(), "Invalid role ARN 'role'");
    }

    #[test]
    fn test_metric_error_display() {
        let error = MetricError::NoData {
            metric: "VirtualInterfacePpsIngress".to_string(),
            virtual_interface: "dxvif-abc".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "fetch no datapoints for VirtualInterfacePpsIngress : dxvif-abc"
        );

        let error = MetricError::MissingStatisticValue(Statistic::Maximum);
        assert_eq!(error.to_string(), "datapoint carries no Maximum value");
    }
}
