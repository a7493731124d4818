// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_cloudwatch::error::DisplayErrorContext;
use aws_sdk_cloudwatch::primitives::DateTime;
use aws_sdk_cloudwatch::types::{Datapoint as CwDatapoint, Dimension, Statistic as CwStatistic};
use aws_sdk_cloudwatch::Client;
use std::time::{Duration, SystemTime};
use tracing::debug;

use crate::config::{CredentialSettings, ResourceId};
use crate::credentials;
use crate::error::{ConfigurationError, MetricError};
use crate::metrics::{Datapoint, MetricDescriptor, Statistic};

pub const NAMESPACE: &str = "AWS/DX";
/// CloudWatch aggregation period, in seconds
pub const PERIOD_SECS: i32 = 60;
/// Three periods, so at least one of them is complete.
pub const WINDOW: Duration = Duration::from_secs(180);

// https://docs.aws.amazon.com/directconnect/latest/UserGuide/monitoring-cloudwatch.html#metrics-dimensions
pub const CONNECTION_ID_DIMENSION: &str = "ConnectionId";
pub const VIRTUAL_INTERFACE_ID_DIMENSION: &str = "VirtualInterfaceId";

/// Half-open `[start, end)` interval of a single query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: SystemTime,
    pub end: SystemTime,
}

impl TimeWindow {
    /// The [`WINDOW`] wide interval ending at `now`, or `None` when the start
    /// is not representable on this platform.
    pub fn trailing(now: SystemTime) -> Option<Self> {
        now.checked_sub(WINDOW).map(|start| Self { start, end: now })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricQuery {
    pub namespace: &'static str,
    pub metric_name: String,
    pub dimensions: Vec<(&'static str, String)>,
    pub period_secs: i32,
    pub window: TimeWindow,
    pub statistic: Statistic,
}

impl MetricQuery {
    pub fn new(
        descriptor: &MetricDescriptor,
        resource: &ResourceId,
        now: SystemTime,
    ) -> Result<Self, MetricError> {
        let window = TimeWindow::trailing(now).ok_or(MetricError::InvalidWindow(now))?;

        Ok(Self {
            namespace: NAMESPACE,
            metric_name: descriptor.name.to_string(),
            dimensions: vec![
                (CONNECTION_ID_DIMENSION, resource.connection_id.clone()),
                (
                    VIRTUAL_INTERFACE_ID_DIMENSION,
                    resource.virtual_interface_id.clone(),
                ),
            ],
            period_secs: PERIOD_SECS,
            window,
            statistic: descriptor.statistic,
        })
    }
}

/// Backend answering GetMetricStatistics-shaped queries.
#[async_trait]
pub trait MetricSource: Send + Sync {
    /// Issues exactly one request and returns the datapoints as received.
    async fn get_metric_statistics(
        &self,
        query: &MetricQuery,
    ) -> Result<Vec<Datapoint>, MetricError>;
}

/// Produces an authenticated [`MetricSource`]. Errors are fatal for the run.
#[async_trait]
pub trait Connector: Send + Sync {
    type Source: MetricSource;

    async fn connect(
        &self,
        credentials: &CredentialSettings,
        region: Option<&str>,
    ) -> Result<Self::Source, ConfigurationError>;
}

/// Queries `descriptor` for `resource` over the window ending at `now`.
/// An empty answer is reported as [`MetricError::NoData`].
pub async fn execute<S: MetricSource + ?Sized>(
    source: &S,
    descriptor: &MetricDescriptor,
    resource: &ResourceId,
    now: SystemTime,
) -> Result<Vec<Datapoint>, MetricError> {
    let query = MetricQuery::new(descriptor, resource, now)?;
    let datapoints = source.get_metric_statistics(&query).await?;

    if datapoints.is_empty() {
        return Err(MetricError::NoData {
            metric: descriptor.name.to_string(),
            virtual_interface: resource.virtual_interface_id.clone(),
        });
    }

    debug!(
        "Received {} datapoints for {}",
        datapoints.len(),
        descriptor.name
    );
    Ok(datapoints)
}

#[derive(Clone, Debug)]
pub struct CloudWatchSource {
    client: Client,
}

impl CloudWatchSource {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl MetricSource for CloudWatchSource {
    async fn get_metric_statistics(
        &self,
        query: &MetricQuery,
    ) -> Result<Vec<Datapoint>, MetricError> {
        let dimensions = query
            .dimensions
            .iter()
            .map(|(name, value)| Dimension::builder().name(*name).value(value).build())
            .collect::<Vec<Dimension>>();

        let output = self
            .client
            .get_metric_statistics()
            .namespace(query.namespace)
            .metric_name(&query.metric_name)
            .set_dimensions(Some(dimensions))
            .start_time(DateTime::from(query.window.start))
            .end_time(DateTime::from(query.window.end))
            .period(query.period_secs)
            .statistics(to_cloudwatch_statistic(query.statistic))
            .send()
            .await
            .map_err(|err| MetricError::Query(DisplayErrorContext(&err).to_string()))?;

        Ok(output.datapoints().iter().map(from_cloudwatch).collect())
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct CloudWatchConnector;

#[async_trait]
impl Connector for CloudWatchConnector {
    type Source = CloudWatchSource;

    async fn connect(
        &self,
        credentials: &CredentialSettings,
        region: Option<&str>,
    ) -> Result<CloudWatchSource, ConfigurationError> {
        let sdk_config = credentials::load_sdk_config(credentials, region).await?;
        Ok(CloudWatchSource::new(&sdk_config))
    }
}

fn to_cloudwatch_statistic(statistic: Statistic) -> CwStatistic {
    match statistic {
        Statistic::Average => CwStatistic::Average,
        Statistic::Sum => CwStatistic::Sum,
        Statistic::Minimum => CwStatistic::Minimum,
        Statistic::Maximum => CwStatistic::Maximum,
        Statistic::SampleCount => CwStatistic::SampleCount,
    }
}

fn from_cloudwatch(datapoint: &CwDatapoint) -> Datapoint {
    Datapoint {
        timestamp: datapoint
            .timestamp()
            .and_then(|ts| SystemTime::try_from(*ts).ok()),
        average: datapoint.average(),
        sum: datapoint.sum(),
        minimum: datapoint.minimum(),
        maximum: datapoint.maximum(),
        sample_count: datapoint.sample_count(),
    }
}
