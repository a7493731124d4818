// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::time::SystemTime;
use tracing::{debug, error};

use crate::cloudwatch::{self, MetricSource};
use crate::config::ResourceId;
use crate::error::MetricError;
use crate::metrics::{self, MetricDescriptor, DX_VIF_METRICS};

/// Metric name to reported value.
pub type Report = HashMap<String, f64>;

/// Queries one metric and selects its least recent datapoint.
pub async fn fetch_metric<S: MetricSource + ?Sized>(
    source: &S,
    descriptor: &MetricDescriptor,
    resource: &ResourceId,
    now: SystemTime,
) -> Result<f64, MetricError> {
    let datapoints = cloudwatch::execute(source, descriptor, resource, now).await?;
    metrics::select(&datapoints, descriptor.statistic)
}

/// Fetches every built-in metric, one after the other.
///
/// A failing metric is logged and reported as zero; the report always holds
/// all four keys.
pub async fn build_report<S: MetricSource + ?Sized>(source: &S, resource: &ResourceId) -> Report {
    let mut report = Report::with_capacity(DX_VIF_METRICS.len());

    for descriptor in DX_VIF_METRICS.iter() {
        let value = match fetch_metric(source, descriptor, resource, SystemTime::now()).await {
            Ok(value) => {
                debug!("{} {}: {value}", descriptor.name, descriptor.statistic);
                value
            }
            Err(e) => {
                error!("{} : {e}", descriptor.name);
                0.0
            }
        };
        report.insert(descriptor.name.to_string(), value);
    }

    report
}
