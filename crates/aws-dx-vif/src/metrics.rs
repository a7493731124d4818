// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Metric descriptors and datapoint selection.

use crate::error::MetricError;
use std::fmt;
use std::str::FromStr;
use std::time::SystemTime;

/// CloudWatch statistic used to summarize the raw samples of one period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Statistic {
    Average,
    Sum,
    Minimum,
    Maximum,
    SampleCount,
}

impl Statistic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Statistic::Average => "Average",
            Statistic::Sum => "Sum",
            Statistic::Minimum => "Minimum",
            Statistic::Maximum => "Maximum",
            Statistic::SampleCount => "SampleCount",
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Statistic {
    type Err = MetricError;

    /// Parses CloudWatch statistic names, case-insensitively. This is the only
    /// place a statistic name enters the crate as text; the built-in
    /// descriptors are typed. Extended statistics such as `p99` are rejected
    /// with [`MetricError::UnsupportedStatistic`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "average" => Ok(Statistic::Average),
            "sum" => Ok(Statistic::Sum),
            "minimum" => Ok(Statistic::Minimum),
            "maximum" => Ok(Statistic::Maximum),
            "samplecount" => Ok(Statistic::SampleCount),
            _ => Err(MetricError::UnsupportedStatistic(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricDescriptor {
    pub name: &'static str,
    pub statistic: Statistic,
}

pub const BPS_EGRESS: &str = "VirtualInterfaceBpsEgress";
pub const BPS_INGRESS: &str = "VirtualInterfaceBpsIngress";
pub const PPS_EGRESS: &str = "VirtualInterfacePpsEgress";
pub const PPS_INGRESS: &str = "VirtualInterfacePpsIngress";

// https://docs.aws.amazon.com/directconnect/latest/UserGuide/monitoring-cloudwatch.html#viewing-metrics
pub const DX_VIF_METRICS: [MetricDescriptor; 4] = [
    MetricDescriptor {
        name: BPS_EGRESS,
        statistic: Statistic::Average,
    },
    MetricDescriptor {
        name: BPS_INGRESS,
        statistic: Statistic::Average,
    },
    MetricDescriptor {
        name: PPS_EGRESS,
        statistic: Statistic::Average,
    },
    MetricDescriptor {
        name: PPS_INGRESS,
        statistic: Statistic::Average,
    },
];

/// One aggregated CloudWatch period. Only the requested statistic is usually populated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Datapoint {
    pub timestamp: Option<SystemTime>,
    pub average: Option<f64>,
    pub sum: Option<f64>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub sample_count: Option<f64>,
}

impl Datapoint {
    pub fn value(&self, statistic: Statistic) -> Option<f64> {
        match statistic {
            Statistic::Average => self.average,
            Statistic::Sum => self.sum,
            Statistic::Minimum => self.minimum,
            Statistic::Maximum => self.maximum,
            Statistic::SampleCount => self.sample_count,
        }
    }
}

/// Returns the `statistic` value of the least recent datapoint.
///
/// The most recent period may still be accumulating on the CloudWatch side,
/// so the oldest one in the window is the one most likely to be final.
/// When several datapoints share the earliest timestamp the first one in
/// response order wins. Datapoints without a timestamp are ignored.
pub fn select(datapoints: &[Datapoint], statistic: Statistic) -> Result<f64, MetricError> {
    let earliest = datapoints
        .iter()
        .filter_map(|dp| dp.timestamp.map(|ts| (ts, dp)))
        .min_by_key(|(ts, _)| *ts)
        .map(|(_, dp)| dp)
        .ok_or(MetricError::EmptySampleSet)?;

    earliest
        .value(statistic)
        .ok_or(MetricError::MissingStatisticValue(statistic))
}
