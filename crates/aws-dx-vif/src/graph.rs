// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Graph metadata handed to mackerel-agent for display.

use serde::Serialize;

use crate::metrics::{BPS_EGRESS, BPS_INGRESS, PPS_EGRESS, PPS_INGRESS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Unit {
    #[serde(rename = "bits/sec")]
    BitsPerSecond,
    #[serde(rename = "integer")]
    Integer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricDefinition {
    pub name: &'static str,
    pub label: &'static str,
    pub stacked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphDefinition {
    /// Graph key, joined between the metric key prefix and the metric name
    #[serde(skip)]
    pub key: &'static str,
    pub label: String,
    pub unit: Unit,
    pub metrics: Vec<MetricDefinition>,
}

pub fn graph_definitions(metric_key_prefix: &str) -> Vec<GraphDefinition> {
    let label_prefix = label_prefix(metric_key_prefix);

    vec![
        GraphDefinition {
            key: "Bps",
            label: format!("{label_prefix} bps"),
            unit: Unit::BitsPerSecond,
            metrics: vec![
                MetricDefinition {
                    name: BPS_EGRESS,
                    label: "bps out",
                    stacked: false,
                },
                MetricDefinition {
                    name: BPS_INGRESS,
                    label: "bps in",
                    stacked: false,
                },
            ],
        },
        GraphDefinition {
            key: "Pps",
            label: format!("{label_prefix} pps"),
            unit: Unit::Integer,
            metrics: vec![
                MetricDefinition {
                    name: PPS_EGRESS,
                    label: "pps out",
                    stacked: false,
                },
                MetricDefinition {
                    name: PPS_INGRESS,
                    label: "pps in",
                    stacked: false,
                },
            ],
        },
    ]
}

/// Upper-cases the first letter of every word and turns dashes into spaces,
/// e.g. `dx-vif` becomes `Dx Vif`.
pub fn label_prefix(metric_key_prefix: &str) -> String {
    let mut label = String::with_capacity(metric_key_prefix.len());
    let mut word_start = true;

    for c in metric_key_prefix.chars() {
        if word_start {
            label.extend(c.to_uppercase());
        } else {
            label.push(c);
        }
        word_start = !(c.is_alphanumeric() || c == '_');
    }

    label.replace('-', " ")
}
