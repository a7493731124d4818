// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Scripted stand-ins for CloudWatch and the credential resolver

#![allow(dead_code)]

use aws_dx_vif::{
    cloudwatch::{Connector, MetricQuery, MetricSource},
    config::CredentialSettings,
    error::{ConfigurationError, MetricError},
    metrics::Datapoint,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Answer for one metric: `(seconds before the window end, average)` pairs, or an error.
pub type Scripted = Result<Vec<(u64, f64)>, MetricError>;

/// Metric source answering from a per-metric script. Unscripted metrics
/// get an empty answer. Every query is recorded.
#[derive(Clone, Default)]
pub struct MockMetricSource {
    responses: HashMap<String, Scripted>,
    pub queries: Arc<Mutex<Vec<MetricQuery>>>,
}

impl MockMetricSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, metric: &str, response: Scripted) -> Self {
        self.responses.insert(metric.to_string(), response);
        self
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl MetricSource for MockMetricSource {
    async fn get_metric_statistics(
        &self,
        query: &MetricQuery,
    ) -> Result<Vec<Datapoint>, MetricError> {
        self.queries.lock().unwrap().push(query.clone());

        match self.responses.get(&query.metric_name) {
            Some(Ok(points)) => Ok(points
                .iter()
                .map(|(secs_ago, average)| Datapoint {
                    timestamp: Some(query.window.end - Duration::from_secs(*secs_ago)),
                    average: Some(*average),
                    ..Default::default()
                })
                .collect()),
            Some(Err(e)) => Err(e.clone()),
            None => Ok(Vec::new()),
        }
    }
}

/// Connector handing out a prepared source, or failing like a refused assume-role.
pub struct MockConnector {
    source: MockMetricSource,
    failure: Option<String>,
    pub connections: Arc<Mutex<Vec<(CredentialSettings, Option<String>)>>>,
}

impl MockConnector {
    pub fn new(source: MockMetricSource) -> Self {
        Self {
            source,
            failure: None,
            connections: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(source: MockMetricSource, message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::new(source)
        }
    }
}

#[async_trait::async_trait]
impl Connector for MockConnector {
    type Source = MockMetricSource;

    async fn connect(
        &self,
        credentials: &CredentialSettings,
        region: Option<&str>,
    ) -> Result<MockMetricSource, ConfigurationError> {
        self.connections
            .lock()
            .unwrap()
            .push((credentials.clone(), region.map(str::to_string)));

        match &self.failure {
            Some(message) => Err(ConfigurationError::Credentials(message.clone())),
            None => Ok(self.source.clone()),
        }
    }
}
