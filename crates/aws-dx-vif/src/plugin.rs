// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! mackerel-agent plugin protocol and the run entry point.

use serde::Serialize;
use std::collections::BTreeMap;
use std::env;
use std::io::{self, Write};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

use crate::cloudwatch::Connector;
use crate::config::PluginConfig;
use crate::error::ConfigurationError;
use crate::graph::{graph_definitions, GraphDefinition};
use crate::report::{build_report, Report};

/// Set to `1` by mackerel-agent when it asks for graph definitions.
pub const META_ENV: &str = "MACKEREL_AGENT_PLUGIN_META";
const META_HEADER: &str = "# mackerel-agent-plugin";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Values,
    GraphDefinition,
}

impl OutputMode {
    pub fn from_env() -> Self {
        match env::var(META_ENV) {
            Ok(val) if val == "1" => OutputMode::GraphDefinition,
            _ => OutputMode::Values,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("Failed to write plugin output: {0}")]
    Output(#[from] io::Error),
}

#[derive(Serialize)]
struct GraphDefinitionOutput<'a> {
    graphs: BTreeMap<String, &'a GraphDefinition>,
}

/// Writes the graph definition document.
pub fn emit_graph_definition<W: Write>(
    writer: &mut W,
    metric_key_prefix: &str,
    graphs: &[GraphDefinition],
) -> io::Result<()> {
    let output = GraphDefinitionOutput {
        graphs: graphs
            .iter()
            .map(|graph| (format!("{metric_key_prefix}.{}", graph.key), graph))
            .collect(),
    };

    writeln!(writer, "{META_HEADER}")?;
    serde_json::to_writer(&mut *writer, &output)?;
    writeln!(writer)
}

/// Writes one `key\tvalue\ttimestamp` line per graph metric found in `report`.
pub fn emit_values<W: Write>(
    writer: &mut W,
    metric_key_prefix: &str,
    graphs: &[GraphDefinition],
    report: &Report,
    now: SystemTime,
) -> io::Result<()> {
    let timestamp = now
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();

    for graph in graphs {
        for metric in &graph.metrics {
            let Some(value) = report.get(metric.name) else {
                continue;
            };
            let key = format!("{metric_key_prefix}.{}.{}", graph.key, metric.name);
            if !value.is_finite() {
                warn!("Skipping {key}: value {value} is not finite");
                continue;
            }
            writeln!(writer, "{key}\t{value:.6}\t{timestamp}")?;
        }
    }

    Ok(())
}

/// Runs the plugin once.
///
/// A connector failure is returned before anything is written; per-metric
/// failures only zero the affected values.
pub async fn run<C: Connector, W: Write>(
    config: &PluginConfig,
    connector: &C,
    writer: &mut W,
    mode: OutputMode,
) -> Result<(), RunError> {
    let graphs = graph_definitions(&config.metric_key_prefix);

    if mode == OutputMode::GraphDefinition {
        debug!("Emitting graph definition");
        emit_graph_definition(writer, &config.metric_key_prefix, &graphs)?;
        return Ok(());
    }

    let source = connector
        .connect(&config.credentials, config.region.as_deref())
        .await?;

    info!(
        "Fetching statistics for {} on {}",
        config.resource.virtual_interface_id, config.resource.connection_id
    );
    let report = build_report(&source, &config.resource).await;

    emit_values(
        writer,
        &config.metric_key_prefix,
        &graphs,
        &report,
        SystemTime::now(),
    )?;
    writer.flush()?;
    Ok(())
}
