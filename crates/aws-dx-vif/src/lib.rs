// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

//! Direct Connect virtual interface statistics for mackerel-agent.
//!
//! Each run resolves AWS credentials, asks CloudWatch for the four
//! `AWS/DX` virtual interface metrics over a trailing three minute window
//! and prints the result in the mackerel-agent plugin protocol.

pub mod cloudwatch;
pub mod config;
pub mod credentials;
pub mod error;
pub mod graph;
pub mod metrics;
pub mod plugin;
pub mod report;
