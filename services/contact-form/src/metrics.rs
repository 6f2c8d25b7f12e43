// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus metrics.

use crate::pipeline::{Channel, Outcome};
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

/// Submission counters, registered on a private registry.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    submissions: IntCounterVec,
}

impl Metrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let submissions = IntCounterVec::new(
            Opts::new(
                "contact_form_submissions_total",
                "Contact form submissions by channel and outcome",
            ),
            &["channel", "outcome"],
        )?;
        registry.register(Box::new(submissions.clone()))?;

        Ok(Self {
            registry,
            submissions,
        })
    }

    /// Count one finished submission.
    pub fn record(&self, channel: Channel, outcome: &Outcome) {
        self.submissions
            .with_label_values(&[channel.as_str(), outcome.label()])
            .inc();
    }

    /// Current count for one label pair.
    pub fn submissions(&self, channel: Channel, outcome: &Outcome) -> u64 {
        self.submissions
            .with_label_values(&[channel.as_str(), outcome.label()])
            .get()
    }

    /// Text exposition of every registered metric.
    pub fn render(&self) -> prometheus::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
