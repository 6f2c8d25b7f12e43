// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Outcome collection for attack simulation.

use contact_form::pipeline::{Outcome as PipelineOutcome, SubmissionError};
use std::collections::HashMap;
use std::fmt;
use std::net::IpAddr;
use std::time::{Duration, Instant};

/// Outcome buckets for a simulated request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Accepted,
    Absorbed,
    SecurityFailed,
    MissingFields,
    InvalidEmail,
    RateLimited,
    SendFailed,
}

impl From<&PipelineOutcome> for Outcome {
    fn from(outcome: &PipelineOutcome) -> Self {
        match outcome {
            PipelineOutcome::Accepted => Self::Accepted,
            PipelineOutcome::Absorbed => Self::Absorbed,
            PipelineOutcome::Rejected(SubmissionError::Security) => Self::SecurityFailed,
            PipelineOutcome::Rejected(SubmissionError::MissingFields) => Self::MissingFields,
            PipelineOutcome::Rejected(SubmissionError::InvalidEmail) => Self::InvalidEmail,
            PipelineOutcome::Rejected(SubmissionError::RateLimit) => Self::RateLimited,
            PipelineOutcome::Rejected(SubmissionError::SendFailed) => Self::SendFailed,
        }
    }
}

/// Collects outcomes during a simulation.
#[derive(Debug, Default)]
pub struct AttackMetrics {
    start_time: Option<Instant>,
    end_time: Option<Instant>,
    outcomes: HashMap<Outcome, usize>,
    accepted_per_ip: HashMap<IpAddr, usize>,
    requests_per_ip: HashMap<IpAddr, usize>,
    /// Mail actually handed to the transport
    pub mails_sent: usize,
}

impl AttackMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
    }

    pub fn finish(&mut self) {
        self.end_time = Some(Instant::now());
    }

    /// Record one request outcome.
    pub fn record(&mut self, outcome: Outcome, ip: IpAddr) {
        *self.outcomes.entry(outcome).or_insert(0) += 1;
        *self.requests_per_ip.entry(ip).or_insert(0) += 1;
        if outcome == Outcome::Accepted {
            *self.accepted_per_ip.entry(ip).or_insert(0) += 1;
        }
    }

    pub fn total_requests(&self) -> usize {
        self.outcomes.values().sum()
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    /// Requests the caller was told succeeded, real or absorbed.
    pub fn reported_success(&self) -> usize {
        self.count(Outcome::Accepted) + self.count(Outcome::Absorbed)
    }

    /// Highest number of accepted submissions from any one client.
    pub fn max_accepted_per_ip(&self) -> usize {
        self.accepted_per_ip.values().copied().max().unwrap_or(0)
    }

    pub fn unique_ips(&self) -> usize {
        self.requests_per_ip.len()
    }

    pub fn duration(&self) -> Duration {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => end.duration_since(start),
            (Some(start), None) => start.elapsed(),
            _ => Duration::ZERO,
        }
    }

    /// Ratio of requests that produced no mail.
    pub fn block_rate(&self) -> f64 {
        let total = self.total_requests();
        if total == 0 {
            return 0.0;
        }
        (total - self.count(Outcome::Accepted)) as f64 / total as f64
    }

    pub fn report(&self) -> MetricsReport {
        MetricsReport {
            total_requests: self.total_requests(),
            accepted: self.count(Outcome::Accepted),
            absorbed: self.count(Outcome::Absorbed),
            security_failed: self.count(Outcome::SecurityFailed),
            validation_failed: self.count(Outcome::MissingFields)
                + self.count(Outcome::InvalidEmail),
            rate_limited: self.count(Outcome::RateLimited),
            send_failed: self.count(Outcome::SendFailed),
            mails_sent: self.mails_sent,
            block_rate: self.block_rate(),
            unique_ips: self.unique_ips(),
            duration_ms: self.duration().as_millis() as u64,
        }
    }
}

/// Summary of one simulation.
#[derive(Debug, Clone)]
pub struct MetricsReport {
    pub total_requests: usize,
    pub accepted: usize,
    pub absorbed: usize,
    pub security_failed: usize,
    pub validation_failed: usize,
    pub rate_limited: usize,
    pub send_failed: usize,
    pub mails_sent: usize,
    pub block_rate: f64,
    pub unique_ips: usize,
    pub duration_ms: u64,
}

impl fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Attack Metrics Report ===")?;
        writeln!(f, "Duration:          {} ms", self.duration_ms)?;
        writeln!(f, "Total Requests:    {}", self.total_requests)?;
        writeln!(f, "Unique IPs:        {}", self.unique_ips)?;
        writeln!(f)?;
        writeln!(f, "--- Outcomes ---")?;
        writeln!(f, "Accepted:          {}", self.accepted)?;
        writeln!(f, "Absorbed (bot):    {}", self.absorbed)?;
        writeln!(f, "Security Failed:   {}", self.security_failed)?;
        writeln!(f, "Validation Failed: {}", self.validation_failed)?;
        writeln!(f, "Rate Limited:      {}", self.rate_limited)?;
        writeln!(f, "Send Failed:       {}", self.send_failed)?;
        writeln!(f, "Mails Sent:        {}", self.mails_sent)?;
        writeln!(f, "Block Rate:        {:.1}%", self.block_rate * 100.0)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_record_and_report() {
        let a = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
        let b = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2));

        let mut metrics = AttackMetrics::new();
        metrics.start();
        metrics.record(Outcome::Accepted, a);
        metrics.record(Outcome::Accepted, a);
        metrics.record(Outcome::RateLimited, a);
        metrics.record(Outcome::Absorbed, b);
        metrics.finish();

        assert_eq!(metrics.total_requests(), 4);
        assert_eq!(metrics.reported_success(), 3);
        assert_eq!(metrics.max_accepted_per_ip(), 2);
        assert_eq!(metrics.unique_ips(), 2);
        assert!((metrics.block_rate() - 0.5).abs() < f64::EPSILON);

        let report = metrics.report().to_string();
        assert!(report.contains("Rate Limited:      1"));
    }

    #[test]
    fn test_pipeline_outcome_mapping() {
        assert_eq!(Outcome::from(&PipelineOutcome::Absorbed), Outcome::Absorbed);
        assert_eq!(
            Outcome::from(&PipelineOutcome::Rejected(SubmissionError::RateLimit)),
            Outcome::RateLimited
        );
    }
}
