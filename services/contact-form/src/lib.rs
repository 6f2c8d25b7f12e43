// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact Form Service
//!
//! Renders a contact form and turns submissions into notification mail:
//!
//! - Action-scoped security tokens
//! - Honeypot bot absorption (bots are told they succeeded)
//! - Field sanitization and validation
//! - Per-client submission limit (3 per hour by default)
//! - Admin notification plus optional copy to the submitter
//! - Filter and observer hooks around the outgoing mail

pub mod client_ip;
pub mod config;
pub mod form;
pub mod handlers;
pub mod hooks;
pub mod limiter;
pub mod mailer;
pub mod metrics;
pub mod nonce;
pub mod notification;
pub mod pipeline;
pub mod store;
pub mod submission;
pub mod validator;

pub use config::Config;
pub use hooks::Hooks;
pub use limiter::{ClientKey, RateLimitResult, SubmissionLimiter};
pub use mailer::{Mailer, OutboundEmail};
pub use pipeline::{Channel, Outcome, SubmissionError, SubmissionHandler};
pub use store::{MemoryStore, TransientStore};
pub use submission::{FormFields, InquiryType, Submission};
pub use validator::{SubmissionValidator, ValidationResult};
