// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Submission pipeline shared by both front doors.
//!
//! ```text
//! Received -> SecurityChecked -> HoneypotAbsorbed
//!                             -> FieldsValidated -> RateChecked -> Dispatched -> Accepted
//! any step -> Rejected(reason)
//! ```
//!
//! Every path ends in an [`Outcome`]; nothing escapes as a panic or an
//! untyped error.

use crate::config::{Config, RateLimitConfig};
use crate::hooks::Hooks;
use crate::limiter::{ClientKey, RateLimitResult, SubmissionLimiter};
use crate::mailer::Mailer;
use crate::nonce::{NonceManager, FORM_ACTION};
use crate::notification::Notification;
use crate::store::TransientStore;
use crate::submission::{FormFields, Submission};
use crate::validator::{SubmissionValidator, ValidationError, ValidationResult};
use serde::Serialize;
use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Success message, also shown to bots.
pub const SUCCESS_MESSAGE: &str = "Thank you! Your message has been sent successfully.";

/// Fallback message for unknown error codes.
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred. Please try again.";

/// Which front door a submission came through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Page-reload POST answered with a redirect
    Sync,
    /// No-reload POST answered with JSON
    Async,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sync => "sync",
            Self::Async => "async",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reasons a submission is rejected.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmissionError {
    #[error("Security token missing or invalid")]
    Security,

    #[error("Required fields missing")]
    MissingFields,

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Submission limit reached")]
    RateLimit,

    #[error("Notification could not be sent")]
    SendFailed,
}

impl SubmissionError {
    pub const ALL: [SubmissionError; 5] = [
        Self::Security,
        Self::MissingFields,
        Self::InvalidEmail,
        Self::RateLimit,
        Self::SendFailed,
    ];

    /// Reason code used in `cf_error=` redirects and metrics labels.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Security => "security",
            Self::MissingFields => "missing_fields",
            Self::InvalidEmail => "invalid_email",
            Self::RateLimit => "rate_limit",
            Self::SendFailed => "send_failed",
        }
    }

    /// Reverse of [`SubmissionError::code`].
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.code() == code)
    }

    /// Message shown to the person filling in the form.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Security => {
                "Security verification failed. Please refresh the page and try again."
            }
            Self::MissingFields => "Please fill in all required fields.",
            Self::InvalidEmail => "Please provide a valid email address.",
            Self::RateLimit => "Too many submissions. Please try again later.",
            Self::SendFailed => "Failed to send your message. Please try again later.",
        }
    }

    /// Only a transport fault is outside the submitter's control.
    pub fn is_user_recoverable(&self) -> bool {
        !matches!(self, Self::SendFailed)
    }
}

impl From<ValidationError> for SubmissionError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::MissingField(_) => Self::MissingFields,
            ValidationError::InvalidEmail => Self::InvalidEmail,
        }
    }
}

/// Terminal state of one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Mail sent and counted
    Accepted,
    /// Honeypot filled: reported as success, nothing sent
    Absorbed,
    Rejected(SubmissionError),
}

impl Outcome {
    /// Whether the caller is told the submission succeeded.
    pub fn reports_success(&self) -> bool {
        matches!(self, Outcome::Accepted | Outcome::Absorbed)
    }

    /// Label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Absorbed => "absorbed",
            Self::Rejected(e) => e.code(),
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Accepted | Self::Absorbed => SUCCESS_MESSAGE,
            Self::Rejected(e) => e.user_message(),
        }
    }
}

/// What the security step concluded about a request that passed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityVerdict {
    Human,
    /// Honeypot was filled in
    Bot,
}

/// Runs submissions through security, validation, rate limiting and
/// dispatch.
pub struct SubmissionHandler {
    admin_email: String,
    nonces: NonceManager,
    validator: SubmissionValidator,
    limiter: SubmissionLimiter,
    mailer: Arc<dyn Mailer>,
    hooks: Hooks,
}

impl SubmissionHandler {
    pub fn new(
        config: &Config,
        nonces: NonceManager,
        store: Arc<dyn TransientStore>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            admin_email: config.site.admin_email.clone(),
            nonces,
            validator: SubmissionValidator::new(),
            limiter: SubmissionLimiter::new(config.rate_limit.clone(), store),
            mailer,
            hooks: Hooks::default(),
        }
    }

    /// Replace the extension hooks.
    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn nonces(&self) -> &NonceManager {
        &self.nonces
    }

    pub fn rate_limit_config(&self) -> &RateLimitConfig {
        self.limiter.config()
    }

    /// Token check, then the honeypot.
    ///
    /// A filled honeypot is not an error: it yields [`SecurityVerdict::Bot`]
    /// so the caller can report success without sending anything.
    pub fn check_security(
        &self,
        token: Option<&str>,
        honeypot: &str,
    ) -> Result<SecurityVerdict, SubmissionError> {
        let verified = token
            .filter(|t| !t.is_empty())
            .and_then(|t| self.nonces.verify(t, FORM_ACTION));
        if verified.is_none() {
            return Err(SubmissionError::Security);
        }

        if !honeypot.is_empty() {
            return Ok(SecurityVerdict::Bot);
        }
        Ok(SecurityVerdict::Human)
    }

    /// Pure field validation.
    pub fn validate(&self, submission: &Submission) -> Result<(), SubmissionError> {
        match self.validator.validate(submission) {
            ValidationResult::Valid => Ok(()),
            ValidationResult::Invalid(err) => Err(err.into()),
        }
    }

    /// Reject when `key` has used up its window.
    pub async fn check_rate_limit(&self, key: &ClientKey) -> Result<(), SubmissionError> {
        match self.limiter.check(key).await {
            RateLimitResult::Allowed { remaining } => {
                debug!(key = %key, remaining, "Within submission limit");
                Ok(())
            }
            RateLimitResult::Limited { retry_after } => {
                warn!(
                    key = %key,
                    retry_after_secs = retry_after.as_secs(),
                    "Submission rate limited"
                );
                Err(SubmissionError::RateLimit)
            }
        }
    }

    /// Send the notification (and the optional copy), then count the
    /// submission against `key` and fire the observers.
    ///
    /// Only the admin message can fail the request; a failed copy is
    /// logged and ignored.
    pub async fn dispatch(
        &self,
        submission: &Submission,
        key: &ClientKey,
    ) -> Result<(), SubmissionError> {
        self.send_notification(submission).await?;
        self.limiter.record(key).await;
        self.hooks.notify_submission(submission);
        Ok(())
    }

    /// Rate-limited dispatch: the slot is taken before sending so
    /// concurrent submissions from one client cannot overshoot the limit,
    /// and handed back when the admin send fails.
    async fn dispatch_limited(
        &self,
        submission: &Submission,
        key: &ClientKey,
    ) -> Result<(), SubmissionError> {
        if let RateLimitResult::Limited { retry_after } = self.limiter.reserve(key).await {
            warn!(
                key = %key,
                retry_after_secs = retry_after.as_secs(),
                "Submission rate limited"
            );
            return Err(SubmissionError::RateLimit);
        }

        if let Err(err) = self.send_notification(submission).await {
            self.limiter.release(key).await;
            return Err(err);
        }

        self.hooks.notify_submission(submission);
        Ok(())
    }

    async fn send_notification(&self, submission: &Submission) -> Result<(), SubmissionError> {
        let notification = Notification::compose(submission, &self.admin_email, &self.hooks);

        if let Err(err) = self.mailer.send(&notification.admin).await {
            warn!(error = %err, "Admin notification failed");
            return Err(SubmissionError::SendFailed);
        }

        if let Some(copy) = &notification.copy {
            if let Err(err) = self.mailer.send(copy).await {
                warn!(error = %err, "Submitter copy failed, ignoring");
            }
        }
        Ok(())
    }

    /// Run a raw submission through the whole pipeline.
    pub async fn process(&self, fields: &FormFields, client_ip: IpAddr, channel: Channel) -> Outcome {
        match self.run(fields, client_ip, channel).await {
            Ok(outcome) => {
                info!(%channel, outcome = outcome.label(), "Submission processed");
                outcome
            }
            Err(err) => {
                info!(%channel, reason = err.code(), "Submission rejected");
                Outcome::Rejected(err)
            }
        }
    }

    async fn run(
        &self,
        fields: &FormFields,
        client_ip: IpAddr,
        channel: Channel,
    ) -> Result<Outcome, SubmissionError> {
        let honeypot = fields.website.as_deref().unwrap_or_default();
        if self.check_security(fields.nc_form_nonce.as_deref(), honeypot)? == SecurityVerdict::Bot {
            warn!(%channel, "Honeypot filled, absorbing submission");
            return Ok(Outcome::Absorbed);
        }

        let submission = Submission::from_fields(fields);
        self.validate(&submission)?;

        let key = ClientKey::from_ip(client_ip);
        if self.enforces_rate_limit(channel) {
            self.dispatch_limited(&submission, &key).await?;
        } else {
            self.dispatch(&submission, &key).await?;
        }
        Ok(Outcome::Accepted)
    }

    fn enforces_rate_limit(&self, channel: Channel) -> bool {
        let config = self.limiter.config();
        match channel {
            Channel::Sync => config.enforce_sync,
            Channel::Async => config.enforce_async,
        }
    }
}
