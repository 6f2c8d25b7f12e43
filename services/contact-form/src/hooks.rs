// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Extension hooks.
//!
//! Filters rewrite a value and run in registration order, each one seeing
//! the previous one's output. Observers run after a successful submission
//! and cannot change the outcome.

use crate::mailer::MailHeader;
use crate::submission::{InquiryType, Submission};
use std::sync::Arc;

type StringFilter = Arc<dyn Fn(String) -> String + Send + Sync>;
type SubjectFilter = Arc<dyn Fn(String, InquiryType) -> String + Send + Sync>;
type BodyFilter = Arc<dyn Fn(String, &Submission) -> String + Send + Sync>;
type HeadersFilter = Arc<dyn Fn(Vec<MailHeader>, &str) -> Vec<MailHeader> + Send + Sync>;
type SubmissionObserver = Arc<dyn Fn(&Submission) + Send + Sync>;

/// Ordered callback lists supplied by the embedding application.
#[derive(Clone, Default)]
pub struct Hooks {
    admin_email: Vec<StringFilter>,
    subject: Vec<SubjectFilter>,
    body: Vec<BodyFilter>,
    headers: Vec<HeadersFilter>,
    copy_subject: Vec<StringFilter>,
    after_submission: Vec<SubmissionObserver>,
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks")
            .field("admin_email", &self.admin_email.len())
            .field("subject", &self.subject.len())
            .field("body", &self.body.len())
            .field("headers", &self.headers.len())
            .field("copy_subject", &self.copy_subject.len())
            .field("after_submission", &self.after_submission.len())
            .finish()
    }
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rewrite the notification recipient.
    pub fn filter_admin_email<F>(mut self, f: F) -> Self
    where
        F: Fn(String) -> String + Send + Sync + 'static,
    {
        self.admin_email.push(Arc::new(f));
        self
    }

    /// Rewrite the notification subject.
    pub fn filter_subject<F>(mut self, f: F) -> Self
    where
        F: Fn(String, InquiryType) -> String + Send + Sync + 'static,
    {
        self.subject.push(Arc::new(f));
        self
    }

    /// Rewrite the body shared by the notification and the copy.
    pub fn filter_body<F>(mut self, f: F) -> Self
    where
        F: Fn(String, &Submission) -> String + Send + Sync + 'static,
    {
        self.body.push(Arc::new(f));
        self
    }

    /// Rewrite the notification headers. Also receives the submitter address.
    pub fn filter_headers<F>(mut self, f: F) -> Self
    where
        F: Fn(Vec<MailHeader>, &str) -> Vec<MailHeader> + Send + Sync + 'static,
    {
        self.headers.push(Arc::new(f));
        self
    }

    /// Rewrite the subject of the submitter's copy.
    pub fn filter_copy_subject<F>(mut self, f: F) -> Self
    where
        F: Fn(String) -> String + Send + Sync + 'static,
    {
        self.copy_subject.push(Arc::new(f));
        self
    }

    /// Observe every accepted submission.
    pub fn on_submission<F>(mut self, f: F) -> Self
    where
        F: Fn(&Submission) + Send + Sync + 'static,
    {
        self.after_submission.push(Arc::new(f));
        self
    }

    pub(crate) fn apply_admin_email(&self, value: String) -> String {
        self.admin_email.iter().fold(value, |acc, f| f(acc))
    }

    pub(crate) fn apply_subject(&self, value: String, kind: InquiryType) -> String {
        self.subject.iter().fold(value, |acc, f| f(acc, kind))
    }

    pub(crate) fn apply_body(&self, value: String, submission: &Submission) -> String {
        self.body.iter().fold(value, |acc, f| f(acc, submission))
    }

    pub(crate) fn apply_headers(&self, value: Vec<MailHeader>, email: &str) -> Vec<MailHeader> {
        self.headers.iter().fold(value, |acc, f| f(acc, email))
    }

    pub(crate) fn apply_copy_subject(&self, value: String) -> String {
        self.copy_subject.iter().fold(value, |acc, f| f(acc))
    }

    pub(crate) fn notify_submission(&self, submission: &Submission) {
        for observer in &self.after_submission {
            observer(submission);
        }
    }
}
