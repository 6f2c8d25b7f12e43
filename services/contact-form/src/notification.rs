// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Notification composition.

use crate::hooks::Hooks;
use crate::mailer::{MailHeader, OutboundEmail};
use crate::submission::Submission;

pub const COPY_SUBJECT: &str = "Copy of your Contact Form Submission";

/// Messages produced for one accepted submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Message to the site administrator
    pub admin: OutboundEmail,
    /// Copy for the submitter, when they asked for one
    pub copy: Option<OutboundEmail>,
}

impl Notification {
    /// Build both messages, running every filter hook.
    pub fn compose(submission: &Submission, admin_email: &str, hooks: &Hooks) -> Self {
        let subject = hooks.apply_subject(
            format!("New Contact Form Submission: {}", submission.inquiry_type),
            submission.inquiry_type,
        );
        let body = hooks.apply_body(render_body(submission), submission);
        let headers = hooks.apply_headers(
            vec![
                MailHeader::new("Reply-To", submission.email.as_str()),
                MailHeader::new("Content-Type", "text/plain; charset=UTF-8"),
            ],
            &submission.email,
        );

        let copy = submission.send_copy.then(|| OutboundEmail {
            to: submission.email.clone(),
            subject: hooks.apply_copy_subject(COPY_SUBJECT.to_string()),
            body: body.clone(),
            headers: Vec::new(),
        });

        let admin = OutboundEmail {
            to: hooks.apply_admin_email(admin_email.to_string()),
            subject,
            body,
            headers,
        };

        Self { admin, copy }
    }
}

/// Fixed-order field dump used as the message body.
pub fn render_body(submission: &Submission) -> String {
    format!(
        "First Name: {}\nLast Name: {}\nEmail: {}\nInquiry Type: {}\n\nMessage:\n{}",
        submission.first_name,
        submission.last_name,
        submission.email,
        submission.inquiry_type,
        submission.message
    )
}
