// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Outbound mail transports.
//!
//! The pipeline only needs a yes/no answer from a send, so [`Mailer`] is a
//! single async method. Transports:
//!
//! - [`LogMailer`]: writes a summary to the log (development)
//! - [`SendmailMailer`]: pipes an RFC 5322 message to `sendmail -t -i`
//! - [`MemoryMailer`]: keeps messages in memory, optionally failing
//!   selected recipients

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::process::Stdio;
use std::sync::Mutex;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

/// Mail transport errors.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("Failed to run mail transport: {0}")]
    Io(#[from] std::io::Error),

    #[error("Mail transport exited with {0}")]
    TransportStatus(std::process::ExitStatus),

    #[error("Mail transport rejected the message: {0}")]
    Rejected(String),
}

/// A single mail header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailHeader {
    pub name: String,
    pub value: String,
}

impl MailHeader {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A plain-text message ready to hand to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub headers: Vec<MailHeader>,
}

impl OutboundEmail {
    /// Render the message in RFC 5322 form.
    ///
    /// Header values are stripped of line breaks so submitted data cannot
    /// inject extra headers. Non-ASCII subjects are RFC 2047 encoded.
    pub fn to_rfc5322(&self, from: Option<&str>) -> String {
        let mut out = String::new();

        if let Some(from) = from {
            push_header(&mut out, "From", from);
        }
        push_header(&mut out, "To", &self.to);
        push_header(&mut out, "Subject", &encode_header_value(&self.subject));
        push_header(&mut out, "Date", &chrono::Utc::now().to_rfc2822());
        push_header(&mut out, "MIME-Version", "1.0");

        for header in &self.headers {
            push_header(&mut out, &header.name, &header.value);
        }
        if !self.has_header("Content-Type") {
            push_header(&mut out, "Content-Type", "text/plain; charset=UTF-8");
        }

        out.push_str("\r\n");
        out.push_str(&self.body.replace("\r\n", "\n").replace('\n', "\r\n"));
        out.push_str("\r\n");
        out
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h.name.eq_ignore_ascii_case(name))
    }
}

fn push_header(out: &mut String, name: &str, value: &str) {
    let clean_name: String = name.chars().filter(|c| c.is_ascii_graphic() && *c != ':').collect();
    let clean_value: String = value.chars().filter(|c| *c != '\r' && *c != '\n').collect();
    out.push_str(&clean_name);
    out.push_str(": ");
    out.push_str(clean_value.trim());
    out.push_str("\r\n");
}

fn encode_header_value(value: &str) -> String {
    if value.is_ascii() {
        value.to_string()
    } else {
        format!("=?UTF-8?B?{}?=", STANDARD.encode(value.as_bytes()))
    }
}

/// Delivers outbound mail.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailError>;
}

/// Transport that only logs. Every send succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailError> {
        info!(
            subject = %email.subject,
            body_len = email.body.len(),
            headers = email.headers.len(),
            "Mail accepted by log transport"
        );
        Ok(())
    }
}

/// Transport that pipes messages to a sendmail-compatible binary.
#[derive(Debug, Clone)]
pub struct SendmailMailer {
    program: String,
    from: Option<String>,
}

impl SendmailMailer {
    pub fn new(program: impl Into<String>, from: Option<String>) -> Self {
        Self {
            program: program.into(),
            from,
        }
    }
}

#[async_trait]
impl Mailer for SendmailMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailError> {
        let message = email.to_rfc5322(self.from.as_deref());

        let mut child = Command::new(&self.program)
            .arg("-t")
            .arg("-i")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(message.as_bytes()).await?;
            stdin.shutdown().await?;
        }

        let status = child.wait().await?;
        if !status.success() {
            return Err(MailError::TransportStatus(status));
        }

        debug!(program = %self.program, bytes = message.len(), "Handed message to sendmail");
        Ok(())
    }
}

/// Transport that stores messages in memory.
#[derive(Debug, Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<OutboundEmail>>,
    failing: Mutex<Vec<String>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every send to `recipient` fail from now on.
    pub fn fail_for(&self, recipient: impl Into<String>) {
        self.failing
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(recipient.into());
    }

    /// Messages accepted so far, oldest first.
    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailError> {
        let failing = self
            .failing
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .any(|r| r.eq_ignore_ascii_case(&email.to));
        if failing {
            return Err(MailError::Rejected(format!("recipient {} refused", email.to)));
        }

        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(email.clone());
        Ok(())
    }
}
