// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Submitted form data.
//!
//! [`FormFields`] is the untrusted wire shape, exactly as posted.
//! [`Submission`] is the sanitized value the pipeline works on. A
//! `Submission` is built fresh for every request and never stored.

use email_address::EmailAddress;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Form field carrying the security token.
pub const NONCE_FIELD: &str = "nc_form_nonce";

/// Hidden honeypot field. Humans never see it, so any value marks a bot.
pub const HONEYPOT_FIELD: &str = "website";

/// Kind of inquiry selected on the form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InquiryType {
    #[default]
    #[serde(rename = "General Inquiry")]
    GeneralInquiry,
    #[serde(rename = "Sales Question")]
    SalesQuestion,
    #[serde(rename = "Refund")]
    Refund,
}

impl InquiryType {
    /// Every option, in the order the form lists them.
    pub const ALL: [InquiryType; 3] = [Self::GeneralInquiry, Self::SalesQuestion, Self::Refund];

    /// The label used both as the option value and in mail subjects.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GeneralInquiry => "General Inquiry",
            Self::SalesQuestion => "Sales Question",
            Self::Refund => "Refund",
        }
    }

    /// Parse a submitted value, falling back to General Inquiry for
    /// anything outside the fixed set.
    pub fn parse_lossy(value: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .unwrap_or_default()
    }
}

impl fmt::Display for InquiryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw urlencoded form body shared by both submission endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormFields {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub inquiry_type: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    /// Checkbox: present (with any value) means checked
    #[serde(default)]
    pub send_copy: Option<String>,
    /// Honeypot
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub nc_form_nonce: Option<String>,
    /// Submit button name; the synchronous path only acts when present
    #[serde(default)]
    pub nc_form_submit: Option<String>,
    /// Action identifier for the asynchronous endpoint
    #[serde(default)]
    pub action: Option<String>,
}

/// A sanitized contact form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Submission {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub inquiry_type: InquiryType,
    pub message: String,
    pub send_copy: bool,
    pub honeypot_value: String,
}

impl Submission {
    /// Sanitize raw form fields into a submission.
    pub fn from_fields(fields: &FormFields) -> Self {
        let text = |v: &Option<String>| v.as_deref().map(sanitize_text_field).unwrap_or_default();

        Self {
            first_name: text(&fields.first_name),
            last_name: text(&fields.last_name),
            email: fields.email.as_deref().map(sanitize_email).unwrap_or_default(),
            inquiry_type: InquiryType::parse_lossy(&text(&fields.inquiry_type)),
            message: fields
                .message
                .as_deref()
                .map(sanitize_textarea_field)
                .unwrap_or_default(),
            send_copy: fields.send_copy.is_some(),
            honeypot_value: fields.website.clone().unwrap_or_default(),
        }
    }

    /// True when the honeypot field was filled in.
    pub fn is_bot(&self) -> bool {
        !self.honeypot_value.is_empty()
    }
}

/// Sanitize a single-line text field.
///
/// Strips markup tags and percent-encoded octets, collapses every
/// whitespace run (line breaks included) into one space, then trims.
pub fn sanitize_text_field(value: &str) -> String {
    let stripped = strip_octets(&strip_tags(value));
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Sanitize a multi-line text field. Like [`sanitize_text_field`] but line
/// breaks survive (normalised to `\n`).
pub fn sanitize_textarea_field(value: &str) -> String {
    let normalised = value.replace("\r\n", "\n").replace('\r', "\n");
    strip_octets(&strip_tags(&normalised)).trim().to_string()
}

/// Drop every character that cannot appear in an email address.
///
/// The result is not blanked when malformed, so validation can still tell
/// "missing" from "invalid".
pub fn sanitize_email(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || "!#$%&'*+/=?^_`{|}~.-@".contains(*c))
        .collect()
}

/// Syntactic address check.
///
/// On top of RFC 5322 parsing the domain must have at least two labels,
/// each made of letters, digits and inner hyphens.
pub fn is_valid_email(candidate: &str) -> bool {
    let Ok(address) = EmailAddress::from_str(candidate) else {
        return false;
    };

    let labels: Vec<&str> = address.domain().split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

/// Remove anything that looks like a markup tag.
///
/// `<script>` and `<style>` elements go together with their contents. A
/// `<` only opens a tag when followed by a letter, `/`, `!` or `?`; a lone
/// `<` (as in "a < b") is kept. An unterminated tag swallows the rest of
/// the input.
fn strip_tags(value: &str) -> String {
    let value = strip_raw_text_elements(value);
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        let opens_tag = c == '<'
            && chars
                .peek()
                .is_some_and(|next| next.is_ascii_alphabetic() || matches!(next, '/' | '!' | '?'));

        if opens_tag {
            for inner in chars.by_ref() {
                if inner == '>' {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }

    out
}

const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

/// Drop closed `<script>`/`<style>` elements, contents included. An element
/// with no closing tag is left for [`strip_tags`] to handle tag by tag.
fn strip_raw_text_elements(value: &str) -> String {
    // ASCII lowercasing keeps byte offsets, so indices found in `lower`
    // are valid char boundaries in `value`.
    let lower = value.to_ascii_lowercase();
    let mut out = String::with_capacity(value.len());
    let mut pos = 0;

    while let Some((start, name)) = next_raw_text_element(&lower, pos) {
        let closing = format!("</{name}");
        let Some(close) = lower[start..].find(closing.as_str()).map(|i| start + i) else {
            break;
        };
        let end = lower[close..].find('>').map_or(lower.len(), |i| close + i + 1);
        out.push_str(&value[pos..start]);
        pos = end;
    }

    out.push_str(&value[pos..]);
    out
}

fn next_raw_text_element(lower: &str, from: usize) -> Option<(usize, &'static str)> {
    RAW_TEXT_ELEMENTS
        .into_iter()
        .filter_map(|name| find_opening_tag(lower, from, name).map(|at| (at, name)))
        .min_by_key(|(at, _)| *at)
}

fn find_opening_tag(lower: &str, from: usize, name: &str) -> Option<usize> {
    let pattern = format!("<{name}");
    let mut search = from;
    while let Some(i) = lower[search..].find(pattern.as_str()) {
        let at = search + i;
        let boundary = lower
            .as_bytes()
            .get(at + pattern.len())
            .is_some_and(|b| *b == b'>' || *b == b'/' || b.is_ascii_whitespace());
        if boundary {
            return Some(at);
        }
        search = at + pattern.len();
    }
    None
}

/// Remove `%XX` sequences until none remain.
fn strip_octets(value: &str) -> String {
    let mut current = value.to_string();
    loop {
        let next = strip_octets_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn strip_octets_once(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && bytes[i + 1].is_ascii_hexdigit()
            && bytes[i + 2].is_ascii_hexdigit()
        {
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }

    // Only ASCII triples were removed, so the remainder is still UTF-8.
    String::from_utf8(out).unwrap_or_default()
}
