// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTML rendering of the contact form page.

use crate::pipeline::{SubmissionError, GENERIC_ERROR_MESSAGE, SUCCESS_MESSAGE};
use crate::submission::{InquiryType, HONEYPOT_FIELD, NONCE_FIELD};
use std::fmt::Write as _;

/// Action identifier the asynchronous endpoint answers to.
pub const AJAX_ACTION: &str = "contact_form_submit";

/// Notice shown under the form after a synchronous redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Sent,
    Error(Option<SubmissionError>),
}

impl Notice {
    /// Read the `cf_sent` / `cf_error` query flags. `cf_sent` wins.
    pub fn from_query(cf_sent: Option<&str>, cf_error: Option<&str>) -> Option<Self> {
        if cf_sent == Some("1") {
            return Some(Self::Sent);
        }
        cf_error.map(|code| Self::Error(SubmissionError::from_code(code)))
    }

    fn message(&self) -> &'static str {
        match self {
            Self::Sent => SUCCESS_MESSAGE,
            Self::Error(Some(err)) => err.user_message(),
            Self::Error(None) => GENERIC_ERROR_MESSAGE,
        }
    }

    fn class(&self) -> &'static str {
        match self {
            Self::Sent => "contact-form-success",
            Self::Error(_) => "contact-form-error",
        }
    }
}

/// Everything the form template needs.
#[derive(Debug, Clone)]
pub struct FormView<'a> {
    pub site_name: &'a str,
    pub form_path: &'a str,
    pub ajax_path: &'a str,
    pub token: &'a str,
    pub notice: Option<Notice>,
}

/// Render a complete HTML page containing the form.
pub fn render_page(view: &FormView<'_>) -> String {
    let mut page = String::new();
    page.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(page, "<title>{}</title>", escape_html(view.site_name));
    page.push_str("</head>\n<body>\n");
    page.push_str(&render_form(view));
    page.push_str("</body>\n</html>\n");
    page
}

/// Render the form element and any notice.
pub fn render_form(view: &FormView<'_>) -> String {
    let mut html = String::new();

    let _ = writeln!(
        html,
        "<form class=\"contact-form\" method=\"post\" action=\"{}\" data-ajax-url=\"{}\" data-ajax-action=\"{}\">",
        escape_html(view.form_path),
        escape_html(view.ajax_path),
        AJAX_ACTION
    );
    let _ = writeln!(
        html,
        "<input type=\"hidden\" name=\"{NONCE_FIELD}\" value=\"{}\">",
        escape_html(view.token)
    );
    let _ = writeln!(
        html,
        "<input type=\"text\" name=\"{HONEYPOT_FIELD}\" style=\"display:none\" tabindex=\"-1\" autocomplete=\"off\">"
    );

    text_input(&mut html, "first_name", "First Name", "text", true);
    text_input(&mut html, "last_name", "Last Name", "text", true);
    text_input(&mut html, "email", "Email Address", "email", true);

    html.push_str("<div class=\"contact-form-field\">\n");
    html.push_str("<label for=\"contact_form_inquiry_type\">Inquiry Type</label>\n");
    html.push_str("<select id=\"contact_form_inquiry_type\" name=\"inquiry_type\">\n");
    for kind in InquiryType::ALL {
        let selected = if kind == InquiryType::default() { " selected" } else { "" };
        let _ = writeln!(
            html,
            "<option value=\"{0}\"{selected}>{0}</option>",
            escape_html(kind.as_str())
        );
    }
    html.push_str("</select>\n</div>\n");

    html.push_str("<div class=\"contact-form-field\">\n");
    html.push_str("<label for=\"contact_form_message\">Message</label>\n");
    html.push_str("<textarea id=\"contact_form_message\" name=\"message\" rows=\"5\"></textarea>\n");
    html.push_str("</div>\n");

    html.push_str("<div class=\"contact-form-field contact-form-checkbox\">\n");
    html.push_str("<label><input type=\"checkbox\" name=\"send_copy\" value=\"1\"> Send a message to myself</label>\n");
    html.push_str("</div>\n");

    html.push_str("<button type=\"submit\" name=\"nc_form_submit\" class=\"contact-form-submit\">Send Message</button>\n");
    html.push_str("</form>\n");

    if let Some(notice) = view.notice {
        let _ = writeln!(
            html,
            "<div class=\"contact-form-message {}\">{}</div>",
            notice.class(),
            escape_html(notice.message())
        );
    }

    html
}

fn text_input(html: &mut String, name: &str, label: &str, kind: &str, required: bool) {
    let marker = if required { " <span class=\"required\">*</span>" } else { "" };
    let attr = if required { " required" } else { "" };
    html.push_str("<div class=\"contact-form-field\">\n");
    let _ = writeln!(html, "<label for=\"contact_form_{name}\">{label}{marker}</label>");
    let _ = writeln!(
        html,
        "<input type=\"{kind}\" id=\"contact_form_{name}\" name=\"{name}\" value=\"\"{attr}>"
    );
    html.push_str("</div>\n");
}

/// Escape text for use in HTML content and quoted attributes.
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}
