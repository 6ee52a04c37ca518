//! Composition of transactional email bodies.
//!
//! Messages are built programmatically as paired text and HTML parts.
//! User-supplied values are escaped before they reach an HTML body.

use crate::domain::contact::ContactSubmission;
use crate::domain::otp::{OtpChallenge, OtpPurpose};
use crate::domain::ports::OutboundEmail;
use crate::domain::user::EmailAddress;

/// Escape the five HTML metacharacters.
fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Notification sent to the configured inbox when a contact form arrives.
pub fn contact_notification(
    submission: &ContactSubmission,
    inbox: &EmailAddress,
) -> OutboundEmail {
    let subject = format!("New enquiry from {}", submission.name);

    let phone = submission
        .phone
        .as_ref()
        .map_or_else(|| "not provided".to_owned(), ToString::to_string);
    let company = submission
        .company
        .clone()
        .unwrap_or_else(|| "not provided".to_owned());

    let text_body = format!(
        "New contact form submission\n\n\
         Name: {name}\n\
         Email: {email}\n\
         Phone: {phone}\n\
         Company: {company}\n\n\
         Message:\n{message}\n",
        name = submission.name,
        email = submission.email,
        message = submission.message,
    );

    let html_body = format!(
        "<h2>New contact form submission</h2>\
         <table>\
         <tr><th align=\"left\">Name</th><td>{name}</td></tr>\
         <tr><th align=\"left\">Email</th><td>{email}</td></tr>\
         <tr><th align=\"left\">Phone</th><td>{phone}</td></tr>\
         <tr><th align=\"left\">Company</th><td>{company}</td></tr>\
         </table>\
         <p>{message}</p>",
        name = escape_html(&submission.name),
        email = escape_html(submission.email.as_ref()),
        phone = escape_html(&phone),
        company = escape_html(&company),
        message = escape_html(&submission.message),
    );

    OutboundEmail {
        to: inbox.clone(),
        subject,
        text_body,
        html_body,
    }
}

fn purpose_summary(purpose: OtpPurpose) -> &'static str {
    match purpose {
        OtpPurpose::EmailChange => "confirm your email address change",
        OtpPurpose::PasswordChange => "confirm your password change",
        OtpPurpose::AccountDeletion => "confirm the account deletion",
    }
}

/// Verification code sent to the account holder for an OTP challenge.
pub fn otp_email(to: &EmailAddress, challenge: &OtpChallenge, ttl_minutes: i64) -> OutboundEmail {
    let summary = purpose_summary(challenge.purpose);
    let code = challenge.code.as_str();

    let subject = "Your verification code".to_owned();
    let text_body = format!(
        "Use this code to {summary}:\n\n{code}\n\n\
         The code expires in {ttl_minutes} minutes. If you did not request \
         this, you can ignore this message.\n",
    );
    let html_body = format!(
        "<p>Use this code to {summary}:</p>\
         <p style=\"font-size:1.5em;letter-spacing:0.2em\"><strong>{code}</strong></p>\
         <p>The code expires in {ttl_minutes} minutes. If you did not request \
         this, you can ignore this message.</p>",
    );

    OutboundEmail {
        to: to.clone(),
        subject,
        text_body,
        html_body,
    }
}
