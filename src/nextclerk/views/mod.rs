//! Server-rendered HTML.
//!
//! Views are plain strings. Every value coming from a request or from the
//! identity provider goes through [`escape`] before it is interpolated.

pub mod dashboard;
pub mod landing;
pub mod notice;
pub mod profile;

use chrono::{DateTime, Utc};

pub const NOT_AVAILABLE: &str = "N/A";

#[must_use]
pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// `YYYY-MM-DD`, or `N/A` when the provider has no date.
#[must_use]
pub fn format_date(date: Option<&DateTime<Utc>>) -> String {
    date.map_or_else(
        || NOT_AVAILABLE.to_string(),
        |date| date.format("%Y-%m-%d").to_string(),
    )
}

/// Wrap `body` in the shared page chrome.
#[must_use]
pub fn layout(title: &str, signed_in: bool, body: &str) -> String {
    let nav = if signed_in {
        r#"<a href="/dashboard">Dashboard</a>
      <a href="/profile">Profile</a>
      <form method="post" action="/sign-out"><button type="submit">Sign out</button></form>"#
    } else {
        r#"<a href="/sign-in">Sign in</a>
      <a href="/sign-up">Sign up</a>"#
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title} | NextClerk</title>
  </head>
  <body>
    <header>
      <a href="/">NextClerk</a>
      <nav>
      {nav}
      </nav>
    </header>
    <main>
{body}
    </main>
  </body>
</html>
"#,
        title = escape(title),
    )
}
