use super::{escape, layout};
use crate::nextclerk::gate::RETURN_PARAM;
use url::form_urlencoded;

/// Shown on signed-in views reached without a session.
#[must_use]
pub fn signed_out(path: &str) -> String {
    let body = format!(
        r#"      <section class="notice">
        <h1>You are signed out</h1>
        <p>Sign in to view this page.</p>
        <a class="button" href="/sign-in?{RETURN_PARAM}={target}">Sign in</a>
      </section>"#,
        target = escape(&form_urlencoded::byte_serialize(path.as_bytes()).collect::<String>()),
    );
    layout("Signed out", false, &body)
}

#[must_use]
pub fn not_found(signed_in: bool) -> String {
    let body = r#"      <section class="notice">
        <h1>Page not found</h1>
        <p>The page you are looking for does not exist.</p>
        <a href="/">Back home</a>
      </section>"#;
    layout("Not found", signed_in, body)
}

/// The provider could not be reached for data the page needs.
#[must_use]
pub fn unavailable() -> String {
    let body = r#"      <section class="notice">
        <h1>Something went wrong</h1>
        <p>We could not load your account right now. Please try again.</p>
      </section>"#;
    layout("Unavailable", true, body)
}
