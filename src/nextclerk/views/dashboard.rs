use super::{escape, format_date, layout};
use crate::identity::User;

#[must_use]
pub fn render(user: &User) -> String {
    let greeting = user
        .first_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .or(user.email.as_deref())
        .unwrap_or("there");

    let body = format!(
        r#"      <section class="dashboard">
        <h1>Welcome back, {greeting}!</h1>
        <p>Last sign-in: {last_sign_in}</p>
        <ul>
          <li><a href="/profile">Manage your profile</a></li>
          <li><a href="/profile?password=true">Change your password</a></li>
        </ul>
      </section>"#,
        greeting = escape(greeting),
        last_sign_in = format_date(user.last_sign_in_at.as_ref()),
    );

    layout("Dashboard", true, &body)
}
