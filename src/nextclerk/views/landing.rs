use super::layout;

struct Feature {
    title: &'static str,
    description: &'static str,
}

const FEATURES: [Feature; 3] = [
    Feature {
        title: "Secure sign-in",
        description: "Passwords, sessions and verification are handled by a dedicated identity provider.",
    },
    Feature {
        title: "Your profile, your way",
        description: "Update your name and change your password from a single settings page.",
    },
    Feature {
        title: "Protected by default",
        description: "Every page outside the public set asks you to sign in first.",
    },
];

#[must_use]
pub fn render(signed_in: bool) -> String {
    let features: String = FEATURES
        .iter()
        .map(|feature| {
            format!(
                r#"        <article class="feature">
          <h3>{}</h3>
          <p>{}</p>
        </article>
"#,
                feature.title, feature.description
            )
        })
        .collect();

    let (cta_href, cta_label) = if signed_in {
        ("/dashboard", "Go to your dashboard")
    } else {
        ("/sign-up", "Get started")
    };

    let body = format!(
        r#"      <section class="hero">
        <h1>Account management that stays out of your way</h1>
        <p>Sign up in seconds, keep your profile current and get back to work.</p>
        <a class="button" href="{cta_href}">{cta_label}</a>
      </section>
      <section class="features">
{features}      </section>
      <section class="cta">
        <h2>Ready to begin?</h2>
        <a class="button" href="{cta_href}">{cta_label}</a>
      </section>"#
    );

    layout("Welcome", signed_in, &body)
}
