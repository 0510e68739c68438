pub mod logging;
pub mod provider;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ArgAction, ColorChoice, Command,
};

pub const ARG_PORT: &str = "port";
pub const ARG_PUBLIC_URL: &str = "public-url";
pub const ARG_STRICT_ROUTES: &str = "strict-routes";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("nextclerk")
        .about("Landing page, profile settings and session gate")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long(ARG_PORT)
                .help("Port to listen on")
                .default_value("8080")
                .env("NEXTCLERK_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_PUBLIC_URL)
                .long(ARG_PUBLIC_URL)
                .help("Public base URL of this site, used to build redirect targets")
                .default_value("http://localhost:8080")
                .env("NEXTCLERK_PUBLIC_URL"),
        )
        .arg(
            Arg::new(ARG_STRICT_ROUTES)
                .long(ARG_STRICT_ROUTES)
                .help("Require a session for /profile and /dashboard at the gate")
                .env("NEXTCLERK_STRICT_ROUTES")
                .action(ArgAction::SetTrue),
        );

    let command = provider::with_args(command);
    logging::with_args(command)
}
