use clap::Parser;
use curriculum_api::auth::{issue_session_token, SessionClaims};
use curriculum_api::config;

/// Mint a signed session token for local testing of the API.
#[derive(Parser)]
#[command(name = "session-token", version)]
struct Args {
    #[arg(long, help = "User id stored as the token subject")]
    sub: String,

    #[arg(long, help = "Email the dashboard looks the user up by")]
    email: Option<String>,

    #[arg(long, help = "Display name")]
    name: Option<String>,

    #[arg(long, help = "Validity in hours (defaults to the configured session expiry)")]
    hours: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let args = Args::parse();
    let security = &config::config().security;

    let hours = args.hours.unwrap_or(security.session_expiry_hours);
    let claims = SessionClaims::new(args.sub, args.email, args.name, hours)?;
    let token = issue_session_token(&claims, &security.session_secret)?;

    println!("{}", token);
    Ok(())
}
