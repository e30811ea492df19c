// Utility to mint a dashboard JWT for local development
// Usage: cargo run --bin issue_token -- --email agent@example.com --role agent

use clap::Parser;
use uuid::Uuid;

use listing_insights_api::middleware::auth::mint_token;
use listing_insights_api::Config;

#[derive(Parser)]
#[command(about = "Mint a JWT accepted by the insights API (local development only)")]
struct Args {
    #[arg(long)]
    email: String,

    /// agent or admin (buyer tokens are rejected by the insights endpoints)
    #[arg(long, default_value = "agent")]
    role: String,

    /// Subject UUID; random when omitted
    #[arg(long)]
    user_id: Option<Uuid>,

    /// Override JWT_EXPIRATION from the environment, in seconds
    #[arg(long)]
    expires_secs: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.role != "agent" && args.role != "admin" && args.role != "buyer" {
        eprintln!("Error: role must be one of agent, admin, buyer");
        std::process::exit(1);
    }

    // Load environment variables
    dotenv::dotenv().ok();
    let config = Config::from_env()?;

    let user_id = args.user_id.unwrap_or_else(Uuid::new_v4);
    let expiration = args.expires_secs.unwrap_or(config.jwt_expiration);

    let token = mint_token(
        &user_id,
        &args.email,
        &args.role,
        &config.jwt_secret,
        expiration,
    )?;

    println!("Token for {} ({}):", args.email, args.role);
    println!("{}", token);
    println!("\nUse it as: Authorization: Bearer <token>");

    Ok(())
}
