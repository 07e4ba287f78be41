//! salon-client binary entry point.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use salon_client::cli::{AuthCommands, Cli, Commands};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(&cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let store = cli.credential_store();
    match &cli.command {
        Commands::Auth(auth_args) => match &auth_args.command {
            AuthCommands::Login(args) => {
                let config = cli.client_config()?;
                salon_client::cli::auth::handle_login(&config, store, &args.email, &args.password)
                    .await
            }
            AuthCommands::Status => salon_client::cli::auth::handle_status(store),
            AuthCommands::Logout => salon_client::cli::auth::handle_logout(store),
        },
        Commands::Request(args) => {
            let config = cli.client_config()?;
            salon_client::cli::request::handle_request(
                config,
                store,
                &args.method,
                &args.path,
                args.body.as_deref(),
            )
            .await
        }
    }
}
