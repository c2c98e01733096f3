use clap::{Parser, Subcommand};
use migration::{Migrator, MigratorTrait};

use vidhub::config::Config;
use vidhub::server;
use vidhub::services::users::create_user;

/// VidHub - video hosting backend
#[derive(Parser, Debug)]
#[command(name = "vidhub", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Connect to the database and serve the HTTP API (default)
    Serve,
    /// Apply pending database migrations and exit
    Migrate {
        #[arg(long, env = "DATABASE_URL")]
        database_url: String,
    },
    /// Create a user that can own videos
    CreateUser {
        username: String,
        #[arg(long, env = "DATABASE_URL")]
        database_url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    server::init_tracing();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let config = Config::from_env()?;
            server::run(config).await
        }
        Command::Migrate { database_url } => {
            let db = server::connect(&database_url).await?;
            Migrator::up(&db, None).await?;
            tracing::info!("Migrations applied");
            Ok(())
        }
        Command::CreateUser {
            username,
            database_url,
        } => {
            let db = server::connect(&database_url).await?;
            let user = create_user(&db, &username).await?;
            println!("{}", user.id);
            Ok(())
        }
    }
}
