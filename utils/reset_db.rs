use sea_orm::{ConnectionTrait, Database, DbBackend, Statement};
use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let database_url = env::var("DATABASE_URL").map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

    let db = Database::connect(database_url).await?;

    for table in ["videos", "users", "seaql_migrations"] {
        db.execute(Statement::from_string(
            DbBackend::Postgres,
            format!("DROP TABLE IF EXISTS \"{}\" CASCADE;", table),
        ))
        .await?;
    }

    println!("Database reset successfully");
    Ok(())
}
