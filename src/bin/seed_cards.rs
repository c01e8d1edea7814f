//! One-off utility: seed the card catalog into the configured database.
//!
//! The server seeds at boot as well; this exists for provisioning a fresh
//! database ahead of first deploy. Safe to run repeatedly.

use cardmatch_api::config::Config;
use cardmatch_api::db::Database;
use cardmatch_api::seed;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    let db = Database::new(&config.database_url).await?;

    let inserted = seed::seed_credit_cards(&db.pool)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;

    if inserted == 0 {
        println!("Catalog already seeded, nothing to do");
    } else {
        println!("Seeded {} catalog cards", inserted);
    }

    Ok(())
}
