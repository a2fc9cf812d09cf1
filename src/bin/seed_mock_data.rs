use dotenvy::dotenv;
use std::env;
use tracing_subscriber::EnvFilter;

use roommates::config::Settings;
use roommates::database;
use roommates::services::seed_service;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = match Settings::from_env() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("configuration error: {}", e);
            std::process::exit(1);
        }
    };
    let pool = match database::connect(&settings.database_url).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("cannot open {}: {}", settings.database_url, e);
            std::process::exit(1);
        }
    };

    let seed: u64 = env::var("SEED")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(20250101);

    match seed_service::reset_demo_data(&pool, seed).await {
        Ok(report) => {
            println!(
                "demo data reset: users={}, answers={}, seed={}",
                report.users, report.answers, seed
            );
        }
        Err(e) => {
            eprintln!("demo data reset failed: {}", e);
            std::process::exit(1);
        }
    }
}
