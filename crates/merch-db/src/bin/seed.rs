//! # Seed Data Generator
//!
//! Registers demo users (with wallets) for local development and load tests.
//!
//! ## Usage
//! ```bash
//! # 10 users named user1..user10, password "password"
//! cargo run -p merch-db --bin seed
//!
//! # Custom amount and database
//! cargo run -p merch-db --bin seed -- --count 1000 --db ./data/merch.db
//! ```
//!
//! Every generated user starts with the regular 1000 coins and can log in
//! through `POST /api/auth` with the seeded password.

use std::env;

use merch_core::STARTING_BALANCE;
use merch_db::password::hash_password;
use merch_db::{Database, DbConfig, DbError};

const DEFAULT_COUNT: usize = 10;
const DEFAULT_DB: &str = "./merch_dev.db";
const DEFAULT_PASSWORD: &str = "password";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count = DEFAULT_COUNT;
    let mut db_path = String::from(DEFAULT_DB);
    let mut password = String::from(DEFAULT_PASSWORD);

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(DEFAULT_COUNT);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--password" | "-p" => {
                if i + 1 < args.len() {
                    password = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Merch Shop Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>        Number of users to create (default: {DEFAULT_COUNT})");
                println!("  -d, --db <PATH>        Database file path (default: {DEFAULT_DB})");
                println!("  -p, --password <PW>    Password for every user (default: {DEFAULT_PASSWORD})");
                println!("  -h, --help             Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Merch Shop Seed Data Generator");
    println!("=================================");
    println!("Database: {}", db_path);
    println!("Users:    {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let items = db.items().list().await?;
    println!("✓ Catalog has {} items", items.len());

    // Hashed once and shared by every demo user.
    let hash = hash_password(&password)?;

    let start = std::time::Instant::now();
    let mut created = 0;
    let mut skipped = 0;

    for n in 1..=count {
        let username = format!("user{}", n);

        match db
            .users()
            .create_with_balance(&username, &hash, STARTING_BALANCE)
            .await
        {
            Ok(_) => created += 1,
            Err(DbError::UniqueViolation { .. }) => skipped += 1,
            Err(e) => {
                eprintln!("Failed to create {}: {}", username, e);
                continue;
            }
        }

        if created > 0 && created % 500 == 0 {
            println!("  Created {} users...", created);
        }
    }

    let supply = db.history().total_supply().await?;

    println!();
    println!("✓ Created {} users ({} already existed)", created, skipped);
    println!("✓ Total coin supply: {}", supply);
    println!("  Took {:.2?}", start.elapsed());

    db.close().await;
    Ok(())
}
