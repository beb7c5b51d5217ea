//! CLI for seeding the admin login
//!
//! Replaces any existing admin accounts with a fresh one so a lost admin
//! password never requires manual SQL. When no password is supplied a
//! random one is generated and printed once.

use anyhow::{Context, Result};
use clap::Parser;
use rand::RngCore;
use server_core::config::Config;
use server_core::domains::auth::password::hash_password;
use server_core::domains::auth::{User, ROLE_ADMIN};
use sqlx::PgPool;

#[derive(Parser)]
#[command(name = "create_admin")]
#[command(about = "Create the platform admin account (replaces existing admins)")]
struct Cli {
    #[arg(long, default_value = "admin")]
    username: String,

    #[arg(long, default_value = "admin@arcyberguard.com")]
    email: String,

    /// Placeholder number; admin accounts skip phone verification
    #[arg(long, default_value = "9999999999")]
    phone: String,

    #[arg(long, default_value = "System Administrator")]
    name: String,

    /// Generated randomly when omitted
    #[arg(long)]
    password: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::from_env()?;

    let pool = PgPool::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    println!("✓ Connected to database");

    let (password, generated) = match cli.password {
        Some(password) => (password, false),
        None => (random_password(), true),
    };
    let password_hash = hash_password(&password).context("Failed to hash password")?;

    let removed = User::delete_admins_with_dependents(&pool)
        .await
        .context("Failed to remove existing admin accounts")?;
    if removed > 0 {
        println!("✓ Removed {} existing admin account(s)", removed);
    }

    let admin = User::create(
        &cli.username,
        &cli.email,
        &cli.phone,
        &password_hash,
        &cli.name,
        ROLE_ADMIN,
        true,
        &pool,
    )
    .await
    .context("Failed to create admin user")?;

    println!("✓ Admin user created");
    println!("   ID:       {}", admin.id);
    println!("   Username: {}", admin.username);
    println!("   Email:    {}", admin.email);
    println!("   Phone:    {}", admin.phone_number);
    if generated {
        println!("   Password: {}", password);
        println!("\nStore this password now; it is not shown again.");
    }

    Ok(())
}

fn random_password() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
