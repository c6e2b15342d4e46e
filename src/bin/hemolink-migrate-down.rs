//! Reverts hemolink schema migrations.
//!
//! Rolls the embedded migrations back down to a target version. The default
//! target of 0 reverts everything, dropping all hemolink tables.

use arrrg::CommandLine;
use arrrg_derive::CommandLine;

#[derive(CommandLine, Default, PartialEq, Eq)]
struct Options {
    #[arrrg(optional, "PostgreSQL database URL (default: $DATABASE_URL)")]
    database_url: Option<String>,
    #[arrrg(optional, "Migration version to roll back to (default: 0)")]
    target: Option<i64>,
}

const USAGE: &str = r#"Usage: hemolink-migrate-down [--database-url <URL>] [--target <VERSION>]

Reverts hemolink schema migrations down to a target version.

Arguments:
  --database-url <URL>    PostgreSQL connection URL [default: $DATABASE_URL]
  --target <VERSION>      Keep migrations up to and including this version [default: 0]

Example:
  hemolink-migrate-down --database-url postgres://localhost/hemolink --target 2

With the default target of 0, every migration is reverted."#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (options, free) = Options::from_command_line(USAGE);

    if !free.is_empty() {
        eprintln!("Error: Unexpected arguments: {:?}", free);
        eprintln!();
        eprintln!("{}", USAGE);
        std::process::exit(1);
    }

    let database_url = options
        .database_url
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| {
            eprintln!("Error: database URL required: pass --database-url or set DATABASE_URL");
            std::process::exit(1);
        });

    let target = options.target.unwrap_or(0);

    let pool = sqlx::PgPool::connect(&database_url).await?;

    println!("Reverting migrations down to version {}...", target);
    sqlx::migrate!("./migrations").undo(&pool, target).await?;
    println!("Rollback complete.");

    Ok(())
}
