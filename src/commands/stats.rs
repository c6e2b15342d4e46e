//! # Stats Command Handler
//!
//! This module handles the platform counters CLI command.

use crate::{
    PlatformStats, cli_utils,
    commands::shared::{dispatch_command, validate_args_count_or_exit},
    http_utils,
};

const STATS_USAGE: &str = "Usage: hemoctl stats <show>";

/// Handles all stats-related commands.
///
/// # Arguments
/// * `args` - Command arguments (first element is the subcommand)
/// * `client` - HTTP client for API communication
pub async fn handle_stats_command(args: &[String], client: &http_utils::HemolinkClient) {
    dispatch_command!("stats", STATS_USAGE, args, client, {
        "show" => handle_stats_show,
    });
}

/// Handles fetching the platform counters.
async fn handle_stats_show(args: &[String], client: &http_utils::HemolinkClient) {
    validate_args_count_or_exit(args, 1, 1, "show", "Usage: hemoctl stats show");

    let stats = http_utils::execute_or_exit(
        || client.get::<PlatformStats>("stats"),
        "Failed to fetch stats",
    )
    .await;

    cli_utils::print_json_or_exit(&stats, "stats");
}
