//! # Donor Command Handler
//!
//! This module handles donor matching CLI commands.

use crate::{
    BloodType, User, cli_utils,
    commands::shared::{dispatch_command, parse_or_exit, validate_args_count_or_exit},
    http_utils,
};

const DONOR_USAGE: &str = "Usage: hemoctl donor <match> [args...]";

/// Handles all donor-related commands.
///
/// # Arguments
/// * `args` - Command arguments (first element is the subcommand)
/// * `client` - HTTP client for API communication
pub async fn handle_donor_command(args: &[String], client: &http_utils::HemolinkClient) {
    dispatch_command!("donor", DONOR_USAGE, args, client, {
        "match" => handle_donor_match,
    });
}

/// Handles donor matching by blood group and optional location.
async fn handle_donor_match(args: &[String], client: &http_utils::HemolinkClient) {
    validate_args_count_or_exit(
        args,
        2,
        4,
        "match",
        "Usage: hemoctl donor match <blood-type> [city] [state]",
    );

    let blood_type: BloodType = parse_or_exit(&args[1], "blood type");

    let mut query = vec![("blood_type", blood_type.as_str())];
    if args.len() > 2 {
        query.push(("city", args[2].as_str()));
    }
    if args.len() > 3 {
        query.push(("state", args[3].as_str()));
    }

    let donors = http_utils::execute_or_exit(
        || client.get_with_query::<Vec<User>>("donors/match", &query),
        "Failed to match donors",
    )
    .await;

    cli_utils::print_json_or_exit(&donors, "donors");
}
