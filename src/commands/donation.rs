//! # Donation History Command Handler
//!
//! This module handles donation recording and history CLI commands.

use crate::{
    DonationRecord, RecordDonationRequest, cli_utils,
    commands::shared::{dispatch_command, validate_args_count_or_exit},
    http_utils,
};

const DONATION_USAGE: &str = "Usage: hemoctl donation <record|list> [args...]";

/// Handles all donation-related commands.
///
/// # Arguments
/// * `args` - Command arguments (first element is the subcommand)
/// * `client` - HTTP client for API communication
pub async fn handle_donation_command(args: &[String], client: &http_utils::HemolinkClient) {
    dispatch_command!("donation", DONATION_USAGE, args, client, {
        "record" => handle_donation_record,
        "list" => handle_donation_list,
    });
}

/// Handles recording a donation from a JSON payload (requires --token).
async fn handle_donation_record(args: &[String], client: &http_utils::HemolinkClient) {
    validate_args_count_or_exit(
        args,
        2,
        2,
        "record",
        r#"Usage: hemoctl donation record <donation-json>
Example: hemoctl donation record '{"blood_type":"O+","units_donated":1,"hospital_name":"General Hospital","city":"Springfield"}'"#,
    );

    let request: RecordDonationRequest = serde_json::from_str(&args[1])
        .unwrap_or_else(|e| cli_utils::exit_with_error(&format!("Invalid donation JSON: {}", e)));

    let response = http_utils::execute_or_exit(
        || client.post::<RecordDonationRequest, DonationRecord>("donation-history", &request),
        "Failed to record donation",
    )
    .await;

    println!("Recorded donation:");
    cli_utils::print_json_or_exit(&response, "donation");
}

/// Handles listing the caller's donation history (requires --token).
async fn handle_donation_list(args: &[String], client: &http_utils::HemolinkClient) {
    validate_args_count_or_exit(args, 1, 1, "list", "Usage: hemoctl donation list");

    let records = http_utils::execute_or_exit(
        || client.get::<Vec<DonationRecord>>("donation-history"),
        "Failed to list donations",
    )
    .await;

    cli_utils::print_json_or_exit(&records, "donations");
}
