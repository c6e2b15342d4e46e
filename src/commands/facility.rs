//! # Medical Facility Command Handler
//!
//! This module handles facility CLI commands including creation, browsing,
//! and retrieval.

use crate::{
    CreateFacilityRequest, FacilityId, MedicalFacility, cli_utils,
    commands::shared::{dispatch_command, parse_or_exit, validate_args_count_or_exit},
    http_utils,
};

const FACILITY_USAGE: &str = "Usage: hemoctl facility <create|list|get> [args...]";

/// Handles all facility-related commands.
///
/// # Arguments
/// * `args` - Command arguments (first element is the subcommand)
/// * `client` - HTTP client for API communication
pub async fn handle_facility_command(args: &[String], client: &http_utils::HemolinkClient) {
    dispatch_command!("facility", FACILITY_USAGE, args, client, {
        "create" => handle_facility_create,
        "list" => handle_facility_list,
        "get" => handle_facility_get,
    });
}

/// Handles facility creation from a JSON payload (requires --token).
async fn handle_facility_create(args: &[String], client: &http_utils::HemolinkClient) {
    validate_args_count_or_exit(
        args,
        2,
        2,
        "create",
        r#"Usage: hemoctl facility create <facility-json>
Example: hemoctl facility create '{"name":"City Blood Bank","facility_type":"blood_bank","address":"1 Main St","city":"Springfield","state":"IL","phone":"555-0100","services":["blood_bank"],"blood_types_available":["O+","O-"]}'"#,
    );

    let request: CreateFacilityRequest = serde_json::from_str(&args[1])
        .unwrap_or_else(|e| cli_utils::exit_with_error(&format!("Invalid facility JSON: {}", e)));

    let response = http_utils::execute_or_exit(
        || client.post::<CreateFacilityRequest, MedicalFacility>("medical-facilities", &request),
        "Failed to create facility",
    )
    .await;

    println!("Created facility:");
    cli_utils::print_json_or_exit(&response, "facility");
}

/// Handles facility browsing, optionally narrowed to a city.
async fn handle_facility_list(args: &[String], client: &http_utils::HemolinkClient) {
    validate_args_count_or_exit(args, 1, 2, "list", "Usage: hemoctl facility list [city]");

    let facilities = if args.len() == 2 {
        let query = [("city", args[1].as_str())];
        http_utils::execute_or_exit(
            || {
                client.get_with_query::<Vec<MedicalFacility>>(
                    "medical-facilities",
                    &query,
                )
            },
            "Failed to list facilities",
        )
        .await
    } else {
        http_utils::execute_or_exit(
            || client.get::<Vec<MedicalFacility>>("medical-facilities"),
            "Failed to list facilities",
        )
        .await
    };

    cli_utils::print_json_or_exit(&facilities, "facilities");
}

/// Handles facility retrieval by id.
async fn handle_facility_get(args: &[String], client: &http_utils::HemolinkClient) {
    validate_args_count_or_exit(args, 2, 2, "get", "Usage: hemoctl facility get <facility-id>");

    let facility_id: FacilityId = parse_or_exit(&args[1], "facility id");

    let path = format!("medical-facilities/{}", facility_id);
    let facility = http_utils::execute_or_exit(
        || client.get::<MedicalFacility>(&path),
        "Failed to get facility",
    )
    .await;

    cli_utils::print_json_or_exit(&facility, "facility");
}
