//! # Blood Request Command Handler
//!
//! This module handles blood request CLI commands including creation,
//! browsing, retrieval, and status updates.

use crate::{
    BloodRequest, CreateBloodRequestRequest, RequestId, RequestStatus, UpdateStatusResponse,
    cli_utils,
    commands::shared::{dispatch_command, parse_or_exit, validate_args_count_or_exit},
    http_utils,
};

const REQUEST_USAGE: &str = "Usage: hemoctl request <create|list|get|set-status> [args...]";

/// Handles all blood-request-related commands.
///
/// # Arguments
/// * `args` - Command arguments (first element is the subcommand)
/// * `client` - HTTP client for API communication
pub async fn handle_request_command(args: &[String], client: &http_utils::HemolinkClient) {
    dispatch_command!("request", REQUEST_USAGE, args, client, {
        "create" => handle_request_create,
        "list" => handle_request_list,
        "get" => handle_request_get,
        "set-status" => handle_request_set_status,
    });
}

/// Handles blood request creation from a JSON payload (requires --token).
async fn handle_request_create(args: &[String], client: &http_utils::HemolinkClient) {
    validate_args_count_or_exit(
        args,
        2,
        2,
        "create",
        r#"Usage: hemoctl request create <request-json>
Example: hemoctl request create '{"patient_name":"Jordan Smith","blood_type":"A+","units_needed":2,"urgency":"high","hospital_name":"General Hospital","city":"Springfield","state":"IL","contact_phone":"555-0100"}'"#,
    );

    let request: CreateBloodRequestRequest = serde_json::from_str(&args[1])
        .unwrap_or_else(|e| cli_utils::exit_with_error(&format!("Invalid request JSON: {}", e)));

    let response = http_utils::execute_or_exit(
        || client.post::<CreateBloodRequestRequest, BloodRequest>("blood-requests", &request),
        "Failed to create blood request",
    )
    .await;

    println!("Created blood request:");
    cli_utils::print_json_or_exit(&response, "blood request");
}

/// Handles blood request browsing, optionally narrowed to a status.
async fn handle_request_list(args: &[String], client: &http_utils::HemolinkClient) {
    validate_args_count_or_exit(
        args,
        1,
        2,
        "list",
        "Usage: hemoctl request list [active|fulfilled|cancelled]",
    );

    let requests = if args.len() == 2 {
        let status: RequestStatus = parse_or_exit(&args[1], "status");
        let query = [("status", status.as_str())];
        http_utils::execute_or_exit(
            || {
                client.get_with_query::<Vec<BloodRequest>>(
                    "blood-requests",
                    &query,
                )
            },
            "Failed to list blood requests",
        )
        .await
    } else {
        http_utils::execute_or_exit(
            || client.get::<Vec<BloodRequest>>("blood-requests"),
            "Failed to list blood requests",
        )
        .await
    };

    cli_utils::print_json_or_exit(&requests, "blood requests");
}

/// Handles blood request retrieval by id.
async fn handle_request_get(args: &[String], client: &http_utils::HemolinkClient) {
    validate_args_count_or_exit(args, 2, 2, "get", "Usage: hemoctl request get <request-id>");

    let request_id: RequestId = parse_or_exit(&args[1], "request id");

    let path = format!("blood-requests/{}", request_id);
    let request = http_utils::execute_or_exit(
        || client.get::<BloodRequest>(&path),
        "Failed to get blood request",
    )
    .await;

    cli_utils::print_json_or_exit(&request, "blood request");
}

/// Handles status updates (requires --token).
async fn handle_request_set_status(args: &[String], client: &http_utils::HemolinkClient) {
    validate_args_count_or_exit(
        args,
        3,
        3,
        "set-status",
        "Usage: hemoctl request set-status <request-id> <active|fulfilled|cancelled>",
    );

    let request_id: RequestId = parse_or_exit(&args[1], "request id");
    let status: RequestStatus = parse_or_exit(&args[2], "status");

    let path = format!("blood-requests/{}/status", request_id);
    let query = [("status", status.as_str())];
    let response = http_utils::execute_or_exit(
        || {
            client.patch_with_query::<UpdateStatusResponse>(
                &path,
                &query,
            )
        },
        "Failed to update status",
    )
    .await;

    println!("{}", response.message);
}
