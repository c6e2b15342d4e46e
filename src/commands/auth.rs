//! # Auth Command Handler
//!
//! This module handles registration, login, and whoami CLI commands.

use crate::{
    LoginRequest, RegisterRequest, TokenResponse, User, cli_utils,
    commands::shared::{dispatch_command, validate_args_count_or_exit},
    http_utils,
};

const AUTH_USAGE: &str = "Usage: hemoctl auth <register|login|me> [args...]";

/// Handles all auth-related commands.
///
/// # Arguments
/// * `args` - Command arguments (first element is the subcommand)
/// * `client` - HTTP client for API communication
pub async fn handle_auth_command(args: &[String], client: &http_utils::HemolinkClient) {
    dispatch_command!("auth", AUTH_USAGE, args, client, {
        "register" => handle_register,
        "login" => handle_login,
        "me" => handle_me,
    });
}

/// Handles registration from a JSON payload.
async fn handle_register(args: &[String], client: &http_utils::HemolinkClient) {
    validate_args_count_or_exit(
        args,
        2,
        2,
        "register",
        r#"Usage: hemoctl auth register <user-json>
Example: hemoctl auth register '{"email":"donor@example.com","password":"hunter2","full_name":"Alex Doe","role":"donor","blood_type":"O+","city":"Springfield","state":"IL"}'"#,
    );

    let request: RegisterRequest = serde_json::from_str(&args[1])
        .unwrap_or_else(|e| cli_utils::exit_with_error(&format!("Invalid user JSON: {}", e)));

    let response = http_utils::execute_or_exit(
        || client.post::<RegisterRequest, TokenResponse>("auth/register", &request),
        "Failed to register",
    )
    .await;

    println!("Registered {}:", response.user.email);
    cli_utils::print_json_or_exit(&response, "token");
}

/// Handles login with email and password.
async fn handle_login(args: &[String], client: &http_utils::HemolinkClient) {
    validate_args_count_or_exit(
        args,
        3,
        3,
        "login",
        "Usage: hemoctl auth login <email> <password>",
    );

    let request = LoginRequest {
        email: args[1].clone(),
        password: args[2].clone(),
    };

    let response = http_utils::execute_or_exit(
        || client.post::<LoginRequest, TokenResponse>("auth/login", &request),
        "Failed to log in",
    )
    .await;

    println!("Logged in as {}:", response.user.email);
    cli_utils::print_json_or_exit(&response, "token");
}

/// Handles the whoami command (requires --token).
async fn handle_me(args: &[String], client: &http_utils::HemolinkClient) {
    validate_args_count_or_exit(args, 1, 1, "me", "Usage: hemoctl auth me");

    let user = http_utils::execute_or_exit(
        || client.get::<User>("auth/me"),
        "Failed to fetch current user",
    )
    .await;

    cli_utils::print_json_or_exit(&user, "user");
}
