use arrrg::CommandLine;
use arrrg_derive::CommandLine;

use hemolink::{
    cli_utils,
    commands::{
        handle_auth_command, handle_donation_command, handle_donor_command,
        handle_facility_command, handle_request_command, handle_stats_command,
    },
    http_utils,
};

#[derive(CommandLine, Default, PartialEq, Eq)]
struct Options {
    #[arrrg(optional, "Base URL of the hemolink API server")]
    base_url: String,
    #[arrrg(
        optional,
        "Bearer token for authenticated commands (default: $HEMOLINK_TOKEN)"
    )]
    token: String,
}

const USAGE: &str = r#"Usage: hemoctl [options] <command> [args...]

Options:
  --base-url <url>     Base URL of the hemolink API server (default: http://localhost:8080)
  --token <token>      Bearer token for authenticated commands (default: $HEMOLINK_TOKEN)

Commands:
  auth register <user-json>                    Register a new user
  auth login <email> <password>                Exchange credentials for a token
  auth me                                      Show the authenticated user
  request create <request-json>                Post a blood request
  request list [status]                        Browse blood requests
  request get <request-id>                     Get a blood request by id
  request set-status <request-id> <status>     Update a request's status
  donor match <blood-type> [city] [state]      Find available donors
  facility create <facility-json>              Register a medical facility
  facility list [city]                         Browse medical facilities
  facility get <facility-id>                   Get a facility by id
  donation record <donation-json>              Record a donation (donors only)
  donation list                                List the caller's donations
  stats show                                   Show platform-wide counters"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (options, free) = Options::from_command_line_relaxed("USAGE: hemoctl <command> [args...]");

    if free.is_empty() {
        cli_utils::exit_with_usage_error("No command specified", USAGE);
    }

    let base_url = if options.base_url.is_empty() {
        "http://localhost:8080".to_string()
    } else {
        options.base_url
    };

    let token = if options.token.is_empty() {
        std::env::var("HEMOLINK_TOKEN").ok()
    } else {
        Some(options.token)
    };

    let client = http_utils::HemolinkClient::new(base_url).with_token(token);

    match free[0].as_str() {
        "auth" => {
            handle_auth_command(&free[1..], &client).await;
        }
        "request" => {
            handle_request_command(&free[1..], &client).await;
        }
        "donor" => {
            handle_donor_command(&free[1..], &client).await;
        }
        "facility" => {
            handle_facility_command(&free[1..], &client).await;
        }
        "donation" => {
            handle_donation_command(&free[1..], &client).await;
        }
        "stats" => {
            handle_stats_command(&free[1..], &client).await;
        }
        command => {
            cli_utils::exit_with_usage_error(&format!("Unknown command '{}'", command), USAGE);
        }
    }

    Ok(())
}
