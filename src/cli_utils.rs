//! Process helpers for the hemoctl binary: error exits and JSON output.

use std::process;

/// Prints an error to stderr and exits nonzero.
pub fn exit_with_error(message: &str) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Prints an error and the command's usage text, then exits nonzero.
pub fn exit_with_usage_error(message: &str, usage: &str) -> ! {
    eprintln!("Error: {}", message);
    eprintln!("{}", usage);
    process::exit(1);
}

/// Pretty-prints a value as JSON, exiting if it cannot be serialized.
pub fn print_json_or_exit<T>(value: &T, context: &str)
where
    T: serde::Serialize,
{
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => exit_with_error(&format!("Failed to format {} JSON: {}", context, e)),
    }
}
