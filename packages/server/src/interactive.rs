//! Interactive mode for the server.
//!
//! Prompts the user for bind address, port and rule table directory before
//! starting the server.

use dialoguer::{Confirm, Input};
use rule_map_store::paths::{DATA_DIR_ENV, rules_dir};

use crate::{DEFAULT_BIND_ADDR, DEFAULT_PORT};

/// Runs the server in interactive mode, prompting for configuration.
///
/// Asks the user for a bind address, port and data directory, sets the
/// corresponding environment variables (`BIND_ADDR`, `PORT`,
/// `RULE_MAP_DATA_DIR`), and delegates to [`super::run_server`].
///
/// # Errors
///
/// Returns an `std::io::Result` error if the underlying server fails to
/// start.
#[allow(clippy::future_not_send)]
pub async fn run() -> std::io::Result<()> {
    println!("Jerusalem Rule Map Server");
    println!();

    let bind_addr: String = Input::new()
        .with_prompt("Bind address")
        .default(DEFAULT_BIND_ADDR.to_string())
        .interact_text()
        .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

    let port_str: String = Input::new()
        .with_prompt("Port")
        .default(DEFAULT_PORT.to_string())
        .interact_text()
        .unwrap_or_else(|_| DEFAULT_PORT.to_string());

    let default_dir = rules_dir().display().to_string();
    let data_dir: String = Input::new()
        .with_prompt("Rule table directory")
        .default(default_dir.clone())
        .interact_text()
        .unwrap_or(default_dir);

    // SAFETY: We are single-threaded at this point (before server starts) and
    // these variables are only read once during server initialisation.
    unsafe {
        std::env::set_var("BIND_ADDR", &bind_addr);
        std::env::set_var("PORT", &port_str);
        std::env::set_var(DATA_DIR_ENV, &data_dir);
    }

    if !Confirm::new()
        .with_prompt(format!("Start server on {bind_addr}:{port_str}?"))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    super::run_server().await
}
