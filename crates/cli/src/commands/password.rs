//! Admin password hashing.
//!
//! Reads one line from stdin so the password stays out of shell history,
//! and prints the PHC string to stdout for `BACKLINE_ADMIN_PASSWORD_HASH`.

use std::io::{BufRead, Write};

use backline_site::services::auth::hash_password;

/// Hash the password on stdin.
///
/// # Errors
///
/// Returns an error if stdin cannot be read, the password is too short,
/// or hashing fails.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Reading admin password from stdin");
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;

    let hash = hash_password(line.trim_end_matches(['\r', '\n']))?;

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{hash}")?;
    Ok(())
}
