//! General utilities for the CLI application.
//!
//! This module provides utility functions and types for common operations across the CLI.

use ethers::types::Address;
use ethers::utils::to_checksum;
use std::io::Write;

/// A constant marker used for visual emphasis in CLI output. It's a red asterisk.
pub const MARKER: &str = "\u{001b}[1m\u{001b}[31m*\u{001b}[0m";

/// Shortens an address to the `0x1234...abcd` form used in listings.
pub fn shorten_address(address: &Address) -> String {
    let checksummed = to_checksum(address, None);
    format!(
        "{}...{}",
        &checksummed[..6],
        &checksummed[checksummed.len() - 4..]
    )
}

/// Prompts the user for input with a given prompt string.
///
/// # Returns
/// The user's input as a String with trailing whitespace removed.
pub fn read(prompt: &str) -> String {
    print!("{MARKER} {prompt}: ");
    std::io::stdout().lock().flush().expect("Failed to flush");
    let mut response = String::new();
    std::io::stdin()
        .read_line(&mut response)
        .expect("Failed to read line");
    println!();

    response.trim_end().to_owned()
}
