// ModelPort - 3D Model Import Pipeline
// Copyright (C) 2025 ModelPort Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published
// by the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.

//! Shared output formatting for CLI commands.
//!
//! Results go to stdout; warnings and errors go to stderr so that
//! `--json` output stays parseable.

use console::style;

/// Print a success message with a green checkmark.
pub fn success(msg: &str) {
    println!("{} {}", style("✅").green().bold(), msg);
}

/// Print an error message to stderr with a red cross.
pub fn error(msg: &str) {
    eprintln!("{} {}", style("❌").red().bold(), style(msg).red());
}

/// Print a warning to stderr.
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("⚠").yellow().bold(), style(msg).yellow());
}

/// Print an indented key/value line.
pub fn detail(key: &str, value: &str) {
    println!("  {}: {}", style(key).dim(), value);
}

/// Print a bold section header.
pub fn header(msg: &str) {
    println!("{}", style(msg).bold());
}

/// Print an indented list entry.
pub fn item(msg: &str) {
    println!("    {} {}", style("•").dim(), msg);
}
