//! Output formatting helpers.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use tether_core::{ClassifiedError, ErrorKind, classify};

/// Print a dimmed status line to stderr.
pub fn note(msg: &str) {
    eprintln!("{}", msg.dimmed());
}

/// Print a failure with its retry classification, when one is known.
pub fn failure(err: &anyhow::Error) {
    match verdict(err) {
        Some((kind, true)) => eprintln!(
            "{} {:#} {}",
            "✗".red(),
            err,
            format!("[{kind}, retryable]").yellow()
        ),
        Some((kind, false)) => eprintln!(
            "{} {:#} {}",
            "✗".red(),
            err,
            format!("[{kind}, fatal]").red()
        ),
        None => eprintln!("{} {:#}", "✗".red(), err),
    }
}

fn verdict(err: &anyhow::Error) -> Option<(ErrorKind, bool)> {
    err.chain().find_map(|cause| {
        if let Some(classified) = cause.downcast_ref::<ClassifiedError>() {
            return Some((classified.kind, classified.retryable));
        }
        cause.downcast_ref::<tether_core::Error>().map(|inner| {
            let classification = classify(inner);
            (classification.kind, classification.retryable)
        })
    })
}

/// Print a value as compact JSON.
pub fn json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    println!("{}", json);
    Ok(())
}

/// Print a value as pretty-printed JSON.
pub fn json_pretty<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}
