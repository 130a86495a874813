//! Output formatting for CLI responses

use anyhow::Error;
use colored::*;
use falcon_telemetry_bms::ProviderStats;
use falcon_telemetry_core::{NamedValue, TelemetryError};
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::error::CliError;

/// Outcome of resolving one requested name.
pub type Resolved = (String, Result<NamedValue, TelemetryError>);

/// Print error in JSON format
pub fn print_error_json(error: &Error) {
    let error_json = json!({
        "success": false,
        "error": {
            "message": error.to_string(),
            "type": error_type_name(error)
        }
    });
    match serde_json::to_string_pretty(&error_json) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("Failed to format error as JSON: {}", e),
    }
}

/// Print error in human-readable format
pub fn print_error_human(error: &Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);

    let mut source = error.source();
    while let Some(err) = source {
        eprintln!("  {} {}", "Caused by:".yellow(), err);
        source = err.source();
    }
}

fn error_type_name(error: &Error) -> &'static str {
    match error.downcast_ref::<CliError>() {
        Some(CliError::SourceUnavailable(_)) => "source_unavailable",
        Some(CliError::UnknownValue(_)) => "unknown_value",
        Some(CliError::InvalidFrame(_)) => "invalid_frame",
        Some(CliError::InvalidConfiguration(_)) => "invalid_configuration",
        Some(CliError::Provider(_)) => "provider",
        None => "unknown",
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("Failed to format output as JSON: {}", e),
    }
}

/// Print the value-name enumeration
pub fn print_names<'a>(names: impl IntoIterator<Item = &'a str>, json: bool) {
    let names: Vec<&str> = names.into_iter().collect();
    if json {
        print_json(&json!({
            "success": true,
            "names": names
        }));
        return;
    }

    println!("{} ({})", "Telemetry values:".bold(), names.len());
    for name in names {
        println!("  {}", name);
    }
}

fn values_object(values: &[Resolved]) -> Map<String, Value> {
    values
        .iter()
        .map(|(name, result)| {
            let value = match result {
                Ok(named) => serde_json::to_value(&named.value).unwrap_or(Value::Null),
                Err(_) => Value::Null,
            };
            (name.clone(), value)
        })
        .collect()
}

fn print_values_human(values: &[Resolved]) {
    let width = values.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    for (name, result) in values {
        match result {
            Ok(named) => println!("  {:width$}  {}", name, named.value, width = width),
            Err(e) => println!(
                "  {:width$}  {}",
                name,
                format!("unavailable ({e})").dimmed(),
                width = width
            ),
        }
    }
}

/// Print every value resolved from a decoded frame
pub fn print_decoded(path: &str, values: &[Resolved], json: bool) {
    if json {
        print_json(&json!({
            "success": true,
            "file": path,
            "values": values_object(values)
        }));
        return;
    }

    println!("{} {}", "Frame:".bold(), path);
    print_values_human(values);
}

/// Print one update from `watch`
pub fn print_update(sequence: u64, time: f64, values: &[Resolved], json: bool) {
    if json {
        let line = json!({
            "sequence": sequence,
            "time": time,
            "values": values_object(values)
        });
        println!("{}", line);
        return;
    }

    let fields: Vec<String> = values
        .iter()
        .map(|(name, result)| match result {
            Ok(named) => format!("{}={}", name, format_scalar(named)),
            Err(_) => format!("{}={}", name, "n/a".dimmed()),
        })
        .collect();
    println!("{} t={:.3}s {}", format!("#{sequence}").cyan(), time, fields.join(" "));
}

fn format_scalar(named: &NamedValue) -> String {
    match named.as_f32() {
        Some(v) => format!("{v:.4}"),
        None => named.value.to_string(),
    }
}

/// Print provider statistics after `watch`
pub fn print_stats(stats: &ProviderStats, json: bool) {
    if json {
        print_json(&json!({
            "success": true,
            "stats": stats
        }));
        return;
    }

    println!("{}", "Provider statistics:".bold());
    println!("  Frames published: {}", stats.frames_published);
    println!("  Read failures:    {}", stats.read_failures);
    println!("  Sessions started: {}", stats.sessions_started);
}

/// Print the result of `capture`
pub fn print_capture(source: &str, output: &str, bytes_written: usize, json: bool) {
    if json {
        print_json(&json!({
            "success": true,
            "source": source,
            "output": output,
            "bytes_written": bytes_written
        }));
        return;
    }

    println!(
        "{} {} bytes from {} to {}",
        "Captured".green().bold(),
        bytes_written,
        source,
        output
    );
}
