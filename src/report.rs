//! Console tables and messages for `pubmon`

use crate::discovery::DiscoveryResult;
use crate::registry::PublisherRecord;
use std::fmt::Write;

const REGISTRY_RULE_WIDTH: usize = 80;
const DISCOVERY_RULE_WIDTH: usize = 90;

/// Registered publishers, one row each
pub fn registry_table<'a, I>(records: I) -> String
where
    I: IntoIterator<Item = PublisherRecord<'a>>,
{
    let mut rows = records.into_iter().peekable();
    if rows.peek().is_none() {
        return "No registered publishers.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<20} {:<8} {:<15} {}",
        "Name", "Port", "Host", "Description"
    );
    let _ = writeln!(out, "{}", "-".repeat(REGISTRY_RULE_WIDTH));
    for record in rows {
        let _ = writeln!(
            out,
            "{:<20} {:<8} {:<15} {}",
            record.name, record.port, record.host, record.description
        );
    }
    out
}

/// Live publishers found by a scan
pub fn discovery_table(results: &[DiscoveryResult]) -> String {
    if results.is_empty() {
        return "No active publishers found.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<20} {:<8} {:<15} {}",
        "Name", "Port", "Host", "Data Types"
    );
    let _ = writeln!(out, "{}", "-".repeat(DISCOVERY_RULE_WIDTH));
    for result in results {
        let _ = writeln!(
            out,
            "{:<20} {:<8} {:<15} {}",
            result.display_name(),
            result.port,
            result.host,
            result.schema
        );
    }
    out
}

/// Confirmation for `add`
pub fn added_message(name: &str, host: &str, port: u16) -> String {
    format!("Added publisher '{}' -> {}:{}\n", name, host, port)
}

/// Outcome of `remove`
pub fn removed_message(name: &str, removed: bool) -> String {
    if removed {
        format!("Removed publisher '{}'\n", name)
    } else {
        format!("Publisher '{}' not found\n", name)
    }
}

/// `monitor` was given a name the registry does not know
pub fn unknown_publisher_message(name: &str) -> String {
    format!(
        "Publisher '{}' not found in database\n\
         Use 'list' to see registered publishers or 'add' to register a new one\n",
        name
    )
}
