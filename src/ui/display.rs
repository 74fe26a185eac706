//! Display utilities for attack results, analyses and the cipher registry.

use std::fmt::Display;
use std::path::Path;
use std::time::Duration;

use bytesize::ByteSize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::analysis::EncryptionAnalysis;
use crate::cipher::{CipherDescriptor, Registry};
use crate::types::AttackResult;

/// Joins items with commas, or a dash for an empty list.
pub fn format_list<T: Display>(items: &[T]) -> String {
    if items.is_empty() {
        return "-".to_owned();
    }
    items.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

/// Formats an elapsed time as seconds with millisecond precision.
pub fn format_elapsed(elapsed: Duration) -> String {
    format!("{:.3}s", elapsed.as_secs_f64())
}

fn table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn show_result(result: &AttackResult) {
    println!();
    match result.password() {
        Some(password) => println!("{} {} {}", style("✓").green(), style("Password found:").bold(), style(password).green().bold()),
        None => println!("{} {}", style("✗").red(), style(result.error().unwrap_or_default()).bold()),
    }

    let elapsed = result.elapsed();
    let rate = if elapsed.is_zero() { 0.0 } else { result.attempts() as f64 / elapsed.as_secs_f64() };
    println!("  {} attempts in {} ({rate:.0}/s)", result.attempts(), format_elapsed(elapsed));
}

/// Displays an analysis followed by the registry descriptors it suggests.
pub fn show_analysis(analysis: &EncryptionAnalysis, suggestions: &[&CipherDescriptor]) {
    let mut summary = table();
    summary.set_header(vec!["Property", "Value"]);
    summary.add_row(vec!["File size".to_owned(), ByteSize::b(analysis.file_size).to_string()]);
    summary.add_row(vec!["Block alignment".to_owned(), analysis.block_alignment.to_string()]);
    summary.add_row(vec!["Entropy".to_owned(), format!("{:.3} bits/byte", analysis.entropy)]);
    summary.add_row(vec!["Format".to_owned(), analysis.detected_format.unwrap_or("-").to_owned()]);
    summary.add_row(vec!["Algorithms".to_owned(), format_list(&analysis.possible_algorithms)]);
    summary.add_row(vec!["Modes".to_owned(), format_list(&analysis.possible_modes)]);
    summary.add_row(vec!["Paddings".to_owned(), format_list(&analysis.possible_paddings)]);
    summary.add_row(vec!["Confidence".to_owned(), format!("{:.0}%", analysis.confidence * 100.0)]);

    println!("{summary}");

    for note in &analysis.notes {
        println!("  {} {note}", style("•").cyan());
    }

    if !suggestions.is_empty() {
        println!();
        println!("{}", style("Suggested descriptors:").bold());
        println!("{}", descriptor_table(suggestions.iter().copied()));
    }
}

pub fn show_algorithms(registry: &Registry) {
    println!("{}", descriptor_table(registry.list().iter()));
}

pub fn show_written(path: &Path, size: usize) {
    println!("{} {}", style("✓").green(), style(format!("Wrote {} to {}", ByteSize::b(size as u64), path.display())).bold());
}

fn descriptor_table<'a>(descriptors: impl Iterator<Item = &'a CipherDescriptor>) -> Table {
    let mut table = table();
    table.set_header(vec!["Name", "Modes", "Paddings", "Block", "Key lengths"]);

    for descriptor in descriptors {
        table.add_row(vec![
            descriptor.name().to_owned(),
            format_list(descriptor.modes()),
            format_list(descriptor.paddings()),
            descriptor.block_size().to_string(),
            format_list(descriptor.key_lengths()),
        ]);
    }

    table
}
