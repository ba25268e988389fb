//! Markdown and JSON run reports.
//!
//! A report holds the run metadata, the final standings and every frame
//! the recording sink captured.

use crate::models::{RankedEntry, RecordedFrame, Report, ReportMetadata};
use crate::render::format::{entity_color, format_date, format_number};
use anyhow::{Context, Result};
use std::path::Path;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report) -> String {
    let mut output = String::new();

    output.push_str("# Bar Chart Race Report\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_standings_section(
        &report.final_standings,
        report.metadata.capacity,
    ));
    output.push_str(&generate_leaders_section(&report.frames));
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** {}\n", metadata.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Capacity:** top {}\n", metadata.capacity));
    section.push_str(&format!(
        "- **Frames per Interval:** {}\n",
        metadata.frames_per_interval
    ));
    section.push_str(&format!("- **Dates:** {}\n", metadata.buckets));
    section.push_str(&format!("- **Frames Animated:** {}\n", metadata.frames));
    section.push_str(&format!("- **Entities:** {}\n", metadata.entities));
    section.push_str(&format!(
        "- **Run Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the final standings table (visible entries only).
fn generate_standings_section(standings: &[RankedEntry], capacity: usize) -> String {
    let mut section = String::new();

    section.push_str("## Final Standings\n\n");

    if standings.is_empty() {
        section.push_str("Nothing was animated: at least two dates are needed.\n\n");
        return section;
    }

    section.push_str("| Rank | Entity | Total | Color |\n");
    section.push_str("|:---:|:---|---:|:---:|\n");

    for entry in standings.iter().filter(|e| e.rank < capacity) {
        section.push_str(&format!(
            "| {} | {} | {} | `{}` |\n",
            entry.rank + 1,
            entry.entity,
            format_number(entry.value),
            entity_color(&entry.entity)
        ));
    }

    let hidden = standings.iter().filter(|e| e.rank >= capacity).count();
    if hidden > 0 {
        section.push_str(&format!(
            "\n*{} more {} below the top {}.*\n",
            hidden,
            if hidden == 1 { "entity" } else { "entities" },
            capacity
        ));
    }
    section.push('\n');

    section
}

/// Each change of the leading entity, in frame order.
pub fn leader_changes(frames: &[RecordedFrame]) -> Vec<&RecordedFrame> {
    let mut changes: Vec<&RecordedFrame> = Vec::new();

    for frame in frames {
        let Some(leader) = frame.visible.first() else {
            continue;
        };
        let changed = changes
            .last()
            .and_then(|prev| prev.visible.first())
            .map_or(true, |prev| prev.entity != leader.entity);
        if changed {
            changes.push(frame);
        }
    }

    changes
}

/// Generate the leader timeline section.
fn generate_leaders_section(frames: &[RecordedFrame]) -> String {
    let changes = leader_changes(frames);
    if changes.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Leader Timeline\n\n");
    section.push_str("| Date | Leader | Total |\n");
    section.push_str("|:---|:---|---:|\n");

    for frame in changes {
        if let Some(leader) = frame.visible.first() {
            section.push_str(&format!(
                "| {} | {} | {} |\n",
                format_date(&frame.date),
                leader.entity,
                format_number(leader.value)
            ));
        }
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Report generated by racechart*\n".to_string()
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Write a report to `path`, as JSON when `json` is set, Markdown otherwise.
pub fn write_report(report: &Report, path: &Path, json: bool) -> Result<()> {
    let content = if json {
        generate_json_report(report)?
    } else {
        generate_markdown_report(report)
    };

    std::fs::write(path, content)
        .with_context(|| format!("Failed to write report to {}", path.display()))
}
