//! CLI output formatting for resolution and site checks.
//!
//! # Display Contract
//!
//! Every entity follows the same two-level pattern: a header line with a
//! positional index and the entity's identity (a target, a page path),
//! then indented context lines. The arrow `→` always points from what was
//! asked for to what it became.
//!
//! ## Candidates
//!
//! ```text
//! about/mission.html from /program/calendar.html (depth 1)
//!     001 ../about/mission.html
//!     002 /about/mission.html
//!     003 about/mission.html
//!     004 ../../about/mission.html
//! ```
//!
//! ## Resolve
//!
//! ```text
//!     ../about/mission.html: missing
//!     /about/mission.html: found
//! about/mission.html → /about/mission.html (probe)
//! ```
//!
//! ## Check
//!
//! ```text
//! 001 /index.html
//! 002 /program/calendar.html
//!     about/team.html: not found
//!
//! Documents
//!     /fellowship-data.json: ok
//!     /exhibition-data.json: invalid JSON: EOF while parsing
//!
//! Checked 2 pages, 1 unresolved link, 1 broken document
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure.

use crate::check::CheckReport;
use crate::resolve::{PageLocation, ProbeEvent, ProbeStatus, Resolution, Via};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, singular: &str, plural: &str) -> String {
    if n == 1 {
        format!("{} {}", n, singular)
    } else {
        format!("{} {}", n, plural)
    }
}

fn via_label(via: Via) -> &'static str {
    match via {
        Via::Passthrough => "absolute",
        Via::Declared => "base path",
        Via::Cache => "cached",
        Via::Probe => "probe",
    }
}

fn resolution_detail(resolution: &Resolution) -> String {
    match resolution {
        Resolution::Resolved { url, via } => format!("{} ({})", url, via_label(*via)),
        Resolution::NotFound => "not found".to_string(),
        Resolution::Cancelled => "cancelled".to_string(),
    }
}

// ============================================================================
// Candidates
// ============================================================================

/// Format the candidate list for a target as seen from a page.
pub fn format_candidates(
    location: &PageLocation,
    target: &str,
    candidates: &[String],
) -> Vec<String> {
    let mut lines = vec![format!(
        "{} from {} (depth {})",
        target,
        location.path(),
        location.depth()
    )];
    if candidates.is_empty() {
        lines.push(format!("{}(no candidates: not a symbolic target)", indent(1)));
    }
    for (i, candidate) in candidates.iter().enumerate() {
        lines.push(format!("{}{} {}", indent(1), format_index(i + 1), candidate));
    }
    lines
}

pub fn print_candidates(location: &PageLocation, target: &str, candidates: &[String]) {
    for line in format_candidates(location, target, candidates) {
        println!("{}", line);
    }
}

// ============================================================================
// Resolve
// ============================================================================

/// Format a single probe progress event.
pub fn format_probe_event(event: &ProbeEvent) -> String {
    let status = match &event.status {
        ProbeStatus::Found => "found".to_string(),
        ProbeStatus::Missing => "missing".to_string(),
        ProbeStatus::TimedOut => "timed out".to_string(),
        ProbeStatus::Failed(e) => format!("failed: {}", e),
    };
    format!("{}{}: {}", indent(1), event.candidate, status)
}

/// Format the final line of a resolution.
pub fn format_resolution(target: &str, resolution: &Resolution) -> String {
    match resolution {
        Resolution::Resolved { .. } => {
            format!("{} \u{2192} {}", target, resolution_detail(resolution))
        }
        _ => format!("{}: {}", target, resolution_detail(resolution)),
    }
}

pub fn print_resolution(target: &str, resolution: &Resolution) {
    println!("{}", format_resolution(target, resolution));
}

// ============================================================================
// Check
// ============================================================================

/// Format a site check report.
///
/// Pages list only their unresolved links; a page with none is a bare
/// header line.
pub fn format_check_report(report: &CheckReport) -> Vec<String> {
    let mut lines = Vec::new();

    for (i, page) in report.pages.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), page.page));
        for link in page.unresolved() {
            lines.push(format!(
                "{}{}: {}",
                indent(1),
                link.target,
                resolution_detail(&link.resolution)
            ));
        }
    }

    if !report.documents.is_empty() {
        lines.push(String::new());
        lines.push("Documents".to_string());
        for doc in &report.documents {
            let status = doc.error.as_deref().unwrap_or("ok");
            lines.push(format!("{}{}: {}", indent(1), doc.path, status));
        }
    }

    let broken = report.broken_documents().count();
    lines.push(String::new());
    lines.push(format!(
        "Checked {}, {}, {}",
        plural(report.pages.len(), "page", "pages"),
        plural(report.unresolved_count(), "unresolved link", "unresolved links"),
        plural(broken, "broken document", "broken documents"),
    ));
    lines
}

pub fn print_check_report(report: &CheckReport) {
    for line in format_check_report(report) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::{DocumentReport, LinkReport, PageReport};

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(100), "100");
    }

    #[test]
    fn plural_forms() {
        assert_eq!(plural(1, "page", "pages"), "1 page");
        assert_eq!(plural(0, "page", "pages"), "0 pages");
    }

    #[test]
    fn candidates_are_numbered() {
        let location = PageLocation::new("/program/calendar.html");
        let lines = format_candidates(
            &location,
            "about/mission.html",
            &["../about/mission.html".to_string(), "/about/mission.html".to_string()],
        );
        assert_eq!(
            lines,
            [
                "about/mission.html from /program/calendar.html (depth 1)",
                "    001 ../about/mission.html",
                "    002 /about/mission.html",
            ]
        );
    }

    #[test]
    fn absolute_target_has_no_candidates() {
        let location = PageLocation::new("/index.html");
        let lines = format_candidates(&location, "/about.html", &[]);
        assert_eq!(lines[1], "    (no candidates: not a symbolic target)");
    }

    #[test]
    fn probe_event_lines() {
        let event = ProbeEvent {
            target: "about/team.html".into(),
            candidate: "../about/team.html".into(),
            status: ProbeStatus::TimedOut,
        };
        assert_eq!(format_probe_event(&event), "    ../about/team.html: timed out");
    }

    #[test]
    fn resolution_lines() {
        let resolved = Resolution::Resolved {
            url: "../about/team.html".into(),
            via: Via::Probe,
        };
        assert_eq!(
            format_resolution("about/team.html", &resolved),
            "about/team.html \u{2192} ../about/team.html (probe)"
        );
        assert_eq!(
            format_resolution("#", &Resolution::NotFound),
            "#: not found"
        );
    }

    #[test]
    fn check_report_lists_only_failures() {
        let report = CheckReport {
            pages: vec![
                PageReport {
                    page: "/index.html".into(),
                    links: vec![LinkReport {
                        target: "about/team.html".into(),
                        resolution: Resolution::Resolved {
                            url: "about/team.html".into(),
                            via: Via::Probe,
                        },
                    }],
                },
                PageReport {
                    page: "/program/calendar.html".into(),
                    links: vec![LinkReport {
                        target: "about/team.html".into(),
                        resolution: Resolution::NotFound,
                    }],
                },
            ],
            documents: vec![DocumentReport {
                path: "/fellowship-data.json".into(),
                error: None,
            }],
        };
        let lines = format_check_report(&report);
        assert_eq!(
            lines,
            [
                "001 /index.html",
                "002 /program/calendar.html",
                "    about/team.html: not found",
                "",
                "Documents",
                "    /fellowship-data.json: ok",
                "",
                "Checked 2 pages, 1 unresolved link, 0 broken documents",
            ]
        );
    }
}
