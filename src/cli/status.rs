//! Default command - installed versions and running sessions

use super::RunContext;
use crate::reconcile::{reconcile, InstalledVersionSet, StatusReport};
use anyhow::Result;

/// Resolve versions, scan sessions and reconcile them into a report
pub fn build_status_report(ctx: &RunContext) -> (StatusReport, InstalledVersionSet) {
    let versions = ctx.resolve_versions(true);
    let sessions = reconcile(ctx.scan(), &versions);
    (StatusReport::new(&versions, sessions), versions)
}

/// Handle the default (no subcommand) status report
pub fn handle_status(ctx: &RunContext) -> Result<()> {
    let (report, versions) = build_status_report(ctx);
    let printer = &ctx.printer;

    if printer.config().json {
        return printer.json(&report);
    }

    let mut out = printer.header("Installed Versions");
    for kind in versions.kinds() {
        if let Some(entry) = versions.get(kind) {
            out.push_str(&printer.version_line(kind, entry, versions.fetched()));
        }
    }
    out.push('\n');

    out.push_str(&printer.header("Running Sessions"));
    out.push_str(&printer.session_table(&report.sessions));
    if let Some(hint) = printer.restart_hint(report.needs_restart) {
        out.push_str(&hint);
    }

    printer.print(&out)
}
