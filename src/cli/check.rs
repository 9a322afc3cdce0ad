//! Check command - installed and latest versions, no process scan

use super::RunContext;
use crate::reconcile::CheckReport;
use anyhow::Result;

/// Handle `av check`
pub fn handle_check(ctx: &RunContext) -> Result<()> {
    let versions = ctx.resolve_versions(true);
    let printer = &ctx.printer;

    if printer.config().json {
        return printer.json(&CheckReport::new(&versions));
    }

    let mut out = String::new();
    for kind in versions.kinds() {
        if let Some(entry) = versions.get(kind) {
            out.push_str(&printer.version_line(kind, entry, versions.fetched()));
        }
    }
    printer.print(&out)
}
