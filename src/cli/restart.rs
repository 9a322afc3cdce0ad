//! Restart command - restart outdated sessions inside tmux

use super::RunContext;
use crate::agent::AgentAdapter;
use crate::reconcile::{reconcile, restart_candidates, ReconciledSession, SessionStatus};
use crate::restart::{RestartDriver, RestartOutcome, RestartTarget};
use crate::tui::{self, Picker, PickerInput, PickerOutcome};
use anyhow::Result;
use clap::Args;
use std::io::IsTerminal;
use tracing::debug;

/// Restart command arguments
#[derive(Args, Debug, Clone, Default)]
pub struct RestartArgs {
    /// Restart all sessions, even if current
    #[arg(long)]
    pub all: bool,

    /// Skip the interactive picker and restart the default selection
    #[arg(long, short)]
    pub yes: bool,
}

/// Result of one restart invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestartRun {
    /// Nothing eligible; the picker and driver were never started
    NothingToRestart,
    Cancelled,
    Completed(Vec<RestartOutcome>),
}

/// Scan, plan, select and restart.
///
/// With `interactive` unset the default selection (every session not busy) is committed.
pub fn run_restart(ctx: &RunContext, args: &RestartArgs, interactive: bool) -> Result<RestartRun> {
    let versions = ctx.resolve_versions(false);
    let sessions = reconcile(ctx.scan(), &versions);

    let manual = sessions
        .iter()
        .filter(|s| s.status == SessionStatus::OutdatedDetectionOnly)
        .count();
    if manual > 0 {
        ctx.printer.warn(&format!(
            "{} outdated session(s) are not in tmux and must be restarted manually",
            manual
        ));
    }

    let candidates = restart_candidates(&sessions, args.all);
    if candidates.is_empty() {
        return Ok(RestartRun::NothingToRestart);
    }

    let mut picker = Picker::new(candidates);
    let outcome = if interactive {
        tui::run(picker)?
    } else {
        for item in picker.items().iter().filter(|item| item.disabled) {
            ctx.printer.warn(&format!(
                "Skipping {}: session is busy",
                item.entry.session.label()
            ));
        }
        picker
            .handle(PickerInput::Confirm)
            .unwrap_or(PickerOutcome::Cancelled)
    };

    let selected = match outcome {
        PickerOutcome::Submitted(selected) => selected,
        PickerOutcome::Cancelled => return Ok(RestartRun::Cancelled),
    };

    if !ctx.printer.config().json && !selected.is_empty() {
        ctx.printer
            .info(&format!("Restarting {} session(s)...", selected.len()))?;
    }

    let driver = RestartDriver::new(ctx.mux.as_ref(), ctx.config.restart.clone());
    Ok(RestartRun::Completed(execute_restart(&selected, ctx, &driver)))
}

/// Restart the selected sessions one after another
pub fn execute_restart(
    selected: &[ReconciledSession],
    ctx: &RunContext,
    driver: &RestartDriver<'_>,
) -> Vec<RestartOutcome> {
    let mut outcomes = Vec::with_capacity(selected.len());

    for entry in selected {
        let session = &entry.session;
        let Some(name) = session.tmux_session.clone() else {
            debug!(pid = session.pid, "Session has no tmux name, skipping");
            continue;
        };

        let adapter: &dyn AgentAdapter = match ctx.adapter(session.agent) {
            Some(adapter) => adapter,
            None => {
                outcomes.push(RestartOutcome {
                    session: name,
                    success: false,
                    error: Some(format!("no adapter for {}", session.agent.id())),
                });
                continue;
            }
        };

        let target = RestartTarget {
            session_name: name,
            pane_id: session.pane_id.clone(),
            working_dir: session.working_dir.clone(),
        };
        outcomes.extend(driver.restart_all([(target, adapter)]));
    }

    outcomes
}

/// Handle `av restart`
pub fn handle_restart(ctx: &RunContext, args: &RestartArgs) -> Result<()> {
    let interactive = !args.yes
        && !ctx.printer.config().json
        && std::io::stdin().is_terminal()
        && std::io::stderr().is_terminal();

    let printer = &ctx.printer;
    let run = run_restart(ctx, args, interactive)?;

    if printer.config().json {
        let outcomes = match &run {
            RestartRun::Completed(outcomes) => outcomes.clone(),
            _ => Vec::new(),
        };
        return printer.json(&serde_json::json!({ "restarted": outcomes }));
    }

    match run {
        RestartRun::NothingToRestart => printer.success("All sessions are up to date"),
        RestartRun::Cancelled => printer.info("Cancelled, no sessions restarted"),
        RestartRun::Completed(outcomes) if outcomes.is_empty() => {
            printer.info("No sessions selected")
        }
        RestartRun::Completed(outcomes) => {
            for outcome in outcomes {
                match outcome.error {
                    None => printer.success(&format!("Restarted {}", outcome.session))?,
                    Some(error) => {
                        printer.warn(&format!("Failed to restart {}: {}", outcome.session, error))
                    }
                }
            }
            Ok(())
        }
    }
}
