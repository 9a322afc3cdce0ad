//! CLI command handling

pub mod check;
pub mod output;
pub mod restart;
pub mod status;

pub use check::handle_check;
pub use output::Printer;
pub use restart::{execute_restart, handle_restart, RestartArgs};
pub use status::{build_status_report, handle_status};

use crate::agent::{all_adapters, AgentAdapter, AgentKind};
use crate::config::{Config, OutputConfig};
use crate::infra::{HttpFetcher, Multiplexer, ProcessSource, SystemProcessSource, TmuxManager};
use crate::reconcile::InstalledVersionSet;
use crate::scan::{scan_sessions, Session};
use tracing::warn;

/// Everything one command invocation needs: configuration, output and collaborators
pub struct RunContext {
    pub config: Config,
    pub printer: Printer,
    /// Skip remote version lookups
    pub no_fetch: bool,
    pub adapters: Vec<Box<dyn AgentAdapter>>,
    pub processes: Box<dyn ProcessSource>,
    pub mux: Box<dyn Multiplexer>,
}

impl RunContext {
    /// Context backed by the real process table and tmux
    pub fn system(config: Config, output: OutputConfig, no_fetch: bool) -> Self {
        Self {
            adapters: all_adapters(&config),
            config,
            printer: Printer::new(output),
            no_fetch,
            processes: Box::new(SystemProcessSource::new()),
            mux: Box::new(TmuxManager::new()),
        }
    }

    pub fn adapter(&self, kind: AgentKind) -> Option<&dyn AgentAdapter> {
        self.adapters
            .iter()
            .find(|adapter| adapter.kind() == kind)
            .map(|adapter| adapter.as_ref())
    }

    /// Installed versions, plus latest versions when `fetch` is set and not disabled
    pub fn resolve_versions(&self, fetch: bool) -> InstalledVersionSet {
        if !fetch || self.no_fetch {
            return InstalledVersionSet::resolve(&self.adapters, None);
        }

        match HttpFetcher::new(self.config.fetch_timeout()) {
            Ok(http) => InstalledVersionSet::resolve(&self.adapters, Some(&http)),
            Err(e) => {
                warn!(error = %e, "HTTP client unavailable, skipping latest versions");
                InstalledVersionSet::resolve(&self.adapters, None)
            }
        }
    }

    /// Locate sessions, attach pane metadata and classify activity
    pub fn scan(&self) -> Vec<Session> {
        scan_sessions(
            &self.adapters,
            self.processes.as_ref(),
            self.mux.as_ref(),
            self.config.capture_lines,
        )
    }
}
