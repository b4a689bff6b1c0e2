//! The optimization control console: policy edits, the request lifecycle
//! state machine, and the interactive session loop.

use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::client::{ClientError, SimulationBackend};
use crate::ledger::{ResultLedger, Tab};
use crate::model::SimulationResult;
use crate::output::table::{render_console_view, render_policy_panel};
use crate::policy::{PolicyControls, SimulationRequest, WeightAxis};

/// Lifecycle of the simulation request. A new trigger from either terminal
/// state discards it and moves straight back to `Running`; a trigger while
/// `Running` is refused.
#[derive(Debug, Clone, PartialEq)]
pub enum RunState {
    Idle,
    Running,
    Succeeded(ResultLedger),
    Failed(String),
}

impl RunState {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    pub fn ledger(&self) -> Option<&ResultLedger> {
        match self {
            Self::Succeeded(ledger) => Some(ledger),
            _ => None,
        }
    }
}

pub struct Console {
    backend: Arc<dyn SimulationBackend>,
    policy: PolicyControls,
    state: RunState,
}

impl Console {
    pub fn new(backend: Arc<dyn SimulationBackend>, policy: PolicyControls) -> Self {
        Self {
            backend,
            policy,
            state: RunState::Idle,
        }
    }

    pub fn policy(&self) -> &PolicyControls {
        &self.policy
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Controls stay editable in every lifecycle state, `Failed` included.
    pub fn set_weight(&mut self, axis: WeightAxis, value: f64) {
        self.policy.set_weight(axis, value);
    }

    pub fn set_budget(&mut self, value: f64) {
        self.policy.set_budget(value);
    }

    /// Local view transition only; never reaches the backend.
    pub fn select_tab(&mut self, tab: Tab) -> bool {
        match &mut self.state {
            RunState::Succeeded(ledger) => {
                ledger.select_tab(tab);
                true
            }
            _ => false,
        }
    }

    /// Freezes the current policy into a request and enters `Running`.
    /// Refused while a run is already in flight; an invalid budget settles
    /// the state to `Failed` without issuing a request.
    pub fn begin_run(&mut self) -> Option<SimulationRequest> {
        if self.state.is_running() {
            warn!("simulation already in flight, ignoring trigger");
            return None;
        }
        match self.policy.snapshot() {
            Ok(request) => {
                self.state = RunState::Running;
                Some(request)
            }
            Err(err) => {
                self.state = RunState::Failed(err.to_string());
                None
            }
        }
    }

    pub fn settle_ok(&mut self, result: SimulationResult) {
        // A fresh ledger starts on the Allocated tab, so every success
        // resets the tab regardless of where the operator left it.
        self.state = RunState::Succeeded(ResultLedger::new(result));
    }

    pub fn settle_err(&mut self, error: &ClientError) {
        self.state = RunState::Failed(error.to_string());
    }

    pub async fn run(&mut self) {
        let Some(request) = self.begin_run() else {
            return;
        };
        info!(
            budget = request.budget,
            w_rev = request.w_revenue,
            w_emp = request.w_employment,
            "running simulation"
        );
        match self.backend.run_simulation(&request).await {
            Ok(result) => {
                info!(funded = result.summary.total_funded, "simulation settled");
                self.settle_ok(result);
            }
            Err(error) => {
                warn!(%error, "simulation failed");
                self.settle_err(&error);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Help,
    Show,
    Run,
    Budget(f64),
    Weight(WeightAxis, f64),
    Tab(Tab),
    Quit,
    Unknown(String),
}

fn parse_command(line: &str) -> Option<Command> {
    let mut parts = line.split_whitespace();
    let head = parts.next()?;
    let arg = parts.next();
    let command = match (head.to_lowercase().as_str(), arg) {
        ("help" | "?", _) => Command::Help,
        ("show" | "view", _) => Command::Show,
        ("run" | "simulate", _) => Command::Run,
        ("quit" | "exit" | "q", _) => Command::Quit,
        ("budget", Some(raw)) => match raw.replace(',', "").parse::<f64>() {
            Ok(value) => Command::Budget(value),
            Err(_) => Command::Unknown(format!("not a number: {raw}")),
        },
        ("wrev", Some(raw)) => match raw.parse::<f64>() {
            Ok(value) => Command::Weight(WeightAxis::Revenue, value),
            Err(_) => Command::Unknown(format!("not a number: {raw}")),
        },
        ("wemp", Some(raw)) => match raw.parse::<f64>() {
            Ok(value) => Command::Weight(WeightAxis::Employment, value),
            Err(_) => Command::Unknown(format!("not a number: {raw}")),
        },
        ("tab", Some(raw)) => match Tab::parse(raw) {
            Some(tab) => Command::Tab(tab),
            None => Command::Unknown(format!("unknown tab: {raw}")),
        },
        _ => Command::Unknown(head.to_string()),
    };
    Some(command)
}

const HELP_TEXT: &str = "\
Commands:
  run                 trigger a simulation with the current policy
  budget <amount>     set the total pool budget
  wrev <0..1>         set the revenue weight (employment becomes 1 - value)
  wemp <0..1>         set the employment weight (revenue becomes 1 - value)
  tab <allocated|rejected|sectors>   switch the results view
  show                re-render the current view
  help                this text
  quit                leave the console";

/// Interactive session. Auto-invokes one run with the starting policy, then
/// reads commands until EOF or `quit`.
pub async fn run_interactive(
    backend: Arc<dyn SimulationBackend>,
    policy: PolicyControls,
) -> Result<()> {
    let mut console = Console::new(backend, policy);
    println!("Subsidy optimization console. Type 'help' for commands.");
    println!("{}", render_policy_panel(console.policy()));

    console.run().await;
    println!("{}", render_console_view(console.state()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let Some(command) = parse_command(&line) else {
            continue;
        };
        match command {
            Command::Help => println!("{HELP_TEXT}"),
            Command::Show => {
                println!("{}", render_policy_panel(console.policy()));
                println!("{}", render_console_view(console.state()));
            }
            Command::Run => {
                console.run().await;
                println!("{}", render_console_view(console.state()));
            }
            Command::Budget(value) => {
                console.set_budget(value);
                println!("{}", render_policy_panel(console.policy()));
            }
            Command::Weight(axis, value) => {
                console.set_weight(axis, value);
                println!("{}", render_policy_panel(console.policy()));
            }
            Command::Tab(tab) => {
                if console.select_tab(tab) {
                    println!("{}", render_console_view(console.state()));
                } else {
                    println!("No results yet; run a simulation first.");
                }
            }
            Command::Quit => break,
            Command::Unknown(what) => {
                println!("Unrecognized input '{what}'; type 'help' for commands.");
            }
        }
    }
    Ok(())
}
