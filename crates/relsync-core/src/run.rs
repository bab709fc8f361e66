//! Per-repository bookkeeping for fleet runs.
//!
//! Both workflows walk the fleet in order. Whether a failing repository stops
//! the run or is recorded and skipped is a [`RunPolicy`], not a property of
//! the workflow.

use std::fmt;
use std::ops::ControlFlow;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunPolicy {
    /// Stop at the first repository that fails.
    FailFast,
    /// Record the failure and move on to the next repository.
    ContinueOnError,
}

impl fmt::Display for RunPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::FailFast => "fail-fast",
            Self::ContinueOnError => "continue-on-error",
        })
    }
}

impl std::str::FromStr for RunPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fail-fast" => Ok(Self::FailFast),
            "continue-on-error" => Ok(Self::ContinueOnError),
            other => Err(format!(
                "unknown run policy '{other}' (expected fail-fast or continue-on-error)"
            )),
        }
    }
}

/// What happened to one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryOutcome {
    Succeeded { repository: String, detail: String },
    Failed { repository: String, error: String },
}

impl RepositoryOutcome {
    pub fn repository(&self) -> &str {
        match self {
            Self::Succeeded { repository, .. } | Self::Failed { repository, .. } => repository,
        }
    }
}

/// Collects outcomes while walking the fleet and applies the run policy.
#[derive(Debug)]
pub struct FleetRun {
    policy: RunPolicy,
    outcomes: Vec<RepositoryOutcome>,
    halted: bool,
}

impl FleetRun {
    pub fn new(policy: RunPolicy) -> Self {
        Self {
            policy,
            outcomes: Vec::new(),
            halted: false,
        }
    }

    /// Record one repository's result.
    ///
    /// Returns [`ControlFlow::Break`] when the policy says the run must stop.
    pub fn record<T, E>(&mut self, repository: &str, result: Result<T, E>) -> ControlFlow<()>
    where
        T: fmt::Display,
        E: fmt::Display,
    {
        match result {
            Ok(detail) => {
                tracing::info!(repository, %detail, "repository done");
                self.outcomes.push(RepositoryOutcome::Succeeded {
                    repository: repository.to_owned(),
                    detail: detail.to_string(),
                });
                ControlFlow::Continue(())
            }
            Err(error) => {
                tracing::warn!(repository, %error, policy = %self.policy, "repository failed");
                self.outcomes.push(RepositoryOutcome::Failed {
                    repository: repository.to_owned(),
                    error: error.to_string(),
                });
                match self.policy {
                    RunPolicy::FailFast => {
                        self.halted = true;
                        ControlFlow::Break(())
                    }
                    RunPolicy::ContinueOnError => ControlFlow::Continue(()),
                }
            }
        }
    }

    pub fn finish(self) -> RunReport {
        RunReport {
            outcomes: self.outcomes,
            halted: self.halted,
        }
    }
}

#[derive(Debug)]
pub struct RunReport {
    pub outcomes: Vec<RepositoryOutcome>,
    /// Set when a failure stopped the run before the end of the fleet.
    pub halted: bool,
}

impl RunReport {
    pub fn failures(&self) -> impl Iterator<Item = &RepositoryOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, RepositoryOutcome::Failed { .. }))
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for outcome in &self.outcomes {
            match outcome {
                RepositoryOutcome::Succeeded { repository, detail } => {
                    writeln!(f, "  OK  {repository:<40} {detail}")?;
                }
                RepositoryOutcome::Failed { repository, error } => {
                    writeln!(f, "  NG  {repository:<40} {error}")?;
                }
            }
        }
        if self.halted {
            writeln!(f, "  (stopped after first failure)")?;
        }
        Ok(())
    }
}
