//! Assigns sanitized aliases to a batch of target cells.
//!
//! The assigner never aborts: every request yields exactly one
//! [`AssignmentResult`], in input order. Aliases claimed by several targets,
//! or already held by another cell, fail as a group and the host is not
//! called for any member of that group. A target requested more than once
//! fails for every request naming it, since a cell holds one alias.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::Hash;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::easyalias::tools::sanitize::{Alias, extract_custom_alias, sanitize};

/// Collaborator owning the alias namespace and the target cells.
pub trait AliasHost {
    /// Opaque reference to a target cell.
    type Target: Clone + Eq + Hash + fmt::Debug + fmt::Display;

    /// Names already taken in the host's namespace, mapped to the target
    /// holding each. `None` marks a name taken by something other than a cell.
    fn existing_aliases(&self) -> HashMap<String, Option<Self::Target>>;

    /// Key under which two aliases count as the same name. Exact by default.
    fn alias_key(&self, alias: &str) -> String {
        alias.to_string()
    }

    /// Assigns `alias` to `target`. The error string is reported verbatim.
    fn set_alias(&mut self, target: &Self::Target, alias: &Alias) -> Result<(), String>;
}

/// Source text paired with the cell that should receive its alias.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentRequest<T> {
    pub text: String,
    pub target: T,
}

impl<T> AssignmentRequest<T> {
    pub fn new(text: impl Into<String>, target: T) -> Self {
        Self {
            text: text.into(),
            target,
        }
    }
}

/// Why a single request did not receive an alias.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssignmentFailure<T> {
    /// Nothing usable was left after sanitization.
    #[error("empty source text")]
    EmptySource,

    /// The alias is claimed by more than one target, or already held by
    /// another cell. `conflicts` lists every target involved.
    #[error("duplicate alias: {alias}")]
    Duplicate { alias: Alias, conflicts: Vec<T> },

    /// The same target appears in more than one request of the batch.
    #[error("target cell requested more than once (alias {alias})")]
    RepeatedTarget { alias: Alias },

    /// The host rejected the assignment.
    #[error("{reason}")]
    Host { alias: Alias, reason: String },
}

impl<T> AssignmentFailure<T> {
    /// Short machine-friendly name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            AssignmentFailure::EmptySource => "empty",
            AssignmentFailure::Duplicate { .. } => "duplicate",
            AssignmentFailure::RepeatedTarget { .. } => "repeated_target",
            AssignmentFailure::Host { .. } => "host",
        }
    }

    pub fn alias(&self) -> Option<&Alias> {
        match self {
            AssignmentFailure::EmptySource => None,
            AssignmentFailure::Duplicate { alias, .. }
            | AssignmentFailure::RepeatedTarget { alias }
            | AssignmentFailure::Host { alias, .. } => Some(alias),
        }
    }
}

/// Outcome of one request.
#[derive(Debug, Clone, PartialEq)]
pub enum AssignmentResult<T> {
    Success(Alias),
    Failure(AssignmentFailure<T>),
}

impl<T> AssignmentResult<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, AssignmentResult::Success(_))
    }
}

/// Tunables for a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignOptions {
    /// Use the text inside the trailing `( )` pair as the alias source.
    pub custom_alias: bool,
}

impl Default for AssignOptions {
    fn default() -> Self {
        Self { custom_alias: true }
    }
}

/// Runs sanitization, collision detection and assignment over a batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchAssigner {
    options: AssignOptions,
}

impl BatchAssigner {
    pub fn new(options: AssignOptions) -> Self {
        Self { options }
    }

    /// Derives the alias a request would receive, ignoring collisions.
    pub fn candidate(&self, text: &str) -> Option<Alias> {
        let source = if self.options.custom_alias {
            extract_custom_alias(text).unwrap_or(text)
        } else {
            text
        };
        sanitize(source).ok()
    }

    /// Processes `requests` against `host` and returns one result per request.
    #[instrument(level = "info", skip_all, fields(requests = requests.len()))]
    pub fn assign<H: AliasHost>(
        &self,
        host: &mut H,
        requests: &[AssignmentRequest<H::Target>],
    ) -> Vec<AssignmentResult<H::Target>> {
        let candidates: Vec<Option<Alias>> = requests
            .iter()
            .map(|request| self.candidate(&request.text))
            .collect();
        let keys: Vec<Option<String>> = candidates
            .iter()
            .map(|candidate| candidate.as_ref().map(|alias| host.alias_key(alias.as_str())))
            .collect();

        let mut claims: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (index, key) in keys.iter().enumerate() {
            if let Some(key) = key {
                claims.entry(key.as_str()).or_default().push(index);
            }
        }

        let mut target_uses: HashMap<&H::Target, usize> = HashMap::new();
        for request in requests {
            *target_uses.entry(&request.target).or_default() += 1;
        }

        let existing: HashMap<String, Option<H::Target>> = host
            .existing_aliases()
            .into_iter()
            .map(|(name, holder)| (host.alias_key(&name), holder))
            .collect();
        debug!(
            distinct_aliases = claims.len(),
            existing_aliases = existing.len(),
            "collected alias claims"
        );

        let mut results = Vec::with_capacity(requests.len());
        for (index, (candidate, key)) in candidates.iter().zip(&keys).enumerate() {
            let request = &requests[index];
            let (Some(alias), Some(key)) = (candidate, key) else {
                warn!(target_cell = %request.target, "source text is empty after sanitization");
                results.push(AssignmentResult::Failure(AssignmentFailure::EmptySource));
                continue;
            };

            if target_uses.get(&request.target).copied().unwrap_or_default() > 1 {
                warn!(%alias, target_cell = %request.target, "target cell requested more than once");
                results.push(AssignmentResult::Failure(AssignmentFailure::RepeatedTarget {
                    alias: alias.clone(),
                }));
                continue;
            }

            let claimants = claims
                .get(key.as_str())
                .map(Vec::as_slice)
                .unwrap_or_default();
            let (occupied, holder) = match existing.get(key) {
                Some(Some(holder)) if *holder == request.target => (false, None),
                Some(Some(holder)) => (true, Some(holder)),
                Some(None) => (true, None),
                None => (false, None),
            };

            if claimants.len() > 1 || occupied {
                let mut conflicts: Vec<H::Target> = claimants
                    .iter()
                    .map(|&claimant| requests[claimant].target.clone())
                    .collect();
                if let Some(holder) = holder.filter(|holder| !conflicts.contains(*holder)) {
                    conflicts.push(holder.clone());
                }
                warn!(%alias, conflicts = conflicts.len(), "duplicate alias");
                results.push(AssignmentResult::Failure(AssignmentFailure::Duplicate {
                    alias: alias.clone(),
                    conflicts,
                }));
                continue;
            }

            match host.set_alias(&request.target, alias) {
                Ok(()) => {
                    debug!(%alias, target_cell = %request.target, "alias assigned");
                    results.push(AssignmentResult::Success(alias.clone()));
                }
                Err(reason) => {
                    warn!(%alias, target_cell = %request.target, %reason, "host rejected alias");
                    results.push(AssignmentResult::Failure(AssignmentFailure::Host {
                        alias: alias.clone(),
                        reason,
                    }));
                }
            }
        }

        results
    }
}

/// Shorthand for `BatchAssigner::default().assign(host, requests)`.
pub fn assign<H: AliasHost>(
    host: &mut H,
    requests: &[AssignmentRequest<H::Target>],
) -> Vec<AssignmentResult<H::Target>> {
    BatchAssigner::default().assign(host, requests)
}
