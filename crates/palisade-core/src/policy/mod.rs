//! Action guardrail: decides whether a proposed `{tool, parameters}` action
//! is permitted under the loaded policy.
//!
//! Evaluation is pure and side-effect-free apart from logging, so one
//! guardrail can serve concurrent requests without locking.

pub mod store;
pub mod validators;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

pub use store::{
    DatabaseQueryRules, FileReaderRules, LoadOutcome, Policy, PolicyStore, ToolRules,
};

/// A structured action proposed by an agent for execution.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Action {
    #[serde(default)]
    pub tool: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

impl Action {
    pub fn new(tool: impl Into<String>, parameters: Map<String, Value>) -> Self {
        Self {
            tool: tool.into(),
            parameters,
        }
    }
}

/// Legality decision for one action, with a diagnostic reason on deny.
/// The reason is for logs and error messages only, never control flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Deny(String),
}

impl Verdict {
    pub fn is_denied(&self) -> bool {
        matches!(self, Verdict::Deny(_))
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Verdict::Allow => None,
            Verdict::Deny(reason) => Some(reason),
        }
    }
}

/// Evaluates actions against an immutable `Policy`.
pub struct ActionGuardrail {
    policy: Policy,
}

impl ActionGuardrail {
    pub fn new(policy: Policy) -> Self {
        Self { policy }
    }

    /// Decide whether `action` is permitted. Checks run in fixed order and
    /// short-circuit on the first deny:
    ///
    /// 1. the action must name a tool;
    /// 2. the tool must be allow-listed;
    /// 3. if the tool has a rule record, the matching validator must pass.
    ///
    /// An allow-listed tool with no rule record passes unconditionally.
    pub fn evaluate(&self, action: &Action) -> Verdict {
        if action.tool.is_empty() {
            warn!("Action denied: no tool specified");
            return Verdict::Deny("action does not specify a tool".to_string());
        }

        if !self.policy.allowed_tools.contains(&action.tool) {
            warn!(tool = %action.tool, "Action denied: tool not allow-listed");
            return Verdict::Deny(format!("tool '{}' is not allow-listed", action.tool));
        }

        let Some(rules) = self.policy.tool_rules.get(&action.tool) else {
            debug!(tool = %action.tool, "Action permitted: allow-listed, no tool rules");
            return Verdict::Allow;
        };

        let verdict = dispatch(rules, &action.parameters);
        match &verdict {
            Verdict::Allow => {
                debug!(tool = %action.tool, "Action permitted: passed tool rules");
            }
            Verdict::Deny(reason) => {
                warn!(tool = %action.tool, reason = %reason, "Action denied by tool rules");
            }
        }
        verdict
    }
}

/// Route a rule record to its validator. Adding a tool kind means adding a
/// variant to `ToolRules`, a validator, and an arm here; the compiler flags
/// any arm left out.
fn dispatch(rules: &ToolRules, params: &Map<String, Value>) -> Verdict {
    match rules {
        ToolRules::FileReader(r) => validators::validate_file_reader(params, r),
        ToolRules::DatabaseQuery(r) => validators::validate_database_query(params, r),
        // Rule record with no registered validator: inert once allow-listed.
        ToolRules::Unvalidated(_) => Verdict::Allow,
    }
}
