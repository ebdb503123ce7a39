use std::path::PathBuf;

use anyhow::{Context, Result};
use serde_json::{json, Map, Value};

use palisade_core::{Action, ActionGuardrail, PolicyStore, Verdict};

use crate::config::Config;

/// Evaluate a single action against the policy and report the verdict.
/// Returns an error (non-zero exit) when the action is denied, so the
/// command works in scripts and pre-deploy policy checks.
pub fn execute(
    policy: Option<PathBuf>,
    action_json: Option<String>,
    tool: Option<String>,
    params: Vec<String>,
    config: &Config,
) -> Result<()> {
    let policy_path = policy.unwrap_or_else(|| config.policy.expanded_path());
    let store = PolicyStore::load(&policy_path);
    if store.is_degraded() {
        println!(
            "warning: policy failed to load ({:?}); evaluating against the empty fail-closed policy",
            store.outcome
        );
    }

    let action = build_action(action_json, tool, params)?;
    let guardrail = ActionGuardrail::new(store.policy);

    match guardrail.evaluate(&action) {
        Verdict::Allow => {
            println!("ALLOW: {} {}", action.tool, Value::Object(action.parameters.clone()));
            Ok(())
        }
        Verdict::Deny(reason) => {
            println!("DENY: {}", reason);
            anyhow::bail!("action denied: {}", reason)
        }
    }
}

fn build_action(
    action_json: Option<String>,
    tool: Option<String>,
    params: Vec<String>,
) -> Result<Action> {
    if let Some(raw) = action_json {
        return serde_json::from_str(&raw).context("Failed to parse --action JSON");
    }

    let Some(tool) = tool else {
        anyhow::bail!("Provide either --action <json> or --tool <name>");
    };

    let mut parameters = Map::new();
    for pair in params {
        let (key, value) = pair
            .split_once('=')
            .with_context(|| format!("Invalid --param '{}', expected key=value", pair))?;
        parameters.insert(key.to_string(), json!(value));
    }

    Ok(Action::new(tool, parameters))
}
