//! Specialized agents. Each one turns a prompt into a concrete tool action;
//! neither executes anything itself.

use serde_json::{json, Map};
use tracing::info;

use crate::policy::Action;

/// Proposes `web_search` actions for informational prompts.
pub struct ResearchAgent;

impl ResearchAgent {
    pub fn run(&self, prompt: &str) -> Action {
        let mut parameters = Map::new();
        parameters.insert("query".to_string(), json!(prompt));
        let action = Action::new("web_search", parameters);
        info!(tool = %action.tool, "ResearchAgent proposed action");
        action
    }
}

/// Proposes `creative_writing` actions for writing prompts.
pub struct CreativeAgent;

impl CreativeAgent {
    pub fn run(&self, prompt: &str) -> Action {
        let mut parameters = Map::new();
        parameters.insert("task".to_string(), json!(prompt));
        let action = Action::new("creative_writing", parameters);
        info!(tool = %action.tool, "CreativeAgent proposed action");
        action
    }
}
