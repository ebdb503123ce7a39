//! Keyword task router: turns a natural-language prompt into a candidate
//! action for the guardrail to judge.

pub mod agents;

use tracing::info;

use crate::policy::Action;
use agents::{CreativeAgent, ResearchAgent};

/// Prompts containing any of these route to the creative agent; everything
/// else defaults to research.
const CREATIVE_KEYWORDS: [&str; 6] = ["write", "create", "tell me a", "poem", "joke", "story"];

/// Delegates prompts to a specialized agent based on simple keyword matching.
pub struct Router {
    research: ResearchAgent,
    creative: CreativeAgent,
}

impl Router {
    pub fn new() -> Self {
        Self {
            research: ResearchAgent,
            creative: CreativeAgent,
        }
    }

    /// Pick an agent for the prompt and return its proposed action.
    pub fn route(&self, prompt: &str) -> Action {
        let lower = prompt.to_lowercase();

        if CREATIVE_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
            info!("Routing prompt to creative agent");
            self.creative.run(prompt)
        } else {
            info!("Routing prompt to research agent");
            self.research.run(prompt)
        }
    }

    /// Name of the agent that produced the given action, for responses.
    pub fn agent_name_for(action: &Action) -> &'static str {
        match action.tool.as_str() {
            "web_search" => "ResearchAgent",
            "creative_writing" => "CreativeAgent",
            _ => "Unknown",
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
