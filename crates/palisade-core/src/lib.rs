pub mod policy;
pub mod router;
pub mod screen;

pub use policy::{
    Action, ActionGuardrail, DatabaseQueryRules, FileReaderRules, LoadOutcome, Policy,
    PolicyStore, ToolRules, Verdict,
};
pub use router::Router;
pub use screen::{fetch_image, HfScreener, ScreenVerdict, Screener};

/// Initialize structured JSON logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    fmt()
        .json()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
}
