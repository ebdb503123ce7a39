use anyhow::Result;
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# Palisade Configuration

[gateway]
host = "127.0.0.1"
port = 8080
# api_token = "change-me"   # uncomment to require bearer auth
max_requests_per_minute = 120
allowed_origins = []

[policy]
path = "policy.toml"

[screen]
text_model = "facebook/bart-large-mnli"
image_model = "Falconsai/nsfw_image_detection"
nsfw_threshold = 0.8
"#;

const DEFAULT_POLICY: &str = r#"# Palisade action policy.
# A tool absent from allowed_tools is always denied; an allow-listed tool
# with no tool_rules entry is unconditionally permitted.

allowed_tools = ["web_search", "creative_writing", "file_reader", "database_query"]

[tool_rules.file_reader]
disallowed_extensions = [".yaml", ".env", ".pem"]
allowed_paths = ["/data/public"]

[tool_rules.database_query]
forbidden_keywords = ["DROP", "DELETE", "TRUNCATE", "ALTER"]
"#;

/// Initialize a new config file plus a starter policy next to it
pub fn run_init(path: &Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!("Config already exists at {:?}", path);
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, DEFAULT_CONFIG)?;
    println!("Created config at {:?}", path);

    let policy_path = path.with_file_name("policy.toml");
    if policy_path.exists() {
        println!("Policy already exists at {:?}, leaving it alone", policy_path);
    } else {
        std::fs::write(&policy_path, DEFAULT_POLICY)?;
        println!("Created starter policy at {:?}", policy_path);
    }

    Ok(())
}
