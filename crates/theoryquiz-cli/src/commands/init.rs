//! The `theoryquiz init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("theoryquiz.toml").exists() {
        println!("theoryquiz.toml already exists, skipping.");
    } else {
        std::fs::write("theoryquiz.toml", SAMPLE_CONFIG)?;
        println!("Created theoryquiz.toml");
    }

    println!("\nNext steps:");
    println!("  1. Export OPENAI_API_KEY (or edit theoryquiz.toml)");
    println!("  2. Run: theoryquiz play");
    println!("  3. Or serve the HTTP API: theoryquiz serve");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# theoryquiz configuration

model = "gpt-4"
temperature = 0.7
max_tokens = 300
timeout_secs = 30

# "production" hides provider error detail from HTTP callers;
# "development" includes it in the response body.
environment = "production"

[provider]
type = "openai"
api_key = "${OPENAI_API_KEY}"

# Offline play without an API key:
# [provider]
# type = "mock"
# response = "Nice work! Keep going."

[server]
bind = "127.0.0.1:3000"
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_config_parses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("theoryquiz.toml");
        std::fs::write(&path, SAMPLE_CONFIG).unwrap();

        let config = theoryquiz_providers::load_config_from(Some(&path)).unwrap();
        assert_eq!(config.model, "gpt-4");
        assert_eq!(config.server.bind, "127.0.0.1:3000");
    }
}
