//! The `rapport init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("rapport.toml").exists() {
        println!("rapport.toml already exists, skipping.");
    } else {
        std::fs::write("rapport.toml", SAMPLE_CONFIG)?;
        println!("Created rapport.toml");
    }

    std::fs::create_dir_all("fixtures")?;
    let example_path = std::path::Path::new("fixtures/example.toml");
    if example_path.exists() {
        println!("fixtures/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_FIXTURE)?;
        println!("Created fixtures/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Run: rapport validate --fixture fixtures/example.toml");
    println!("  2. Run: rapport seed --fixture fixtures/example.toml");
    println!("  3. Run: rapport serve");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# rapport configuration

[store]
type = "json"
path = "./rapport-data.json"

[server]
bind = "127.0.0.1:8080"

[evaluations]
# Ratings a user must give before their own summary unlocks.
threshold = 10
page_size = 20
familiarity_weighting = true
# Scale raters by reliability and how often they score 1 or 10.
rater_weighting = false
# "everyone" or "confirmed_friends"
task_scope = "everyone"
"#;

const EXAMPLE_FIXTURE: &str = r#"[[criteria]]
name = "Honesty"

[[criteria]]
name = "Humor"

[[criteria]]
name = "Intelligence"

[[criteria]]
name = "Kindness"

[[criteria]]
name = "Reliability"

[[criteria]]
name = "Wisdom"

[[users]]
id = 1
username = "alice"

[[users]]
id = 2
username = "bob"

[[users]]
id = 3
username = "carol"

[[friendships]]
from = 1
to = 2

[[friendships]]
from = 2
to = 3
confirmed = false
"#;
