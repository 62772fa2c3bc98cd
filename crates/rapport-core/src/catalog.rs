//! Criterion catalog and TOML fixtures.
//!
//! Fixtures seed a store with criteria, users and friendships. They are
//! loaded from TOML files or directories and validated before seeding.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{Criterion, Friendship, User, UserId};
use crate::traits::EvaluationStore;

/// Criteria every fresh installation starts with.
pub const DEFAULT_CRITERIA: &[&str] = &[
    "Honesty",
    "Humor",
    "Intelligence",
    "Kindness",
    "Reliability",
    "Wisdom",
];

/// Seed data for a store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fixture {
    pub criteria: Vec<String>,
    pub users: Vec<User>,
    pub friendships: Vec<Friendship>,
}

impl Fixture {
    /// A fixture holding only [`DEFAULT_CRITERIA`].
    pub fn default_criteria() -> Self {
        Self {
            criteria: DEFAULT_CRITERIA.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Deserialize)]
struct TomlFixture {
    #[serde(default)]
    criteria: Vec<TomlCriterion>,
    #[serde(default)]
    users: Vec<TomlUser>,
    #[serde(default)]
    friendships: Vec<TomlFriendship>,
}

#[derive(Debug, Deserialize)]
struct TomlCriterion {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TomlUser {
    id: UserId,
    username: String,
}

#[derive(Debug, Deserialize)]
struct TomlFriendship {
    from: UserId,
    to: UserId,
    #[serde(default = "default_true")]
    confirmed: bool,
}

fn default_true() -> bool {
    true
}

/// Parse a fixture file.
pub fn parse_fixture(path: &Path) -> Result<Fixture> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read fixture file: {}", path.display()))?;

    parse_fixture_str(&content, path)
}

/// Parse a TOML string into a `Fixture`.
pub fn parse_fixture_str(content: &str, source_path: &Path) -> Result<Fixture> {
    let parsed: TomlFixture = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    Ok(Fixture {
        criteria: parsed
            .criteria
            .into_iter()
            .map(|c| c.name.trim().to_string())
            .collect(),
        users: parsed
            .users
            .into_iter()
            .map(|u| User {
                id: u.id,
                username: u.username,
            })
            .collect(),
        friendships: parsed
            .friendships
            .into_iter()
            .map(|f| Friendship {
                from_user: f.from,
                to_user: f.to,
                confirmed: f.confirmed,
            })
            .collect(),
    })
}

/// Recursively load and merge every `.toml` fixture in a directory.
///
/// Files that fail to parse are skipped with a warning.
pub fn load_fixture_directory(dir: &Path) -> Result<Fixture> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries: Vec<_> = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    let mut merged = Fixture::default();
    for entry in entries {
        let path = entry.path();
        let fixture = if path.is_dir() {
            load_fixture_directory(&path)?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_fixture(&path) {
                Ok(f) => f,
                Err(e) => {
                    tracing::warn!("skipping {}: {}", path.display(), e);
                    continue;
                }
            }
        } else {
            continue;
        };
        merged.criteria.extend(fixture.criteria);
        merged.users.extend(fixture.users);
        merged.friendships.extend(fixture.friendships);
    }

    Ok(merged)
}

/// Load a fixture from a file or a directory.
pub fn load_fixture(path: &Path) -> Result<Fixture> {
    if path.is_dir() {
        load_fixture_directory(path)
    } else {
        parse_fixture(path)
    }
}

/// A warning from fixture validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureWarning {
    pub message: String,
}

/// Validate a fixture for common issues.
pub fn validate_fixture(fixture: &Fixture) -> Vec<FixtureWarning> {
    let mut warnings = Vec::new();
    let mut warn = |message: String| warnings.push(FixtureWarning { message });

    let mut seen_names = HashSet::new();
    for name in &fixture.criteria {
        if name.trim().is_empty() {
            warn("criterion name is empty".into());
        } else if !seen_names.insert(Criterion::name_key(name)) {
            warn(format!("duplicate criterion: {name}"));
        }
    }

    let mut usernames: HashMap<UserId, &str> = HashMap::new();
    for user in &fixture.users {
        if usernames.insert(user.id, &user.username).is_some() {
            warn(format!("duplicate user id: {}", user.id));
        }
    }

    for f in &fixture.friendships {
        if f.from_user == f.to_user {
            warn(format!("user {} is friends with themself", f.from_user));
        }
        for id in [f.from_user, f.to_user] {
            if !usernames.contains_key(&id) {
                warn(format!("friendship references unknown user {id}"));
            }
        }
    }

    warnings
}

/// Counts reported by [`seed`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub criteria_created: usize,
    pub criteria_existing: usize,
    pub users: usize,
    pub friendships: usize,
}

/// Write a fixture into a store. Existing criteria are left untouched.
pub async fn seed(store: &dyn EvaluationStore, fixture: &Fixture) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    for name in fixture.criteria.iter().filter(|n| !n.trim().is_empty()) {
        let (criterion, created) = store.get_or_create_criterion(name).await?;
        if created {
            tracing::info!(id = criterion.id, name = %criterion.name, "created criterion");
            report.criteria_created += 1;
        } else {
            report.criteria_existing += 1;
        }
    }

    for user in &fixture.users {
        store.upsert_user(user.clone()).await?;
        report.users += 1;
    }

    for friendship in &fixture.friendships {
        store.add_friendship(friendship.clone()).await?;
        report.friendships += 1;
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const VALID_TOML: &str = r#"
[[criteria]]
name = "Humor"

[[criteria]]
name = "Wisdom"

[[users]]
id = 1
username = "ana"

[[users]]
id = 2
username = "ben"

[[friendships]]
from = 1
to = 2
"#;

    #[test]
    fn parse_valid_toml() {
        let fixture = parse_fixture_str(VALID_TOML, &PathBuf::from("test.toml")).unwrap();
        assert_eq!(fixture.criteria, vec!["Humor", "Wisdom"]);
        assert_eq!(fixture.users.len(), 2);
        assert_eq!(fixture.users[1].username, "ben");
        assert!(fixture.friendships[0].confirmed);
        assert!(validate_fixture(&fixture).is_empty());
    }

    #[test]
    fn parse_empty_fixture() {
        let fixture = parse_fixture_str("", &PathBuf::from("empty.toml")).unwrap();
        assert_eq!(fixture, Fixture::default());
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "[[criteria]\nname = ";
        assert!(parse_fixture_str(bad, &PathBuf::from("bad.toml")).is_err());
    }

    #[test]
    fn validate_duplicate_criteria_case_insensitive() {
        let fixture = Fixture {
            criteria: vec!["Humor".into(), "humor".into(), "".into()],
            ..Default::default()
        };
        let warnings = validate_fixture(&fixture);
        assert!(warnings.iter().any(|w| w.message.contains("duplicate criterion")));
        assert!(warnings.iter().any(|w| w.message.contains("empty")));
    }

    #[test]
    fn validate_duplicate_criteria_non_ascii() {
        let fixture = Fixture {
            criteria: vec!["Élan".into(), " élan".into(), "Elan".into()],
            ..Default::default()
        };
        let warnings = validate_fixture(&fixture);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].message, "duplicate criterion:  élan");
    }

    #[test]
    fn validate_friendships() {
        let fixture = Fixture {
            users: vec![User {
                id: 1,
                username: "ana".into(),
            }],
            friendships: vec![
                Friendship {
                    from_user: 1,
                    to_user: 1,
                    confirmed: true,
                },
                Friendship {
                    from_user: 1,
                    to_user: 7,
                    confirmed: false,
                },
            ],
            ..Default::default()
        };
        let warnings = validate_fixture(&fixture);
        assert!(warnings.iter().any(|w| w.message.contains("themself")));
        assert!(warnings.iter().any(|w| w.message.contains("unknown user 7")));
    }

    #[test]
    fn load_directory_merges_and_skips_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.toml"), VALID_TOML).unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(
            dir.path().join("nested/b.toml"),
            "[[criteria]]\nname = \"Kindness\"\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("broken.toml"), "not [valid").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let fixture = load_fixture(dir.path()).unwrap();
        assert_eq!(fixture.criteria, vec!["Humor", "Wisdom", "Kindness"]);
        assert_eq!(fixture.users.len(), 2);
    }

    #[test]
    fn default_catalog_is_valid() {
        let fixture = Fixture::default_criteria();
        assert_eq!(fixture.criteria.len(), DEFAULT_CRITERIA.len());
        assert!(validate_fixture(&fixture).is_empty());
    }
}
