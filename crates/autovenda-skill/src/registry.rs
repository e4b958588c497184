// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registry of skill definitions, indexed by name.

use std::collections::HashMap;
use std::path::Path;

use autovenda_core::AutovendaError;
use tracing::{debug, warn};

use crate::manifest::{load_manifest, SkillDefinition};

/// File name of a skill definition inside its directory.
pub const MANIFEST_FILE: &str = "skill.toml";

/// Immutable-after-load mapping from skill name to definition.
#[derive(Debug, Default, Clone)]
pub struct SkillRegistry {
    skills: HashMap<String, SkillDefinition>,
}

impl SkillRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every `<dir>/<skill>/skill.toml`.
    ///
    /// A broken definition is reported in the returned error list and
    /// skipped; the remaining skills still load.
    pub fn load(dir: &Path) -> (Self, Vec<AutovendaError>) {
        let mut registry = Self::new();
        let mut errors = Vec::new();

        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                errors.push(AutovendaError::RegistryLoad {
                    path: dir.display().to_string(),
                    message: format!("cannot read skills directory: {e}"),
                });
                return (registry, errors);
            }
        };

        let mut manifests: Vec<_> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path().join(MANIFEST_FILE))
            .filter(|path| path.is_file())
            .collect();
        manifests.sort();

        for path in manifests {
            match load_manifest(&path).and_then(|skill| registry.register(skill)) {
                Ok(()) => {}
                Err(e) => {
                    warn!(error = %e, "skipping skill definition");
                    errors.push(e);
                }
            }
        }

        debug!(count = registry.len(), dir = %dir.display(), "skill registry loaded");
        (registry, errors)
    }

    /// Adds a definition. Names must be unique.
    pub fn register(&mut self, skill: SkillDefinition) -> Result<(), AutovendaError> {
        if self.skills.contains_key(&skill.name) {
            return Err(AutovendaError::RegistryLoad {
                path: skill.name.clone(),
                message: format!("duplicate skill name '{}'", skill.name),
            });
        }
        self.skills.insert(skill.name.clone(), skill);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&SkillDefinition> {
        self.skills.get(name)
    }

    /// All definitions sorted by name.
    pub fn list(&self) -> Vec<&SkillDefinition> {
        let mut skills: Vec<_> = self.skills.values().collect();
        skills.sort_by(|a, b| a.name.cmp(&b.name));
        skills
    }

    pub fn iter(&self) -> impl Iterator<Item = &SkillDefinition> {
        self.skills.values()
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::Hook;
    use tempfile::tempdir;

    fn write_skill(dir: &Path, folder: &str, content: &str) {
        let skill_dir = dir.join(folder);
        std::fs::create_dir_all(&skill_dir).unwrap();
        std::fs::write(skill_dir.join(MANIFEST_FILE), content).unwrap();
    }

    #[test]
    fn broken_entry_does_not_disable_others() {
        let dir = tempdir().unwrap();
        write_skill(
            dir.path(),
            "proposals",
            "[skill]\nname = \"proposals\"\ntriggers = [\"plano\"]\nhook = \"proposal\"\n",
        );
        write_skill(dir.path(), "broken", "[skill\nname = ");
        write_skill(
            dir.path(),
            "brand",
            "[skill]\nname = \"brand_identity\"\ntriggers = [\"auto\"]\nhook = \"brand_guard\"\n",
        );
        std::fs::create_dir_all(dir.path().join("empty")).unwrap();

        let (registry, errors) = SkillRegistry::load(dir.path());
        assert_eq!(registry.len(), 2);
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], AutovendaError::RegistryLoad { .. }));
        assert_eq!(registry.get("proposals").unwrap().hook, Some(Hook::Proposal));
        assert!(registry.get("broken").is_none());
    }

    #[test]
    fn duplicate_names_keep_the_first() {
        let dir = tempdir().unwrap();
        write_skill(dir.path(), "a", "[skill]\nname = \"dup\"\ntitle = \"A\"\ntriggers = [\"x\"]\n");
        write_skill(dir.path(), "b", "[skill]\nname = \"dup\"\ntitle = \"B\"\ntriggers = [\"y\"]\n");

        let (registry, errors) = SkillRegistry::load(dir.path());
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("dup").unwrap().title, "A");
        assert!(errors[0].to_string().contains("duplicate"));
    }

    #[test]
    fn missing_directory_yields_empty_registry() {
        let (registry, errors) = SkillRegistry::load(Path::new("/nonexistent/skills"));
        assert!(registry.is_empty());
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn list_is_sorted() {
        let mut registry = SkillRegistry::new();
        for name in ["zeta", "alpha"] {
            registry
                .register(crate::manifest::parse_manifest(
                    &format!("[skill]\nname = \"{name}\"\ntriggers = [\"t\"]\n"),
                    name,
                )
                .unwrap())
                .unwrap();
        }
        let names: Vec<_> = registry.list().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }
}
