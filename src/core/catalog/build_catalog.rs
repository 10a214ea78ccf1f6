// Static reference data for the wizards: classes and their builds, plus the
// fixed seriousness and timezone option lists.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One selectable option in a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub label: String,
    pub description: String,
}

impl Choice {
    pub fn new(label: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            description: description.into(),
        }
    }
}

pub const PLAYER_SERIOUSNESS: &[(&str, &str)] = &[
    ("Noob", "Still learning, need to take it slow..."),
    ("Casual", "Just here to have fun"),
    ("Serious", "I like to win, but it's not everything"),
    ("RaceTo99", "All in, ladder reset is serious business!"),
];

pub const ROLE_SERIOUSNESS: &[(&str, &str)] = &[
    ("Casual", "Just here to have fun"),
    ("Serious", "I like to win, but it's not everything"),
    ("Hardcore", "All in, ladder reset is serious business!"),
];

pub const TIMEZONES: &[(&str, &str)] = &[
    ("EST", "Eastern"),
    ("CST", "Central"),
    ("MTN", "Mountain"),
    ("PST", "Pacific"),
    ("AST", "Australia"),
    ("CET", "Central European"),
    ("EET", "Eastern European"),
    ("GMT", "Greenwich Mean"),
    ("JST", "Japan Standard"),
    ("CHS", "China Standard"),
];

pub fn choices(options: &[(&str, &str)]) -> Vec<Choice> {
    options
        .iter()
        .map(|(label, description)| Choice::new(*label, *description))
        .collect()
}

/// `builds.json`: `{ "classes": { "<class>": ["<build>", ...] } }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildCatalog {
    #[serde(default)]
    pub classes: BTreeMap<String, Vec<String>>,
}

impl BuildCatalog {
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn class_choices(&self) -> Vec<Choice> {
        self.classes
            .keys()
            .map(|class| Choice::new(class.as_str(), format!("{class} class")))
            .collect()
    }

    /// Builds for `class`, or `None` for a class the catalog does not know.
    pub fn build_choices(&self, class: &str) -> Option<Vec<Choice>> {
        self.classes.get(class).map(|builds| {
            builds
                .iter()
                .map(|build| Choice::new(build.as_str(), format!("{build} build")))
                .collect()
        })
    }

    /// Catalog used when no `builds.json` is present.
    pub fn fallback() -> Self {
        let entries: &[(&str, &[&str])] = &[
            ("Amazon", &["Javazon", "Bowazon", "Strafazon"]),
            ("Assassin", &["Trapsin", "Martial Arts", "Hybrid"]),
            ("Barbarian", &["Whirlwind", "Frenzy", "Singer"]),
            ("Druid", &["Wind", "Fire", "Summon", "Fury"]),
            ("Necromancer", &["Summoner", "Bone", "Poison"]),
            ("Paladin", &["Hammerdin", "Smiter", "Zealot", "Auradin"]),
            ("Sorceress", &["Blizzard", "Lightning", "Fire", "Enchant"]),
        ];

        let classes = entries
            .iter()
            .map(|(class, builds)| {
                (
                    class.to_string(),
                    builds.iter().map(|b| b.to_string()).collect(),
                )
            })
            .collect();
        Self { classes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_choices_follow_class() {
        let catalog = BuildCatalog::fallback();
        let builds = catalog.build_choices("Paladin").unwrap();
        let labels: Vec<_> = builds.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Hammerdin", "Smiter", "Zealot", "Auradin"]);
        assert!(catalog.build_choices("Warlock").is_none());
    }

    #[test]
    fn test_catalog_parses_builds_file() {
        let raw = r#"{ "classes": { "Warrior": ["Sword", "Axe"], "Mage": ["Frost"] } }"#;
        let catalog: BuildCatalog = serde_json::from_str(raw).unwrap();
        let classes: Vec<_> = catalog
            .class_choices()
            .into_iter()
            .map(|c| c.label)
            .collect();
        assert_eq!(classes, vec!["Mage", "Warrior"]);
        assert_eq!(catalog.build_choices("Warrior").unwrap()[1].description, "Axe build");
    }
}
