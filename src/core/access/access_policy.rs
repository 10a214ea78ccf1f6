// Command gating by authorization group. The Discord layer resolves the
// caller's role names; this module only decides.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Captain,
    Council,
}

#[derive(Debug, Clone)]
pub struct AccessPolicy {
    captain_group: String,
    council_group: String,
}

impl AccessPolicy {
    pub fn new(captain_group: impl Into<String>, council_group: impl Into<String>) -> Self {
        Self {
            captain_group: captain_group.into(),
            council_group: council_group.into(),
        }
    }

    pub fn group_for(&self, capability: Capability) -> &str {
        match capability {
            Capability::Captain => &self.captain_group,
            Capability::Council => &self.council_group,
        }
    }

    /// Group names are compared exactly, as Discord displays them.
    pub fn permits<S: AsRef<str>>(&self, capability: Capability, groups: &[S]) -> bool {
        let wanted = self.group_for(capability);
        groups.iter().any(|g| g.as_ref() == wanted)
    }

    pub fn denial(&self, capability: Capability) -> String {
        format!(
            "You must have the '{}' role to use this command.",
            self.group_for(capability)
        )
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::new("Captain", "Council")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permits_exact_group() {
        let policy = AccessPolicy::default();
        assert!(policy.permits(Capability::Captain, &["Member", "Captain"]));
        assert!(!policy.permits(Capability::Captain, &["captain"]));
        assert!(!policy.permits(Capability::Council, &["Captain"]));
        assert!(!policy.permits::<&str>(Capability::Council, &[]));
    }

    #[test]
    fn test_denial_names_group() {
        let policy = AccessPolicy::new("Raid Lead", "Council");
        assert_eq!(
            policy.denial(Capability::Captain),
            "You must have the 'Raid Lead' role to use this command."
        );
    }
}
