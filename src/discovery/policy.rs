use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::ProjectLayout;

/// Which contracts discovery keeps, loaded from `[discovery]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryPolicy {
    /// Only these contract names are considered, when set.
    #[serde(default)]
    pub contracts: Option<Vec<String>>,
    /// Contract name patterns, matched by suffix, prefix or glob.
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Source path patterns, matched by substring or glob.
    #[serde(default)]
    pub exclude_paths: Vec<String>,
    /// Contracts outside the primary source tree to include anyway.
    /// Compared case-insensitively.
    #[serde(default)]
    pub dependencies: Vec<String>,
}

/// How an exclusion pattern matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternMatch {
    Suffix,
    Prefix,
    Substring,
    Glob,
}

impl fmt::Display for PatternMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Suffix => write!(f, "suffix"),
            Self::Prefix => write!(f, "prefix"),
            Self::Substring => write!(f, "substring"),
            Self::Glob => write!(f, "glob"),
        }
    }
}

/// Why the policy rejected a contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ExclusionReason {
    NotInAllowList,
    ExcludedName {
        pattern: String,
        matched_by: PatternMatch,
    },
    ExcludedPath {
        pattern: String,
        matched_by: PatternMatch,
    },
    OutsideSourceTree {
        source_path: String,
    },
    /// Interface or abstract contract: nothing to deploy.
    NoBytecode,
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInAllowList => write!(f, "not in contract allow-list"),
            Self::ExcludedName {
                pattern,
                matched_by,
            } => write!(f, "name matches exclude pattern '{pattern}' ({matched_by})"),
            Self::ExcludedPath {
                pattern,
                matched_by,
            } => write!(f, "source path matches exclude pattern '{pattern}' ({matched_by})"),
            Self::OutsideSourceTree { source_path } => {
                write!(f, "{source_path} is outside the source tree and not an allowed dependency")
            }
            Self::NoBytecode => write!(f, "no bytecode (interface or abstract contract)"),
        }
    }
}

impl DiscoveryPolicy {
    /// Steps that need only the contract name: allow-list, then name exclusions.
    pub fn check_name(&self, name: &str) -> Result<(), ExclusionReason> {
        if let Some(allowed) = &self.contracts {
            if !allowed.iter().any(|c| c == name) {
                return Err(ExclusionReason::NotInAllowList);
            }
        }
        match self.excluded_name(name) {
            Some((pattern, matched_by)) => Err(ExclusionReason::ExcludedName {
                pattern: pattern.to_string(),
                matched_by,
            }),
            None => Ok(()),
        }
    }

    /// Steps that need the source path: path exclusions, then source tree.
    pub fn check_source(
        &self,
        layout: &ProjectLayout,
        name: &str,
        source_path: &str,
    ) -> Result<(), ExclusionReason> {
        if let Some((pattern, matched_by)) = self.excluded_path(source_path) {
            return Err(ExclusionReason::ExcludedPath {
                pattern: pattern.to_string(),
                matched_by,
            });
        }
        if layout.is_primary_source(source_path) || self.is_allowed_dependency(name) {
            Ok(())
        } else {
            Err(ExclusionReason::OutsideSourceTree {
                source_path: source_path.to_string(),
            })
        }
    }

    /// First name exclusion pattern matching by suffix, prefix or glob.
    pub fn excluded_name(&self, name: &str) -> Option<(&str, PatternMatch)> {
        self.exclude.iter().find_map(|pattern| {
            let matched_by = if name.ends_with(pattern.as_str()) {
                PatternMatch::Suffix
            } else if name.starts_with(pattern.as_str()) {
                PatternMatch::Prefix
            } else if glob_matches(pattern, name) {
                PatternMatch::Glob
            } else {
                return None;
            };
            Some((pattern.as_str(), matched_by))
        })
    }

    /// First path exclusion pattern matching by substring or glob.
    pub fn excluded_path(&self, source_path: &str) -> Option<(&str, PatternMatch)> {
        self.exclude_paths.iter().find_map(|pattern| {
            let matched_by = if source_path.contains(pattern.as_str()) {
                PatternMatch::Substring
            } else if glob_matches(pattern, source_path) {
                PatternMatch::Glob
            } else {
                return None;
            };
            Some((pattern.as_str(), matched_by))
        })
    }

    pub fn is_allowed_dependency(&self, name: &str) -> bool {
        self.dependencies
            .iter()
            .any(|dep| dep.eq_ignore_ascii_case(name))
    }
}

fn glob_matches(pattern: &str, text: &str) -> bool {
    match glob::Pattern::new(pattern) {
        Ok(compiled) => compiled.matches(text),
        Err(e) => {
            tracing::debug!(pattern, error = %e, "invalid glob pattern, ignoring glob mode");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn policy_excluding(patterns: &[&str]) -> DiscoveryPolicy {
        DiscoveryPolicy {
            exclude: patterns.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn name_exclusion_modes() {
        let policy = policy_excluding(&["Test", "Mock*"]);
        assert_eq!(
            policy.excluded_name("CounterTest"),
            Some(("Test", PatternMatch::Suffix))
        );
        assert_eq!(
            policy.excluded_name("TestHelper"),
            Some(("Test", PatternMatch::Prefix))
        );
        assert_eq!(
            policy.excluded_name("MockToken"),
            Some(("Mock*", PatternMatch::Glob))
        );
        assert_eq!(policy.excluded_name("Counter"), None);
        assert_eq!(policy.excluded_name("MyTestable"), None);
    }

    #[test]
    fn first_matching_pattern_wins() {
        let policy = policy_excluding(&["*Token", "Token"]);
        assert_eq!(
            policy.excluded_name("MyToken"),
            Some(("*Token", PatternMatch::Glob))
        );
    }

    #[test]
    fn allow_list_applies_before_exclusions() {
        let policy = DiscoveryPolicy {
            contracts: Some(vec!["Counter".into(), "CounterTest".into()]),
            exclude: vec!["Test".into()],
            ..Default::default()
        };
        assert_eq!(policy.check_name("Counter"), Ok(()));
        assert_eq!(policy.check_name("Token"), Err(ExclusionReason::NotInAllowList));
        assert!(matches!(
            policy.check_name("CounterTest"),
            Err(ExclusionReason::ExcludedName { .. })
        ));
    }

    #[test]
    fn path_exclusion_modes() {
        let policy = DiscoveryPolicy {
            exclude_paths: vec!["test/".into(), "src/**/mocks/*.sol".into()],
            ..Default::default()
        };
        assert_eq!(
            policy.excluded_path("test/Counter.t.sol"),
            Some(("test/", PatternMatch::Substring))
        );
        assert_eq!(
            policy.excluded_path("src/a/mocks/Mock.sol"),
            Some(("src/**/mocks/*.sol", PatternMatch::Glob))
        );
        assert_eq!(policy.excluded_path("src/Counter.sol"), None);
    }

    #[test]
    fn dependencies_are_case_insensitive() {
        let layout = ProjectLayout::default();
        let policy = DiscoveryPolicy {
            dependencies: vec!["erc20".into()],
            ..Default::default()
        };
        assert_eq!(
            policy.check_source(&layout, "ERC20", "lib/oz/contracts/token/ERC20.sol"),
            Ok(())
        );
        assert!(matches!(
            policy.check_source(&layout, "ERC721", "lib/oz/contracts/token/ERC721.sol"),
            Err(ExclusionReason::OutsideSourceTree { .. })
        ));
        assert_eq!(policy.check_source(&layout, "Counter", "src/Counter.sol"), Ok(()));
    }

    #[test]
    fn path_exclusion_beats_dependency_allow_list() {
        let layout = ProjectLayout::default();
        let policy = DiscoveryPolicy {
            exclude_paths: vec!["mocks".into()],
            dependencies: vec!["ERC20Mock".into()],
            ..Default::default()
        };
        assert!(matches!(
            policy.check_source(&layout, "ERC20Mock", "lib/oz/mocks/ERC20Mock.sol"),
            Err(ExclusionReason::ExcludedPath { .. })
        ));
    }

    proptest! {
        #[test]
        fn name_excluded_iff_suffix_prefix_or_glob(
            pattern in "[A-Za-z*?]{1,6}",
            name in "[A-Za-z]{1,10}",
        ) {
            let policy = policy_excluding(&[pattern.as_str()]);
            let expected = name.ends_with(&pattern)
                || name.starts_with(&pattern)
                || glob::Pattern::new(&pattern).map(|p| p.matches(&name)).unwrap_or(false);
            prop_assert_eq!(policy.excluded_name(&name).is_some(), expected);
        }

        #[test]
        fn path_exclusion_only_looks_at_source_path(
            pattern in "[a-z]{3,8}",
            name in "[a-z]{3,8}",
        ) {
            let layout = ProjectLayout::default();
            let policy = DiscoveryPolicy {
                exclude_paths: vec![pattern.clone()],
                ..Default::default()
            };
            // The pattern appears in the contract name but not in the path.
            let contract = format!("{name}{pattern}");
            let source = "src/X.sol";
            prop_assume!(!source.contains(&pattern));
            prop_assert_eq!(policy.check_source(&layout, &contract, source), Ok(()));
        }
    }
}
