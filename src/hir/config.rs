//! Resolver configuration.
//!
//! Everything language-specific that is a table rather than an algorithm
//! lives here: provider precedence, implicit variables and the container
//! types unwrapped by OOPath segments.

use smol_str::SmolStr;

use super::symbols::Origin;
use super::types::SearchScope;

/// A predeclared action-section variable whose type is probed from an
/// ordered list of candidate host types.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImplicitVariable {
    pub name: SmolStr,
    /// Qualified type names, highest priority first.
    pub candidates: Vec<SmolStr>,
    /// Members of the resolved type are also visible unqualified.
    #[cfg_attr(feature = "serde", serde(default))]
    pub exposes_members: bool,
}

impl ImplicitVariable {
    pub fn new(name: &str, candidates: &[&str]) -> Self {
        Self {
            name: name.into(),
            candidates: candidates.iter().map(|c| SmolStr::from(*c)).collect(),
            exposes_members: false,
        }
    }

    /// Mark this variable as the helper whose methods are callable bare.
    pub fn exposing_members(mut self) -> Self {
        self.exposes_members = true;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ResolveConfig {
    /// Providers in the order the driver runs them.
    pub provider_order: Vec<Origin>,
    pub implicit_variables: Vec<ImplicitVariable>,
    /// Parameterized types whose element type OOPath segments bind to.
    pub container_types: Vec<SmolStr>,
    /// Packages imported into every file.
    pub implicit_packages: Vec<SmolStr>,
    /// Accumulate functions whose result is integer-like.
    pub integer_aggregates: Vec<SmolStr>,
    pub search_scope: SearchScope,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            provider_order: Origin::ALL.to_vec(),
            implicit_variables: vec![
                ImplicitVariable::new("kcontext", &["org.kie.api.runtime.rule.RuleContext"]),
                ImplicitVariable::new(
                    "drools",
                    &[
                        "org.drools.core.spi.KnowledgeHelper",
                        "org.drools.core.rule.consequence.KnowledgeHelper",
                        "org.kie.api.runtime.rule.RuleContext",
                    ],
                )
                .exposing_members(),
            ],
            container_types: [
                "org.drools.ruleunits.api.DataStore",
                "org.drools.ruleunits.api.DataStream",
                "org.drools.ruleunits.api.SingletonStore",
                "org.drools.ruleunits.api.DataSource",
            ]
            .into_iter()
            .map(SmolStr::from)
            .collect(),
            implicit_packages: vec![SmolStr::new_static("java.lang")],
            integer_aggregates: ["sum", "average", "min", "max", "count"]
                .into_iter()
                .map(SmolStr::from)
                .collect(),
            search_scope: SearchScope::default(),
        }
    }
}

impl ResolveConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the provider order. Duplicates keep their first position and
    /// omitted providers do not run.
    pub fn with_provider_order(mut self, order: impl IntoIterator<Item = Origin>) -> Self {
        let mut seen = Vec::new();
        for origin in order {
            if !seen.contains(&origin) {
                seen.push(origin);
            }
        }
        self.provider_order = seen;
        self
    }

    pub fn with_implicit_variables(mut self, variables: Vec<ImplicitVariable>) -> Self {
        self.implicit_variables = variables;
        self
    }

    pub fn with_container_types(mut self, containers: &[&str]) -> Self {
        self.container_types = containers.iter().map(|c| SmolStr::from(*c)).collect();
        self
    }

    pub fn with_implicit_packages(mut self, packages: &[&str]) -> Self {
        self.implicit_packages = packages.iter().map(|p| SmolStr::from(*p)).collect();
        self
    }

    pub fn with_search_scope(mut self, scope: SearchScope) -> Self {
        self.search_scope = scope;
        self
    }

    pub fn is_integer_aggregate(&self, function: &str) -> bool {
        self.integer_aggregates.iter().any(|f| f == function)
    }
}
