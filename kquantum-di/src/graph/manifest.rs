//! Declarative description of a dependency graph
//!
//! A [`GraphManifest`] lists scope levels and bindings by name only, so module
//! declarations can be checked without building any factories. It can be read from
//! JSON or exported from a [`ContainerBuilder`](crate::ContainerBuilder).

use super::{Declaration, Dependency, ScopeTree, validate};
use crate::{Lifetime, ScopeTag, error::Error};
use serde::{Deserialize, Serialize};

/// Declares a scope level and its parent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeDecl {
    /// Name of the scope level
    pub name: String,
    /// Name of the parent scope level
    pub parent: String,
}

/// Declares a binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingDecl {
    /// Name of the bound type
    pub key: String,

    /// Scope level owning the binding
    ///
    /// Default: `singleton`
    #[serde(default = "root_scope")]
    pub scope: String,

    /// Default: `scoped`
    #[serde(default)]
    pub lifetime: Lifetime,

    /// Types required to construct the binding, in factory argument order
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// Types resolved after construction
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deferred: Vec<String>,
}

fn root_scope() -> String {
    ScopeTag::ROOT.name().to_owned()
}

/// A declarative dependency graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphManifest {
    /// Scope levels below the root
    #[serde(default)]
    pub scopes: Vec<ScopeDecl>,

    /// Bindings in declaration order
    #[serde(default)]
    pub bindings: Vec<BindingDecl>,
}

impl GraphManifest {
    /// Parses a manifest from JSON
    ///
    /// # Example
    /// ```
    /// use kquantum_di::GraphManifest;
    ///
    /// let manifest = GraphManifest::from_json(r#"{
    ///     "bindings": [
    ///         { "key": "TokenManager" },
    ///         { "key": "ApiClient", "dependencies": ["TokenManager"] }
    ///     ]
    /// }"#).unwrap();
    ///
    /// assert!(manifest.validate().is_ok());
    /// ```
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serializes the manifest to pretty-printed JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Validates the declared graph, reporting every violation at once
    /// as an [`Error::GraphValidation`]
    pub fn validate(&self) -> Result<(), Error> {
        let scopes = self.scopes
            .iter()
            .map(|s| (ScopeTag::from(s.name.clone()), ScopeTag::from(s.parent.clone())))
            .collect::<Vec<_>>();
        let (tree, mut violations) = ScopeTree::resolve(&scopes);

        let bindings = self.bindings
            .iter()
            .map(|b| {
                let dependencies = b.dependencies
                    .iter()
                    .cloned()
                    .map(Dependency::new)
                    .chain(b.deferred.iter().cloned().map(Dependency::deferred))
                    .collect::<Vec<_>>();
                (b.key.clone(), ScopeTag::from(b.scope.clone()), dependencies)
            })
            .collect::<Vec<_>>();
        let declarations = bindings
            .iter()
            .map(|(key, scope, dependencies)| Declaration { key, scope, dependencies })
            .collect::<Vec<_>>();

        violations.extend(validate(&tree, &declarations));
        if violations.is_empty() {
            Ok(())
        } else {
            Err(Error::GraphValidation(violations))
        }
    }

    pub(crate) fn from_tree(tree: &ScopeTree, bindings: Vec<BindingDecl>) -> Self {
        let scopes = tree
            .declarations()
            .map(|(scope, parent)| ScopeDecl {
                name: scope.name().to_owned(),
                parent: parent.name().to_owned(),
            })
            .collect();
        Self { scopes, bindings }
    }
}

#[cfg(test)]
mod tests {
    use super::GraphManifest;
    use crate::{Lifetime, ScopeTag, error::Error, graph::Violation};

    const APP_GRAPH: &str = r#"{
        "scopes": [
            { "name": "activity_retained", "parent": "singleton" },
            { "name": "view_model", "parent": "activity_retained" }
        ],
        "bindings": [
            { "key": "TokenManager" },
            { "key": "ApiClient", "dependencies": ["TokenManager"] },
            { "key": "AuthService", "dependencies": ["ApiClient", "TokenManager"] },
            { "key": "AuthViewModel", "scope": "view_model", "lifetime": "scoped", "dependencies": ["AuthService"] },
            { "key": "ExploreViewModel", "scope": "view_model", "lifetime": "transient" }
        ]
    }"#;

    #[test]
    fn it_parses_defaults() {
        let manifest = GraphManifest::from_json(APP_GRAPH).unwrap();

        assert_eq!(manifest.scopes.len(), 2);
        assert_eq!(manifest.bindings[0].scope, "singleton");
        assert_eq!(manifest.bindings[0].lifetime, Lifetime::Scoped);
        assert_eq!(manifest.bindings[4].lifetime, Lifetime::Transient);
    }

    #[test]
    fn it_validates_app_graph() {
        let manifest = GraphManifest::from_json(APP_GRAPH).unwrap();

        assert!(manifest.validate().is_ok());
    }

    #[test]
    fn it_reports_unmet_and_cyclic_dependencies() {
        let manifest = GraphManifest::from_json(r#"{
            "bindings": [
                { "key": "ApiClient", "dependencies": ["TokenManager"] },
                { "key": "A", "dependencies": ["B"] },
                { "key": "B", "dependencies": ["A"] }
            ]
        }"#).unwrap();

        let err = manifest.validate().unwrap_err();

        assert_eq!(err, Error::GraphValidation(vec![
            Violation::MissingDependency {
                binding: "ApiClient".into(),
                scope: ScopeTag::ROOT,
                dependency: "TokenManager".into(),
            },
            Violation::Cycle { chain: vec!["A".into(), "B".into(), "A".into()] },
        ]));
    }

    #[test]
    fn it_round_trips_through_json() {
        let manifest = GraphManifest::from_json(APP_GRAPH).unwrap();

        let json = manifest.to_json().unwrap();

        assert_eq!(GraphManifest::from_json(&json).unwrap(), manifest);
    }
}
