//! Describes dependency injection errors

use crate::{ScopeTag, graph::Violation};
use std::{
    borrow::Cow,
    fmt::{Display, Formatter},
};

/// A type or binding name carried by errors
pub type Name = Cow<'static, str>;

/// Dependency injection error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No binding for `key` is reachable from `scope`
    MissingBinding {
        /// The requested type
        key: Name,
        /// The scope the request was made against
        scope: ScopeTag,
    },
    /// Resolution re-entered a type that is still being constructed.
    ///
    /// The chain starts and ends with the same type.
    Cycle(Vec<Name>),
    /// Resolution or scope creation was attempted after the scope was closed
    ScopeClosed(ScopeTag),
    /// The scope level was never declared
    UnknownScope(ScopeTag),
    /// The scope level exists but is not a direct child of `parent`
    InvalidChildScope {
        /// The scope a child was requested from
        parent: ScopeTag,
        /// The requested child scope level
        child: ScopeTag,
    },
    /// The dependency graph failed composition-time validation
    GraphValidation(Vec<Violation>),
    /// A registered instance has a different type than its key
    ResolveFailed(&'static str),
    /// A factory reported a failure
    Other(Name),
}

impl Error {
    /// Creates an [`Error::Other`] from a message
    #[inline]
    pub fn other(message: impl Into<Name>) -> Self {
        Self::Other(message.into())
    }

    /// Returns the violations if this is an [`Error::GraphValidation`]
    #[inline]
    pub fn violations(&self) -> &[Violation] {
        match self {
            Error::GraphValidation(violations) => violations,
            _ => &[],
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::MissingBinding { key, scope } => write!(f, "Services Error: no binding for `{key}` is reachable from scope `{scope}`"),
            Error::Cycle(chain) => write!(f, "Services Error: dependency cycle detected: {}", chain.join(" -> ")),
            Error::ScopeClosed(scope) => write!(f, "Services Error: scope `{scope}` is closed"),
            Error::UnknownScope(scope) => write!(f, "Services Error: scope `{scope}` is not declared"),
            Error::InvalidChildScope { parent, child } => write!(f, "Services Error: scope `{child}` is not a child of `{parent}`"),
            Error::GraphValidation(violations) => {
                write!(f, "Services Error: dependency graph is invalid ({} violation(s))", violations.len())?;
                for violation in violations {
                    write!(f, "\n  - {violation}")?;
                }
                Ok(())
            },
            Error::ResolveFailed(type_name) => write!(f, "Services Error: unable to resolve the service: {type_name}"),
            Error::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::Error;
    use crate::{ScopeTag, graph::Violation};

    #[test]
    fn it_formats_missing_binding() {
        let err = Error::MissingBinding {
            key: "ApiClient".into(),
            scope: ScopeTag::new("view_model"),
        };

        assert_eq!(err.to_string(), "Services Error: no binding for `ApiClient` is reachable from scope `view_model`");
    }

    #[test]
    fn it_formats_cycle() {
        let err = Error::Cycle(vec!["A".into(), "B".into(), "A".into()]);

        assert_eq!(err.to_string(), "Services Error: dependency cycle detected: A -> B -> A");
    }

    #[test]
    fn it_lists_all_violations() {
        let err = Error::GraphValidation(vec![
            Violation::MissingDependency {
                binding: "AuthService".into(),
                scope: ScopeTag::ROOT,
                dependency: "ApiClient".into(),
            },
            Violation::Cycle { chain: vec!["A".into(), "A".into()] },
        ]);

        let text = err.to_string();

        assert!(text.starts_with("Services Error: dependency graph is invalid (2 violation(s))"));
        assert!(text.contains("`AuthService` in scope `singleton` depends on `ApiClient`"));
        assert!(text.contains("A -> A"));
        assert_eq!(err.violations().len(), 2);
    }
}
