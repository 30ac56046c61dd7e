//! Composition-time validation of the dependency graph

use crate::{Key, ScopeTag, error::Name};
use indexmap::IndexMap;
use std::{
    collections::{HashMap, HashSet},
    fmt::{Display, Formatter},
    hash::Hash,
};

#[cfg(feature = "manifest")]
pub mod manifest;

/// A dependency declared by a binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dependency<K = Key> {
    /// The required type
    pub key: K,
    /// Deferred dependencies are resolved after construction (see [`crate::Lazy`]).
    ///
    /// They must be satisfiable but do not take part in cycle detection.
    pub deferred: bool,
}

impl<K> Dependency<K> {
    /// Creates a dependency resolved during construction
    #[inline]
    pub fn new(key: K) -> Self {
        Self { key, deferred: false }
    }

    /// Creates a dependency resolved on first use
    #[inline]
    pub fn deferred(key: K) -> Self {
        Self { key, deferred: true }
    }
}

/// A single problem found while validating the dependency graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// `binding` requires `dependency`, which has no binding in `scope` or its ancestors
    MissingDependency {
        /// The binding with an unmet dependency
        binding: Name,
        /// The scope level that owns the binding
        scope: ScopeTag,
        /// The unmet dependency
        dependency: Name,
    },
    /// The bindings form a cycle; the chain starts and ends with the same binding
    Cycle {
        /// The bindings taking part in the cycle
        chain: Vec<Name>,
    },
    /// `binding` is owned by a scope level that was never declared
    UnknownScope {
        /// The misplaced binding
        binding: Name,
        /// The undeclared scope level
        scope: ScopeTag,
    },
    /// The same type is bound twice in the same scope level
    DuplicateBinding {
        /// The duplicated binding
        binding: Name,
        /// The scope level bound twice
        scope: ScopeTag,
    },
    /// A scope level was declared twice
    DuplicateScope {
        /// The scope level declared twice
        scope: ScopeTag,
    },
    /// A scope level's parent is undeclared or unreachable from the root
    UndeclaredParent {
        /// The scope level
        scope: ScopeTag,
        /// Its declared parent
        parent: ScopeTag,
    },
}

impl Display for Violation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Violation::MissingDependency { binding, scope, dependency } => write!(
                f,
                "`{binding}` in scope `{scope}` depends on `{dependency}`, which has no binding in that scope or its ancestors"
            ),
            Violation::Cycle { chain } => write!(f, "dependency cycle: {}", chain.join(" -> ")),
            Violation::UnknownScope { binding, scope } => write!(f, "`{binding}` is bound in undeclared scope `{scope}`"),
            Violation::DuplicateBinding { binding, scope } => write!(f, "`{binding}` is bound more than once in scope `{scope}`"),
            Violation::DuplicateScope { scope } => write!(f, "scope `{scope}` is declared more than once"),
            Violation::UndeclaredParent { scope, parent } => write!(f, "scope `{scope}` has an undeclared parent `{parent}`"),
        }
    }
}

/// The declared tree of scope levels
#[derive(Debug, Clone)]
pub(crate) struct ScopeTree {
    parents: IndexMap<ScopeTag, Option<ScopeTag>>,
}

impl ScopeTree {
    /// Builds the tree from `(scope, parent)` declarations given in any order.
    ///
    /// Declarations that cannot be attached to the root are reported and skipped.
    pub(crate) fn resolve(declarations: &[(ScopeTag, ScopeTag)]) -> (Self, Vec<Violation>) {
        let mut parents = IndexMap::new();
        parents.insert(ScopeTag::ROOT, None);

        let mut violations = Vec::new();
        let mut pending = Vec::with_capacity(declarations.len());
        let mut seen = HashSet::new();
        for (scope, parent) in declarations {
            if scope.is_root() || !seen.insert(scope) {
                violations.push(Violation::DuplicateScope { scope: scope.clone() });
            } else {
                pending.push((scope, parent));
            }
        }

        loop {
            let before = pending.len();
            pending.retain(|(scope, parent)| {
                if parents.contains_key(*parent) {
                    parents.insert((*scope).clone(), Some((*parent).clone()));
                    false
                } else {
                    true
                }
            });
            if pending.is_empty() || pending.len() == before {
                break;
            }
        }

        violations.extend(pending.into_iter().map(|(scope, parent)| Violation::UndeclaredParent {
            scope: scope.clone(),
            parent: parent.clone(),
        }));

        (Self { parents }, violations)
    }

    #[inline]
    pub(crate) fn contains(&self, scope: &ScopeTag) -> bool {
        self.parents.contains_key(scope)
    }

    #[inline]
    pub(crate) fn parent_of(&self, scope: &ScopeTag) -> Option<&ScopeTag> {
        self.parents.get(scope).and_then(Option::as_ref)
    }

    /// Iterates over `scope` and then its ancestors up to the root
    pub(crate) fn ancestors<'a>(&'a self, scope: &'a ScopeTag) -> impl Iterator<Item = &'a ScopeTag> + 'a {
        std::iter::successors(
            self.contains(scope).then_some(scope),
            move |current| self.parent_of(current),
        )
    }

    /// Iterates over all declared `(scope, parent)` pairs except the root
    pub(crate) fn declarations(&self) -> impl Iterator<Item = (&ScopeTag, &ScopeTag)> {
        self.parents
            .iter()
            .filter_map(|(scope, parent)| parent.as_ref().map(|parent| (scope, parent)))
    }
}

/// A key usable as a graph node
pub(crate) trait GraphKey: Eq + Hash + Clone {
    fn display_name(&self) -> Name;
}

impl GraphKey for Key {
    #[inline]
    fn display_name(&self) -> Name {
        Name::Borrowed(self.name())
    }
}

impl GraphKey for String {
    #[inline]
    fn display_name(&self) -> Name {
        Name::Owned(self.clone())
    }
}

/// What validation needs to know about a binding
pub(crate) struct Declaration<'a, K> {
    pub(crate) key: &'a K,
    pub(crate) scope: &'a ScopeTag,
    pub(crate) dependencies: &'a [Dependency<K>],
}

/// Validates bindings against the scope tree and collects every violation found.
///
/// Violations are reported in declaration order.
pub(crate) fn validate<K: GraphKey>(tree: &ScopeTree, declarations: &[Declaration<'_, K>]) -> Vec<Violation> {
    let mut violations = Vec::new();

    let mut index: HashMap<(&K, &ScopeTag), usize> = HashMap::with_capacity(declarations.len());
    for (idx, decl) in declarations.iter().enumerate() {
        if !tree.contains(decl.scope) {
            violations.push(Violation::UnknownScope {
                binding: decl.key.display_name(),
                scope: decl.scope.clone(),
            });
        } else if index.insert((decl.key, decl.scope), idx).is_some() {
            violations.push(Violation::DuplicateBinding {
                binding: decl.key.display_name(),
                scope: decl.scope.clone(),
            });
        }
    }

    // edges follow the same owning-scope rule as runtime resolution
    let mut edges: Vec<Vec<usize>> = vec![Vec::new(); declarations.len()];
    for (idx, decl) in declarations.iter().enumerate() {
        if !tree.contains(decl.scope) {
            continue;
        }
        for dependency in decl.dependencies {
            let owner = tree
                .ancestors(decl.scope)
                .find_map(|scope| index.get(&(&dependency.key, scope)).copied());
            match owner {
                Some(target) if !dependency.deferred => edges[idx].push(target),
                Some(_) => {},
                None => violations.push(Violation::MissingDependency {
                    binding: decl.key.display_name(),
                    scope: decl.scope.clone(),
                    dependency: dependency.key.display_name(),
                }),
            }
        }
    }

    violations.extend(find_cycles(&edges)
        .into_iter()
        .map(|cycle| Violation::Cycle {
            chain: cycle
                .into_iter()
                .map(|idx| declarations[idx].key.display_name())
                .collect(),
        }));

    violations
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    New,
    OnStack,
    Done,
}

/// Finds every elementary cycle reachable by a depth-first walk, each reported once.
///
/// A cycle is returned as node indices, closed by repeating its first node.
fn find_cycles(edges: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let mut marks = vec![Mark::New; edges.len()];
    let mut stack = Vec::new();
    let mut seen = HashSet::new();
    let mut cycles = Vec::new();

    for start in 0..edges.len() {
        if marks[start] == Mark::New {
            visit(start, edges, &mut marks, &mut stack, &mut seen, &mut cycles);
        }
    }
    cycles
}

fn visit(
    node: usize,
    edges: &[Vec<usize>],
    marks: &mut [Mark],
    stack: &mut Vec<usize>,
    seen: &mut HashSet<Vec<usize>>,
    cycles: &mut Vec<Vec<usize>>,
) {
    marks[node] = Mark::OnStack;
    stack.push(node);

    for &next in &edges[node] {
        match marks[next] {
            Mark::New => visit(next, edges, marks, stack, seen, cycles),
            Mark::OnStack => {
                let Some(pos) = stack.iter().position(|&n| n == next) else {
                    continue;
                };
                let cycle = &stack[pos..];
                if seen.insert(normalize(cycle)) {
                    let mut chain = cycle.to_vec();
                    chain.push(next);
                    cycles.push(chain);
                }
            },
            Mark::Done => {},
        }
    }

    stack.pop();
    marks[node] = Mark::Done;
}

/// Rotates a cycle so it starts at its smallest node
fn normalize(cycle: &[usize]) -> Vec<usize> {
    let start = cycle
        .iter()
        .enumerate()
        .min_by_key(|&(_, node)| *node)
        .map_or(0, |(pos, _)| pos);
    cycle[start..]
        .iter()
        .chain(&cycle[..start])
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACTIVITY: ScopeTag = ScopeTag::new("activity");
    const VIEW_MODEL: ScopeTag = ScopeTag::new("view_model");

    fn tree() -> ScopeTree {
        let (tree, violations) = ScopeTree::resolve(&[
            (VIEW_MODEL, ACTIVITY),
            (ACTIVITY, ScopeTag::ROOT),
        ]);
        assert!(violations.is_empty());
        tree
    }

    fn decl<'a>(key: &'a String, scope: &'a ScopeTag, deps: &'a [Dependency<String>]) -> Declaration<'a, String> {
        Declaration { key, scope, dependencies: deps }
    }

    fn deps(names: &[&str]) -> Vec<Dependency<String>> {
        names.iter().map(|n| Dependency::new(n.to_string())).collect()
    }

    #[test]
    fn it_resolves_scope_tree_in_any_order() {
        let tree = tree();

        let view_model = VIEW_MODEL;
        let chain: Vec<_> = tree.ancestors(&view_model).map(ScopeTag::name).collect();

        assert_eq!(chain, ["view_model", "activity", "singleton"]);
        assert_eq!(tree.declarations().count(), 2);
    }

    #[test]
    fn it_reports_bad_scope_declarations() {
        let (_, violations) = ScopeTree::resolve(&[
            (ACTIVITY, ScopeTag::ROOT),
            (ACTIVITY, ScopeTag::ROOT),
            (VIEW_MODEL, ScopeTag::new("fragment")),
        ]);

        assert_eq!(violations, vec![
            Violation::DuplicateScope { scope: ACTIVITY },
            Violation::UndeclaredParent { scope: VIEW_MODEL, parent: ScopeTag::new("fragment") },
        ]);
    }

    #[test]
    fn it_accepts_valid_graph() {
        let tree = tree();
        let (token, api, auth) = ("TokenManager".to_string(), "ApiClient".to_string(), "AuthService".to_string());
        let (none, api_deps, auth_deps) = (deps(&[]), deps(&["TokenManager"]), deps(&["ApiClient", "TokenManager"]));
        let root = ScopeTag::ROOT;

        let violations = validate(&tree, &[
            decl(&token, &root, &none),
            decl(&api, &root, &api_deps),
            decl(&auth, &VIEW_MODEL, &auth_deps),
        ]);

        assert!(violations.is_empty());
    }

    #[test]
    fn it_reports_dependency_only_available_in_child_scope() {
        let tree = tree();
        let (vm, service) = ("HomeViewModel".to_string(), "AuthService".to_string());
        let (none, service_deps) = (deps(&[]), deps(&["HomeViewModel"]));
        let root = ScopeTag::ROOT;

        let violations = validate(&tree, &[
            decl(&vm, &VIEW_MODEL, &none),
            decl(&service, &root, &service_deps),
        ]);

        assert_eq!(violations, vec![Violation::MissingDependency {
            binding: "AuthService".into(),
            scope: ScopeTag::ROOT,
            dependency: "HomeViewModel".into(),
        }]);
    }

    #[test]
    fn it_reports_all_violations_at_once() {
        let tree = tree();
        let (a, b, c, d) = ("A".to_string(), "B".to_string(), "C".to_string(), "D".to_string());
        let (a_deps, b_deps, c_deps, none) = (deps(&["B"]), deps(&["A"]), deps(&["Missing"]), deps(&[]));
        let root = ScopeTag::ROOT;
        let unknown = ScopeTag::new("unknown");

        let violations = validate(&tree, &[
            decl(&a, &root, &a_deps),
            decl(&b, &root, &b_deps),
            decl(&c, &root, &c_deps),
            decl(&d, &unknown, &none),
            decl(&d, &root, &none),
            decl(&d, &root, &none),
        ]);

        assert_eq!(violations, vec![
            Violation::UnknownScope { binding: "D".into(), scope: unknown },
            Violation::DuplicateBinding { binding: "D".into(), scope: ScopeTag::ROOT },
            Violation::MissingDependency { binding: "C".into(), scope: ScopeTag::ROOT, dependency: "Missing".into() },
            Violation::Cycle { chain: vec!["A".into(), "B".into(), "A".into()] },
        ]);
    }

    #[test]
    fn it_ignores_deferred_dependencies_in_cycles() {
        let tree = tree();
        let (a, b) = ("A".to_string(), "B".to_string());
        let a_deps = deps(&["B"]);
        let b_deps = vec![Dependency::deferred("A".to_string())];
        let root = ScopeTag::ROOT;

        let violations = validate(&tree, &[
            decl(&a, &root, &a_deps),
            decl(&b, &root, &b_deps),
        ]);

        assert!(violations.is_empty());
    }

    #[test]
    fn it_reports_self_dependency() {
        let tree = tree();
        let a = "A".to_string();
        let a_deps = deps(&["A"]);
        let root = ScopeTag::ROOT;

        let violations = validate(&tree, &[decl(&a, &root, &a_deps)]);

        assert_eq!(violations, vec![Violation::Cycle { chain: vec!["A".into(), "A".into()] }]);
    }

    #[test]
    fn it_reports_each_cycle_once() {
        let edges = vec![vec![1], vec![2], vec![0], vec![1]];

        let cycles = find_cycles(&edges);

        assert_eq!(cycles, vec![vec![0, 1, 2, 0]]);
    }
}
