//! Fixed-point resolution of `{dot.path}` token references

use crate::types::*;

/// A reference still standing after resolution stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedReference {
    /// Dot path of the leaf holding the reference
    pub path: String,
    /// The literal reference string, braces included
    pub reference: String,
}

/// Outcome of a resolution run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolveReport {
    pub passes: usize,
    pub substitutions: usize,
    pub unresolved: Vec<UnresolvedReference>,
}

impl ResolveReport {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Leaf waiting on a reference: its path segments and the target dot path
struct PendingReference {
    segments: Vec<String>,
    target: String,
}

pub struct ReferenceResolver {
    max_passes: usize,
}

impl ReferenceResolver {
    pub fn new(max_passes: usize) -> Self {
        Self { max_passes }
    }

    /// Resolve a copy of `tree`; the input is left untouched
    pub fn resolve(&self, tree: &TokenNode) -> (TokenNode, ResolveReport) {
        let mut resolved = tree.clone();
        let mut report = ResolveReport::default();

        for pass in 0..self.max_passes {
            let substituted = resolve_pass(&mut resolved);
            report.passes = pass + 1;
            report.substitutions += substituted;
            log::trace!("Resolution pass {}: {} substitution(s)", report.passes, substituted);
            if substituted == 0 {
                break;
            }
        }

        let mut pending = Vec::new();
        collect_references(&resolved, &mut Vec::new(), &mut pending);
        report.unresolved = pending
            .into_iter()
            .map(|p| UnresolvedReference {
                path: p.segments.join("."),
                reference: make_reference(&p.target),
            })
            .collect();

        for unresolved in &report.unresolved {
            log::warn!(
                "Unresolved reference {} at '{}' after {} pass(es); emitting it literally",
                unresolved.reference,
                unresolved.path,
                report.passes
            );
        }

        (resolved, report)
    }
}

impl Default for ReferenceResolver {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PASSES)
    }
}

pub fn resolve_references(tree: &TokenNode, max_passes: usize) -> (TokenNode, ResolveReport) {
    ReferenceResolver::new(max_passes).resolve(tree)
}

/// One pass in document order. Substitutions are applied immediately, so a
/// later leaf already sees an earlier leaf's new value.
fn resolve_pass(root: &mut TokenNode) -> usize {
    let mut pending = Vec::new();
    collect_references(root, &mut Vec::new(), &mut pending);
    pending
        .iter()
        .map(|reference| substitute(root, reference))
        .filter(|&substituted| substituted)
        .count()
}

fn collect_references(node: &TokenNode, segments: &mut Vec<String>, out: &mut Vec<PendingReference>) {
    match node {
        TokenNode::Leaf(token) => {
            if let Some(target) = token.value.reference_path() {
                out.push(PendingReference {
                    segments: segments.clone(),
                    target: target.to_string(),
                });
            }
        }
        TokenNode::Group(children) => {
            for (key, child) in children {
                segments.push(key.clone());
                collect_references(child, segments, out);
                segments.pop();
            }
        }
    }
}

fn substitute(root: &mut TokenNode, reference: &PendingReference) -> bool {
    // Targets that are missing, groups, or still references wait for a later pass
    let replacement = match root.lookup(&reference.target) {
        Some(value) if !value.is_reference() => value.clone(),
        _ => return false,
    };
    match root.get_path_mut(&reference.segments) {
        Some(TokenNode::Leaf(token)) => {
            token.value = replacement;
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::normalize;
    use serde_json::json;

    fn text(tree: &TokenNode, path: &str) -> String {
        tree.lookup(path).map(|v| v.to_string()).unwrap_or_default()
    }

    #[test]
    fn test_simple_reference() {
        let tree = normalize(&json!({"a": {"value": "1"}, "b": {"value": "{a}"}}));
        let (resolved, report) = resolve_references(&tree, 10);
        assert_eq!(text(&resolved, "b"), "1");
        assert_eq!(report.substitutions, 1);
        assert!(report.is_complete());
    }

    #[test]
    fn test_resolved_tree_terminates_in_one_pass() {
        let tree = normalize(&json!({"a": {"value": "1"}, "b": {"value": "2"}}));
        let (resolved, report) = resolve_references(&tree, 10);
        assert_eq!(resolved, tree);
        assert_eq!(report.passes, 1);
        assert_eq!(report.substitutions, 0);
    }

    #[test]
    fn test_cycle_keeps_literal_references() {
        let tree = normalize(&json!({"a": {"value": "{b}"}, "b": {"value": "{a}"}}));
        let (resolved, report) = resolve_references(&tree, 10);
        assert_eq!(text(&resolved, "a"), "{b}");
        assert_eq!(text(&resolved, "b"), "{a}");
        assert_eq!(report.passes, 1);
        assert_eq!(report.unresolved.len(), 2);
        assert_eq!(report.unresolved[0].path, "a");
        assert_eq!(report.unresolved[0].reference, "{b}");
    }

    #[test]
    fn test_missing_target_and_group_target_stay_literal() {
        let tree = normalize(&json!({
            "group": {"x": {"value": "1"}},
            "missing": {"value": "{nope.nothing}"},
            "to_group": {"value": "{group}"}
        }));
        let (resolved, report) = resolve_references(&tree, 10);
        assert_eq!(text(&resolved, "missing"), "{nope.nothing}");
        assert_eq!(text(&resolved, "to_group"), "{group}");
        assert_eq!(report.unresolved.len(), 2);
    }

    #[test]
    fn test_chain_resolved_within_one_pass_in_document_order() {
        let tree = normalize(&json!({
            "base": {"value": "#000"},
            "mid": {"value": "{base}"},
            "top": {"value": "{mid}"}
        }));
        let (resolved, report) = resolve_references(&tree, 10);
        assert_eq!(text(&resolved, "top"), "#000");
        // pass 1 resolves both, pass 2 confirms the fixed point
        assert_eq!(report.passes, 2);
        assert_eq!(report.substitutions, 2);
    }

    #[test]
    fn test_backward_chain_needs_several_passes() {
        let tree = normalize(&json!({
            "top": {"value": "{mid}"},
            "mid": {"value": "{base}"},
            "base": {"value": "8px"}
        }));
        let (resolved, report) = resolve_references(&tree, 10);
        assert_eq!(text(&resolved, "top"), "8px");
        assert_eq!(report.passes, 3);
    }

    #[test]
    fn test_pass_limit_leaves_deep_chain_partially_resolved() {
        let tree = normalize(&json!({
            "c": {"value": "{b}"},
            "b": {"value": "{a}"},
            "a": {"value": "1"}
        }));
        let (resolved, report) = resolve_references(&tree, 1);
        assert_eq!(text(&resolved, "b"), "1");
        assert_eq!(text(&resolved, "c"), "{b}");
        assert_eq!(report.unresolved.len(), 1);
    }

    #[test]
    fn test_numbers_are_substituted_as_numbers() {
        let tree = normalize(&json!({
            "weights": {"bold": {"value": 700}},
            "heading": {"value": "{weights.bold}"}
        }));
        let (resolved, _) = resolve_references(&tree, 10);
        assert!(matches!(resolved.lookup("heading"), Some(TokenValue::Number(_))));
    }

    #[test]
    fn test_input_is_not_mutated() {
        let tree = normalize(&json!({"a": {"value": "1"}, "b": {"value": "{a}"}}));
        let before = tree.clone();
        let _ = ReferenceResolver::default().resolve(&tree);
        assert_eq!(tree, before);
    }
}
