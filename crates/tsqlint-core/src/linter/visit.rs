//! Tree traversal for lint rules.
//!
//! A rule implements [`Visitor`] and dispatches on [`Node`] with a single
//! `match`. [`traverse`] walks the script in document order (pre-order,
//! children in source order), visits every node exactly once, then calls
//! [`Visitor::finish`] once.

use super::rule::LintContext;
use crate::syntax::Node;

/// Whether the walker should descend into the children of a visited node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    Continue,
    /// The visitor has handled (or walked) the subtree itself.
    Skip,
}

pub trait Visitor<'t> {
    fn visit(&mut self, node: Node<'t>, ctx: &mut LintContext<'t, '_>) -> Walk;

    /// Called once after the whole tree has been visited.
    fn finish(&mut self, _ctx: &mut LintContext<'t, '_>) {}
}

/// Walks the whole tree of `ctx`, then finishes the visitor.
pub fn traverse<'t, V: Visitor<'t>>(visitor: &mut V, ctx: &mut LintContext<'t, '_>) {
    let root = ctx.tree().root();
    walk(root, visitor, ctx);
    visitor.finish(ctx);
}

/// Pre-order walk of the subtree rooted at `node`.
///
/// Uses an explicit stack: operator chains are left-deep and can be far
/// longer than the parser's nesting limit.
pub fn walk<'t, V: Visitor<'t>>(node: Node<'t>, visitor: &mut V, ctx: &mut LintContext<'t, '_>) {
    let mut stack = vec![node];
    while let Some(node) = stack.pop() {
        if visitor.visit(node, ctx) == Walk::Continue {
            stack.extend(node.children().into_iter().rev());
        }
    }
}

/// Walks the children of `node`; for visitors that return [`Walk::Skip`]
/// after adjusting their own state.
pub fn walk_children<'t, V: Visitor<'t>>(
    node: Node<'t>,
    visitor: &mut V,
    ctx: &mut LintContext<'t, '_>,
) {
    for child in node.children() {
        walk(child, visitor, ctx);
    }
}

/// First value `f` produces over the subtree rooted at `root`, pre-order.
pub fn find_node<'a, T>(root: Node<'a>, mut f: impl FnMut(Node<'a>) -> Option<T>) -> Option<T> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if let Some(found) = f(node) {
            return Some(found);
        }
        stack.extend(node.children().into_iter().rev());
    }
    None
}

pub fn any_node<'a>(root: Node<'a>, mut predicate: impl FnMut(Node<'a>) -> bool) -> bool {
    find_node(root, |node| predicate(node).then_some(())).is_some()
}
