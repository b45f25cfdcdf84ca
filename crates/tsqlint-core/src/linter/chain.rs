//! N-ary views over left-deep binary operator chains.
//!
//! The parser builds `a + b + c` as `(a + b) + c`, so every sub-chain is a
//! binary node of its own. Rules flatten a chain into its operands and only
//! judge the outermost node of each chain, giving one verdict per chain.

use super::visit::any_node;
use crate::syntax::{BinaryOperator, ConversionFunction, Expr, ExprKind, Literal, Node, Span};

/// Functions that substitute a value for NULL.
pub const NULL_HANDLING_FUNCTIONS: &[&str] = &["ISNULL", "COALESCE"];

/// Operands of one operator chain, left to right.
#[derive(Debug, Clone)]
pub struct Chain<'a> {
    pub operands: Vec<&'a Expr>,
    pub span: Span,
}

/// Strips any number of enclosing parentheses.
pub fn unwrap_parens(expr: &Expr) -> &Expr {
    let mut current = expr;
    while let ExprKind::Nested(inner) = &current.kind {
        current = inner.as_ref();
    }
    current
}

fn as_operator(expr: &Expr, op: BinaryOperator) -> Option<(&Expr, &Expr)> {
    match &expr.kind {
        ExprKind::Binary {
            op: found,
            left,
            right,
        } if *found == op => Some((left.as_ref(), right.as_ref())),
        _ => None,
    }
}

/// Flattens `expr` over `op`.
///
/// Parenthesized chains of the same operator are transparent; anything else,
/// subqueries included, is a single operand.
pub fn flatten(expr: &Expr, op: BinaryOperator) -> Chain<'_> {
    let mut operands = Vec::new();
    let mut pending = vec![expr];

    while let Some(node) = pending.pop() {
        match as_operator(unwrap_parens(node), op) {
            Some((left, right)) => {
                pending.push(right);
                pending.push(left);
            }
            None => operands.push(node),
        }
    }

    Chain {
        operands,
        span: expr.span,
    }
}

/// Whether no other span in `all` strictly contains `candidate`.
pub fn is_outermost(candidate: &Span, all: &[Span]) -> bool {
    !all.iter().any(|other| other.strictly_contains(candidate))
}

/// Collects every node of one operator during a traversal and yields the
/// outermost ones afterwards.
#[derive(Debug)]
pub struct ChainCollector<'t> {
    op: BinaryOperator,
    nodes: Vec<&'t Expr>,
}

impl<'t> ChainCollector<'t> {
    pub fn new(op: BinaryOperator) -> Self {
        Self {
            op,
            nodes: Vec::new(),
        }
    }

    /// Records `node` if it is a binary node of the collected operator.
    pub fn collect(&mut self, node: Node<'t>) {
        if let Node::Expr(expr) = node {
            if as_operator(expr, self.op).is_some() {
                self.nodes.push(expr);
            }
        }
    }

    /// Outermost chains in the order they were collected.
    ///
    /// Nodes arrive in pre-order, so the only node that can enclose a
    /// candidate is the most recent outermost one.
    pub fn outermost(&self) -> Vec<Chain<'t>> {
        let mut chains: Vec<Chain<'t>> = Vec::new();
        for expr in self.nodes.iter().copied() {
            let enclosing = chains.last().map(|chain| chain.span);
            if is_outermost(&expr.span, enclosing.as_slice()) {
                chains.push(flatten(expr, self.op));
            }
        }
        chains
    }
}

fn string_literal(expr: &Expr) -> Option<&Literal> {
    match &expr.kind {
        ExprKind::Literal(literal) if literal.kind.is_string() => Some(literal),
        _ => None,
    }
}

/// Whether `expr` is a string literal, ignoring parentheses.
pub fn is_string_literal(expr: &Expr) -> bool {
    string_literal(unwrap_parens(expr)).is_some()
}

/// Whether a string literal occurs anywhere within `expr`.
pub fn contains_string_literal(expr: &Expr) -> bool {
    any_node(Node::Expr(expr), |node| {
        matches!(node, Node::Expr(inner) if string_literal(inner).is_some())
    })
}

/// Whether `expr` contains a call to one of `names` (case-insensitive).
pub fn contains_function_call(expr: &Expr, names: &[&str]) -> bool {
    any_node(Node::Expr(expr), |node| match node {
        Node::Expr(Expr {
            kind: ExprKind::Function(call),
            ..
        }) => {
            let name = call.name.simple_name();
            names.iter().any(|candidate| candidate.eq_ignore_ascii_case(name))
        }
        _ => false,
    })
}

/// Whether `expr` contains a `CAST` or `CONVERT` (the `TRY_` forms excluded).
pub fn contains_conversion(expr: &Expr) -> bool {
    any_node(Node::Expr(expr), |node| {
        matches!(
            node,
            Node::Expr(Expr {
                kind: ExprKind::Conversion(conversion),
                ..
            }) if matches!(
                conversion.function,
                ConversionFunction::Cast | ConversionFunction::Convert
            )
        )
    })
}

/// Recognizes `value + sep + value + sep + value ...` where every separator
/// is the same non-empty string literal and some value handles NULLs.
///
/// Returns the separator text on a match.
pub fn match_separator_chain<'a>(operands: &[&'a Expr]) -> Option<&'a str> {
    if operands.len() < 5 {
        return None;
    }
    let separator = operands
        .get(1)
        .copied()
        .and_then(|operand| string_literal(unwrap_parens(operand)))
        .filter(|literal| !literal.value.is_empty())?;

    let mut separators = 0;
    let mut values = 0;
    let mut handles_null = false;
    for (index, operand) in operands.iter().enumerate() {
        if index % 2 == 1 {
            let same = string_literal(unwrap_parens(operand))
                .is_some_and(|literal| literal.value == separator.value);
            if !same {
                return None;
            }
            separators += 1;
        } else {
            values += 1;
            handles_null |= contains_function_call(operand, NULL_HANDLING_FUNCTIONS);
        }
    }

    (separators >= 2 && values >= 3 && handles_null).then_some(separator.value.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_script;
    use crate::syntax::{SelectElementKind, StatementKind, SyntaxTree};

    fn first_select_expr(tree: &SyntaxTree) -> &Expr {
        let StatementKind::Select(query) = &tree.script().batches[0].statements[0].kind else {
            panic!("expected SELECT");
        };
        let crate::syntax::QueryExprKind::Specification(spec) = &query.body.kind else {
            panic!("expected specification");
        };
        let SelectElementKind::Expression { expr, .. } = &spec.select_list[0].kind else {
            panic!("expected expression");
        };
        expr
    }

    fn operand_texts(sql: &str) -> Vec<String> {
        let tree = parse_script(sql).expect("parse");
        let expr = first_select_expr(&tree);
        flatten(expr, BinaryOperator::Add)
            .operands
            .iter()
            .map(|operand| tree.text(&operand.span).to_string())
            .collect()
    }

    #[test]
    fn flattens_left_deep_chains_in_order() {
        assert_eq!(operand_texts("SELECT a + b + c + d"), ["a", "b", "c", "d"]);
    }

    #[test]
    fn parenthesized_same_operator_is_transparent() {
        assert_eq!(operand_texts("SELECT a + (b + c)"), ["a", "b", "c"]);
        assert_eq!(operand_texts("SELECT a + (b * c)"), ["a", "(b * c)"]);
    }

    #[test]
    fn subqueries_end_flattening() {
        assert_eq!(
            operand_texts("SELECT a + (SELECT b + c FROM t)"),
            ["a", "(SELECT b + c FROM t)"]
        );
    }

    #[test]
    fn only_the_outermost_node_of_a_chain_survives() {
        let tree = parse_script("SELECT a + b + c, d + e").expect("parse");
        let mut collector = ChainCollector::new(BinaryOperator::Add);
        crate::linter::visit::any_node(tree.root(), |node| {
            collector.collect(node);
            false
        });
        let chains = collector.outermost();
        assert_eq!(chains.len(), 2);
        assert_eq!(chains[0].operands.len(), 3);
        assert_eq!(chains[1].operands.len(), 2);
    }

    fn collect(tree: &SyntaxTree) -> ChainCollector<'_> {
        let mut collector = ChainCollector::new(BinaryOperator::Add);
        crate::linter::visit::any_node(tree.root(), |node| {
            collector.collect(node);
            false
        });
        collector
    }

    #[test]
    fn outermost_agrees_with_pairwise_containment() {
        let tree = parse_script(
            "SELECT a + f(b + c) + (d + e), g + 1 FROM t WHERE x + y = (SELECT p + q)",
        )
        .expect("parse");
        let collector = collect(&tree);
        let spans: Vec<Span> = collector.nodes.iter().map(|expr| expr.span).collect();
        let expected: Vec<Span> = spans
            .iter()
            .copied()
            .filter(|span| is_outermost(span, &spans))
            .collect();

        let found: Vec<Span> = collector.outermost().iter().map(|chain| chain.span).collect();
        assert_eq!(found, expected);
        assert_eq!(found.len(), 4);
    }

    #[test]
    fn long_chains_yield_one_outermost_chain() {
        let tree = parse_script(&format!("SELECT {}", vec!["'x'"; 20_000].join(" + ")))
            .expect("parse");
        let chains = collect(&tree).outermost();
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].operands.len(), 20_000);
    }

    #[test]
    fn detects_repeated_separator_chains() {
        let tree = parse_script("SELECT a + ', ' + ISNULL(b, '') + ', ' + c").expect("parse");
        let chain = flatten(first_select_expr(&tree), BinaryOperator::Add);
        assert_eq!(match_separator_chain(&chain.operands), Some(", "));

        let tree = parse_script("SELECT a + ', ' + ISNULL(b, '') + '; ' + c").expect("parse");
        let chain = flatten(first_select_expr(&tree), BinaryOperator::Add);
        assert_eq!(match_separator_chain(&chain.operands), None);

        let tree = parse_script("SELECT a + ', ' + b + ', ' + c").expect("parse");
        let chain = flatten(first_select_expr(&tree), BinaryOperator::Add);
        assert_eq!(match_separator_chain(&chain.operands), None);
    }

    #[test]
    fn deep_searches_stay_inside_the_operand() {
        let tree = parse_script("SELECT COALESCE(a, N'x')").expect("parse");
        let expr = first_select_expr(&tree);
        assert!(contains_string_literal(expr));
        assert!(contains_function_call(expr, NULL_HANDLING_FUNCTIONS));
        assert!(!contains_conversion(expr));
        assert!(!is_string_literal(expr));
    }
}
