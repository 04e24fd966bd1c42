//! Clause logic trees
//!
//! Clause logic is authored in a normalized form where every node is an
//! object `{"operator": "<op>", "arguments": [...]}`. Before evaluation it is
//! transpiled to the canonical form `{"<op>": [...]}`. Arguments are either
//! JSON primitives (or arrays of them) or nested nodes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The closed set of operators the evaluator understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Logical AND over all arguments
    And,
    /// Logical OR over all arguments
    Or,
    /// Logical negation
    Not,
    /// Truthiness cast
    Truthy,
    /// `if`/`else if`/`else` chain
    If,
    /// Loose equality
    Eq,
    /// Loose inequality
    Ne,
    /// Strict equality
    StrictEq,
    /// Strict inequality
    StrictNe,
    /// Greater than
    Gt,
    /// Greater than or equal
    Ge,
    /// Less than (also `a < b < c` with three arguments)
    Lt,
    /// Less than or equal (also between with three arguments)
    Le,
    /// Sum
    Add,
    /// Difference (or negation with one argument)
    Sub,
    /// Product
    Mul,
    /// Quotient
    Div,
    /// Remainder
    Mod,
    /// Minimum of numeric arguments
    Min,
    /// Maximum of numeric arguments
    Max,
    /// Variable lookup by dotted path, with optional default
    Var,
    /// Names of missing variables
    Missing,
    /// Membership in an array or substring in a string
    In,
}

/// Operator family, used for documentation and validation messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorFamily {
    /// Boolean logic
    Boolean,
    /// Comparisons
    Comparison,
    /// Arithmetic
    Arithmetic,
    /// Data access
    Variable,
    /// Membership tests
    Membership,
}

impl Operator {
    /// Every supported operator
    pub const ALL: [Operator; 23] = [
        Operator::And,
        Operator::Or,
        Operator::Not,
        Operator::Truthy,
        Operator::If,
        Operator::Eq,
        Operator::Ne,
        Operator::StrictEq,
        Operator::StrictNe,
        Operator::Gt,
        Operator::Ge,
        Operator::Lt,
        Operator::Le,
        Operator::Add,
        Operator::Sub,
        Operator::Mul,
        Operator::Div,
        Operator::Mod,
        Operator::Min,
        Operator::Max,
        Operator::Var,
        Operator::Missing,
        Operator::In,
    ];

    /// Wire symbol of the operator
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::And => "and",
            Operator::Or => "or",
            Operator::Not => "!",
            Operator::Truthy => "!!",
            Operator::If => "if",
            Operator::Eq => "==",
            Operator::Ne => "!=",
            Operator::StrictEq => "===",
            Operator::StrictNe => "!==",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Mod => "%",
            Operator::Min => "min",
            Operator::Max => "max",
            Operator::Var => "var",
            Operator::Missing => "missing",
            Operator::In => "in",
        }
    }

    /// Parse an operator symbol. `not` is accepted as an alias for `!`.
    pub fn parse(s: &str) -> Option<Self> {
        if s == "not" {
            return Some(Operator::Not);
        }
        Self::ALL.iter().copied().find(|op| op.as_str() == s)
    }

    /// The operator's family
    pub fn family(&self) -> OperatorFamily {
        match self {
            Operator::And | Operator::Or | Operator::Not | Operator::Truthy | Operator::If => {
                OperatorFamily::Boolean
            }
            Operator::Eq
            | Operator::Ne
            | Operator::StrictEq
            | Operator::StrictNe
            | Operator::Gt
            | Operator::Ge
            | Operator::Lt
            | Operator::Le => OperatorFamily::Comparison,
            Operator::Add
            | Operator::Sub
            | Operator::Mul
            | Operator::Div
            | Operator::Mod
            | Operator::Min
            | Operator::Max => OperatorFamily::Arithmetic,
            Operator::Var | Operator::Missing => OperatorFamily::Variable,
            Operator::In => OperatorFamily::Membership,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Unknown operator: {}", s))
    }
}

/// A node in authoring ("normalized") form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicNode {
    /// Operator symbol
    pub operator: String,
    /// Operands
    #[serde(default)]
    pub arguments: Vec<LogicArg>,
}

/// An operand: a nested node or a plain JSON value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LogicArg {
    /// Nested node
    Node(Box<LogicNode>),
    /// Primitive, array or object literal
    Value(Value),
}

impl LogicNode {
    /// Create a node
    pub fn new(operator: Operator, arguments: Vec<LogicArg>) -> Self {
        Self {
            operator: operator.as_str().to_string(),
            arguments,
        }
    }

    /// Shorthand for a `var` lookup node
    pub fn var(path: impl Into<String>) -> Self {
        Self::new(Operator::Var, vec![LogicArg::Value(Value::String(path.into()))])
    }

    /// Resolve the operator symbol
    pub fn op(&self) -> Option<Operator> {
        Operator::parse(&self.operator)
    }

    /// Depth of the tree (a leaf node has depth 1)
    pub fn depth(&self) -> usize {
        1 + self
            .arguments
            .iter()
            .map(|a| match a {
                LogicArg::Node(n) => n.depth(),
                LogicArg::Value(_) => 0,
            })
            .max()
            .unwrap_or(0)
    }
}

impl From<LogicNode> for LogicArg {
    fn from(node: LogicNode) -> Self {
        LogicArg::Node(Box::new(node))
    }
}

impl From<Value> for LogicArg {
    fn from(value: Value) -> Self {
        LogicArg::Value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operator_round_trip_symbols() {
        for op in Operator::ALL {
            assert_eq!(Operator::parse(op.as_str()), Some(op));
        }
        assert_eq!(Operator::parse("not"), Some(Operator::Not));
        assert!(Operator::parse("xor").is_none());
    }

    #[test]
    fn test_families() {
        assert_eq!(Operator::And.family(), OperatorFamily::Boolean);
        assert_eq!(Operator::Le.family(), OperatorFamily::Comparison);
        assert_eq!(Operator::Max.family(), OperatorFamily::Arithmetic);
        assert_eq!(Operator::Var.family(), OperatorFamily::Variable);
        assert_eq!(Operator::In.family(), OperatorFamily::Membership);
    }

    #[test]
    fn test_untagged_argument_parsing() {
        let node: LogicNode = serde_json::from_value(json!({
            "operator": "<=",
            "arguments": [
                {"operator": "var", "arguments": ["vehicle.odometer_km"]},
                150000
            ]
        }))
        .unwrap();

        assert_eq!(node.op(), Some(Operator::Le));
        assert!(matches!(node.arguments[0], LogicArg::Node(_)));
        assert_eq!(node.arguments[1], LogicArg::Value(json!(150000)));
        assert_eq!(node.depth(), 2);
    }

    #[test]
    fn test_plain_object_argument_stays_a_value() {
        let node: LogicNode = serde_json::from_value(json!({
            "operator": "==",
            "arguments": [{"currency": "EUR"}, {"currency": "EUR"}]
        }))
        .unwrap();
        assert!(matches!(node.arguments[0], LogicArg::Value(_)));
    }
}
