//! Expression trees for model bodies.
//!
//! [`Expression`] is what the parser produces: names are still plain strings.
//! Resolving it against the declared variable list yields a [`Node`] tree where
//! every name has become either a slot index or a constant, and every call
//! points at a whitelisted [`Builtin`]. Only resolved trees can be evaluated.

use super::functions::{self, Builtin};
use crate::error::{AnafitError, Result};

/// Expression AST node
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Constant number
    Number(f64),

    /// Variable reference
    Variable(String),

    /// Unary operations
    Unary(UnaryOp, Box<Expression>),

    /// Binary operations
    Binary(BinaryOp, Box<Expression>, Box<Expression>),

    /// Function call
    Function(String, Vec<Expression>),
}

/// Unary operations
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnaryOp {
    /// Negation (-)
    Neg,
}

/// Binary operations
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinaryOp {
    /// Addition (+)
    Add,

    /// Subtraction (-)
    Sub,

    /// Multiplication (*)
    Mul,

    /// Division (/)
    Div,

    /// Power (** or ^)
    Pow,
}

impl BinaryOp {
    fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            BinaryOp::Add => lhs + rhs,
            BinaryOp::Sub => lhs - rhs,
            BinaryOp::Mul => lhs * rhs,
            BinaryOp::Div => lhs / rhs,
            BinaryOp::Pow => lhs.powf(rhs),
        }
    }
}

impl Expression {
    pub(crate) fn unary(op: UnaryOp, operand: Expression) -> Self {
        Expression::Unary(op, Box::new(operand))
    }

    pub(crate) fn binary(op: BinaryOp, lhs: Expression, rhs: Expression) -> Self {
        Expression::Binary(op, Box::new(lhs), Box::new(rhs))
    }

    /// Resolve names against `names`; `names[i]` becomes slot `i`.
    ///
    /// Fails with `MalformedDefinition` on any symbol that is neither declared,
    /// a named constant, nor a whitelisted function called with the right
    /// number of arguments.
    pub fn resolve(&self, names: &[String]) -> Result<Node> {
        match self {
            Expression::Number(n) => Ok(Node::Const(*n)),

            Expression::Variable(name) => {
                if let Some(slot) = names.iter().position(|n| n == name) {
                    return Ok(Node::Slot(slot));
                }
                if name.contains('.') {
                    return Err(AnafitError::MalformedDefinition(format!(
                        "attribute access '{}' is not allowed",
                        name
                    )));
                }
                functions::constant(name).map(Node::Const).ok_or_else(|| {
                    AnafitError::MalformedDefinition(format!("undefined symbol '{}'", name))
                })
            }

            Expression::Unary(op, operand) => {
                Ok(Node::Unary(*op, Box::new(operand.resolve(names)?)))
            }

            Expression::Binary(op, lhs, rhs) => Ok(Node::Binary(
                *op,
                Box::new(lhs.resolve(names)?),
                Box::new(rhs.resolve(names)?),
            )),

            Expression::Function(name, args) => {
                let builtin = Builtin::from_name(name).ok_or_else(|| {
                    AnafitError::MalformedDefinition(format!("function '{}' is not allowed", name))
                })?;
                if args.len() != builtin.arity() {
                    return Err(AnafitError::MalformedDefinition(format!(
                        "{}() takes {} argument(s), got {}",
                        name,
                        builtin.arity(),
                        args.len()
                    )));
                }
                let args = args
                    .iter()
                    .map(|arg| arg.resolve(names))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Node::Call(builtin, args))
            }
        }
    }

    /// Find all variable names used in the expression
    pub fn variables(&self) -> Vec<String> {
        let mut vars = Vec::new();
        self.collect_variables(&mut vars);
        vars.sort();
        vars.dedup();
        vars
    }

    fn collect_variables(&self, vars: &mut Vec<String>) {
        match self {
            Self::Number(_) => {}
            Self::Variable(name) => vars.push(name.clone()),
            Self::Unary(_, expr) => expr.collect_variables(vars),
            Self::Binary(_, left, right) => {
                left.collect_variables(vars);
                right.collect_variables(vars);
            }
            Self::Function(_, args) => {
                for arg in args {
                    arg.collect_variables(vars);
                }
            }
        }
    }
}

/// A resolved, evaluable expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Const(f64),
    Slot(usize),
    Unary(UnaryOp, Box<Node>),
    Binary(BinaryOp, Box<Node>, Box<Node>),
    Call(Builtin, Vec<Node>),
}

impl Node {
    /// Evaluate with `slots[i]` bound to the i-th declared name.
    ///
    /// Plain IEEE arithmetic: a division by zero gives an infinity and a
    /// domain error gives NaN, nothing panics.
    pub fn eval(&self, slots: &[f64]) -> f64 {
        match self {
            Node::Const(value) => *value,
            Node::Slot(index) => slots[*index],
            Node::Unary(UnaryOp::Neg, operand) => -operand.eval(slots),
            Node::Binary(op, lhs, rhs) => op.apply(lhs.eval(slots), rhs.eval(slots)),
            Node::Call(builtin, args) => match args.as_slice() {
                [a] => builtin.apply(&[a.eval(slots)]),
                [a, b] => builtin.apply(&[a.eval(slots), b.eval(slots)]),
                _ => {
                    let values: Vec<f64> = args.iter().map(|arg| arg.eval(slots)).collect();
                    builtin.apply(&values)
                }
            },
        }
    }
}
