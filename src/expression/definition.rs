//! Compilation of definition strings.
//!
//! A definition has two `;`-separated parts: a lambda clause declaring the
//! independent variable and the parameters, and a tuple with one initial
//! guess per parameter.
//!
//! ```
//! use anafit::expression::compile;
//!
//! let compiled = compile("lambda x, a, b : a*x+b ; (1, 0.1)").unwrap();
//! assert_eq!(compiled.initial_params, vec![1.0, 0.1]);
//! assert_eq!(compiled.function.eval(2.0, &[3.0, 1.0]), 7.0);
//! ```

use ndarray::Array1;
use std::fmt;

use super::ast::{Expression, Node};
use super::parser;
use crate::error::{AnafitError, Result};

/// A compiled model function `f(x, p1, ..., pn)`.
#[derive(Debug, Clone, PartialEq)]
pub struct FitFunction {
    /// Name of the independent variable (usually `x`)
    variable: String,

    /// Parameter names, in declaration order
    params: Vec<String>,

    /// Body as written, whitespace-trimmed
    body_text: String,

    body: Node,
}

impl FitFunction {
    /// Name of the independent variable.
    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// Parameter names in declaration order.
    pub fn param_names(&self) -> &[String] {
        &self.params
    }

    /// Number of free parameters.
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// The normalized lambda clause, e.g. `lambda x, a, b : a*x+b`.
    pub fn clause(&self) -> String {
        format!(
            "lambda {}, {} : {}",
            self.variable,
            self.params.join(", "),
            self.body_text
        )
    }

    /// Evaluate the model at a single point.
    ///
    /// # Panics
    ///
    /// Panics if `params.len()` differs from [`arity`](Self::arity).
    pub fn eval(&self, x: f64, params: &[f64]) -> f64 {
        self.check_params(params);
        let mut slots = Vec::with_capacity(params.len() + 1);
        slots.push(x);
        slots.extend_from_slice(params);
        self.body.eval(&slots)
    }

    /// Evaluate the model at every point of `x`.
    ///
    /// # Panics
    ///
    /// Panics if `params.len()` differs from [`arity`](Self::arity).
    pub fn eval_many(&self, x: &Array1<f64>, params: &[f64]) -> Array1<f64> {
        self.check_params(params);
        let mut slots = Vec::with_capacity(params.len() + 1);
        slots.push(0.0);
        slots.extend_from_slice(params);
        x.mapv(|xi| {
            slots[0] = xi;
            self.body.eval(&slots)
        })
    }

    fn check_params(&self, params: &[f64]) {
        assert_eq!(
            params.len(),
            self.params.len(),
            "{} takes {} parameter(s)",
            self.clause(),
            self.params.len()
        );
    }
}

impl fmt::Display for FitFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.clause())
    }
}

/// Longest definition string [`compile`] accepts, in bytes.
pub const MAX_DEFINITION_LEN: usize = 4096;

/// Output of [`compile`]: the function and its initial-guess tuple.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledDefinition {
    pub function: FitFunction,
    pub initial_params: Vec<f64>,
}

impl CompiledDefinition {
    /// The normalized definition string, the form written to the catalog.
    pub fn canonical(&self) -> String {
        format!(
            "{} ; {}",
            self.function.clause(),
            format_tuple(&self.initial_params)
        )
    }
}

/// Render parameters as a tuple literal; a single value keeps its trailing
/// comma so it reads back as a 1-tuple.
pub fn format_tuple(values: &[f64]) -> String {
    match values {
        [single] => format!("({},)", single),
        _ => {
            let items: Vec<String> = values.iter().map(|v| v.to_string()).collect();
            format!("({})", items.join(", "))
        }
    }
}

/// Compile a definition string into a function and its initial parameters.
///
/// # Errors
///
/// `MalformedDefinition` when the `;` separator is missing or repeated, when
/// either part fails to parse, when a name is declared twice, when the body
/// uses a symbol outside the declared names, constants and whitelisted
/// functions, when the tuple length differs from the parameter count, or
/// when the text is longer than [`MAX_DEFINITION_LEN`] or nests deeper than
/// 64 levels.
pub fn compile(definition: &str) -> Result<CompiledDefinition> {
    if definition.len() > MAX_DEFINITION_LEN {
        return Err(malformed(&format!(
            "definition is {} bytes long, the limit is {}",
            definition.len(),
            MAX_DEFINITION_LEN
        )));
    }

    let parts: Vec<&str> = definition.split(';').collect();
    let (clause, tuple_text) = match parts.as_slice() {
        [clause, tuple] => (*clause, *tuple),
        [_] => return Err(malformed("missing ';' between the function and its parameters")),
        _ => return Err(malformed("more than one ';' separator")),
    };

    let function = compile_clause(clause)?;
    let initial_params = parse_initial_params(tuple_text)?;

    if initial_params.len() != function.arity() {
        return Err(malformed(&format!(
            "the function takes {} parameter(s) but {} initial value(s) were given",
            function.arity(),
            initial_params.len()
        )));
    }

    Ok(CompiledDefinition {
        function,
        initial_params,
    })
}

fn compile_clause(clause: &str) -> Result<FitFunction> {
    let (body_text, names) = parser::lambda_header(clause)
        .map_err(|_| malformed(&format!("expected 'lambda x, p1, ... : body', got '{}'", clause.trim())))?;

    let names: Vec<String> = names.into_iter().map(str::to_string).collect();
    if names.len() < 2 {
        return Err(malformed("the function needs at least one parameter after x"));
    }
    for (i, name) in names.iter().enumerate() {
        if names[..i].contains(name) {
            return Err(malformed(&format!("'{}' is declared twice", name)));
        }
    }

    let expr = parse_all(body_text)?;
    let body = expr.resolve(&names)?;

    let used = expr.variables();
    for param in &names[1..] {
        if !used.contains(param) {
            log::warn!("parameter '{}' does not appear in '{}'", param, body_text.trim());
        }
    }

    let mut names = names.into_iter();
    let variable = names.next().unwrap_or_default();
    Ok(FitFunction {
        variable,
        params: names.collect(),
        body_text: body_text.trim().to_string(),
        body,
    })
}

/// Parse the initial-guess tuple.
///
/// `(1, 2)` and `(1,)` are the canonical forms. The parenthesized scalar `(1)`
/// and the bare scalar `1` are accepted and read as a 1-tuple.
pub fn parse_initial_params(text: &str) -> Result<Vec<f64>> {
    if text.len() > MAX_DEFINITION_LEN {
        return Err(malformed("initial parameters are too long"));
    }
    let items = match parser::tuple(text) {
        Ok((rest, (items, _))) if rest.trim().is_empty() => items,
        _ => vec![parse_all(text)?],
    };

    items
        .iter()
        .map(|item| {
            let value = item.resolve(&[])?.eval(&[]);
            if value.is_finite() {
                Ok(value)
            } else {
                Err(malformed(&format!("initial value {} is not finite", value)))
            }
        })
        .collect()
}

fn parse_all(text: &str) -> Result<Expression> {
    match parser::expression(text) {
        Ok((rest, expr)) if rest.trim().is_empty() => Ok(expr),
        Ok((rest, _)) => Err(malformed(&format!(
            "unexpected '{}' in '{}'",
            rest.trim(),
            text.trim()
        ))),
        Err(nom::Err::Failure(e)) if e.code == nom::error::ErrorKind::TooLarge => Err(malformed(
            &format!("expression nests deeper than {} levels", parser::MAX_DEPTH),
        )),
        Err(_) => Err(malformed(&format!("cannot parse '{}'", text.trim()))),
    }
}

fn malformed(message: &str) -> AnafitError {
    AnafitError::MalformedDefinition(message.to_string())
}
