//! nom parsers for model definitions.
//!
//! Grammar of a body, loosest binding first:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('-' | '+') unary | power
//! power   := atom (('**' | '^') unary)?
//! atom    := number | name '(' args ')' | name | '(' expr ')'
//! ```
//!
//! Binary operators fold to the left except the power, which is right
//! associative and binds tighter than a unary minus on its left.

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, digit0, digit1, multispace0, one_of},
    combinator::{opt, recognize},
    multi::{many0, separated_list1},
    sequence::{pair, preceded},
    IResult, Parser,
};

use super::ast::{BinaryOp, Expression, UnaryOp};

/// Parse a single character, skipping leading whitespace
fn symbol(input: &str, c: char) -> IResult<&str, char> {
    preceded(multispace0, char(c)).parse(input)
}

/// Parse a literal token, skipping leading whitespace
fn token<'a>(input: &'a str, t: &'static str) -> IResult<&'a str, &'a str> {
    preceded(multispace0, tag(t)).parse(input)
}

/// Parse an identifier (variable or function name)
pub(crate) fn identifier(input: &str) -> IResult<&str, &str> {
    preceded(
        multispace0,
        recognize(pair(
            alt((alpha1, tag("_"))),
            many0(alt((alphanumeric1, tag("_")))),
        )),
    )
    .parse(input)
}

/// Parse an identifier possibly qualified by dots (`numpy.exp`)
fn dotted_name(input: &str) -> IResult<&str, &str> {
    preceded(
        multispace0,
        recognize(separated_list1(
            char('.'),
            recognize(pair(
                alt((alpha1, tag("_"))),
                many0(alt((alphanumeric1, tag("_")))),
            )),
        )),
    )
    .parse(input)
}

/// Recognize an unsigned decimal literal: `12`, `1.`, `.5`, `3.2e-4`
fn number_text(input: &str) -> IResult<&str, &str> {
    preceded(
        multispace0,
        recognize((
            alt((
                recognize((digit1, opt((char('.'), digit0)))),
                recognize((char('.'), digit1)),
            )),
            opt((one_of("eE"), opt(one_of("+-")), digit1)),
        )),
    )
    .parse(input)
}

/// Parse a number
fn number(input: &str) -> IResult<&str, Expression> {
    let (rest, text) = number_text(input)?;
    match text.parse::<f64>() {
        Ok(value) => Ok((rest, Expression::Number(value))),
        Err(_) => Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Float,
        ))),
    }
}

/// Deepest nesting of parentheses, calls, exponents and signs in a body.
pub(crate) const MAX_DEPTH: usize = 64;

fn too_deep(input: &str) -> nom::Err<nom::error::Error<&str>> {
    nom::Err::Failure(nom::error::Error::new(
        input,
        nom::error::ErrorKind::TooLarge,
    ))
}

/// Parse a comma-separated list of expressions (for function arguments)
fn args_list(input: &str, depth: usize) -> IResult<&str, Vec<Expression>> {
    if let Ok((rest, _)) = symbol(input, ')') {
        return Ok((rest, Vec::new()));
    }

    let (mut input, first) = expression_at(input, depth)?;
    let mut args = vec![first];
    while let Ok((rest, _)) = symbol(input, ',') {
        let (rest, arg) = expression_at(rest, depth)?;
        args.push(arg);
        input = rest;
    }
    let (input, _) = symbol(input, ')')?;
    Ok((input, args))
}

/// Parse a number, a call, a name or a parenthesized expression
fn atom(input: &str, depth: usize) -> IResult<&str, Expression> {
    if let Ok(result) = number(input) {
        return Ok(result);
    }

    if let Ok((rest, _)) = symbol(input, '(') {
        let (rest, expr) = expression_at(rest, depth + 1)?;
        let (rest, _) = symbol(rest, ')')?;
        return Ok((rest, expr));
    }

    let (rest, name) = dotted_name(input)?;
    match symbol(rest, '(') {
        Ok((rest, _)) => {
            let (rest, args) = args_list(rest, depth + 1)?;
            Ok((rest, Expression::Function(name.to_string(), args)))
        }
        Err(_) => Ok((rest, Expression::Variable(name.to_string()))),
    }
}

/// Parse a power expression (atom ** unary)
fn power(input: &str, depth: usize) -> IResult<&str, Expression> {
    let (input, base) = atom(input, depth)?;
    let operator = token(input, "**").or_else(|_| token(input, "^"));
    match operator {
        Ok((rest, _)) => {
            let (rest, exponent) = unary(rest, depth + 1)?;
            Ok((rest, Expression::binary(BinaryOp::Pow, base, exponent)))
        }
        Err(_) => Ok((input, base)),
    }
}

/// Parse a signed expression (-expr, +expr)
fn unary(input: &str, depth: usize) -> IResult<&str, Expression> {
    if depth > MAX_DEPTH {
        return Err(too_deep(input));
    }
    if let Ok((rest, _)) = symbol(input, '-') {
        let (rest, operand) = unary(rest, depth + 1)?;
        return Ok((rest, Expression::unary(UnaryOp::Neg, operand)));
    }
    if let Ok((rest, _)) = symbol(input, '+') {
        return unary(rest, depth + 1);
    }
    power(input, depth)
}

/// Parse a multiplicative expression (expr * expr, expr / expr)
fn term(input: &str, depth: usize) -> IResult<&str, Expression> {
    let (mut input, mut acc) = unary(input, depth)?;
    loop {
        let op = if token(input, "**").is_ok() {
            None
        } else if let Ok((rest, _)) = symbol(input, '*') {
            Some((rest, BinaryOp::Mul))
        } else if let Ok((rest, _)) = symbol(input, '/') {
            Some((rest, BinaryOp::Div))
        } else {
            None
        };

        match op {
            Some((rest, op)) => {
                let (rest, rhs) = unary(rest, depth)?;
                acc = Expression::binary(op, acc, rhs);
                input = rest;
            }
            None => return Ok((input, acc)),
        }
    }
}

/// Parse an additive expression (expr + expr, expr - expr).
///
/// Nesting beyond [`MAX_DEPTH`] fails with `ErrorKind::TooLarge` as a
/// `nom::Err::Failure`.
pub(crate) fn expression(input: &str) -> IResult<&str, Expression> {
    expression_at(input, 0)
}

fn expression_at(input: &str, depth: usize) -> IResult<&str, Expression> {
    if depth > MAX_DEPTH {
        return Err(too_deep(input));
    }
    let (mut input, mut acc) = term(input, depth)?;
    loop {
        let op = if let Ok((rest, _)) = symbol(input, '+') {
            Some((rest, BinaryOp::Add))
        } else if let Ok((rest, _)) = symbol(input, '-') {
            Some((rest, BinaryOp::Sub))
        } else {
            None
        };

        match op {
            Some((rest, op)) => {
                let (rest, rhs) = term(rest, depth)?;
                acc = Expression::binary(op, acc, rhs);
                input = rest;
            }
            None => return Ok((input, acc)),
        }
    }
}

/// Parse `lambda <name>, <name>, ... :` and return the declared names
/// together with the untouched body text.
pub(crate) fn lambda_header(input: &str) -> IResult<&str, Vec<&str>> {
    let (rest, keyword) = identifier(input)?;
    if keyword != "lambda" {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Tag,
        )));
    }

    let (mut rest, first) = identifier(rest)?;
    let mut names = vec![first];
    while let Ok((after_comma, _)) = symbol(rest, ',') {
        let (after_name, name) = identifier(after_comma)?;
        names.push(name);
        rest = after_name;
    }
    let (rest, _) = symbol(rest, ':')?;
    Ok((rest, names))
}

/// Parse a parenthesized tuple of expressions.
///
/// Returns the elements and whether a trailing comma was present, which is
/// what distinguishes `(1,)` from the parenthesized scalar `(1)`.
pub(crate) fn tuple(input: &str) -> IResult<&str, (Vec<Expression>, bool)> {
    let (input, _) = symbol(input, '(')?;
    let (mut input, first) = expression(input)?;
    let mut items = vec![first];
    let mut trailing_comma = false;
    while let Ok((rest, _)) = symbol(input, ',') {
        input = rest;
        if symbol(input, ')').is_ok() {
            trailing_comma = true;
            break;
        }
        let (rest, item) = expression(input)?;
        items.push(item);
        input = rest;
    }
    let (input, _) = symbol(input, ')')?;
    Ok((input, (items, trailing_comma)))
}
