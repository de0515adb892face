//! Tie expressions
//!
//! A tied parameter takes its value from an expression over the other
//! parameters instead of being varied by the solver. Expressions reference
//! parameters either by position (`p[1]`) or by their `parname`, and may use
//! the usual arithmetic operators (`+ - * /`, `^` or `**` for powers) plus a
//! handful of functions.
//!
//! ```
//! use specfit_rs::parinfo::tied::{Expression, IndexContext};
//!
//! let expr = Expression::parse("2 * p[0] + 1").unwrap();
//! let values = [3.0, 0.0];
//! assert_eq!(expr.evaluate(&IndexContext::new(&values)).unwrap(), 7.0);
//! ```

use crate::parinfo::record::ParameterRecord;
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, digit1, multispace0},
    combinator::{map, map_res, recognize},
    error::Error as NomError,
    multi::{many0, separated_list0},
    number::complete::double,
    sequence::{delimited, pair, preceded},
    IResult, Parser,
};
use thiserror::Error;

/// Error that can occur during expression parsing or evaluation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    #[error("Failed to parse expression: {message}")]
    ParseError { message: String },

    #[error("Undefined variable: {name}")]
    UndefinedVariable { name: String },

    #[error("Parameter index {index} out of range for {len} parameters")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Invalid operation: {message}")]
    InvalidOperation { message: String },

    #[error("Undefined function: {name}")]
    UndefinedFunction { name: String },
}

/// Result type for expression evaluation
type ExprResult<T> = Result<T, ExpressionError>;

type PResult<'a, T> = IResult<&'a str, T>;

/// Expression AST node
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Constant number
    Number(f64),

    /// Positional parameter reference, `p[i]`
    Index(usize),

    /// Parameter referenced by name
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
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

/// Source of parameter values during evaluation
pub trait EvaluationContext {
    /// Value of the parameter at position `index`
    fn get_index(&self, index: usize) -> ExprResult<f64>;

    /// Value of the parameter called `name`
    fn get_variable(&self, name: &str) -> ExprResult<f64>;
}

/// Context that only resolves positional references
#[derive(Debug, Clone, Copy)]
pub struct IndexContext<'a> {
    values: &'a [f64],
}

impl<'a> IndexContext<'a> {
    pub fn new(values: &'a [f64]) -> Self {
        Self { values }
    }
}

impl EvaluationContext for IndexContext<'_> {
    fn get_index(&self, index: usize) -> ExprResult<f64> {
        self.values
            .get(index)
            .copied()
            .ok_or(ExpressionError::IndexOutOfRange {
                index,
                len: self.values.len(),
            })
    }

    fn get_variable(&self, name: &str) -> ExprResult<f64> {
        Err(ExpressionError::UndefinedVariable {
            name: name.to_string(),
        })
    }
}

/// Context resolving references against a parameter vector and the
/// records that name its entries
#[derive(Debug, Clone, Copy)]
pub struct ParInfoContext<'a> {
    values: &'a [f64],
    records: &'a [ParameterRecord],
}

impl<'a> ParInfoContext<'a> {
    pub fn new(values: &'a [f64], records: &'a [ParameterRecord]) -> Self {
        Self { values, records }
    }
}

impl EvaluationContext for ParInfoContext<'_> {
    fn get_index(&self, index: usize) -> ExprResult<f64> {
        IndexContext::new(self.values).get_index(index)
    }

    fn get_variable(&self, name: &str) -> ExprResult<f64> {
        self.records
            .iter()
            .find(|record| record.parname == name)
            .map(|record| record.n())
            .ok_or_else(|| ExpressionError::UndefinedVariable {
                name: name.to_string(),
            })
            .and_then(|index| self.get_index(index))
    }
}

impl Expression {
    /// Parse an expression from a string
    pub fn parse(input: &str) -> ExprResult<Self> {
        match expr_parser(input.trim()) {
            Ok((remainder, expr)) => {
                if remainder.trim().is_empty() {
                    Ok(expr)
                } else {
                    Err(ExpressionError::ParseError {
                        message: format!("Unexpected trailing characters: '{}'", remainder),
                    })
                }
            }
            Err(e) => Err(ExpressionError::ParseError {
                message: format!("{:?}", e),
            }),
        }
    }

    /// Evaluate the expression with the given context
    pub fn evaluate<C: EvaluationContext>(&self, context: &C) -> ExprResult<f64> {
        match self {
            Self::Number(n) => Ok(*n),

            Self::Index(index) => context.get_index(*index),

            Self::Variable(name) => context.get_variable(name),

            Self::Unary(UnaryOp::Neg, expr) => Ok(-expr.evaluate(context)?),

            Self::Binary(op, left, right) => {
                let lhs = left.evaluate(context)?;
                let rhs = right.evaluate(context)?;

                match op {
                    BinaryOp::Add => Ok(lhs + rhs),
                    BinaryOp::Sub => Ok(lhs - rhs),
                    BinaryOp::Mul => Ok(lhs * rhs),
                    BinaryOp::Div => {
                        if rhs == 0.0 {
                            Err(ExpressionError::DivisionByZero)
                        } else {
                            Ok(lhs / rhs)
                        }
                    }
                    BinaryOp::Pow => Ok(lhs.powf(rhs)),
                }
            }

            Self::Function(name, args) => {
                let evaluated = args
                    .iter()
                    .map(|arg| arg.evaluate(context))
                    .collect::<ExprResult<Vec<f64>>>()?;
                call_function(name, &evaluated)
            }
        }
    }

    /// Positions referenced through `p[i]`, sorted and deduplicated
    pub fn indices(&self) -> Vec<usize> {
        let mut found = Vec::new();
        self.walk(&mut |expr: &Expression| {
            if let Self::Index(index) = expr {
                found.push(*index);
            }
        });
        found.sort_unstable();
        found.dedup();
        found
    }

    /// Names referenced as variables, sorted and deduplicated
    pub fn variables(&self) -> Vec<String> {
        let mut found = Vec::new();
        self.walk(&mut |expr: &Expression| {
            if let Self::Variable(name) = expr {
                found.push(name.clone());
            }
        });
        found.sort();
        found.dedup();
        found
    }

    fn walk<F: FnMut(&Expression)>(&self, visit: &mut F) {
        visit(self);
        match self {
            Self::Number(_) | Self::Index(_) | Self::Variable(_) => {}
            Self::Unary(_, expr) => expr.walk(visit),
            Self::Binary(_, left, right) => {
                left.walk(visit);
                right.walk(visit);
            }
            Self::Function(_, args) => {
                for arg in args {
                    arg.walk(visit);
                }
            }
        }
    }
}

fn call_function(name: &str, args: &[f64]) -> ExprResult<f64> {
    let unary = |f: fn(f64) -> f64| {
        if args.len() == 1 {
            Ok(f(args[0]))
        } else {
            Err(ExpressionError::InvalidOperation {
                message: format!("{}() requires 1 argument, got {}", name, args.len()),
            })
        }
    };

    match name {
        "sin" => unary(f64::sin),
        "cos" => unary(f64::cos),
        "tan" => unary(f64::tan),
        "exp" => unary(f64::exp),
        "log" | "ln" => unary(f64::ln),
        "log10" => unary(f64::log10),
        "sqrt" => unary(f64::sqrt),
        "abs" => unary(f64::abs),
        "max" | "min" => {
            if args.len() < 2 {
                return Err(ExpressionError::InvalidOperation {
                    message: format!(
                        "{}() requires at least 2 arguments, got {}",
                        name,
                        args.len()
                    ),
                });
            }
            if name == "max" {
                Ok(args.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b)))
            } else {
                Ok(args.iter().fold(f64::INFINITY, |a, &b| a.min(b)))
            }
        }
        _ => Err(ExpressionError::UndefinedFunction {
            name: name.to_string(),
        }),
    }
}

/// Tie expressions of a parameter list, compiled once per solve
#[derive(Debug, Clone, Default)]
pub struct Ties {
    exprs: Vec<(usize, Expression)>,
}

impl Ties {
    /// Parse the `tied` field of every record that has one.
    ///
    /// Positional references are checked against the number of records, and
    /// named references must match some record's `parname`.
    pub fn compile(records: &[ParameterRecord]) -> ExprResult<Self> {
        let mut exprs = Vec::new();
        for record in records.iter().filter(|record| record.is_tied()) {
            let expr = Expression::parse(&record.tied)?;
            if let Some(&index) = expr.indices().iter().find(|&&i| i >= records.len()) {
                return Err(ExpressionError::IndexOutOfRange {
                    index,
                    len: records.len(),
                });
            }
            for name in expr.variables() {
                if !records.iter().any(|other| other.parname == name) {
                    return Err(ExpressionError::UndefinedVariable { name });
                }
            }
            exprs.push((record.n(), expr));
        }
        Ok(Self { exprs })
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    /// Overwrite tied entries of `values`, in index order.
    ///
    /// Later ties see the values written by earlier ones.
    pub fn apply(&self, values: &mut [f64], records: &[ParameterRecord]) -> ExprResult<()> {
        for (index, expr) in &self.exprs {
            let value = expr.evaluate(&ParInfoContext::new(values, records))?;
            values[*index] = value;
        }
        Ok(())
    }
}

// Parser functions using nom

/// Parse an identifier (variable or function name)
fn identifier(input: &str) -> PResult<'_, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))
    .parse(input)
}

fn open_paren(input: &str) -> PResult<'_, char> {
    preceded(multispace0, char('(')).parse(input)
}

fn close_paren(input: &str) -> PResult<'_, char> {
    preceded(multispace0, char(')')).parse(input)
}

fn comma(input: &str) -> PResult<'_, char> {
    preceded(multispace0, char(',')).parse(input)
}

fn sign_op(input: &str) -> PResult<'_, char> {
    preceded(multispace0, alt((char('-'), char('+')))).parse(input)
}

fn pow_op(input: &str) -> PResult<'_, &str> {
    preceded(multispace0, alt((tag("**"), tag("^")))).parse(input)
}

fn mul_op(input: &str) -> PResult<'_, char> {
    preceded(multispace0, alt((char('*'), char('/')))).parse(input)
}

fn add_op(input: &str) -> PResult<'_, char> {
    preceded(multispace0, alt((char('+'), char('-')))).parse(input)
}

/// Parse a number; only attempted when the input starts with a digit or '.'
fn number(input: &str) -> PResult<'_, Expression> {
    map(double, Expression::Number).parse(input)
}

/// Parse a positional reference `p[i]`
fn param_index(input: &str) -> PResult<'_, Expression> {
    map(
        delimited(
            (char('p'), multispace0, char('['), multispace0),
            map_res(digit1, |digits: &str| digits.parse::<usize>()),
            (multispace0, char(']')),
        ),
        Expression::Index,
    )
    .parse(input)
}

/// Parse a function call
fn function_call(input: &str) -> PResult<'_, Expression> {
    let (input, name) = identifier(input)?;
    let (input, _) = open_paren(input)?;
    let (input, args) = separated_list0(comma, expr_parser).parse(input)?;
    let (input, _) = close_paren(input)?;
    Ok((input, Expression::Function(name.to_string(), args)))
}

fn variable(input: &str) -> PResult<'_, Expression> {
    map(identifier, |name: &str| Expression::Variable(name.to_string())).parse(input)
}

fn parens(input: &str) -> PResult<'_, Expression> {
    delimited(open_paren, expr_parser, close_paren).parse(input)
}

/// Parse a primary expression (number, reference, function call, or parenthesized expression)
fn primary(input: &str) -> PResult<'_, Expression> {
    let (input, _) = multispace0::<&str, NomError<&str>>(input)?;

    if input.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return number(input);
    }

    alt((param_index, function_call, variable, parens)).parse(input)
}

/// Parse a power expression; right-associative, binding tighter than unary minus
fn power(input: &str) -> PResult<'_, Expression> {
    let (input, base) = primary(input)?;
    match pow_op(input) {
        Ok((after_op, _)) => {
            let (rest, exponent) = unary(after_op)?;
            Ok((
                rest,
                Expression::Binary(BinaryOp::Pow, Box::new(base), Box::new(exponent)),
            ))
        }
        Err(_) => Ok((input, base)),
    }
}

/// Parse a signed expression (-expr, +expr)
fn unary(input: &str) -> PResult<'_, Expression> {
    match sign_op(input) {
        Ok((rest, sign)) => {
            let (rest, operand) = unary(rest)?;
            if sign == '-' {
                Ok((rest, Expression::Unary(UnaryOp::Neg, Box::new(operand))))
            } else {
                Ok((rest, operand))
            }
        }
        Err(_) => power(input),
    }
}

/// Parse a multiplicative chain, folding to the left
fn term(input: &str) -> PResult<'_, Expression> {
    let (mut input, mut acc) = unary(input)?;
    while let Ok((after_op, op)) = mul_op(input) {
        let (rest, rhs) = unary(after_op)?;
        let op = if op == '*' { BinaryOp::Mul } else { BinaryOp::Div };
        acc = Expression::Binary(op, Box::new(acc), Box::new(rhs));
        input = rest;
    }
    Ok((input, acc))
}

/// Parse an additive chain, folding to the left
fn expr_parser(input: &str) -> PResult<'_, Expression> {
    let (mut input, mut acc) = term(input)?;
    while let Ok((after_op, op)) = add_op(input) {
        let (rest, rhs) = term(after_op)?;
        let op = if op == '+' { BinaryOp::Add } else { BinaryOp::Sub };
        acc = Expression::Binary(op, Box::new(acc), Box::new(rhs));
        input = rest;
    }
    Ok((input, acc))
}
