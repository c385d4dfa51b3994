//! Restricted arithmetic expressions for user-defined control formulas.
//!
//! Supported syntax:
//!
//! - numeric literals (`0.5`, `12`, `1e-3`)
//! - variables `temp_target`, `current_temp`, `outdoor_temp`, `solar`, `t`
//! - `+ - * /`, unary minus, parentheses
//! - comparisons `< <= > >= == !=`, evaluating to `1` or `0`
//! - functions `clamp(x, lo, hi)`, `min(a, b)`, `max(a, b)`, `abs(x)`,
//!   `if(cond, a, b)` (`cond` is true when non-zero)
//!
//! There are no assignments, loops, or calls outside that list, so a formula
//! can only ever compute a number from the control state.
//!
//! ```
//! use microgrid_sim::sim::expr::Expr;
//! use microgrid_sim::sim::types::ControlState;
//!
//! let expr: Expr = "clamp(0.6 * (temp_target - outdoor_temp), -1, 1)".parse().unwrap();
//! let state = ControlState::new(22.0, 20.0, 0.0);
//! assert!((expr.eval(&state, 0).unwrap() - 1.0).abs() < 1e-12);
//! ```

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::types::ControlState;

/// Parse or evaluation failure of a control formula.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    #[error("unexpected character '{ch}' at offset {pos}")]
    UnexpectedChar { pos: usize, ch: char },

    #[error("invalid number \"{text}\" at offset {pos}")]
    InvalidNumber { pos: usize, text: String },

    #[error("unexpected {found} at offset {pos}")]
    UnexpectedToken { pos: usize, found: String },

    #[error("unexpected end of formula")]
    UnexpectedEnd,

    #[error("unknown variable \"{0}\"")]
    UnknownVariable(String),

    #[error("unknown function \"{0}\"")]
    UnknownFunction(String),

    #[error("{name}() takes {expected} argument(s), got {found}")]
    Arity {
        name: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("formula produced a non-finite value")]
    NonFinite,

    #[error("formula nests deeper than {limit} levels")]
    TooDeep { limit: usize },

    #[error("formula is longer than {limit} tokens")]
    TooLong { limit: usize },
}

/// Deepest allowed nesting of parentheses, calls, and unary signs.
pub const MAX_DEPTH: usize = 64;

/// Longest accepted formula, in tokens.
///
/// Bounds the tree depth of long operator chains, which parse iteratively
/// but are evaluated recursively.
pub const MAX_TOKENS: usize = 1024;

/// Control-state variable readable from a formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Var {
    TempTarget,
    CurrentTemp,
    OutdoorTemp,
    Solar,
    Step,
}

impl Var {
    fn lookup(name: &str) -> Option<Self> {
        match name {
            "temp_target" => Some(Var::TempTarget),
            "current_temp" => Some(Var::CurrentTemp),
            "outdoor_temp" => Some(Var::OutdoorTemp),
            "solar" => Some(Var::Solar),
            "t" => Some(Var::Step),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Var::TempTarget => "temp_target",
            Var::CurrentTemp => "current_temp",
            Var::OutdoorTemp => "outdoor_temp",
            Var::Solar => "solar",
            Var::Step => "t",
        }
    }

    fn value(self, state: &ControlState, step: usize) -> f64 {
        match self {
            Var::TempTarget => state.temp_target,
            Var::CurrentTemp => state.current_temp,
            Var::OutdoorTemp => state.outdoor_temp,
            Var::Solar => state.solar,
            Var::Step => step as f64,
        }
    }
}

/// Built-in function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func {
    Clamp,
    Min,
    Max,
    Abs,
    If,
}

impl Func {
    fn lookup(name: &str) -> Option<Self> {
        match name {
            "clamp" => Some(Func::Clamp),
            "min" => Some(Func::Min),
            "max" => Some(Func::Max),
            "abs" => Some(Func::Abs),
            "if" => Some(Func::If),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Func::Clamp => "clamp",
            Func::Min => "min",
            Func::Max => "max",
            Func::Abs => "abs",
            Func::If => "if",
        }
    }

    fn arity(self) -> usize {
        match self {
            Func::Abs => 1,
            Func::Min | Func::Max => 2,
            Func::Clamp | Func::If => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl BinOp {
    fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Num(f64),
    Var(Var),
    Neg(Box<Node>),
    Bin(BinOp, Box<Node>, Box<Node>),
    Call(Func, Vec<Node>),
}

/// A parsed control formula.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    root: Node,
}

impl Expr {
    /// Parses `source` into an expression tree.
    ///
    /// # Errors
    ///
    /// Returns an `ExprError` describing the first syntax problem found,
    /// including `TooLong` past [`MAX_TOKENS`] and `TooDeep` past [`MAX_DEPTH`].
    pub fn parse(source: &str) -> Result<Self, ExprError> {
        let tokens = tokenize(source)?;
        let mut parser = Parser {
            tokens,
            pos: 0,
            depth: 0,
        };
        let root = parser.comparison()?;
        if let Some(tok) = parser.peek() {
            return Err(ExprError::UnexpectedToken {
                pos: tok.pos,
                found: tok.kind.describe(),
            });
        }
        Ok(Self { root })
    }

    /// Evaluates the formula against a control state and step index.
    ///
    /// # Errors
    ///
    /// Returns `DivisionByZero` or `NonFinite` when the arithmetic breaks down.
    pub fn eval(&self, state: &ControlState, step: usize) -> Result<f64, ExprError> {
        let value = eval_node(&self.root, state, step)?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(ExprError::NonFinite)
        }
    }
}

impl FromStr for Expr {
    type Err = ExprError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_node(f, &self.root)
    }
}

fn write_node(f: &mut fmt::Formatter<'_>, node: &Node) -> fmt::Result {
    match node {
        Node::Num(n) => write!(f, "{n}"),
        Node::Var(v) => f.write_str(v.name()),
        Node::Neg(inner) => {
            f.write_str("-(")?;
            write_node(f, inner)?;
            f.write_str(")")
        }
        Node::Bin(op, lhs, rhs) => {
            f.write_str("(")?;
            write_node(f, lhs)?;
            write!(f, " {} ", op.symbol())?;
            write_node(f, rhs)?;
            f.write_str(")")
        }
        Node::Call(func, args) => {
            write!(f, "{}(", func.name())?;
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write_node(f, arg)?;
            }
            f.write_str(")")
        }
    }
}

fn truth(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

fn eval_node(node: &Node, state: &ControlState, step: usize) -> Result<f64, ExprError> {
    match node {
        Node::Num(n) => Ok(*n),
        Node::Var(v) => Ok(v.value(state, step)),
        Node::Neg(inner) => Ok(-eval_node(inner, state, step)?),
        Node::Bin(op, lhs, rhs) => {
            let a = eval_node(lhs, state, step)?;
            let b = eval_node(rhs, state, step)?;
            Ok(match op {
                BinOp::Add => a + b,
                BinOp::Sub => a - b,
                BinOp::Mul => a * b,
                BinOp::Div => {
                    if b == 0.0 {
                        return Err(ExprError::DivisionByZero);
                    }
                    a / b
                }
                BinOp::Lt => truth(a < b),
                BinOp::Le => truth(a <= b),
                BinOp::Gt => truth(a > b),
                BinOp::Ge => truth(a >= b),
                BinOp::Eq => truth(a == b),
                BinOp::Ne => truth(a != b),
            })
        }
        Node::Call(func, args) => {
            let eval = |n: &Node| eval_node(n, state, step);
            match (func, args.as_slice()) {
                // Only the selected branch is evaluated.
                (Func::If, [cond, then, otherwise]) => {
                    if eval(cond)? != 0.0 {
                        eval(then)
                    } else {
                        eval(otherwise)
                    }
                }
                // max-then-min never panics on an inverted range; `hi` wins.
                (Func::Clamp, [x, lo, hi]) => Ok(eval(x)?.max(eval(lo)?).min(eval(hi)?)),
                (Func::Min, [a, b]) => Ok(eval(a)?.min(eval(b)?)),
                (Func::Max, [a, b]) => Ok(eval(a)?.max(eval(b)?)),
                (Func::Abs, [x]) => Ok(eval(x)?.abs()),
                (func, args) => Err(ExprError::Arity {
                    name: func.name(),
                    expected: func.arity(),
                    found: args.len(),
                }),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Num(f64),
    Ident(String),
    Op(BinOp),
    LParen,
    RParen,
    Comma,
}

impl TokenKind {
    fn describe(&self) -> String {
        match self {
            TokenKind::Num(n) => format!("number {n}"),
            TokenKind::Ident(s) => format!("identifier \"{s}\""),
            TokenKind::Op(op) => format!("'{}'", op.symbol()),
            TokenKind::LParen => "'('".to_string(),
            TokenKind::RParen => "')'".to_string(),
            TokenKind::Comma => "','".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    pos: usize,
}

fn tokenize(source: &str) -> Result<Vec<Token>, ExprError> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0usize;

    while i < bytes.len() {
        let c = bytes[i];
        let start = i;
        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }

        let kind = if c.is_ascii_digit() || c == b'.' {
            while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                i += 1;
            }
            // exponent: e, E, optionally signed
            if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
                let mut j = i + 1;
                if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
                    j += 1;
                }
                if j < bytes.len() && bytes[j].is_ascii_digit() {
                    i = j;
                    while i < bytes.len() && bytes[i].is_ascii_digit() {
                        i += 1;
                    }
                }
            }
            let text = &source[start..i];
            let n = text.parse::<f64>().map_err(|_| ExprError::InvalidNumber {
                pos: start,
                text: text.to_string(),
            })?;
            TokenKind::Num(n)
        } else if c.is_ascii_alphabetic() || c == b'_' {
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                i += 1;
            }
            TokenKind::Ident(source[start..i].to_string())
        } else {
            let next = bytes.get(i + 1).copied();
            let (kind, len) = match (c, next) {
                (b'<', Some(b'=')) => (TokenKind::Op(BinOp::Le), 2),
                (b'>', Some(b'=')) => (TokenKind::Op(BinOp::Ge), 2),
                (b'=', Some(b'=')) => (TokenKind::Op(BinOp::Eq), 2),
                (b'!', Some(b'=')) => (TokenKind::Op(BinOp::Ne), 2),
                (b'<', _) => (TokenKind::Op(BinOp::Lt), 1),
                (b'>', _) => (TokenKind::Op(BinOp::Gt), 1),
                (b'+', _) => (TokenKind::Op(BinOp::Add), 1),
                (b'-', _) => (TokenKind::Op(BinOp::Sub), 1),
                (b'*', _) => (TokenKind::Op(BinOp::Mul), 1),
                (b'/', _) => (TokenKind::Op(BinOp::Div), 1),
                (b'(', _) => (TokenKind::LParen, 1),
                (b')', _) => (TokenKind::RParen, 1),
                (b',', _) => (TokenKind::Comma, 1),
                _ => {
                    let ch = source[start..].chars().next().unwrap_or('?');
                    return Err(ExprError::UnexpectedChar { pos: start, ch });
                }
            };
            i += len;
            kind
        };

        if tokens.len() == MAX_TOKENS {
            return Err(ExprError::TooLong { limit: MAX_TOKENS });
        }
        tokens.push(Token { kind, pos: start });
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    /// Runs `f` one nesting level deeper, failing past [`MAX_DEPTH`].
    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ExprError>,
    ) -> Result<T, ExprError> {
        if self.depth >= MAX_DEPTH {
            return Err(ExprError::TooDeep { limit: MAX_DEPTH });
        }
        self.depth += 1;
        let out = f(self);
        self.depth -= 1;
        out
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Result<Token, ExprError> {
        let tok = self.tokens.get(self.pos).cloned().ok_or(ExprError::UnexpectedEnd)?;
        self.pos += 1;
        Ok(tok)
    }

    fn peek_op(&self) -> Option<BinOp> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Op(op),
                ..
            }) => Some(*op),
            _ => None,
        }
    }

    fn expect(&mut self, want: &TokenKind) -> Result<(), ExprError> {
        let tok = self.next()?;
        if &tok.kind == want {
            Ok(())
        } else {
            Err(ExprError::UnexpectedToken {
                pos: tok.pos,
                found: tok.kind.describe(),
            })
        }
    }

    fn comparison(&mut self) -> Result<Node, ExprError> {
        let lhs = self.additive()?;
        match self.peek_op() {
            Some(
                op @ (BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge | BinOp::Eq | BinOp::Ne),
            ) => {
                self.pos += 1;
                let rhs = self.additive()?;
                Ok(Node::Bin(op, Box::new(lhs), Box::new(rhs)))
            }
            _ => Ok(lhs),
        }
    }

    fn additive(&mut self) -> Result<Node, ExprError> {
        let mut node = self.term()?;
        while let Some(op @ (BinOp::Add | BinOp::Sub)) = self.peek_op() {
            self.pos += 1;
            let rhs = self.term()?;
            node = Node::Bin(op, Box::new(node), Box::new(rhs));
        }
        Ok(node)
    }

    fn term(&mut self) -> Result<Node, ExprError> {
        let mut node = self.unary()?;
        while let Some(op @ (BinOp::Mul | BinOp::Div)) = self.peek_op() {
            self.pos += 1;
            let rhs = self.unary()?;
            node = Node::Bin(op, Box::new(node), Box::new(rhs));
        }
        Ok(node)
    }

    fn unary(&mut self) -> Result<Node, ExprError> {
        match self.peek_op() {
            Some(BinOp::Sub) => {
                self.pos += 1;
                let inner = self.nested(Self::unary)?;
                Ok(Node::Neg(Box::new(inner)))
            }
            Some(BinOp::Add) => {
                self.pos += 1;
                self.nested(Self::unary)
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<Node, ExprError> {
        let tok = self.next()?;
        match tok.kind {
            TokenKind::Num(n) => Ok(Node::Num(n)),
            TokenKind::LParen => self.nested(|p| {
                let inner = p.comparison()?;
                p.expect(&TokenKind::RParen)?;
                Ok(inner)
            }),
            TokenKind::Ident(name) => {
                if matches!(self.peek().map(|t| &t.kind), Some(TokenKind::LParen)) {
                    self.pos += 1;
                    self.nested(|p| p.call(&name))
                } else {
                    Var::lookup(&name)
                        .map(Node::Var)
                        .ok_or(ExprError::UnknownVariable(name))
                }
            }
            other => Err(ExprError::UnexpectedToken {
                pos: tok.pos,
                found: other.describe(),
            }),
        }
    }

    /// Parses an argument list after the opening parenthesis.
    fn call(&mut self, name: &str) -> Result<Node, ExprError> {
        let func = Func::lookup(name).ok_or_else(|| ExprError::UnknownFunction(name.to_string()))?;

        let mut args = Vec::new();
        if matches!(self.peek().map(|t| &t.kind), Some(TokenKind::RParen)) {
            self.pos += 1;
        } else {
            loop {
                args.push(self.comparison()?);
                let tok = self.next()?;
                match tok.kind {
                    TokenKind::Comma => continue,
                    TokenKind::RParen => break,
                    other => {
                        return Err(ExprError::UnexpectedToken {
                            pos: tok.pos,
                            found: other.describe(),
                        });
                    }
                }
            }
        }

        if args.len() != func.arity() {
            return Err(ExprError::Arity {
                name: func.name(),
                expected: func.arity(),
                found: args.len(),
            });
        }
        Ok(Node::Call(func, args))
    }
}
