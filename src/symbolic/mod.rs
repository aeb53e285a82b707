//! Symbols and immutable expression trees used to write down neuron models as
//! systems of differential equations.
//!
//! Expressions are built with the usual arithmetic operators on [`Symbol`], [`Expr`]
//! and `f64` values, plus [`Expr::powf`] and [`Expr::exp`]. Building an expression never
//! evaluates anything, constants are only replaced by numbers when a model is compiled.
//!
//! ```rust
//! use std::collections::HashMap;
//! use neuro_ode::symbolic::{Expr, Symbol};
//!
//! let v = Symbol::new("V_m");
//! let k = Symbol::new("k");
//! let rate = 0.1 * (&v + 40.) / (1. - (-(&v + 40.) / &k).exp());
//!
//! let substituted = rate.substitute(&HashMap::from([(k.clone(), 10.)]));
//! assert!(!substituted.free_symbols().contains(&k));
//! ```

use std::{
    collections::{BTreeSet, HashMap},
    fmt::{Display, Formatter, Result},
    ops::{Add, Div, Mul, Neg, Sub},
    sync::Arc,
};


/// A named scalar placeholder, two symbols are the same symbol when their names are equal
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(Arc<str>);

impl Symbol {
    /// Creates a new symbol with the given name
    pub fn new(name: &str) -> Self {
        Symbol(Arc::from(name))
    }

    /// Name of the symbol
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Wraps the symbol in an expression
    pub fn expr(&self) -> Expr {
        Expr::Name(self.clone())
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "{}", self.0)
    }
}

/// Creates several symbols at once, `symbols(["g_K", "g_Na"])`
pub fn symbols<const N: usize>(names: [&str; N]) -> [Symbol; N] {
    names.map(Symbol::new)
}

/// Binary operators available in expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
}

impl Op {
    /// Applies the operator to two numbers
    pub fn apply(&self, lhs: f64, rhs: f64) -> f64 {
        match self {
            Op::Add => lhs + rhs,
            Op::Subtract => lhs - rhs,
            Op::Multiply => lhs * rhs,
            Op::Divide => lhs / rhs,
            Op::Power => lhs.powf(rhs),
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            Op::Add => "+",
            Op::Subtract => "-",
            Op::Multiply => "*",
            Op::Divide => "/",
            Op::Power => "^",
        }
    }
}

/// Transcendental functions available in expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Exp,
}

impl Function {
    /// Applies the function to a number
    pub fn apply(&self, x: f64) -> f64 {
        match self {
            Function::Exp => x.exp(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Function::Exp => "exp",
        }
    }
}

/// An immutable scalar expression over symbols and numeric literals
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Name(Symbol),
    UnaryMinus(Box<Expr>),
    BinOp {
        lhs: Box<Expr>,
        op: Op,
        rhs: Box<Expr>,
    },
    Function {
        function: Function,
        arg: Box<Expr>,
    },
}

impl Expr {
    /// Numeric literal
    pub fn number(value: f64) -> Self {
        Expr::Number(value)
    }

    /// Combines two expressions with a binary operator
    pub fn binary(lhs: Expr, op: Op, rhs: Expr) -> Self {
        Expr::BinOp { lhs: Box::new(lhs), op, rhs: Box::new(rhs) }
    }

    /// Raises the expression to the given power
    pub fn powf<E: Into<Expr>>(self, exponent: E) -> Self {
        Expr::binary(self, Op::Power, exponent.into())
    }

    /// Exponential of the expression
    pub fn exp(self) -> Self {
        Expr::Function { function: Function::Exp, arg: Box::new(self) }
    }

    /// Sums a sequence of expressions, an empty sequence sums to `0`
    pub fn sum<I: IntoIterator<Item = Expr>>(terms: I) -> Self {
        terms.into_iter()
            .reduce(|acc, term| acc + term)
            .unwrap_or(Expr::Number(0.))
    }

    /// Multiplies a sequence of expressions, an empty sequence multiplies to `1`
    pub fn product<I: IntoIterator<Item = Expr>>(factors: I) -> Self {
        factors.into_iter()
            .reduce(|acc, factor| acc * factor)
            .unwrap_or(Expr::Number(1.))
    }

    /// Returns the literal value if the expression is a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Expr::Number(x) => Some(*x),
            _ => None,
        }
    }

    /// Set of all symbols referenced by the expression
    pub fn free_symbols(&self) -> BTreeSet<Symbol> {
        let mut found = BTreeSet::new();
        self.collect_symbols(&mut found);

        found
    }

    fn collect_symbols(&self, found: &mut BTreeSet<Symbol>) {
        match self {
            Expr::Number(_) => {},
            Expr::Name(symbol) => { found.insert(symbol.clone()); },
            Expr::UnaryMinus(expr) => expr.collect_symbols(found),
            Expr::BinOp { lhs, rhs, .. } => {
                lhs.collect_symbols(found);
                rhs.collect_symbols(found);
            },
            Expr::Function { arg, .. } => arg.collect_symbols(found),
        }
    }

    /// Returns a new expression with every symbol found in `values` replaced by its value
    pub fn substitute(&self, values: &HashMap<Symbol, f64>) -> Expr {
        match self {
            Expr::Number(x) => Expr::Number(*x),
            Expr::Name(symbol) => match values.get(symbol) {
                Some(value) => Expr::Number(*value),
                None => Expr::Name(symbol.clone()),
            },
            Expr::UnaryMinus(expr) => Expr::UnaryMinus(Box::new(expr.substitute(values))),
            Expr::BinOp { lhs, op, rhs } => Expr::binary(
                lhs.substitute(values), *op, rhs.substitute(values)
            ),
            Expr::Function { function, arg } => Expr::Function {
                function: *function,
                arg: Box::new(arg.substitute(values)),
            },
        }
    }

    /// Collapses every subtree that only contains numbers into a single number
    pub fn fold_constants(&self) -> Expr {
        match self {
            Expr::Number(x) => Expr::Number(*x),
            Expr::Name(symbol) => Expr::Name(symbol.clone()),
            Expr::UnaryMinus(expr) => match expr.fold_constants() {
                Expr::Number(x) => Expr::Number(-x),
                folded => Expr::UnaryMinus(Box::new(folded)),
            },
            Expr::BinOp { lhs, op, rhs } => {
                let (lhs, rhs) = (lhs.fold_constants(), rhs.fold_constants());
                match (&lhs, &rhs) {
                    (Expr::Number(a), Expr::Number(b)) => Expr::Number(op.apply(*a, *b)),
                    _ => Expr::binary(lhs, *op, rhs),
                }
            },
            Expr::Function { function, arg } => match arg.fold_constants() {
                Expr::Number(x) => Expr::Number(function.apply(x)),
                folded => Expr::Function { function: *function, arg: Box::new(folded) },
            },
        }
    }

    /// Evaluates the expression by walking the tree, returns `None` if a symbol
    /// has no binding
    pub fn evaluate(&self, bindings: &HashMap<Symbol, f64>) -> Option<f64> {
        match self {
            Expr::Number(x) => Some(*x),
            Expr::Name(symbol) => bindings.get(symbol).copied(),
            Expr::UnaryMinus(expr) => expr.evaluate(bindings).map(|x| -x),
            Expr::BinOp { lhs, op, rhs } => {
                Some(op.apply(lhs.evaluate(bindings)?, rhs.evaluate(bindings)?))
            },
            Expr::Function { function, arg } => arg.evaluate(bindings).map(|x| function.apply(x)),
        }
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            Expr::Number(x) => write!(f, "{}", x),
            Expr::Name(symbol) => write!(f, "{}", symbol),
            Expr::UnaryMinus(expr) => write!(f, "-{}", expr),
            Expr::BinOp { lhs, op, rhs } => write!(f, "({} {} {})", lhs, op.symbol(), rhs),
            Expr::Function { function, arg } => write!(f, "{}({})", function.name(), arg),
        }
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Expr::Number(value)
    }
}

impl From<Symbol> for Expr {
    fn from(symbol: Symbol) -> Self {
        Expr::Name(symbol)
    }
}

impl From<&Symbol> for Expr {
    fn from(symbol: &Symbol) -> Self {
        Expr::Name(symbol.clone())
    }
}

impl From<&Expr> for Expr {
    fn from(expr: &Expr) -> Self {
        expr.clone()
    }
}

macro_rules! impl_binary_operators {
    ($($lhs:ty),*) => {
        $(
            impl<R: Into<Expr>> Add<R> for $lhs {
                type Output = Expr;

                fn add(self, rhs: R) -> Expr {
                    Expr::binary(self.into(), Op::Add, rhs.into())
                }
            }

            impl<R: Into<Expr>> Sub<R> for $lhs {
                type Output = Expr;

                fn sub(self, rhs: R) -> Expr {
                    Expr::binary(self.into(), Op::Subtract, rhs.into())
                }
            }

            impl<R: Into<Expr>> Mul<R> for $lhs {
                type Output = Expr;

                fn mul(self, rhs: R) -> Expr {
                    Expr::binary(self.into(), Op::Multiply, rhs.into())
                }
            }

            impl<R: Into<Expr>> Div<R> for $lhs {
                type Output = Expr;

                fn div(self, rhs: R) -> Expr {
                    Expr::binary(self.into(), Op::Divide, rhs.into())
                }
            }

            impl Neg for $lhs {
                type Output = Expr;

                fn neg(self) -> Expr {
                    Expr::UnaryMinus(Box::new(self.into()))
                }
            }
        )*
    };
}

macro_rules! impl_scalar_operators {
    ($($rhs:ty),*) => {
        $(
            impl Add<$rhs> for f64 {
                type Output = Expr;

                fn add(self, rhs: $rhs) -> Expr {
                    Expr::binary(Expr::Number(self), Op::Add, rhs.into())
                }
            }

            impl Sub<$rhs> for f64 {
                type Output = Expr;

                fn sub(self, rhs: $rhs) -> Expr {
                    Expr::binary(Expr::Number(self), Op::Subtract, rhs.into())
                }
            }

            impl Mul<$rhs> for f64 {
                type Output = Expr;

                fn mul(self, rhs: $rhs) -> Expr {
                    Expr::binary(Expr::Number(self), Op::Multiply, rhs.into())
                }
            }

            impl Div<$rhs> for f64 {
                type Output = Expr;

                fn div(self, rhs: $rhs) -> Expr {
                    Expr::binary(Expr::Number(self), Op::Divide, rhs.into())
                }
            }
        )*
    };
}

impl_binary_operators!(Expr, &Expr, Symbol, &Symbol);
impl_scalar_operators!(Expr, &Expr, Symbol, &Symbol);
