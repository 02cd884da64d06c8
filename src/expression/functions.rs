//! Whitelisted numeric functions and constants available in model bodies.

/// A function that may be called from a model body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Exp,
    Log,
    Log10,
    Log2,
    Sqrt,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Abs,
    Pow,
    Atan2,
    Min,
    Max,
}

/// Namespaces tolerated in front of a function name, so that definitions
/// written as `numpy.exp(x)` keep compiling.
const COMPAT_PREFIXES: [&str; 3] = ["numpy.", "np.", "math."];

impl Builtin {
    /// Resolve a (possibly namespaced) function name.
    ///
    /// Returns `None` for anything outside the whitelist, including any dotted
    /// name whose prefix is not one of the tolerated numeric namespaces.
    pub fn from_name(name: &str) -> Option<Self> {
        let bare = COMPAT_PREFIXES
            .iter()
            .find_map(|prefix| name.strip_prefix(prefix))
            .unwrap_or(name);

        let builtin = match bare {
            "exp" => Builtin::Exp,
            "log" | "ln" => Builtin::Log,
            "log10" => Builtin::Log10,
            "log2" => Builtin::Log2,
            "sqrt" => Builtin::Sqrt,
            "sin" => Builtin::Sin,
            "cos" => Builtin::Cos,
            "tan" => Builtin::Tan,
            "arcsin" | "asin" => Builtin::Asin,
            "arccos" | "acos" => Builtin::Acos,
            "arctan" | "atan" => Builtin::Atan,
            "sinh" => Builtin::Sinh,
            "cosh" => Builtin::Cosh,
            "tanh" => Builtin::Tanh,
            "abs" | "fabs" => Builtin::Abs,
            "pow" | "power" => Builtin::Pow,
            "arctan2" | "atan2" => Builtin::Atan2,
            "min" | "minimum" => Builtin::Min,
            "max" | "maximum" => Builtin::Max,
            _ => return None,
        };
        Some(builtin)
    }

    /// Number of arguments the function takes.
    pub fn arity(self) -> usize {
        match self {
            Builtin::Pow | Builtin::Atan2 | Builtin::Min | Builtin::Max => 2,
            _ => 1,
        }
    }

    /// Apply the function. `args.len()` has been checked against `arity` at
    /// compile time.
    pub fn apply(self, args: &[f64]) -> f64 {
        match self {
            Builtin::Exp => args[0].exp(),
            Builtin::Log => args[0].ln(),
            Builtin::Log10 => args[0].log10(),
            Builtin::Log2 => args[0].log2(),
            Builtin::Sqrt => args[0].sqrt(),
            Builtin::Sin => args[0].sin(),
            Builtin::Cos => args[0].cos(),
            Builtin::Tan => args[0].tan(),
            Builtin::Asin => args[0].asin(),
            Builtin::Acos => args[0].acos(),
            Builtin::Atan => args[0].atan(),
            Builtin::Sinh => args[0].sinh(),
            Builtin::Cosh => args[0].cosh(),
            Builtin::Tanh => args[0].tanh(),
            Builtin::Abs => args[0].abs(),
            Builtin::Pow => args[0].powf(args[1]),
            Builtin::Atan2 => args[0].atan2(args[1]),
            Builtin::Min => args[0].min(args[1]),
            Builtin::Max => args[0].max(args[1]),
        }
    }
}

/// Named constants. A declared variable or parameter with the same name wins.
pub fn constant(name: &str) -> Option<f64> {
    match name {
        "pi" => Some(std::f64::consts::PI),
        "e" => Some(std::f64::consts::E),
        _ => None,
    }
}
