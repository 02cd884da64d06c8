//! The built-in model catalogs.
//!
//! Built-ins are immutable and never persisted. Every default parameter is 1.

use super::Category;

/// `(name, lambda clause, default parameter count)`.
type BuiltinEntry = (&'static str, &'static str, usize);

const LINEAR: &[BuiltinEntry] = &[
    ("constant", "lambda x, a : a", 1),
    ("ax", "lambda x, a : a*x", 1),
    ("ax+b", "lambda x, a, b : a*x+b", 2),
    ("a(x-b)", "lambda x, a, b : a*(x-b)", 2),
];

const POWER: &[BuiltinEntry] = &[
    ("ax^n", "lambda x, a, n : a*(x**n)", 2),
    ("a+bx^n", "lambda x, a, b, n : a+b*(x**n)", 3),
    ("a(x-b)^n", "lambda x, a, b, n : a*((x-b)**n)", 3),
    ("a+b(x-c)^n", "lambda x, a, b, c, n : a+b*((x-c)**n)", 4),
];

const EXPONENTIAL: &[BuiltinEntry] = &[
    ("exp(x/a)", "lambda x, a : a*exp(x/a)", 1),
    ("a*exp(x/b)", "lambda x, a, b : a*exp(x/b)", 2),
    ("a*exp(x/b) + c", "lambda x, a, b, c : a*exp(x/b) + c", 3),
    ("a*exp((x-b)/c)", "lambda x, a, b, c : a*exp((x-b)/c)", 3),
    ("a(1-exp(-x/b))", "lambda x, a, b : a*(1 - exp(-x/b))", 2),
];

/// Built-in entries of a category in declaration order. Empty for `Custom`.
pub(crate) fn entries(category: Category) -> &'static [BuiltinEntry] {
    match category {
        Category::Linear => LINEAR,
        Category::Power => POWER,
        Category::Exponential => EXPONENTIAL,
        Category::Custom => &[],
    }
}

/// Finds a built-in by name across all categories.
pub(crate) fn find(name: &str) -> Option<(Category, &'static BuiltinEntry)> {
    [Category::Linear, Category::Power, Category::Exponential]
        .into_iter()
        .find_map(|category| {
            entries(category)
                .iter()
                .find(|(entry, _, _)| *entry == name)
                .map(|entry| (category, entry))
        })
}

/// Whether `name` is taken by a built-in.
pub(crate) fn is_builtin(name: &str) -> bool {
    find(name).is_some()
}
