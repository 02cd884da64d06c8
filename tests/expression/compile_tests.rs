//! Definition strings compiled and evaluated end to end.

use anafit::expression::compile;
use anafit::AnafitError;
use approx::assert_relative_eq;

fn eval(body: &str, x: f64) -> f64 {
    let compiled = compile(&format!("lambda x, a : {} ; (1,)", body)).unwrap();
    compiled.function.eval(x, &[1.0])
}

fn assert_malformed(definition: &str) {
    match compile(definition) {
        Err(AnafitError::MalformedDefinition(_)) => {}
        other => panic!("expected MalformedDefinition for '{}', got {:?}", definition, other),
    }
}

#[test]
fn test_python_precedence() {
    assert_eq!(eval("-x**2 + 0*a", 3.0), -9.0);
    assert_eq!(eval("2**-1 + 0*a", 0.0), 0.5);
    assert_eq!(eval("2**3**2 + 0*a", 0.0), 512.0);
    assert_eq!(eval("2^3^2 + 0*a", 0.0), 512.0);
    assert_eq!(eval("8/4/2 + 0*a", 0.0), 1.0);
    assert_eq!(eval("1-2-3 + 0*a", 0.0), -4.0);
    assert_eq!(eval("a + 2*x**2", 2.0), 9.0);
    assert_eq!(eval("(a + 2)*x", 2.0), 6.0);
    assert_eq!(eval("--x*a", 2.0), 2.0);
}

#[test]
fn test_whitelisted_functions() {
    assert_relative_eq!(eval("a*exp(x)", 1.0), std::f64::consts::E);
    assert_relative_eq!(eval("a*ln(x)", std::f64::consts::E), 1.0);
    assert_relative_eq!(eval("a*log10(x)", 1000.0), 3.0);
    assert_relative_eq!(eval("a*sqrt(x)", 16.0), 4.0);
    assert_relative_eq!(eval("a*arctan2(x, 1)", 1.0), std::f64::consts::FRAC_PI_4);
    assert_relative_eq!(eval("a*max(x, 2)", 1.0), 2.0);
    assert_relative_eq!(eval("a*np.sin(pi*x)", 0.5), 1.0);
    assert_relative_eq!(eval("a*math.cos(x)", 0.0), 1.0);
    assert_relative_eq!(eval("a*pow(x, 3)", 2.0), 8.0);
}

#[test]
fn test_ieee_semantics() {
    assert_eq!(eval("a/x", 0.0), f64::INFINITY);
    assert!(eval("a*log(x)", -1.0).is_nan());
    assert!(eval("a*sqrt(x)", -4.0).is_nan());
}

#[test]
fn test_declared_names_shadow_constants() {
    let compiled = compile("lambda x, e : e*x ; (2)").unwrap();
    assert_eq!(compiled.function.eval(3.0, &[2.0]), 6.0);

    let compiled = compile("lambda t, k : exp(-k*t) ; (1)").unwrap();
    assert_eq!(compiled.function.variable(), "t");
    assert_relative_eq!(compiled.function.eval(1.0, &[1.0]), (-1f64).exp());
}

#[test]
fn test_rejected_definitions() {
    // Separator
    assert_malformed("lambda x, a : a*x");
    assert_malformed("lambda x, a : a*x ; (1) ; (2)");
    // Arity
    assert_malformed("lambda x, a, b : a*x+b ; (1)");
    assert_malformed("lambda x, a : a*x ; (1, 2)");
    assert_malformed("lambda x, a : a*x ; ()");
    // Declarations
    assert_malformed("lambda x : x ; (1)");
    assert_malformed("lambda x, a, a : a*x ; (1, 1)");
    // Symbols outside the declared names
    assert_malformed("lambda x, a : a*y ; (1)");
    assert_malformed("lambda x, a : __import__('os') ; (1)");
    assert_malformed("lambda x, a : os.system(a) ; (1)");
    assert_malformed("lambda x, a : x.real*a ; (1)");
    assert_malformed("lambda x, a : foo(x)*a ; (1)");
    assert_malformed("lambda x, a : exp(x, a) ; (1)");
    // Syntax
    assert_malformed("lambda x, a : a* ; (1)");
    assert_malformed("lambda x, a : (a*x ; (1)");
    assert_malformed("def f(x, a): return a*x ; (1)");
}

#[test]
fn test_legacy_forms_normalize() {
    for definition in [
        "lambda x, a : a*x ; (1)",
        "lambda x, a : a*x ; 1",
        "lambda x,a:a*x;(1,)",
    ] {
        let compiled = compile(definition).unwrap();
        assert_eq!(compiled.canonical(), "lambda x, a : a*x ; (1,)", "{}", definition);
    }
}
