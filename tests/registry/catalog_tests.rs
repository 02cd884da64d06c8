//! Built-in catalogs and custom catalog operations.

use anafit::registry::{Category, FunctionRegistry, MemoryStore, DEFAULT_CUSTOM_ENTRY};
use anafit::AnafitError;
use ndarray::array;

#[test]
fn test_every_builtin_evaluates_at_zero() {
    let registry = FunctionRegistry::in_memory();
    for category in [Category::Linear, Category::Power, Category::Exponential] {
        let models = registry.list_by_category(category).unwrap();
        assert!(!models.is_empty());
        for model in models {
            assert!(model.default_params.iter().all(|p| *p == 1.0), "{}", model.name);
            let compiled = model.compile().unwrap();
            // Evaluation never fails, even where the value is not finite
            let _ = compiled.function.eval(0.0, &model.default_params);
        }
    }
}

#[test]
fn test_builtin_values() {
    let registry = FunctionRegistry::in_memory();
    let eval = |name: &str, x: f64, params: &[f64]| {
        registry.lookup(name).unwrap().compile().unwrap().function.eval(x, params)
    };

    assert_eq!(eval("constant", 7.0, &[3.0]), 3.0);
    assert_eq!(eval("ax", 2.0, &[3.0]), 6.0);
    assert_eq!(eval("a(x-b)", 5.0, &[2.0, 1.0]), 8.0);
    assert_eq!(eval("a+b(x-c)^n", 3.0, &[1.0, 2.0, 1.0, 2.0]), 9.0);
    assert_eq!(eval("exp(x/a)", 0.0, &[2.0]), 2.0);
    assert_eq!(eval("a(1-exp(-x/b))", 0.0, &[5.0, 1.0]), 0.0);
}

#[test]
fn test_category_lists() {
    let registry = FunctionRegistry::in_memory();
    let names = |category| -> Vec<String> {
        registry
            .list_by_category(category)
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect()
    };
    assert_eq!(names(Category::Linear), vec!["constant", "ax", "ax+b", "a(x-b)"]);
    assert_eq!(names(Category::Power), vec!["ax^n", "a+bx^n", "a(x-b)^n", "a+b(x-c)^n"]);
    assert!(names(Category::Custom).is_empty());
}

#[test]
fn test_custom_insertion_order() {
    let mut registry = FunctionRegistry::new(MemoryStore::new());
    registry.add("zz", "lambda x, a : a*x ; (1)").unwrap();
    registry.add("aa", "lambda x, a : a+x ; (1)").unwrap();

    let custom = registry.list_by_category(Category::Custom).unwrap();
    assert_eq!(custom[0].name, "zz");
    assert_eq!(custom[1].name, "aa");
    assert!(custom.iter().all(|m| m.category == Category::Custom));
}

#[test]
fn test_builtins_are_read_only() {
    let mut registry = FunctionRegistry::in_memory();
    assert!(matches!(
        registry.add("ax+b", "lambda x, a, b : a*x+b ; (1, 1)"),
        Err(AnafitError::ReservedName(_))
    ));
    assert!(matches!(
        registry.edit("ax+b", "mine", "lambda x, a : a ; (1)"),
        Err(AnafitError::UnknownFunction(_))
    ));
    assert!(matches!(registry.remove("ax+b"), Err(AnafitError::UnknownFunction(_))));
    assert!(matches!(registry.lookup("missing"), Err(AnafitError::UnknownFunction(_))));
}

#[test]
fn test_edit_to_builtin_name_is_reserved() {
    let mut registry = FunctionRegistry::in_memory();
    registry.add("mine", "lambda x, a : a*x ; (1)").unwrap();
    assert!(matches!(
        registry.edit("mine", "ax", "lambda x, a : a*x ; (1)"),
        Err(AnafitError::ReservedName(_))
    ));
    assert!(registry.lookup("mine").is_ok());
}

#[test]
fn test_reset_to_defaults() {
    let mut registry = FunctionRegistry::in_memory();
    registry.add("mine", "lambda x, a : a*x ; (1)").unwrap();
    registry.reset_to_defaults().unwrap();

    let custom = registry.list_by_category(Category::Custom).unwrap();
    assert_eq!(custom.len(), 1);
    assert_eq!(custom[0].name, DEFAULT_CUSTOM_ENTRY.0);
    assert_eq!(custom[0].definition(), DEFAULT_CUSTOM_ENTRY.1);

    let compiled = custom[0].compile().unwrap();
    let y = compiled.function.eval_many(&array![0.0, 1.0, 3.0], &[2.0, 1.0]);
    assert_eq!(y, array![2.0, 0.0, 8.0]);
}
