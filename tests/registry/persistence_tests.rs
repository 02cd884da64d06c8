//! Custom catalog persisted to a JSON file.

use std::fs;

use anafit::registry::{Category, FunctionRegistry, JsonFileStore};
use anafit::AnafitError;

use crate::test_helpers::TempFile;

#[test]
fn test_add_then_lookup_after_reload() {
    let file = TempFile::new("reload");
    {
        let mut registry = FunctionRegistry::new(JsonFileStore::new(file.path()));
        registry
            .add("quad", "lambda x, a, b, c : a*x**2 + b*x + c ; (1, 0, 0)")
            .unwrap();
    }

    let registry = FunctionRegistry::new(JsonFileStore::new(file.path()));
    let model = registry.lookup("quad").unwrap();
    assert_eq!(model.category, Category::Custom);
    assert_eq!(model.expression, "lambda x, a, b, c : a*x**2 + b*x + c");
    assert_eq!(model.default_params, vec![1.0, 0.0, 0.0]);
}

#[test]
fn test_every_mutation_is_written() {
    let file = TempFile::new("mutations");
    let mut registry = FunctionRegistry::new(JsonFileStore::new(file.path()));

    registry.add("b", "lambda x, a : a*x ; (1)").unwrap();
    registry.add("a", "lambda x, a : a+x ; (2)").unwrap();
    let text = fs::read_to_string(file.path()).unwrap();
    assert_eq!(
        text,
        "{\n  \"a\": \"lambda x, a : a+x ; (2,)\",\n  \"b\": \"lambda x, a : a*x ; (1,)\"\n}"
    );

    registry.remove("b").unwrap();
    let text = fs::read_to_string(file.path()).unwrap();
    assert!(!text.contains("\"b\""));

    registry.reset_to_defaults().unwrap();
    let text = fs::read_to_string(file.path()).unwrap();
    assert_eq!(
        text,
        "{\n  \"a(x-b)^2\": \"lambda x, a, b : a*(x-b)**2 ; (1, 1)\"\n}"
    );
}

#[test]
fn test_store_is_reread_on_every_access() {
    let file = TempFile::new("reread");
    let registry = FunctionRegistry::new(JsonFileStore::new(file.path()));
    assert!(registry.list_by_category(Category::Custom).unwrap().is_empty());

    fs::write(file.path(), r#"{"ext": "lambda x, a : a*x ; (3,)"}"#).unwrap();
    assert_eq!(registry.lookup("ext").unwrap().default_params, vec![3.0]);
}

#[test]
fn test_failed_edit_leaves_file_untouched() {
    let file = TempFile::new("failed_edit");
    let mut registry = FunctionRegistry::new(JsonFileStore::new(file.path()));
    registry.add("f", "lambda x, a : a*x ; (1)").unwrap();
    let before = fs::read_to_string(file.path()).unwrap();

    assert!(registry.edit("f", "g", "lambda x, a : a*x ; (1, 2)").is_err());
    assert_eq!(fs::read_to_string(file.path()).unwrap(), before);
}

#[test]
fn test_unreadable_catalog_is_persistence_error() {
    let file = TempFile::new("corrupt");
    fs::write(file.path(), "[1, 2").unwrap();
    let mut registry = FunctionRegistry::new(JsonFileStore::new(file.path()));

    assert!(matches!(
        registry.list_by_category(Category::Custom),
        Err(AnafitError::PersistenceError(_))
    ));
    assert!(matches!(
        registry.add("f", "lambda x, a : a ; (1)"),
        Err(AnafitError::PersistenceError(_))
    ));
    // Built-ins do not touch the store
    assert!(registry.lookup("ax").is_ok());
}
