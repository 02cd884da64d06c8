//! Registry of named fit models.
//!
//! The registry serves three immutable built-in catalogs (linear, power and
//! exponential) and one custom catalog that is persisted through a
//! [`CatalogStore`]. Lookups consult the built-ins first.
//!
//! ```
//! use anafit::registry::{Category, FunctionRegistry};
//!
//! let mut registry = FunctionRegistry::in_memory();
//! registry.add("quad", "lambda x, a, b : a*x**2 + b ; (1, 0)").unwrap();
//!
//! let model = registry.lookup("quad").unwrap();
//! assert_eq!(model.category, Category::Custom);
//! assert_eq!(model.default_params, vec![1.0, 0.0]);
//! ```

mod builtin;
mod store;

pub use store::{CatalogStore, JsonFileStore, MemoryStore, CUSTOM_CATALOG_FILE};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AnafitError, Result};
use crate::expression::{compile, format_tuple, CompiledDefinition};

/// Name and definition of the entry written by [`FunctionRegistry::reset_to_defaults`].
pub const DEFAULT_CUSTOM_ENTRY: (&str, &str) = ("a(x-b)^2", "lambda x, a, b : a*(x-b)**2 ; (1, 1)");

/// Model families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Linear,
    Power,
    Exponential,
    Custom,
}

impl Category {
    /// All categories in menu order.
    pub const ALL: [Category; 4] = [
        Category::Linear,
        Category::Power,
        Category::Exponential,
        Category::Custom,
    ];
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Linear => "linear",
            Category::Power => "power",
            Category::Exponential => "exponential",
            Category::Custom => "custom",
        };
        f.write_str(name)
    }
}

/// A named model: a lambda clause and its default initial parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDefinition {
    pub name: String,
    pub category: Category,
    /// The lambda clause, e.g. `lambda x, a, b : a*x+b`
    pub expression: String,
    /// One initial guess per parameter
    pub default_params: Vec<f64>,
}

impl ModelDefinition {
    /// The full definition string `<clause> ; <tuple>`.
    pub fn definition(&self) -> String {
        format!("{} ; {}", self.expression, format_tuple(&self.default_params))
    }

    /// Compile the definition.
    pub fn compile(&self) -> Result<CompiledDefinition> {
        compile(&self.definition())
    }

    fn builtin(category: Category, entry: &(&str, &str, usize)) -> Self {
        let (name, clause, arity) = *entry;
        Self {
            name: name.to_string(),
            category,
            expression: clause.to_string(),
            default_params: vec![1.0; arity],
        }
    }

    fn custom(name: &str, definition: &str) -> Result<Self> {
        let compiled = compile_named(name, definition)?;
        Ok(Self {
            name: name.to_string(),
            category: Category::Custom,
            expression: compiled.function.clause(),
            default_params: compiled.initial_params,
        })
    }
}

/// Change notifications for the custom catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogEvent {
    Added { name: String },
    Edited { old_name: String, new_name: String },
    Removed { name: String },
    Reset,
}

type Listener = Box<dyn FnMut(&CatalogEvent)>;

/// Built-in and custom model definitions.
///
/// The custom catalog is re-read from the store on every access. Every
/// successful mutation is written back immediately and then announced to the
/// subscribers.
pub struct FunctionRegistry {
    store: Box<dyn CatalogStore>,
    listeners: Vec<Listener>,
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl FunctionRegistry {
    /// A registry whose custom catalog lives in `store`.
    pub fn new<S: CatalogStore + 'static>(store: S) -> Self {
        Self {
            store: Box::new(store),
            listeners: Vec::new(),
        }
    }

    /// A registry with an empty in-memory custom catalog.
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    /// Find a model by name, built-ins first. Names are compared with
    /// surrounding whitespace trimmed, as everywhere in the registry.
    pub fn lookup(&self, name: &str) -> Result<ModelDefinition> {
        let name = name.trim();
        if let Some((category, entry)) = builtin::find(name) {
            return Ok(ModelDefinition::builtin(category, entry));
        }
        let entries = self.store.load()?;
        match entries.iter().find(|(entry, _)| entry == name) {
            Some((name, definition)) => ModelDefinition::custom(name, definition),
            None => Err(AnafitError::UnknownFunction(name.to_string())),
        }
    }

    /// Whether `name` resolves to a model.
    pub fn contains(&self, name: &str) -> Result<bool> {
        let name = name.trim();
        if builtin::is_builtin(name) {
            return Ok(true);
        }
        Ok(self.store.load()?.iter().any(|(entry, _)| entry == name))
    }

    /// The models of one category: built-ins in declaration order, custom
    /// entries in storage order.
    pub fn list_by_category(&self, category: Category) -> Result<Vec<ModelDefinition>> {
        if category != Category::Custom {
            return Ok(builtin::entries(category)
                .iter()
                .map(|entry| ModelDefinition::builtin(category, entry))
                .collect());
        }
        self.store
            .load()?
            .iter()
            .map(|(name, definition)| ModelDefinition::custom(name, definition))
            .collect()
    }

    /// The raw custom catalog as stored.
    pub fn custom_entries(&self) -> Result<Vec<(String, String)>> {
        self.store.load()
    }

    /// Add a custom model.
    ///
    /// # Errors
    ///
    /// * `ReservedName` if `name` is a built-in
    /// * `DuplicateName` if `name` is already a custom model
    /// * `MalformedDefinition` if `definition` does not compile
    pub fn add(&mut self, name: &str, definition: &str) -> Result<()> {
        let name = validate_name(name)?;
        if builtin::is_builtin(name) {
            return Err(AnafitError::ReservedName(name.to_string()));
        }
        let mut entries = self.store.load()?;
        if entries.iter().any(|(entry, _)| entry == name) {
            return Err(AnafitError::DuplicateName(name.to_string()));
        }
        let compiled = compile_named(name, definition)?;

        entries.push((name.to_string(), compiled.canonical()));
        self.store.save(&entries)?;
        log::info!("added custom fit function {}", name);
        self.notify(CatalogEvent::Added {
            name: name.to_string(),
        });
        Ok(())
    }

    /// Replace the custom model `old_name` by `new_name` with `definition`.
    ///
    /// The new definition is validated before anything is written, so a
    /// failed edit leaves the catalog untouched.
    pub fn edit(&mut self, old_name: &str, new_name: &str, definition: &str) -> Result<()> {
        let old_name = old_name.trim();
        let mut entries = self.store.load()?;
        let position = entries
            .iter()
            .position(|(entry, _)| entry == old_name)
            .ok_or_else(|| AnafitError::UnknownFunction(old_name.to_string()))?;

        let new_name = validate_name(new_name)?;
        if builtin::is_builtin(new_name) {
            return Err(AnafitError::ReservedName(new_name.to_string()));
        }
        if new_name != old_name && entries.iter().any(|(entry, _)| entry == new_name) {
            return Err(AnafitError::DuplicateName(new_name.to_string()));
        }
        let compiled = compile_named(new_name, definition)?;

        entries.remove(position);
        entries.push((new_name.to_string(), compiled.canonical()));
        self.store.save(&entries)?;
        log::info!("edited custom fit function {} -> {}", old_name, new_name);
        self.notify(CatalogEvent::Edited {
            old_name: old_name.to_string(),
            new_name: new_name.to_string(),
        });
        Ok(())
    }

    /// Remove a custom model.
    pub fn remove(&mut self, name: &str) -> Result<()> {
        let name = name.trim();
        let mut entries = self.store.load()?;
        let position = entries
            .iter()
            .position(|(entry, _)| entry == name)
            .ok_or_else(|| AnafitError::UnknownFunction(name.to_string()))?;

        entries.remove(position);
        self.store.save(&entries)?;
        log::info!("removed custom fit function {}", name);
        self.notify(CatalogEvent::Removed {
            name: name.to_string(),
        });
        Ok(())
    }

    /// Replace the whole custom catalog by [`DEFAULT_CUSTOM_ENTRY`].
    pub fn reset_to_defaults(&mut self) -> Result<()> {
        let (name, definition) = DEFAULT_CUSTOM_ENTRY;
        self.store
            .save(&[(name.to_string(), definition.to_string())])?;
        log::info!("reset custom fit functions to defaults");
        self.notify(CatalogEvent::Reset);
        Ok(())
    }

    /// Register a callback run after every successful catalog mutation.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&CatalogEvent) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    fn notify(&mut self, event: CatalogEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }
}

fn validate_name(name: &str) -> Result<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AnafitError::InvalidInput(
            "a fit function name cannot be empty".to_string(),
        ));
    }
    Ok(trimmed)
}

fn compile_named(name: &str, definition: &str) -> Result<CompiledDefinition> {
    compile(definition).map_err(|e| match e {
        AnafitError::MalformedDefinition(msg) => {
            AnafitError::MalformedDefinition(format!("{}: {}", name, msg))
        }
        other => other,
    })
}
