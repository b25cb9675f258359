//! Ability System Module
//!
//! Provides the shared capability contract consumed by an external
//! dispatcher: static descriptors, per-call invocation requests with
//! fail-fast validation, and a catalog pairing descriptors with
//! implementations.

mod spreadsheet;
mod sql_query;

pub use spreadsheet::SpreadsheetIngestAbility;
pub use sql_query::{ConnectionParams, PgBackend, RelationalQueryAbility, SqlBackend, SqlSession};

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::RwLock;

use crate::error::{AbilityError, AbilityResult};
use crate::table::TabularValue;

/// Semantic type of a declared parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterType {
    String,
    Integer,
    Number,
    Boolean,
}

impl ParameterType {
    /// Whether a supplied JSON value has the declared shape
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            ParameterType::String => value.is_string(),
            ParameterType::Integer => value.is_i64() || value.is_u64(),
            ParameterType::Number => value.is_number(),
            ParameterType::Boolean => value.is_boolean(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterType::String => "string",
            ParameterType::Integer => "integer",
            ParameterType::Number => "number",
            ParameterType::Boolean => "boolean",
        }
    }
}

/// One declared parameter of an ability
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ParameterType,
    pub description: String,
    pub required: bool,
}

impl ParameterSpec {
    pub fn required(name: &str, kind: ParameterType, description: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            description: description.to_string(),
            required: true,
        }
    }

    pub fn optional(name: &str, kind: ParameterType, description: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            description: description.to_string(),
            required: false,
        }
    }
}

/// Static metadata describing one ability.
///
/// Created once at registration time and immutable afterwards; the name is
/// the unique identifier the dispatcher looks abilities up by.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbilityDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ParameterSpec>,
    pub output_type: String,
}

impl AbilityDescriptor {
    pub fn new(
        name: &str,
        description: &str,
        parameters: Vec<ParameterSpec>,
        output_type: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            parameters,
            output_type: output_type.to_string(),
        }
    }

    /// Render the descriptor as the JSON schema shape the external catalog
    /// and LLM prompts consume.
    pub fn to_schema(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "parameters": self.parameters.iter().map(|p| json!({
                "name": p.name,
                "type": p.kind.as_str(),
                "description": p.description,
                "required": p.required,
            })).collect::<Vec<_>>(),
            "output_type": self.output_type,
        })
    }

    /// Validate a request against the declared parameters.
    ///
    /// Runs at the boundary of `invoke`, before any I/O: missing required
    /// parameters, undeclared parameters, and type-shape mismatches all fail
    /// fast with `InvalidArgument`.
    pub fn validate(&self, request: &InvocationRequest) -> AbilityResult<()> {
        for spec in &self.parameters {
            match request.args.get(&spec.name) {
                None | Some(Value::Null) => {
                    if spec.required {
                        return Err(AbilityError::InvalidArgument(format!(
                            "missing required parameter '{}' for ability '{}'",
                            spec.name, self.name
                        )));
                    }
                }
                Some(value) => {
                    if !spec.kind.matches(value) {
                        return Err(AbilityError::InvalidArgument(format!(
                            "parameter '{}' must be of type {}",
                            spec.name,
                            spec.kind.as_str()
                        )));
                    }
                }
            }
        }
        for name in request.args.keys() {
            if !self.parameters.iter().any(|p| &p.name == name) {
                return Err(AbilityError::InvalidArgument(format!(
                    "unknown parameter '{}' for ability '{}'",
                    name, self.name
                )));
            }
        }
        Ok(())
    }
}

/// The runtime argument bundle for one ability call.
///
/// Constructed per call and discarded after the call returns; `task_id` is
/// an opaque correlation handle supplied by the calling agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationRequest {
    pub task_id: String,
    pub args: HashMap<String, Value>,
}

impl InvocationRequest {
    pub fn new(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            args: HashMap::new(),
        }
    }

    /// Request with a freshly generated correlation id
    pub fn generated() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string())
    }

    pub fn with_arg(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.args.insert(name.to_string(), value.into());
        self
    }

    pub fn str_arg(&self, name: &str) -> Option<&str> {
        self.args.get(name).and_then(Value::as_str)
    }

    pub fn i64_arg(&self, name: &str) -> Option<i64> {
        self.args.get(name).and_then(Value::as_i64)
    }

    pub fn bool_arg(&self, name: &str) -> Option<bool> {
        self.args.get(name).and_then(Value::as_bool)
    }
}

/// Trait for ingestion abilities invocable by agents.
///
/// Implementations hold no mutable state across calls; each `invoke` is
/// independent, acquires its own resources, and releases them before
/// returning. Abilities may therefore run concurrently with each other and
/// with themselves.
#[async_trait]
pub trait Ability: Send + Sync {
    /// Static metadata for the catalog
    fn descriptor(&self) -> &AbilityDescriptor;

    /// Execute one invocation, returning the normalized table
    async fn invoke(&self, request: &InvocationRequest) -> AbilityResult<TabularValue>;
}

/// Catalog pairing ability names with implementations.
///
/// Registration is explicit: the dispatcher registers instances once at
/// startup and looks them up by descriptor name. Dispatch policy itself
/// (retries, unknown-name handling) stays with the dispatcher.
pub struct AbilityCatalog {
    abilities: RwLock<HashMap<String, Arc<dyn Ability>>>,
}

impl AbilityCatalog {
    pub fn new() -> Self {
        Self {
            abilities: RwLock::new(HashMap::new()),
        }
    }

    /// Register an ability instance under its descriptor name
    pub async fn register_instance<T: Ability + 'static>(&self, ability: T) {
        let name = ability.descriptor().name.clone();
        let mut abilities = self.abilities.write().await;
        abilities.insert(name, Arc::new(ability));
    }

    /// Look up an ability by name
    pub async fn get(&self, name: &str) -> Option<Arc<dyn Ability>> {
        let abilities = self.abilities.read().await;
        abilities.get(name).cloned()
    }

    /// All registered ability names, sorted
    pub async fn names(&self) -> Vec<String> {
        let abilities = self.abilities.read().await;
        let mut names: Vec<String> = abilities.keys().cloned().collect();
        names.sort();
        names
    }

    /// Descriptor schemas for every registered ability, in name order
    pub async fn descriptors(&self) -> Vec<Value> {
        let abilities = self.abilities.read().await;
        let mut entries: Vec<(&String, &Arc<dyn Ability>)> = abilities.iter().collect();
        entries.sort_by_key(|(name, _)| name.to_string());
        entries
            .into_iter()
            .map(|(_, ability)| ability.descriptor().to_schema())
            .collect()
    }
}

impl Default for AbilityCatalog {
    fn default() -> Self {
        Self::new()
    }
}
