use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use protomap_core::{
    FieldDescriptor, MessageContract, MessageSchema, Result, SchemaError, SchemaField, WireKind,
    WirePrimitive,
};

// prost rejects field ids outside this range at encode time
const MAX_FIELD_ID: u32 = (1 << 29) - 1;

/// Store of declared contracts and resolved schemas, keyed by wire type name.
///
/// Constructed explicitly and shared by the serialise/deserialise entry
/// points; there is no ambient global registry. Schemas are built lazily on
/// first use and registered at most once per type name.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    // Declared contracts; declaration stores metadata and performs no validation
    contracts: DashMap<String, MessageContract>,
    // Fully resolved schemas, insert-if-absent under concurrent first resolution
    schemas: DashMap<String, Arc<MessageSchema>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        SchemaRegistry::default()
    }

    /// Declare (or re-declare) a message contract. Re-declaring overwrites the
    /// stored contract but never an already resolved schema.
    pub fn declare(&self, contract: MessageContract) {
        self.contracts.insert(contract.type_name.clone(), contract);
    }

    /// Declare a contract unless one with the same type name already exists.
    /// Returns the type name for convenience.
    pub fn declare_if_absent(&self, contract: MessageContract) -> String {
        let type_name = contract.type_name.clone();
        self.contracts.entry(type_name.clone()).or_insert(contract);
        type_name
    }

    pub fn is_declared(&self, type_name: &str) -> bool {
        self.contracts.contains_key(type_name)
    }

    /// Resolved schema for a type name, if one has been registered.
    pub fn schema(&self, type_name: &str) -> Option<Arc<MessageSchema>> {
        self.schemas.get(type_name).map(|entry| entry.clone())
    }

    pub fn schema_names(&self) -> Vec<String> {
        self.schemas.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Resolve a declared type to its schema, building and registering it on
    /// first use. Repeated calls return the registered schema unchanged.
    pub fn resolve(&self, type_name: &str) -> Result<Arc<MessageSchema>> {
        if let Some(schema) = self.schema(type_name) {
            return Ok(schema);
        }
        let contract = self
            .contracts
            .get(type_name)
            .map(|entry| entry.clone())
            .ok_or_else(|| SchemaError::MissingContract(type_name.to_string()))?;
        self.build(&contract, &mut Vec::new())
    }

    /// JSON description of a resolved schema, for diagnostics and registry dumps.
    pub fn export_schema(&self, type_name: &str) -> Result<String> {
        let schema = self.resolve(type_name)?;
        Ok(serde_json::to_string(schema.as_ref())?)
    }

    fn build(
        &self,
        contract: &MessageContract,
        resolving: &mut Vec<String>,
    ) -> Result<Arc<MessageSchema>> {
        let type_name = contract.type_name.as_str();
        if let Some(schema) = self.schema(type_name) {
            return Ok(schema);
        }
        if resolving.iter().any(|name| name == type_name) {
            return Err(SchemaError::CyclicSchema(type_name.to_string()));
        }
        resolving.push(type_name.to_string());

        let mut fields = Vec::with_capacity(contract.fields.len());
        for descriptor in &contract.fields {
            if descriptor.id < 1 || descriptor.id > MAX_FIELD_ID {
                return Err(SchemaError::Validation(format!(
                    "{}.{}: field id {} is out of range",
                    type_name, descriptor.name, descriptor.id
                )));
            }
            // Fixed kind-to-primitive mapping; Message and Repeated resolve
            // through their nested contract first.
            let (primitive, repeated) = match descriptor.kind {
                WireKind::Int32 | WireKind::Enum => (WirePrimitive::Int32, false),
                WireKind::Int64 => (WirePrimitive::Int64, false),
                WireKind::Double => (WirePrimitive::Double, false),
                WireKind::String => (WirePrimitive::String, false),
                WireKind::Bool => (WirePrimitive::Bool, false),
                WireKind::Bytes => (WirePrimitive::Bytes, false),
                WireKind::Message => (self.resolve_nested(contract, descriptor, resolving)?, false),
                WireKind::Repeated => (self.resolve_nested(contract, descriptor, resolving)?, true),
            };
            fields.push(SchemaField {
                id: descriptor.id,
                name: descriptor.name.clone(),
                wire_name: descriptor
                    .wire_name
                    .clone()
                    .unwrap_or_else(|| descriptor.name.clone()),
                primitive,
                repeated,
            });
        }
        resolving.pop();

        let schema = Arc::new(MessageSchema {
            type_name: type_name.to_string(),
            fields,
        });
        // First fully built schema wins; a concurrent racer receives the
        // registered one.
        let registered = self
            .schemas
            .entry(schema.type_name.clone())
            .or_insert(schema)
            .clone();
        debug!(
            "registered schema '{}' with {} fields",
            registered.type_name,
            registered.fields.len()
        );
        Ok(registered)
    }

    fn resolve_nested(
        &self,
        contract: &MessageContract,
        descriptor: &FieldDescriptor,
        resolving: &mut Vec<String>,
    ) -> Result<WirePrimitive> {
        let nested = descriptor
            .nested
            .ok_or_else(|| SchemaError::MissingNestedType {
                message: contract.type_name.clone(),
                field: descriptor.name.clone(),
            })?;
        let nested_contract = nested();
        // Nested contracts register themselves on first reference
        self.contracts
            .entry(nested_contract.type_name.clone())
            .or_insert_with(|| nested_contract.clone());
        let nested_schema = self.build(&nested_contract, resolving)?;
        Ok(WirePrimitive::Message(nested_schema.type_name.clone()))
    }
}
