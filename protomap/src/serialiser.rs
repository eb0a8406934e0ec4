use std::sync::Arc;

use bytes::Bytes;
use tracing::trace;

use protomap_core::{ProtoContract, Record, Result, SchemaError};

use crate::codec;
use crate::registry::SchemaRegistry;

/// Public serialise/deserialise entry points over an explicit schema
/// registry.
///
/// A `Serialiser` owns its registry by default; hand a shared registry to
/// `with_registry` when several serialisers should reuse resolved schemas.
#[derive(Debug, Clone)]
pub struct Serialiser {
    registry: Arc<SchemaRegistry>,
}

impl Serialiser {
    pub fn new() -> Self {
        Serialiser {
            registry: Arc::new(SchemaRegistry::new()),
        }
    }

    pub fn with_registry(registry: Arc<SchemaRegistry>) -> Self {
        Serialiser { registry }
    }

    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    /// Serialise a contracted message into protobuf wire bytes. The contract
    /// is declared on first use; the schema is resolved once and cached.
    pub fn serialise<T: ProtoContract>(&self, message: &T) -> Result<Vec<u8>> {
        let type_name = self.registry.declare_if_absent(T::contract());
        let schema = self.registry.resolve(&type_name)?;
        let record = message.to_record();
        codec::validate(&self.registry, &schema, &record)?;
        codec::encode_record(&self.registry, &schema, &record)
    }

    /// Deserialise wire bytes into a contracted message. Unknown fields in
    /// the buffer are skipped; absent fields read back as defaults.
    pub fn deserialise<T: ProtoContract>(&self, bytes: &[u8]) -> Result<T> {
        let type_name = self.registry.declare_if_absent(T::contract());
        let schema = self.registry.resolve(&type_name)?;
        let mut buf = Bytes::copy_from_slice(bytes);
        let record = codec::decode_record(&self.registry, &schema, &mut buf)?;
        trace!("decoded '{}' with {} fields", type_name, record.len());
        T::from_record(record)
    }

    /// Serialise a record against a previously declared type. Fails with
    /// `MissingContract` when the type was never declared.
    pub fn serialise_record(&self, type_name: &str, record: &Record) -> Result<Vec<u8>> {
        if !self.registry.is_declared(type_name) {
            return Err(SchemaError::MissingContract(type_name.to_string()));
        }
        let schema = self.registry.resolve(type_name)?;
        codec::validate(&self.registry, &schema, record)?;
        codec::encode_record(&self.registry, &schema, record)
    }

    /// Deserialise wire bytes into a record shaped by a previously declared
    /// type. Fails with `MissingContract` when the type was never declared.
    pub fn deserialise_record(&self, type_name: &str, bytes: &[u8]) -> Result<Record> {
        if !self.registry.is_declared(type_name) {
            return Err(SchemaError::MissingContract(type_name.to_string()));
        }
        let schema = self.registry.resolve(type_name)?;
        let mut buf = Bytes::copy_from_slice(bytes);
        codec::decode_record(&self.registry, &schema, &mut buf)
    }
}

impl Default for Serialiser {
    fn default() -> Self {
        Serialiser::new()
    }
}
