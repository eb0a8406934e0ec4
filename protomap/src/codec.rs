//! Adapter between records and the prost wire codec.
//!
//! All byte-level work (varints, field keys, wire types, skipping) is owned
//! by `prost::encoding`; this module only walks the resolved schema and the
//! record next to each other.

use std::sync::Arc;

use bytes::{Buf, Bytes};
use prost::encoding::{
    self, decode_key, decode_varint, encode_key, encode_varint, encoded_len_varint, key_len,
    skip_field, DecodeContext, WireType,
};
use tracing::{trace, warn};

use protomap_core::{MessageSchema, Record, Result, SchemaError, SchemaField, Value, WirePrimitive};

use crate::registry::SchemaRegistry;

/// Check a record's runtime shape against the schema before any bytes are
/// produced. Fields absent from the record are legal (they encode as
/// nothing); fields present must carry the declared shape. Record keys not
/// named by the schema are ignored.
pub(crate) fn validate(
    registry: &SchemaRegistry,
    schema: &MessageSchema,
    record: &Record,
) -> Result<()> {
    for field in &schema.fields {
        if let Some(value) = record.get(&field.name) {
            validate_value(registry, schema, field, value)?;
        }
    }
    Ok(())
}

fn validate_value(
    registry: &SchemaRegistry,
    schema: &MessageSchema,
    field: &SchemaField,
    value: &Value,
) -> Result<()> {
    if field.repeated {
        let Value::Repeated(items) = value else {
            return Err(shape_error(schema, field, "repeated message", value));
        };
        let nested = nested_schema(registry, schema, field)?;
        for item in items {
            validate(registry, &nested, item)?;
        }
        return Ok(());
    }
    match (&field.primitive, value) {
        (WirePrimitive::Int32, Value::Int32(_)) => Ok(()),
        (WirePrimitive::Int64, Value::Int64(_)) => Ok(()),
        (WirePrimitive::Double, Value::Double(_)) => Ok(()),
        (WirePrimitive::String, Value::Str(_)) => Ok(()),
        (WirePrimitive::Bool, Value::Bool(_)) => Ok(()),
        (WirePrimitive::Bytes, Value::Bytes(_)) => Ok(()),
        (WirePrimitive::Message(_), Value::Message(nested_record)) => {
            let nested = nested_schema(registry, schema, field)?;
            validate(registry, &nested, nested_record)
        }
        (primitive, other) => Err(shape_error(schema, field, &primitive.to_string(), other)),
    }
}

/// Encode a validated record against its schema.
pub(crate) fn encode_record(
    registry: &SchemaRegistry,
    schema: &MessageSchema,
    record: &Record,
) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(message_len(registry, schema, record)?);
    encode_fields(registry, schema, record, &mut buf)?;
    trace!("encoded {} bytes for '{}'", buf.len(), schema.type_name);
    Ok(buf)
}

fn encode_fields(
    registry: &SchemaRegistry,
    schema: &MessageSchema,
    record: &Record,
    buf: &mut Vec<u8>,
) -> Result<()> {
    for field in &schema.fields {
        let Some(value) = record.get(&field.name) else {
            continue;
        };
        if field.repeated {
            let Value::Repeated(items) = value else {
                return Err(shape_error(schema, field, "repeated message", value));
            };
            let nested = nested_schema(registry, schema, field)?;
            for item in items {
                encode_message_field(registry, &nested, field.id, item, buf)?;
            }
            continue;
        }
        match (&field.primitive, value) {
            (WirePrimitive::Int32, Value::Int32(v)) => encoding::int32::encode(field.id, v, buf),
            (WirePrimitive::Int64, Value::Int64(v)) => encoding::int64::encode(field.id, v, buf),
            (WirePrimitive::Double, Value::Double(v)) => encoding::double::encode(field.id, v, buf),
            (WirePrimitive::String, Value::Str(v)) => encoding::string::encode(field.id, v, buf),
            (WirePrimitive::Bool, Value::Bool(v)) => encoding::bool::encode(field.id, v, buf),
            (WirePrimitive::Bytes, Value::Bytes(v)) => encoding::bytes::encode(field.id, v, buf),
            (WirePrimitive::Message(_), Value::Message(nested_record)) => {
                let nested = nested_schema(registry, schema, field)?;
                encode_message_field(registry, &nested, field.id, nested_record, buf)?;
            }
            (primitive, other) => {
                return Err(shape_error(schema, field, &primitive.to_string(), other));
            }
        }
    }
    Ok(())
}

fn encode_message_field(
    registry: &SchemaRegistry,
    nested: &MessageSchema,
    id: u32,
    record: &Record,
    buf: &mut Vec<u8>,
) -> Result<()> {
    let body = message_len(registry, nested, record)?;
    encode_key(id, WireType::LengthDelimited, buf);
    encode_varint(body as u64, buf);
    encode_fields(registry, nested, record, buf)
}

fn message_len(
    registry: &SchemaRegistry,
    schema: &MessageSchema,
    record: &Record,
) -> Result<usize> {
    let mut len = 0;
    for field in &schema.fields {
        let Some(value) = record.get(&field.name) else {
            continue;
        };
        len += field_len(registry, schema, field, value)?;
    }
    Ok(len)
}

fn field_len(
    registry: &SchemaRegistry,
    schema: &MessageSchema,
    field: &SchemaField,
    value: &Value,
) -> Result<usize> {
    if field.repeated {
        let Value::Repeated(items) = value else {
            return Err(shape_error(schema, field, "repeated message", value));
        };
        let nested = nested_schema(registry, schema, field)?;
        let mut len = 0;
        for item in items {
            let body = message_len(registry, &nested, item)?;
            len += key_len(field.id) + encoded_len_varint(body as u64) + body;
        }
        return Ok(len);
    }
    let len = match (&field.primitive, value) {
        (WirePrimitive::Int32, Value::Int32(v)) => encoding::int32::encoded_len(field.id, v),
        (WirePrimitive::Int64, Value::Int64(v)) => encoding::int64::encoded_len(field.id, v),
        (WirePrimitive::Double, Value::Double(v)) => encoding::double::encoded_len(field.id, v),
        (WirePrimitive::String, Value::Str(v)) => encoding::string::encoded_len(field.id, v),
        (WirePrimitive::Bool, Value::Bool(v)) => encoding::bool::encoded_len(field.id, v),
        (WirePrimitive::Bytes, Value::Bytes(v)) => encoding::bytes::encoded_len(field.id, v),
        (WirePrimitive::Message(_), Value::Message(nested_record)) => {
            let nested = nested_schema(registry, schema, field)?;
            let body = message_len(registry, &nested, nested_record)?;
            key_len(field.id) + encoded_len_varint(body as u64) + body
        }
        (primitive, other) => {
            return Err(shape_error(schema, field, &primitive.to_string(), other));
        }
    };
    Ok(len)
}

/// Decode a buffer into a record shaped by the schema. Unknown field ids are
/// skipped; repeated scalar occurrences follow last-value-wins merging.
pub(crate) fn decode_record(
    registry: &SchemaRegistry,
    schema: &MessageSchema,
    buf: &mut Bytes,
) -> Result<Record> {
    let mut record = Record::new();
    while buf.has_remaining() {
        let (id, wire_type) = decode_key(buf)?;
        let Some(field) = schema.field_by_id(id) else {
            warn!("skipping unknown field {} while decoding '{}'", id, schema.type_name);
            skip_field(wire_type, id, buf, DecodeContext::default())?;
            continue;
        };
        merge_field(registry, schema, field, wire_type, buf, &mut record)?;
    }
    Ok(record)
}

fn merge_field(
    registry: &SchemaRegistry,
    schema: &MessageSchema,
    field: &SchemaField,
    wire_type: WireType,
    buf: &mut Bytes,
    record: &mut Record,
) -> Result<()> {
    let ctx = DecodeContext::default();
    if field.repeated {
        let item = decode_nested(registry, schema, field, wire_type, buf)?;
        record.append_repeated(&field.name, item);
        return Ok(());
    }
    match &field.primitive {
        WirePrimitive::Int32 => {
            let mut v = 0i32;
            encoding::int32::merge(wire_type, &mut v, buf, ctx)?;
            record.insert(field.name.as_str(), Value::Int32(v));
        }
        WirePrimitive::Int64 => {
            let mut v = 0i64;
            encoding::int64::merge(wire_type, &mut v, buf, ctx)?;
            record.insert(field.name.as_str(), Value::Int64(v));
        }
        WirePrimitive::Double => {
            let mut v = 0f64;
            encoding::double::merge(wire_type, &mut v, buf, ctx)?;
            record.insert(field.name.as_str(), Value::Double(v));
        }
        WirePrimitive::String => {
            let mut v = String::new();
            encoding::string::merge(wire_type, &mut v, buf, ctx)?;
            record.insert(field.name.as_str(), Value::Str(v));
        }
        WirePrimitive::Bool => {
            let mut v = false;
            encoding::bool::merge(wire_type, &mut v, buf, ctx)?;
            record.insert(field.name.as_str(), Value::Bool(v));
        }
        WirePrimitive::Bytes => {
            let mut v: Vec<u8> = Vec::new();
            encoding::bytes::merge(wire_type, &mut v, buf, ctx)?;
            record.insert(field.name.as_str(), Value::Bytes(v));
        }
        WirePrimitive::Message(_) => {
            let nested = decode_nested(registry, schema, field, wire_type, buf)?;
            record.insert(field.name.as_str(), Value::Message(nested));
        }
    }
    Ok(())
}

fn decode_nested(
    registry: &SchemaRegistry,
    schema: &MessageSchema,
    field: &SchemaField,
    wire_type: WireType,
    buf: &mut Bytes,
) -> Result<Record> {
    if wire_type != WireType::LengthDelimited {
        return Err(SchemaError::Decode(prost::DecodeError::new(format!(
            "invalid wire type {:?} for message field '{}'",
            wire_type, field.wire_name
        ))));
    }
    let len = decode_varint(buf)? as usize;
    if len > buf.remaining() {
        return Err(SchemaError::Decode(prost::DecodeError::new(
            "buffer underflow",
        )));
    }
    let mut body = buf.split_to(len);
    let nested = nested_schema(registry, schema, field)?;
    decode_record(registry, &nested, &mut body)
}

fn nested_schema(
    registry: &SchemaRegistry,
    schema: &MessageSchema,
    field: &SchemaField,
) -> Result<Arc<MessageSchema>> {
    match &field.primitive {
        WirePrimitive::Message(name) => registry
            .schema(name)
            .ok_or_else(|| SchemaError::MissingContract(name.clone())),
        other => Err(SchemaError::Validation(format!(
            "{}.{}: repeated field resolved to non-message primitive {}",
            schema.type_name, field.name, other
        ))),
    }
}

fn shape_error(
    schema: &MessageSchema,
    field: &SchemaField,
    expected: &str,
    value: &Value,
) -> SchemaError {
    SchemaError::Validation(format!(
        "{}.{}: expected {}, got {}",
        schema.type_name,
        field.name,
        expected,
        value.kind_name()
    ))
}
