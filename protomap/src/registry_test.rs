#[cfg(test)]
use crate::registry::SchemaRegistry;
#[cfg(test)]
use protomap_core::{
    FieldDescriptor, MessageContract, SchemaError, WireKind, WirePrimitive,
};
#[cfg(test)]
use std::sync::Arc;

#[cfg(test)]
fn point_contract() -> MessageContract {
    MessageContract::new("Point")
        .field(FieldDescriptor::new("x", 1, WireKind::Int32))
        .field(FieldDescriptor::new("y", 2, WireKind::Int32))
}

#[cfg(test)]
fn line_contract() -> MessageContract {
    MessageContract::new("Line")
        .field(FieldDescriptor::message("start", 1, point_contract))
        .field(FieldDescriptor::message("end", 2, point_contract))
}

#[cfg(test)]
fn node_contract() -> MessageContract {
    MessageContract::new("Node").field(FieldDescriptor::message("next", 1, node_contract))
}

#[cfg(test)]
fn ping_contract() -> MessageContract {
    MessageContract::new("Ping").field(FieldDescriptor::message("pong", 1, pong_contract))
}

#[cfg(test)]
fn pong_contract() -> MessageContract {
    MessageContract::new("Pong").field(FieldDescriptor::message("ping", 1, ping_contract))
}

#[test]
fn resolves_scalar_fields_through_the_fixed_table() {
    let registry = SchemaRegistry::new();
    registry.declare(
        MessageContract::new("Everything")
            .field(FieldDescriptor::new("a", 1, WireKind::Int32))
            .field(FieldDescriptor::new("b", 2, WireKind::Int64))
            .field(FieldDescriptor::new("c", 3, WireKind::Double))
            .field(FieldDescriptor::new("d", 4, WireKind::String))
            .field(FieldDescriptor::new("e", 5, WireKind::Bool))
            .field(FieldDescriptor::new("f", 6, WireKind::Bytes))
            .field(FieldDescriptor::new("g", 7, WireKind::Enum)),
    );

    let schema = registry.resolve("Everything").unwrap();
    let primitives: Vec<&WirePrimitive> = schema.fields.iter().map(|f| &f.primitive).collect();
    assert_eq!(
        primitives,
        vec![
            &WirePrimitive::Int32,
            &WirePrimitive::Int64,
            &WirePrimitive::Double,
            &WirePrimitive::String,
            &WirePrimitive::Bool,
            &WirePrimitive::Bytes,
            // Enum maps to int32 on the wire
            &WirePrimitive::Int32,
        ]
    );
    assert!(schema.fields.iter().all(|f| !f.repeated));
}

#[test]
fn resolution_is_idempotent_and_registers_once() {
    let registry = SchemaRegistry::new();
    registry.declare(point_contract());

    let first = registry.resolve("Point").unwrap();
    let second = registry.resolve("Point").unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(registry.schema_names(), vec!["Point".to_string()]);
}

#[test]
fn unknown_type_fails_with_missing_contract() {
    let registry = SchemaRegistry::new();
    let err = registry.resolve("Nope").unwrap_err();
    assert!(matches!(err, SchemaError::MissingContract(name) if name == "Nope"));
}

#[test]
fn nested_types_resolve_before_the_parent() {
    let registry = SchemaRegistry::new();
    registry.declare(line_contract());

    let line = registry.resolve("Line").unwrap();
    // resolving Line registered Point as well
    let point = registry.schema("Point").expect("Point registered transitively");
    assert_eq!(point.fields.len(), 2);

    let start = line.field_by_name("start").unwrap();
    assert_eq!(start.primitive, WirePrimitive::Message("Point".to_string()));
    assert!(!start.repeated);
}

#[test]
fn repeated_fields_resolve_as_repeated_nested_messages() {
    let registry = SchemaRegistry::new();
    registry.declare(
        MessageContract::new("Polyline")
            .field(FieldDescriptor::repeated("points", 1, point_contract)),
    );

    let schema = registry.resolve("Polyline").unwrap();
    let points = schema.field_by_name("points").unwrap();
    assert_eq!(points.primitive, WirePrimitive::Message("Point".to_string()));
    assert!(points.repeated);
}

#[test]
fn message_field_without_nested_ref_fails() {
    let registry = SchemaRegistry::new();
    registry.declare(
        MessageContract::new("Broken")
            .field(FieldDescriptor::new("inner", 1, WireKind::Message)),
    );

    let err = registry.resolve("Broken").unwrap_err();
    assert!(matches!(
        err,
        SchemaError::MissingNestedType { message, field } if message == "Broken" && field == "inner"
    ));
}

#[test]
fn repeated_field_without_nested_ref_fails() {
    let registry = SchemaRegistry::new();
    registry.declare(
        MessageContract::new("Broken")
            .field(FieldDescriptor::new("items", 1, WireKind::Repeated)),
    );

    let err = registry.resolve("Broken").unwrap_err();
    assert!(matches!(err, SchemaError::MissingNestedType { .. }));
}

#[test]
fn self_nesting_contract_fails_fast() {
    let registry = SchemaRegistry::new();
    registry.declare(node_contract());

    let err = registry.resolve("Node").unwrap_err();
    assert!(matches!(err, SchemaError::CyclicSchema(name) if name == "Node"));
}

#[test]
fn indirect_cycle_fails_fast() {
    let registry = SchemaRegistry::new();
    registry.declare(ping_contract());

    let err = registry.resolve("Ping").unwrap_err();
    assert!(matches!(err, SchemaError::CyclicSchema(_)));
}

#[test]
fn wire_name_override_lands_in_the_schema() {
    let registry = SchemaRegistry::new();
    registry.declare(
        MessageContract::new("Renamed")
            .field(FieldDescriptor::new("local", 1, WireKind::String).wire_name("wire")),
    );

    let schema = registry.resolve("Renamed").unwrap();
    let field = schema.field_by_name("local").unwrap();
    assert_eq!(field.wire_name, "wire");
}

#[test]
fn redeclaring_never_replaces_a_resolved_schema() {
    let registry = SchemaRegistry::new();
    registry.declare(point_contract());
    let before = registry.resolve("Point").unwrap();

    registry.declare(
        MessageContract::new("Point").field(FieldDescriptor::new("z", 3, WireKind::Int32)),
    );
    let after = registry.resolve("Point").unwrap();

    assert!(Arc::ptr_eq(&before, &after));
}

#[test]
fn out_of_range_field_id_is_rejected() {
    let registry = SchemaRegistry::new();
    registry.declare(
        MessageContract::new("BadId").field(FieldDescriptor::new("zero", 0, WireKind::Int32)),
    );

    let err = registry.resolve("BadId").unwrap_err();
    assert!(matches!(err, SchemaError::Validation(_)));
}

#[test]
fn export_schema_produces_a_json_description() {
    let registry = SchemaRegistry::new();
    registry.declare(point_contract());

    let json = registry.export_schema("Point").unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["type_name"], "Point");
    assert_eq!(parsed["fields"].as_array().unwrap().len(), 2);
}

#[test]
fn concurrent_first_resolution_registers_one_schema() {
    let registry = Arc::new(SchemaRegistry::new());
    registry.declare(line_contract());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || registry.resolve("Line").unwrap())
        })
        .collect();

    let schemas: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for schema in &schemas[1..] {
        assert!(Arc::ptr_eq(&schemas[0], schema));
    }
    let mut names = registry.schema_names();
    names.sort();
    assert_eq!(names, vec!["Line".to_string(), "Point".to_string()]);
}
