use std::collections::HashMap;

/// A single field value in its wire shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int32(i32),
    Int64(i64),
    Double(f64),
    Str(String),
    Bool(bool),
    Bytes(Vec<u8>),
    Message(Record),
    Repeated(Vec<Record>),
}

impl Value {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Int32(_) => "int32",
            Value::Int64(_) => "int64",
            Value::Double(_) => "double",
            Value::Str(_) => "string",
            Value::Bool(_) => "bool",
            Value::Bytes(_) => "bytes",
            Value::Message(_) => "message",
            Value::Repeated(_) => "repeated",
        }
    }
}

/// Named-field view of one message instance.
///
/// Fields absent from the record encode as nothing and read back as their
/// defaults after decode, proto3 style.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: HashMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Record::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Append one item to a repeated field, creating the field when absent.
    pub fn append_repeated(&mut self, name: &str, item: Record) {
        match self.fields.get_mut(name) {
            Some(Value::Repeated(items)) => items.push(item),
            _ => {
                self.fields.insert(name.to_string(), Value::Repeated(vec![item]));
            }
        }
    }

    pub fn with_i32(mut self, name: impl Into<String>, value: i32) -> Self {
        self.insert(name, Value::Int32(value));
        self
    }

    pub fn with_i64(mut self, name: impl Into<String>, value: i64) -> Self {
        self.insert(name, Value::Int64(value));
        self
    }

    pub fn with_f64(mut self, name: impl Into<String>, value: f64) -> Self {
        self.insert(name, Value::Double(value));
        self
    }

    pub fn with_str(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, Value::Str(value.into()));
        self
    }

    pub fn with_bool(mut self, name: impl Into<String>, value: bool) -> Self {
        self.insert(name, Value::Bool(value));
        self
    }

    pub fn with_bytes(mut self, name: impl Into<String>, value: Vec<u8>) -> Self {
        self.insert(name, Value::Bytes(value));
        self
    }

    pub fn with_message(mut self, name: impl Into<String>, value: Record) -> Self {
        self.insert(name, Value::Message(value));
        self
    }

    pub fn with_repeated(mut self, name: impl Into<String>, items: Vec<Record>) -> Self {
        self.insert(name, Value::Repeated(items));
        self
    }

    /// Remove and return the field as i32. None when absent or not an int32.
    pub fn take_i32(&mut self, name: &str) -> Option<i32> {
        match self.fields.remove(name) {
            Some(Value::Int32(v)) => Some(v),
            _ => None,
        }
    }

    pub fn take_i64(&mut self, name: &str) -> Option<i64> {
        match self.fields.remove(name) {
            Some(Value::Int64(v)) => Some(v),
            _ => None,
        }
    }

    pub fn take_f64(&mut self, name: &str) -> Option<f64> {
        match self.fields.remove(name) {
            Some(Value::Double(v)) => Some(v),
            _ => None,
        }
    }

    pub fn take_string(&mut self, name: &str) -> Option<String> {
        match self.fields.remove(name) {
            Some(Value::Str(v)) => Some(v),
            _ => None,
        }
    }

    pub fn take_bool(&mut self, name: &str) -> Option<bool> {
        match self.fields.remove(name) {
            Some(Value::Bool(v)) => Some(v),
            _ => None,
        }
    }

    pub fn take_bytes(&mut self, name: &str) -> Option<Vec<u8>> {
        match self.fields.remove(name) {
            Some(Value::Bytes(v)) => Some(v),
            _ => None,
        }
    }

    pub fn take_message(&mut self, name: &str) -> Option<Record> {
        match self.fields.remove(name) {
            Some(Value::Message(v)) => Some(v),
            _ => None,
        }
    }

    pub fn take_repeated(&mut self, name: &str) -> Option<Vec<Record>> {
        match self.fields.remove(name) {
            Some(Value::Repeated(v)) => Some(v),
            _ => None,
        }
    }
}
