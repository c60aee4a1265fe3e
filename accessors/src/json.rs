//! Structured document accessor
//!
//! Keys are dotted paths into the document (`"box.addition.x"`). When the
//! accessor has a schema, every key is checked against it before reading or
//! writing.

use crate::accessor::{Accessor, AccessorRef};
use crate::error::{AccessorError, AccessorResult};
use crate::manager::AccessorHandle;
use crate::medium::ContentMedium;
use core_types::{AccessKind, FieldSchema, JsonTree, JsonType};
use serde_json::{Map, Value};

/// Accessor for a JSON document
pub struct JsonAccessor {
    medium: Box<dyn ContentMedium>,
    schema: Option<JsonTree>,
    contents: Map<String, Value>,
    dropped: bool,
}

impl JsonAccessor {
    pub fn new(medium: Box<dyn ContentMedium>, schema: Option<JsonTree>) -> Self {
        Self {
            medium,
            schema,
            contents: Map::new(),
            dropped: false,
        }
    }

    pub fn schema(&self) -> Option<&JsonTree> {
        self.schema.as_ref()
    }

    /// Sets one dotted key
    pub fn set_one(&mut self, key: &str, value: Value) -> AccessorResult<()> {
        self.ensure_not_dropped()?;
        let allowed = self.allowed_type(key)?;
        if !allowed.admits(&value) {
            return Err(AccessorError::TypeMismatch(key.to_string()));
        }
        insert_path(&mut self.contents, key, value);
        Ok(())
    }

    /// Sets several keys
    ///
    /// Objects written at a key whose schema is a nested tree are merged field
    /// by field instead of replacing the whole object.
    pub fn set(&mut self, items: Map<String, Value>) -> AccessorResult<()> {
        self.ensure_not_dropped()?;
        for (key, value) in self.flatten(items) {
            self.set_one(&key, value)?;
        }
        Ok(())
    }

    /// Reads one dotted key
    pub fn get_one(&self, key: &str) -> AccessorResult<Option<Value>> {
        self.ensure_not_dropped()?;
        self.allowed_type(key)?;
        Ok(lookup_path(&self.contents, key).cloned())
    }

    /// Reads several keys into a nested object
    ///
    /// # Examples
    ///
    /// ```
    /// use accessors::{JsonAccessor, MemoryStore};
    /// use serde_json::json;
    ///
    /// let mut doc = JsonAccessor::new(Box::new(MemoryStore::new().content("doc")), None);
    /// doc.set_one("a.b", json!(1)).unwrap();
    /// doc.set_one("c", json!("x")).unwrap();
    /// assert_eq!(doc.get(&["a.b"]).unwrap(), json!({ "a": { "b": 1 } }));
    /// ```
    pub fn get(&self, keys: &[&str]) -> AccessorResult<Value> {
        self.ensure_not_dropped()?;
        let mut result = Map::new();
        for key in keys {
            self.allowed_type(key)?;
            if let Some(value) = lookup_path(&self.contents, key) {
                insert_path(&mut result, key, value.clone());
            }
        }
        Ok(Value::Object(result))
    }

    /// Returns a copy of the whole document
    pub fn get_all(&self) -> AccessorResult<Map<String, Value>> {
        self.ensure_not_dropped()?;
        Ok(self.contents.clone())
    }

    pub fn remove_one(&mut self, key: &str) -> AccessorResult<()> {
        self.ensure_not_dropped()?;
        self.allowed_type(key)?;
        remove_path(&mut self.contents, key);
        Ok(())
    }

    pub fn remove(&mut self, keys: &[&str]) -> AccessorResult<()> {
        for key in keys {
            self.remove_one(key)?;
        }
        Ok(())
    }

    /// Whether a value is present at the dotted key
    pub fn contains(&self, key: &str) -> AccessorResult<bool> {
        self.ensure_not_dropped()?;
        self.allowed_type(key)?;
        Ok(lookup_path(&self.contents, key).is_some())
    }

    /// Appends a value to the array at `key`, creating the array if missing
    pub fn push_one_to_array(&mut self, key: &str, value: Value) -> AccessorResult<()> {
        self.ensure_not_dropped()?;
        if !self.allowed_type(key)?.contains(JsonType::ARRAY) {
            return Err(AccessorError::TypeMismatch(key.to_string()));
        }

        match lookup_path(&self.contents, key).cloned() {
            None => insert_path(&mut self.contents, key, Value::Array(vec![value])),
            Some(Value::Array(mut items)) => {
                items.push(value);
                insert_path(&mut self.contents, key, Value::Array(items));
            }
            Some(_) => return Err(AccessorError::TypeMismatch(key.to_string())),
        }
        Ok(())
    }

    /// Appends values to several arrays, flattening nested objects like [`set`](Self::set)
    pub fn push_to_array(&mut self, items: Map<String, Value>) -> AccessorResult<()> {
        self.ensure_not_dropped()?;
        for (key, value) in self.flatten(items) {
            self.push_one_to_array(&key, value)?;
        }
        Ok(())
    }

    fn ensure_not_dropped(&self) -> AccessorResult<()> {
        if self.dropped {
            return Err(AccessorError::Dropped);
        }
        Ok(())
    }

    fn allowed_type(&self, key: &str) -> AccessorResult<JsonType> {
        match &self.schema {
            None => Ok(JsonType::ANY),
            Some(schema) => schema
                .lookup(key)
                .map(|field| field.allowed())
                .ok_or_else(|| AccessorError::FieldNotFound(key.to_string())),
        }
    }

    fn flatten(&self, items: Map<String, Value>) -> Vec<(String, Value)> {
        let mut out = Vec::new();
        for (key, value) in items {
            self.flatten_into(key, value, &mut out);
        }
        out
    }

    fn flatten_into(&self, key: String, value: Value, out: &mut Vec<(String, Value)>) {
        let is_tree = matches!(
            self.schema.as_ref().and_then(|schema| schema.lookup(&key)),
            Some(FieldSchema::Tree(_))
        );
        match value {
            Value::Object(fields) if is_tree => {
                for (child, value) in fields {
                    self.flatten_into(format!("{}.{}", key, child), value, out);
                }
            }
            value => out.push((key, value)),
        }
    }
}

impl Accessor for JsonAccessor {
    fn kind(&self) -> AccessKind {
        AccessKind::Json
    }

    fn exists(&self) -> AccessorResult<bool> {
        self.medium.exists()
    }

    fn create(&mut self) -> AccessorResult<()> {
        self.contents = Map::new();
        self.dropped = false;
        Ok(())
    }

    fn load(&mut self) -> AccessorResult<()> {
        self.contents = match self.medium.read()? {
            Some(bytes) => serde_json::from_slice(&bytes)?,
            None => Map::new(),
        };
        Ok(())
    }

    fn save(&mut self) -> AccessorResult<()> {
        self.ensure_not_dropped()?;
        let bytes = serde_json::to_vec_pretty(&self.contents)?;
        self.medium.write(&bytes)
    }

    fn destroy(&mut self) -> AccessorResult<()> {
        if self.dropped {
            return Ok(());
        }
        self.medium.remove()?;
        self.dropped = true;
        Ok(())
    }

    fn is_dropped(&self) -> bool {
        self.dropped
    }

    fn is_compatible(&self, other: &Self) -> bool {
        self.schema == other.schema
    }

    fn copy_into(&self, target: &mut Self) -> AccessorResult<()> {
        self.ensure_not_dropped()?;
        target.ensure_not_dropped()?;
        target.contents = self.contents.clone();
        Ok(())
    }

    fn into_handle(shared: AccessorRef<Self>) -> AccessorHandle {
        AccessorHandle::Json(shared)
    }
}

fn lookup_path<'v>(contents: &'v Map<String, Value>, key: &str) -> Option<&'v Value> {
    let mut parts = key.split('.');
    let mut current = contents.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

fn insert_path(contents: &mut Map<String, Value>, key: &str, value: Value) {
    let mut parts: Vec<&str> = key.split('.').collect();
    let Some(last) = parts.pop() else {
        return;
    };

    let mut current = contents;
    for part in parts {
        let entry = current
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        let Some(map) = entry.as_object_mut() else {
            return;
        };
        current = map;
    }
    current.insert(last.to_string(), value);
}

fn remove_path(contents: &mut Map<String, Value>, key: &str) {
    let mut parts: Vec<&str> = key.split('.').collect();
    let Some(last) = parts.pop() else {
        return;
    };

    let mut current = contents;
    for part in parts {
        match current.get_mut(part).and_then(Value::as_object_mut) {
            Some(map) => current = map,
            None => return,
        }
    }
    current.remove(last);
}
