use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The whole persisted state: every stored [`Student`] in insertion order.
///
/// A document without a `students` key is read as an empty list. Any other top-level keys in
/// the file are kept as-is and written back untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// the student records, in insertion order
    #[serde(default)]
    pub students: Vec<Student>,
    /// every other top-level key of the document
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl Document {
    /// creates a document holding the given `students`
    pub fn new(students: Vec<Student>) -> Self {
        Document {
            students,
            rest: Map::new(),
        }
    }

    /// returns the first student whose `id` matches the given `id`
    pub fn find(&self, id: i64) -> Option<&Student> {
        self.students.iter().find(|s| s.has_id(id))
    }
}

/// A single student record: an ordered map of field name to JSON value.
///
/// The `id` field is the key used by every lookup. It is expected to be an integer, but this is
/// never enforced: whatever the client sent (or the file holds) is kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Student(Map<String, Value>);

impl Student {
    /// creates a student with the given `id` followed by every field in `fields`.
    /// A field named `id` in `fields` overrides the given `id`.
    pub fn with_id(id: i64, fields: Map<String, Value>) -> Self {
        let mut record = Map::new();
        record.insert("id".to_string(), Value::from(id));
        for (k, v) in fields {
            record.insert(k, v);
        }
        Student(record)
    }

    /// the raw `id` value, if there is one
    pub fn id(&self) -> Option<&Value> {
        self.0.get("id")
    }

    /// returns `true` if this student's `id` is numerically equal to `id`
    pub fn has_id(&self, id: i64) -> bool {
        match self.id() {
            Some(Value::Number(n)) => n.as_i64() == Some(id) || n.as_f64() == Some(id as f64),
            _ => false,
        }
    }

    /// gets the value of `field`
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// overwrites (or adds) `field` with the string `value`
    pub fn set_field(&mut self, field: String, value: String) {
        self.0.insert(field, Value::String(value));
    }

    /// the underlying field map
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Student {
    fn from(fields: Map<String, Value>) -> Self {
        Student(fields)
    }
}
