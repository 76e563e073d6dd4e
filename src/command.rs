//! The commands understood by the [`Interpreter`], their textual form, and the results they produce.
//!
//! [`Interpreter`]: ../struct.Interpreter.html
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{DbError, Result};
use crate::Student;

/// message returned by a delete, whether or not anything was removed
pub const STUDENT_DELETED: &str = "Student deleted";
/// message returned when an update or lookup finds no student with the requested id
pub const STUDENT_NOT_FOUND: &str = "Student not found";

/// These are the "commands" that can be executed against the student [`Document`].
///
/// Commands are usually built directly, but can also be parsed from their textual form:
///
/// - `select students`
/// - `include students [<JSON array of objects>]`
/// - `exclude from students where id=<int>`
/// - `update students set <field> = "<value>" where id=<int>`
///
/// Any other text parses to [`Command::Unrecognized`].
///
/// [`Document`]: ./struct.Document.html
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// return every student
    Select,
    /// append students to the end of the list
    Insert {
        /// the students to append
        students: Vec<Student>,
    },
    /// overwrite one field of the first student with a matching id
    Update {
        /// name of the field to overwrite
        field: String,
        /// the new value, always stored as a string
        value: String,
        /// id of the student to update
        id: i64,
    },
    /// remove every student with a matching id. `None` matches nothing.
    Delete {
        /// id of the students to remove
        id: Option<i64>,
    },
    /// any text that is not one of the known command shapes
    Unrecognized,
}

impl FromStr for Command {
    type Err = DbError;

    fn from_str(text: &str) -> Result<Self> {
        if text.starts_with("select students") {
            return Ok(Command::Select);
        }

        if text.starts_with("include students") {
            let start = text.find('[').ok_or_else(|| {
                DbError::MalformedCommandPayload("include is missing its JSON array".to_string())
            })?;
            let students: Vec<Map<String, Value>> = serde_json::from_str(&text[start..])
                .map_err(|e| DbError::MalformedCommandPayload(e.to_string()))?;
            return Ok(Command::Insert {
                students: students.into_iter().map(Student::from).collect(),
            });
        }

        if text.starts_with("exclude from students where id=") {
            let id = text.split('=').nth(1).and_then(parse_int);
            return Ok(Command::Delete { id });
        }

        if text.starts_with("update students set") {
            let caps = update_regex().captures(text).ok_or_else(|| {
                DbError::MalformedCommandPayload(format!("could not parse update: {}", text))
            })?;
            let id = caps[3].parse::<i64>().map_err(|_| {
                DbError::MalformedCommandPayload(format!("id out of range: {}", &caps[3]))
            })?;
            return Ok(Command::Update {
                field: caps[1].to_string(),
                value: caps[2].to_string(),
                id,
            });
        }

        Ok(Command::Unrecognized)
    }
}

fn update_regex() -> &'static Regex {
    static UPDATE: OnceLock<Regex> = OnceLock::new();
    UPDATE.get_or_init(|| {
        Regex::new(r#"set (\w+) = "(.*?)" where id=(\d+)"#).expect("update pattern is valid")
    })
}

/// The result of executing a [`Command`]. It serializes to plain JSON: a list of students,
/// a single student, or a `{"message": ...}` object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    /// a list of students
    Students(Vec<Student>),
    /// a single student
    Student(Student),
    /// a status message
    Message {
        /// the message text
        message: String,
    },
}

impl Outcome {
    /// builds a [`Outcome::Message`]
    pub fn message(message: &str) -> Self {
        Outcome::Message {
            message: message.to_string(),
        }
    }
}

/// Parses an integer the lenient way: leading whitespace and an optional sign are skipped,
/// then as many decimal digits as are present are read. Anything after the digits is ignored.
///
/// Returns `None` when there are no leading digits or the number does not fit in an `i64`.
pub fn parse_int(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let end = rest
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(rest.len(), |(i, _)| i);
    let value = rest[..end].parse::<i64>().ok()?;
    Some(if negative { -value } else { value })
}

/// Renders a JSON value as the plain text stored by an update: strings as-is, arrays as their
/// elements joined by `,`, objects as `[object Object]`, everything else in its JSON form.
pub fn field_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|v| match v {
                Value::Null => String::new(),
                v => field_text(v),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
        Value::Number(n) => match n.as_f64() {
            // whole floats print without a fraction, `1.0` is stored as "1"
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                (f as i64).to_string()
            }
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}
