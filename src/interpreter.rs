use std::sync::{Arc, Mutex};

use tracing::{debug, instrument};

use crate::command::{Command, Outcome, STUDENT_DELETED, STUDENT_NOT_FOUND};
use crate::error::{DbError, Result};
use crate::store::Store;
use crate::Student;

/// Executes [`Command`]s against a [`Store`].
///
/// Every command reads the whole document, works on it in memory, and (for mutating commands)
/// writes the whole document back. The read-modify-write cycle of a single command runs under a
/// lock shared by all clones of the interpreter, so two commands never overwrite each other's
/// changes. Sequences of commands are not atomic: other commands can run in between them.
#[derive(Debug, Clone)]
pub struct Interpreter<S: Store> {
    store: S,
    lock: Arc<Mutex<()>>,
}

impl<S: Store> Interpreter<S> {
    /// creates an interpreter over the given `store`
    pub fn new(store: S) -> Self {
        Interpreter {
            store,
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// the underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// parses `text` into a [`Command`] and executes it
    ///
    /// # Errors
    /// returns [`DbError::MalformedCommandPayload`] if `text` has a known command shape but its
    /// payload cannot be parsed, or any error from [`Interpreter::execute`]
    pub fn execute_str(&self, text: &str) -> Result<Outcome> {
        let command: Command = text.parse()?;
        self.execute(command)
    }

    /// executes the given `command`
    ///
    /// # Errors
    /// returns [`DbError::CorruptState`] if the document could not be read, or an IO error if
    /// it could not be written back
    #[instrument(skip(self))]
    pub fn execute(&self, command: Command) -> Result<Outcome> {
        let _guard = self.lock.lock().map_err(|_| DbError::LockPoisoned("execute"))?;
        let mut doc = self.store.read_all()?;

        let outcome = match command {
            Command::Select => Outcome::Students(doc.students),

            Command::Insert { students } => {
                doc.students.extend(students.iter().cloned());
                self.store.write_all(&doc)?;
                Outcome::Students(students)
            }

            Command::Delete { id } => {
                let before = doc.students.len();
                if let Some(id) = id {
                    doc.students.retain(|s| !s.has_id(id));
                }
                debug!(removed = before - doc.students.len());
                self.store.write_all(&doc)?;
                Outcome::message(STUDENT_DELETED)
            }

            Command::Update { field, value, id } => {
                match doc.students.iter_mut().find(|s| s.has_id(id)) {
                    Some(student) => {
                        student.set_field(field, value);
                        let updated = student.clone();
                        self.store.write_all(&doc)?;
                        Outcome::Student(updated)
                    }
                    None => Outcome::message(STUDENT_NOT_FOUND),
                }
            }

            Command::Unrecognized => Outcome::Students(Vec::new()),
        };

        Ok(outcome)
    }

    /// returns every stored student
    pub fn students(&self) -> Result<Vec<Student>> {
        match self.execute(Command::Select)? {
            Outcome::Students(students) => Ok(students),
            _ => Ok(Vec::new()),
        }
    }

    /// returns the first student with the given `id`
    pub fn find(&self, id: i64) -> Result<Option<Student>> {
        Ok(self.students()?.into_iter().find(|s| s.has_id(id)))
    }
}
