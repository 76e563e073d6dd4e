use std::fmt::Display;

use reqwest::blocking::{Client, Response};
use reqwest::{StatusCode, Url};
use serde_json::{Map, Value};

use crate::{DbError, Result, Student};

/// `StudentClient` contains the functionality for communication with a [`StudentServer`]
///
/// [`StudentServer`]: ./struct.StudentServer.html
pub struct StudentClient {
    http: Client,
    base: Url,
}

impl StudentClient {
    /// creates a client that talks to the server listening at `addr` (an `IP:PORT`)
    pub fn connect<A: Display>(addr: A) -> Result<Self> {
        let base = Url::parse(&format!("http://{}/students", addr))
            .map_err(|e| DbError::Parsing(format!("invalid server address {}: {}", addr, e)))?;
        Ok(StudentClient {
            http: Client::builder().build()?,
            base,
        })
    }

    /// the url of the student with the given `id`, with `id` percent-encoded as one path segment
    fn student_url(&self, id: &str) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| DbError::Parsing(format!("{} cannot hold a student id", self.base)))?
            .push(id);
        Ok(url)
    }

    /// gets every student stored on the server
    pub fn list(&self) -> Result<Vec<Student>> {
        let resp = checked(self.http.get(self.base.clone()).send()?)?;
        Ok(resp.json()?)
    }

    /// gets the student with the given `id`
    /// ## Returns
    /// `Ok<Some<Student>>` if the student was found.
    /// `Ok<None>` if the server has no student with that id
    pub fn get(&self, id: &str) -> Result<Option<Student>> {
        let resp = self.http.get(self.student_url(id)?).send()?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(checked(resp)?.json()?))
    }

    /// adds a new student made of `fields`. The server assigns the `id`.
    /// # Returns
    /// the created student, including its `id`
    pub fn add(&self, fields: &Map<String, Value>) -> Result<Student> {
        let resp = checked(self.http.post(self.base.clone()).json(fields).send()?)?;
        Ok(resp.json()?)
    }

    /// overwrites every field in `fields` on the student with the given `id`.
    /// Values are stored as strings by the server.
    /// # Returns
    /// `Ok<None>` if no student has that id after the update
    pub fn update(&self, id: &str, fields: &Map<String, Value>) -> Result<Option<Student>> {
        let resp = self
            .http
            .put(self.student_url(id)?)
            .json(fields)
            .send()?;
        Ok(checked(resp)?.json()?)
    }

    /// removes the student(s) with the given `id`
    /// # Returns
    /// the message sent back by the server
    pub fn remove(&self, id: &str) -> Result<String> {
        let resp = checked(self.http.delete(self.student_url(id)?).send()?)?;
        let body: Value = resp.json()?;
        Ok(message_of(&body).unwrap_or_default())
    }
}

/// turns a non-success response into a [`DbError::StringErr`] holding the server's message
fn checked(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body: Value = resp.json().unwrap_or(Value::Null);
    let mut msg = message_of(&body).unwrap_or_else(|| status.to_string());
    if let Some(detail) = body.get("error").and_then(Value::as_str) {
        msg = format!("{}: {}", msg, detail);
    }
    Err(DbError::StringErr(msg))
}

fn message_of(body: &Value) -> Option<String> {
    body.get("message").and_then(Value::as_str).map(String::from)
}
