//! HTTP facade integration tests.
//!
//! Starts the server on an ephemeral port over a temporary storage file and exercises it
//! with reqwest.

use std::fs;
use std::path::PathBuf;

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use studentdb::{JsonFileStore, Store, StudentServer};
use tempfile::TempDir;

/// Bind to port 0 and return the base url of the students endpoints.
async fn start_server<S: Store>(store: S) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        StudentServer::new(store).serve(listener).await.unwrap();
    });
    format!("http://{addr}/students")
}

fn storage(dir: &TempDir) -> PathBuf {
    dir.path().join("storage.json")
}

async fn start_with_empty_file() -> (TempDir, String) {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::create_if_missing(&storage(&dir)).unwrap();
    let base = start_server(store).await;
    (dir, base)
}

#[tokio::test]
async fn create_read_update_delete_scenario() {
    let (_dir, base) = start_with_empty_file().await;
    let client = Client::new();

    let resp = client.post(&base).json(&json!({"name": "Ann"})).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let created: Value = resp.json().await.unwrap();
    let id = created["id"].as_i64().expect("id is an integer");
    assert_eq!(created, json!({"id": id, "name": "Ann"}));

    let resp = client.get(format!("{base}/{id}")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.json::<Value>().await.unwrap(), created);

    let resp = client
        .put(format!("{base}/{id}"))
        .json(&json!({"name": "Anna"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.json::<Value>().await.unwrap(), json!({"id": id, "name": "Anna"}));

    let resp = client.delete(format!("{base}/{id}")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.json::<Value>().await.unwrap(),
        json!({"message": "Student deleted"})
    );

    let resp = client.get(format!("{base}/{id}")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        resp.json::<Value>().await.unwrap(),
        json!({"message": "Student not found"})
    );
}

#[tokio::test]
async fn list_keeps_insertion_order() {
    let (_dir, base) = start_with_empty_file().await;
    let client = Client::new();

    let resp = client.get(&base).send().await.unwrap();
    assert_eq!(resp.json::<Value>().await.unwrap(), json!([]));

    for name in ["Ann", "Bob", "Cy"] {
        client.post(&base).json(&json!({"name": name})).send().await.unwrap();
    }
    let all: Vec<Value> = client.get(&base).send().await.unwrap().json().await.unwrap();
    let names: Vec<_> = all.iter().map(|s| s["name"].clone()).collect();
    assert_eq!(names, vec![json!("Ann"), json!("Bob"), json!("Cy")]);
}

#[tokio::test]
async fn update_stores_values_as_strings() {
    let (_dir, base) = start_with_empty_file().await;
    let client = Client::new();

    let created: Value = client
        .post(&base)
        .json(&json!({"name": "Ann", "age": 19}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = created["id"].as_i64().unwrap();

    let updated: Value = client
        .put(format!("{base}/{id}"))
        .json(&json!({"age": 20, "active": true}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(updated["age"], json!("20"));
    assert_eq!(updated["active"], json!("true"));
    assert_eq!(updated["name"], json!("Ann"));
}

#[tokio::test]
async fn deleting_a_missing_id_is_a_no_op_success() {
    let (_dir, base) = start_with_empty_file().await;
    let client = Client::new();
    client.post(&base).json(&json!({"name": "Ann"})).send().await.unwrap();
    let before: Value = client.get(&base).send().await.unwrap().json().await.unwrap();

    for id in ["12345", "abc"] {
        let resp = client.delete(format!("{base}/{id}")).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.json::<Value>().await.unwrap(),
            json!({"message": "Student deleted"})
        );
    }

    let after: Value = client.get(&base).send().await.unwrap().json().await.unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn ids_are_not_checked_for_uniqueness() {
    let (_dir, base) = start_with_empty_file().await;
    let client = Client::new();

    for name in ["Ann", "Bob"] {
        let created: Value = client
            .post(&base)
            .json(&json!({"id": 7, "name": name}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(created["id"], json!(7));
    }

    let all: Vec<Value> = client.get(&base).send().await.unwrap().json().await.unwrap();
    assert_eq!(all.len(), 2);

    // lookups return the first match
    let found: Value = client.get(format!("{base}/7")).send().await.unwrap().json().await.unwrap();
    assert_eq!(found["name"], json!("Ann"));

    // deletes remove every match
    client.delete(format!("{base}/7")).send().await.unwrap();
    let all: Vec<Value> = client.get(&base).send().await.unwrap().json().await.unwrap();
    assert!(all.is_empty());
}

#[tokio::test]
async fn malformed_insert_payload_is_a_500_and_the_server_keeps_serving() {
    let (_dir, base) = start_with_empty_file().await;
    let client = Client::new();

    for body in ["{\"name\": ", "[1, 2]", "\"Ann\""] {
        let resp = client
            .post(&base)
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let err: Value = resp.json().await.unwrap();
        assert_eq!(err["message"], json!("Error adding student"));
        assert!(err["error"].is_string());
    }

    let resp = client.get(&base).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.json::<Value>().await.unwrap(), json!([]));
}

#[tokio::test]
async fn corrupt_storage_is_a_500_everywhere() {
    let dir = TempDir::new().unwrap();
    fs::write(storage(&dir), "not json at all").unwrap();
    let base = start_server(JsonFileStore::new(storage(&dir))).await;
    let client = Client::new();

    let cases = vec![
        (client.get(&base), "Error fetching students"),
        (client.get(format!("{base}/1")), "Error fetching student"),
        (client.post(&base).json(&json!({"name": "Ann"})), "Error adding student"),
        (client.put(format!("{base}/1")).json(&json!({"name": "Ann"})), "Error updating student"),
        (client.delete(format!("{base}/1")), "Error deleting student"),
    ];
    for (req, message) in cases {
        let resp = req.send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let err: Value = resp.json().await.unwrap();
        assert_eq!(err["message"], json!(message));
    }
}

#[tokio::test]
async fn missing_storage_file_is_a_500() {
    let dir = TempDir::new().unwrap();
    let base = start_server(JsonFileStore::new(storage(&dir))).await;
    let resp = Client::new().get(&base).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn lenient_id_parsing_in_paths() {
    let (_dir, base) = start_with_empty_file().await;
    let client = Client::new();
    client.post(&base).json(&json!({"id": 12, "name": "Ann"})).send().await.unwrap();

    let resp = client.get(format!("{base}/12abc")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client.get(format!("{base}/abc")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn put_on_missing_or_unparseable_ids() {
    let (_dir, base) = start_with_empty_file().await;
    let client = Client::new();

    let resp = client
        .put(format!("{base}/999"))
        .json(&json!({"name": "x"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.json::<Value>().await.unwrap(), Value::Null);

    let resp = client
        .put(format!("{base}/abc"))
        .json(&json!({"name": "x"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let err: Value = resp.json().await.unwrap();
    assert_eq!(err["message"], json!("Error updating student"));

    let resp = client.put(format!("{base}/abc")).json(&json!({})).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.json::<Value>().await.unwrap(), Value::Null);
}

#[tokio::test]
async fn put_stores_any_field_name_and_value() {
    let (_dir, base) = start_with_empty_file().await;
    let client = Client::new();
    client.post(&base).json(&json!({"id": 4, "name": "Ann"})).send().await.unwrap();

    let resp = client
        .put(format!("{base}/4"))
        .json(&json!({"first name": "Ann\nMarie", "note": "say \"hi\""}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["first name"], json!("Ann\nMarie"));
    assert_eq!(updated["note"], json!("say \"hi\""));
}

#[tokio::test]
async fn put_on_a_negative_id_finds_nothing() {
    let (_dir, base) = start_with_empty_file().await;
    let resp = Client::new()
        .put(format!("{base}/-4"))
        .json(&json!({"name": "x"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.json::<Value>().await.unwrap(), Value::Null);
}

#[tokio::test]
async fn cors_is_open_to_any_origin() {
    let (_dir, base) = start_with_empty_file().await;
    let resp = Client::new()
        .get(&base)
        .header("origin", "http://example.com")
        .send()
        .await
        .unwrap();
    assert_eq!(
        resp.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}

#[tokio::test]
async fn storage_file_is_pretty_printed() {
    let (dir, base) = start_with_empty_file().await;
    let created: Value = Client::new()
        .post(&base)
        .json(&json!({"name": "Ann"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let text = fs::read_to_string(storage(&dir)).unwrap();
    let expected = format!(
        "{{\n  \"students\": [\n    {{\n      \"id\": {},\n      \"name\": \"Ann\"\n    }}\n  ]\n}}",
        created["id"]
    );
    assert_eq!(text, expected);
}
