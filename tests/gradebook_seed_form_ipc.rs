use serde_json::json;
use std::collections::HashSet;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_schooladmind");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn schooladmind");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({ "id": id, "method": method, "params": params });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");
    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

#[test]
fn stored_record_seeds_the_edit_form() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    // Class arrives populated, student as a bare id — both shapes occur
    // depending on which backend endpoint produced the record.
    let result = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "gradebook.seedForm",
        json!({
            "record": {
                "class": { "_id": "665f1c0de0a1b2c3d4e5f602", "name": "Grade 8 Blue" },
                "student": "665f1c0de0a1b2c3d4e5f601",
                "assignments": [
                    { "name": "Project", "marks": 100, "weight": 2 }
                ],
                "tests": [
                    { "name": "Unit test", "marks": 50, "weight": 1 },
                    { "name": "Quiz" }
                ],
                "exams": []
            }
        }),
    );

    assert_eq!(result["classId"].as_str(), Some("665f1c0de0a1b2c3d4e5f602"));
    assert_eq!(result["className"].as_str(), Some("Grade 8 Blue"));
    assert_eq!(result["studentId"].as_str(), Some("665f1c0de0a1b2c3d4e5f601"));
    // Only the id is known for the student, so it doubles as the display name.
    assert_eq!(result["studentName"].as_str(), Some("665f1c0de0a1b2c3d4e5f601"));

    // Every entry row gets a distinct generated rowId; form fields survive.
    let mut row_ids: HashSet<String> = HashSet::new();
    for field in ["assignments", "tests", "exams"] {
        for row in result[field].as_array().expect("rows array") {
            let row_id = row["rowId"].as_str().expect("rowId").to_string();
            assert!(row_ids.insert(row_id), "rowIds must be unique");
        }
    }
    assert_eq!(row_ids.len(), 3);
    assert_eq!(result["assignments"][0]["name"].as_str(), Some("Project"));
    assert_eq!(result["assignments"][0]["marks"].as_f64(), Some(100.0));

    // The initial preview is recomputed from the stored entries.
    assert_eq!(result["preview"]["totalMarks"].as_f64(), Some(83.33));
    assert_eq!(result["preview"]["finalGrade"].as_str(), Some("B"));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn missing_or_malformed_records_are_rejected() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let resp = request(&mut stdin, &mut reader, "1", "gradebook.seedForm", json!({}));
    assert_eq!(resp.get("ok").and_then(|v| v.as_bool()), Some(false));
    assert_eq!(resp["error"]["code"].as_str(), Some("bad_params"));

    let resp = request(
        &mut stdin,
        &mut reader,
        "2",
        "gradebook.seedForm",
        json!({ "record": { "student": "665f1c0de0a1b2c3d4e5f601" } }),
    );
    assert_eq!(resp["error"]["code"].as_str(), Some("bad_params"));

    let resp = request(
        &mut stdin,
        &mut reader,
        "3",
        "gradebook.seedForm",
        json!({
            "record": {
                "class": "665f1c0de0a1b2c3d4e5f602",
                "student": "665f1c0de0a1b2c3d4e5f601",
                "assignments": [{ "marks": "ninety" }]
            }
        }),
    );
    assert_eq!(resp["error"]["code"].as_str(), Some("bad_params"));

    drop(stdin);
    let _ = child.wait();
}
