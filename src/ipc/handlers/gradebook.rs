use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::refs::{Ref, RefTarget};
use crate::scoring::{self, MarkEntry, ScoreSummary};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use uuid::Uuid;

const ENTRY_FIELDS: [&str; 3] = ["assignments", "tests", "exams"];

struct HandlerErr {
    code: &'static str,
    message: String,
    details: Option<Value>,
}

impl HandlerErr {
    fn response(self, id: &str) -> Value {
        err(id, self.code, self.message, self.details)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchoolClass {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
}

impl RefTarget for SchoolClass {
    fn id(&self) -> &str {
        &self.id
    }
    fn display_name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Student {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
}

impl RefTarget for Student {
    fn id(&self) -> &str {
        &self.id
    }
    fn display_name(&self) -> &str {
        &self.name
    }
}

/// Gradebook record as the backend stores it. The class and student fields
/// arrive either as bare ids or as populated records depending on which list
/// endpoint produced them.
#[derive(Debug, Deserialize)]
struct StoredGradebook {
    class: Ref<SchoolClass>,
    student: Ref<Student>,
    #[serde(default)]
    assignments: Vec<Value>,
    #[serde(default)]
    tests: Vec<Value>,
    #[serde(default)]
    exams: Vec<Value>,
}

fn summary_json(summary: &ScoreSummary) -> Value {
    let mut out = json!({ "totalMarks": summary.total_marks });
    if let Some(grade) = summary.final_grade {
        out["finalGrade"] = json!(grade);
    }
    out
}

fn parse_entries(params: &Value, field: &str) -> Result<Vec<MarkEntry>, HandlerErr> {
    let raw = match params.get(field) {
        None => return Ok(Vec::new()),
        Some(Value::Null) => return Ok(Vec::new()),
        Some(v) => v,
    };
    serde_json::from_value::<Vec<MarkEntry>>(raw.clone()).map_err(|e| HandlerErr {
        code: "bad_params",
        message: format!("{field} must be an array of mark entries"),
        details: Some(json!({ "error": e.to_string() })),
    })
}

fn aggregate_from_params(params: &Value) -> Result<ScoreSummary, HandlerErr> {
    let assignments = parse_entries(params, "assignments")?;
    let tests = parse_entries(params, "tests")?;
    let exams = parse_entries(params, "exams")?;
    Ok(scoring::aggregate(&assignments, &tests, &exams))
}

fn handle_preview(req: &Request) -> Value {
    match aggregate_from_params(&req.params) {
        Ok(summary) => ok(&req.id, summary_json(&summary)),
        Err(e) => e.response(&req.id),
    }
}

/// Merges the computed totals into the submitted form snapshot. Everything
/// else passes through verbatim: the backend contract is fixed. UI-only
/// `rowId` keys are stripped from entry rows; the field array generated them
/// and the backend has never seen them.
fn handle_build_payload(req: &Request) -> Value {
    let Some(form) = req.params.as_object() else {
        return err(
            &req.id,
            "bad_params",
            "params must be the gradebook form object",
            None,
        );
    };

    let summary = match aggregate_from_params(&req.params) {
        Ok(s) => s,
        Err(e) => return e.response(&req.id),
    };

    let mut payload = form.clone();
    for field in ENTRY_FIELDS {
        if let Some(Value::Array(rows)) = payload.get_mut(field) {
            for row in rows {
                if let Value::Object(row_obj) = row {
                    row_obj.remove("rowId");
                }
            }
        }
    }
    payload.insert("totalMarks".to_string(), json!(summary.total_marks));
    payload.remove("finalGrade");
    if let Some(grade) = summary.final_grade {
        payload.insert("finalGrade".to_string(), json!(grade));
    }

    ok(&req.id, json!({ "payload": Value::Object(payload) }))
}

fn seed_rows(rows: &[Value], field: &str) -> Result<(Vec<Value>, Vec<MarkEntry>), HandlerErr> {
    let mut seeded = Vec::with_capacity(rows.len());
    let mut entries = Vec::with_capacity(rows.len());
    for row in rows {
        let entry: MarkEntry = serde_json::from_value(row.clone()).map_err(|e| HandlerErr {
            code: "bad_params",
            message: format!("record.{field} contains a malformed mark entry"),
            details: Some(json!({ "error": e.to_string() })),
        })?;
        entries.push(entry);

        let mut row = row.clone();
        if let Value::Object(row_obj) = &mut row {
            row_obj.insert("rowId".to_string(), json!(Uuid::new_v4().to_string()));
        }
        seeded.push(row);
    }
    Ok((seeded, entries))
}

/// Turns a stored gradebook record into the flat shape the edit form binds
/// to, with generated row ids for the field arrays and the recomputed
/// summary for the initial preview.
fn handle_seed_form(req: &Request) -> Value {
    let Some(raw) = req.params.get("record") else {
        return err(&req.id, "bad_params", "missing record", None);
    };
    let record: StoredGradebook = match serde_json::from_value(raw.clone()) {
        Ok(v) => v,
        Err(e) => {
            return err(
                &req.id,
                "bad_params",
                "record is not a gradebook record",
                Some(json!({ "error": e.to_string() })),
            )
        }
    };

    let mut seeded: Map<String, Value> = Map::new();
    let mut pooled: Vec<Vec<MarkEntry>> = Vec::with_capacity(ENTRY_FIELDS.len());
    for (field, rows) in ENTRY_FIELDS
        .into_iter()
        .zip([&record.assignments, &record.tests, &record.exams])
    {
        match seed_rows(rows, field) {
            Ok((rows, entries)) => {
                seeded.insert(field.to_string(), Value::Array(rows));
                pooled.push(entries);
            }
            Err(e) => return e.response(&req.id),
        }
    }
    let summary = scoring::aggregate(&pooled[0], &pooled[1], &pooled[2]);

    seeded.insert("classId".to_string(), json!(record.class.resolve_id()));
    seeded.insert("className".to_string(), json!(record.class.resolve_name()));
    seeded.insert("studentId".to_string(), json!(record.student.resolve_id()));
    seeded.insert(
        "studentName".to_string(),
        json!(record.student.resolve_name()),
    );
    seeded.insert("preview".to_string(), summary_json(&summary));

    ok(&req.id, Value::Object(seeded))
}

pub fn try_handle(_state: &mut AppState, req: &Request) -> Option<Value> {
    match req.method.as_str() {
        "gradebook.preview" => Some(handle_preview(req)),
        "gradebook.buildPayload" => Some(handle_build_payload(req)),
        "gradebook.seedForm" => Some(handle_seed_form(req)),
        _ => None,
    }
}
