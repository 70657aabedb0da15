use serde::{Deserialize, Serialize};

/// One graded item from a gradebook form row. The category (assignment,
/// test, exam) is carried by which array the entry arrives in; the
/// aggregator pools all categories identically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkEntry {
    pub marks: Option<f64>,
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSummary {
    pub total_marks: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_grade: Option<Grade>,
}

/// Half-up rounding at the second decimal, matching the predecessor's
/// `Math.round(x * 100) / 100`:
/// `floor(100*x + 0.5) / 100`
pub fn round_off_2_decimals(x: f64) -> f64 {
    ((100.0 * x) + 0.5).floor() / 100.0
}

/// Letter grade for a rounded total, evaluated in strict descending order.
/// A total of exactly 0 (or anything non-comparable, e.g. NaN) is not graded.
pub fn grade_for_total(total: f64) -> Option<Grade> {
    if total >= 90.0 {
        Some(Grade::A)
    } else if total >= 80.0 {
        Some(Grade::B)
    } else if total >= 70.0 {
        Some(Grade::C)
    } else if total >= 60.0 {
        Some(Grade::D)
    } else if total > 0.0 {
        Some(Grade::F)
    } else {
        None
    }
}

/// Pools all entries, sums `marks * weight` over the scored ones, and divides
/// by the total entry count (not the weight sum, and not the scored count).
///
/// An absent mark is "not scored". A mark of exactly 0 is also excluded from
/// the sum while still counting toward the denominator — observed behavior of
/// the system this replaces, kept so migrated grades do not shift. A zero or
/// absent weight falls back to 1 the same way.
pub fn aggregate(assignments: &[MarkEntry], tests: &[MarkEntry], exams: &[MarkEntry]) -> ScoreSummary {
    let mut weighted_sum = 0.0_f64;
    let mut entry_count = 0_usize;

    for entry in assignments.iter().chain(tests).chain(exams) {
        entry_count += 1;
        let Some(marks) = entry.marks else {
            continue;
        };
        if marks == 0.0 {
            continue;
        }
        let weight = match entry.weight {
            Some(w) if w != 0.0 => w,
            _ => 1.0,
        };
        weighted_sum += marks * weight;
    }

    let total = if entry_count > 0 {
        weighted_sum / (entry_count as f64)
    } else {
        0.0
    };
    let total_marks = round_off_2_decimals(total);

    ScoreSummary {
        total_marks,
        final_grade: grade_for_total(total_marks),
    }
}
