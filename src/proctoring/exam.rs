//! Proctored exam record as served by the edX proctoring API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::collection::Record;

/// One proctored exam of a course.
///
/// Attributes the server sends that are not modelled here are kept in
/// `extra` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProctoredExam {
    /// Server id, absent for exams created locally
    #[serde(default)]
    pub id: Option<i64>,
    pub course_id: String,
    /// Usage key of the exam subsection
    pub content_id: String,
    #[serde(default)]
    pub external_id: Option<String>,
    pub exam_name: String,
    #[serde(default)]
    pub time_limit_mins: u32,
    #[serde(default)]
    pub is_proctored: bool,
    #[serde(default)]
    pub is_practice_exam: bool,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub hide_after_due: bool,
    /// Proctoring backend name
    #[serde(default)]
    pub backend: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Kind of exam, derived from the proctoring flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExamKind {
    Proctored,
    Practice,
    Timed,
}

impl ProctoredExam {
    pub fn kind(&self) -> ExamKind {
        if self.is_practice_exam {
            ExamKind::Practice
        } else if self.is_proctored {
            ExamKind::Proctored
        } else {
            ExamKind::Timed
        }
    }

    /// Whether the due date has passed at `now`
    pub fn is_past_due(&self, now: DateTime<Utc>) -> bool {
        self.due_date.map(|due| due <= now).unwrap_or(false)
    }
}

impl Record for ProctoredExam {
    type Id = i64;

    fn id(&self) -> Option<i64> {
        self.id
    }
}

impl std::fmt::Display for ExamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExamKind::Proctored => write!(f, "proctored"),
            ExamKind::Practice => write!(f, "practice"),
            ExamKind::Timed => write!(f, "timed"),
        }
    }
}

impl std::fmt::Display for ProctoredExam {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.id {
            Some(id) => write!(f, "[{}] ", id)?,
            None => write!(f, "[new] ")?,
        }
        write!(f, "{} ({}, {} min)", self.exam_name, self.kind(), self.time_limit_mins)?;

        if let Some(due) = self.due_date {
            write!(f, " due {}", due.format("%Y-%m-%d %H:%M UTC"))?;
        }
        if !self.is_active {
            write!(f, " [INACTIVE]")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> serde_json::Value {
        serde_json::json!({
            "id": 14,
            "course_id": "course-v1:edX+DemoX+Demo_Course",
            "content_id": "block-v1:edX+DemoX+Demo_Course+type@sequential+block@final",
            "external_id": null,
            "exam_name": "Final Exam",
            "time_limit_mins": 90,
            "is_proctored": true,
            "is_practice_exam": false,
            "is_active": true,
            "due_date": "2024-05-01T23:30:00Z",
            "hide_after_due": false,
            "backend": "software_secure"
        })
    }

    #[test]
    fn test_parse_exam() {
        let exam = ProctoredExam::from_raw(sample()).unwrap();
        assert_eq!(exam.id(), Some(14));
        assert_eq!(exam.exam_name, "Final Exam");
        assert_eq!(exam.kind(), ExamKind::Proctored);
        assert_eq!(
            exam.due_date,
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 23, 30, 0).unwrap())
        );
        assert!(exam.extra.is_empty());
    }

    #[test]
    fn test_unknown_attributes_are_kept() {
        let mut raw = sample();
        raw["allowance_count"] = serde_json::json!(3);
        let exam = ProctoredExam::from_raw(raw).unwrap();
        assert_eq!(exam.extra["allowance_count"], 3);
        assert_eq!(exam.to_raw()["allowance_count"], 3);
    }

    #[test]
    fn test_minimal_exam() {
        let raw = serde_json::json!({
            "course_id": "course-v1:a+b+c",
            "content_id": "block",
            "exam_name": "Quiz"
        });
        let exam = ProctoredExam::from_raw(raw).unwrap();
        assert_eq!(exam.id(), None);
        assert_eq!(exam.kind(), ExamKind::Timed);
        assert!(!exam.is_past_due(Utc::now()));
    }

    #[test]
    fn test_past_due() {
        let exam = ProctoredExam::from_raw(sample()).unwrap();
        let before = Utc.with_ymd_and_hms(2024, 4, 30, 0, 0, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap();
        assert!(!exam.is_past_due(before));
        assert!(exam.is_past_due(after));
    }

    #[test]
    fn test_display() {
        let mut exam = ProctoredExam::from_raw(sample()).unwrap();
        assert_eq!(
            exam.to_string(),
            "[14] Final Exam (proctored, 90 min) due 2024-05-01 23:30 UTC"
        );
        exam.is_practice_exam = true;
        exam.is_active = false;
        exam.due_date = None;
        assert_eq!(
            exam.to_string(),
            "[14] Final Exam (practice, 90 min) [INACTIVE]"
        );
    }
}
