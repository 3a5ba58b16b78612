//! The proctored exam collection of the instructor dashboard

use std::time::Duration;

use reqwest::Url;

use crate::collection::{CollectionError, CollectionResult, HttpSource, RecordSource, RemoteCollection};
use crate::core::config::DashboardConfig;

use super::exam::ProctoredExam;

/// REST resource backing the exam list of a course
pub const EXAM_RESOURCE_PATH: &str = "/api/edx_proctoring/v1/proctored_exam/exam/course_id/";

/// Collection of proctored exams, fetched over HTTP by default
pub type ExamCollection<S = HttpSource> = RemoteCollection<ProctoredExam, S>;

/// Build an exam collection over any source.
///
/// With a `course_id` the collection is scoped to that course; without one it
/// addresses the bare resource path.
pub fn exam_collection<S: RecordSource>(
    source: S,
    base_url: &Url,
    course_id: Option<&str>,
    event_capacity: usize,
) -> CollectionResult<ExamCollection<S>> {
    RemoteCollection::new(source, base_url, EXAM_RESOURCE_PATH, course_id, event_capacity)
}

/// Build the HTTP-backed exam collection described by `config`
pub fn exam_collection_from_config(
    config: &DashboardConfig,
    course_id: Option<&str>,
) -> CollectionResult<ExamCollection> {
    let base = config.base_url()?;
    let source = HttpSource::new(
        Duration::from_secs(config.timeout_secs),
        config.auth_header.as_deref(),
    )?;
    let course_id = course_id.or(config.course_id.as_deref());
    if course_id.is_none() {
        tracing::warn!("No course id configured; fetching the unscoped exam resource");
    }
    exam_collection(source, &base, course_id, config.event_capacity)
        .map_err(|e| match e {
            CollectionError::InvalidUrl(msg) => {
                CollectionError::Config(format!("Cannot build exam URL: {}", msg))
            }
            other => other,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::source::tests::{serve_once, StaticSource};
    use crate::collection::{FetchMode, Record};
    use std::any::TypeId;

    fn base() -> Url {
        Url::parse("http://localhost:18000").unwrap()
    }

    #[test]
    fn test_resource_path_is_literal() {
        let coll = exam_collection(StaticSource::default(), &base(), Some("course-v1:a+b+c"), 8).unwrap();
        assert_eq!(
            coll.resource_path(),
            "/api/edx_proctoring/v1/proctored_exam/exam/course_id/"
        );
    }

    #[test]
    fn test_record_type_is_proctored_exam() {
        let scoped = exam_collection(StaticSource::default(), &base(), Some("x"), 8).unwrap();
        let unscoped = exam_collection(StaticSource::default(), &base(), None, 8).unwrap();
        assert_eq!(scoped.record_type(), TypeId::of::<ProctoredExam>());
        assert_eq!(unscoped.record_type(), TypeId::of::<ProctoredExam>());
    }

    #[test]
    fn test_urls() {
        let unscoped = exam_collection(StaticSource::default(), &base(), None, 8).unwrap();
        assert_eq!(
            unscoped.url().as_str(),
            "http://localhost:18000/api/edx_proctoring/v1/proctored_exam/exam/course_id/"
        );

        let scoped =
            exam_collection(StaticSource::default(), &base(), Some("course-v1:edX+DemoX+Demo"), 8)
                .unwrap();
        assert_eq!(
            scoped.url().as_str(),
            "http://localhost:18000/api/edx_proctoring/v1/proctored_exam/exam/course_id/course-v1:edX+DemoX+Demo"
        );
    }

    #[test]
    fn test_config_course_id_fallback() {
        let config = DashboardConfig {
            course_id: Some("course-v1:cfg+1+2".into()),
            ..Default::default()
        };
        let coll = exam_collection_from_config(&config, None).unwrap();
        assert!(coll.url().as_str().ends_with("/course_id/course-v1:cfg+1+2"));

        let coll = exam_collection_from_config(&config, Some("course-v1:cli+1+2")).unwrap();
        assert!(coll.url().as_str().ends_with("/course_id/course-v1:cli+1+2"));
    }

    #[test]
    fn test_config_bad_base_url() {
        let config = DashboardConfig {
            base_url: "not a url".into(),
            ..Default::default()
        };
        let err = exam_collection_from_config(&config, Some("c")).err().unwrap();
        assert!(matches!(err, CollectionError::Config(_)));
    }

    #[tokio::test]
    async fn test_fetch_exams_over_http() {
        let body = serde_json::json!([
            {
                "id": 1,
                "course_id": "course-v1:edX+DemoX+Demo",
                "content_id": "block-1",
                "exam_name": "Midterm",
                "time_limit_mins": 60,
                "is_proctored": true,
                "is_active": true
            },
            {
                "id": 2,
                "course_id": "course-v1:edX+DemoX+Demo",
                "content_id": "block-2",
                "exam_name": "Practice",
                "time_limit_mins": 30,
                "is_proctored": true,
                "is_practice_exam": true,
                "is_active": true
            }
        ]);
        let (base, server) = serve_once("200 OK", body.to_string()).await;

        let config = DashboardConfig {
            base_url: base.to_string(),
            ..Default::default()
        };
        let coll = exam_collection_from_config(&config, Some("course-v1:edX+DemoX+Demo")).unwrap();
        let summary = coll.fetch(FetchMode::Merge).await.unwrap();

        assert_eq!(summary.added, 2);
        let exams = coll.records().await;
        assert_eq!(exams[0].exam_name, "Midterm");
        assert_eq!(exams[1].id(), Some(2));
        assert!(exams[1].is_practice_exam);

        let request = server.await.unwrap();
        assert!(request.starts_with(
            "GET /api/edx_proctoring/v1/proctored_exam/exam/course_id/course-v1:edX+DemoX+Demo HTTP/1.1"
        ));
    }
}
