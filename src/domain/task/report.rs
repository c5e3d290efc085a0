use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Outcome recorded in a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Completed,
    Failed,
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportStatus::Completed => write!(f, "completed"),
            ReportStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Immutable outcome of one executed task
///
/// Produced once per task by the executing agent. Serialises to the payload
/// returned by `get_agent_reports`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub agent_id: Uuid,
    pub task_id: Uuid,
    pub status: ReportStatus,
    pub result: Option<Value>,
    pub error: Option<String>,
    /// Wall-clock execution time in seconds
    pub execution_time: f64,
    pub metadata: Map<String, Value>,
    pub timestamp: DateTime<Utc>,
}

impl Report {
    /// Report for a task that finished successfully
    pub fn completed(
        agent_id: Uuid,
        agent_name: &str,
        task_id: Uuid,
        result: Option<Value>,
        execution_time: f64,
    ) -> Self {
        Self {
            agent_id,
            task_id,
            status: ReportStatus::Completed,
            result,
            error: None,
            execution_time,
            metadata: Self::agent_metadata(agent_name),
            timestamp: Utc::now(),
        }
    }

    /// Report for a task whose execution failed
    pub fn failed(
        agent_id: Uuid,
        agent_name: &str,
        task_id: Uuid,
        error: impl Into<String>,
        execution_time: f64,
    ) -> Self {
        Self {
            agent_id,
            task_id,
            status: ReportStatus::Failed,
            result: None,
            error: Some(error.into()),
            execution_time,
            metadata: Self::agent_metadata(agent_name),
            timestamp: Utc::now(),
        }
    }

    fn agent_metadata(agent_name: &str) -> Map<String, Value> {
        let mut metadata = Map::new();
        metadata.insert("agent_name".to_string(), Value::String(agent_name.to_string()));
        metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn completed_report_carries_agent_name() {
        let report = Report::completed(Uuid::new_v4(), "Reviewer", Uuid::new_v4(), None, 0.5);

        assert_eq!(report.status, ReportStatus::Completed);
        assert_eq!(report.metadata.get("agent_name"), Some(&json!("Reviewer")));
        assert!(report.error.is_none());
    }

    #[test]
    fn failed_report_has_no_result() {
        let report = Report::failed(Uuid::new_v4(), "Tester", Uuid::new_v4(), "boom", 0.1);

        assert_eq!(report.status, ReportStatus::Failed);
        assert!(report.result.is_none());
        assert_eq!(report.error.as_deref(), Some("boom"));
    }

    #[test]
    fn serialized_fields_use_wire_names() {
        let report = Report::completed(
            Uuid::new_v4(),
            "Writer",
            Uuid::new_v4(),
            Some(json!([1, 2])),
            1.25,
        );
        let payload = serde_json::to_value(&report).unwrap();

        assert_eq!(payload["status"], json!("completed"));
        assert_eq!(payload["execution_time"], json!(1.25));
        assert_eq!(payload["result"], json!([1, 2]));
        assert!(payload["error"].is_null());
        assert!(payload.get("timestamp").is_some());
    }
}
