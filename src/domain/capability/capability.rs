use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Keyword parameters passed to a capability
pub type Parameters = Map<String, Value>;

/// Errors raised by a capability invocation or registry lookup
#[derive(Debug, Error)]
pub enum CapabilityError {
    #[error("Capability '{0}' not found")]
    NotFound(String),

    #[error("Category '{0}' not found")]
    UnknownCategory(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Execution failed: {0}")]
    Execution(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CapabilityResult<T> = Result<T, CapabilityError>;

/// Categories used to organise capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityCategory {
    CodeAnalysis,
    FileOperations,
    WebScraping,
    SystemMonitoring,
    GitOperations,
    CodeQuality,
    Documentation,
}

impl CapabilityCategory {
    pub const ALL: [CapabilityCategory; 7] = [
        CapabilityCategory::CodeAnalysis,
        CapabilityCategory::FileOperations,
        CapabilityCategory::WebScraping,
        CapabilityCategory::SystemMonitoring,
        CapabilityCategory::GitOperations,
        CapabilityCategory::CodeQuality,
        CapabilityCategory::Documentation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CapabilityCategory::CodeAnalysis => "code_analysis",
            CapabilityCategory::FileOperations => "file_operations",
            CapabilityCategory::WebScraping => "web_scraping",
            CapabilityCategory::SystemMonitoring => "system_monitoring",
            CapabilityCategory::GitOperations => "git_operations",
            CapabilityCategory::CodeQuality => "code_quality",
            CapabilityCategory::Documentation => "documentation",
        }
    }
}

impl std::fmt::Display for CapabilityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CapabilityCategory {
    type Err = CapabilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| CapabilityError::UnknownCategory(s.to_string()))
    }
}

/// Describes one parameter a capability accepts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub required: bool,
}

impl ParameterSpec {
    pub fn required(name: &str, kind: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: kind.to_string(),
            description: description.to_string(),
            required: true,
        }
    }

    pub fn optional(name: &str, kind: &str, description: &str) -> Self {
        Self {
            required: false,
            ..Self::required(name, kind, description)
        }
    }
}

/// A named, categorised unit of external functionality
///
/// Implementations live outside the orchestration core. Agents hold shared
/// handles to them and invoke them with keyword parameters.
#[async_trait]
pub trait Capability: Send + Sync {
    /// Unique name used for lookup and in task instructions
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn category(&self) -> CapabilityCategory;

    fn parameters(&self) -> Vec<ParameterSpec> {
        Vec::new()
    }

    /// Run the capability
    ///
    /// A payload carrying an `error` field is still a successful invocation;
    /// only `Err` is treated as a failure by the interpreter.
    async fn invoke(&self, parameters: Parameters) -> CapabilityResult<Value>;
}

/// Serialisable summary of a capability, used for listings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapabilityDescriptor {
    pub name: String,
    pub description: String,
    pub category: CapabilityCategory,
    pub parameters: Vec<ParameterSpec>,
}

impl CapabilityDescriptor {
    pub fn of(capability: &dyn Capability) -> Self {
        Self {
            name: capability.name().to_string(),
            description: capability.description().to_string(),
            category: capability.category(),
            parameters: capability.parameters(),
        }
    }
}
