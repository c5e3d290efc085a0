use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use globset::{Glob, GlobMatcher};
use serde_json::{json, Value};
use tracing::debug;

use crate::domain::capability::{
    Capability, CapabilityCategory, CapabilityError, CapabilityResult, ParameterSpec, Parameters,
};

/// Directory the file capabilities are confined to
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl AsRef<Path>) -> CapabilityResult<Self> {
        let root = root.as_ref().canonicalize()?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a path that must already exist inside the root
    async fn existing(&self, requested: &str) -> CapabilityResult<PathBuf> {
        let resolved = tokio::fs::canonicalize(self.root.join(requested))
            .await
            .map_err(|err| {
                CapabilityError::Execution(format!("path '{}' could not be resolved: {}", requested, err))
            })?;
        self.confine(requested, resolved)
    }

    /// Resolves a file path whose parent directory must exist inside the root
    async fn writable(&self, requested: &str) -> CapabilityResult<PathBuf> {
        let joined = self.root.join(requested);
        let file_name = match joined.components().next_back() {
            Some(Component::Normal(name)) => name.to_owned(),
            _ => {
                return Err(CapabilityError::InvalidParameters(format!(
                    "'{}' does not name a file",
                    requested
                )))
            }
        };
        let parent = joined.parent().unwrap_or(&self.root);
        let parent = tokio::fs::canonicalize(parent).await.map_err(|err| {
            CapabilityError::Execution(format!(
                "parent directory of '{}' could not be resolved: {}",
                requested, err
            ))
        })?;

        self.confine(requested, parent.join(file_name))
    }

    fn confine(&self, requested: &str, resolved: PathBuf) -> CapabilityResult<PathBuf> {
        if resolved.starts_with(&self.root) {
            Ok(resolved)
        } else {
            Err(CapabilityError::InvalidParameters(format!(
                "path '{}' is outside '{}'",
                requested,
                self.root.display()
            )))
        }
    }

    fn relative(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .into_owned()
    }
}

fn string_param<'a>(parameters: &'a Parameters, key: &str) -> CapabilityResult<&'a str> {
    parameters
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| CapabilityError::InvalidParameters(format!("'{}' is required", key)))
}

/// Compiles a shell-style file name pattern such as `*.rs` or `test_?.txt`
fn name_matcher(pattern: &str) -> CapabilityResult<GlobMatcher> {
    Glob::new(pattern)
        .map(|glob| glob.compile_matcher())
        .map_err(|err| {
            CapabilityError::InvalidParameters(format!("invalid pattern '{}': {}", pattern, err))
        })
}

/// Reads a UTF-8 text file
pub struct ReadFile {
    workspace: Workspace,
}

impl ReadFile {
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }
}

#[async_trait]
impl Capability for ReadFile {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read the contents of a text file"
    }

    fn category(&self) -> CapabilityCategory {
        CapabilityCategory::FileOperations
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![ParameterSpec::required("path", "string", "File path relative to the workspace")]
    }

    async fn invoke(&self, parameters: Parameters) -> CapabilityResult<Value> {
        let requested = string_param(&parameters, "path")?;
        let path = self.workspace.existing(requested).await?;
        debug!(path = %path.display(), "Reading file");

        let content = tokio::fs::read_to_string(&path).await?;
        Ok(json!({
            "path": self.workspace.relative(&path),
            "size": content.len(),
            "content": content,
        }))
    }
}

/// Writes a text file, replacing existing content
pub struct WriteFile {
    workspace: Workspace,
}

impl WriteFile {
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }
}

#[async_trait]
impl Capability for WriteFile {
    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Write content to a file"
    }

    fn category(&self) -> CapabilityCategory {
        CapabilityCategory::FileOperations
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![
            ParameterSpec::required("path", "string", "File path relative to the workspace"),
            ParameterSpec::required("content", "string", "Text to write"),
        ]
    }

    async fn invoke(&self, parameters: Parameters) -> CapabilityResult<Value> {
        let requested = string_param(&parameters, "path")?;
        let content = string_param(&parameters, "content")?;
        let path = self.workspace.writable(requested).await?;
        debug!(path = %path.display(), bytes = content.len(), "Writing file");

        tokio::fs::write(&path, content).await?;
        Ok(json!({
            "path": self.workspace.relative(&path),
            "bytes_written": content.len(),
        }))
    }
}

/// Lists directory entries matching an optional wildcard pattern
pub struct ListDirectory {
    workspace: Workspace,
}

impl ListDirectory {
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }
}

#[async_trait]
impl Capability for ListDirectory {
    fn name(&self) -> &str {
        "list_directory"
    }

    fn description(&self) -> &str {
        "List files in a directory matching a pattern"
    }

    fn category(&self) -> CapabilityCategory {
        CapabilityCategory::FileOperations
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![
            ParameterSpec::required("path", "string", "Directory relative to the workspace"),
            ParameterSpec::optional("pattern", "string", "Glob filter on entry names, defaults to '*'"),
        ]
    }

    async fn invoke(&self, parameters: Parameters) -> CapabilityResult<Value> {
        let requested = string_param(&parameters, "path")?;
        let pattern = parameters
            .get("pattern")
            .and_then(Value::as_str)
            .unwrap_or("*");
        let matcher = name_matcher(pattern)?;
        let dir = self.workspace.existing(requested).await?;

        let mut entries = Vec::new();
        let mut reader = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = reader.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if matcher.is_match(&name) {
                entries.push(self.workspace.relative(&entry.path()));
            }
        }
        entries.sort();

        Ok(json!({
            "path": self.workspace.relative(&dir),
            "count": entries.len(),
            "entries": entries,
        }))
    }
}

/// The file capabilities, all sharing one workspace
pub fn file_capabilities(workspace: Workspace) -> Vec<Arc<dyn Capability>> {
    vec![
        Arc::new(ReadFile::new(workspace.clone())),
        Arc::new(WriteFile::new(workspace.clone())),
        Arc::new(ListDirectory::new(workspace)),
    ]
}
