use std::fs;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use serde_json::json;
use uuid::Uuid;
use walkdir::WalkDir;

use crate::error::OpContext;
use crate::error::StoreError;
use crate::oplog::OpLog;
use crate::oplog::OpRecord;
use crate::validate::ValidationRequest;
use crate::validate::WritePayload;
use crate::validate::WriteValidator;

/// Gating mode for mutating operations.
///
/// Consulted at call time, not at construction: a long-lived store can be
/// demoted to `ReadOnly` and promoted back while references to it are live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreMode {
    ReadOnly,
    ReadWrite,
}

impl StoreMode {
    pub fn as_str(self) -> &'static str {
        match self {
            StoreMode::ReadOnly => "read_only",
            StoreMode::ReadWrite => "read_write",
        }
    }
}

impl std::fmt::Display for StoreMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for [`ArtifactStore::write_text`].
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Schema ref handed to the validation hook before the write lands.
    pub schema: Option<String>,
}

/// Options for [`ArtifactStore::write_json`].
#[derive(Debug, Clone)]
pub struct JsonWriteOptions {
    pub schema: Option<String>,
    /// Pretty-print with two-space indentation. On by default: persisted
    /// JSON artifacts are meant to be diffed and reviewed.
    pub pretty: bool,
}

impl Default for JsonWriteOptions {
    fn default() -> Self {
        Self {
            schema: None,
            pretty: true,
        }
    }
}

/// Options for [`ArtifactStore::append_text`].
#[derive(Debug, Clone, Default)]
pub struct AppendOptions {
    pub schema: Option<String>,
    /// Appended after the content within the same OS-level append call.
    pub separator: Option<String>,
}

/// Sandboxed, mode-gated artifact store rooted at a fixed directory.
///
/// All paths accepted by its operations are relative to the root; anything
/// that resolves outside it is rejected before other checks run.
pub struct ArtifactStore {
    root: PathBuf,
    read_only: AtomicBool,
    validator: Option<Arc<dyn WriteValidator>>,
    op_log: Option<OpLog>,
}

impl ArtifactStore {
    /// Create a read-write store rooted at `root`. The root need not exist
    /// yet; it is fixed to an absolute, lexically normalized form so later
    /// resolutions cannot be redirected by a working-directory change.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref();
        let absolute = std::path::absolute(root).map_err(|source| StoreError::Io {
            action: "resolve root of",
            context: OpContext {
                relative_path: root.display().to_string(),
                absolute_path: root.to_path_buf(),
                mode: StoreMode::ReadWrite,
            },
            source,
        })?;
        Ok(Self {
            root: normalize(&absolute),
            read_only: AtomicBool::new(false),
            validator: None,
            op_log: None,
        })
    }

    /// Builder: start in the given mode.
    pub fn with_mode(self, mode: StoreMode) -> Self {
        self.set_mode(mode);
        self
    }

    /// Builder: install the pre-write validation hook.
    pub fn with_validator(mut self, validator: Arc<dyn WriteValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Builder: mirror every operation record to an NDJSON file.
    ///
    /// The path is used as given (it may live outside the sandbox) and
    /// failures to write it are swallowed.
    pub fn with_op_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.op_log = Some(OpLog::new(path.into()));
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn mode(&self) -> StoreMode {
        if self.read_only.load(Ordering::Relaxed) {
            StoreMode::ReadOnly
        } else {
            StoreMode::ReadWrite
        }
    }

    pub fn set_mode(&self, mode: StoreMode) {
        self.read_only
            .store(matches!(mode, StoreMode::ReadOnly), Ordering::Relaxed);
    }

    /// Resolve a store-relative path to an absolute path inside the root.
    ///
    /// Resolution is purely lexical: `.` and `..` components are folded
    /// without touching the filesystem (so symlinks are not followed and the
    /// target need not exist), and any result that would leave the root is
    /// rejected as out of bounds.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, StoreError> {
        let normalized = normalize(&self.root.join(relative));
        if normalized.starts_with(&self.root) {
            Ok(normalized)
        } else {
            Err(StoreError::OutOfBounds {
                context: self.context(relative, normalized),
            })
        }
    }

    // ─── Read operations ─────────────────────────────────────────────────

    /// Read a text artifact.
    pub fn read_text(&self, relative: &str) -> Result<String, StoreError> {
        let absolute = self.resolve(relative)?;
        let content = fs::read_to_string(&absolute).map_err(|source| StoreError::Io {
            action: "read",
            context: self.context(relative, absolute.clone()),
            source,
        })?;
        self.log(
            "debug",
            "read_text",
            json!({ "path": relative, "bytes": content.len() }),
        );
        Ok(content)
    }

    /// Read and parse a JSON artifact. Parse failures surface the serde
    /// message unchanged so callers can report the offending location.
    pub fn read_json<T: DeserializeOwned>(&self, relative: &str) -> Result<T, StoreError> {
        let content = self.read_text(relative)?;
        let parsed = serde_json::from_str(&content)?;
        Ok(parsed)
    }

    /// Recursively list the files (never directories) under `dir`, returned
    /// as root-relative forward-slash paths in deterministic sorted order.
    pub fn list(&self, dir: &str) -> Result<Vec<String>, StoreError> {
        let absolute = self.resolve(dir)?;
        let mut files = Vec::new();
        for entry in WalkDir::new(&absolute).sort_by_file_name() {
            let entry = entry.map_err(|err| {
                let source = err
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("directory walk interrupted"));
                StoreError::Io {
                    action: "list",
                    context: self.context(dir, absolute.clone()),
                    source,
                }
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Ok(stripped) = entry.path().strip_prefix(&self.root) {
                files.push(relative_string(stripped));
            }
        }
        self.log(
            "debug",
            "list",
            json!({ "path": dir, "files": files.len() }),
        );
        Ok(files)
    }

    // ─── Write operations ────────────────────────────────────────────────

    /// Write a text artifact atomically: the content lands in a freshly
    /// named temporary sibling which is renamed over the destination, so a
    /// concurrent reader never observes a partial file.
    pub fn write_text(
        &self,
        relative: &str,
        content: &str,
        options: &WriteOptions,
    ) -> Result<(), StoreError> {
        let absolute = self.ensure_writable(relative)?;
        self.ensure_parent(relative, &absolute)?;
        if let Some(schema) = options.schema.as_deref() {
            self.run_validator(relative, &absolute, schema, WritePayload::Text(content))?;
        }
        self.write_atomic(relative, &absolute, content.as_bytes())?;
        self.log(
            "info",
            "write_text",
            json!({ "path": relative, "bytes": content.len() }),
        );
        Ok(())
    }

    /// Serialize and write a JSON artifact atomically. Validation runs on
    /// the value, not the serialized string, and the payload always ends
    /// with a trailing newline.
    pub fn write_json<T: Serialize>(
        &self,
        relative: &str,
        data: &T,
        options: &JsonWriteOptions,
    ) -> Result<(), StoreError> {
        let absolute = self.ensure_writable(relative)?;
        self.ensure_parent(relative, &absolute)?;
        let value = serde_json::to_value(data)?;
        if let Some(schema) = options.schema.as_deref() {
            self.run_validator(relative, &absolute, schema, WritePayload::Json(&value))?;
        }
        let mut payload = if options.pretty {
            serde_json::to_string_pretty(&value)?
        } else {
            serde_json::to_string(&value)?
        };
        payload.push('\n');
        self.write_atomic(relative, &absolute, payload.as_bytes())?;
        self.log(
            "info",
            "write_json",
            json!({ "path": relative, "bytes": payload.len() }),
        );
        Ok(())
    }

    /// Append to a text artifact, creating it if absent. The content plus
    /// separator go down in one OS-level append; coordination between
    /// concurrent appenders is out of scope.
    pub fn append_text(
        &self,
        relative: &str,
        content: &str,
        options: &AppendOptions,
    ) -> Result<(), StoreError> {
        let absolute = self.ensure_writable(relative)?;
        self.ensure_parent(relative, &absolute)?;
        if let Some(schema) = options.schema.as_deref() {
            self.run_validator(relative, &absolute, schema, WritePayload::Text(content))?;
        }
        let mut chunk = content.to_string();
        if let Some(separator) = options.separator.as_deref() {
            chunk.push_str(separator);
        }
        self.append_raw(relative, &absolute, chunk.as_bytes())?;
        self.log(
            "info",
            "append_text",
            json!({ "path": relative, "bytes": chunk.len() }),
        );
        Ok(())
    }

    /// Serialize `data` to one compact JSON line and append it with a
    /// trailing newline. With a schema ref, the hook validates the value
    /// before the line is written.
    pub fn append_ndjson<T: Serialize>(
        &self,
        relative: &str,
        data: &T,
        schema: Option<&str>,
    ) -> Result<(), StoreError> {
        let absolute = self.ensure_writable(relative)?;
        self.ensure_parent(relative, &absolute)?;
        let value = serde_json::to_value(data)?;
        if let Some(schema) = schema {
            self.run_validator(relative, &absolute, schema, WritePayload::Json(&value))?;
        }
        let mut line = serde_json::to_string(&value)?;
        line.push('\n');
        self.append_raw(relative, &absolute, line.as_bytes())?;
        self.log("info", "append_ndjson", json!({ "path": relative }));
        Ok(())
    }

    // ─── Internals ───────────────────────────────────────────────────────

    fn context(&self, relative: &str, absolute: PathBuf) -> OpContext {
        OpContext {
            relative_path: relative.to_string(),
            absolute_path: absolute,
            mode: self.mode(),
        }
    }

    /// Resolve first, gate second: an escaping path is out of bounds even
    /// when the store would have refused the write anyway.
    fn ensure_writable(&self, relative: &str) -> Result<PathBuf, StoreError> {
        let absolute = self.resolve(relative)?;
        if self.mode() == StoreMode::ReadOnly {
            self.log("warn", "rejected_read_only", json!({ "path": relative }));
            return Err(StoreError::ReadOnly {
                context: self.context(relative, absolute),
            });
        }
        Ok(absolute)
    }

    fn ensure_parent(&self, relative: &str, absolute: &Path) -> Result<(), StoreError> {
        let Some(parent) = absolute.parent() else {
            return Ok(());
        };
        fs::create_dir_all(parent).map_err(|source| StoreError::Io {
            action: "create parent directory for",
            context: self.context(relative, absolute.to_path_buf()),
            source,
        })
    }

    fn run_validator(
        &self,
        relative: &str,
        absolute: &Path,
        schema: &str,
        payload: WritePayload<'_>,
    ) -> Result<(), StoreError> {
        let Some(validator) = self.validator.as_ref() else {
            self.log(
                "warn",
                "schema_requested_without_validator",
                json!({ "path": relative, "schema": schema }),
            );
            return Ok(());
        };
        let request = ValidationRequest {
            schema,
            path: relative,
            payload,
        };
        validator.validate(&request).map_err(|rejection| {
            self.log(
                "error",
                "validation_failed",
                json!({
                    "path": relative,
                    "schema": schema,
                    "violations": &rejection.violations,
                }),
            );
            StoreError::ValidationFailed {
                context: self.context(relative, absolute.to_path_buf()),
                violations: rejection.violations,
            }
        })
    }

    fn write_atomic(
        &self,
        relative: &str,
        absolute: &Path,
        bytes: &[u8],
    ) -> Result<(), StoreError> {
        let temp = temp_sibling(absolute);
        if let Err(source) = write_and_rename(&temp, absolute, bytes) {
            // The destination is untouched; only the temp needs cleanup.
            let _ = fs::remove_file(&temp);
            self.log(
                "error",
                "write_failed",
                json!({ "path": relative, "error": source.to_string() }),
            );
            return Err(StoreError::Io {
                action: "write",
                context: self.context(relative, absolute.to_path_buf()),
                source,
            });
        }
        Ok(())
    }

    fn append_raw(&self, relative: &str, absolute: &Path, bytes: &[u8]) -> Result<(), StoreError> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(absolute)
            .and_then(|mut file| file.write_all(bytes))
            .map_err(|source| {
                self.log(
                    "error",
                    "append_failed",
                    json!({ "path": relative, "error": source.to_string() }),
                );
                StoreError::Io {
                    action: "append",
                    context: self.context(relative, absolute.to_path_buf()),
                    source,
                }
            })
    }

    /// Emit a structured record to tracing and, when configured, to the
    /// NDJSON side channel. The store mode rides along in the details.
    fn log(&self, level: &'static str, message: &str, mut details: Value) {
        if let Value::Object(map) = &mut details {
            map.insert("mode".to_string(), json!(self.mode()));
        }
        match level {
            "error" => tracing::error!(%details, "{message}"),
            "warn" => tracing::warn!(%details, "{message}"),
            "info" => tracing::info!(%details, "{message}"),
            _ => tracing::debug!(%details, "{message}"),
        }
        if let Some(op_log) = &self.op_log {
            op_log.append(&OpRecord::new(level, message, details));
        }
    }
}

/// Lexically fold `.` and `..` components. `..` at the root is clamped
/// rather than preserved, matching how the sandbox treats the root as the
/// top of the world.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn relative_string(path: &Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn temp_sibling(destination: &Path) -> PathBuf {
    let name = destination
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "artifact".to_string());
    destination.with_file_name(format!(".{name}.{}.tmp", Uuid::new_v4()))
}

fn write_and_rename(temp: &Path, destination: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(temp)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    fs::rename(temp, destination)
}
