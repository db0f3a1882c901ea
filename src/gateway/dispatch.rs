//! Request classification and target resolution.
//!
//! # Responsibilities
//! - Map a URL path to a filesystem target under the document root
//! - Classify the target as local CGI, remote FastCGI, or static
//! - Apply the documented fallbacks: directory/missing → default app,
//!   directory → `index.html`
//!
//! # Design Decisions
//! - Immutable after construction; safe to share across request tasks
//! - The local/remote choice is made once here, not re-branched downstream
//! - Paths with a `..` component are rejected before touching the filesystem

use std::path::{Path, PathBuf};

use crate::config::{DispatchConfig, ExecMode};
use crate::gateway::route::RouteTable;

/// Outcome of classifying one request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Run the script through a local interpreter process.
    Local {
        interpreter: PathBuf,
        script: PathBuf,
    },
    /// Forward to the remote FastCGI backend with a built environment.
    Remote { script: PathBuf },
    /// Delegate to static file serving; missing files surface as its 404.
    Static { path: PathBuf },
    /// Path escapes the document root.
    Denied,
}

/// Per-request router over the immutable route table and config.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    root: PathBuf,
    default_app: Option<PathBuf>,
    routes: RouteTable,
    mode: ExecMode,
}

impl Dispatcher {
    pub fn new(config: &DispatchConfig) -> Self {
        Self {
            root: config.root.clone(),
            default_app: config.default_app.clone(),
            routes: RouteTable::new(config.interpreters.clone()),
            mode: config.mode,
        }
    }

    pub fn document_root(&self) -> &Path {
        &self.root
    }

    /// Resolve and classify a URL path.
    ///
    /// Resolution is two-phase: an exact extension lookup against the target
    /// joined under the root, then — when the extension has no entry and the
    /// target is missing or a directory — a single substitution of the
    /// configured default application. This lets directory requests fall
    /// through to a front-controller script.
    pub fn dispatch(&self, url_path: &str) -> Dispatch {
        // The original behavior here was ambiguous; traversal is rejected
        // outright rather than canonicalized.
        if url_path.split('/').any(|segment| segment == "..") {
            return Dispatch::Denied;
        }

        let trimmed = url_path.strip_suffix('/').unwrap_or(url_path);
        let mut target = self.root.join(trimmed.trim_start_matches('/'));
        let mut interpreter = self.routes.lookup_path(&target).map(Path::to_path_buf);

        let metadata = std::fs::metadata(&target).ok();
        let missing_or_dir = metadata.as_ref().map_or(true, |m| m.is_dir());

        if interpreter.is_none() && missing_or_dir {
            if let Some(app) = &self.default_app {
                target = app.clone();
                interpreter = self.routes.lookup_path(&target).map(Path::to_path_buf);
            }
        }

        if let Some(interpreter) = interpreter {
            return match self.mode {
                ExecMode::Local => Dispatch::Local {
                    interpreter,
                    script: target,
                },
                ExecMode::Remote => Dispatch::Remote { script: target },
            };
        }

        let is_dir = metadata.as_ref().is_some_and(|m| m.is_dir());
        if is_dir || trimmed.is_empty() {
            let index = target.join("index.html");
            if index.is_file() {
                target = index;
            }
        }

        Dispatch::Static { path: target }
    }
}
