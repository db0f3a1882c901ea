//! Extension → interpreter lookup.
//!
//! # Design Decisions
//! - Built once from config, immutable at runtime (thread-safe without locks)
//! - Exact-match lookup only, no wildcards or chained fallbacks

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Immutable mapping from file extension (with leading dot) to the
/// interpreter binary that runs scripts of that type.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    interpreters: HashMap<String, PathBuf>,
}

impl RouteTable {
    pub fn new(interpreters: HashMap<String, PathBuf>) -> Self {
        Self { interpreters }
    }

    /// Interpreter for an extension such as `".php"`, if one is configured.
    pub fn lookup(&self, ext: &str) -> Option<&Path> {
        self.interpreters.get(ext).map(PathBuf::as_path)
    }

    /// Interpreter for a filesystem path, keyed by its extension.
    pub fn lookup_path(&self, path: &Path) -> Option<&Path> {
        let ext = path.extension()?.to_str()?;
        self.lookup(&format!(".{ext}"))
    }

    pub fn is_empty(&self) -> bool {
        self.interpreters.is_empty()
    }
}
