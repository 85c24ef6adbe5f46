//! Integration test suite for the REPL sandbox
//!
//! This crate verifies that components work together across crate
//! boundaries: classifier and rewriter feeding the engine, and the
//! session driving everything into a history.

use module_resolver::{FetchError, ModuleSource};
use std::collections::HashMap;

/// Re-export components for test convenience
pub mod components {
    pub use core_types;
    pub use interpreter;
    pub use js_cli;
    pub use module_resolver;
    pub use orchestrator;
    pub use parser;
}

/// CDN host the fixtures are served under.
pub const TEST_HOST: &str = "cdn.jsdelivr.net";

/// Modules served from memory, keyed by full URL.
#[derive(Debug, Default, Clone)]
pub struct FixtureModules {
    modules: HashMap<String, String>,
}

impl FixtureModules {
    /// Serves `text` for `package` (with optional `@version`) on [`TEST_HOST`].
    pub fn with(mut self, package: &str, text: &str) -> Self {
        let url = format!("https://{}/npm/{}/+esm", TEST_HOST, package);
        self.modules.insert(url, text.to_string());
        self
    }

    /// A tiny stand-in for lodash 4.17.21.
    pub fn lodash() -> Self {
        Self::default().with(
            "lodash@4.17.21",
            "const chunk = (xs, n) => { const out = []; for (let i = 0; i < xs.length; i += n) out.push(xs.slice(i, i + n)); return out; };\n\
             export const VERSION = '4.17.21';\n\
             export default { chunk, VERSION };",
        )
    }
}

impl ModuleSource for FixtureModules {
    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.modules.get(url).cloned().ok_or(FetchError::Status {
            url: url.to_string(),
            status: 404,
        })
    }
}
