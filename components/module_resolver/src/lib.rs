//! Module resolution for sandbox submissions
//!
//! Rewrites `import`/`export`/`require` syntax so a submission can run as a
//! function body, maps bare npm specifiers onto a package CDN, picks a
//! reachable CDN host, and loads the resulting ES modules into the engine.
//!
//! # Examples
//!
//! ```
//! use module_resolver::{ImportRewriter, PackageSpecifier};
//!
//! let spec = PackageSpecifier::parse("lodash@4.17.21").unwrap();
//! assert_eq!(spec.bare(), "lodash");
//!
//! let code = ImportRewriter::execution("cdn.jsdelivr.net")
//!     .rewrite("import { chunk } from 'lodash'")
//!     .unwrap();
//! assert!(code.starts_with("const { chunk } = await import("));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cdn;
pub mod error;
pub mod loader;
pub mod rewriter;
pub mod specifier;

pub use cdn::{select_host, CdnConfig, MIRROR_HOST, PRIMARY_HOST};
pub use error::{FetchError, RewriteError};
pub use loader::{CdnModuleLoader, HttpFetcher, ModuleSource};
pub use rewriter::{ImportRewriter, RewriteMode};
pub use specifier::{is_bare, PackageSpecifier};
