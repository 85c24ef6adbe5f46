//! Sandboxed execution of REPL submissions
//!
//! This crate evaluates one submission at a time inside an embedded
//! JavaScript engine and carries state between submissions:
//! - The binding context holds every name a submission declared
//! - Each submission runs as a synthesized function taking the bindings as
//!   parameters and returning them in an object
//! - Top-level `await` falls back to an async function driven on `tokio`
//! - Console calls and thrown values are snapshotted into [`core_types::Value`]
//!
//! # Example
//!
//! ```
//! use interpreter::{ExecutionEngine, Sandbox, SandboxOptions};
//! use core_types::Value;
//!
//! let sandbox = Sandbox::new(&SandboxOptions::default()).unwrap();
//! let mut engine = ExecutionEngine::new(sandbox, "cdn.jsdelivr.net");
//! let runtime = tokio::runtime::Builder::new_current_thread()
//!     .enable_time()
//!     .build()
//!     .unwrap();
//!
//! let result = runtime
//!     .block_on(engine.execute("const { a, ...rest } = { a: 1, b: 2, c: 3 };\nrest"))
//!     .unwrap();
//! assert_eq!(result.unwrap().to_string(), "{ b: 2, c: 3 }");
//! assert_eq!(engine.describe_binding("a"), Some(Value::Number(1.0)));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod binding;
pub mod engine;
pub mod error;
pub mod inspect;
pub mod sandbox;
pub mod synthesize;

// Re-export main types at crate root
pub use binding::BindingContext;
pub use engine::{ExecutionEngine, DEFAULT_POLL_INTERVAL};
pub use error::ExecutionError;
pub use inspect::Inspector;
pub use sandbox::{Sandbox, SandboxOptions, CONSOLE_METHODS};
pub use synthesize::{synthesize, SynthesizedBody};
