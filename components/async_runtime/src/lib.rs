//! Async plumbing for sandbox executions.
//!
//! This crate provides the pieces of the host event loop that live outside
//! the JavaScript engine:
//! - [`AbortToken`] - one cancellation handle per execution
//! - [`TimerQueue`] - deadlines for `setTimeout`/`setInterval` callbacks
//!
//! # Examples
//!
//! ## Racing work against an abort
//!
//! ```
//! use async_runtime::AbortToken;
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let token = AbortToken::new();
//! token.abort();
//! tokio::select! {
//!     _ = token.cancelled() => {}
//!     _ = std::future::pending::<()>() => unreachable!(),
//! }
//! # });
//! ```
//!
//! ## Timers
//!
//! ```
//! use async_runtime::TimerQueue;
//! use std::time::{Duration, Instant};
//!
//! let now = Instant::now();
//! let mut timers = TimerQueue::new();
//! let id = timers.set_timeout("callback", Duration::ZERO, now);
//! assert_eq!(timers.pop_due(now).map(|due| due.id), Some(id));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod abort;
pub mod timers;

pub use abort::AbortToken;
pub use timers::{DueTimer, TimerId, TimerQueue, MIN_INTERVAL};
