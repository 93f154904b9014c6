//! # Reactive Primitives
//!
//! Observable state cells used by screen controllers to publish their state
//! to whatever rendering layer is attached.
//!
//! ## Core Types
//!
//! - [`Observable<T>`]: a single-writer, multi-reader value with
//!   replay-latest semantics and explicit close.
//!
//! - [`Subscription<T>`]: a read handle supporting polling, awaiting, and
//!   conversion into a `futures::Stream`.

mod observable;

pub use observable::{Observable, Subscription};
