//! Rally App - fitness community app core
//!
//! Headless app layer over [`rally_nav`]: the closed set of [`Screen`]s, one
//! controller per screen, the use-case seams controllers depend on, and the
//! [`RallyApp`] composition root that wires them together with persisted
//! navigation state.
//!
//! # Architecture
//!
//! ```text
//! host ──Services──▶ RallyApp ──▶ NavigationStack<Screen, AppScreenFactory>
//!                       │                 │
//!                  StateStore        AppController (per entry)
//!                                         │
//!                                  Observable<LoadState<T>> ──▶ UI
//! ```
//!
//! Rendering is out of scope: a UI layer subscribes to the stack's history
//! and to the visible controller's observables.

#![forbid(unsafe_code)]

/// Composition root
pub mod app;

/// TOML configuration with environment overrides
pub mod config;

/// Screen controllers
pub mod controllers;

/// Identifiers, read models and use-case traits
pub mod domain;

/// Screen → controller mapping
pub mod factory;

/// Tracing subscriber setup
pub mod logging;

/// Persisted navigation state
pub mod persistence;

/// Navigation configs
pub mod screens;

/// Shared view-state types
pub mod views;

pub use app::{AppStack, RallyApp};
pub use config::{AppConfig, InitialScreen, LoggingConfig};
pub use controllers::AppController;
pub use domain::Services;
pub use factory::AppScreenFactory;
pub use persistence::StateStore;
pub use screens::Screen;
pub use views::{ActionState, LoadState};
