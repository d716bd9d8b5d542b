//! Native host for the Axion hybrid editor.
//!
//! The host owns one window, registers the application's native
//! capabilities into a plugin registry, and only then starts the bridge that
//! loads embedded content. The registry handed to the bridge is frozen, so
//! everything content can call during its own startup is already resolvable.

pub mod activity;
pub mod app;
pub mod bridge;
pub mod content;
pub mod headless;
pub mod logging;
pub mod model;
pub mod msg;
pub mod plugin;
pub mod window;
