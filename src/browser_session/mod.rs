//! Chromium-backed page sessions
//!
//! Everything that talks CDP lives here: tab setup, request filtering,
//! proxy authentication and browser shutdown.

pub mod cleanup;
pub mod proxy;
pub mod resource_filter;
pub mod session;

pub use cleanup::{CleanupResult, shutdown_browser};
pub use proxy::ProxyCredentials;
pub use resource_filter::{ResourceClass, ResourcePredicate, allow_all, should_allow};
pub use session::ChromiumSession;
