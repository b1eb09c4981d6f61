// Library exports for testing and potential library use
//
// # Mutex Usage Policy
//
// Orchestrator state is shared between the router, the orchestrator and the
// confirmation expiry tasks. New code should follow these rules:
//
//   - `parking_lot::Mutex`: use for all sync state (confirmation records,
//                             extension state, surface registry). Locks are
//                             short and must never be held across `.await`:
//                             every gateway call is a suspension point.
//
//   - `tokio::sync::Mutex`: not needed today. Reach for it only if state
//                             must stay locked across a host call.
//
//   - `std::sync::Mutex`: avoid; prefer parking_lot.

/// Application version (root crate version, for use by sub-crates).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod activity_log;
pub mod app;
pub mod cli;
pub mod confirmation;
pub mod debug;
pub mod error;
pub mod gateway;
pub mod orchestrator;
pub mod protocol;
pub mod router;
pub mod simulated_host;
pub mod status;
pub mod surfaces;

pub use activity_log::{ActivityLog, LogAction, LogEntry};
pub use confirmation::ConfirmationStore;
pub use error::{HostError, RouterError};
pub use gateway::{NavDirection, RouteStack, TabGateway, TabId, TabInfo};
pub use orchestrator::{Command, NavigationOrchestrator, NavigationSettings, OrchestratorState, Outcome};
pub use protocol::{StatusResponse, SurfaceEvent, SurfaceRequest};
pub use router::MessageRouter;
pub use simulated_host::{HostEvent, SimulatedBrowser};
pub use status::{StatusBroadcaster, StatusSnapshot};
pub use surfaces::{SurfaceHub, SurfaceKind};
