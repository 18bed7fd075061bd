//! Gateway Core - Project initialization and runtime staging
//!
//! This library creates gateway projects and keeps the bundled platform and
//! runtime distributions extracted next to the tool. Extraction is expensive,
//! so it only runs again when the gateway libraries that are overlaid onto
//! both distributions have changed.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Core Operations** - Library fingerprinting, archive staging, layout and config files
//! - **Layer 2: Workflow Orchestration** - `ProductConfig` trait and `Initializer`
//! - **Layer 3: CLI/TUI Interface** - Optional cliclack-based output (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based terminal output module
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use gateway_core::{GatewayLayout, Initializer, ProjectDescriptor};
//!
//! let layout = GatewayLayout::new("/opt/gateway");
//! let initializer = Initializer::new(&MyConfig, layout);
//! let report = initializer.initialize(&ProjectDescriptor::new("petstore", &workspace))?;
//! println!("{}", report.success_message());
//! ```

pub mod config;
pub mod error;
pub mod hashing;
pub mod product;
pub mod project;
pub mod staging;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use config::{DeploymentConfig, GatewayLayout};
pub use error::{ConfigWriteError, FingerprintError, InitError, StagingError};
pub use hashing::HashTracker;
pub use product::ProductConfig;
pub use project::{InitPhase, InitReport, Initializer, ProjectDescriptor};
pub use staging::{ArchiveStager, ExtractionTarget, StageOutcome, TargetKind};

#[cfg(feature = "tui")]
pub use tui::run;
