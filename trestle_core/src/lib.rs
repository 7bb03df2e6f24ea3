//! # trestle_core - Structural Connectivity & Geometric Integrity Engine
//!
//! `trestle_core` keeps the connection graph of a structural model consistent
//! while members are moved, detects geometric clashes between members of
//! structural and piping models, and generates seismic design spectra.
//! Inputs and outputs are plain serde types so callers can drive the engine
//! with JSON.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: every call takes the full snapshot it needs and returns the
//!   full result; nothing is cached between calls
//! - **Warnings are values**: range violations, dependency and crossing
//!   conflicts are reported per element and never abort a batch
//! - **Rich Errors**: structured [`EngineError`]s for the genuinely fatal cases
//!
//! ## Quick Start
//!
//! ```rust
//! use trestle_core::{relocate, ConnectivityMap, EngineConfig, ElevationRelocationRequest, Warning};
//! use trestle_core::element::{Element, ElementKind};
//! use trestle_core::geometry::Point3;
//! use trestle_core::warnings::Bound;
//!
//! let (map, _) = ConnectivityMap::build(vec![
//!     Element::new("C1", ElementKind::Column, Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 3.0, 0.0))
//!         .with_end_connected(["B1"]),
//!     Element::new("C2", ElementKind::Column, Point3::new(6.0, 0.0, 0.0), Point3::new(6.0, 5.0, 0.0)),
//!     Element::new("B1", ElementKind::Beam, Point3::new(0.0, 3.0, 0.0), Point3::new(6.0, 3.0, 0.0))
//!         .with_start_connected(["C1"])
//!         .with_end_connected(["C2"]),
//! ]);
//!
//! let outcome = relocate(map, &ElevationRelocationRequest::new(["B1"], 4.0), &EngineConfig::default()).unwrap();
//! assert!(outcome.relocated.is_empty());
//! assert!(matches!(outcome.warnings[0], Warning::RangeViolation { bound: Bound::Max, .. }));
//! ```
//!
//! ## Modules
//!
//! - [`element`] - Element model and neighbor sets
//! - [`connectivity`] - Connectivity map and connection rewiring
//! - [`relocation`] - Elevation relocation with column-derived bounds
//! - [`clash`] - Clash detection and the background clash worker
//! - [`seismic`] - IS / US response spectra and the spectrum point table
//! - [`geometry`] - Points, segment distances, bounding boxes
//! - [`snapshot`] - Model snapshots and clash requests
//! - [`config`] - Engine configuration
//! - [`export`] - CSV export of clash records and spectral points
//! - [`file_io`] - JSON load/save with atomic writes
//! - [`warnings`] / [`errors`] - Non-fatal warnings and fatal errors

pub mod clash;
pub mod config;
pub mod connectivity;
pub mod element;
pub mod errors;
pub mod export;
pub mod file_io;
pub mod geometry;
pub mod relocation;
pub mod seismic;
pub mod snapshot;
pub mod warnings;

// Re-export commonly used types at crate root for convenience
pub use clash::{detect_clashes, ClashEvent, ClashRecord, ClashReport, ClashWorker};
pub use config::EngineConfig;
pub use connectivity::ConnectivityMap;
pub use element::{Element, ElementKind};
pub use errors::{EngineError, EngineResult};
pub use relocation::{relocate, ElevationRelocationRequest, RelocationOutcome};
pub use seismic::{generate_spectrum, SeismicSpectrum, SpectralPoint, SpectrumParams};
pub use snapshot::{ClashRequest, ModelSnapshot, Snapshot};
pub use warnings::Warning;
