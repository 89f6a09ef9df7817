//! # BLIT Core
//!
//! An animated drawing surface built from two independently clocked loops
//! and the bounded collection they share.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                        DATA FLOW                               │
//! ├────────────────────────────────────────────────────────────────┤
//! │                                                                │
//! │  mutation timer (~24 Hz)           render timer (~60 Hz)       │
//! │        │                                  │                    │
//! │        ▼                                  ▼                    │
//! │  ElementFactory ──batch──▶ BoundedDrawableSet ──snapshot──▶    │
//! │                             (reset on overflow)   RenderLoop   │
//! │                                                      │         │
//! │                                                      ▼         │
//! │                                              host Surface      │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The core owns no thread and no window. Hosts call
//! [`BlitEngine::on_mutation_tick`] and [`BlitEngine::on_render_request`]
//! from their own timers.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod drawable_set;
pub mod engine;
pub mod error;
pub mod factory;
pub mod geometry;
pub mod mutation;
pub mod primitive;
pub mod render;
pub mod scene;
pub mod style;
pub mod surface;

pub use config::{BlitConfig, DrawableConfig, StyleConfig, SurfaceConfig, TimingConfig};
pub use drawable_set::{BoundedDrawableSet, InsertOutcome, Snapshot};
pub use engine::{BlitEngine, MutationDriver, RenderDriver};
pub use error::{BlitError, BlitResult};
pub use factory::{ElementFactory, ElementKind};
pub use geometry::{Point, Region};
pub use mutation::{MutationLoop, MutationStats, MutationTick};
pub use primitive::{Ball, Line, Primitive};
pub use render::{FrameCounter, FrameReport, RenderLoop, RenderStats};
pub use scene::{Scene, SharedScene};
pub use style::{Color, OverlayStyle, Shadow, SurfaceStyle, TextStyle};
pub use surface::{CommandRecorder, DrawCommand, Surface, SurfaceError, SurfaceResult};
