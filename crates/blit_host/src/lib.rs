//! # BLIT Host
//!
//! Runs a [`blit_core::BlitEngine`] on real clocks.
//!
//! - [`timer`]: initial-delay-then-periodic ticks on crossbeam channels
//! - [`raster`]: RGBA8 software canvas implementing [`blit_core::Surface`]
//! - [`host`]: single-thread event-loop host and a two-timer threaded host
//!
//! ## Usage
//!
//! ```no_run
//! use std::time::Duration;
//! use blit_core::BlitConfig;
//! use blit_host::EventLoopHost;
//!
//! let host = EventLoopHost::spawn(&BlitConfig::default())?;
//! std::thread::sleep(Duration::from_secs(3));
//! let report = host.shutdown()?;
//! println!("{} frames", report.render.frames);
//! # Ok::<(), blit_host::HostError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod host;
pub mod raster;
pub mod timer;

pub use error::{HostError, HostResult};
pub use host::{EventLoopHost, HostCommand, HostReport, ThreadedHost};
pub use raster::{blend, to_pixel, Canvas, Pixel, PixelSurface};
pub use timer::{Cadence, RecurringTimer, TimerReport};
