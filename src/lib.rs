//! # Harigami
//!
//! A poster text-overlay layout and compositing library for Rust.
//!
//! ## Overview
//!
//! `harigami` places styled text blocks onto a background image using a
//! resolution-independent, percentage-based coordinate model. It performs
//! its own word-wrap and letter-spacing layout, supports drag
//! repositioning through anchor hit-testing, and exports the composited
//! result as a PNG. The entry point is [`OverlaySystem`], which
//! coordinates font loading, layout, rasterization, and interaction.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use harigami::{AnalysisContent, OverlaySystem};
//!
//! // 1. Create a system sized to the output surface
//! let system = OverlaySystem::new(1080, 1920);
//! system.load_system_fonts();
//!
//! // 2. Bind copy onto a style preset
//! system.apply_analysis(&AnalysisContent {
//!     title: "SUMMER FEST".to_string(),
//!     subtitle: Some("Three days of music".to_string()),
//!     body_text: vec!["July 12-14".to_string()],
//!     style: "bold".to_string(),
//! });
//!
//! // 3. Composite over a background and export
//! // system.composite(&background_bytes, false)?;
//! // let png = system.export_png()?;
//! ```
//!
//! ## Features
//!
//! *   **Normalized placement**: element positions and sizes are
//!     percentages of the surface, so one composition renders identically
//!     at any resolution.
//! *   **Manual layout**: greedy word-wrap, hard line breaks, and an
//!     approximated letter-spacing mode that bypasses wrapping.
//! *   **Interactive editing**: anchor hit-testing and drag repositioning
//!     with a change callback for the owner.
//! *   **Robust compositing**: cover-fitted backgrounds, implicit z-order
//!     by list position, atomic frames, PNG export.

pub mod binder;
pub mod compositor;
pub mod error;
pub mod font_storage;
pub mod geometry;
pub mod glyph_key;
pub mod interact;
pub mod overlay_system;
pub mod preset;
pub mod renderer;
pub mod text;

// common re-exports
pub use binder::{AnalysisContent, bind_content};
pub use compositor::{CompositeOptions, Compositor};
pub use error::{CompositeError, ExportError};
pub use font_storage::FontStorage;
pub use interact::{DragTolerance, InteractionController};
pub use overlay_system::OverlaySystem;
pub use preset::{PresetSet, get_preset};
pub use text::{Color, TextAlign, TextElement};

// re-export dependencies
pub use fontdb;
pub use fontdue;
pub use image;
pub use parking_lot;
