//! Reference rendering surface: SVG drawing and a self-contained HTML page.
//!
//! Consumes a computed `DependencyGraph` and never changes it.

pub mod html;
pub mod svg;

pub use html::render_html;
pub use svg::{RenderOptions, render_svg};
