//! Consumers of mixer output: the live device driver, the level meter and
//! the offline renderer.

pub mod output;
pub mod output_meter;
pub mod render;

pub use output::OutputDriver;
pub use output_meter::OutputMeter;
pub use render::{render_frames, render_to_wav, RenderError, RenderPlan, RenderSummary};
