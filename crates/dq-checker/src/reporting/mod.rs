//! Report rendering.
//!
//! A [`ReportRenderer`] turns a [`DataQualityReport`](crate::types::DataQualityReport)
//! into plain text, Markdown or pretty JSON, and can write the result to a
//! directory. Rendering options are passed in explicitly; nothing is global.
//!
//! # Example
//!
//! ```rust,ignore
//! use dq_checker::reporting::{RenderFormat, RenderOptions, ReportRenderer};
//!
//! let options = RenderOptions::builder()
//!     .format(RenderFormat::Markdown)
//!     .max_rows_listed(20)
//!     .build()?;
//! let renderer = ReportRenderer::new(options);
//!
//! // Print to stdout
//! println!("{}", renderer.render(&report)?);
//!
//! // Or write `output/users_quality_report.md`
//! renderer.write_to_file(&report, "output")?;
//! ```

mod render;

pub use render::{RenderFormat, RenderOptions, RenderOptionsBuilder, ReportRenderer};
