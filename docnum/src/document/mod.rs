//! Document materialization
//!
//! - [`Materializer`] - boundary trait used by the orchestrator
//! - [`DocxMaterializer`] - fills a bookmark in a `.docx` template

pub mod docx;
pub mod materializer;

pub use docx::{DEFAULT_ARTIFACT_PREFIX, DEFAULT_PLACEHOLDER, DocxMaterializer, fill_bookmark};
pub use materializer::{MaterializeError, MaterializeResult, Materializer, verify_artifact};
