//! Report assembly.
//!
//! [`EdaReport`] runs every analysis of a session and collects each
//! section's result or error. It is the structured boundary handed to a
//! renderer.
//!
//! # Example
//!
//! ```rust,ignore
//! use catalog_eda::{EdaConfig, EdaSession, reporting::EdaReport};
//!
//! let config = EdaConfig::builder().data_path("data/catalog.csv").build()?;
//! let session = EdaSession::open(config)?;
//! let report = EdaReport::build_with_metric(&session, "IMDb Score");
//!
//! // Print as JSON
//! println!("{}", serde_json::to_string_pretty(&report)?);
//!
//! // Or write to file
//! report.write_to_file("output/catalog_report.json")?;
//! ```

mod generator;

pub use generator::{DataPreview, EdaReport};
