//! AGS GP Client
//!
//! An async client for the ArcGIS Server geoprocessing REST API.
//!
//! The central type is [`GpJob`]: a handle for one geoprocessing task
//! execution that submits the task, polls the job endpoint, and exposes
//! the latest status, messages, and results. Synchronous tasks go through
//! [`GpJob::execute`] instead of the submit/poll cycle.
//!
//! # Example
//!
//! ```no_run
//! use ags_client::{GpJob, JobStatus};
//!
//! #[tokio::main]
//! async fn main() -> ags_client::Result<()> {
//!     let mut job = GpJob::new(
//!         "https://gis.example.com/arcgis/rest/services/Buffer/GPServer/Buffer",
//!     )
//!     .parameter("distance", "100");
//!
//!     match job.submit_and_wait().await? {
//!         JobStatus::Succeeded => {
//!             if let Some(out) = job.result("output") {
//!                 println!("output: {}", out.value);
//!             }
//!         }
//!         status => eprintln!("job did not succeed: {status}"),
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
mod job;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use job::{DEFAULT_POLL_INTERVAL, GpJob};

pub use ags_core::domain::job::{JobMessage, JobStatus, MessageKind, TaskResult};
