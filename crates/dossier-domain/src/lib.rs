//! Dossier Domain Layer
//!
//! This crate contains the record model shared by all other layers: uploaded
//! application dossiers, transcript verification records, their status state
//! machine, and the file references attached to them.
//!
//! ## Key Concepts
//!
//! - **ApplicationRecord**: an uploaded set of application documents tracked
//!   through analysis
//! - **VerificationRecord**: an uploaded transcript set tracked through
//!   verification
//! - **RecordStatus**: the lifecycle state machine both record kinds share
//! - **StoredFile**: a reference to an uploaded file persisted on disk
//!
//! Records are plain data; all orchestration lives in the server crate and
//! all mutation outside the constructors goes through the record store.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod application;
pub mod file;
pub mod id;
pub mod status;
pub mod verification;

// Re-exports for convenience
pub use application::ApplicationRecord;
pub use file::StoredFile;
pub use id::RecordId;
pub use status::RecordStatus;
pub use verification::{UploadType, VerificationRecord};

/// File keys expected on an application upload, in upload-form order.
pub const APPLICATION_FILE_KEYS: [&str; 4] =
    ["transcript", "degree_certificate", "resume", "ielts_score"];

/// File key for a single bilingual transcript upload.
pub const TRANSCRIPT_SINGLE_KEY: &str = "transcript";

/// File keys for a separate-language transcript upload.
pub const TRANSCRIPT_SEPARATE_KEYS: [&str; 2] = ["transcript_zh", "transcript_en"];
