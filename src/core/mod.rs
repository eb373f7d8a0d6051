//! Core upload flow: metadata, analysis, state machine, and controller.

pub mod analysis;
pub mod controller;
pub mod flow;
pub mod generator;
pub mod metadata;
pub mod prompts;
pub mod share;

pub use analysis::{AnalysisOutcome, AnalysisResult, analyze, parse_analysis};
pub use controller::{DEFAULT_UPLOAD_DELAY, UploadController, UploadOptions, local_today};
pub use flow::{AnalysisSource, FlowError, FlowState, UploadStep};
pub use generator::{
    GeminiConfig, GeminiGenerator, GenerationError, GenerationRequest, TextGenerator,
};
pub use metadata::{
    ACCEPTED_EXTENSIONS, BundleFile, FileMetadata, file_type, format_file_size,
    format_upload_date, is_accepted_bundle,
};
pub use share::{DEFAULT_SHARE_HOST, qr_placeholder, share_link};
