//! Host side of the live preview: injection, the editor panel, the preview
//! controller and export.

mod config;
mod editor;
mod export;
mod injector;
mod preview;
mod project;

pub use config::DEFAULT_EXPORT_FILENAME;
pub use config::ENV_EDITING;
pub use config::ENV_EXPORT_DIR;
pub use config::PreviewConfig;
pub use editor::EditorPanel;
pub use export::ExportArtifact;
pub use export::HTML_CONTENT_TYPE;
pub use export::download_code;
pub use injector::inject_preview;
pub use injector::is_instrumented;
pub use preview::Device;
pub use preview::ProjectPreview;
pub use project::Message;
pub use project::Project;
pub use project::Role;
pub use project::TimelineEntry;
pub use project::Version;
