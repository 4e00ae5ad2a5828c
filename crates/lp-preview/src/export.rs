use crate::Project;
use crate::ProjectPreview;
use lp_core::LivepatchError;
use lp_core::LpResult;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use tracing::info;

pub const HTML_CONTENT_TYPE: &str = "text/html";

/// A downloadable file produced from the preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub filename: String,
    pub content_type: &'static str,
    pub body: String,
}

impl ExportArtifact {
    pub fn html(filename: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            content_type: HTML_CONTENT_TYPE,
            body: body.into(),
        }
    }

    /// Writes the body to `dir/filename`, creating `dir` if needed.
    pub fn write_to(&self, dir: &Path) -> LpResult<PathBuf> {
        fs::create_dir_all(dir).map_err(|error| {
            LivepatchError::new(
                "preview.export_dir_unavailable",
                format!("cannot create export directory {}: {error}", dir.display()),
            )
        })?;

        let path = dir.join(&self.filename);
        fs::write(&path, self.body.as_bytes()).map_err(|error| {
            LivepatchError::new(
                "preview.export_write_failed",
                format!("cannot write {}: {error}", path.display()),
            )
        })?;
        info!(path = %path.display(), bytes = self.body.len(), "exported preview");
        Ok(path)
    }
}

/// Builds the download for the current project.
///
/// Nothing is produced while a generation is in flight. Otherwise the cleaned
/// live document wins over the project's stored code.
pub fn download_code(
    preview: &ProjectPreview,
    project: &Project,
    is_generating: bool,
) -> Option<ExportArtifact> {
    if is_generating {
        return None;
    }
    let body = preview
        .get_code()
        .or_else(|| project.current_code.clone())
        .filter(|code| !code.is_empty())?;
    Some(ExportArtifact::html(
        preview.config().export_filename.clone(),
        body,
    ))
}

#[cfg(test)]
mod tests {
    use super::ExportArtifact;
    use super::HTML_CONTENT_TYPE;
    use pretty_assertions::assert_eq;

    #[test]
    fn html_artifacts_use_the_html_content_type() {
        let artifact = ExportArtifact::html("index.html", "<html></html>");
        assert_eq!(artifact.content_type, HTML_CONTENT_TYPE);
        assert_eq!(artifact.filename, "index.html");
    }

    #[test]
    fn write_to_creates_missing_directories() {
        let dir = tempfile::tempdir();
        assert!(dir.is_ok());
        let dir = dir.unwrap_or_else(|_| unreachable!());
        let nested = dir.path().join("site").join("out");

        let written = ExportArtifact::html("index.html", "<p>hi</p>").write_to(&nested);
        assert!(written.is_ok());
        let path = written.unwrap_or_else(|_| unreachable!());
        assert_eq!(path, nested.join("index.html"));
        assert_eq!(std::fs::read_to_string(&path).ok().as_deref(), Some("<p>hi</p>"));
    }
}
