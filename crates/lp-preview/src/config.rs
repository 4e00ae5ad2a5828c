use lp_core::LivepatchError;
use lp_core::LpResult;
use lp_ipc::DEFAULT_MAX_MESSAGE_BYTES;
use lp_ipc::validate_max_message_bytes;
use std::env;
use std::path::Path;
use std::path::PathBuf;

pub const DEFAULT_EXPORT_FILENAME: &str = "index.html";
pub const ENV_EXPORT_DIR: &str = "LIVEPATCH_EXPORT_DIR";
pub const ENV_EDITING: &str = "LIVEPATCH_EDITING";

/// Host-side preview settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewConfig {
    /// Inject the instrumentation and show the editor panel.
    pub editing_enabled: bool,
    pub max_message_bytes: usize,
    pub export_dir: PathBuf,
    pub export_filename: String,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            editing_enabled: true,
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
            export_dir: PathBuf::from("."),
            export_filename: DEFAULT_EXPORT_FILENAME.to_owned(),
        }
    }
}

impl PreviewConfig {
    pub fn from_env() -> LpResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from defaults overridden by `lookup(ENV_*)`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> LpResult<Self> {
        let mut config = Self::default();
        if let Some(dir) = lookup(ENV_EXPORT_DIR).filter(|dir| !dir.trim().is_empty()) {
            config.export_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup(ENV_EDITING) {
            config.editing_enabled = parse_flag(&raw).ok_or_else(|| {
                LivepatchError::new(
                    "config.editing_flag_invalid",
                    format!("{ENV_EDITING} must be one of 1/0/true/false/on/off/yes/no, got `{raw}`"),
                )
            })?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> LpResult<()> {
        validate_max_message_bytes(self.max_message_bytes)?;

        let name = self.export_filename.as_str();
        let bare = Path::new(name).file_name().and_then(|file| file.to_str()) == Some(name);
        if name.trim().is_empty() || !bare || name.contains(['/', '\\']) {
            return Err(LivepatchError::new(
                "config.export_filename_invalid",
                format!("export filename must be a bare file name, got `{name}`"),
            ));
        }

        Ok(())
    }

    pub fn export_path(&self) -> PathBuf {
        self.export_dir.join(&self.export_filename)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
