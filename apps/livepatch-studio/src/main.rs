mod canvas;
mod charset;
mod sample;
mod studio;

use eframe::egui;
use lp_preview::PreviewConfig;
use lp_preview::Project;
use lp_preview::ProjectPreview;
use std::path::PathBuf;
use studio::StudioApp;
use tracing::error;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), eframe::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let (project, preview) = match startup() {
        Ok(loaded) => loaded,
        Err(message) => {
            error!("{message}");
            eprintln!("Livepatch startup error: {message}");
            return Ok(());
        }
    };

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Livepatch Studio")
            .with_inner_size([1320.0, 840.0])
            .with_min_inner_size([960.0, 640.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Livepatch Studio",
        native_options,
        Box::new(|_cc| Ok(Box::new(StudioApp::new(project, preview)))),
    )
}

fn startup() -> Result<(Project, ProjectPreview), String> {
    let config = PreviewConfig::from_env().map_err(|error| error.to_string())?;
    info!(
        editing = config.editing_enabled,
        export_dir = %config.export_dir.display(),
        "loaded preview config"
    );
    let preview = ProjectPreview::new(config).map_err(|error| error.to_string())?;

    let project = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => {
            let body = std::fs::read(&path)
                .map_err(|error| format!("cannot read {}: {error}", path.display()))?;
            info!(path = %path.display(), bytes = body.len(), "opened html file");
            sample::file_project(&path, charset::decode_html(&body))
        }
        None => sample::sample_project(),
    };
    Ok((project, preview))
}
