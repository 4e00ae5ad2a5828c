use crate::canvas;
use eframe::egui;
use lp_inspector::element_outline;
use lp_ipc::SelectedElementDescriptor;
use lp_ipc::StyleProperty;
use lp_preview::Device;
use lp_preview::EditorPanel;
use lp_preview::Project;
use lp_preview::ProjectPreview;
use lp_preview::Role;
use lp_preview::TimelineEntry;
use lp_preview::download_code;
use std::collections::BTreeMap;
use tracing::debug;
use tracing::warn;

const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(200, 65, 65);
const CURRENT_VERSION_COLOR: egui::Color32 = egui::Color32::from_rgb(99, 102, 241);

/// Text buffers bound to the editor panel's inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct EditorFields {
    text: String,
    class_name: String,
    styles: BTreeMap<&'static str, String>,
}

impl EditorFields {
    fn load(editor: &EditorPanel) -> Self {
        Self {
            text: editor.text().to_owned(),
            class_name: editor.class_name().to_owned(),
            styles: StyleProperty::ALL
                .into_iter()
                .map(|property| (property.css_name(), editor.style(property).to_owned()))
                .collect(),
        }
    }
}

pub(crate) struct StudioApp {
    project: Project,
    preview: ProjectPreview,
    fields: EditorFields,
    seen_selection: Option<SelectedElementDescriptor>,
    show_outline: bool,
    status_line: String,
    last_error: Option<String>,
}

impl StudioApp {
    pub(crate) fn new(project: Project, preview: ProjectPreview) -> Self {
        let mut app = Self {
            project,
            preview,
            fields: EditorFields::default(),
            seen_selection: None,
            show_outline: true,
            status_line: "Ready".to_owned(),
            last_error: None,
        };
        let code = app.project.current_code.clone().unwrap_or_default();
        app.mount(&code);
        app
    }

    fn mount(&mut self, code: &str) {
        match self.preview.mount(code) {
            Ok(()) => {
                self.status_line = if self.preview.is_mounted() {
                    format!("Previewing {}", self.project.name)
                } else {
                    "Nothing to preview yet".to_owned()
                };
                self.last_error = None;
            }
            Err(error) => self.last_error = Some(error.to_string()),
        }
        self.sync_fields();
    }

    /// Reloads the input buffers when the host-side selection changed.
    fn sync_fields(&mut self) {
        let selected = self.preview.selected().cloned();
        if selected != self.seen_selection {
            self.fields = EditorFields::load(self.preview.editor());
            self.seen_selection = selected;
        }
    }

    fn click(&mut self, node: lp_dom::NodeId) {
        if !self.preview.dispatch_click(node).is_handled() {
            debug!(node, "click was not handled by the preview");
        }
    }

    fn export(&mut self) {
        let Some(artifact) = download_code(&self.preview, &self.project, self.project.is_generating())
        else {
            self.status_line = "Nothing to export".to_owned();
            return;
        };

        match artifact.write_to(&self.preview.config().export_dir) {
            Ok(path) => {
                self.status_line = format!("Exported {}", path.display());
                self.last_error = None;
            }
            Err(error) => {
                warn!(code = error.code, "export failed: {}", error.message);
                self.last_error = Some(error.to_string());
            }
        }
    }

    fn render_timeline(&self, ui: &mut egui::Ui) {
        ui.heading(&self.project.name);
        ui.separator();

        egui::ScrollArea::vertical()
            .id_salt("timeline_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for entry in self.project.timeline() {
                    match entry {
                        TimelineEntry::Message(message) => {
                            let who = match message.role {
                                Role::User => "You",
                                Role::Assistant => "Assistant",
                            };
                            ui.label(egui::RichText::new(who).strong());
                            ui.label(&message.content);
                        }
                        TimelineEntry::Version {
                            version,
                            is_current,
                        } => {
                            let stamp = version.timestamp.format("%H:%M");
                            if is_current {
                                ui.colored_label(
                                    CURRENT_VERSION_COLOR,
                                    format!("Version {} at {stamp} (current)", version.id),
                                );
                            } else {
                                ui.weak(format!("Version {} at {stamp}", version.id));
                            }
                        }
                    }
                    ui.add_space(6.0);
                }
            });
    }

    fn render_outline(&self, ui: &mut egui::Ui) -> Option<lp_dom::NodeId> {
        let doc = self.preview.document()?;
        let mut picked = None;
        egui::ScrollArea::vertical()
            .id_salt("outline_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for entry in element_outline(doc) {
                    ui.horizontal(|ui| {
                        ui.add_space(entry.depth as f32 * 12.0);
                        let label = egui::RichText::new(&entry.label).monospace().size(12.0);
                        if ui.selectable_label(entry.selected, label).clicked() {
                            picked = Some(entry.node);
                        }
                    });
                }
            });
        picked
    }

    fn render_editor(&mut self, ui: &mut egui::Ui) {
        let tag = self
            .preview
            .selected()
            .map(|selected| selected.tag_name.clone())
            .unwrap_or_default();
        ui.horizontal(|ui| {
            ui.heading(format!("<{tag}>"));
            if ui.button("Close").clicked() {
                self.preview.close_editor();
            }
        });
        ui.separator();

        ui.label("Text");
        if ui
            .add(egui::TextEdit::multiline(&mut self.fields.text).desired_rows(3))
            .changed()
        {
            self.preview.edit_text(&self.fields.text);
        }

        ui.label("Class");
        if ui
            .add(egui::TextEdit::singleline(&mut self.fields.class_name))
            .changed()
        {
            self.preview.edit_class_name(&self.fields.class_name);
        }

        ui.separator();
        for property in StyleProperty::ALL {
            let Some(value) = self.fields.styles.get_mut(property.css_name()) else {
                continue;
            };
            ui.label(property.label());
            if ui
                .add(egui::TextEdit::singleline(value).hint_text(property.css_name()))
                .changed()
            {
                self.preview.edit_style(property, value);
            }
        }
    }

    fn render_canvas(&self, ui: &mut egui::Ui) -> Option<lp_dom::NodeId> {
        let doc = self.preview.document()?;
        let width = self
            .preview
            .device()
            .width_px()
            .map_or(ui.available_width(), |width| (width as f32).min(ui.available_width()));

        let mut clicked = None;
        ui.vertical_centered(|ui| {
            ui.allocate_ui(egui::vec2(width, ui.available_height()), |ui| {
                ui.set_max_width(width);
                egui::ScrollArea::vertical()
                    .id_salt("canvas_scroll")
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        clicked = canvas::render_document(ui, doc);
                    });
            });
        });
        clicked
    }
}

impl eframe::App for StudioApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.preview.pump();
        self.sync_fields();
        if ctx.input(|input| input.key_pressed(egui::Key::Escape)) && self.preview.editor_visible() {
            self.preview.close_editor();
        }

        egui::TopBottomPanel::top("toolbar_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Device");
                let mut device = self.preview.device();
                for candidate in Device::ALL {
                    ui.selectable_value(&mut device, candidate, candidate.label());
                }
                if device != self.preview.device() {
                    self.preview.set_device(device);
                }

                ui.separator();
                ui.checkbox(&mut self.show_outline, "Outline");

                ui.separator();
                let can_export = self.preview.is_mounted() || self.project.current_code.is_some();
                if ui
                    .add_enabled(can_export, egui::Button::new("Export HTML"))
                    .clicked()
                {
                    self.export();
                }

                if self.project.is_generating() {
                    ui.separator();
                    ui.spinner();
                    ui.label("Generating");
                }
            });
        });

        egui::TopBottomPanel::bottom("status_panel").show(ctx, |ui| {
            ui.horizontal_wrapped(|ui| {
                ui.label(&self.status_line);
                if let Some(error) = &self.last_error {
                    ui.colored_label(ERROR_COLOR, format!("Error: {error}"));
                }
            });
        });

        egui::SidePanel::left("timeline_panel")
            .default_width(240.0)
            .show(ctx, |ui| self.render_timeline(ui));

        if self.preview.editor_visible() {
            egui::SidePanel::right("editor_panel")
                .default_width(280.0)
                .show(ctx, |ui| self.render_editor(ui));
        }

        let mut picked = None;
        if self.show_outline && self.preview.is_mounted() {
            egui::SidePanel::right("outline_panel")
                .default_width(220.0)
                .show(ctx, |ui| {
                    ui.heading("Elements");
                    ui.separator();
                    picked = self.render_outline(ui);
                });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.preview.is_mounted() {
                if let Some(node) = self.render_canvas(ui) {
                    picked = Some(node);
                }
            } else {
                ui.label("No preview loaded yet.");
            }
        });

        if let Some(node) = picked {
            self.click(node);
            ctx.request_repaint();
        }
    }
}
