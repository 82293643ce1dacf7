//! Main application

use eframe::egui;
use fc_core::config::Config;
use fc_engine::CartridgeInfo;
use fc_session::{PumpState, Session};
use fc_video::{FRAME_HEIGHT, FRAME_WIDTH, FrameConsumer};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::info;

use crate::keymap::KeyMap;

/// How often the emulation FPS readout is refreshed
const FPS_SAMPLE_INTERVAL: Duration = Duration::from_millis(500);

/// Main application state
pub struct FerricomApp {
    /// Configuration
    config: Config,
    /// Session handle shared with the frame pump
    session: Session,
    /// Consumer half of the frame exchange
    consumer: FrameConsumer,
    /// Resolved key bindings
    keymap: KeyMap,
    /// Texture holding the presented frame
    texture: Option<egui::TextureHandle>,
    /// Sequence number of the frame currently in the texture
    displayed_sequence: u64,
    /// Cartridge images found in the configured ROM directory
    roms: Vec<PathBuf>,
    /// Path of the loaded cartridge
    loaded_rom: Option<PathBuf>,
    /// Metadata from the last successful load
    cartridge_info: Option<CartridgeInfo>,
    /// Show about window
    show_about: bool,
    /// Error message to display
    error_message: Option<String>,
    /// Frame counter sample backing the FPS readout
    fps_sample: (Instant, u64),
    /// Emulation FPS over the last sample window
    emulation_fps: f64,
}

impl FerricomApp {
    /// Create a new application
    ///
    /// A startup error (a failed command-line preload) opens the error
    /// dialog on the first frame, the same as an in-app load failure.
    pub fn new(
        config: Config,
        session: Session,
        consumer: FrameConsumer,
        loaded_rom: Option<PathBuf>,
        startup_error: Option<String>,
    ) -> Self {
        let keymap = KeyMap::from_config(&config.input.keyboard_mapping);
        let roms = scan_roms(&config.paths.roms);
        info!(
            count = roms.len(),
            dir = %config.paths.roms.display(),
            "scanned ROM directory"
        );

        Self {
            config,
            session,
            consumer,
            keymap,
            texture: None,
            displayed_sequence: 0,
            roms,
            loaded_rom,
            cartridge_info: None,
            show_about: false,
            error_message: startup_error,
            fps_sample: (Instant::now(), 0),
            emulation_fps: 0.0,
        }
    }

    /// Feed the keyboard state into the shared pad and session flags
    ///
    /// Losing window focus releases everything, so keys cannot stick
    /// while the user is elsewhere.
    fn poll_input(&mut self, ctx: &egui::Context) {
        let (save_requested, restore_requested) = ctx.input(|i| {
            if !i.focused {
                self.session.pad().clear();
                self.session.set_rewind(false);
                self.session.set_turbo(false);
                return (false, false);
            }

            for (key, button) in self.keymap.buttons {
                self.session.set_button(button, i.key_down(key));
            }
            self.session.set_rewind(i.key_down(self.keymap.rewind));
            self.session.set_turbo(i.key_down(self.keymap.turbo));

            (
                i.key_pressed(self.keymap.save_state),
                i.key_pressed(self.keymap.load_state),
            )
        });

        if save_requested {
            self.request_persistence(true);
        }
        if restore_requested {
            self.request_persistence(false);
        }
    }

    /// Upload the newest published frame into the texture
    fn refresh_frame(&mut self, ctx: &egui::Context) {
        if let Some(frame) = self.consumer.latest() {
            if frame.sequence() != self.displayed_sequence {
                let image = egui::ColorImage::from_rgba_unmultiplied(
                    [FRAME_WIDTH, FRAME_HEIGHT],
                    frame.pixels(),
                );
                match &mut self.texture {
                    Some(texture) => texture.set(image, egui::TextureOptions::NEAREST),
                    None => {
                        self.texture =
                            Some(ctx.load_texture("frame", image, egui::TextureOptions::NEAREST));
                    }
                }
                self.displayed_sequence = frame.sequence();
            }
        }
    }

    fn request_persistence(&mut self, save: bool) {
        if !self.session.cartridge_loaded() {
            return;
        }
        if let Err(e) = self.session.request_persistence(save) {
            let action = if save { "save" } else { "restore" };
            self.error_message = Some(format!("Failed to {} state: {}", action, e));
        }
    }

    /// Read a cartridge image from disk and load it into the session
    fn load_rom(&mut self, path: PathBuf) {
        match std::fs::read(&path) {
            Ok(image) => match self.session.load_cartridge(&image) {
                Ok(info) => {
                    self.cartridge_info = Some(info);
                    self.loaded_rom = Some(path);
                }
                Err(e) => {
                    self.error_message =
                        Some(format!("Failed to load {}: {}", path.display(), e));
                }
            },
            Err(e) => {
                self.error_message = Some(format!("Failed to read {}: {}", path.display(), e));
            }
        }
    }

    /// Show the frame texture at the largest integer scale that fits
    fn show_frame_view(&mut self, ui: &mut egui::Ui) {
        let Some(texture) = &self.texture else {
            let (rect, _response) = ui.allocate_exact_size(ui.available_size(), egui::Sense::hover());
            ui.painter().rect_filled(rect, 4.0, egui::Color32::from_gray(20));

            let text = match self.session.pump_state() {
                PumpState::Idle => "No cartridge loaded\nOpen a ROM from the File menu",
                PumpState::Active => "Waiting for the first frame...",
                PumpState::Stopped => "Emulation stopped",
            };
            ui.painter().text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                text,
                egui::FontId::proportional(18.0),
                ui.visuals().text_color(),
            );
            return;
        };

        let available = ui.available_size();
        let scale = (available.x / FRAME_WIDTH as f32)
            .min(available.y / FRAME_HEIGHT as f32)
            .floor()
            .max(1.0);
        let size = egui::vec2(FRAME_WIDTH as f32 * scale, FRAME_HEIGHT as f32 * scale);

        ui.centered_and_justified(|ui| {
            ui.add(egui::Image::new(egui::load::SizedTexture::new(
                texture.id(),
                size,
            )));
        });
    }
}

impl eframe::App for FerricomApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_input(ctx);
        self.refresh_frame(ctx);

        // Surface a pump-fatal error the moment it lands
        if let Some(error) = self.session.take_error() {
            self.error_message = Some(format!("Emulation stopped: {}", error));
        }

        // Update the emulation FPS readout
        let now = Instant::now();
        let elapsed = now.duration_since(self.fps_sample.0);
        if elapsed >= FPS_SAMPLE_INTERVAL {
            let frames = self.session.frames_advanced();
            self.emulation_fps =
                (frames - self.fps_sample.1) as f64 / elapsed.as_secs_f64();
            self.fps_sample = (now, frames);
        }

        let pump_state = self.session.pump_state();

        // Menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    ui.menu_button("Open ROM", |ui| {
                        if self.roms.is_empty() {
                            ui.label("No .nes files found");
                        }
                        let roms = self.roms.clone();
                        for path in roms {
                            let name = path
                                .file_name()
                                .unwrap_or_default()
                                .to_string_lossy()
                                .to_string();
                            if ui.button(name).clicked() {
                                self.load_rom(path);
                                ui.close_menu();
                            }
                        }
                    });
                    if ui.button("Rescan ROM Directory").clicked() {
                        self.roms = scan_roms(&self.config.paths.roms);
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("State", |ui| {
                    let loaded = self.session.cartridge_loaded();
                    if ui
                        .add_enabled(loaded, egui::Button::new("Save State"))
                        .clicked()
                    {
                        self.request_persistence(true);
                        ui.close_menu();
                    }
                    if ui
                        .add_enabled(loaded, egui::Button::new("Load State"))
                        .clicked()
                    {
                        self.request_persistence(false);
                        ui.close_menu();
                    }
                });

                ui.menu_button("Help", |ui| {
                    if ui.button("About").clicked() {
                        self.show_about = true;
                        ui.close_menu();
                    }
                });
            });
        });

        // Status bar
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let state_text = match pump_state {
                    PumpState::Idle => "⏳ Idle",
                    PumpState::Active => "▶ Running",
                    PumpState::Stopped => "⏹ Stopped",
                };
                ui.label(state_text);

                ui.separator();
                if pump_state == PumpState::Active {
                    ui.label(format!("FPS: {:.1}", self.emulation_fps));
                } else {
                    ui.label("FPS: --");
                }

                if self.session.rewind_engaged() {
                    ui.separator();
                    ui.colored_label(egui::Color32::YELLOW, "⏪ Rewind");
                }
                if self.session.turbo_engaged() {
                    ui.separator();
                    ui.colored_label(egui::Color32::LIGHT_BLUE, "⏩ Turbo");
                }

                if let Some(ref path) = self.loaded_rom {
                    ui.separator();
                    ui.label(format!(
                        "Loaded: {}",
                        path.file_name().unwrap_or_default().to_string_lossy()
                    ));
                }
                if let Some(ref info) = self.cartridge_info {
                    ui.separator();
                    ui.label(format!(
                        "Mapper {} | PRG {}K | CHR {}K",
                        info.mapper,
                        info.prg_bytes / 1024,
                        info.chr_bytes / 1024
                    ));
                }
            });
        });

        // Main content
        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_frame_view(ui);
        });

        // About window
        if self.show_about {
            egui::Window::new("About")
                .open(&mut self.show_about)
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.heading("ferricom");
                        ui.label("NES frame pump and session controller");
                        ui.label(format!("Version {}", env!("CARGO_PKG_VERSION")));
                        ui.add_space(10.0);
                        ui.separator();
                        ui.add_space(10.0);
                        ui.label("Licensed under GPL-3.0");
                        ui.add_space(5.0);
                        ui.hyperlink_to(
                            "GitHub Repository",
                            "https://github.com/ferricom/ferricom",
                        );
                    });
                });
        }

        // Error dialog
        let mut clear_error = false;
        if let Some(ref error) = self.error_message {
            let mut show_error = true;
            egui::Window::new("Error")
                .open(&mut show_error)
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.colored_label(egui::Color32::RED, "⚠ Error");
                    ui.separator();
                    ui.label(error.as_str());
                    ui.separator();
                    if ui.button("OK").clicked() {
                        clear_error = true;
                    }
                });
            if !show_error {
                clear_error = true;
            }
        }
        if clear_error {
            self.error_message = None;
        }

        // Keep presenting while the pump is ticking
        if pump_state == PumpState::Active {
            ctx.request_repaint();
        }
    }

    fn save(&mut self, _storage: &mut dyn eframe::Storage) {
        // Save config on app exit
        let _ = self.config.save();
    }
}

/// List cartridge images under a directory, sorted by file name
pub fn scan_roms(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut roms: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("nes"))
        })
        .collect();
    roms.sort();
    roms
}

/// Run the application
pub fn run(
    config: Config,
    session: Session,
    consumer: FrameConsumer,
    loaded_rom: Option<PathBuf>,
    startup_error: Option<String>,
) -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 820.0])
            .with_min_inner_size([320.0, 300.0]),
        ..Default::default()
    };

    eframe::run_native(
        "ferricom",
        options,
        Box::new(move |_cc| {
            Ok(Box::new(FerricomApp::new(
                config,
                session,
                consumer,
                loaded_rom,
                startup_error,
            )))
        }),
    )
}
