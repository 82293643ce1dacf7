//! Keyboard to controller mapping

use fc_core::config::KeyboardMapping;
use fc_input::Button;
use tracing::warn;

/// Resolved key bindings
pub struct KeyMap {
    /// Keyboard key per controller button
    pub buttons: [(egui::Key, Button); 8],
    pub rewind: egui::Key,
    pub turbo: egui::Key,
    pub save_state: egui::Key,
    pub load_state: egui::Key,
}

fn resolve(name: &str, default_name: &str) -> egui::Key {
    if let Some(key) = egui::Key::from_name(name) {
        return key;
    }
    warn!(name, default = default_name, "unknown key name in config, using default");
    egui::Key::from_name(default_name).unwrap_or(egui::Key::X)
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::from_config(&KeyboardMapping::default())
    }
}

impl KeyMap {
    /// Resolve configured key names into egui keys
    ///
    /// A name egui does not know falls back to the default binding for
    /// that action.
    pub fn from_config(mapping: &KeyboardMapping) -> KeyMap {
        let defaults = KeyboardMapping::default();

        KeyMap {
            buttons: [
                (resolve(&mapping.a, &defaults.a), Button::A),
                (resolve(&mapping.b, &defaults.b), Button::B),
                (resolve(&mapping.select, &defaults.select), Button::Select),
                (resolve(&mapping.start, &defaults.start), Button::Start),
                (resolve(&mapping.up, &defaults.up), Button::Up),
                (resolve(&mapping.down, &defaults.down), Button::Down),
                (resolve(&mapping.left, &defaults.left), Button::Left),
                (resolve(&mapping.right, &defaults.right), Button::Right),
            ],
            rewind: resolve(&mapping.rewind, &defaults.rewind),
            turbo: resolve(&mapping.turbo, &defaults.turbo),
            save_state: resolve(&mapping.save_state, &defaults.save_state),
            load_state: resolve(&mapping.load_state, &defaults.load_state),
        }
    }
}
