//! Watchface settings
//!
//! A handful of persisted flags chosen in the companion app: which labels
//! to show, the color scheme and the clock style.

mod message;
mod store;

pub use message::{apply_message, ConfigEntry, ConfigMessage, Entries};
pub use store::{MemoryStore, SettingsStore, PAGE_IMAGE_LEN};

use crate::error::Error;

/// Marker key written together with the defaults
pub const DEFAULTS_SENTINEL: u32 = 228_483;

/// Persisted setting keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum SettingKey {
    Date = 0,
    Steps = 1,
    ColorBw = 2,
    ColorOrange = 3,
    ColorGreen = 4,
    ColorBlue = 5,
    Clock24h = 6,
}

impl SettingKey {
    pub const ALL: [SettingKey; 7] = [
        SettingKey::Date,
        SettingKey::Steps,
        SettingKey::ColorBw,
        SettingKey::ColorOrange,
        SettingKey::ColorGreen,
        SettingKey::ColorBlue,
        SettingKey::Clock24h,
    ];

    pub fn from_id(id: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.id() == id)
    }

    pub fn id(self) -> u32 {
        self as u32
    }

    /// Value written on first start
    pub fn default_value(self) -> bool {
        matches!(self, SettingKey::ColorBw | SettingKey::Clock24h)
    }
}

/// Color scheme of the face
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ColorScheme {
    BlackWhite,
    Orange,
    Green,
    Blue,
}

/// Current settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub show_date: bool,
    pub show_steps: bool,
    pub color_bw: bool,
    pub color_orange: bool,
    pub color_green: bool,
    pub color_blue: bool,
    pub clock_24h: bool,
}

impl Default for Settings {
    fn default() -> Self {
        let mut settings = Self::none();
        for key in SettingKey::ALL {
            settings.set(key, key.default_value());
        }
        settings
    }
}

impl Settings {
    const fn none() -> Self {
        Self {
            show_date: false,
            show_steps: false,
            color_bw: false,
            color_orange: false,
            color_green: false,
            color_blue: false,
            clock_24h: false,
        }
    }

    /// Read settings from `store`, writing the defaults on first use
    pub fn load<S>(store: &mut S) -> Result<Self, Error>
    where
        S: SettingsStore + ?Sized,
    {
        if !store.exists(DEFAULTS_SENTINEL) {
            info!("Writing default settings");
            store.write_bool(DEFAULTS_SENTINEL, true)?;
            for key in SettingKey::ALL {
                store.write_bool(key.id(), key.default_value())?;
            }
        }

        let mut settings = Self::none();
        for key in SettingKey::ALL {
            settings.set(key, store.read_bool(key.id()));
        }
        debug!("DATE : {}", settings.show_date);
        debug!("STEPS: {}", settings.show_steps);
        Ok(settings)
    }

    pub fn get(&self, key: SettingKey) -> bool {
        match key {
            SettingKey::Date => self.show_date,
            SettingKey::Steps => self.show_steps,
            SettingKey::ColorBw => self.color_bw,
            SettingKey::ColorOrange => self.color_orange,
            SettingKey::ColorGreen => self.color_green,
            SettingKey::ColorBlue => self.color_blue,
            SettingKey::Clock24h => self.clock_24h,
        }
    }

    pub fn set(&mut self, key: SettingKey, value: bool) {
        let flag = match key {
            SettingKey::Date => &mut self.show_date,
            SettingKey::Steps => &mut self.show_steps,
            SettingKey::ColorBw => &mut self.color_bw,
            SettingKey::ColorOrange => &mut self.color_orange,
            SettingKey::ColorGreen => &mut self.color_green,
            SettingKey::ColorBlue => &mut self.color_blue,
            SettingKey::Clock24h => &mut self.clock_24h,
        };
        *flag = value;
    }

    /// Active color scheme, orange wins over green wins over blue
    pub fn color_scheme(&self) -> ColorScheme {
        if self.color_orange {
            ColorScheme::Orange
        } else if self.color_green {
            ColorScheme::Green
        } else if self.color_blue {
            ColorScheme::Blue
        } else {
            ColorScheme::BlackWhite
        }
    }

    /// One bit per setting, bit number is the key
    pub fn to_bits(&self) -> u8 {
        SettingKey::ALL
            .into_iter()
            .filter(|&key| self.get(key))
            .fold(0, |bits, key| bits | 1 << key as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_written_once() {
        let mut store = MemoryStore::new();
        let settings = Settings::load(&mut store).unwrap();

        assert_eq!(settings, Settings::default());
        assert!(store.exists(DEFAULTS_SENTINEL));
        assert!(!settings.show_date);
        assert!(!settings.show_steps);
        assert!(settings.color_bw);
        assert!(settings.clock_24h);

        // Later loads keep what the user chose
        store.write_bool(SettingKey::Date.id(), true).unwrap();
        let settings = Settings::load(&mut store).unwrap();
        assert!(settings.show_date);
    }

    #[test]
    fn test_choices_survive_restart() {
        let mut store = MemoryStore::new();
        Settings::load(&mut store).unwrap();
        store.write_bool(SettingKey::Steps.id(), true).unwrap();
        store.write_bool(SettingKey::Clock24h.id(), false).unwrap();
        assert!(store.take_dirty());

        let mut page = [0; PAGE_IMAGE_LEN];
        store.to_page(&mut page);

        let mut restarted = MemoryStore::from_page(&page);
        let settings = Settings::load(&mut restarted).unwrap();
        assert!(settings.show_steps);
        assert!(!settings.clock_24h);
        // Defaults are not written again
        assert!(!restarted.take_dirty());
    }

    #[test]
    fn test_color_scheme_priority() {
        let mut settings = Settings::default();
        assert_eq!(settings.color_scheme(), ColorScheme::BlackWhite);

        settings.color_blue = true;
        assert_eq!(settings.color_scheme(), ColorScheme::Blue);
        settings.color_green = true;
        assert_eq!(settings.color_scheme(), ColorScheme::Green);
        settings.color_orange = true;
        assert_eq!(settings.color_scheme(), ColorScheme::Orange);
    }

    #[test]
    fn test_key_ids() {
        for key in SettingKey::ALL {
            assert_eq!(SettingKey::from_id(key.id()), Some(key));
        }
        assert_eq!(SettingKey::from_id(7), None);
        assert_eq!(SettingKey::from_id(DEFAULTS_SENTINEL), None);
    }

    #[test]
    fn test_to_bits() {
        let mut settings = Settings::default();
        assert_eq!(settings.to_bits(), 0b100_0100);
        settings.set(SettingKey::Steps, true);
        assert_eq!(settings.to_bits(), 0b100_0110);
        assert!(settings.get(SettingKey::Steps));
    }
}
