//! Settings page in the on-chip flash
//!
//! The last flash page is kept out of the firmware image by `memory.x`.
//! All access goes through the softdevice, which schedules flash
//! operations around radio activity.

use embedded_storage_async::nor_flash::{NorFlash, ReadNorFlash};
use nrf_softdevice::{Flash, FlashError, Softdevice};

use activehour::settings::{MemoryStore, PAGE_IMAGE_LEN};

/// Start of the last 4 KiB page of the nRF52832's 512 KiB flash
const SETTINGS_PAGE: u32 = 0x7F000;

/// Flash writes need word aligned buffers
#[repr(align(4))]
struct PageImage([u8; PAGE_IMAGE_LEN]);

pub struct SettingsFlash {
    flash: Flash,
}

impl SettingsFlash {
    /// Take the flash from the softdevice, its task must already run
    pub fn take(sd: &Softdevice) -> Self {
        Self {
            flash: Flash::take(sd),
        }
    }

    /// Read the stored settings, an unreadable page gives an empty store
    pub async fn load(&mut self) -> MemoryStore {
        let mut image = PageImage([0; PAGE_IMAGE_LEN]);
        match self.flash.read(SETTINGS_PAGE, &mut image.0).await {
            Ok(()) => MemoryStore::from_page(&image.0),
            Err(err) => {
                defmt::error!("Reading settings failed: {:?}", err);
                MemoryStore::new()
            }
        }
    }

    /// Rewrite the settings page with `store`
    pub async fn save(&mut self, store: &MemoryStore) -> Result<(), FlashError> {
        let mut image = PageImage([0; PAGE_IMAGE_LEN]);
        store.to_page(&mut image.0);

        self.flash
            .erase(SETTINGS_PAGE, SETTINGS_PAGE + Flash::ERASE_SIZE as u32)
            .await?;
        self.flash.write(SETTINGS_PAGE, &image.0).await?;
        defmt::info!("Settings saved");
        Ok(())
    }

    /// Save `store` if it changed since the last save
    pub async fn sync(&mut self, store: &mut MemoryStore) {
        if store.take_dirty() {
            if let Err(err) = self.save(store).await {
                defmt::error!("Saving settings failed: {:?}", err);
            }
        }
    }
}
