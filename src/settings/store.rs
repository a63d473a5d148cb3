//! Persistent key/value storage for boolean settings

use heapless::FnvIndexMap;

use crate::error::Error;

/// Number of keys a [`MemoryStore`] can hold, must be a power of two
const STORE_CAPACITY: usize = 16;

/// Marks a page written by [`MemoryStore::to_page`], erased flash reads `0xFF`
const PAGE_MAGIC: u32 = 0x4148_5331;
/// Magic, entry count, then `(key, value)` as two little endian words per entry
pub const PAGE_IMAGE_LEN: usize = 8 + STORE_CAPACITY * 8;

/// Storage for boolean flags keyed by number
pub trait SettingsStore {
    /// Whether `key` was ever written
    fn exists(&self, key: u32) -> bool;

    /// Value of `key`, `false` when it was never written
    fn read_bool(&self, key: u32) -> bool;

    fn write_bool(&mut self, key: u32, value: bool) -> Result<(), Error>;
}

/// Settings kept in RAM.
///
/// On the watch the store is mirrored to a flash page: it is loaded with
/// [`MemoryStore::from_page`] at boot and written back with
/// [`MemoryStore::to_page`] whenever [`MemoryStore::take_dirty`] reports a change.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: FnvIndexMap<u32, bool, STORE_CAPACITY>,
    dirty: bool,
}

fn word(page: &[u8], index: usize) -> Option<u32> {
    let bytes = page.get(index * 4..index * 4 + 4)?;
    Some(u32::from_le_bytes(bytes.try_into().ok()?))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from a page image.
    ///
    /// A blank or corrupted page gives an empty store.
    pub fn from_page(page: &[u8]) -> Self {
        let mut store = Self::new();
        if word(page, 0) != Some(PAGE_MAGIC) {
            info!("No stored settings");
            return store;
        }

        let count = word(page, 1).unwrap_or(0) as usize;
        if count > STORE_CAPACITY {
            warn!("Stored settings corrupted, {} entries", count);
            return store;
        }
        for entry in 0..count {
            let (Some(key), Some(value)) = (word(page, 2 + 2 * entry), word(page, 3 + 2 * entry))
            else {
                warn!("Stored settings truncated");
                return Self::new();
            };
            // Capacity was checked above
            let _ = store.entries.insert(key, value != 0);
        }
        debug!("Loaded {} stored settings", count);
        store
    }

    /// Serialize into a page image, unused entries stay erased
    pub fn to_page(&self, page: &mut [u8; PAGE_IMAGE_LEN]) {
        page.fill(0xFF);
        let mut put = |index: usize, value: u32| {
            page[index * 4..index * 4 + 4].copy_from_slice(&value.to_le_bytes());
        };
        put(0, PAGE_MAGIC);
        put(1, self.entries.len() as u32);
        for (entry, (&key, &value)) in self.entries.iter().enumerate() {
            put(2 + 2 * entry, key);
            put(3 + 2 * entry, value as u32);
        }
    }

    /// Whether values changed since the last call
    pub fn take_dirty(&mut self) -> bool {
        core::mem::take(&mut self.dirty)
    }
}

impl SettingsStore for MemoryStore {
    fn exists(&self, key: u32) -> bool {
        self.entries.contains_key(&key)
    }

    fn read_bool(&self, key: u32) -> bool {
        self.entries.get(&key).copied().unwrap_or(false)
    }

    fn write_bool(&mut self, key: u32, value: bool) -> Result<(), Error> {
        let previous = self
            .entries
            .insert(key, value)
            .map_err(|_| Error::StoreFull)?;
        if previous != Some(value) {
            self.dirty = true;
        }
        Ok(())
    }
}
