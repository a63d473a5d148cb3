//! Configuration messages from the companion app
//!
//! A message is a sequence of records, each `[key][len][value]` where `key`
//! is a setting number, `len` the value length in bytes and `value` UTF-8
//! text. A setting is switched on only by the exact text `true`.

use super::{SettingKey, SettingsStore};
use crate::error::Error;

/// One key/value pair of a configuration message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigEntry<'a> {
    pub key: u8,
    pub value: &'a str,
}

impl ConfigEntry<'_> {
    pub fn setting(&self) -> Option<SettingKey> {
        SettingKey::from_id(self.key as u32)
    }

    pub fn flag(&self) -> bool {
        self.value == "true"
    }
}

/// Validated configuration message
#[derive(Debug, Clone, Copy)]
pub struct ConfigMessage<'a> {
    bytes: &'a [u8],
}

/// Decode the record at `offset`, returning it and the offset of the next one
fn decode_entry(bytes: &[u8], offset: usize) -> Result<Option<(ConfigEntry<'_>, usize)>, Error> {
    let rest = &bytes[offset..];
    let (key, len) = match rest {
        [] => return Ok(None),
        [key, len, ..] => (*key, *len as usize),
        [_] => return Err(Error::MalformedMessage(offset)),
    };
    let value = rest
        .get(2..2 + len)
        .ok_or(Error::MalformedMessage(offset + 1))?;
    let value = core::str::from_utf8(value).map_err(|_| Error::MalformedMessage(offset + 2))?;
    Ok(Some((ConfigEntry { key, value }, offset + 2 + len)))
}

impl<'a> ConfigMessage<'a> {
    /// Check that `bytes` holds whole, well-formed records
    pub fn parse(bytes: &'a [u8]) -> Result<Self, Error> {
        let mut offset = 0;
        while let Some((_, next)) = decode_entry(bytes, offset)? {
            offset = next;
        }
        Ok(Self { bytes })
    }

    pub fn entries(&self) -> Entries<'a> {
        Entries {
            bytes: self.bytes,
            offset: 0,
        }
    }
}

/// Iterator over the records of a [`ConfigMessage`]
pub struct Entries<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Iterator for Entries<'a> {
    type Item = ConfigEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let (entry, next) = decode_entry(self.bytes, self.offset).ok()??;
        self.offset = next;
        Some(entry)
    }
}

/// Write every known setting of `message` to `store`, returns how many were written
pub fn apply_message<S>(store: &mut S, message: &ConfigMessage<'_>) -> Result<usize, Error>
where
    S: SettingsStore + ?Sized,
{
    let mut written = 0;
    for entry in message.entries() {
        match entry.setting() {
            Some(key) => {
                debug!("Setting {} = {}", entry.key, entry.flag());
                store.write_bool(key.id(), entry.flag())?;
                written += 1;
            }
            None => warn!("Ignoring unknown setting {}", entry.key),
        }
    }
    Ok(written)
}
