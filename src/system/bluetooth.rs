//! Bluetooth module
//!
//! The companion app writes configuration messages and the current time,
//! the watch notifies the active settings back after each change.

// Core
use core::mem;

// BLE
use embassy_futures::select::{select, Either};
use heapless::Vec;
use nrf_softdevice::{
    self,
    ble::{
        advertisement_builder::{Flag, LegacyAdvertisementBuilder, LegacyAdvertisementPayload},
        gatt_server, peripheral, Connection,
    },
    raw, Config, Softdevice,
};

use super::time::TimeReference;
use crate::{CONFIG_MESSAGE, SETTINGS_CHANGED, TIME_SYNC};

/// Largest configuration message accepted in one write
pub const CONFIG_MESSAGE_LEN: usize = 64;

const DEVICE_NAME: &[u8] = b"ActiveHour";

pub static ADV_DATA: LegacyAdvertisementPayload = LegacyAdvertisementBuilder::new()
    .flags(&[Flag::GeneralDiscovery, Flag::LE_Only])
    .full_name("ActiveHour")
    .build();

pub static SCAN_DATA: LegacyAdvertisementPayload = LegacyAdvertisementBuilder::new().build();

#[nrf_softdevice::gatt_server]
pub struct Server {
    pub face: FaceService,
    pub time: TimeService,
}

#[nrf_softdevice::gatt_service(uuid = "5a1e0001-4163-7469-7665-486f75720000")]
pub struct FaceService {
    /// Configuration message from the companion app
    #[characteristic(uuid = "5a1e0002-4163-7469-7665-486f75720000", write)]
    pub config: Vec<u8, CONFIG_MESSAGE_LEN>,
    /// Active settings, one bit per setting key
    #[characteristic(uuid = "5a1e0003-4163-7469-7665-486f75720000", read, notify)]
    pub settings: u8,
}

#[nrf_softdevice::gatt_service(uuid = "1805")]
pub struct TimeService {
    #[characteristic(uuid = "2a2b", write)]
    pub current_time: [u8; 10],
}

pub fn generate_config() -> Config {
    Config {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_RC as u8,
            rc_ctiv: 16,
            rc_temp_ctiv: 2,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_500_PPM as u8,
        }),
        conn_gap: Some(raw::ble_gap_conn_cfg_t {
            conn_count: 1,
            event_length: 24,
        }),
        conn_gatt: Some(raw::ble_gatt_conn_cfg_t { att_mtu: 128 }),
        gatts_attr_tab_size: Some(raw::ble_gatts_cfg_attr_tab_size_t {
            attr_tab_size: raw::BLE_GATTS_ATTR_TAB_SIZE_DEFAULT,
        }),
        gap_device_name: Some(raw::ble_gap_cfg_device_name_t {
            p_value: DEVICE_NAME.as_ptr() as _,
            current_len: DEVICE_NAME.len() as u16,
            max_len: DEVICE_NAME.len() as u16,
            write_perm: unsafe { mem::zeroed() },
            _bitfield_1: raw::ble_gap_cfg_device_name_t::new_bitfield_1(
                raw::BLE_GATTS_VLOC_STACK as u8,
            ),
        }),
        ..Default::default()
    }
}

/// Forward writes from the companion app until it disconnects
async fn serve(conn: &Connection, server: &Server) {
    let disconnected = gatt_server::run(conn, server, |event| match event {
        ServerEvent::Face(FaceServiceEvent::ConfigWrite(message)) => {
            defmt::debug!("Config message, {} bytes", message.len());
            CONFIG_MESSAGE.signal(message);
        }
        ServerEvent::Face(FaceServiceEvent::SettingsCccdWrite { notifications }) => {
            defmt::debug!("Settings notifications: {}", notifications);
        }
        ServerEvent::Time(TimeServiceEvent::CurrentTimeWrite(bytes)) => {
            match TimeReference::from_cts_bytes(&bytes) {
                Some(reference) => TIME_SYNC.signal(reference),
                None => defmt::warn!("Invalid current time: {:x}", bytes),
            }
        }
    });

    let report_settings = async {
        loop {
            let bits = SETTINGS_CHANGED.wait().await;
            if let Err(err) = server.face.settings_set(&bits) {
                defmt::warn!("Settings value not updated: {:?}", err);
            }
            match server.face.settings_notify(conn, &bits) {
                Ok(()) => defmt::info!("Settings sent"),
                Err(_) => defmt::warn!("Outbox send failed!"),
            }
        }
    };

    if let Either::First(err) = select(disconnected, report_settings).await {
        defmt::info!("Disconnected: {:?}", err);
    }
}

/// Advertise, serve one connection at a time
#[embassy_executor::task]
pub async fn bluetooth_task(sd: &'static Softdevice, server: &'static Server) -> ! {
    let config = peripheral::Config::default();
    loop {
        let adv = peripheral::ConnectableAdvertisement::ScannableUndirected {
            adv_data: &ADV_DATA,
            scan_data: &SCAN_DATA,
        };
        match peripheral::advertise_connectable(sd, adv, &config).await {
            Ok(conn) => {
                defmt::info!("Connected");
                serve(&conn, server).await;
            }
            Err(err) => defmt::error!("Advertising failed: {:?}", err),
        }
    }
}

#[embassy_executor::task]
pub async fn softdevice_task(sd: &'static Softdevice) -> ! {
    sd.run().await
}
