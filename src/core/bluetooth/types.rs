//! Defines the advertisement data structures for the Bluetooth module.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use uuid::Uuid;

use crate::core::bluetooth::constants::{
    KEY_IS_CONNECTABLE, KEY_LOCAL_NAME, KEY_MANUFACTURER_DATA, KEY_SERVICE_UUIDS,
    KEY_TX_POWER_LEVEL,
};

/// A single heterogeneous advertisement value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AdvertisementValue {
    Text(String),
    Integer(i64),
    Bool(bool),
    Bytes(Vec<u8>),
    Uuids(Vec<Uuid>),
}

/// Manufacturer specific data, split into company identifier and payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManufacturerData {
    pub company_id: u16,
    pub data: Vec<u8>,
}

impl ManufacturerData {
    /// Splits raw manufacturer bytes: the first two bytes are the
    /// little-endian company identifier.
    pub fn from_raw(raw: &[u8]) -> Option<Self> {
        match raw {
            [lo, hi, rest @ ..] => Some(Self {
                company_id: u16::from_le_bytes([*lo, *hi]),
                data: rest.to_vec(),
            }),
            _ => None,
        }
    }

    pub fn to_raw(&self) -> Vec<u8> {
        let mut raw = self.company_id.to_le_bytes().to_vec();
        raw.extend_from_slice(&self.data);
        raw
    }
}

/// Advertisement payload reported by a single scan event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AdvertisementData {
    /// The advertised local name, if any
    pub local_name: Option<String>,
    /// Advertised service UUIDs
    pub service_uuids: Vec<Uuid>,
    /// Manufacturer specific data
    pub manufacturer_data: Option<ManufacturerData>,
    /// Service data keyed by service UUID
    pub service_data: HashMap<Uuid, Vec<u8>>,
    /// Advertised transmit power in dBm
    pub tx_power_level: Option<i16>,
    /// Whether the peripheral accepts connections
    pub is_connectable: bool,
    /// Keys with no typed field above
    pub extra: BTreeMap<String, AdvertisementValue>,
}

impl AdvertisementData {
    /// Builds advertisement data from a string-keyed mapping.
    ///
    /// Well-known keys with the expected value shape fill the typed fields.
    /// Everything else is kept verbatim in `extra`.
    pub fn from_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, AdvertisementValue)>,
        K: Into<String>,
    {
        let mut data = Self::default();
        for (key, value) in entries {
            let key = key.into();
            let leftover = match (key.as_str(), value) {
                (KEY_LOCAL_NAME, AdvertisementValue::Text(name)) => {
                    data.local_name = Some(name);
                    None
                }
                (KEY_SERVICE_UUIDS, AdvertisementValue::Uuids(uuids)) => {
                    data.service_uuids = uuids;
                    None
                }
                (KEY_TX_POWER_LEVEL, AdvertisementValue::Integer(level))
                    if i16::try_from(level).is_ok() =>
                {
                    data.tx_power_level = i16::try_from(level).ok();
                    None
                }
                (KEY_IS_CONNECTABLE, AdvertisementValue::Bool(flag)) => {
                    data.is_connectable = flag;
                    None
                }
                (KEY_MANUFACTURER_DATA, AdvertisementValue::Bytes(raw))
                    if ManufacturerData::from_raw(&raw).is_some() =>
                {
                    data.manufacturer_data = ManufacturerData::from_raw(&raw);
                    None
                }
                (_, value) => Some(value),
            };
            if let Some(value) = leftover {
                data.extra.insert(key, value);
            }
        }
        data
    }

    /// Flattens the typed fields and `extra` into a single mapping.
    ///
    /// The view is lossy, so `from_entries(data.entries())` only rebuilds
    /// `data` when it has no service data. Service data has no single-value
    /// form and is left out, and `is_connectable` is only listed when set.
    pub fn entries(&self) -> BTreeMap<String, AdvertisementValue> {
        let mut entries = self.extra.clone();
        if let Some(name) = &self.local_name {
            entries.insert(KEY_LOCAL_NAME.to_string(), AdvertisementValue::Text(name.clone()));
        }
        if !self.service_uuids.is_empty() {
            entries.insert(
                KEY_SERVICE_UUIDS.to_string(),
                AdvertisementValue::Uuids(self.service_uuids.clone()),
            );
        }
        if let Some(manufacturer) = &self.manufacturer_data {
            entries.insert(
                KEY_MANUFACTURER_DATA.to_string(),
                AdvertisementValue::Bytes(manufacturer.to_raw()),
            );
        }
        if let Some(level) = self.tx_power_level {
            entries.insert(KEY_TX_POWER_LEVEL.to_string(), AdvertisementValue::Integer(level.into()));
        }
        if self.is_connectable {
            entries.insert(KEY_IS_CONNECTABLE.to_string(), AdvertisementValue::Bool(true));
        }
        entries
    }

    /// Returns true if nothing at all was advertised
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl From<bluest::AdvertisementData> for AdvertisementData {
    fn from(adv: bluest::AdvertisementData) -> Self {
        Self {
            local_name: adv.local_name,
            service_uuids: adv.services.iter().copied().collect(),
            manufacturer_data: adv.manufacturer_data.map(|m| ManufacturerData {
                company_id: m.company_id,
                data: m.data.to_vec(),
            }),
            service_data: adv
                .service_data
                .into_iter()
                .map(|(uuid, data)| (uuid, data.to_vec()))
                .collect(),
            tx_power_level: adv.tx_power_level,
            is_connectable: adv.is_connectable,
            extra: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIT_SERVICE: Uuid = Uuid::from_u128(0x0000ffe5_0000_1000_8000_00805f9a34fb);

    #[test]
    fn unknown_keys_go_to_extra() {
        let data = AdvertisementData::from_entries([(
            "name",
            AdvertisementValue::Text("WT901BLE".to_string()),
        )]);
        assert_eq!(data.local_name, None);
        assert_eq!(
            data.extra.get("name"),
            Some(&AdvertisementValue::Text("WT901BLE".to_string()))
        );
    }

    #[test]
    fn well_known_keys_fill_typed_fields() {
        let data = AdvertisementData::from_entries([
            (KEY_LOCAL_NAME, AdvertisementValue::Text("WT901BLE68".to_string())),
            (KEY_SERVICE_UUIDS, AdvertisementValue::Uuids(vec![WIT_SERVICE])),
            (KEY_MANUFACTURER_DATA, AdvertisementValue::Bytes(vec![0x34, 0x12, 0xaa, 0xbb])),
            (KEY_TX_POWER_LEVEL, AdvertisementValue::Integer(-4)),
            (KEY_IS_CONNECTABLE, AdvertisementValue::Bool(true)),
        ]);

        assert_eq!(data.local_name.as_deref(), Some("WT901BLE68"));
        assert_eq!(data.service_uuids, vec![WIT_SERVICE]);
        assert_eq!(
            data.manufacturer_data,
            Some(ManufacturerData { company_id: 0x1234, data: vec![0xaa, 0xbb] })
        );
        assert_eq!(data.tx_power_level, Some(-4));
        assert!(data.is_connectable);
        assert!(data.extra.is_empty());
    }

    #[test]
    fn malformed_well_known_values_are_kept_verbatim() {
        let data = AdvertisementData::from_entries([
            (KEY_MANUFACTURER_DATA, AdvertisementValue::Bytes(vec![0x01])),
            (KEY_TX_POWER_LEVEL, AdvertisementValue::Integer(100_000)),
            (KEY_LOCAL_NAME, AdvertisementValue::Integer(7)),
        ]);

        assert_eq!(data.manufacturer_data, None);
        assert_eq!(data.tx_power_level, None);
        assert_eq!(data.local_name, None);
        assert_eq!(data.extra.len(), 3);
    }

    #[test]
    fn entries_reflect_typed_fields() {
        let data = AdvertisementData {
            local_name: Some("BWT901BLECL".to_string()),
            manufacturer_data: Some(ManufacturerData { company_id: 0x004c, data: vec![1, 2] }),
            tx_power_level: Some(0),
            ..Default::default()
        };

        let entries = data.entries();
        assert_eq!(
            entries.get(KEY_MANUFACTURER_DATA),
            Some(&AdvertisementValue::Bytes(vec![0x4c, 0x00, 1, 2]))
        );
        assert_eq!(entries.get(KEY_TX_POWER_LEVEL), Some(&AdvertisementValue::Integer(0)));
        assert!(!entries.contains_key(KEY_IS_CONNECTABLE));
        assert_eq!(AdvertisementData::from_entries(entries), data);
    }

    #[test]
    fn entries_leave_out_service_data() {
        let mut data = AdvertisementData {
            local_name: Some("WT901BLE68".to_string()),
            ..Default::default()
        };
        data.service_data.insert(WIT_SERVICE, vec![0x55, 0x61]);

        let entries = data.entries();
        assert_eq!(entries.len(), 1);

        let rebuilt = AdvertisementData::from_entries(entries);
        assert!(rebuilt.service_data.is_empty());
        assert_eq!(rebuilt.local_name, data.local_name);
        assert_ne!(rebuilt, data);
    }

    #[test]
    fn default_is_empty() {
        assert!(AdvertisementData::default().is_empty());
        assert!(AdvertisementData::from_entries(Vec::<(String, AdvertisementValue)>::new()).is_empty());
    }
}
