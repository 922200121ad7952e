//! Immutable record of a single peripheral advertisement
//! A record bundles the platform peripheral handle with the advertisement
//! payload and signal strength observed at one scan event.

use std::sync::Arc;

use thiserror::Error;

use crate::core::bluetooth::types::AdvertisementData;

/// Errors raised while building a `PeripheralRecord`
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

/// A peripheral object owned by the host Bluetooth stack
pub trait PeripheralHandle: Send + Sync + 'static {
    /// Platform specific identifier, stable for the lifetime of the adapter
    fn identifier(&self) -> String;

    /// The GAP name of the peripheral, if the stack knows it
    fn name(&self) -> Option<String>;
}

impl PeripheralHandle for bluest::Device {
    fn identifier(&self) -> String {
        self.id().to_string()
    }

    fn name(&self) -> Option<String> {
        bluest::Device::name(self).ok()
    }
}

/// A peripheral as seen by one scan event.
///
/// The handle is shared with the Bluetooth stack and is never owned by the
/// record. The advertisement payload is owned by value, so nothing the caller
/// does to its own copy afterwards can change a stored record.
#[derive(Debug)]
pub struct PeripheralRecord<H> {
    handle: Arc<H>,
    advertisement: AdvertisementData,
    rssi: i16,
}

impl<H: PeripheralHandle> PeripheralRecord<H> {
    /// Creates a new record from the values reported by a scan event
    pub fn new(handle: Arc<H>, advertisement: AdvertisementData, rssi: i16) -> Self {
        Self {
            handle,
            advertisement,
            rssi,
        }
    }

    /// Creates a new record, rejecting a missing peripheral handle
    pub fn try_new(
        handle: Option<Arc<H>>,
        advertisement: AdvertisementData,
        rssi: i16,
    ) -> Result<Self, RecordError> {
        let handle = handle.ok_or(RecordError::InvalidArgument("peripheral handle is required"))?;
        Ok(Self::new(handle, advertisement, rssi))
    }

    /// The shared peripheral handle, usable to connect through the platform stack
    pub fn handle(&self) -> &Arc<H> {
        &self.handle
    }

    pub fn advertisement(&self) -> &AdvertisementData {
        &self.advertisement
    }

    /// Signal strength in dBm
    pub fn rssi(&self) -> i16 {
        self.rssi
    }

    pub fn id(&self) -> String {
        self.handle.identifier()
    }

    /// Advertised local name, falling back to the name known by the stack
    pub fn name(&self) -> Option<String> {
        self.advertisement
            .local_name
            .clone()
            .or_else(|| self.handle.name())
    }
}

impl<H> Clone for PeripheralRecord<H> {
    fn clone(&self) -> Self {
        Self {
            handle: Arc::clone(&self.handle),
            advertisement: self.advertisement.clone(),
            rssi: self.rssi,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::bluetooth::types::AdvertisementValue;

    /// Stand-in for a platform peripheral
    #[derive(Debug, PartialEq, Eq)]
    pub(crate) struct FakePeripheral {
        pub id: String,
        pub name: Option<String>,
    }

    impl FakePeripheral {
        pub(crate) fn new(id: &str, name: Option<&str>) -> Arc<Self> {
            Arc::new(Self {
                id: id.to_string(),
                name: name.map(str::to_string),
            })
        }
    }

    impl PeripheralHandle for FakePeripheral {
        fn identifier(&self) -> String {
            self.id.clone()
        }

        fn name(&self) -> Option<String> {
            self.name.clone()
        }
    }

    fn named(name: &str) -> AdvertisementData {
        AdvertisementData::from_entries([("name", AdvertisementValue::Text(name.to_string()))])
    }

    #[test]
    fn reads_back_supplied_values() {
        let h1 = FakePeripheral::new("H1", None);
        let record = PeripheralRecord::new(h1.clone(), named("WT901BLE"), -62);

        assert!(Arc::ptr_eq(record.handle(), &h1));
        assert_eq!(record.advertisement(), &named("WT901BLE"));
        assert_eq!(record.rssi(), -62);
    }

    #[test]
    fn empty_advertisement_and_zero_rssi() {
        let h2 = FakePeripheral::new("H2", None);
        let record = PeripheralRecord::new(h2.clone(), AdvertisementData::default(), 0);

        assert!(Arc::ptr_eq(record.handle(), &h2));
        assert!(record.advertisement().is_empty());
        assert_eq!(record.rssi(), 0);
    }

    #[test]
    fn accepts_any_rssi() {
        for rssi in [i16::MIN, -100, -1, 0, 1, 20, i16::MAX] {
            let record = PeripheralRecord::new(
                FakePeripheral::new("H", None),
                AdvertisementData::default(),
                rssi,
            );
            assert_eq!(record.rssi(), rssi);
        }
    }

    #[test]
    fn missing_handle_is_rejected() {
        let result = PeripheralRecord::<FakePeripheral>::try_new(None, AdvertisementData::default(), -50);
        assert!(matches!(result, Err(RecordError::InvalidArgument(_))));

        let record = PeripheralRecord::try_new(
            Some(FakePeripheral::new("H1", None)),
            AdvertisementData::default(),
            -50,
        )
        .unwrap();
        assert_eq!(record.id(), "H1");
    }

    #[test]
    fn caller_mutation_does_not_reach_stored_record() {
        let mut metadata = named("WT901BLE");
        let first = PeripheralRecord::new(FakePeripheral::new("H1", None), metadata.clone(), -70);

        metadata.extra.insert("name".to_string(), AdvertisementValue::Text("changed".to_string()));
        metadata.local_name = Some("changed".to_string());
        let second = PeripheralRecord::new(FakePeripheral::new("H2", None), metadata, -40);

        assert_eq!(first.advertisement(), &named("WT901BLE"));
        assert_eq!(second.advertisement().local_name.as_deref(), Some("changed"));
    }

    #[test]
    fn clone_shares_the_handle() {
        let record = PeripheralRecord::new(FakePeripheral::new("H1", None), named("WT"), -80);
        let copy = record.clone();

        assert!(Arc::ptr_eq(record.handle(), copy.handle()));
        assert_eq!(copy.advertisement(), record.advertisement());
        assert_eq!(Arc::strong_count(record.handle()), 2);
    }

    #[test]
    fn name_prefers_advertised_local_name() {
        let advertised = AdvertisementData {
            local_name: Some("WT901BLE68".to_string()),
            ..Default::default()
        };
        let handle = FakePeripheral::new("H1", Some("cached"));

        assert_eq!(
            PeripheralRecord::new(handle.clone(), advertised, -60).name().as_deref(),
            Some("WT901BLE68")
        );
        assert_eq!(
            PeripheralRecord::new(handle, AdvertisementData::default(), -60).name().as_deref(),
            Some("cached")
        );
    }
}
