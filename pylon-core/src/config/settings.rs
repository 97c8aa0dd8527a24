//! Delta settings blob
//!
//! Calibration never writes to flash itself. This is the format the
//! external settings service stores after the user confirms a result.

use serde::{Deserialize, Serialize};

use crate::kinematics::KinematicParameters;

/// Magic number to identify valid settings data
pub const SETTINGS_MAGIC: u32 = 0x444C_5441; // "DLTA"

/// Current settings data version
pub const SETTINGS_VERSION: u8 = 1;

/// Maximum serialized settings size
pub const MAX_SETTINGS_SIZE: usize = 64;

/// Settings encoding errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingsError {
    /// Serialization failed (buffer too small)
    Serialize,
    /// Deserialization failed
    Deserialize,
    /// CRC check failed
    CrcMismatch,
    /// Invalid magic or version
    InvalidFormat,
}

/// Stored kinematic parameters with a header for data validation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeltaSettings {
    /// Magic number for validation
    pub magic: u32,
    /// Data format version
    pub version: u8,
    /// Calibrated parameters
    pub params: KinematicParameters,
    /// CRC32 checksum (calculated over magic..params)
    pub crc: u32,
}

impl DeltaSettings {
    /// Wrap parameters with a fresh header and CRC
    pub fn new(params: KinematicParameters) -> Self {
        let mut settings = Self {
            magic: SETTINGS_MAGIC,
            version: SETTINGS_VERSION,
            params,
            crc: 0,
        };
        settings.update_crc();
        settings
    }

    /// Check if the header is valid (magic and version match)
    pub fn is_valid(&self) -> bool {
        self.magic == SETTINGS_MAGIC && self.version == SETTINGS_VERSION
    }

    /// Calculate CRC32 for the data (excluding the crc field itself)
    pub fn calculate_crc(&self) -> u32 {
        let mut crc: u32 = 0xFFFF_FFFF;

        crc = crc32_update(crc, &self.magic.to_le_bytes());
        crc = crc32_update(crc, &[self.version]);

        let p = &self.params;
        for value in p
            .endstop_adj
            .iter()
            .chain(core::iter::once(&p.radius))
            .chain(core::iter::once(&p.height))
            .chain(p.tower_angle_adj.iter())
        {
            crc = crc32_update(crc, &value.to_bits().to_le_bytes());
        }

        !crc
    }

    /// Update the CRC field
    pub fn update_crc(&mut self) {
        self.crc = self.calculate_crc();
    }

    /// Verify the CRC is correct
    pub fn verify_crc(&self) -> bool {
        self.crc == self.calculate_crc()
    }

    /// Serialize into `buffer`, returning the used bytes
    pub fn encode<'a>(&self, buffer: &'a mut [u8]) -> Result<&'a mut [u8], SettingsError> {
        postcard::to_slice(self, buffer).map_err(|_| SettingsError::Serialize)
    }

    /// Deserialize and validate a stored blob
    pub fn decode(bytes: &[u8]) -> Result<Self, SettingsError> {
        let settings: Self =
            postcard::from_bytes(bytes).map_err(|_| SettingsError::Deserialize)?;

        if !settings.is_valid() {
            return Err(SettingsError::InvalidFormat);
        }
        if !settings.verify_crc() {
            warn!("Delta settings CRC mismatch");
            return Err(SettingsError::CrcMismatch);
        }

        Ok(settings)
    }
}

/// Simple CRC32 update function (IEEE 802.3 polynomial)
fn crc32_update(crc: u32, data: &[u8]) -> u32 {
    const POLY: u32 = 0xEDB8_8320;
    let mut crc = crc;

    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ POLY;
            } else {
                crc >>= 1;
            }
        }
    }

    crc
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calibrated() -> KinematicParameters {
        KinematicParameters {
            endstop_adj: [0.0, -0.31, -0.12],
            radius: 101.87,
            height: 294.62,
            tower_angle_adj: [0.21, -0.08, -0.13],
        }
    }

    #[test]
    fn test_crc32_check_value() {
        // Standard CRC-32 check value for "123456789"
        assert_eq!(!crc32_update(0xFFFF_FFFF, b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn test_new_settings_are_valid() {
        let settings = DeltaSettings::new(calibrated());
        assert!(settings.is_valid());
        assert!(settings.verify_crc());
    }

    #[test]
    fn test_crc_detects_modification() {
        let mut settings = DeltaSettings::new(calibrated());
        settings.params.radius += 0.01;
        assert!(!settings.verify_crc());
    }

    #[test]
    fn test_encode_decode() {
        let settings = DeltaSettings::new(calibrated());
        let mut buffer = [0u8; MAX_SETTINGS_SIZE];
        let len = settings.encode(&mut buffer).unwrap().len();

        let decoded = DeltaSettings::decode(&buffer[..len]).unwrap();
        assert_eq!(decoded, settings);
    }

    #[test]
    fn test_decode_rejects_corrupted_crc() {
        let mut settings = DeltaSettings::new(calibrated());
        settings.crc ^= 1;
        let mut buffer = [0u8; MAX_SETTINGS_SIZE];
        let len = settings.encode(&mut buffer).unwrap().len();

        assert_eq!(
            DeltaSettings::decode(&buffer[..len]),
            Err(SettingsError::CrcMismatch)
        );
    }

    #[test]
    fn test_decode_rejects_wrong_version() {
        let mut settings = DeltaSettings::new(calibrated());
        settings.version = SETTINGS_VERSION + 1;
        settings.update_crc();
        let mut buffer = [0u8; MAX_SETTINGS_SIZE];
        let len = settings.encode(&mut buffer).unwrap().len();

        assert_eq!(
            DeltaSettings::decode(&buffer[..len]),
            Err(SettingsError::InvalidFormat)
        );
    }

    #[test]
    fn test_encode_into_small_buffer_fails() {
        let settings = DeltaSettings::new(calibrated());
        let mut buffer = [0u8; 4];
        assert_eq!(
            settings.encode(&mut buffer).unwrap_err(),
            SettingsError::Serialize
        );
    }

    #[test]
    fn test_decode_garbage() {
        assert_eq!(
            DeltaSettings::decode(&[0xFF]),
            Err(SettingsError::Deserialize)
        );
    }
}
