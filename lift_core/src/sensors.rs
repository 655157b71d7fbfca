//! Fixed mapping from sensor channels (GPIO lines) to what they detect.

use std::collections::BTreeMap;

use crate::error::ControlError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorRole {
    /// Proximity switch at the given floor.
    Floor(u8),
    /// Motion detector in front of the ground floor.
    Motion,
}

/// Injective channel → role map, built once at startup.
#[derive(Debug, Clone, Default)]
pub struct SensorMap {
    roles: BTreeMap<u8, SensorRole>,
}

impl SensorMap {
    /// `floor_channels[i]` watches floor `i + 1`.
    pub fn new(floor_channels: &[u8], motion: Option<u8>) -> Result<Self, ControlError> {
        let mut roles = BTreeMap::new();
        for (idx, ch) in floor_channels.iter().enumerate() {
            let floor = u8::try_from(idx + 1)
                .map_err(|_| ControlError::Config("too many floor sensors".into()))?;
            if roles.insert(*ch, SensorRole::Floor(floor)).is_some() {
                return Err(ControlError::Config(format!(
                    "sensor channel {ch} mapped twice"
                )));
            }
        }
        if let Some(ch) = motion
            && roles.insert(ch, SensorRole::Motion).is_some()
        {
            return Err(ControlError::Config(format!(
                "sensor channel {ch} mapped twice"
            )));
        }
        Ok(Self { roles })
    }

    pub fn role(&self, channel: u8) -> Option<SensorRole> {
        self.roles.get(&channel).copied()
    }

    pub fn channels(&self) -> impl Iterator<Item = u8> + '_ {
        self.roles.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floors_are_numbered_from_one() {
        let map = SensorMap::new(&[4, 17, 27], Some(18)).unwrap();
        assert_eq!(map.role(4), Some(SensorRole::Floor(1)));
        assert_eq!(map.role(27), Some(SensorRole::Floor(3)));
        assert_eq!(map.role(18), Some(SensorRole::Motion));
        assert_eq!(map.role(5), None);
        assert_eq!(map.channels().collect::<Vec<_>>(), vec![4, 17, 18, 27]);
    }

    #[test]
    fn rejects_shared_channels() {
        let err = SensorMap::new(&[4, 4], None).unwrap_err();
        assert!(matches!(err, ControlError::Config(_)));
        let err = SensorMap::new(&[4, 17], Some(17)).unwrap_err();
        assert!(err.to_string().contains("17"));
    }
}
