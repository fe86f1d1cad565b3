use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaterStatus {
    Off = 0,
    On = 1,
}

impl HeaterStatus {
    pub fn is_on(self) -> bool {
        self == HeaterStatus::On
    }
}

/// The portal sends the flag as a string; exactly `"1"` means on, anything else is off.
impl<'de> serde::Deserialize<'de> for HeaterStatus {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(d)?;

        match value.as_str() {
            Some("1") => Ok(HeaterStatus::On),
            _ => Ok(HeaterStatus::Off),
        }
    }
}
