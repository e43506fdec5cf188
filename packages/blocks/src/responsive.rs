//! Per-breakpoint prop overrides
//!
//! Overrides live under `props.responsive.{desktop,tablet,mobile}`. They
//! cascade downward: desktop applies everywhere, tablet on tablet and
//! mobile, mobile only on mobile.

use crate::{BlockError, Props};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

const RESPONSIVE_KEY: &str = "responsive";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    #[default]
    Desktop,
    Tablet,
    Mobile,
}

impl Device {
    pub const ALL: [Device; 3] = [Device::Desktop, Device::Tablet, Device::Mobile];

    pub fn as_str(self) -> &'static str {
        match self {
            Device::Desktop => "desktop",
            Device::Tablet => "tablet",
            Device::Mobile => "mobile",
        }
    }

    /// Breakpoints whose overrides apply on this device, widest first
    fn cascade(self) -> &'static [Device] {
        match self {
            Device::Desktop => &[Device::Desktop],
            Device::Tablet => &[Device::Desktop, Device::Tablet],
            Device::Mobile => &[Device::Desktop, Device::Tablet, Device::Mobile],
        }
    }
}

impl FromStr for Device {
    type Err = BlockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|device| device.as_str() == s.trim())
            .ok_or_else(|| BlockError::UnknownDevice(s.to_string()))
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn overrides<'a>(props: &'a Props, device: Device) -> Option<&'a Props> {
    props
        .get(RESPONSIVE_KEY)
        .and_then(Value::as_object)
        .and_then(|responsive| responsive.get(device.as_str()))
        .and_then(Value::as_object)
}

/// Effective props on `device`
pub fn resolve_responsive_props(props: &Props, device: Device) -> Props {
    let mut resolved = props.clone();
    for breakpoint in device.cascade() {
        if let Some(layer) = overrides(props, *breakpoint) {
            resolved.extend(layer.clone());
        }
    }
    resolved
}

/// Set `key` in the override layer for `device`, creating layers as needed
pub fn set_responsive_prop(props: &Props, device: Device, key: &str, value: Value) -> Props {
    let mut next = props.clone();

    let mut responsive = next
        .get(RESPONSIVE_KEY)
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    let mut layer = responsive
        .get(device.as_str())
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    layer.insert(key.to_string(), value);
    responsive.insert(device.as_str().to_string(), Value::Object(layer));
    next.insert(RESPONSIVE_KEY.to_string(), Value::Object(responsive));
    next
}
