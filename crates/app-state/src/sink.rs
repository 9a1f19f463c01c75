//! Audio output (sink) selection.
//!
//! The active sink starts at the browser-style `"default"` id. A sink the
//! user picked explicitly is remembered as the preferred sink and re-applied
//! whenever the device list changes and that device is present again.

use serde::{Deserialize, Serialize};

/// Sink id meaning "whatever the platform routes to by default".
pub const DEFAULT_SINK_ID: &str = "default";

/// Kind of media device reported by device enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    AudioInput,
    AudioOutput,
    VideoInput,
}

/// A device as reported by device enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaDevice {
    pub device_id: String,
    pub label: String,
    pub kind: DeviceKind,
}

impl MediaDevice {
    pub fn audio_output(device_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            label: label.into(),
            kind: DeviceKind::AudioOutput,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkSelector {
    active: String,
    preferred: Option<String>,
}

impl Default for SinkSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl SinkSelector {
    pub fn new() -> Self {
        Self {
            active: DEFAULT_SINK_ID.to_string(),
            preferred: None,
        }
    }

    pub fn active_sink_id(&self) -> &str {
        &self.active
    }

    /// Select `sink_id` and remember it as the preferred sink.
    pub fn set_active_sink_id(&mut self, sink_id: impl Into<String>) {
        let sink_id = sink_id.into();
        self.preferred = Some(sink_id.clone());
        self.active = sink_id;
    }

    /// Reconcile with a fresh device list.
    ///
    /// Falls back to [`DEFAULT_SINK_ID`] when the active sink disappeared and
    /// switches back to the preferred sink once it is listed again. Returns
    /// `true` if the active sink changed.
    pub fn on_devices_changed(&mut self, devices: &[MediaDevice]) -> bool {
        let is_listed = |id: &str| {
            devices
                .iter()
                .any(|d| d.kind == DeviceKind::AudioOutput && d.device_id == id)
        };

        let next = match self.preferred.as_deref() {
            Some(preferred) if is_listed(preferred) => preferred,
            _ if self.active == DEFAULT_SINK_ID || is_listed(&self.active) => {
                return false;
            }
            _ => DEFAULT_SINK_ID,
        };

        if self.active == next {
            return false;
        }

        self.active = next.to_string();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_with_default_sink() {
        let selector = SinkSelector::new();
        assert_eq!(selector.active_sink_id(), DEFAULT_SINK_ID);
    }

    #[test]
    fn test_set_active_sink_id_replaces_value() {
        let mut selector = SinkSelector::new();
        selector.set_active_sink_id("headphones-1");
        assert_eq!(selector.active_sink_id(), "headphones-1");
    }

    #[test]
    fn test_unplugged_sink_falls_back_then_restores() {
        let mut selector = SinkSelector::new();
        selector.set_active_sink_id("headphones-1");

        let changed =
            selector.on_devices_changed(&[MediaDevice::audio_output("default", "Default")]);
        assert!(changed);
        assert_eq!(selector.active_sink_id(), DEFAULT_SINK_ID);

        let changed = selector.on_devices_changed(&[
            MediaDevice::audio_output("default", "Default"),
            MediaDevice::audio_output("headphones-1", "USB Headphones"),
        ]);
        assert!(changed);
        assert_eq!(selector.active_sink_id(), "headphones-1");
    }

    #[test]
    fn test_devices_changed_ignores_wrong_kind() {
        let mut selector = SinkSelector::new();
        selector.set_active_sink_id("mic-1");

        let changed = selector.on_devices_changed(&[MediaDevice {
            device_id: "mic-1".to_string(),
            label: "Microphone".to_string(),
            kind: DeviceKind::AudioInput,
        }]);

        // Not an output, so the selection falls back
        assert!(changed);
        assert_eq!(selector.active_sink_id(), DEFAULT_SINK_ID);
    }

    #[test]
    fn test_devices_changed_keeps_listed_sink() {
        let mut selector = SinkSelector::new();
        selector.set_active_sink_id("speakers");

        let changed =
            selector.on_devices_changed(&[MediaDevice::audio_output("speakers", "Speakers")]);

        assert!(!changed);
        assert_eq!(selector.active_sink_id(), "speakers");
    }

    #[test]
    fn test_devices_changed_without_preference_is_noop() {
        let mut selector = SinkSelector::new();
        let changed =
            selector.on_devices_changed(&[MediaDevice::audio_output("speakers", "Speakers")]);

        assert!(!changed);
        assert_eq!(selector.active_sink_id(), DEFAULT_SINK_ID);
    }
}
