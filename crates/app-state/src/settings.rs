//! User-adjustable display settings and their reducer.
//!
//! Settings are replaced wholesale on every dispatch: `settings_reducer`
//! takes the current value and one action and returns the next value. The
//! literal value `"default"` resets an optional field to `None` (letting the
//! media SDK pick) and a required field to its initial value.

use common::error::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Value that resets a setting.
pub const RESET_VALUE: &str = "default";

/// Initial maximum number of remote video tracks.
pub const DEFAULT_MAX_TRACKS: &str = "10";

/// Initial maximum audio bitrate in bits per second.
pub const DEFAULT_MAX_AUDIO_BITRATE: &str = "16000";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Unknown setting: '{0}'")]
    UnknownSetting(String),

    #[error("Invalid value for {setting}: {reason}")]
    InvalidValue {
        setting: SettingName,
        reason: String,
    },
}

/// Generates `as_str`, `Display` and `FromStr` for the string-valued enums
/// below, all sharing one spelling table.
macro_rules! string_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(ParseError::unknown($kind, other)),
                }
            }
        }
    };
}

/// How the SDK switches off remote video tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackSwitchOffMode {
    Predicted,
    Detected,
    Disabled,
}

string_enum!(TrackSwitchOffMode, "track switch-off mode", {
    Predicted => "predicted",
    Detected => "detected",
    Disabled => "disabled",
});

/// Priority given to the dominant speaker's video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackPriority {
    Low,
    Standard,
    High,
}

string_enum!(TrackPriority, "track priority", {
    Low => "low",
    Standard => "standard",
    High => "high",
});

/// Bandwidth profile applied to the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BandwidthProfileMode {
    Grid,
    Collaboration,
    Presentation,
}

string_enum!(BandwidthProfileMode, "bandwidth profile mode", {
    Grid => "grid",
    Collaboration => "collaboration",
    Presentation => "presentation",
});

/// Named render dimensions for remote video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderDimension {
    #[serde(rename = "low")]
    Low,
    #[serde(rename = "cif")]
    Cif,
    #[serde(rename = "vga")]
    Vga,
    #[serde(rename = "wvga")]
    Wvga,
    #[serde(rename = "540p")]
    P540,
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "960p")]
    P960,
    #[serde(rename = "standard1080p")]
    Standard1080p,
    #[serde(rename = "wide1080p")]
    Wide1080p,
}

string_enum!(RenderDimension, "render dimension", {
    Low => "low",
    Cif => "cif",
    Vga => "vga",
    Wvga => "wvga",
    P540 => "540p",
    P720 => "720p",
    P960 => "960p",
    Standard1080p => "standard1080p",
    Wide1080p => "wide1080p",
});

/// Field targeted by a [`SettingsAction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SettingName {
    TrackSwitchOffMode,
    DominantSpeakerPriority,
    BandwidthProfileMode,
    MaxTracks,
    MaxAudioBitrate,
    RenderDimensionLow,
    RenderDimensionStandard,
    RenderDimensionHigh,
}

impl SettingName {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingName::TrackSwitchOffMode => "trackSwitchOffMode",
            SettingName::DominantSpeakerPriority => "dominantSpeakerPriority",
            SettingName::BandwidthProfileMode => "bandwidthProfileMode",
            SettingName::MaxTracks => "maxTracks",
            SettingName::MaxAudioBitrate => "maxAudioBitrate",
            SettingName::RenderDimensionLow => "renderDimensionLow",
            SettingName::RenderDimensionStandard => "renderDimensionStandard",
            SettingName::RenderDimensionHigh => "renderDimensionHigh",
        }
    }
}

impl fmt::Display for SettingName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingName {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trackSwitchOffMode" => Ok(SettingName::TrackSwitchOffMode),
            "dominantSpeakerPriority" => Ok(SettingName::DominantSpeakerPriority),
            "bandwidthProfileMode" => Ok(SettingName::BandwidthProfileMode),
            "maxTracks" => Ok(SettingName::MaxTracks),
            "maxAudioBitrate" => Ok(SettingName::MaxAudioBitrate),
            "renderDimensionLow" => Ok(SettingName::RenderDimensionLow),
            "renderDimensionStandard" => Ok(SettingName::RenderDimensionStandard),
            "renderDimensionHigh" => Ok(SettingName::RenderDimensionHigh),
            other => Err(SettingsError::UnknownSetting(other.to_string())),
        }
    }
}

/// Current display settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub track_switch_off_mode: Option<TrackSwitchOffMode>,
    pub dominant_speaker_priority: Option<TrackPriority>,
    pub bandwidth_profile_mode: BandwidthProfileMode,
    pub max_tracks: String,
    pub max_audio_bitrate: String,
    pub render_dimension_low: Option<RenderDimension>,
    pub render_dimension_standard: Option<RenderDimension>,
    pub render_dimension_high: Option<RenderDimension>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            track_switch_off_mode: None,
            dominant_speaker_priority: Some(TrackPriority::Standard),
            bandwidth_profile_mode: BandwidthProfileMode::Collaboration,
            max_tracks: DEFAULT_MAX_TRACKS.to_string(),
            max_audio_bitrate: DEFAULT_MAX_AUDIO_BITRATE.to_string(),
            render_dimension_low: Some(RenderDimension::Low),
            render_dimension_standard: Some(RenderDimension::P960),
            render_dimension_high: Some(RenderDimension::Wide1080p),
        }
    }
}

/// A single settings update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsAction {
    pub name: SettingName,
    pub value: String,
}

impl SettingsAction {
    pub fn new(name: SettingName, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }

    /// Action that resets `name` to its default.
    pub fn reset(name: SettingName) -> Self {
        Self::new(name, RESET_VALUE)
    }
}

/// Apply `action` to `state`, returning the next settings value.
///
/// # Errors
///
/// Returns `SettingsError::InvalidValue` if the value does not parse for the
/// targeted field. `state` is never modified.
pub fn settings_reducer(
    state: &Settings,
    action: &SettingsAction,
) -> Result<Settings, SettingsError> {
    let mut next = state.clone();
    let value = action.value.as_str();
    let name = action.name;

    match name {
        SettingName::TrackSwitchOffMode => {
            next.track_switch_off_mode = parse_optional(name, value)?;
        }
        SettingName::DominantSpeakerPriority => {
            next.dominant_speaker_priority = parse_optional(name, value)?;
        }
        SettingName::BandwidthProfileMode => {
            next.bandwidth_profile_mode = match parse_optional(name, value)? {
                Some(mode) => mode,
                None => Settings::default().bandwidth_profile_mode,
            };
        }
        SettingName::MaxTracks => {
            next.max_tracks = parse_numeric(name, value, DEFAULT_MAX_TRACKS)?;
        }
        SettingName::MaxAudioBitrate => {
            next.max_audio_bitrate = parse_numeric(name, value, DEFAULT_MAX_AUDIO_BITRATE)?;
        }
        SettingName::RenderDimensionLow => {
            next.render_dimension_low = parse_optional(name, value)?;
        }
        SettingName::RenderDimensionStandard => {
            next.render_dimension_standard = parse_optional(name, value)?;
        }
        SettingName::RenderDimensionHigh => {
            next.render_dimension_high = parse_optional(name, value)?;
        }
    }

    Ok(next)
}

fn parse_optional<T>(name: SettingName, value: &str) -> Result<Option<T>, SettingsError>
where
    T: FromStr<Err = ParseError>,
{
    if value == RESET_VALUE {
        return Ok(None);
    }

    value
        .parse::<T>()
        .map(Some)
        .map_err(|e| SettingsError::InvalidValue {
            setting: name,
            reason: e.to_string(),
        })
}

// Numeric settings stay strings (the SDK takes them verbatim); empty means
// "no limit".
fn parse_numeric(name: SettingName, value: &str, default: &str) -> Result<String, SettingsError> {
    if value == RESET_VALUE {
        return Ok(default.to_string());
    }

    if value.is_empty() || value.parse::<u32>().is_ok() {
        Ok(value.to_string())
    } else {
        Err(SettingsError::InvalidValue {
            setting: name,
            reason: format!("expected a non-negative integer, got '{}'", value),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_settings() {
        let settings = Settings::default();

        assert_eq!(settings.track_switch_off_mode, None);
        assert_eq!(
            settings.dominant_speaker_priority,
            Some(TrackPriority::Standard)
        );
        assert_eq!(
            settings.bandwidth_profile_mode,
            BandwidthProfileMode::Collaboration
        );
        assert_eq!(settings.max_tracks, "10");
        assert_eq!(settings.max_audio_bitrate, "16000");
        assert_eq!(settings.render_dimension_low, Some(RenderDimension::Low));
        assert_eq!(
            settings.render_dimension_standard,
            Some(RenderDimension::P960)
        );
        assert_eq!(
            settings.render_dimension_high,
            Some(RenderDimension::Wide1080p)
        );
    }

    #[test]
    fn test_reducer_sets_value() {
        let state = Settings::default();
        let action = SettingsAction::new(SettingName::TrackSwitchOffMode, "predicted");

        let next = settings_reducer(&state, &action).unwrap();

        assert_eq!(
            next.track_switch_off_mode,
            Some(TrackSwitchOffMode::Predicted)
        );
        // Other fields untouched
        assert_eq!(next.max_tracks, state.max_tracks);
        assert_eq!(next.bandwidth_profile_mode, state.bandwidth_profile_mode);
    }

    #[test]
    fn test_reducer_default_clears_optional_field() {
        let state = Settings::default();
        let next =
            settings_reducer(&state, &SettingsAction::reset(SettingName::RenderDimensionHigh))
                .unwrap();

        assert_eq!(next.render_dimension_high, None);
    }

    #[test]
    fn test_reducer_default_restores_required_field() {
        let mut state = Settings::default();
        state.bandwidth_profile_mode = BandwidthProfileMode::Grid;
        state.max_tracks = "3".to_string();

        let next = settings_reducer(
            &state,
            &SettingsAction::reset(SettingName::BandwidthProfileMode),
        )
        .unwrap();
        let next = settings_reducer(&next, &SettingsAction::reset(SettingName::MaxTracks)).unwrap();

        assert_eq!(
            next.bandwidth_profile_mode,
            BandwidthProfileMode::Collaboration
        );
        assert_eq!(next.max_tracks, DEFAULT_MAX_TRACKS);
    }

    #[test]
    fn test_reducer_accepts_empty_numeric_value() {
        let state = Settings::default();
        let next =
            settings_reducer(&state, &SettingsAction::new(SettingName::MaxTracks, "")).unwrap();
        assert_eq!(next.max_tracks, "");
    }

    #[test]
    fn test_reducer_rejects_invalid_values() {
        let state = Settings::default();

        let err = settings_reducer(
            &state,
            &SettingsAction::new(SettingName::MaxAudioBitrate, "loud"),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SettingsError::InvalidValue {
                setting: SettingName::MaxAudioBitrate,
                ..
            }
        ));

        let err = settings_reducer(
            &state,
            &SettingsAction::new(SettingName::RenderDimensionLow, "8k"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("render dimension"));
    }

    #[test]
    fn test_setting_name_round_trips_through_str() {
        let name: SettingName = "dominantSpeakerPriority".parse().unwrap();
        assert_eq!(name, SettingName::DominantSpeakerPriority);
        assert_eq!(name.to_string(), "dominantSpeakerPriority");

        assert_eq!(
            "volume".parse::<SettingName>().unwrap_err(),
            SettingsError::UnknownSetting("volume".to_string())
        );
    }

    #[test]
    fn test_action_deserializes_from_ui_payload() {
        let json = r#"{"name": "renderDimensionStandard", "value": "720p"}"#;
        let action: SettingsAction = serde_json::from_str(json).unwrap();

        let next = settings_reducer(&Settings::default(), &action).unwrap();
        assert_eq!(
            next.render_dimension_standard,
            Some(RenderDimension::P720)
        );
    }
}
