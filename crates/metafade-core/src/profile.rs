// File: crates/metafade-core/src/profile.rs

//! Which fields a scrub clears.

use exif::{Field, Tag};
use serde::{Deserialize, Serialize};

/// Privacy-sensitive tags removed by every scrub.
///
/// Image length/width, flash and file source are deliberately absent.
/// GPS is handled separately by [`GpsPolicy`].
pub const CLEAR_LIST: &[Tag] = &[
    Tag::Artist,
    Tag::CameraOwnerName,
    Tag::Copyright,
    Tag::ExifVersion,
    Tag::ImageDescription,
    Tag::ImageUniqueID,
    Tag::LensMake,
    Tag::LensModel,
    Tag::LensSerialNumber,
    Tag::LensSpecification,
    Tag::Make,
    Tag::MakerNote,
    Tag::Model,
    Tag::Software,
    Tag::UserComment,
    Tag::BodySerialNumber,
    Tag::DateTime,
    Tag::DateTimeDigitized,
    Tag::DateTimeOriginal,
    Tag::DeviceSettingDescription,
    Tag::RelatedSoundFile,
];

/// What happens to the GPS IFD.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GpsPolicy {
    /// Replace every GPS field with a latitude/longitude of (0.0, 0.0).
    #[default]
    Zero,
    /// Drop the GPS IFD altogether.
    Remove,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrubProfile {
    pub gps: GpsPolicy,
    /// Additional tags to clear, by name ("GPSAltitude", "Orientation") or
    /// hex number ("0x9286").
    pub extra_tags: Vec<String>,
}

impl ScrubProfile {
    /// Whether `field` is cleared. GPS fields are decided by [`GpsPolicy`]
    /// and never match here unless listed in `extra_tags`.
    pub fn clears(&self, field: &Field) -> bool {
        CLEAR_LIST.contains(&field.tag) || self.is_extra(field.tag)
    }

    fn is_extra(&self, tag: Tag) -> bool {
        if self.extra_tags.is_empty() {
            return false;
        }
        let name = tag.to_string();
        let number = format!("{:#06x}", tag.number());
        self.extra_tags
            .iter()
            .map(|extra| extra.trim())
            .any(|extra| extra.eq_ignore_ascii_case(&name) || extra.eq_ignore_ascii_case(&number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exif::{In, Value};

    fn field(tag: Tag) -> Field {
        Field {
            tag,
            ifd_num: In::PRIMARY,
            value: Value::Short(vec![1]),
        }
    }

    #[test]
    fn default_profile_clears_exactly_the_clear_list() {
        let profile = ScrubProfile::default();
        assert_eq!(CLEAR_LIST.len(), 21);
        for tag in CLEAR_LIST {
            assert!(profile.clears(&field(*tag)), "{tag} should be cleared");
        }
        for tag in [Tag::ImageLength, Tag::ImageWidth, Tag::Flash, Tag::FileSource] {
            assert!(!profile.clears(&field(tag)), "{tag} should be kept");
        }
    }

    #[test]
    fn extra_tags_match_by_name_or_number() {
        let profile = ScrubProfile {
            extra_tags: vec!["orientation".to_string(), "0x8827".to_string()],
            ..Default::default()
        };
        assert!(profile.clears(&field(Tag::Orientation)));
        assert!(profile.clears(&field(Tag::PhotographicSensitivity)));
        assert!(!profile.clears(&field(Tag::ExposureTime)));
    }

    #[test]
    fn gps_policy_deserializes_lowercase() {
        let profile: ScrubProfile = serde_json::from_str(r#"{"gps":"remove"}"#).unwrap();
        assert_eq!(profile.gps, GpsPolicy::Remove);
        assert!(profile.extra_tags.is_empty());
    }
}
