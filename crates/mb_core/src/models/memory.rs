//! Memory drafts and the payload sent to the create/update memory endpoint.

use chrono::{Datelike, Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::media::Media;

/// Marker colors offered when a memory has none.
pub const COLOR_PALETTE: [&str; 8] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#FFA07A", "#98D8C8", "#F7DC6F", "#BB8FCE", "#85C1E2",
];

/// Longest title accepted, in characters after trimming.
pub const MAX_TITLE_CHARS: usize = 200;

/// Longest description accepted, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 2000;

static HEX_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#([A-Fa-f0-9]{6}|[A-Fa-f0-9]{3})$").expect("valid color pattern"));

static SPOTIFY_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(https://open\.spotify\.com/(track|album|playlist)/|spotify:(track|album|playlist):)[a-zA-Z0-9]+",
    )
    .expect("valid spotify pattern")
});

/// Errors raised while validating a memory draft.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PayloadError {
    #[error("Title is required")]
    MissingTitle,

    #[error("Title must be at most {max} characters")]
    TitleTooLong { max: usize },

    #[error("Description must be at most {max} characters")]
    DescriptionTooLong { max: usize },

    #[error("Color '{0}' is not a hex color like #RRGGBB or #RGB")]
    InvalidColor(String),

    #[error("'{0}' is not a Spotify track, album or playlist link")]
    InvalidMusicLink(String),

    #[error("Location is required")]
    MissingLocation,

    #[error("Location {lat}, {lng} is out of range")]
    InvalidLocation { lat: f64, lng: f64 },

    #[error("Date is required")]
    MissingDate,

    #[error("Date '{0}' is not in YYYY-MM-DD format")]
    InvalidDate(String),

    #[error("Date cannot be more than 1 year in the future")]
    DateTooFarAhead,

    #[error("Date cannot be more than 150 years in the past")]
    DateTooFarBehind,
}

/// Result type for payload operations.
pub type PayloadResult<T> = Result<T, PayloadError>;

/// Song attached to a memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Music {
    pub title: String,
    pub artist: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spotify_id: Option<String>,
    /// Preview offset in seconds.
    #[serde(rename = "startTime", default)]
    pub start_time: f64,
    /// Preview length in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Spotify page or URI for the song.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
}

impl Music {
    pub fn validate(&self) -> PayloadResult<()> {
        match self.external_url.as_deref() {
            Some(link) if !SPOTIFY_LINK.is_match(link.trim()) => {
                Err(PayloadError::InvalidMusicLink(link.to_string()))
            }
            _ => Ok(()),
        }
    }
}

/// Form state for a memory before media is attached.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Calendar date, `YYYY-MM-DD`.
    pub date: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    #[serde(default)]
    pub music: Option<Music>,
    #[serde(default)]
    pub color: Option<String>,
}

impl MemoryDraft {
    /// Validate against today's date.
    pub fn validate(&self) -> PayloadResult<()> {
        self.validate_at(Local::now().date_naive())
    }

    /// Validate against a given "today".
    pub fn validate_at(&self, today: NaiveDate) -> PayloadResult<()> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(PayloadError::MissingTitle);
        }
        if title.chars().count() > MAX_TITLE_CHARS {
            return Err(PayloadError::TitleTooLong {
                max: MAX_TITLE_CHARS,
            });
        }
        if self.description.chars().count() > MAX_DESCRIPTION_CHARS {
            return Err(PayloadError::DescriptionTooLong {
                max: MAX_DESCRIPTION_CHARS,
            });
        }

        let (Some(lat), Some(lng)) = (self.lat, self.lng) else {
            return Err(PayloadError::MissingLocation);
        };
        if !lat.is_finite() || !lng.is_finite() || lat.abs() > 90.0 || lng.abs() > 180.0 {
            return Err(PayloadError::InvalidLocation { lat, lng });
        }

        let date = self.date.trim();
        if date.is_empty() {
            return Err(PayloadError::MissingDate);
        }
        let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| PayloadError::InvalidDate(date.to_string()))?;
        if parsed.year() > today.year() + 1 {
            return Err(PayloadError::DateTooFarAhead);
        }
        if parsed.year() < today.year() - 150 {
            return Err(PayloadError::DateTooFarBehind);
        }

        // A blank color means "pick one from the palette".
        if let Some(color) = self.color.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            if !HEX_COLOR.is_match(color) {
                return Err(PayloadError::InvalidColor(color.to_string()));
            }
        }

        if let Some(music) = &self.music {
            music.validate()?;
        }

        Ok(())
    }

    /// Marker color, falling back to a palette entry derived from the title.
    pub fn resolved_color(&self) -> String {
        if let Some(color) = self.color.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            return color.to_string();
        }
        let index = self.title.bytes().map(usize::from).sum::<usize>() % COLOR_PALETTE.len();
        COLOR_PALETTE[index].to_string()
    }

    /// Validate and combine with attached media into the request body.
    pub fn into_payload(self, media: &[Media]) -> PayloadResult<MemoryPayload> {
        self.validate()?;
        Ok(self.assemble(media))
    }

    fn assemble(self, media: &[Media]) -> MemoryPayload {
        let mut photos = Vec::new();
        let mut videos = Vec::new();
        for item in media {
            match item {
                Media::Photo { data } => photos.push(data.as_str().to_string()),
                Media::Video { data } | Media::TrimmedVideo { data, .. } => {
                    videos.push(data.as_str().to_string())
                }
            }
        }

        let color = self.resolved_color();
        MemoryPayload {
            title: self.title.trim().to_string(),
            description: self.description,
            date: self.date.trim().to_string(),
            lat: self.lat.unwrap_or_default(),
            lng: self.lng.unwrap_or_default(),
            photos,
            videos,
            music: self.music,
            color,
        }
    }
}

/// JSON body for the create/update memory endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryPayload {
    pub title: String,
    pub description: String,
    pub date: String,
    pub lat: f64,
    pub lng: f64,
    pub photos: Vec<String>,
    pub videos: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub music: Option<Music>,
    pub color: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EncodedMedia, TrimWindow};

    fn draft() -> MemoryDraft {
        MemoryDraft {
            title: "  Lisbon trip ".to_string(),
            description: "Tram 28".to_string(),
            date: "2024-05-10".to_string(),
            lat: Some(38.71),
            lng: Some(-9.14),
            ..Default::default()
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    #[test]
    fn validate_requires_title_location_and_date() {
        let mut d = draft();
        d.title = "   ".to_string();
        assert_eq!(d.validate_at(today()), Err(PayloadError::MissingTitle));

        let mut d = draft();
        d.lng = None;
        assert_eq!(d.validate_at(today()), Err(PayloadError::MissingLocation));

        let mut d = draft();
        d.date = String::new();
        assert_eq!(d.validate_at(today()), Err(PayloadError::MissingDate));

        let mut d = draft();
        d.date = "10/05/2024".to_string();
        assert!(matches!(
            d.validate_at(today()),
            Err(PayloadError::InvalidDate(_))
        ));

        assert_eq!(draft().validate_at(today()), Ok(()));
    }

    #[test]
    fn validate_bounds_dates() {
        let mut d = draft();
        d.date = "2027-01-01".to_string();
        assert_eq!(d.validate_at(today()), Err(PayloadError::DateTooFarAhead));

        d.date = "1870-06-01".to_string();
        assert_eq!(d.validate_at(today()), Err(PayloadError::DateTooFarBehind));

        d.date = "2026-12-31".to_string();
        assert_eq!(d.validate_at(today()), Ok(()));
    }

    #[test]
    fn validate_limits_title_and_description_length() {
        let mut d = draft();
        d.title = format!("  {}  ", "a".repeat(MAX_TITLE_CHARS));
        assert_eq!(d.validate_at(today()), Ok(()));

        d.title = "é".repeat(MAX_TITLE_CHARS + 1);
        assert_eq!(
            d.validate_at(today()),
            Err(PayloadError::TitleTooLong { max: 200 })
        );

        let mut d = draft();
        d.description = "x".repeat(MAX_DESCRIPTION_CHARS + 1);
        assert_eq!(
            d.validate_at(today()),
            Err(PayloadError::DescriptionTooLong { max: 2000 })
        );
    }

    #[test]
    fn validate_checks_hex_color() {
        let mut d = draft();
        for ok in ["#4ECDC4", "#abc", "  "] {
            d.color = Some(ok.to_string());
            assert_eq!(d.validate_at(today()), Ok(()), "{ok}");
        }

        for bad in ["banana", "#12345", "4ECDC4", "#GGGGGG"] {
            d.color = Some(bad.to_string());
            assert_eq!(
                d.validate_at(today()),
                Err(PayloadError::InvalidColor(bad.to_string()))
            );
        }
    }

    #[test]
    fn validate_checks_music_link() {
        let song = |link: &str| Music {
            title: "Song".to_string(),
            artist: "Band".to_string(),
            preview_url: None,
            spotify_id: None,
            start_time: 0.0,
            duration: None,
            external_url: Some(link.to_string()),
        };

        let mut d = draft();
        for ok in [
            "https://open.spotify.com/track/4uLU6hMCjMI75M1A2tKUQC",
            "https://open.spotify.com/album/abc123",
            "https://open.spotify.com/playlist/xyz",
            "spotify:track:4uLU6hMCjMI75M1A2tKUQC",
        ] {
            d.music = Some(song(ok));
            assert_eq!(d.validate_at(today()), Ok(()), "{ok}");
        }

        for bad in [
            "https://example.com/track/1",
            "https://open.spotify.com/artist/abc",
            "spotify:episode:abc",
        ] {
            d.music = Some(song(bad));
            assert_eq!(
                d.validate_at(today()),
                Err(PayloadError::InvalidMusicLink(bad.to_string()))
            );
        }
    }

    #[test]
    fn into_payload_rejects_invalid_color() {
        let mut d = draft();
        d.color = Some("banana".to_string());
        assert!(matches!(
            d.into_payload(&[]),
            Err(PayloadError::InvalidColor(_))
        ));
    }

    #[test]
    fn payload_splits_photos_and_videos() {
        let photo = EncodedMedia::from_bytes("image/png", b"p");
        let video = EncodedMedia::from_bytes("video/mp4", b"v");
        let clip = EncodedMedia::from_bytes("video/webm", b"c");
        let media = vec![
            Media::Photo {
                data: photo.clone(),
            },
            Media::Video {
                data: video.clone(),
            },
            Media::TrimmedVideo {
                data: clip.clone(),
                window: TrimWindow::suggest(45.0, 30.0).unwrap(),
            },
        ];

        let payload = draft().assemble(&media);
        assert_eq!(payload.title, "Lisbon trip");
        assert_eq!(payload.photos, vec![photo.into_string()]);
        assert_eq!(
            payload.videos,
            vec![video.into_string(), clip.into_string()]
        );

        let json = serde_json::to_value(&payload).unwrap();
        assert!(json["photos"].is_array());
        assert!(json["videos"].is_array());
        assert!(json.get("music").is_none());
    }

    #[test]
    fn color_falls_back_to_palette() {
        let d = draft();
        assert!(COLOR_PALETTE.contains(&d.resolved_color().as_str()));
        assert_eq!(d.resolved_color(), d.resolved_color());

        let mut custom = draft();
        custom.color = Some("#000000".to_string());
        assert_eq!(custom.resolved_color(), "#000000");
    }

    #[test]
    fn music_uses_camel_case_start_time() {
        let music = Music {
            title: "Song".to_string(),
            artist: "Band".to_string(),
            preview_url: None,
            spotify_id: Some("abc".to_string()),
            start_time: 12.0,
            duration: Some(30.0),
            external_url: None,
        };
        let json = serde_json::to_value(&music).unwrap();
        assert_eq!(json["startTime"], 12.0);
        assert_eq!(json["spotify_id"], "abc");
    }
}
