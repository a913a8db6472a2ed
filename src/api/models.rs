/// Payload types for the analysis backend
///
/// These structs mirror the JSON returned by `POST /analyze` and
/// `GET /health`. Fields the server may omit are `Option`; unknown
/// fields are ignored so backend additions don't break the client.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Successful response of `POST /analyze`
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisResponse {
    /// Response envelope flag, absent on older backends
    #[serde(default = "default_success")]
    pub success: bool,
    /// Features extracted from the uploaded image
    pub image_features: ImageFeatures,
    /// Recommended tracks, ranked by the backend
    pub recommendations: Vec<Track>,
}

fn default_success() -> bool {
    true
}

/// One recommended song
#[derive(Debug, Clone, Deserialize)]
pub struct Track {
    /// Streaming-service track ID
    pub id: String,
    /// Track title
    pub name: String,
    /// Credited artists, in display order
    pub artists: Vec<Artist>,
    /// Album the track appears on
    pub album: Album,
    /// 30-second audio clip, not available for every track
    pub preview_url: Option<String>,
    /// Link to the track on the streaming service
    pub external_url: Option<String>,
    /// Why this track matched the image
    pub match_factors: Option<MatchFactors>,
}

impl Track {
    /// Artist names joined for display ("Artist X, Artist Y")
    pub fn artist_line(&self) -> String {
        self.artists
            .iter()
            .map(|artist| artist.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A credited artist
#[derive(Debug, Clone, Deserialize)]
pub struct Artist {
    pub name: String,
}

/// Album metadata
#[derive(Debug, Clone, Deserialize)]
pub struct Album {
    pub name: String,
    /// Cover artwork, absent for some releases
    pub image_url: Option<String>,
}

/// Image-analysis context attached to each recommendation
#[derive(Debug, Clone, Deserialize)]
pub struct MatchFactors {
    /// Genres the image mapped to
    #[serde(default)]
    pub genres: Vec<String>,
}

/// Structured output of the image analysis
#[derive(Debug, Clone, Deserialize)]
pub struct ImageFeatures {
    /// Detected objects/scenes
    #[serde(default)]
    pub labels: Vec<Label>,
    /// Emotion name -> intensity (0 to 5); BTreeMap keeps render order stable
    #[serde(default)]
    pub emotions: BTreeMap<String, f32>,
    /// Dominant image colors, strongest first
    #[serde(default)]
    pub dominant_colors: Vec<DominantColor>,
}

/// One detected object or scene
#[derive(Debug, Clone, Deserialize)]
pub struct Label {
    pub description: String,
}

/// A dominant color of the image
#[derive(Debug, Clone, Deserialize)]
pub struct DominantColor {
    pub rgb: Rgb,
}

/// RGB triple; the analysis service reports float channel values
#[derive(Debug, Clone, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    /// Channel values clamped into displayable 8-bit range
    pub fn channels(&self) -> [u8; 3] {
        [clamp_channel(self.r), clamp_channel(self.g), clamp_channel(self.b)]
    }
}

fn clamp_channel(value: f32) -> u8 {
    value.clamp(0.0, 255.0) as u8
}

/// Body of `GET /health`
#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Body the backend sends alongside non-2xx statuses
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_response() {
        let json = r#"{
            "success": true,
            "recommendations": [{
                "id": "t1",
                "name": "Song A",
                "artists": [{"name": "Artist X"}],
                "album": {"name": "Album Y", "image_url": null},
                "preview_url": null,
                "external_url": "https://open.spotify.com/track/t1",
                "match_factors": {"energy": 0.8, "valence": 0.6, "genres": ["pop", "dance"]}
            }],
            "image_features": {
                "labels": [{"description": "beach", "score": 0.97}],
                "emotions": {"joy": 3, "sadness": 0},
                "dominant_colors": [{"rgb": {"r": 217.0, "g": 180.5, "b": 90.0}, "score": 0.4}]
            }
        }"#;

        let response: AnalysisResponse = serde_json::from_str(json).unwrap();
        assert!(response.success);

        let track = &response.recommendations[0];
        assert_eq!(track.id, "t1");
        assert_eq!(track.artist_line(), "Artist X");
        assert_eq!(track.album.name, "Album Y");
        assert!(track.album.image_url.is_none());
        assert!(track.preview_url.is_none());
        assert_eq!(
            track.external_url.as_deref(),
            Some("https://open.spotify.com/track/t1")
        );
        assert_eq!(
            track.match_factors.as_ref().unwrap().genres,
            vec!["pop", "dance"]
        );

        let features = &response.image_features;
        assert_eq!(features.labels[0].description, "beach");
        assert_eq!(features.emotions["joy"], 3.0);
        assert_eq!(features.emotions["sadness"], 0.0);
        assert_eq!(features.dominant_colors[0].rgb.channels(), [217, 180, 90]);
    }

    #[test]
    fn test_success_flag_defaults_to_true() {
        let json = r#"{"recommendations": [], "image_features": {}}"#;
        let response: AnalysisResponse = serde_json::from_str(json).unwrap();
        assert!(response.success);
        assert!(response.recommendations.is_empty());
        assert!(response.image_features.labels.is_empty());
    }

    #[test]
    fn test_multiple_artists_joined_by_comma() {
        let json = r#"{
            "id": "t2",
            "name": "Duet",
            "artists": [{"name": "A"}, {"name": "B"}],
            "album": {"name": "Singles", "image_url": null},
            "preview_url": "https://p.scdn.co/mp3-preview/t2",
            "external_url": null,
            "match_factors": null
        }"#;
        let track: Track = serde_json::from_str(json).unwrap();
        assert_eq!(track.artist_line(), "A, B");
    }

    #[test]
    fn test_health_status() {
        let healthy: HealthResponse = serde_json::from_str(r#"{"status": "ok"}"#).unwrap();
        assert!(healthy.is_ok());

        let degraded: HealthResponse = serde_json::from_str(r#"{"status": "down"}"#).unwrap();
        assert!(!degraded.is_ok());
    }
}
