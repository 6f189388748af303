//! Config schema for the outbound composition layer.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourierConfig {
    pub thumbnail: ThumbnailConfig,
    pub ffmpeg: FfmpegConfig,
    pub send: SendConfig,
    pub logging: LoggingConfig,
}

/// Preview generation for image, gif and video sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailConfig {
    /// Longest side of the generated preview, in pixels.
    pub max_dimension: u32,
    /// JPEG quality, 1..=100.
    pub jpeg_quality: u8,
    /// Zero-based frame used for video previews. Frame 0 is often black.
    pub video_frame_index: u32,
    /// When false, media is sent without a preview.
    pub enabled: bool,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            max_dimension: 200,
            jpeg_quality: 80,
            video_frame_index: 1,
            enabled: true,
        }
    }
}

/// External video decoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FfmpegConfig {
    /// Explicit binary path; falls back to `ffmpeg` in PATH.
    pub binary_path: Option<String>,
    pub timeout_secs: u64,
}

impl Default for FfmpegConfig {
    fn default() -> Self {
        Self {
            binary_path: None,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SendConfig {
    /// Upper bound for a whole compose-and-send call. Unbounded when unset.
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let cfg: CourierConfig = toml::from_str("").unwrap();
        assert_eq!(cfg, CourierConfig::default());
        assert_eq!(cfg.thumbnail.max_dimension, 200);
        assert_eq!(cfg.thumbnail.jpeg_quality, 80);
        assert_eq!(cfg.thumbnail.video_frame_index, 1);
        assert!(cfg.thumbnail.enabled);
        assert_eq!(cfg.ffmpeg.timeout_secs, 30);
        assert!(cfg.send.timeout_secs.is_none());
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let cfg: CourierConfig = toml::from_str(
            r#"
            [thumbnail]
            max_dimension = 320

            [send]
            timeout_secs = 15
            "#,
        )
        .unwrap();
        assert_eq!(cfg.thumbnail.max_dimension, 320);
        assert_eq!(cfg.thumbnail.jpeg_quality, 80);
        assert_eq!(cfg.send.timeout_secs, Some(15));
        assert!(cfg.ffmpeg.binary_path.is_none());
    }

    #[test]
    fn yaml_and_json_share_the_schema() {
        let yaml: CourierConfig =
            serde_yaml::from_str("ffmpeg:\n  binary_path: /opt/ffmpeg\nlogging:\n  json: true\n")
                .unwrap();
        let json: CourierConfig = serde_json::from_str(
            r#"{"ffmpeg":{"binary_path":"/opt/ffmpeg"},"logging":{"json":true}}"#,
        )
        .unwrap();
        assert_eq!(yaml, json);
        assert_eq!(yaml.ffmpeg.binary_path.as_deref(), Some("/opt/ffmpeg"));
    }
}
