//! Video frame extraction through an external decoder.
//!
//! The default implementation shells out to `ffmpeg`. The child process is
//! killed when the extraction future is dropped, so abandoning a send never
//! leaves a decoder running.

use std::{
    path::{Path, PathBuf},
    process::Stdio,
    time::Duration,
};

use {async_trait::async_trait, courier_config::FfmpegConfig, tokio::process::Command, tracing::debug};

use crate::error::{Error, Result};

/// Binary name for the ffmpeg CLI.
const BINARY_NAME: &str = "ffmpeg";

/// File name of the extracted frame inside the scratch directory.
const FRAME_FILE_NAME: &str = "frame.jpg";

/// Pulls a single frame out of a video file.
#[async_trait]
pub trait FrameExtractor: Send + Sync {
    /// Write frame `frame_index` of `video` as an image inside `out_dir` and
    /// return its path.
    async fn extract_frame(&self, video: &Path, frame_index: u32, out_dir: &Path)
    -> Result<PathBuf>;
}

/// Find a binary at an explicit path or in PATH.
pub fn find_binary(name: &str, config_path: Option<&str>) -> Option<PathBuf> {
    if let Some(path_str) = config_path {
        let path = PathBuf::from(path_str);
        if path.is_file() {
            return Some(path);
        }
    }

    which::which(name).ok()
}

/// ffmpeg-backed frame extractor.
#[derive(Clone, Debug)]
pub struct FfmpegFrameExtractor {
    binary_path: Option<String>,
    timeout: Duration,
}

impl Default for FfmpegFrameExtractor {
    fn default() -> Self {
        Self::from_config(&FfmpegConfig::default())
    }
}

impl FfmpegFrameExtractor {
    #[must_use]
    pub fn from_config(config: &FfmpegConfig) -> Self {
        Self {
            binary_path: config.binary_path.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    fn build_command(&self, binary: &Path, video: &Path, frame_index: u32, output: &Path) -> Command {
        let mut cmd = Command::new(binary);
        cmd.arg("-hide_banner")
            .args(["-loglevel", "error"])
            .arg("-y")
            .arg("-i")
            .arg(video)
            .arg("-vf")
            .arg(format!("select=gte(n\\,{frame_index})"))
            .args(["-vframes", "1", "-f", "image2", "-vcodec", "mjpeg"])
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl FrameExtractor for FfmpegFrameExtractor {
    async fn extract_frame(
        &self,
        video: &Path,
        frame_index: u32,
        out_dir: &Path,
    ) -> Result<PathBuf> {
        let binary = find_binary(BINARY_NAME, self.binary_path.as_deref())
            .ok_or_else(|| Error::frame_extraction("ffmpeg binary not found in PATH"))?;
        let output = out_dir.join(FRAME_FILE_NAME);

        debug!(
            video = %video.display(),
            frame_index,
            binary = %binary.display(),
            "extracting video frame"
        );

        let child = self
            .build_command(&binary, video, frame_index, &output)
            .spawn()
            .map_err(|e| Error::frame_extraction(format!("failed to spawn ffmpeg: {e}")))?;

        let result = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                Error::frame_extraction(format!("ffmpeg timed out after {:?}", self.timeout))
            })?
            .map_err(|e| Error::frame_extraction(format!("failed to wait for ffmpeg: {e}")))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(Error::frame_extraction(format!(
                "ffmpeg exited with {}: {}",
                result.status,
                stderr.trim()
            )));
        }
        if !output.is_file() {
            return Err(Error::frame_extraction("ffmpeg produced no frame"));
        }

        Ok(output)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_selects_requested_frame() {
        let extractor = FfmpegFrameExtractor::default();
        let cmd = extractor.build_command(
            Path::new("/usr/bin/ffmpeg"),
            Path::new("/tmp/in.mp4"),
            1,
            Path::new("/tmp/out/frame.jpg"),
        );
        let args: Vec<String> = cmd
            .as_std()
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert!(args.contains(&"select=gte(n\\,1)".to_string()));
        assert_eq!(args.last().unwrap(), "/tmp/out/frame.jpg");
        let vframes = args.iter().position(|a| a == "-vframes").unwrap();
        assert_eq!(args[vframes + 1], "1");
    }

    #[test]
    fn find_binary_prefers_existing_explicit_path() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let explicit = file.path().to_str().unwrap();
        assert_eq!(
            find_binary("definitely-not-a-real-binary-xyz123", Some(explicit)),
            Some(file.path().to_path_buf())
        );
        assert!(find_binary("definitely-not-a-real-binary-xyz123", None).is_none());
    }

    #[tokio::test]
    async fn missing_binary_is_extraction_error() {
        let extractor = FfmpegFrameExtractor {
            binary_path: None,
            timeout: Duration::from_secs(1),
        };
        // Only meaningful where ffmpeg is absent.
        if which::which(BINARY_NAME).is_ok() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let err = extractor
            .extract_frame(Path::new("/nonexistent.mp4"), 1, dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::FrameExtraction { .. }));
    }
}
