//! ffmpeg invocation.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use shoutout_core::BoxFuture;
use tokio::process::Command;

use crate::error::TranscodeError;

/// Scales the logo to a third of the video width, makes it 70% opaque and
/// pins it to the bottom-right corner with a 0.5% margin.
pub const WATERMARK_FILTER: &str = "[1][0]scale2ref=h=ow/mdar:w=iw/3[logo][video];\
[logo]format=argb,colorchannelmixer=aa=0.7[logot];\
[video][logot]overlay=(main_w-w)-(main_w*0.005):(main_h-h)-(main_h*0.005)";

/// Turns a raw upload into a validated MP4.
pub trait VideoEncoder: Send + Sync {
    /// Writes `output` from `input`.
    fn encode<'a>(&'a self, input: &'a Path, output: &'a Path) -> BoxFuture<'a, Result<(), TranscodeError>>;

    /// Fails with [`TranscodeError::Encoding`] if `output` cannot be decoded.
    fn validate<'a>(&'a self, output: &'a Path) -> BoxFuture<'a, Result<(), TranscodeError>>;
}

/// [`VideoEncoder`] backed by the ffmpeg CLI.
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    ffmpeg_path: PathBuf,
    watermark_path: Option<PathBuf>,
}

impl FfmpegEncoder {
    /// Encoder using `ffmpeg_path`, overlaying `watermark_path` when given.
    #[must_use]
    pub const fn new(ffmpeg_path: PathBuf, watermark_path: Option<PathBuf>) -> Self {
        Self {
            ffmpeg_path,
            watermark_path,
        }
    }

    /// Arguments of the encoding run.
    #[must_use]
    pub fn encode_args(&self, input: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-y".into(), "-i".into(), input.into()];
        if let Some(watermark) = &self.watermark_path {
            args.extend([
                OsString::from("-i"),
                watermark.as_os_str().to_owned(),
                OsString::from("-filter_complex"),
                OsString::from(WATERMARK_FILTER),
            ]);
        }
        args.push(output.into());
        args
    }

    /// Arguments of the validation run.
    #[must_use]
    pub fn validate_args(output: &Path) -> Vec<OsString> {
        vec![
            "-v".into(),
            "error".into(),
            "-i".into(),
            output.into(),
            "-f".into(),
            "null".into(),
            "-".into(),
        ]
    }

    async fn run(&self, args: Vec<OsString>) -> Result<(bool, String), TranscodeError> {
        let output = Command::new(&self.ffmpeg_path)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| TranscodeError::Encoding(format!("failed to run ffmpeg: {e}")))?;
        Ok((
            output.status.success(),
            String::from_utf8_lossy(&output.stderr).into_owned(),
        ))
    }
}

impl VideoEncoder for FfmpegEncoder {
    fn encode<'a>(&'a self, input: &'a Path, output: &'a Path) -> BoxFuture<'a, Result<(), TranscodeError>> {
        Box::pin(async move {
            let (success, stderr) = self.run(self.encode_args(input, output)).await?;
            if !success {
                return Err(TranscodeError::Encoding(last_line(&stderr)));
            }
            Ok(())
        })
    }

    fn validate<'a>(&'a self, output: &'a Path) -> BoxFuture<'a, Result<(), TranscodeError>> {
        Box::pin(async move {
            let (_, stderr) = self.run(Self::validate_args(output)).await?;
            if !stderr.trim().is_empty() {
                return Err(TranscodeError::Encoding(last_line(&stderr)));
            }
            Ok(())
        })
    }
}

fn last_line(stderr: &str) -> String {
    stderr
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("ffmpeg exited with an error")
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn watermark_adds_second_input_and_filter() {
        let encoder = FfmpegEncoder::new("ffmpeg".into(), Some("/srv/logo-white.png".into()));
        let args = strings(&encoder.encode_args(Path::new("in.mov"), Path::new("out.mp4")));
        assert_eq!(
            args,
            vec![
                "-y",
                "-i",
                "in.mov",
                "-i",
                "/srv/logo-white.png",
                "-filter_complex",
                WATERMARK_FILTER,
                "out.mp4"
            ]
        );
    }

    #[test]
    fn plain_encode_without_watermark() {
        let encoder = FfmpegEncoder::new("ffmpeg".into(), None);
        let args = strings(&encoder.encode_args(Path::new("in.mov"), Path::new("out.mp4")));
        assert_eq!(args, vec!["-y", "-i", "in.mov", "out.mp4"]);
    }

    #[test]
    fn validation_discards_output() {
        let args = strings(&FfmpegEncoder::validate_args(Path::new("out.mp4")));
        assert_eq!(args, vec!["-v", "error", "-i", "out.mp4", "-f", "null", "-"]);
    }

    #[test]
    fn error_message_is_the_last_stderr_line() {
        assert_eq!(last_line("frame=1\nmoov atom not found\n\n"), "moov atom not found");
        assert_eq!(last_line(""), "ffmpeg exited with an error");
    }

    #[tokio::test]
    async fn missing_binary_is_an_encoding_error() {
        let encoder = FfmpegEncoder::new("/nonexistent/ffmpeg".into(), None);
        let result = encoder.encode(Path::new("in.mov"), Path::new("out.mp4")).await;
        assert!(matches!(result, Err(TranscodeError::Encoding(_))));
    }
}
