//! ffmpeg / ffprobe backed [`ClipLoader`] and [`VideoEncoder`].
//!
//! Both tools run as child processes under `tokio::process`, bounded by the
//! timeouts in [`VideoConfig`].  A timed-out child is killed when its future
//! is dropped.
//!
//! Concatenation uses the `concat` filter rather than the concat demuxer so
//! clips with different sizes, frame rates or codecs can be mixed: every
//! input is scaled and padded to the first clip's frame size, normalised to
//! the configured frame rate, and audio is dropped.

use std::ffi::OsString;
use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;

use crate::config::VideoConfig;

use super::{ClipError, ClipHandle, ClipInfo, ClipLoader, EncodeError, VideoEncoder};

/// Frame size used when the first clip reports none.
const FALLBACK_SIZE: (u32, u32) = (640, 480);

/// Lines of stderr kept in error values.
const STDERR_TAIL_LINES: usize = 5;

// ---------------------------------------------------------------------------
// FfmpegBackend
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FfmpegBackend {
    config: VideoConfig,
}

impl FfmpegBackend {
    pub fn from_config(config: &VideoConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    fn probe_args(path: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=codec_name,width,height:format=duration",
            "-of",
            "json",
        ]
        .iter()
        .map(OsString::from)
        .collect();
        args.push(path.as_os_str().to_owned());
        args
    }

    fn concat_args(&self, clips: &[ClipHandle], output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-y", "-hide_banner", "-loglevel", "error", "-nostdin"]
            .iter()
            .map(OsString::from)
            .collect();

        for clip in clips {
            args.push("-i".into());
            args.push(clip.path.as_os_str().to_owned());
        }

        let (width, height) = target_size(clips);
        args.push("-filter_complex".into());
        args.push(concat_filter(clips.len(), width, height, self.config.frame_rate).into());

        for arg in [
            "-map",
            "[outv]",
            "-an",
            "-c:v",
            self.config.codec.as_str(),
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
            "-f",
            "mp4",
        ] {
            args.push(arg.into());
        }
        args.push(output.as_os_str().to_owned());
        args
    }
}

/// Run `program args…`, killing it if `timeout_secs` elapses first.
///
/// `Ok(None)` means the timeout fired.
async fn run(
    program: &str,
    args: &[OsString],
    timeout_secs: u64,
) -> std::io::Result<Option<Output>> {
    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output();

    match tokio::time::timeout(Duration::from_secs(timeout_secs), child).await {
        Ok(result) => result.map(Some),
        Err(_) => Ok(None),
    }
}

fn stderr_tail(output: &Output) -> String {
    let text = String::from_utf8_lossy(&output.stderr);
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

// ---------------------------------------------------------------------------
// Probe
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Turn ffprobe's JSON into a [`ClipInfo`].
fn parse_probe(stdout: &[u8]) -> Result<ClipInfo, ClipError> {
    let probe: ProbeOutput =
        serde_json::from_slice(stdout).map_err(|e| ClipError::InvalidOutput(e.to_string()))?;

    let stream = probe
        .streams
        .into_iter()
        .next()
        .ok_or(ClipError::NoVideoStream)?;

    let (width, height) = match (stream.width, stream.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        _ => return Err(ClipError::NoVideoStream),
    };

    let duration_secs = probe
        .format
        .and_then(|f| f.duration)
        .and_then(|d| d.parse::<f64>().ok());

    Ok(ClipInfo {
        width,
        height,
        duration_secs,
        codec: stream.codec_name,
    })
}

#[async_trait]
impl ClipLoader for FfmpegBackend {
    async fn load(&self, path: &Path) -> Result<ClipInfo, ClipError> {
        let timeout = self.config.probe_timeout_secs;
        let output = run(&self.config.ffprobe_bin, &Self::probe_args(path), timeout)
            .await
            .map_err(|e| ClipError::Spawn(format!("{}: {e}", self.config.ffprobe_bin)))?
            .ok_or(ClipError::Timeout(timeout))?;

        if !output.status.success() {
            return Err(ClipError::Probe {
                status: output.status.code().unwrap_or(-1),
                stderr: stderr_tail(&output),
            });
        }
        parse_probe(&output.stdout)
    }
}

// ---------------------------------------------------------------------------
// Encode
// ---------------------------------------------------------------------------

/// Output frame size: the first clip's, rounded down to even numbers for
/// yuv420p.
fn target_size(clips: &[ClipHandle]) -> (u32, u32) {
    let (w, h) = clips
        .first()
        .map(|c| (c.info.width, c.info.height))
        .filter(|&(w, h)| w >= 2 && h >= 2)
        .unwrap_or(FALLBACK_SIZE);
    (w & !1, h & !1)
}

/// `[0:v]scale…[v0];[1:v]scale…[v1];[v0][v1]concat=n=2:v=1:a=0[outv]`
fn concat_filter(inputs: usize, width: u32, height: u32, fps: u32) -> String {
    let mut graph = String::new();
    for i in 0..inputs {
        graph.push_str(&format!(
            "[{i}:v]scale={width}:{height}:force_original_aspect_ratio=decrease,\
             pad={width}:{height}:(ow-iw)/2:(oh-ih)/2,setsar=1,fps={fps}[v{i}];"
        ));
    }
    for i in 0..inputs {
        graph.push_str(&format!("[v{i}]"));
    }
    graph.push_str(&format!("concat=n={inputs}:v=1:a=0[outv]"));
    graph
}

#[async_trait]
impl VideoEncoder for FfmpegBackend {
    async fn encode(&self, clips: &[ClipHandle], output: &Path) -> Result<(), EncodeError> {
        let timeout = self.config.encode_timeout_secs;
        let args = self.concat_args(clips, output);

        let out = run(&self.config.ffmpeg_bin, &args, timeout)
            .await
            .map_err(|e| EncodeError::Spawn(format!("{}: {e}", self.config.ffmpeg_bin)))?
            .ok_or(EncodeError::Timeout(timeout))?;

        if !out.status.success() {
            return Err(EncodeError::Failed {
                status: out.status.code().unwrap_or(-1),
                stderr: stderr_tail(&out),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
