//! Alarm playback from a ringtone folder

use std::{
    fs::{self, File},
    io::{self, BufReader},
    path::{Path, PathBuf},
    sync::Arc,
    thread,
    time::Duration,
};
use rodio::{Decoder, OutputStream, Sink};
use thiserror::Error;
use tracing::{debug, info};

use crate::state::ControlState;

/// File extensions the player will pick up
pub const RINGTONE_EXTENSIONS: [&str; 3] = ["mp3", "wav", "ogg"];

/// How often a playing alarm checks the stop flag
const STOP_CHECK_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Error)]
pub enum AlarmError {
    #[error("Ringtone folder not found: {0}")]
    FolderMissing(PathBuf),

    #[error("No ringtones found in {0}")]
    NoRingtones(PathBuf),

    #[error("failed to read ringtone folder {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("no audio output device: {0}")]
    Stream(#[from] rodio::StreamError),

    #[error("failed to create audio sink: {0}")]
    Play(#[from] rodio::PlayError),

    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        source: rodio::decoder::DecoderError,
    },
}

/// One alarm to ring when a timer completes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmRequest {
    pub ringtone_hint: Option<String>,
    /// Loop until the stop flag is raised
    pub repeat: bool,
    /// Raise the final-alarm flag before playback starts
    pub mark_final: bool,
}

/// Something that can ring an alarm without blocking the caller
pub trait AlarmTrigger {
    fn ring(&self, request: AlarmRequest);
}

/// Plays ringtones from a folder on a detached thread per alarm
#[derive(Debug, Clone)]
pub struct AlarmPlayer {
    folder: PathBuf,
    control: Arc<ControlState>,
}

impl AlarmPlayer {
    pub fn new(folder: impl Into<PathBuf>, control: Arc<ControlState>) -> Self {
        Self {
            folder: folder.into(),
            control,
        }
    }

    /// Resolve the file to play for an optional name hint
    pub fn select(&self, hint: Option<&str>) -> Result<PathBuf, AlarmError> {
        let files = list_ringtones(&self.folder)?;
        let chosen = pick_ringtone(&files, hint)
            .ok_or_else(|| AlarmError::NoRingtones(self.folder.clone()))?;
        Ok(self.folder.join(chosen))
    }
}

impl AlarmTrigger for AlarmPlayer {
    fn ring(&self, request: AlarmRequest) {
        let path = match self.select(request.ringtone_hint.as_deref()) {
            Ok(path) => path,
            Err(e) => {
                self.control.report(e.to_string());
                return;
            }
        };

        // Raised here, before the thread starts, so the sequence runner sees
        // it as soon as the last countdown returns.
        if request.mark_final {
            self.control.mark_final_alarm();
        }

        info!("Ringing {} (repeat={})", path.display(), request.repeat);
        let control = Arc::clone(&self.control);
        thread::spawn(move || {
            if let Err(e) = play(&path, request.repeat, &control) {
                control.report(format!("Alarm playback failed: {}", e));
            }
        });
    }
}

/// Playable files in `folder`, sorted by name
pub fn list_ringtones(folder: &Path) -> Result<Vec<String>, AlarmError> {
    if !folder.is_dir() {
        return Err(AlarmError::FolderMissing(folder.to_path_buf()));
    }

    let entries = fs::read_dir(folder).map_err(|source| AlarmError::Io {
        path: folder.to_path_buf(),
        source,
    })?;

    let mut files: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| is_ringtone(name))
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(AlarmError::NoRingtones(folder.to_path_buf()));
    }
    Ok(files)
}

fn is_ringtone(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            RINGTONE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// First file starting with `hint`, else the first file
pub fn pick_ringtone<'a>(files: &'a [String], hint: Option<&str>) -> Option<&'a str> {
    hint.and_then(|hint| files.iter().find(|name| name.starts_with(hint)))
        .or_else(|| {
            if hint.is_some() {
                debug!("No ringtone matches {:?}, using the first one", hint);
            }
            files.first()
        })
        .map(String::as_str)
}

/// Blocking playback; returns once the clip ends, or the stop flag is seen
fn play(path: &Path, repeat: bool, control: &ControlState) -> Result<(), AlarmError> {
    let (_stream, handle) = OutputStream::try_default()?;
    let sink = Sink::try_new(&handle)?;

    loop {
        let file = File::open(path).map_err(|source| AlarmError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let source = Decoder::new(BufReader::new(file)).map_err(|source| AlarmError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        sink.append(source);

        while !sink.empty() {
            if repeat && control.is_alarm_stopped() {
                debug!("Stopping looping alarm mid-clip");
                sink.stop();
                return Ok(());
            }
            thread::sleep(STOP_CHECK_INTERVAL);
        }

        if !repeat || control.is_alarm_stopped() {
            return Ok(());
        }
    }
}
