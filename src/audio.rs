//! Audio header probing using symphonia.
//!
//! Only the container is inspected: codec parameters give the sample rate
//! and, for most formats, the frame count.  Nothing is decoded.

use std::fs::File;
use std::path::Path;

use log::debug;
use symphonia::core::codecs::CODEC_TYPE_NULL;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::data::model::AudioInfo;
use crate::error::ProbeError;

/// Source of per-file audio properties.
pub trait AudioProbe {
    fn info(&self, path: &Path) -> Result<AudioInfo, ProbeError>;
}

/// Header-only probe backed by symphonia's format readers.
#[derive(Debug, Default, Clone, Copy)]
pub struct SymphoniaProbe;

impl AudioProbe for SymphoniaProbe {
    fn info(&self, path: &Path) -> Result<AudioInfo, ProbeError> {
        get_audio_info(path)
    }
}

/// Frame count, sample rate and duration of the first audio track of
/// `path`.
pub fn get_audio_info(path: &Path) -> Result<AudioInfo, ProbeError> {
    let mut format = open_format(path)?;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| ProbeError::NoAudioTrack(path.to_path_buf()))?;
    let track_id = track.id;
    let header_frames = track.codec_params.n_frames;
    let sr = track
        .codec_params
        .sample_rate
        .ok_or_else(|| ProbeError::UnknownSampleRate(path.to_path_buf()))?;

    let frames = match header_frames {
        Some(n) => n,
        None => {
            debug!("{}: no frame count in header, walking packets", path.display());
            count_frames(format.as_mut(), track_id).map_err(|source| ProbeError::Format {
                path: path.to_path_buf(),
                source,
            })?
        }
    };

    AudioInfo::new(frames, sr).ok_or_else(|| ProbeError::ZeroSampleRate(path.to_path_buf()))
}

/// Open `path` and probe its container format, using the extension as hint.
fn open_format(path: &Path) -> Result<Box<dyn FormatReader>, ProbeError> {
    let file = File::open(path).map_err(|source| ProbeError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(extension);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|source| ProbeError::Format {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(probed.format)
}

/// Sum packet durations of one track without decoding them.
fn count_frames(format: &mut dyn FormatReader, track_id: u32) -> Result<u64, SymphoniaError> {
    let mut frames = 0u64;
    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(e) => return Err(e),
        };
        if packet.track_id() == track_id {
            frames += packet.dur();
        }
    }
    Ok(frames)
}
