//! Symphonia-backed decoding of audio files into in-memory assets.

use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Arc;

use log::{debug, warn};
use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::Sample;

use crate::audio::spec::AudioSpec;

use super::{Asset, AssetLoadError, AssetLoader};

/// Loader that decodes files from disk and conforms them to a mixer spec.
///
/// Every call decodes the file again; wrap it in a
/// [`CachingLoader`](super::CachingLoader) to reuse assets.
#[derive(Debug, Clone)]
pub struct SymphoniaLoader {
    spec: AudioSpec,
}

impl SymphoniaLoader {
    pub fn new(spec: AudioSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &AudioSpec {
        &self.spec
    }
}

impl AssetLoader for SymphoniaLoader {
    fn load(&self, path: &str) -> Result<Arc<Asset>, AssetLoadError> {
        let asset = decode_file(path)?;
        if asset.sample_rate() != self.spec.frequency {
            return Err(AssetLoadError::UnsupportedFormat(format!(
                "{}: sample rate {} Hz does not match mixer frequency {} Hz",
                path,
                asset.sample_rate(),
                self.spec.frequency
            )));
        }

        let sample_rate = asset.sample_rate();
        let channels = remap_channels(asset.channels, self.spec.channel_count());
        let asset = Asset::from_channels(sample_rate, channels)?;
        debug!(
            "loaded {}: {} samples x {} channel(s)",
            path,
            asset.duration_samples(),
            asset.channel_count()
        );
        Ok(Arc::new(asset))
    }
}

/// Decode the first playable track of a file, keeping its native layout.
///
/// # Errors
/// Returns [`AssetLoadError::NotFound`] for missing files, and a decode or
/// format error when the file cannot be probed or decoded.
pub fn decode_file(path: &str) -> Result<Asset, AssetLoadError> {
    let mut format = open_reader(path)?;

    let (track_id, codec_params) = format
        .tracks()
        .iter()
        .find(|track| track.codec_params.codec != CODEC_TYPE_NULL)
        .map(|track| (track.id, track.codec_params.clone()))
        .ok_or_else(|| {
            AssetLoadError::UnsupportedFormat(format!("{}: no decodable audio track", path))
        })?;
    let sample_rate = codec_params
        .sample_rate
        .ok_or_else(|| AssetLoadError::Decode(format!("{}: missing sample rate", path)))?;

    let mut decoder =
        symphonia::default::get_codecs().make(&codec_params, &DecoderOptions::default())?;
    let mut channels: Vec<Vec<f32>> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(Error::IoError(err)) if err.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(Error::ResetRequired) => {
                return Err(AssetLoadError::Decode(format!(
                    "{}: decoder reset required",
                    path
                )));
            }
            Err(err) => return Err(err.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => append_decoded(decoded, &mut channels),
            Err(Error::DecodeError(err)) => {
                warn!("decode error in {}: {}", path, err);
            }
            Err(Error::IoError(err)) if err.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(err) => return Err(err.into()),
        }
    }

    Asset::from_channels(sample_rate, channels).map_err(|err| match err {
        AssetLoadError::Empty(_) => AssetLoadError::Empty(path.to_string()),
        other => other,
    })
}

fn open_reader(path: &str) -> Result<Box<dyn FormatReader>, AssetLoadError> {
    let src = File::open(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => AssetLoadError::NotFound(path.to_string()),
        _ => AssetLoadError::Io(err),
    })?;
    let mss = MediaSourceStream::new(Box::new(src), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = Path::new(path).extension().and_then(|ext| ext.to_str()) {
        hint.with_extension(extension);
    }

    let meta_opts: MetadataOptions = Default::default();
    let fmt_opts: FormatOptions = Default::default();
    let probed = symphonia::default::get_probe().format(&hint, mss, &fmt_opts, &meta_opts)?;

    Ok(probed.format)
}

fn append_decoded(decoded: AudioBufferRef<'_>, channels: &mut Vec<Vec<f32>>) {
    match decoded {
        AudioBufferRef::U8(buf) => append_channels(&*buf, channels, convert_unsigned_8bit_to_f32),
        AudioBufferRef::S8(buf) => append_channels(&*buf, channels, convert_signed_8bit_to_f32),
        AudioBufferRef::U16(buf) => {
            append_channels(&*buf, channels, convert_unsigned_16bit_to_f32)
        }
        AudioBufferRef::S16(buf) => append_channels(&*buf, channels, convert_signed_16bit_to_f32),
        AudioBufferRef::U24(buf) => append_channels(&*buf, channels, |s| {
            convert_unsigned_24bit_to_f32(s.0)
        }),
        AudioBufferRef::S24(buf) => {
            append_channels(&*buf, channels, |s| convert_signed_24bit_to_f32(s.0))
        }
        AudioBufferRef::U32(buf) => {
            append_channels(&*buf, channels, convert_unsigned_32bit_to_f32)
        }
        AudioBufferRef::S32(buf) => append_channels(&*buf, channels, convert_signed_32bit_to_f32),
        AudioBufferRef::F32(buf) => append_channels(&*buf, channels, |s| s),
        AudioBufferRef::F64(buf) => append_channels(&*buf, channels, |s| s as f32),
    }
}

fn append_channels<S: Sample>(
    buf: &AudioBuffer<S>,
    channels: &mut Vec<Vec<f32>>,
    convert: fn(S) -> f32,
) {
    let count = buf.spec().channels.count();
    if channels.is_empty() {
        channels.resize_with(count, Vec::new);
    }
    for (channel, out) in channels.iter_mut().enumerate().take(count) {
        out.extend(buf.chan(channel).iter().map(|&sample| convert(sample)));
    }
}

/// Fit decoded channels to `target` output channels.
///
/// Mono sources are duplicated, mono targets average all sources, and other
/// mismatches keep the leading channels (padding with copies of the first).
pub(crate) fn remap_channels(mut decoded: Vec<Vec<f32>>, target: usize) -> Vec<Vec<f32>> {
    let source = decoded.len();
    if source == target || source == 0 || target == 0 {
        return decoded;
    }

    if target == 1 {
        let frames = decoded[0].len();
        let scale = 1.0 / source as f32;
        let mixed = (0..frames)
            .map(|frame| decoded.iter().map(|channel| channel[frame]).sum::<f32>() * scale)
            .collect();
        return vec![mixed];
    }

    decoded.truncate(target);
    while decoded.len() < target {
        let first = decoded[0].clone();
        decoded.push(first);
    }
    decoded
}

fn convert_unsigned_8bit_to_f32(sample: u8) -> f32 {
    (sample as i16 - 128) as f32 / 128.0
}

fn convert_signed_8bit_to_f32(sample: i8) -> f32 {
    sample as f32 / 128.0
}

fn convert_unsigned_16bit_to_f32(sample: u16) -> f32 {
    (sample as i32 - 32_768) as f32 / 32_768.0
}

fn convert_signed_16bit_to_f32(sample: i16) -> f32 {
    sample as f32 / 32_768.0
}

fn convert_unsigned_24bit_to_f32(sample: u32) -> f32 {
    (sample as i32 - (1 << 23)) as f32 / 2f32.powi(23)
}

fn convert_signed_24bit_to_f32(sample: i32) -> f32 {
    // The 24-bit value sits in the low bits of the i32.
    let shifted = sample << 8 >> 8;
    shifted as f32 / 2f32.powi(23)
}

fn convert_unsigned_32bit_to_f32(sample: u32) -> f32 {
    (sample as i64 - (1_i64 << 31)) as f32 / 2f32.powi(31)
}

fn convert_signed_32bit_to_f32(sample: i32) -> f32 {
    sample as f32 / 2f32.powi(31)
}
