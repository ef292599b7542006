//! CPAL hardware platform.

use super::{
    AudioData, AudioPlatform, DataCallback, PlatformDirection, PlatformStream, StreamRequest,
};
use crate::error::PlatformError;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::Sample;

/// Wrapper to hold `cpal::Stream` in a `Send` context.
///
/// `cpal::Stream` is `!Send` due to platform internals. The stream is owned
/// by exactly one engine, which only touches it from its control thread
/// (open, start, close) and never shares it.
struct StreamHandle(cpal::Stream);

// SAFETY: see above; the handle is moved into the engine once and is never
// accessed concurrently.
unsafe impl Send for StreamHandle {}

/// Platform backed by the CPAL host audio API.
///
/// Device id 0 selects the host default device; id `n` selects the
/// `(n - 1)`-th enumerated device of the requested direction.
#[derive(Debug, Clone, Default)]
pub struct CpalPlatform {
    host_id: Option<cpal::HostId>,
}

impl CpalPlatform {
    /// Use the default CPAL host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific CPAL host.
    pub fn with_host(host_id: cpal::HostId) -> Self {
        Self {
            host_id: Some(host_id),
        }
    }

    fn host(&self) -> Result<cpal::Host, PlatformError> {
        match self.host_id {
            Some(id) => cpal::host_from_id(id)
                .map_err(|e| PlatformError::DeviceNotFound(format!("host {id:?}: {e}"))),
            None => Ok(cpal::default_host()),
        }
    }
}

impl AudioPlatform for CpalPlatform {
    fn name(&self) -> &str {
        "cpal"
    }

    fn open_stream(
        &self,
        request: &StreamRequest,
        callback: Box<dyn DataCallback>,
    ) -> Result<Box<dyn PlatformStream>, PlatformError> {
        let host = self.host()?;
        let device = get_device(&host, request.direction, request.device_id)?;

        // cpal exposes none of these knobs
        tracing::debug!(
            sharing_mode = ?request.sharing_mode,
            performance_mode = ?request.performance_mode,
            resample_quality = ?request.sample_rate_conversion_quality,
            "cpal: stream hints not applied"
        );

        let format = pick_sample_format(&device, request)?;
        let config = cpal::StreamConfig {
            channels: request.channel_count,
            sample_rate: cpal::SampleRate(request.sample_rate),
            buffer_size: if request.frames_per_callback > 0 {
                cpal::BufferSize::Fixed(request.frames_per_callback)
            } else {
                cpal::BufferSize::Default
            },
        };

        let stream = match (request.direction, format) {
            (PlatformDirection::Input, cpal::SampleFormat::I16) => {
                build_input_stream(&device, &config, request, callback)?
            }
            (PlatformDirection::Input, cpal::SampleFormat::F32) => {
                build_converted_input_stream::<f32>(&device, &config, request, callback)?
            }
            (PlatformDirection::Input, cpal::SampleFormat::U16) => {
                build_converted_input_stream::<u16>(&device, &config, request, callback)?
            }
            (PlatformDirection::Output, cpal::SampleFormat::I16) => {
                build_output_stream(&device, &config, request, callback)?
            }
            (PlatformDirection::Output, cpal::SampleFormat::F32) => {
                build_converted_output_stream::<f32>(&device, &config, request, callback)?
            }
            (PlatformDirection::Output, cpal::SampleFormat::U16) => {
                build_converted_output_stream::<u16>(&device, &config, request, callback)?
            }
            (_, format) => {
                return Err(PlatformError::UnsupportedConfig(format!(
                    "Unsupported sample format: {format:?}"
                )));
            }
        };

        let name = device.name().unwrap_or_else(|_| "Unknown".to_string());
        tracing::debug!(direction = ?request.direction, device = %name, ?format, "cpal stream opened");

        Ok(Box::new(CpalStream {
            stream: Some(StreamHandle(stream)),
        }))
    }
}

struct CpalStream {
    stream: Option<StreamHandle>,
}

impl PlatformStream for CpalStream {
    fn request_start(&mut self) -> Result<(), PlatformError> {
        match &self.stream {
            Some(handle) => Ok(handle.0.play()?),
            None => Err(PlatformError::Start("stream already closed".into())),
        }
    }

    fn close(&mut self) -> Result<(), PlatformError> {
        let Some(handle) = self.stream.take() else {
            return Ok(());
        };
        let paused = handle.0.pause();
        // Dropping the stream tears down the host callback thread
        drop(handle);
        paused.map_err(|e| PlatformError::Close(e.to_string()))
    }
}

impl Drop for CpalStream {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

fn get_device(
    host: &cpal::Host,
    direction: PlatformDirection,
    device_id: u32,
) -> Result<cpal::Device, PlatformError> {
    if device_id == 0 {
        let device = match direction {
            PlatformDirection::Input => host.default_input_device(),
            PlatformDirection::Output => host.default_output_device(),
        };
        return device.ok_or_else(|| {
            PlatformError::DeviceNotFound(format!("No default {direction:?} device available"))
        });
    }

    let devices: Vec<_> = match direction {
        PlatformDirection::Input => host.input_devices()?.collect(),
        PlatformDirection::Output => host.output_devices()?.collect(),
    };
    let count = devices.len();
    devices
        .into_iter()
        .nth(device_id as usize - 1)
        .ok_or_else(|| {
            PlatformError::DeviceNotFound(format!(
                "{direction:?} device id {device_id} out of range ({count} available)"
            ))
        })
}

/// Prefer native 16-bit; fall back to a format we can convert from.
fn pick_sample_format(
    device: &cpal::Device,
    request: &StreamRequest,
) -> Result<cpal::SampleFormat, PlatformError> {
    let ranges: Vec<cpal::SupportedStreamConfigRange> = match request.direction {
        PlatformDirection::Input => device.supported_input_configs()?.collect(),
        PlatformDirection::Output => device.supported_output_configs()?.collect(),
    };

    let rate = cpal::SampleRate(request.sample_rate);
    let matching: Vec<cpal::SampleFormat> = ranges
        .iter()
        .filter(|r| {
            r.channels() == request.channel_count
                && r.min_sample_rate() <= rate
                && rate <= r.max_sample_rate()
        })
        .map(|r| r.sample_format())
        .collect();

    [
        cpal::SampleFormat::I16,
        cpal::SampleFormat::F32,
        cpal::SampleFormat::U16,
    ]
    .into_iter()
    .find(|f| matching.contains(f))
    .ok_or_else(|| {
        PlatformError::UnsupportedConfig(format!(
            "no {:?} config with {} channels at {} Hz",
            request.direction, request.channel_count, request.sample_rate
        ))
    })
}

fn error_callback(direction: PlatformDirection) -> impl FnMut(cpal::StreamError) + Send + 'static {
    move |err| tracing::warn!(?direction, "cpal stream error: {err}")
}

fn build_input_stream(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    request: &StreamRequest,
    mut callback: Box<dyn DataCallback>,
) -> Result<cpal::Stream, PlatformError> {
    let channels = request.channel_count as usize;
    let stream = device.build_input_stream(
        config,
        move |data: &[i16], _: &cpal::InputCallbackInfo| {
            let frames = data.len() / channels;
            let _ = callback.on_data(AudioData::Input(data), frames);
        },
        error_callback(request.direction),
        None,
    )?;
    Ok(stream)
}

fn build_output_stream(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    request: &StreamRequest,
    mut callback: Box<dyn DataCallback>,
) -> Result<cpal::Stream, PlatformError> {
    let channels = request.channel_count as usize;
    let stream = device.build_output_stream(
        config,
        move |data: &mut [i16], _: &cpal::OutputCallbackInfo| {
            let frames = data.len() / channels;
            let _ = callback.on_data(AudioData::Output(data), frames);
        },
        error_callback(request.direction),
        None,
    )?;
    Ok(stream)
}

fn build_converted_input_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    request: &StreamRequest,
    mut callback: Box<dyn DataCallback>,
) -> Result<cpal::Stream, PlatformError>
where
    T: cpal::SizedSample,
    i16: cpal::FromSample<T>,
{
    let channels = request.channel_count as usize;
    // Pre-allocated scratch (grows only if the host exceeds the requested period)
    let mut scratch = Vec::<i16>::with_capacity(request.samples_per_callback());

    let stream = device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            scratch.clear();
            scratch.extend(data.iter().map(|&s| i16::from_sample(s)));
            let frames = scratch.len() / channels;
            let _ = callback.on_data(AudioData::Input(&scratch), frames);
        },
        error_callback(request.direction),
        None,
    )?;
    Ok(stream)
}

fn build_converted_output_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    request: &StreamRequest,
    mut callback: Box<dyn DataCallback>,
) -> Result<cpal::Stream, PlatformError>
where
    T: cpal::SizedSample + cpal::FromSample<i16>,
{
    let channels = request.channel_count as usize;
    let mut scratch = Vec::<i16>::with_capacity(request.samples_per_callback());

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            scratch.clear();
            scratch.resize(data.len(), 0);
            let frames = data.len() / channels;
            let _ = callback.on_data(AudioData::Output(&mut scratch), frames);
            for (out, &sample) in data.iter_mut().zip(scratch.iter()) {
                *out = T::from_sample(sample);
            }
        },
        error_callback(request.direction),
        None,
    )?;
    Ok(stream)
}
