//! Output device enumeration and lookup

use cpal::traits::{DeviceTrait, HostTrait};

use super::error::{AudioError, AudioResult};

/// An output device on the default host
#[derive(Debug, Clone)]
pub struct AudioDevice {
    pub name: String,
    pub is_default: bool,
    /// Common sample rates inside the device's supported ranges
    pub sample_rates: Vec<u32>,
    pub max_channels: u16,
}

/// List output devices of the default host, default device first
pub fn get_output_devices() -> AudioResult<Vec<AudioDevice>> {
    let host = cpal::default_host();
    let default_name = host.default_output_device().and_then(|d| d.name().ok());

    let devices = host
        .output_devices()
        .map_err(|e| AudioError::DeviceQuery(e.to_string()))?;

    let mut found = Vec::new();
    for device in devices {
        let Ok(name) = device.name() else {
            continue;
        };
        let configs: Vec<_> = match device.supported_output_configs() {
            Ok(c) => c.collect(),
            Err(e) => {
                log::debug!("Skipping {}: {}", name, e);
                continue;
            }
        };
        if configs.is_empty() {
            continue;
        }

        let max_channels = configs.iter().map(|c| c.channels()).max().unwrap_or(0);
        let sample_rates = common_rates(
            configs
                .iter()
                .map(|c| (c.min_sample_rate().0, c.max_sample_rate().0)),
        );

        found.push(AudioDevice {
            is_default: default_name.as_ref() == Some(&name),
            name,
            sample_rates,
            max_channels,
        });
    }

    if found.is_empty() {
        return Err(AudioError::NoOutputDevices);
    }

    found.sort_by(|a, b| b.is_default.cmp(&a.is_default).then_with(|| a.name.cmp(&b.name)));
    Ok(found)
}

/// Common sample rates covered by any of the `(min, max)` ranges, ascending
fn common_rates(ranges: impl IntoIterator<Item = (u32, u32)>) -> Vec<u32> {
    let ranges: Vec<_> = ranges.into_iter().collect();
    [44100, 48000, 88200, 96000]
        .into_iter()
        .filter(|rate| ranges.iter().any(|(min, max)| (*min..=*max).contains(rate)))
        .collect()
}

/// Log what is available, for when the configured device can't be found
pub(super) fn log_available_devices() {
    match get_output_devices() {
        Ok(devices) => {
            for device in &devices {
                log::info!(
                    "Available output: {}{} ({} ch, {:?} Hz)",
                    device.name,
                    if device.is_default { " [default]" } else { "" },
                    device.max_channels,
                    device.sample_rates
                );
            }
        }
        Err(e) => log::warn!("Could not list output devices: {}", e),
    }
}

/// Find an output device by name on the default host
pub(super) fn find_device_by_name(name: &str) -> AudioResult<cpal::Device> {
    cpal::default_host()
        .output_devices()
        .map_err(|e| AudioError::DeviceQuery(e.to_string()))?
        .find(|d| d.name().ok().as_deref() == Some(name))
        .ok_or_else(|| AudioError::DeviceNotFound(name.to_string()))
}

/// Default output device of the default host
pub(super) fn get_default_device() -> AudioResult<cpal::Device> {
    cpal::default_host()
        .default_output_device()
        .ok_or(AudioError::NoDefaultOutput)
}
