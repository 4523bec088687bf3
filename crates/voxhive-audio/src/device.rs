use cpal::traits::{DeviceTrait, HostTrait};

use voxhive_foundation::AudioError;

/// Opens the named input device, or the host default when `name` is None.
pub fn open_input_device(name: Option<&str>) -> Result<cpal::Device, AudioError> {
    let host = cpal::default_host();

    match name {
        Some(wanted) => {
            let devices = host.input_devices().map_err(|e| AudioError::DeviceUnavailable {
                name: Some(wanted.to_string()),
                reason: e.to_string(),
            })?;
            for device in devices {
                if device.name().map(|n| n == wanted).unwrap_or(false) {
                    return Ok(device);
                }
            }
            Err(AudioError::DeviceUnavailable {
                name: Some(wanted.to_string()),
                reason: "no input device with that name".into(),
            })
        }
        None => host
            .default_input_device()
            .ok_or_else(|| AudioError::DeviceUnavailable {
                name: None,
                reason: "no default input device".into(),
            }),
    }
}

/// Opens the named output device, or the host default when `name` is None.
pub fn open_output_device(name: Option<&str>) -> Result<cpal::Device, AudioError> {
    let host = cpal::default_host();

    match name {
        Some(wanted) => {
            let devices = host.output_devices().map_err(|e| AudioError::DeviceUnavailable {
                name: Some(wanted.to_string()),
                reason: e.to_string(),
            })?;
            for device in devices {
                if device.name().map(|n| n == wanted).unwrap_or(false) {
                    return Ok(device);
                }
            }
            Err(AudioError::DeviceUnavailable {
                name: Some(wanted.to_string()),
                reason: "no output device with that name".into(),
            })
        }
        None => host
            .default_output_device()
            .ok_or_else(|| AudioError::DeviceUnavailable {
                name: None,
                reason: "no default output device".into(),
            }),
    }
}

pub fn list_input_devices() -> Vec<String> {
    let host = cpal::default_host();
    match host.input_devices() {
        Ok(devices) => devices.filter_map(|d| d.name().ok()).collect(),
        Err(e) => {
            tracing::warn!("Failed to enumerate input devices: {}", e);
            Vec::new()
        }
    }
}

pub fn list_output_devices() -> Vec<String> {
    let host = cpal::default_host();
    match host.output_devices() {
        Ok(devices) => devices.filter_map(|d| d.name().ok()).collect(),
        Err(e) => {
            tracing::warn!("Failed to enumerate output devices: {}", e);
            Vec::new()
        }
    }
}
