//! Device configuration for local inference.

use crate::error::{MoodlensError, Result};

/// Compute device for local inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Device {
    /// CPU execution (default).
    #[default]
    Cpu,

    /// CUDA GPU execution.
    #[cfg(feature = "cuda")]
    Cuda {
        /// GPU device ID (0-indexed).
        device_id: u32,
    },
}

impl Device {
    /// Parse a device name from configuration: `cpu`, `cuda` or `cuda:N`.
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "cpu" => Ok(Self::Cpu),
            #[cfg(feature = "cuda")]
            "cuda" => Ok(Self::Cuda { device_id: 0 }),
            #[cfg(feature = "cuda")]
            other if other.starts_with("cuda:") => {
                let device_id = other["cuda:".len()..].parse().map_err(|e| {
                    MoodlensError::Configuration(format!("Invalid CUDA device id in {name:?}: {e}"))
                })?;
                Ok(Self::Cuda { device_id })
            }
            other if other.starts_with("cuda") => Err(MoodlensError::Configuration(format!(
                "Device {other:?} requires the `cuda` feature"
            ))),
            other => Err(MoodlensError::Configuration(format!(
                "Unknown device {other:?}, expected \"cpu\" or \"cuda\""
            ))),
        }
    }

    /// Get the device name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Cpu => "CPU",
            #[cfg(feature = "cuda")]
            Self::Cuda { .. } => "CUDA",
        }
    }
}
