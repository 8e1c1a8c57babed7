//! Disk image formats.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// On-disk format of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ImageFormat {
    Qcow2,
    Raw,
    Vhd,
    Vhdx,
    Ova,
    Vmdk,
    Iso,
    Tar,
}

impl ImageFormat {
    /// Return the format as an uppercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Qcow2 => "QCOW2",
            Self::Raw => "RAW",
            Self::Vhd => "VHD",
            Self::Vhdx => "VHDX",
            Self::Ova => "OVA",
            Self::Vmdk => "VMDK",
            Self::Iso => "ISO",
            Self::Tar => "TAR",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Returned when a format name is not one of [`ImageFormat`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown image format '{0}'")]
pub struct UnknownImageFormat(pub String);

impl FromStr for ImageFormat {
    type Err = UnknownImageFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "QCOW2" => Ok(Self::Qcow2),
            "RAW" => Ok(Self::Raw),
            "VHD" => Ok(Self::Vhd),
            "VHDX" => Ok(Self::Vhdx),
            "OVA" => Ok(Self::Ova),
            "VMDK" => Ok(Self::Vmdk),
            "ISO" => Ok(Self::Iso),
            "TAR" => Ok(Self::Tar),
            _ => Err(UnknownImageFormat(s.to_string())),
        }
    }
}
