// ============================================================
// Layer 5 — Backend Selection
// ============================================================
// Training and evaluation are generic over the Burn backend.
// BackendKind is what the CLI and the saved config use to pick
// one at runtime:
//
//   wgpu    — GPU via WGPU (Vulkan / Metal / DX12), the default
//   ndarray — CPU, always available

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Burn backend to run the network on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// GPU via WGPU (Vulkan / Metal / DX12).
    #[default]
    Wgpu,
    /// CPU via ndarray. Always available, slow for full-size frames.
    NdArray,
}

impl BackendKind {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Wgpu    => "wgpu",
            Self::NdArray => "ndarray",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wgpu" | "gpu"          => Ok(Self::Wgpu),
            "ndarray" | "cpu"       => Ok(Self::NdArray),
            other => Err(format!("unknown backend '{other}' (expected wgpu or ndarray)")),
        }
    }
}
