use std::fmt;

/// Coarse device classification; sizes every component's effect budget.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceTier {
    Low,
    Medium,
    High,
}

impl PerformanceTier {
    pub const ALL: [PerformanceTier; 3] = [Self::Low, Self::Medium, Self::High];

    pub fn downgrade(self) -> Self {
        match self {
            Self::High => Self::Medium,
            Self::Medium | Self::Low => Self::Low,
        }
    }
}

impl fmt::Display for PerformanceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        })
    }
}

/// Rendering capability as reported by the host's probe.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GpuProbe {
    /// Unmasked renderer string, when the host exposes it.
    #[serde(default)]
    pub renderer: Option<String>,
}

/// Raw environment facts supplied by the host. Nothing here is queried lazily.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Environment {
    #[serde(default)]
    pub prefers_reduced_motion: bool,
    /// `None` when no rendering backend could be created.
    #[serde(default)]
    pub gpu: Option<GpuProbe>,
    #[serde(default)]
    pub device_memory_gb: Option<f64>,
    #[serde(default)]
    pub hardware_concurrency: Option<u32>,
}

pub const MIN_DEVICE_MEMORY_GB: f64 = 4.0;
pub const MIN_HARDWARE_CONCURRENCY: u32 = 4;

const INTEGRATED_RENDERER_MARKERS: [&str; 2] = ["Intel", "Mesa"];

/// Session-wide configuration handed to every component's `init`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct InitConfig {
    pub tier: PerformanceTier,
    pub reduced_motion: bool,
}

impl InitConfig {
    pub fn new(tier: PerformanceTier, reduced_motion: bool) -> Self {
        Self {
            tier,
            reduced_motion,
        }
    }
}

impl Environment {
    pub fn rendering_available(&self) -> bool {
        self.gpu.is_some()
    }

    /// Buckets the environment into a tier. No rendering backend means `Low`;
    /// an integrated renderer caps at `Medium`; each hint below its threshold
    /// downgrades one step.
    pub fn performance_tier(&self) -> PerformanceTier {
        let Some(gpu) = &self.gpu else {
            return PerformanceTier::Low;
        };

        let integrated = gpu.renderer.as_deref().is_some_and(|r| {
            INTEGRATED_RENDERER_MARKERS
                .iter()
                .any(|marker| r.contains(marker))
        });
        let mut tier = if integrated {
            PerformanceTier::Medium
        } else {
            PerformanceTier::High
        };

        if self
            .device_memory_gb
            .is_some_and(|gb| gb < MIN_DEVICE_MEMORY_GB)
        {
            tier = tier.downgrade();
        }
        if self
            .hardware_concurrency
            .is_some_and(|n| n < MIN_HARDWARE_CONCURRENCY)
        {
            tier = tier.downgrade();
        }
        tier
    }

    #[tracing::instrument(skip(self))]
    pub fn detect(&self) -> InitConfig {
        let cfg = InitConfig::new(self.performance_tier(), self.prefers_reduced_motion);
        tracing::info!(
            tier = %cfg.tier,
            reduced_motion = cfg.reduced_motion,
            "capabilities detected"
        );
        cfg
    }
}

#[cfg(test)]
#[path = "../../tests/unit/env/capability.rs"]
mod tests;
