use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    dense: HashMap<String, String>,
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup<'a, T>(map: &'a HashMap<String, T>, kind: &str, name: &str) -> Result<&'a T> {
    map.get(name)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

/// Recorded dense scalar tracks (morph weights, visibility, ...).
pub mod dense {
    use super::*;

    /// One scalar per sampled tick, starting at tick 0.
    #[derive(Debug, Clone, Deserialize)]
    pub struct DenseScalarTrack {
        #[serde(default)]
        pub description: String,
        pub ticks_per_second: i64,
        pub ticks_per_sample: i64,
        /// Absolute error bound the track is expected to resample within
        pub max_error: f32,
        pub frames: Vec<f32>,
    }

    pub fn keys() -> Vec<String> {
        MANIFEST.dense.keys().cloned().collect()
    }

    pub fn load(name: &str) -> Result<DenseScalarTrack> {
        let rel = lookup(&MANIFEST.dense, "dense", name)?;
        let track: DenseScalarTrack = super::load_json(rel)?;
        if track.frames.is_empty() {
            return Err(anyhow!("dense fixture '{name}' has no frames"));
        }
        Ok(track)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let rel = lookup(&MANIFEST.dense, "dense", name)?;
        Ok(resolve_path(rel))
    }
}

/// Synthetic dense transform tracks, one matrix per sample.
pub mod synthetic {
    use nalgebra::{Matrix4, Unit, UnitQuaternion, Vector3};

    fn param(i: usize, frames: usize) -> f32 {
        if frames < 2 {
            0.0
        } else {
            i as f32 / (frames - 1) as f32
        }
    }

    /// Translation moving at constant speed from `from` to `to`.
    pub fn linear_translation(frames: usize, from: [f32; 3], to: [f32; 3]) -> Vec<Matrix4<f32>> {
        let from = Vector3::from(from);
        let to = Vector3::from(to);
        (0..frames)
            .map(|i| Matrix4::new_translation(&from.lerp(&to, param(i, frames))))
            .collect()
    }

    /// Translation along a circular arc of `radius` in the xy plane, sweeping
    /// `sweep` radians from the +x axis.
    pub fn circular_arc(frames: usize, radius: f32, sweep: f32) -> Vec<Matrix4<f32>> {
        (0..frames)
            .map(|i| {
                let angle = sweep * param(i, frames);
                Matrix4::new_translation(&Vector3::new(
                    radius * angle.cos(),
                    radius * angle.sin(),
                    0.0,
                ))
            })
            .collect()
    }

    /// Constant-rate rotation about `axis` by `angle` radians in total, at a fixed offset.
    pub fn spin(
        frames: usize,
        axis: [f32; 3],
        angle: f32,
        offset: [f32; 3],
    ) -> Vec<Matrix4<f32>> {
        let axis = Unit::new_normalize(Vector3::from(axis));
        let offset = Vector3::from(offset);
        (0..frames)
            .map(|i| {
                let rotation = UnitQuaternion::from_axis_angle(&axis, angle * param(i, frames));
                Matrix4::new_translation(&offset) * rotation.to_homogeneous()
            })
            .collect()
    }

    /// Non-uniform scale oscillating `periods` times around 1 with the given amplitude.
    pub fn scale_pulse(frames: usize, amplitude: [f32; 3], periods: f32) -> Vec<Matrix4<f32>> {
        let amplitude = Vector3::from(amplitude);
        (0..frames)
            .map(|i| {
                let phase = std::f32::consts::TAU * periods * param(i, frames);
                let scale = Vector3::repeat(1.0) + amplitude * phase.sin();
                Matrix4::new_nonuniform_scaling(&scale)
            })
            .collect()
    }
}
