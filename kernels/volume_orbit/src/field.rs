// Volumetric scalar field container.
//
// A field on disk is a pair of files: a JSON manifest naming the grid
// metadata, and a raw sample blob holding pixels^3 little-endian f64
// values. The blob may be gzip-compressed (".gz" suffix). The field is
// immutable after load and shared read-only by every render worker.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use serde::Deserialize;

use crate::error::Error;

// ============================================================================
// MANIFEST
// ============================================================================

// On-disk manifest for a field container.
//
// All values are required; a missing key is a malformed container. The
// `data` path is resolved relative to the manifest's directory.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldManifest {
    // Grid resolution per axis; the blob holds pixels^3 samples
    pub pixels: usize,

    // Axis-aligned bounding box of the sampled region
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
    pub zmin: f64,
    pub zmax: f64,

    // Relative path of the sample blob
    pub data: PathBuf,
}

// ============================================================================
// FIELD
// ============================================================================

// A cubic grid of scalar samples with its bounding box.
//
// Samples are stored row-major: index = i*pixels^2 + j*pixels + k, where
// i walks the x axis, j the y axis and k the z axis. Grid node (i, j, k)
// sits at xmin + i*dx (likewise y, z) with dx = (xmax - xmin)/(pixels - 1),
// so the first and last nodes land exactly on the bounds.
#[derive(Debug, Clone)]
pub struct VolumetricField {
    pub pixels: usize,
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
    pub zmin: f64,
    pub zmax: f64,
    data: Vec<f64>,
}

impl VolumetricField {
    // Load a field from its manifest path.
    pub fn load(manifest_path: &Path) -> Result<Self, Error> {
        let text =
            fs::read_to_string(manifest_path).map_err(|e| Error::io(manifest_path, e))?;
        let manifest: FieldManifest = serde_json::from_str(&text)
            .map_err(|e| Error::Field(format!("{}: {e}", manifest_path.display())))?;

        let blob_path = manifest_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(&manifest.data);
        let raw = fs::read(&blob_path).map_err(|e| Error::io(&blob_path, e))?;

        let bytes = if blob_path.extension().and_then(|e| e.to_str()) == Some("gz") {
            let mut inflated = Vec::new();
            GzDecoder::new(raw.as_slice())
                .read_to_end(&mut inflated)
                .map_err(|e| Error::io(&blob_path, e))?;
            inflated
        } else {
            raw
        };

        if bytes.len() % 8 != 0 {
            return Err(Error::Field(format!(
                "{}: blob length {} is not a whole number of f64 samples",
                blob_path.display(),
                bytes.len()
            )));
        }
        let samples = bytes
            .chunks_exact(8)
            .map(|c| f64::from_le_bytes(c.try_into().expect("8-byte chunk")))
            .collect::<Vec<f64>>();

        Self::from_samples(
            manifest.pixels,
            [manifest.xmin, manifest.xmax],
            [manifest.ymin, manifest.ymax],
            [manifest.zmin, manifest.zmax],
            samples,
        )
    }

    // Build a field from in-memory samples, validating the shape.
    pub fn from_samples(
        pixels: usize,
        xb: [f64; 2],
        yb: [f64; 2],
        zb: [f64; 2],
        data: Vec<f64>,
    ) -> Result<Self, Error> {
        if pixels < 2 {
            return Err(Error::Field(format!(
                "grid resolution must be at least 2, got {pixels}"
            )));
        }
        let expected = pixels * pixels * pixels;
        if data.len() != expected {
            return Err(Error::Field(format!(
                "expected {expected} samples ({pixels}^3), got {}",
                data.len()
            )));
        }
        Ok(Self {
            pixels,
            xmin: xb[0],
            xmax: xb[1],
            ymin: yb[0],
            ymax: yb[1],
            zmin: zb[0],
            zmax: zb[1],
            data,
        })
    }

    // Sample at grid node (i, j, k).
    #[inline]
    pub fn at(&self, i: usize, j: usize, k: usize) -> f64 {
        self.data[i * self.pixels * self.pixels + j * self.pixels + k]
    }

    // Midpoint of the bounding box; the orbit pivots around this point.
    pub fn center(&self) -> [f64; 3] {
        [
            (self.xmax + self.xmin) * 0.5,
            (self.ymax + self.ymin) * 0.5,
            (self.zmax + self.zmin) * 0.5,
        ]
    }

    // Grid step per axis.
    #[inline]
    pub fn spacing(&self) -> [f64; 3] {
        let n = (self.pixels - 1) as f64;
        [
            (self.xmax - self.xmin) / n,
            (self.ymax - self.ymin) / n,
            (self.zmax - self.zmin) / n,
        ]
    }

    // Bounding box of the populated (non-zero) voxels, or None for an
    // all-zero field. Diagnostic only; the projector does its own sweep.
    pub fn visible_extents(&self) -> Option<([f64; 3], [f64; 3])> {
        let [dx, dy, dz] = self.spacing();
        let mut lo = [f64::INFINITY; 3];
        let mut hi = [f64::NEG_INFINITY; 3];
        let mut seen = false;

        for i in 0..self.pixels {
            for j in 0..self.pixels {
                for k in 0..self.pixels {
                    if self.at(i, j, k) == 0.0 {
                        continue;
                    }
                    let p = [
                        self.xmin + i as f64 * dx,
                        self.ymin + j as f64 * dy,
                        self.zmin + k as f64 * dz,
                    ];
                    for a in 0..3 {
                        lo[a] = lo[a].min(p[a]);
                        hi[a] = hi[a].max(p[a]);
                    }
                    seen = true;
                }
            }
        }

        seen.then_some((lo, hi))
    }
}
