// Orbit rendering driver.
//
// Control flow: validate geometry -> reference projection fixes the
// brightness scale -> static partition of the frame set -> one task per
// worker on the rayon pool. The field and the scale are read-only during
// the parallel phase; pose, basis and frame buffer are worker-private.

use std::f64::consts::PI;
use std::path::PathBuf;
use std::time::Instant;

use rayon::prelude::*;

use crate::camera::{project_field, CameraBasis, CameraPose, FrameImage};
use crate::colormap::save_frame;
use crate::error::Error;
use crate::field::VolumetricField;
use crate::rotate::rotate_pair;
use crate::schedule::{partition, AngleSchedule, WorkerRange};
use crate::vec3::norm;

// ============================================================================
// SETTINGS
// ============================================================================

// Validated run configuration, shared read-only by every worker.
#[derive(Debug, Clone)]
pub struct RenderSettings {
    // Frame count for the single rendered revolution
    pub fps: usize,

    // Requested video length in seconds. Accepted and echoed but not yet
    // wired into the frame count: the loop always renders exactly one
    // revolution of `fps` frames.
    // TODO: multiply fps by video_length once multi-revolution orbits
    // are supported.
    pub video_length: usize,

    // Frame dimensions in pixels
    pub height: usize,
    pub width: usize,

    // Vision (field-of-view) angle in radians, in (0, pi)
    pub visang: f64,

    // Initial camera pose and the orbit axis
    pub location: [f64; 3],
    pub direction: [f64; 3],
    pub rotate_axis: [f64; 3],

    // Frames are written as <output_prefix><global-frame-index>.png
    pub output_prefix: String,
}

impl RenderSettings {
    // Reject degenerate geometry up front rather than letting NaNs
    // propagate through the projection.
    pub fn validate(&self) -> Result<(), Error> {
        if !(self.visang > 0.0 && self.visang < PI) {
            return Err(Error::DegenerateGeometry(
                "vision angle must lie strictly between 0 and pi radians",
            ));
        }
        let dn = norm(self.direction);
        if !(dn > 0.0 && dn.is_finite()) {
            return Err(Error::DegenerateGeometry(
                "camera direction must have non-zero finite length",
            ));
        }
        let an = norm(self.rotate_axis);
        if !(an > 0.0 && an.is_finite()) {
            return Err(Error::DegenerateGeometry(
                "rotation axis must have non-zero finite length",
            ));
        }
        Ok(())
    }

    #[inline]
    fn initial_pose(&self) -> CameraPose {
        CameraPose::new(self.location, self.direction)
    }
}

// ============================================================================
// INTENSITY NORMALIZATION
// ============================================================================

// Reference projection at angle zero fixing the global brightness scale.
//
// Runs single-threaded before the parallel phase with a private buffer.
// A maximum that is not positive means the configured camera sees no
// part of the field, which is fatal for the whole run.
pub fn find_max_intensity(
    field: &VolumetricField,
    settings: &RenderSettings,
) -> Result<f64, Error> {
    let basis = CameraBasis::new(&settings.initial_pose(), settings.visang);
    let mut image = FrameImage::new(settings.height, settings.width);
    project_field(field, &basis, &mut image);

    let mx = image.max();
    if mx <= 0.0 {
        return Err(Error::NoVisibleSignal(mx));
    }
    Ok(mx)
}

// ============================================================================
// ORBIT RENDERING
// ============================================================================

// What one worker did with its frame range.
#[derive(Debug, Clone, Copy)]
pub struct WorkerReport {
    pub worker: usize,
    pub frames: usize,
    pub failed_writes: usize,
    // Mean projection time per frame (excludes encode and write)
    pub avg_frame_secs: f64,
}

// Render the full orbit: one frame per scheduled angle, statically
// partitioned across the rayon pool. `scale` must come from
// find_max_intensity before this is called; `on_frame` is invoked once
// per completed frame (progress reporting).
//
// Frame write failures are best-effort: the worker reports them and
// moves on, since every frame goes to a distinct path.
pub fn render_orbit(
    field: &VolumetricField,
    settings: &RenderSettings,
    scale: f64,
    on_frame: impl Fn() + Sync,
) -> Vec<WorkerReport> {
    let schedule = AngleSchedule::full_orbit(settings.fps);
    let ranges = partition(schedule.len(), rayon::current_num_threads());
    let center = field.center();

    ranges
        .par_iter()
        .enumerate()
        .map(|(worker, range)| {
            render_range(field, settings, scale, center, &schedule, worker, range, &on_frame)
        })
        .collect()
}

// One worker's frame loop: clear the private buffer, rotate a fresh copy
// of the initial pose to the frame's angle, project, encode, write.
#[allow(clippy::too_many_arguments)]
fn render_range(
    field: &VolumetricField,
    settings: &RenderSettings,
    scale: f64,
    center: [f64; 3],
    schedule: &AngleSchedule,
    worker: usize,
    range: &WorkerRange,
    on_frame: &(impl Fn() + Sync),
) -> WorkerReport {
    let mut image = FrameImage::new(settings.height, settings.width);
    let mut failed_writes = 0;
    let mut projection_secs = 0.0;

    for (j, &angle) in schedule.slice(range).iter().enumerate() {
        image.clear();

        let mut loc = settings.location;
        let mut dir = settings.direction;
        rotate_pair(angle, &mut loc, &mut dir, center, settings.rotate_axis);
        let basis = CameraBasis::new(&CameraPose::new(loc, dir), settings.visang);

        let tic = Instant::now();
        project_field(field, &basis, &mut image);
        projection_secs += tic.elapsed().as_secs_f64();

        let path = PathBuf::from(format!("{}{}.png", settings.output_prefix, range.start + j));
        if let Err(err) = save_frame(&image, scale, &path) {
            eprintln!("ERROR: failed to write {}: {err}", path.display());
            failed_writes += 1;
        }
        on_frame();
    }

    let frames = range.len();
    WorkerReport {
        worker,
        frames,
        failed_writes,
        avg_frame_secs: if frames > 0 { projection_secs / frames as f64 } else { 0.0 },
    }
}
