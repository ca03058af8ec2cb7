// Frame angles for one camera revolution and their static split across
// render workers.

use std::f64::consts::PI;

// ============================================================================
// ANGLE SCHEDULE
// ============================================================================

// Monotonically increasing rotation angles covering one full revolution.
//
// `fps` frames span [0, 2π] with dangle = 2π/(fps - 1), so the first
// frame sits at angle 0 and the last at exactly one revolution. A single
// frame degenerates to angle 0 alone.
#[derive(Debug, Clone)]
pub struct AngleSchedule {
    angles: Vec<f64>,
}

impl AngleSchedule {
    pub fn full_orbit(fps: usize) -> Self {
        assert!(fps >= 1, "Schedule needs at least one frame");
        let dangle = if fps > 1 { 2.0 * PI / (fps as f64 - 1.0) } else { 0.0 };
        let angles = (0..fps).map(|i| i as f64 * dangle).collect();
        Self { angles }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.angles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.angles.is_empty()
    }

    #[inline]
    pub fn angles(&self) -> &[f64] {
        &self.angles
    }

    // The contiguous slice of angles owned by one worker.
    #[inline]
    pub fn slice(&self, range: &WorkerRange) -> &[f64] {
        &self.angles[range.start..range.end]
    }
}

// ============================================================================
// WORKER PARTITION
// ============================================================================

// One worker's contiguous, half-open share [start, end) of the frame
// set. `start` doubles as the worker's global frame-number offset, so
// output numbering is gap-free and monotone in angle across workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerRange {
    pub start: usize,
    pub end: usize,
}

impl WorkerRange {
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

// Split `frames` into `workers` contiguous ranges whose sizes differ by
// at most one; the remainder goes to the earliest ranges. Workers past
// the frame count receive empty ranges.
pub fn partition(frames: usize, workers: usize) -> Vec<WorkerRange> {
    assert!(workers >= 1, "Partition needs at least one worker");
    let base = frames / workers;
    let extra = frames % workers;

    let mut ranges = Vec::with_capacity(workers);
    let mut start = 0;
    for w in 0..workers {
        let count = base + usize::from(w < extra);
        ranges.push(WorkerRange { start, end: start + count });
        start += count;
    }
    ranges
}
