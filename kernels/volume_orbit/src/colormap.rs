// GeriMap rasterization of accumulated intensity grids.
//
// Intensities are normalized by the process-wide brightness scale and
// mapped through a fixed 9-stop piecewise-linear palette.

use std::path::Path;

use image::{Rgb, RgbImage};

use crate::camera::FrameImage;
use crate::error::Error;

pub const GERIMAP_COLORS: usize = 9;

// Black -> indigo -> violet -> magenta -> red-orange -> amber -> gold ->
// pale-yellow -> white.
pub const GERIMAP: [[u8; 3]; GERIMAP_COLORS] = [
    [0, 0, 0],
    [38, 38, 128],
    [76, 38, 191],
    [153, 51, 128],
    [255, 64, 38],
    [230, 128, 0],
    [230, 191, 26],
    [230, 230, 128],
    [255, 255, 255],
];

// Map one accumulated value to an RGB pixel.
//
// value/scale is clamped to [0, 1] and stretched over the 8 palette
// segments; a value at or above the scale pins to the last stop,
// everything else interpolates linearly between adjacent stops.
#[inline]
pub fn map_intensity(value: f64, scale: f64) -> Rgb<u8> {
    let t = (value / scale).clamp(0.0, 1.0) * (GERIMAP_COLORS - 1) as f64;
    let stop = t.floor() as usize;
    if stop >= GERIMAP_COLORS - 1 {
        return Rgb(GERIMAP[GERIMAP_COLORS - 1]);
    }

    let frac = t - stop as f64;
    let mut px = [0u8; 3];
    for c in 0..3 {
        let lo = GERIMAP[stop][c] as f64;
        let hi = GERIMAP[stop + 1][c] as f64;
        px[c] = (lo + (hi - lo) * frac) as u8;
    }
    Rgb(px)
}

// Encode a frame as an RGB bitmap.
//
// Rows are mirrored vertically: output row 0 holds the last grid row,
// matching the raster convention of the persisted image format.
pub fn encode_frame(frame: &FrameImage, scale: f64) -> RgbImage {
    let mut img = RgbImage::new(frame.width as u32, frame.height as u32);
    for row in 0..frame.height {
        let src = frame.height - 1 - row;
        for col in 0..frame.width {
            img.put_pixel(
                col as u32,
                row as u32,
                map_intensity(frame.at(src, col), scale),
            );
        }
    }
    img
}

// Encode and persist one frame as an 8-bit RGB PNG (no alpha, no
// interlacing).
pub fn save_frame(frame: &FrameImage, scale: f64, path: &Path) -> Result<(), Error> {
    encode_frame(frame, scale).save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{project_field, CameraBasis, CameraPose};
    use crate::field::VolumetricField;

    #[test]
    fn test_zero_maps_to_first_stop() {
        assert_eq!(map_intensity(0.0, 10.0), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_scale_maps_to_last_stop() {
        assert_eq!(map_intensity(10.0, 10.0), Rgb([255, 255, 255]));
    }

    #[test]
    fn test_above_scale_clamps_to_last_stop() {
        assert_eq!(map_intensity(1e6, 10.0), Rgb([255, 255, 255]));
    }

    #[test]
    fn test_negative_clamps_to_first_stop() {
        assert_eq!(map_intensity(-3.0, 10.0), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_midpoint_interpolates_between_stops() {
        // t = 0.5: halfway between black and indigo
        let Rgb([r, g, b]) = map_intensity(1.0, 16.0);
        assert_eq!((r, g, b), (19, 19, 64));
    }

    #[test]
    fn test_stop_boundaries_are_exact() {
        // t = 1.0 lands exactly on the second stop
        let scale = 8.0;
        assert_eq!(map_intensity(1.0, scale), Rgb(GERIMAP[1]));
        assert_eq!(map_intensity(4.0, scale), Rgb(GERIMAP[4]));
    }

    #[test]
    fn test_encode_mirrors_rows() {
        // A voxel above the optical axis lands in a low grid row; the
        // encoder must move it to the complementary image row.
        let mut data = vec![0.0; 27];
        data[1 * 9 + 1 * 3 + 2] = 1.0; // world (0, 0, 1)
        let field =
            VolumetricField::from_samples(3, [-1.0, 1.0], [-1.0, 1.0], [-1.0, 1.0], data).unwrap();

        let pose = CameraPose::new([0.0, -2.0, 0.0], [0.0, 1.0, 0.0]);
        let basis = CameraBasis::new(&pose, 0.8);
        let mut frame = crate::camera::FrameImage::new(9, 9);
        project_field(&field, &basis, &mut frame);

        let (hot_row, hot_col) = (0..9)
            .flat_map(|r| (0..9).map(move |c| (r, c)))
            .find(|&(r, c)| frame.at(r, c) != 0.0)
            .expect("voxel must land somewhere in the frame");
        let mirror_row = 9 - 1 - hot_row;
        assert_ne!(hot_row, mirror_row, "off-axis voxel must miss the middle row");

        let img = encode_frame(&frame, 1.0);
        assert_eq!(
            *img.get_pixel(hot_col as u32, mirror_row as u32),
            Rgb([255, 255, 255]),
            "hot bin appears on the mirrored row"
        );
        assert_eq!(
            *img.get_pixel(hot_col as u32, hot_row as u32),
            Rgb([0, 0, 0]),
            "unmirrored position stays dark"
        );
    }
}
