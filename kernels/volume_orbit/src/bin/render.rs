// Orbit video frame generator CLI
//
// Loads a volumetric field container, fixes the brightness scale with a
// reference projection, then renders one full camera revolution to
// numbered PNG frames in parallel.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use volume_orbit::{find_max_intensity, render_orbit, RenderSettings, VolumetricField};

/// CLI arguments for the frame renderer
#[derive(Parser, Debug)]
#[command(name = "render")]
#[command(about = "Render an orbiting-camera PNG sequence from a volumetric field", long_about = None)]
struct Args {
    /// Path to the field manifest (JSON file next to its sample blob)
    #[arg(short, long)]
    input: PathBuf,

    /// Output filename prefix; frames are written as <prefix><index>.png
    #[arg(short, long, default_value = "frames/frame")]
    output: String,

    /// Frames per second; also the frame count of the rendered revolution
    #[arg(short, long, default_value_t = 24, value_parser = clap::value_parser!(u32).range(1..))]
    fps: u32,

    /// Video length in seconds (reserved; the loop renders exactly one revolution)
    #[arg(short = 'l', long, default_value_t = 5)]
    video_length: u32,

    /// Frame height in pixels
    #[arg(short = 'H', long, default_value_t = 100, value_parser = clap::value_parser!(u32).range(1..))]
    height: u32,

    /// Frame width in pixels
    #[arg(short = 'W', long, default_value_t = 100, value_parser = clap::value_parser!(u32).range(1..))]
    width: u32,

    /// Vision (field-of-view) angle in radians
    #[arg(short, long, default_value_t = 0.8)]
    visang: f64,

    /// Initial camera location as x,y,z
    #[arg(long, default_value = "0.0,-1.069,0.0", value_delimiter = ',', allow_negative_numbers = true)]
    location: Vec<f64>,

    /// Initial camera viewing direction as x,y,z (need not be normalized)
    #[arg(long, default_value = "0.4,0.5,0.0", value_delimiter = ',', allow_negative_numbers = true)]
    direction: Vec<f64>,

    /// Axis of camera rotation as x,y,z
    #[arg(long, default_value = "0,0,1", value_delimiter = ',', allow_negative_numbers = true)]
    rotate_axis: Vec<f64>,
}

/// Convert a comma-separated triple into a fixed 3-vector
fn parse_vec3(name: &str, values: &[f64]) -> Result<[f64; 3], String> {
    match *values {
        [x, y, z] => Ok([x, y, z]),
        _ => Err(format!(
            "'{name}' expects exactly three comma-separated components, got {}",
            values.len()
        )),
    }
}

fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    let settings = RenderSettings {
        fps: args.fps as usize,
        video_length: args.video_length as usize,
        height: args.height as usize,
        width: args.width as usize,
        visang: args.visang,
        location: parse_vec3("location", &args.location).map_err(anyhow::Error::msg)?,
        direction: parse_vec3("direction", &args.direction).map_err(anyhow::Error::msg)?,
        rotate_axis: parse_vec3("rotate-axis", &args.rotate_axis).map_err(anyhow::Error::msg)?,
        output_prefix: args.output.clone(),
    };
    settings.validate()?;

    // Print configuration
    println!("\nVolume Orbit Frame Renderer");
    println!("=======================================");
    println!("  Input: {}", args.input.display());
    println!("  Output: {}<n>.png", settings.output_prefix);
    println!("  Resolution: {}x{}", settings.width, settings.height);
    println!("  Frames: {} ({} s of video requested)", settings.fps, settings.video_length);
    println!("  Vision angle: {:.3} rad", settings.visang);
    println!(
        "  Camera location: ({:.3}, {:.3}, {:.3})",
        settings.location[0], settings.location[1], settings.location[2]
    );
    println!(
        "  Camera direction: ({:.3}, {:.3}, {:.3})",
        settings.direction[0], settings.direction[1], settings.direction[2]
    );
    println!(
        "  Rotation axis: ({:.3}, {:.3}, {:.3})",
        settings.rotate_axis[0], settings.rotate_axis[1], settings.rotate_axis[2]
    );
    println!("  Workers: {}", rayon::current_num_threads());
    println!("=======================================\n");

    // Load the field before any rendering work
    let field = VolumetricField::load(&args.input)
        .with_context(|| format!("loading field {}", args.input.display()))?;
    println!(
        "Loaded {0}x{0}x{0} field over [{1:.3}, {2:.3}] x [{3:.3}, {4:.3}] x [{5:.3}, {6:.3}]",
        field.pixels, field.xmin, field.xmax, field.ymin, field.ymax, field.zmin, field.zmax
    );

    match field.visible_extents() {
        Some((lo, hi)) => {
            println!("Populated voxel extents:");
            println!("  x: {:.3} .. {:.3}", lo[0], hi[0]);
            println!("  y: {:.3} .. {:.3}", lo[1], hi[1]);
            println!("  z: {:.3} .. {:.3}", lo[2], hi[2]);
        }
        None => println!("Field has no populated voxels"),
    }

    // Make sure the output directory exists before workers race to it
    if let Some(parent) = Path::new(&settings.output_prefix).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating output directory {}", parent.display()))?;
        }
    }

    // Fix the global brightness scale from the reference frame. Must
    // complete before the parallel phase starts.
    println!("\nFixing brightness scale from the reference frame...");
    let scale = find_max_intensity(&field, &settings)?;
    println!("  Reference maximum intensity: {scale:.6e}");

    // Create progress bar
    let pb = ProgressBar::new(settings.fps as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} frames ({percent}%)")?
            .progress_chars("█▓▒░ "),
    );

    println!("Rendering {} frames...", settings.fps);
    let reports = render_orbit(&field, &settings, scale, || pb.inc(1));
    pb.finish();

    // Print statistics
    println!("\nStatistics:");
    for r in reports.iter().filter(|r| r.frames > 0) {
        println!(
            "  Worker #{}: {} frames, {:.3} ms/frame",
            r.worker,
            r.frames,
            r.avg_frame_secs * 1e3
        );
    }
    let failed: usize = reports.iter().map(|r| r.failed_writes).sum();
    if failed > 0 {
        println!("  Failed frame writes: {failed}");
    }

    println!("\nOutput: {}<n>.png\n", settings.output_prefix);
    Ok(())
}
