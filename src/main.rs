use clap::Parser;
use firefront::{bitmap, guidance, message, render, FusionConfig, FusionPipeline, Pose2D};
use log::{info, warn};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "firefront", about = "Fire-front extraction from paired thermal/visible frames")]
struct Cli {
    /// Folder of thermal frames (8- or 16-bit mono). If omitted, the HSV
    /// value channel of each visible frame stands in for thermal.
    #[arg(long)]
    thermal_dir: Option<PathBuf>,

    /// Folder of visible frames (RGB)
    #[arg(long)]
    rgb_dir: PathBuf,

    /// Output folder
    #[arg(short, long, default_value = "results")]
    out_dir: PathBuf,

    /// JSON preset for all fusion parameters (flags below override it)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Meters per pixel (approx.), carried into messages
    #[arg(long)]
    gsd: Option<f64>,

    /// RDP epsilon in pixels
    #[arg(long)]
    rdp_epsilon: Option<f64>,

    /// Band half-width in pixels
    #[arg(long)]
    band: Option<f64>,

    /// Threshold smoothing factor in (0, 1]
    #[arg(long)]
    ema_alpha: Option<f64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => FusionConfig::load(path)?,
        None => FusionConfig::default(),
    };
    if let Some(v) = cli.gsd {
        config.gsd = v;
    }
    if let Some(v) = cli.rdp_epsilon {
        config.rdp_epsilon = v;
    }
    if let Some(v) = cli.band {
        config.band_half_width = v;
    }
    if let Some(v) = cli.ema_alpha {
        config.ema_alpha = v;
    }

    let mut pipeline = FusionPipeline::new(config)?;

    let overlay_dir = cli.out_dir.join("overlays");
    let poly_dir = cli.out_dir.join("polylines");
    let msg_dir = cli.out_dir.join("messages");
    for dir in [&overlay_dir, &poly_dir, &msg_dir] {
        std::fs::create_dir_all(dir)?;
    }

    let visibles = list_frames(&cli.rgb_dir)?;
    let thermals = match &cli.thermal_dir {
        Some(dir) => Some(list_frames(dir)?),
        None => {
            info!("no thermal folder given, using visible value channel as thermal proxy");
            None
        }
    };
    let n = match &thermals {
        Some(t) => {
            if t.len() != visibles.len() {
                warn!(
                    "{} thermal vs {} visible frames, pairing the first {}",
                    t.len(),
                    visibles.len(),
                    t.len().min(visibles.len())
                );
            }
            t.len().min(visibles.len())
        }
        None => visibles.len(),
    };

    for i in 0..n {
        let visible = bitmap::load_frame(&visibles[i])?.to_rgb8();
        let thermal = match &thermals {
            Some(t) => bitmap::load_frame(&t[i])?,
            None => image::DynamicImage::ImageLuma8(bitmap::value_channel(&visible)),
        };

        let result = pipeline.step(&thermal, &visible)?;

        let overlay = render::render_overlay(
            &visible,
            &result.mask,
            &result.edges,
            &result.band,
            &result.polyline,
        );
        overlay.save(overlay_dir.join(format!("{:06}.png", i)))?;
        render::export_polyline_json(&poly_dir.join(format!("{:06}.json", i)), &result.polyline)?;

        let pose = Pose2D::default();
        let msg = pipeline.message(&result.polyline, pose);
        message::export_message_json(&msg_dir.join(format!("{:06}.json", i)), &msg)?;

        let (heading, speed) =
            guidance::tangent_follow(&result.polyline, pose, guidance::DEFAULT_SPEED);
        info!("frame {:06}: k={} heading {:.3} rad, speed {:.1}", i, msg.poly.k, heading, speed);
    }

    info!("done, wrote {} frames to {}", n, cli.out_dir.display());
    Ok(())
}

/// Regular files in `dir`, sorted by name.
fn list_frames(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    Ok(files)
}
