//! Progressive render example.
//!
//! Renders the random-spheres scene in the background, reports progress while
//! the workers run, pauses once halfway through, and saves the result as PNG.
//!
//! Usage: `progressive_render [config.json] [output.png]`

use anyhow::Context;
use ember_renderer::{
    entropy_rng, RenderConfig, RenderOutcome, RenderState, Renderer, Scene, TileOrder,
};
use std::thread;
use std::time::Duration;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => {
            let json = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
            RenderConfig::from_json_str(&json)?
        }
        None => RenderConfig::default()
            .with_resolution(600, 400)
            .with_quality(32, 10)
            .with_tiles(32, TileOrder::Spiral),
    };
    let output = args.next().unwrap_or_else(|| "output.png".to_string());

    let start = std::time::Instant::now();
    let scene = Scene::random_spheres(&mut entropy_rng(), 500);
    log::info!("Scene built in {:?}", start.elapsed());

    let renderer = Renderer::new(scene, config)?;
    let handle = renderer.start(renderer.tiles()?)?;

    let mut paused_once = false;
    while !handle.is_finished() {
        thread::sleep(Duration::from_millis(250));

        let progress = handle.progress();
        log::info!(
            "{:?}: {:.1}% ({} / {} tiles) after {:.1?}",
            handle.state(),
            progress.fraction() * 100.0,
            progress.completed_tiles,
            progress.total_tiles,
            handle.elapsed()
        );

        if !paused_once && progress.fraction() >= 0.5 && handle.state() == RenderState::Running {
            handle.pause();
            log::info!("Paused at {:.1}%", handle.progress().fraction() * 100.0);
            thread::sleep(Duration::from_millis(500));
            handle.resume();
            paused_once = true;
        }
    }

    let report = handle.wait()?;
    if report.outcome != RenderOutcome::Completed {
        anyhow::bail!("render did not complete: {:?}", report.outcome);
    }
    log::info!("{}", report.stats);

    let (width, height) = (report.image.width, report.image.height);
    let image = image::RgbaImage::from_raw(width, height, report.image.to_rgba())
        .context("pixel buffer does not match image size")?;
    image.save(&output).with_context(|| format!("saving {output}"))?;
    log::info!("Saved to {output}");

    Ok(())
}
