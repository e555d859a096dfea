// src/main.rs
use std::sync::mpsc;

use anyhow::{Context, Result};
use log::info;
use spectral_display::acquisition::{DisplayPipeline, SpectrumBuilder, Tone, ToneSource, Window};
use spectral_display::{FftDisplayPlot, PlotConfig, PlotEvent};

const FRAME_LEN: usize = 1024;
const FRAMES: usize = 16;

// Each channel gets a tone a little higher than the previous one.
fn demo_tones(channels: usize, sample_rate_hz: f64) -> Vec<Vec<Tone>> {
    (0..channels)
        .map(|ch| {
            vec![
                Tone {
                    frequency_hz: sample_rate_hz / 8.0 * (1.0 + ch as f64 * 0.5),
                    amplitude: 1024.0,
                },
                Tone {
                    frequency_hz: sample_rate_hz / 5.0,
                    amplitude: 64.0,
                },
            ]
        })
        .collect()
}

fn main() -> Result<()> {
    env_logger::init();
    let config = match std::env::args().nth(1) {
        Some(path) => PlotConfig::from_json_file(&path)
            .with_context(|| format!("loading plot config from {path}"))?,
        None => PlotConfig::default(),
    };
    let (tx, rx) = mpsc::channel::<PlotEvent>();
    let plot = FftDisplayPlot::from_config(&config, tx).context("building plot")?;
    let source = ToneSource::new(
        config.sample_rate_hz,
        FRAME_LEN,
        demo_tones(config.channels, config.sample_rate_hz),
    )
    .with_noise(4.0, 42)
    .limited(FRAMES);
    let builder = SpectrumBuilder::with_window(FRAME_LEN, Window::Hann);
    let mut pipeline = DisplayPipeline::new(source, builder, plot);
    let frames = pipeline.run(FRAMES).context("processing frames")?;

    let redraws = rx.try_iter().filter(|e| *e == PlotEvent::NewData).count();
    info!("{frames} frames processed, {redraws} redraws requested");

    let plot = pipeline.plot();
    for ch in 0..plot.channel_count() {
        println!("channel {ch} ({:?}, {:?})", plot.magnitude_type(), plot.average_type(ch));
        for (rank, peak) in plot.peaks_by_magnitude(ch).iter().enumerate() {
            if peak.y <= spectral_display::display::peaks::PEAK_FLOOR {
                continue;
            }
            println!("  peak {rank}: {:>10.2} Hz {:>10.2}", peak.x, peak.y);
        }
        for mk in 0..plot.marker_count(ch) {
            if let Some(reading) = plot.marker_reading(ch, mk) {
                println!(
                    "  marker {mk} ({:?}): {:>10.2} Hz {:>10.2}",
                    reading.kind, reading.x, reading.y
                );
            }
        }
    }
    Ok(())
}
