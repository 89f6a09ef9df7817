//! # BLIT Headless
//!
//! Runs the animation against an in-memory canvas and prints what happened.
//!
//! ```text
//! blit_headless [--threaded] [config.toml] [seconds]
//! ```

use std::time::Duration;

use blit_core::BlitConfig;
use blit_host::{EventLoopHost, HostReport, PixelSurface, ThreadedHost};

const DEFAULT_SECONDS: f64 = 3.0;

fn main() {
    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║         BLIT HEADLESS                                            ║");
    println!("║         mutation + render loops on a software canvas             ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();

    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("Usage: blit_headless [--threaded] [config.toml] [seconds]");
        println!();
        println!("Options:");
        println!("  --threaded   Run each loop on its own timer thread");
        return;
    }

    let threaded = args.iter().any(|a| a == "--threaded");
    let positional: Vec<&String> = args.iter().filter(|a| !a.starts_with("--")).collect();

    let config = match positional.iter().find(|a| a.ends_with(".toml")) {
        Some(path) => {
            println!("Loading config: {path}");
            match BlitConfig::load(path.as_str()) {
                Ok(config) => config,
                Err(e) => {
                    println!("Error: {e}");
                    return;
                }
            }
        }
        None => BlitConfig::default(),
    };

    let seconds = positional
        .iter()
        .find_map(|a| a.parse::<f64>().ok())
        .filter(|s| s.is_finite() && *s > 0.0)
        .unwrap_or(DEFAULT_SECONDS);

    println!(
        "Running {} host for {seconds:.1}s on a {}x{} canvas...",
        if threaded { "threaded" } else { "event-loop" },
        config.surface.width,
        config.surface.height
    );

    let run = Duration::from_secs_f64(seconds);
    let report = if threaded {
        ThreadedHost::spawn(&config).and_then(|host| {
            std::thread::sleep(run);
            host.shutdown()
        })
    } else {
        EventLoopHost::spawn(&config).and_then(|host| {
            std::thread::sleep(run);
            host.shutdown()
        })
    };

    match report {
        Ok(report) => print_report(&report),
        Err(e) => println!("Error: {e}"),
    }
}

fn print_report(report: &HostReport<PixelSurface>) {
    let secs = report.elapsed.as_secs_f64().max(f64::EPSILON);
    #[allow(clippy::cast_precision_loss)]
    let fps = report.render.frames as f64 / secs;
    let covered = report
        .canvas
        .pixels()
        .iter()
        .filter(|p| p[3] > 0)
        .count();

    println!();
    println!("┌─ RENDER ─────────────────────────────────────────────────────────┐");
    println!("│ Frames:             {} ({fps:.1} fps)", report.render.frames);
    println!("│ Dropped frames:     {}", report.draw_failures);
    println!("│ Render ticks due:   {}", report.render_ticks);
    println!("│ Coalesced ticks:    {}", report.coalesced);
    println!("│ Last frame drew:    {} primitives", report.render.last_drawn);
    println!("└──────────────────────────────────────────────────────────────────┘");
    println!("┌─ MUTATION ───────────────────────────────────────────────────────┐");
    println!("│ Ticks:              {}", report.mutation.ticks);
    println!("│ Skipped (no region):{}", report.mutation.skipped);
    println!("│ Inserted:           {}", report.mutation.inserted);
    println!("│ Overflow resets:    {}", report.mutation.resets);
    println!("└──────────────────────────────────────────────────────────────────┘");
    println!("┌─ CANVAS ─────────────────────────────────────────────────────────┐");
    println!("│ Size:               {}x{}", report.canvas.width(), report.canvas.height());
    println!("│ Painted pixels:     {covered}");
    println!("│ Bytes:              {}", report.canvas.as_bytes().len());
    println!("└──────────────────────────────────────────────────────────────────┘");
}
