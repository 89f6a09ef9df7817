//! # Interleaved Loops Integration Test
//!
//! Drives both loops from a virtual clock at the reference rates and checks
//! the properties that must hold across every tick.

use std::time::Duration;

use blit_core::{
    BlitConfig, BlitEngine, CommandRecorder, DrawCommand, MutationTick, Region,
};

/// One event on the virtual timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Tick {
    Render,
    Mutation,
}

/// Merges two periodic timers into one ordered timeline.
fn timeline(config: &BlitConfig, length: Duration) -> Vec<(Duration, Tick)> {
    let timing = &config.timing;
    let mut events = Vec::new();

    let mut at = timing.render_initial_delay();
    while at < length {
        events.push((at, Tick::Render));
        at += timing.render_period();
    }

    let mut at = timing.mutation_initial_delay();
    while at < length {
        events.push((at, Tick::Mutation));
        at += timing.mutation_period();
    }

    events.sort();
    events
}

#[test]
fn test_reference_rates_for_ten_seconds() {
    let config = BlitConfig::from_toml_str(
        r#"
        seed = 2024

        [drawables]
        max_capacity = 100
        batch_size = 3
        "#,
    )
    .unwrap();

    let mut engine = BlitEngine::from_config(&config).unwrap();
    let region = Region::from_size(640.0, 360.0);
    let mut recorder = CommandRecorder::new();
    let mut last_frame = 0;
    let mut skipped_before_first_frame = 0;

    for (_, tick) in timeline(&config, Duration::from_secs(10)) {
        match tick {
            Tick::Mutation => {
                let before = engine.scene().drawables().len();
                match engine.on_mutation_tick() {
                    MutationTick::Skipped => {
                        assert_eq!(last_frame, 0, "only skip before the first frame");
                        skipped_before_first_frame += 1;
                    }
                    MutationTick::Inserted(outcome) => {
                        let after = engine.scene().drawables().len();
                        assert!(after <= 100);
                        if before + 3 > 100 {
                            assert!(outcome.was_reset());
                            assert_eq!(after, 3);
                        } else {
                            assert_eq!(after, before + 3);
                        }
                    }
                }
            }
            Tick::Render => {
                recorder.begin_frame();
                let report = engine.on_render_request(region, &mut recorder).unwrap();

                assert_eq!(report.frame, last_frame + 1);
                last_frame = report.frame;

                // background, every primitive, overlay
                assert_eq!(recorder.command_count(), report.drawn + 2);
                assert!(matches!(
                    recorder.commands().last(),
                    Some(DrawCommand::Text { text, .. }) if text.ends_with(&format!("({})", report.frame))
                ));
            }
        }
    }

    // The render timer starts after one second, so the first ~24 mutation
    // ticks find no region.
    assert!(skipped_before_first_frame >= 20);
    assert!(engine.render_stats().frames >= 500);
    assert!(engine.mutation_stats().resets > 0);
}

#[test]
fn test_endpoints_follow_latest_region() {
    let config = BlitConfig {
        seed: Some(5),
        ..BlitConfig::default()
    };
    let mut engine = BlitEngine::from_config(&config).unwrap();
    let mut recorder = CommandRecorder::new();

    engine
        .on_render_request(Region::new(0.0, 0.0, 100.0, 50.0), &mut recorder)
        .unwrap();
    for _ in 0..1000 {
        engine.on_mutation_tick();
    }

    recorder.begin_frame();
    engine
        .on_render_request(Region::new(0.0, 0.0, 100.0, 50.0), &mut recorder)
        .unwrap();

    let mut lines = 0;
    for command in recorder.commands() {
        if let DrawCommand::StrokeLine { from, to, .. } = command {
            lines += 1;
            for point in [from, to] {
                assert!((0.0..=100.0).contains(&point.x));
                assert!((0.0..=50.0).contains(&point.y));
            }
        }
    }
    assert_eq!(lines, 1000);
}

#[test]
fn test_zero_area_region_is_harmless() {
    let config = BlitConfig {
        seed: Some(8),
        ..BlitConfig::default()
    };
    let mut engine = BlitEngine::from_config(&config).unwrap();
    let mut recorder = CommandRecorder::new();

    engine.on_render_request(Region::ZERO, &mut recorder).unwrap();
    engine.on_mutation_tick();

    recorder.begin_frame();
    let report = engine.on_render_request(Region::ZERO, &mut recorder).unwrap();
    assert_eq!(report.drawn, 1);

    let Some(DrawCommand::StrokeLine { from, to, .. }) = recorder.commands().get(1) else {
        panic!("expected the collapsed line after the background");
    };
    assert_eq!((from.x, from.y), (0.0, 0.0));
    assert_eq!((to.x, to.y), (0.0, 0.0));

    let Some(DrawCommand::Text { position, .. }) = recorder.commands().last() else {
        panic!("expected the overlay");
    };
    assert_eq!((position.x, position.y), (0.0, 0.0));
}
