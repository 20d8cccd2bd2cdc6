//! End-to-end choreography checks: a scripted traversal of the pinned
//! scroll region drives the timeline, the carousel and the tunnel channels
//! together, the way a frame loop would.

use std::time::{Duration, Instant};

use vitrine::{Channels, PortfolioProgress, Timeline, TIMELINE_LENGTH};
use vitrine_test_scenes::{
    band_field, circular_pointer_trace, demo_carousel, scroll_script, sphere_field,
};

#[test]
fn full_traversal_is_a_round_trip() {
    let timeline = Timeline::new((1920.0, 1080.0));
    let script = scroll_script();

    let first = timeline.sample(*script.first().unwrap());
    let last = timeline.sample(TIMELINE_LENGTH);
    assert_eq!(first.channels, Channels::INITIAL);
    assert_eq!(last.channels, Channels::INITIAL);
    assert_eq!(first.mask, last.mask);

    // The interior actually goes somewhere.
    let mid = timeline.sample(TIMELINE_LENGTH / 2.0);
    assert!(mid.channels.scroll > 0.0);
    assert!(mid.channels.spread > 0.0);
}

#[test]
fn carousel_follows_the_portfolio_channel() {
    let timeline = Timeline::new((1920.0, 1080.0));
    let carousel = demo_carousel();

    // Before the drift starts, every card waits off-screen right.
    let parked = timeline.sample(0.5);
    for transform in carousel.transforms(parked.channels.portfolio_progress) {
        assert!(transform.translate_x >= 1920.0);
    }

    // Somewhere mid-drift at most two cards are in motion, and motion only
    // ever goes left as progress advances.
    let mut previous_positions: Option<Vec<f32>> = None;
    for u in scroll_script() {
        let frame = timeline.sample(u);
        assert!(carousel.in_transit(frame.channels.portfolio_progress) <= 2);

        let positions: Vec<f32> = carousel
            .transforms(frame.channels.portfolio_progress)
            .iter()
            .map(|transform| transform.translate_x)
            .collect();
        if u > 1.0 && u < 7.0 {
            if let Some(previous) = &previous_positions {
                for (now, before) in positions.iter().zip(previous) {
                    assert!(now <= before);
                }
            }
            previous_positions = Some(positions);
        }
    }

    // After the drift, every card has fully exited left.
    let done = carousel.transforms(PortfolioProgress(1.0));
    for transform in done {
        assert!(transform.translate_x < 0.0);
    }
}

#[test]
fn fields_settle_after_a_pointer_sweep() {
    for mut engine in [band_field(), sphere_field()] {
        assert!(!engine.particles().is_empty());

        let mut now = Instant::now();
        let trace = circular_pointer_trace((400.0, 400.0), 150.0, 120);
        for position in trace {
            engine.pointer_moved(position, now);
            engine.update(now);
            now += Duration::from_millis(16);
        }

        // Let the debounce lapse and the springs pull everything home.
        now += Duration::from_millis(100);
        for _ in 0..1500 {
            engine.update(now);
            now += Duration::from_millis(16);
        }
        for particle in engine.particles() {
            assert_eq!(particle.x, particle.target_x);
            assert_eq!(particle.y, particle.target_y);
        }
    }
}
