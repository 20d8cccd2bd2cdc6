//! CPU-side checks of the tunnel instance transform. The WGSL vertex shader
//! evaluates the same formula on the GPU; these tests pin the math down on
//! hand-computed cases so the two can't drift apart silently.

use vitrine::{
    instance_placement, Channels, PortfolioProgress, RowParams, Timeline, TunnelConfig,
};

fn channels(scroll: f32, spread: f32, letter_scale: f32) -> Channels {
    Channels {
        scroll,
        spread,
        letter_scale,
        portfolio_progress: PortfolioProgress(0.0),
    }
}

fn row(row_index: f32, instance_count: f32, row_speed: f32, depth_offset: f32) -> RowParams {
    RowParams {
        row_index,
        row_count: 4.0,
        instance_count,
        row_speed,
        depth_offset,
    }
}

#[test]
fn hand_computed_placement_of_an_open_edge_instance() {
    let config = TunnelConfig::default();
    // Fully open: spread 1, letter scale 1.9, no drift yet.
    let open = channels(0.0, 1.0, 1.9);
    let first_row = row(0.0, 20.0, 1.0, 0.0);

    // Slot 19: rightmost instance. spacing = 1.8 * 1.9 = 3.42,
    // local = 9, x = (9 + 0.5) * 3.42 = 32.49.
    let placement = instance_placement(19.0, &open, &first_row, &config);
    assert!((placement.offset[0] - 32.49).abs() < 1e-3);

    // Normalized distance 32.49 / 34.2 = 0.95; z = 0.95^2 * 9.
    assert!((placement.offset[2] - 8.1225).abs() < 1e-3);

    // Row 0 of 4 sits 1.5 steps above center; step = (2.18 - 0.60) * 1.9.
    let step = (2.18 - 0.60) * 1.9;
    assert!((placement.offset[1] - 1.5 * step).abs() < 1e-3);

    assert!((placement.y_stretch - (0.85 + 0.95 * 0.8)).abs() < 1e-3);
}

#[test]
fn drift_moves_every_instance_left_by_the_same_amount() {
    let config = TunnelConfig::default();
    let still = channels(0.0, 1.0, 1.9);
    let drifted = channels(0.5, 1.0, 1.9);
    let second_row = row(1.0, 24.0, 1.6, 0.0);

    // Expected shift: -scroll * 2 * row_speed * letter_scale * spread.
    let expected_shift = -0.5 * 2.0 * 1.6 * 1.9;
    for slot in 0..24 {
        let before = instance_placement(slot as f32, &still, &second_row, &config);
        let after = instance_placement(slot as f32, &drifted, &second_row, &config);
        assert!(
            (after.offset[0] - before.offset[0] - expected_shift).abs() < 1e-3,
            "slot {slot}"
        );
    }
}

#[test]
fn closed_state_collapses_all_instances_to_center() {
    let config = TunnelConfig::default();
    let closed = channels(1.0, 0.0, 1.0);
    for (count, speed) in [(20.0, 1.0), (24.0, 1.6), (22.0, 1.45)] {
        let params = row(0.0, count, speed, 0.0);
        for slot in 0..count as u32 {
            let placement = instance_placement(slot as f32, &closed, &params, &config);
            assert_eq!(placement.offset[0], 0.0);
            assert_eq!(placement.offset[2], 0.0);
        }
    }
}

#[test]
fn extrusion_layers_differ_only_in_depth() {
    let config = TunnelConfig::default();
    let open = channels(0.3, 1.0, 1.9);
    let front = row(2.0, 22.0, 1.45, 0.0);
    let back = row(2.0, 22.0, 1.45, -0.08);

    for slot in 0..22 {
        let front_placement = instance_placement(slot as f32, &open, &front, &config);
        let back_placement = instance_placement(slot as f32, &open, &back, &config);
        assert_eq!(front_placement.offset[0], back_placement.offset[0]);
        assert_eq!(front_placement.offset[1], back_placement.offset[1]);
        assert!(
            (front_placement.offset[2] - back_placement.offset[2] - 0.08).abs() < 1e-6
        );
        assert_eq!(front_placement.opacity, back_placement.opacity);
    }
}

#[test]
fn opacity_and_depth_stay_bounded_across_a_full_scroll() {
    let config = TunnelConfig::default();
    let timeline = Timeline::new((1920.0, 1080.0));
    for script_step in 0..=160 {
        let u = script_step as f32 / 160.0 * vitrine::TIMELINE_LENGTH;
        let frame = timeline.sample(u);
        for (row_index, (count, speed)) in
            [(20.0, 1.0), (24.0, 1.6), (22.0, 1.45), (22.0, 1.0)].iter().enumerate()
        {
            let params = row(row_index as f32, *count, *speed, 0.0);
            for slot in 0..*count as u32 {
                let placement =
                    instance_placement(slot as f32, &frame.channels, &params, &config);
                assert!((0.0..=1.0).contains(&placement.opacity), "u {u} slot {slot}");
                assert!(placement.offset[2] >= 0.0);
                assert!(placement.offset[2] <= config.depth_gain + 1e-4);
                assert!(placement.offset[0].is_finite());
            }
        }
    }
}
