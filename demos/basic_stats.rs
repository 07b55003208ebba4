//! Basic example of tracking exploration statistics.
//!
//! Run with: cargo run --example basic_stats

use exploration_stats::{
    calculate_totals_from_history, create_initial_state, end_current_session, format_area,
    format_distance, format_time, format_time_as_timer, increment_stats, partition_sessions,
    start_new_session, GeoSample, StatsConfig,
};

fn main() {
    let config = StatsConfig::default();

    // A walk around London with jitter, one bad fix and a long break
    let history = vec![
        GeoSample::new(51.5074, -0.1278, 0), // Start
        GeoSample::new(51.5080, -0.1278, 30_000),
        GeoSample::new(51.50802, -0.1278, 60_000), // Jitter
        GeoSample::new(51.5090, -0.1278, 90_000),
        GeoSample::new(52.5000, -0.1278, 100_000), // Bad fix
        GeoSample::new(51.5100, -0.1278, 120_000),
        GeoSample::new(51.5100, -0.1278, 2_000_000), // After a 30 minute break
        GeoSample::new(51.5110, -0.1278, 2_030_000),
        GeoSample::new(51.5120, -0.1278, 2_060_000), // End
    ];

    println!("Exploration Stats Example\n");
    println!(
        "Config: gap={}ms, min_move={}m, max_jump={}m, max_speed={}m/s, corridor={}m\n",
        config.session_gap_threshold_ms,
        config.min_movement_meters,
        config.max_plausible_jump_meters,
        config.max_plausible_speed_mps,
        config.reveal_corridor_width_meters
    );

    // 1. Batch recompute
    let state = calculate_totals_from_history(&history, &config);
    println!("1. Recomputed from history:");
    println!("   Distance: {}", format_distance(state.total.distance_meters));
    println!("   Area: {}", format_area(state.total.area_square_meters));
    println!("   Active: {}\n", format_time(state.total.active_time_ms));

    // 2. Sessions found in the history
    println!("2. Sessions:");
    for s in partition_sessions(&history, &config) {
        println!(
            "   #{}: {} samples, {} in {}",
            s.sequence,
            s.sample_count,
            format_distance(s.totals.distance_meters),
            format_time_as_timer(s.totals.active_time_ms)
        );
    }
    println!();

    // 3. Live replay with a pause
    let mut live = create_initial_state();
    for sample in &history[..4] {
        live = increment_stats(&live, *sample, &config);
    }
    let paused = end_current_session(&live);
    let resumed = start_new_session(&paused);
    println!("3. Live tracking, paused after 4 samples:");
    println!("   Lifetime: {}", format_distance(resumed.total.distance_meters));
    println!("   Session after resume: {}", format_distance(resumed.session.distance_meters));
}
