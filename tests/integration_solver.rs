//! End-to-end checks of the simulator and the inverse solver through the
//! public API.

use approx::assert_relative_eq;

use launcher_engine::constants::{EARTH_GRAVITY_MPS2, HIT_TOLERANCE_M};
use launcher_engine::energy::mechanical_energy_series;
use launcher_engine::{
    select_best, Environment, EnvironmentParams, LaunchState, Launcher, LauncherError, Projectile,
    ShotSolver, SimulationSettings, SolutionQuality, SolverConfig, Target, TrajectorySimulator,
};

fn still_air() -> Environment {
    Environment::default()
}

fn vacuum() -> Environment {
    Environment {
        air_density: 0.0,
        ..Environment::default()
    }
}

#[test]
fn test_vacuum_range_matches_closed_form() {
    let simulator = TrajectorySimulator::new(vacuum(), Projectile::default());
    let launch = LaunchState::new(30.0, 40.0, 0.0);
    let trajectory = simulator
        .simulate(&launch, &SimulationSettings::default())
        .unwrap();

    let landing = trajectory.landing_point().expect("shot should land");
    let theta = 40.0_f64.to_radians();
    let expected = 30.0 * 30.0 * (2.0 * theta).sin() / EARTH_GRAVITY_MPS2;
    assert_relative_eq!(landing.position.x, expected, max_relative = 1e-3);
    assert!(landing.position.z.abs() < 1e-6);
}

#[test]
fn test_mechanical_energy_never_increases_under_drag() {
    let projectile = Projectile::default();
    let simulator = TrajectorySimulator::new(still_air(), projectile);
    let launch = LaunchState::new(25.0, 50.0, 0.0);
    let trajectory = simulator
        .simulate(&launch, &SimulationSettings::default())
        .unwrap();

    let series = mechanical_energy_series(projectile.mass, EARTH_GRAVITY_MPS2, &trajectory);
    assert!(series.len() > 10);
    for pair in series.windows(2) {
        assert!(
            pair[1] <= pair[0] + 1e-9,
            "energy rose from {} to {}",
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn test_crosswind_drifts_landing_downwind() {
    let params = EnvironmentParams {
        wind_speed: Some(6.0),
        wind_direction_deg: Some(90.0),
        ..EnvironmentParams::default()
    };
    let simulator = TrajectorySimulator::new(params.resolve().unwrap(), Projectile::default());
    let launch = LaunchState::new(25.0, 45.0, 0.0);
    let trajectory = simulator
        .simulate(&launch, &SimulationSettings::default())
        .unwrap();

    // Wind blowing toward +z pushes the shot off the x axis
    let landing = trajectory.landing_point().unwrap();
    assert!(landing.position.z > 0.1);
}

#[test]
fn test_solver_hits_offset_target() {
    let solver = ShotSolver::new(still_air(), Projectile::default());
    let launcher = Launcher::new(120.0).unwrap();
    let target = Target::new(40.0, 0.0, 30.0);

    let solution = solver.solve(&target, &launcher).unwrap();

    assert_eq!(solution.quality, SolutionQuality::Hit);
    assert!(solution.miss_distance < HIT_TOLERANCE_M);

    // Drag can only demand more speed than the vacuum minimum for the
    // same ground distance
    let vacuum_floor = (target.horizontal_distance() * EARTH_GRAVITY_MPS2).sqrt();
    assert!(solution.velocity >= vacuum_floor * 0.999);

    // With no wind the solved azimuth stays close to the geometric bearing
    assert!((solution.azimuth_deg - target.bearing_deg()).abs() < 3.0);
    assert!(solution.pullback > 0.0);
}

#[test]
fn test_solver_aims_upwind_of_bearing() {
    let params = EnvironmentParams {
        wind_speed: Some(8.0),
        wind_direction_deg: Some(90.0),
        ..EnvironmentParams::default()
    };
    let solver = ShotSolver::new(params.resolve().unwrap(), Projectile::default());
    let launcher = Launcher::new(120.0).unwrap();
    let target = Target::new(50.0, 0.0, 0.0);

    let solution = solver.solve(&target, &launcher).unwrap();

    // Wind pushes toward +z, so the shot must be biased toward -z
    assert!(solution.azimuth_deg < 0.0);
    assert!(solution.miss_distance < HIT_TOLERANCE_M);
}

#[test]
fn test_solve_returns_the_selected_candidate() {
    let solver = ShotSolver::new(still_air(), Projectile::default());
    let launcher = Launcher::new(120.0).unwrap();
    let target = Target::new(40.0, 0.0, 30.0);

    let solution = solver.solve(&target, &launcher).unwrap();

    // Rebuild the sweep serially; solve must hand back exactly the candidate
    // the selection policy names, not a neighbor
    let mut candidates = Vec::new();
    let config = *solver.config();
    let mut angle = config.angle_min_deg;
    while angle <= config.angle_max_deg + 1e-9 {
        if let Ok(candidate) = solver.solve_for_angle(angle, &target) {
            candidates.push(candidate);
        }
        angle += config.angle_step_deg;
    }
    let (index, _) = select_best(&candidates, config.hit_tolerance).unwrap();
    assert_eq!(solution.launch_angle_deg, candidates[index].angle_deg);
    assert_eq!(solution.velocity, candidates[index].speed);
    assert_eq!(solution.miss_distance, candidates[index].miss_distance);
}

#[test]
fn test_solver_is_deterministic() {
    let solver = ShotSolver::new(still_air(), Projectile::default());
    let launcher = Launcher::new(120.0).unwrap();
    let target = Target::new(60.0, 0.0, -20.0);

    let first = solver.solve(&target, &launcher).unwrap();
    let second = solver.solve(&target, &launcher).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_target_beyond_drag_limit_degrades() {
    // The stock balloon tops out near 79 m of range; 111.8 m is out of reach
    // but close enough that the best candidate survives rejection
    let solver = ShotSolver::new(still_air(), Projectile::default());
    let launcher = Launcher::new(120.0).unwrap();
    let target = Target::new(100.0, 0.0, 50.0);

    let solution = solver.solve(&target, &launcher).unwrap();
    assert_eq!(solution.quality, SolutionQuality::Degraded);
    assert!(solution.miss_distance > HIT_TOLERANCE_M);
    assert!(solution.miss_distance < 100.0);
}

#[test]
fn test_far_target_is_unreachable() {
    let solver = ShotSolver::new(still_air(), Projectile::default());
    let launcher = Launcher::new(120.0).unwrap();
    let target = Target::new(10_000.0, 0.0, 0.0);

    let result = solver.solve(&target, &launcher);
    assert_eq!(result, Err(LauncherError::TargetUnreachable));
}

#[test]
fn test_zero_hit_tolerance_degrades_solution() {
    let config = SolverConfig {
        hit_tolerance: 0.0,
        ..SolverConfig::default()
    };
    let solver = ShotSolver::with_config(
        still_air(),
        Projectile::default(),
        config,
        SimulationSettings::default(),
    );
    let launcher = Launcher::new(120.0).unwrap();
    let target = Target::new(40.0, 0.0, 0.0);

    let solution = solver.solve(&target, &launcher).unwrap();
    assert_eq!(solution.quality, SolutionQuality::Degraded);
    assert!(!solution.is_hit());
}

#[test]
fn test_pullback_round_trips_to_solved_speed() {
    let projectile = Projectile::default();
    let solver = ShotSolver::new(still_air(), projectile);
    let launcher = Launcher::new(150.0).unwrap();
    let target = Target::new(35.0, 0.0, 10.0);

    let solution = solver.solve(&target, &launcher).unwrap();
    let recovered = launcher.speed_for_pullback(solution.pullback, projectile.mass);
    assert_relative_eq!(recovered, solution.velocity, max_relative = 1e-12);
}

#[test]
fn test_solution_serializes_for_boundary_layers() {
    let solver = ShotSolver::new(still_air(), Projectile::default());
    let launcher = Launcher::new(120.0).unwrap();
    let solution = solver.solve(&Target::new(30.0, 0.0, 0.0), &launcher).unwrap();

    let json: serde_json::Value = serde_json::to_value(&solution).unwrap();
    assert!(json["launch_angle_deg"].is_f64());
    assert!(json["pullback"].is_f64());
    assert_eq!(json["quality"], "Hit");
    assert!(json["trajectory"]["samples"].as_array().unwrap().len() > 2);
}

#[test]
fn test_elevated_target_lands_at_ground_level() {
    // The simulator grounds at y = 0; a target with y != 0 only shifts the
    // aim point, landing samples stay on the ground plane
    let solver = ShotSolver::new(still_air(), Projectile::default());
    let launcher = Launcher::new(120.0).unwrap();
    let target = Target::new(45.0, 2.0, 0.0);

    let solution = solver.solve(&target, &launcher).unwrap();
    let landing = solution.trajectory.landing_point().unwrap();
    assert!(landing.position.y.abs() < 1e-6);
}
