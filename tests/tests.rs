use nannou::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use particles::{
    generator, ExternalForce, FrameInput, HashGrid, IndexedPoint, Particle, PopulationParams, QuadTree, Region,
    Simulation, SimulationParams,
};

/// World used by most tests, 500 x 281.25 centered on the origin
pub fn test_world() -> Region {
    Region::new(Vec2::ZERO, vec2(250.0, 140.625))
}

/// Deterministic parameters without gravity
pub fn test_params() -> SimulationParams {
    SimulationParams {
        enable_parallel: false,
        gravity: [0.0, 0.0],
        ..Default::default()
    }
}

/// Random points inside `region`, plus points sitting on its edges and midlines
pub fn random_points(rng: &mut StdRng, region: &Region, n: usize) -> Vec<IndexedPoint> {
    let b = region.bounds();
    let c = region.center();
    let edges = [
        vec2(b.xmin, b.ymin),
        vec2(b.xmin, c.y),
        vec2(c.x, c.y),
        vec2(c.x, b.ymin),
        vec2(b.xmax, c.y),
        vec2(c.x, b.ymax),
    ];

    (0..n)
        .map(|id| {
            let position = if id % 10 == 0 {
                edges[(id / 10) % edges.len()]
            } else {
                vec2(rng.gen_range(b.xmin..b.xmax), rng.gen_range(b.ymin..b.ymax))
            };
            IndexedPoint { id, position }
        })
        .collect()
}

fn sorted_ids(points: impl IntoIterator<Item = IndexedPoint>) -> Vec<usize> {
    let mut ids: Vec<usize> = points.into_iter().map(|p| p.id).collect();
    ids.sort_unstable();
    ids
}

// ==================================================================================
// Region tests
// ==================================================================================

#[test]
fn quadrants_partition_random_points() {
    let mut rng = StdRng::seed_from_u64(11);
    let region = Region::new(vec2(3.7, -1.3), vec2(17.1, 9.9));
    let quadrants = region.quadrants();

    for p in random_points(&mut rng, &region, 2000) {
        let owners = quadrants.iter().filter(|q| q.contains(p.position)).count();
        let expected = <usize as From<bool>>::from(region.contains(p.position));
        assert_eq!(owners, expected, "point {:?}", p.position);
    }
}

// ==================================================================================
// QuadTree tests
// ==================================================================================

#[test]
fn query_matches_brute_force() {
    let world = test_world();
    let mut rng = StdRng::seed_from_u64(42);

    for &n in &[0usize, 1, 16, 17, 1000] {
        let points = random_points(&mut rng, &world, n);
        let mut tree = QuadTree::new(world);
        let inserted = tree.batch_insert(points.iter().copied());

        let stored: Vec<IndexedPoint> = points.iter().copied().filter(|p| world.contains(p.position)).collect();
        assert_eq!(inserted, stored.len());
        assert_eq!(tree.len(), stored.len());

        let mut windows = vec![world, Region::around(Vec2::ZERO, 10.0), world.quadrants()[1]];
        for _ in 0..30 {
            let center = vec2(rng.gen_range(-260.0..260.0), rng.gen_range(-150.0..150.0));
            let half = vec2(rng.gen_range(0.5..80.0), rng.gen_range(0.5..80.0));
            windows.push(Region::new(center, half));
        }

        for window in &windows {
            let expected = sorted_ids(stored.iter().copied().filter(|p| window.contains(p.position)));
            assert_eq!(sorted_ids(tree.query(window)), expected, "n = {}, window = {:?}", n, window);
        }
    }
}

#[test]
fn points_outside_root_are_rejected() {
    let world = test_world();
    let mut tree: QuadTree<Vec2> = QuadTree::new(world);

    assert!(!tree.insert(vec2(250.0, 0.0)));
    assert!(!tree.insert(vec2(0.0, 500.0)));
    assert!(tree.insert(vec2(-250.0, -140.625)));
    assert_eq!(tree.len(), 1);
}

#[test]
fn coincident_points_do_not_split_forever() {
    let mut tree: QuadTree<Vec2> = QuadTree::with_capacity(test_world(), 4);
    for _ in 0..100 {
        assert!(tree.insert(vec2(1.0, 1.0)));
    }
    assert_eq!(tree.query(&Region::around(vec2(1.0, 1.0), 0.5)).len(), 100);
}

// ==================================================================================
// Particle tests
// ==================================================================================

#[test]
fn free_particle_moves_in_a_straight_line() {
    let velocity = vec2(0.3, -0.2);
    let start = vec2(-5.0, 4.0);
    let mut p = Particle::new(start, velocity, 1.0, 2.0);

    for k in 1..=50 {
        p.update(1.0 / 144.0);
        let expected = start + velocity * k as f32;
        assert!((p.position() - expected).length() < 1e-3);
        assert!((p.position() - p.position_old() - velocity).length() < 1e-4);
    }
}

#[test]
fn wall_bounce_is_damped_on_every_side() {
    let bounds = test_world().bounds();
    let wall_damping = 0.1;

    let cases = [
        (vec2(bounds.xmax - 0.5, 0.0), vec2(2.0, 0.0)),
        (vec2(bounds.xmin + 0.5, 0.0), vec2(-2.0, 0.0)),
        (vec2(0.0, bounds.ymax - 0.5), vec2(0.0, 3.0)),
        (vec2(0.0, bounds.ymin + 0.5), vec2(0.0, -3.0)),
    ];

    for (position, velocity) in cases {
        let mut p = Particle::new(position, velocity, 1.0, 1.0);
        p.handle_boundaries(&bounds, wall_damping);

        let after = p.velocity();
        assert!((after - (-velocity * wall_damping)).length() < 1e-4, "{:?} -> {:?}", velocity, after);

        let b = p.position();
        assert!(b.x - 1.0 >= bounds.xmin - 1e-4 && b.x + 1.0 <= bounds.xmax + 1e-4);
        assert!(b.y - 1.0 >= bounds.ymin - 1e-4 && b.y + 1.0 <= bounds.ymax + 1e-4);

        // The next step moves away from the wall
        p.update(0.0);
        assert!((p.velocity() - (-velocity * wall_damping)).length() < 1e-4);
    }
}

#[test]
fn collision_reduces_overlap_and_splits_by_mass() {
    let mut rng = StdRng::seed_from_u64(5);

    for _ in 0..100 {
        let m1 = rng.gen_range(0.5..5.0);
        let m2 = rng.gen_range(0.5..5.0);
        let offset = vec2(rng.gen_range(-1.5..1.5), rng.gen_range(-1.5..1.5));
        let mut a = Particle::at_rest(Vec2::ZERO, 1.0, m1);
        let mut b = Particle::at_rest(offset, 1.0, m2);

        let overlap_before = 2.0 - offset.length();
        if overlap_before <= 0.0 || offset.length() < 1e-3 {
            continue;
        }

        assert!(a.solve_collision(&mut b, 0.3));

        let overlap_after = 2.0 - a.position().distance(b.position());
        assert!(overlap_after < overlap_before);
        assert!(overlap_after > 0.0);

        let moved_a = a.position().length();
        let moved_b = (b.position() - offset).length();
        assert!((moved_a * m1 - moved_b * m2).abs() < 1e-4);
    }
}

// ==================================================================================
// HashGrid tests
// ==================================================================================

#[test]
fn hash_grid_round_trip() {
    let mut rng = StdRng::seed_from_u64(9);
    let mut grid = HashGrid::for_max_radius(2.0).unwrap();
    let points = random_points(&mut rng, &test_world(), 500);

    assert_eq!(grid.batch_insert(points.iter().map(|p| (p.id, p.position))), 500);
    assert_eq!(grid.count(), 500);

    for p in &points {
        assert!(grid.remove(p.id));
    }
    assert_eq!(grid.count(), 0);
    assert_eq!(grid.cell_count(), 0);
    assert!(points.iter().all(|p| !grid.contains(p.id)));
}

#[test]
fn hash_grid_update_relocates_particle() {
    let mut grid = HashGrid::new(4.0).unwrap();
    grid.insert(7, vec2(1.0, 1.0));

    let target = vec2(101.0, -37.0);
    assert!(grid.update(7, target));

    assert!(grid.query(target).contains(&7));
    assert!(!grid.query(vec2(1.0, 1.0)).contains(&7));
    assert_eq!(grid.count(), 1);
}

#[test]
fn grid_sized_for_max_radius_finds_every_overlap() {
    let mut rng = StdRng::seed_from_u64(17);
    let max_radius = 1.5;
    let mut grid = HashGrid::for_max_radius(max_radius).unwrap();
    let cell = grid.cell_size();
    assert_eq!(cell, 2.0 * max_radius);

    // Dense random discs
    let mut discs: Vec<(Vec2, f32)> = (0..600)
        .map(|_| {
            let position = vec2(rng.gen_range(-30.0..30.0), rng.gen_range(-30.0..30.0));
            (position, rng.gen_range(0.1..=max_radius))
        })
        .collect();

    // Overlapping pairs straddling cell edges, including diagonal corners
    for k in -5..5 {
        let edge = k as f32 * cell;
        let r1 = rng.gen_range(0.5..=max_radius);
        let r2 = rng.gen_range(0.5..=max_radius);
        let gap = 0.999 * (r1 + r2);
        discs.push((vec2(edge - gap / 2.0, 1.0), r1));
        discs.push((vec2(edge + gap / 2.0, 1.0), r2));
        discs.push((vec2(edge - 0.01, edge - 0.01), r1));
        discs.push((vec2(edge - 0.01 + gap * 0.7, edge - 0.01 + gap * 0.7), r2));
    }

    grid.batch_insert(discs.iter().enumerate().map(|(id, &(position, _))| (id, position)));

    let mut pairs = 0;
    for (i, &(pi, ri)) in discs.iter().enumerate() {
        let found = grid.query(pi);
        for (j, &(pj, rj)) in discs.iter().enumerate() {
            if i != j && pi.distance(pj) <= ri + rj {
                pairs += 1;
                assert!(found.contains(&j), "{} at {:?} misses {} at {:?}", i, pi, j, pj);
            }
        }
    }
    assert!(pairs > 0);
}

// ==================================================================================
// Simulation tests
// ==================================================================================

#[test]
fn particles_stay_in_world_under_gravity() {
    let world = test_world();
    let population = PopulationParams {
        count: 800,
        seed: Some(3),
        ..Default::default()
    };
    let params = SimulationParams {
        enable_parallel: false,
        ..Default::default()
    };
    let mut sim = Simulation::new(generator::generate(&population, &world), world, params).unwrap();
    let margin = sim.max_radius() * 2.0;

    for _ in 0..60 {
        sim.update(vec![]);
    }

    assert_eq!(sim.len(), 800);
    let b = world.bounds();
    for p in sim.particles() {
        assert!(p.position().is_finite());
        assert!(p.position().x >= b.xmin - margin && p.position().x <= b.xmax + margin);
        assert!(p.position().y >= b.ymin - margin && p.position().y <= b.ymax + margin);
    }
}

#[test]
fn parallel_pass_keeps_population_consistent() {
    let world = test_world();
    let population = PopulationParams {
        count: 2000,
        seed: Some(21),
        ..Default::default()
    };
    let params = SimulationParams {
        enable_parallel: true,
        ..Default::default()
    };
    let mut sim = Simulation::new(generator::generate(&population, &world), world, params).unwrap();

    for _ in 0..10 {
        let stats = sim.update(vec![ExternalForce::pointer(Vec2::ZERO, 100.0, 250.0, true)]);
        assert!(stats.node_count >= 1);
    }

    assert_eq!(sim.len(), 2000);
    assert!(sim.particles().iter().all(|p| p.validate().is_none()));
}

#[test]
fn sequential_runs_are_reproducible() {
    let world = test_world();
    let population = PopulationParams {
        count: 300,
        seed: Some(8),
        ..Default::default()
    };

    let run = || {
        let mut sim = Simulation::new(
            generator::generate(&population, &world),
            world,
            SimulationParams {
                enable_parallel: false,
                ..Default::default()
            },
        )
        .unwrap();
        for _ in 0..20 {
            sim.update(vec![]);
        }
        sim.particles().to_vec()
    };

    assert_eq!(run(), run());
}

#[test]
fn pointer_attraction_pulls_particles_in() {
    let particles = vec![
        Particle::at_rest(vec2(-20.0, 0.0), 1.0, 1.0),
        Particle::at_rest(vec2(20.0, 0.0), 1.0, 1.0),
        Particle::at_rest(vec2(0.0, 120.0), 1.0, 1.0),
    ];
    let mut sim = Simulation::new(particles, test_world(), test_params()).unwrap();

    let input = FrameInput {
        world: test_world(),
        dt: 1.0 / 144.0,
        substeps: 8,
        forces: vec![ExternalForce::pointer(Vec2::ZERO, 50.0, 250.0, true)],
    };
    for _ in 0..10 {
        sim.step(&input);
    }

    let p = sim.particles();
    assert!(p[0].position().x > -20.0);
    assert!(p[1].position().x < 20.0);
    // Outside the pointer window
    assert_eq!(p[2].position(), vec2(0.0, 120.0));
}

#[test]
fn overlapping_particles_drift_apart() {
    let particles = vec![
        Particle::at_rest(vec2(0.0, 0.0), 2.0, 1.0),
        Particle::at_rest(vec2(1.0, 0.5), 2.0, 1.0),
        Particle::at_rest(vec2(-0.5, 1.0), 2.0, 1.0),
    ];
    let mut sim = Simulation::new(particles, test_world(), test_params()).unwrap();

    let min_gap = |sim: &Simulation| {
        let p = sim.particles();
        let mut gap = f32::MAX;
        for i in 0..p.len() {
            for j in i + 1..p.len() {
                gap = gap.min(p[i].position().distance(p[j].position()));
            }
        }
        gap
    };

    let before = min_gap(&sim);
    sim.update(vec![]);
    assert!(min_gap(&sim) > before);
}

// ==================================================================================
// Scenario tests
// ==================================================================================

#[test]
fn bundled_scenarios_build_simulations() {
    let dir = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios");

    for name in ["dense.yaml", "zero_gravity.yaml"] {
        let scenario = particles::config::ScenarioConfig::load(&dir.join(name)).unwrap();
        let sim = particles::app::build_simulation(&scenario).unwrap();
        assert_eq!(sim.len(), scenario.population.count);
    }
}

#[test]
fn invalid_scenario_falls_back_to_defaults() {
    let scenario = particles::config::ScenarioConfig::from_yaml(
        "population:\n  count: 5\n  velocity: [.nan, .nan]\n  seed: 1\n",
    )
    .unwrap();
    assert!(particles::app::build_simulation(&scenario).is_err());

    let (sim, used) = particles::app::build_simulation_or_default(scenario);
    assert_eq!(used.population.count, PopulationParams::default().count);
    assert_eq!(sim.len(), used.population.count);
    assert!(sim.particles().iter().all(|p| p.validate().is_none()));
}

#[test]
fn invalid_world_falls_back_to_defaults() {
    let scenario =
        particles::config::ScenarioConfig::from_yaml("world:\n  half_extent: [0.0, 10.0]\npopulation:\n  count: 3\n")
            .unwrap();

    let (sim, _) = particles::app::build_simulation_or_default(scenario);
    assert_eq!(sim.world().width(), 500.0);
}
