use approx::{assert_abs_diff_eq, assert_relative_eq};
use glam::Vec3;
use rust_bepuphysics_contact::utilities::vector::LANES;
use rust_bepuphysics_contact::{
    Bodies, BodyDescription, BodyHandle, BodyInertia, ConstantAcceleration, ConstraintContactData,
    Contact4, ContactSolver, SolveDescription,
};

const DT: f32 = 1.0 / 60.0;

/// A unit-mass sphere of radius 0.5 touching whatever lies 0.5 below its center.
fn single_contact(depth: f32) -> Contact4 {
    Contact4 {
        contacts: [
            ConstraintContactData::new(Vec3::new(0.0, -0.5, 0.0), depth),
            ConstraintContactData::inactive(),
            ConstraintContactData::inactive(),
            ConstraintContactData::inactive(),
        ],
        offset_b: Vec3::new(0.0, -1.0, 0.0),
        normal: Vec3::Y,
        ..Contact4::default()
    }
}

fn sphere(velocity: Vec3) -> BodyDescription {
    BodyDescription::create_dynamic(velocity, BodyInertia::solid_sphere(1.0, 0.5))
}

fn sphere_on_ground(velocity: Vec3) -> (Bodies, BodyHandle, BodyHandle) {
    let mut bodies = Bodies::new();
    let ground = bodies.add(&BodyDescription::create_kinematic(Vec3::ZERO));
    let sphere = bodies.add(&sphere(velocity));
    (bodies, sphere, ground)
}

#[test]
fn resting_contact_balances_gravity() {
    let (mut bodies, sphere, ground) = sphere_on_ground(Vec3::ZERO);
    let mut solver = ContactSolver::new(SolveDescription::default()).unwrap();
    let handle = solver.add(sphere, ground, &single_contact(0.0), &bodies).unwrap();
    let mut gravity = ConstantAcceleration::gravity();

    for _ in 0..60 {
        solver.step(&mut bodies, DT, &mut gravity).unwrap();
    }
    assert_relative_eq!(
        solver.total_impulse(handle).unwrap(),
        10.0 * DT,
        max_relative = 1e-3
    );
    let velocity = bodies.velocity(sphere).unwrap();
    assert!(velocity.linear.y.abs() < 0.02);
    assert_eq!(bodies.velocity(ground).unwrap().linear, Vec3::ZERO);
}

#[test]
fn resting_contact_with_substeps() {
    let (mut bodies, sphere, ground) = sphere_on_ground(Vec3::ZERO);
    let mut solver = ContactSolver::new((4u32, 4u32)).unwrap();
    let handle = solver.add(sphere, ground, &single_contact(0.0), &bodies).unwrap();
    let mut gravity = ConstantAcceleration::gravity();

    for _ in 0..60 {
        solver.step(&mut bodies, DT, &mut gravity).unwrap();
    }
    assert_relative_eq!(
        solver.total_impulse(handle).unwrap(),
        10.0 * DT,
        max_relative = 1e-3
    );
    assert_relative_eq!(
        solver.average_force(handle).unwrap(),
        10.0,
        max_relative = 1e-3
    );
    // Depth tracking between substeps adds a little corrective bias to the last substep.
    let last_substep: f32 = solver.substep_impulses(handle).unwrap().iter().sum();
    assert!(last_substep >= 10.0 * DT / 4.0);
    assert_relative_eq!(last_substep, 10.0 * DT / 4.0, max_relative = 0.15);
    assert!(bodies.velocity(sphere).unwrap().linear.y.abs() < 0.02);
}

#[test]
fn box_resting_on_four_corners() {
    let mut bodies = Bodies::new();
    let ground = bodies.add(&BodyDescription::create_kinematic(Vec3::ZERO));
    let cube = bodies.add(&BodyDescription::create_dynamic(
        Vec3::ZERO,
        BodyInertia::solid_box(1.0, 1.0, 1.0, 1.0),
    ));
    let corners = Contact4 {
        contacts: [
            ConstraintContactData::new(Vec3::new(0.5, -0.5, 0.5), 0.0),
            ConstraintContactData::new(Vec3::new(-0.5, -0.5, 0.5), 0.0),
            ConstraintContactData::new(Vec3::new(-0.5, -0.5, -0.5), 0.0),
            ConstraintContactData::new(Vec3::new(0.5, -0.5, -0.5), 0.0),
        ],
        offset_b: Vec3::new(0.0, -1.0, 0.0),
        normal: Vec3::Y,
        ..Contact4::default()
    };
    let mut solver = ContactSolver::new(SolveDescription::default()).unwrap();
    let handle = solver.add(cube, ground, &corners, &bodies).unwrap();
    let mut gravity = ConstantAcceleration::gravity();

    for _ in 0..120 {
        solver.step(&mut bodies, DT, &mut gravity).unwrap();
    }
    assert_relative_eq!(
        solver.total_impulse(handle).unwrap(),
        10.0 * DT,
        max_relative = 2e-2
    );
    for impulse in solver.step_impulses(handle).unwrap() {
        assert!(impulse >= 0.0);
    }
    let velocity = bodies.velocity(cube).unwrap();
    assert!(velocity.linear.y.abs() < 0.05);
    assert!(velocity.angular.length() < 0.05);
}

#[test]
fn head_on_spheres_stop_and_conserve_momentum() {
    let mut bodies = Bodies::new();
    let upper = bodies.add(&sphere(Vec3::new(0.0, -1.0, 0.0)));
    let lower = bodies.add(&sphere(Vec3::new(0.0, 1.0, 0.0)));
    let mut solver = ContactSolver::new(SolveDescription::default()).unwrap();
    let handle = solver.add(upper, lower, &single_contact(0.0), &bodies).unwrap();

    solver.step(&mut bodies, DT, &mut ()).unwrap();

    let upper_velocity = bodies.velocity(upper).unwrap().linear.y;
    let lower_velocity = bodies.velocity(lower).unwrap().linear.y;
    assert_abs_diff_eq!(upper_velocity + lower_velocity, 0.0, epsilon = 1e-5);
    // Softness leaves a small residual approach speed.
    let approach = upper_velocity - lower_velocity;
    assert!(
        approach <= 0.0 && approach > -0.2,
        "approach speed {}",
        approach
    );
    assert!(solver.total_impulse(handle).unwrap() > 0.9);
}

#[test]
fn well_separated_bodies_are_untouched() {
    let (mut bodies, sphere, ground) = sphere_on_ground(Vec3::new(0.0, -1.0, 0.0));
    let mut solver = ContactSolver::new(SolveDescription::default()).unwrap();
    let handle = solver.add(sphere, ground, &single_contact(-0.5), &bodies).unwrap();

    solver.step(&mut bodies, DT, &mut ()).unwrap();

    assert_eq!(solver.step_impulses(handle).unwrap(), [0.0; 4]);
    assert_eq!(
        bodies.velocity(sphere).unwrap().linear,
        Vec3::new(0.0, -1.0, 0.0)
    );
}

#[test]
fn speculative_contact_limits_approach_to_the_gap() {
    let gap = 0.1;
    let (mut bodies, sphere, ground) = sphere_on_ground(Vec3::new(0.0, -10.0, 0.0));
    let mut solver = ContactSolver::new(SolveDescription::default()).unwrap();
    let handle = solver.add(sphere, ground, &single_contact(-gap), &bodies).unwrap();

    solver.step(&mut bodies, DT, &mut ()).unwrap();

    // Approach is cut down to about gap / dt, plus the give of a soft constraint.
    let velocity = bodies.velocity(sphere).unwrap().linear.y;
    assert_abs_diff_eq!(velocity, -gap / DT, epsilon = 0.5);
    assert!(solver.total_impulse(handle).unwrap() > 0.0);
}

#[test]
fn slow_approach_within_the_gap_needs_no_impulse() {
    let (mut bodies, sphere, ground) = sphere_on_ground(Vec3::new(0.0, -3.0, 0.0));
    let mut solver = ContactSolver::new(SolveDescription::default()).unwrap();
    let handle = solver.add(sphere, ground, &single_contact(-0.1), &bodies).unwrap();

    solver.step(&mut bodies, DT, &mut ()).unwrap();

    assert_eq!(solver.total_impulse(handle).unwrap(), 0.0);
    assert_eq!(bodies.velocity(sphere).unwrap().linear.y, -3.0);
}

#[test]
fn deep_penetration_recovers_no_faster_than_the_cap() {
    let (mut bodies, sphere, ground) = sphere_on_ground(Vec3::ZERO);
    let mut solver = ContactSolver::new(SolveDescription::default()).unwrap();
    let mut description = single_contact(1.0);
    description.maximum_recovery_velocity = 2.0;
    solver.add(sphere, ground, &description, &bodies).unwrap();

    solver.step(&mut bodies, DT, &mut ()).unwrap();

    let velocity = bodies.velocity(sphere).unwrap().linear.y;
    assert!(
        velocity > 0.0 && velocity <= 2.0,
        "recovery velocity {}",
        velocity
    );
}

#[test]
fn warm_start_carries_impulses_into_the_next_step() {
    let (mut bodies, sphere, ground) = sphere_on_ground(Vec3::ZERO);
    let mut solver = ContactSolver::new(1u32).unwrap();
    let handle = solver.add(sphere, ground, &single_contact(0.0), &bodies).unwrap();
    let mut gravity = ConstantAcceleration::gravity();

    solver.step(&mut bodies, DT, &mut gravity).unwrap();
    let first = solver.total_impulse(handle).unwrap();
    solver.step(&mut bodies, DT, &mut gravity).unwrap();
    let second = solver.total_impulse(handle).unwrap();

    // A single iteration starting from zero undershoots; warm starting closes most of the gap.
    assert!(first < 10.0 * DT);
    assert!((10.0 * DT - second).abs() < (10.0 * DT - first).abs());
}

#[test]
fn every_lane_of_every_bundle_matches_a_lone_pair() {
    let pair_count = 3 * LANES + 1;
    let mut bodies = Bodies::new();
    let ground = bodies.add(&BodyDescription::create_kinematic(Vec3::ZERO));
    let mut solver = ContactSolver::new(SolveDescription::default()).unwrap();
    let mut pairs = Vec::new();
    for i in 0..pair_count {
        let speed = -1.0 - i as f32 * 0.25;
        let body = bodies.add(&sphere(Vec3::new(0.0, speed, 0.0)));
        let handle = solver.add(body, ground, &single_contact(0.01), &bodies).unwrap();
        pairs.push((speed, body, handle));
    }
    solver.step(&mut bodies, DT, &mut ()).unwrap();

    for (speed, body, handle) in pairs {
        let (mut lone_bodies, lone_sphere, lone_ground) =
            sphere_on_ground(Vec3::new(0.0, speed, 0.0));
        let mut lone_solver = ContactSolver::new(SolveDescription::default()).unwrap();
        let lone_handle = lone_solver
            .add(
                lone_sphere,
                lone_ground,
                &single_contact(0.01),
                &lone_bodies,
            )
            .unwrap();
        lone_solver.step(&mut lone_bodies, DT, &mut ()).unwrap();

        assert_relative_eq!(
            solver.total_impulse(handle).unwrap(),
            lone_solver.total_impulse(lone_handle).unwrap(),
            max_relative = 1e-5
        );
        assert_relative_eq!(
            bodies.velocity(body).unwrap().linear.y,
            lone_bodies.velocity(lone_sphere).unwrap().linear.y,
            max_relative = 1e-5
        );
    }
}
