use turnplan_kinematics::units::{deg_to_rad, rad_to_deg};
use turnplan_kinematics::*;

fn main() {
    let linear_speed = 0.7;
    let turn_angle = deg_to_rad(90.0);
    let transition_angle = deg_to_rad(25.0);
    let max_angular_speed = deg_to_rad(900.0);
    let sharpness = 1.0;
    let dt = TimeStep::default();

    println!("Planning S-curve turn...");
    println!("  Linear speed:      {} m/s", linear_speed);
    println!("  Turn angle:        {:.3} rad", turn_angle);
    println!("  Transition angle:  {:.3} rad", transition_angle);
    println!("  Max angular speed: {:.3} rad/s", max_angular_speed);
    println!("  Sharpness:         {}", sharpness);
    println!("  Time step:         {}", dt);

    let planner = match SCurvePlanner::new(transition_angle, max_angular_speed, sharpness, dt) {
        Ok(planner) => planner,
        Err(e) => {
            eprintln!("Failed to build planner: {}", e);
            return;
        }
    };

    match planner.plan(turn_angle) {
        Ok(profile) => {
            for event in profile.events() {
                println!(
                    "Step {:>4}: {} at {:.3}° after {:.2} mm",
                    event.step,
                    event.kind,
                    rad_to_deg(event.angle_turned),
                    event.distance(linear_speed, dt) * 1000.0
                );
            }

            let integrator = PoseIntegrator::new(dt);
            let trajectory = integrator.integrate(Pose::default(), linear_speed, profile.as_samples());

            println!("\nSimulation complete.");
            if let Some(last) = trajectory.final_pose() {
                println!("Final Pose: {}", last);
            }
            println!(
                "Max measured acceleration: {:.1} deg/s²",
                rad_to_deg(profile.peak_acceleration())
            );
            println!("Total time: {} ms", profile.duration_steps());
        }
        Err(e) => {
            eprintln!("Failed to plan turn: {}", e);
        }
    }
}
