use std::f64::consts::PI;

use holon_kinematics::*;

fn main() {
    let chassis = match Chassis::regular_triangle(290.0, 60.0, Some(2.0)) {
        Ok(chassis) => chassis,
        Err(e) => {
            eprintln!("Failed to build chassis: {:?}", e);
            return;
        }
    };

    println!("Chassis: {}", chassis);
    println!("  Max translation: {:.1} mm/s", chassis.max_translation_speed());
    println!("  Max rotation:    {:.2} rad/s", chassis.max_rotation_speed());

    // Forward at 200 mm/s while turning an eighth of a turn per second.
    let motion = Motion::new(Vector2::new(0.0, 200.0), PI / 4.0);
    let dt = 0.5; // Time step in seconds
    let num_steps = 16; // 16 * 0.5 s at PI/4 rad/s is exactly one lap

    let mut pose = Pose::new(Point2::ORIGIN, 0.0);
    println!("\nDriving {} along a circle...", motion);

    for i in 0..num_steps {
        let speeds = chassis.wheel_speeds_for_motion(motion);
        if speeds.scaling() < 1.0 {
            println!("  (request throttled to {:.0}%)", speeds.scaling() * 100.0);
        }
        // Round-trip through forward kinematics the way an odometry loop
        // fed by wheel encoders would.
        match chassis.motion(speeds.speeds()) {
            Ok(measured) => {
                pose = pose.advance(measured, dt);
                println!("Step {:>2}: {}", i + 1, pose);
            }
            Err(e) => {
                eprintln!("Error reconstructing motion at step {}: {:?}", i + 1, e);
                break;
            }
        }
    }

    println!("\nFinal pose: {}", pose);
}
