use holon_kinematics::{Chassis, Motion, Pose};

// Dead reckoning for the odometry loop: reconstruct the motion the chassis
// actually achieved from the wheel speeds the controller applied, then
// integrate it into the pose estimate over the elapsed interval.
pub fn dead_reckon(
    chassis: &Chassis,
    pose: &Pose,
    wheel_speeds: &[f64],
    dt: f64,
) -> anyhow::Result<Pose> {
    let measured: Motion = chassis.motion(wheel_speeds)?;
    Ok(pose.advance(measured, dt))
}
