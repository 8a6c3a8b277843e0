mod blackboard;
mod bus;
mod config;
mod state_estimation;

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use parking_lot::RwLock;
use spin_sleep::SpinSleeper;
use tokio::sync::broadcast;
use tokio::time;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use holon_kinematics::{Chassis, Motion, Point2, Pose, Vector2};

use blackboard::{raise_fault, snapshot, touch_cmd, Blackboard};
use bus::Topic;
use crate::config::DriveConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let cfg = config::load()?;
    let chassis = Arc::new(
        Chassis::regular_triangle(
            cfg.chassis.wheel_distance_mm,
            cfg.chassis.wheel_radius_mm,
            cfg.chassis.max_wheel_speed_rps,
        )
        .context("invalid chassis geometry")?,
    );
    info!(
        %chassis,
        max_translation_mm_s = chassis.max_translation_speed(),
        max_rotation_rad_s = chassis.max_rotation_speed(),
        "Chassis ready"
    );

    let bb: Blackboard = Arc::default();
    let motion_topic: Topic<Motion> = Topic::new(4);
    let pose_topic: Topic<Pose> = Topic::new(16);
    let pose_rx_for_drive = pose_topic.subscribe();
    let applied_speeds: Arc<RwLock<Vec<f64>>> =
        Arc::new(RwLock::new(vec![0.0; chassis.wheels().len()]));

    info!("Spawning control thread...");
    std::thread::Builder::new()
        .name("control".into())
        .spawn({
            let bb = Arc::clone(&bb);
            let chassis = Arc::clone(&chassis);
            let applied_speeds = Arc::clone(&applied_speeds);
            let mut motion_rx = motion_topic.subscribe();
            move || {
                info!("Control thread started.");
                let sleeper = SpinSleeper::new(1_000);
                loop {
                    if let Ok(motion) = motion_rx.try_recv() {
                        let result = chassis.wheel_speeds_for_motion(*motion);
                        if result.scaling() < 1.0 {
                            warn!(
                                scaling = result.scaling(),
                                "Requested motion infeasible, throttling uniformly"
                            );
                        }
                        apply_wheel_speeds(result.speeds());
                        *applied_speeds.write() = result.speeds().to_vec();
                        {
                            let mut state = bb.write();
                            state.commanded = *motion;
                            state.wheel_speeds = result.speeds().to_vec();
                            state.scaling = result.scaling();
                        }
                        touch_cmd(&bb);
                    }
                    sleeper.sleep(Duration::from_micros(1_000));
                }
            }
        })?;

    info!("Spawning odometry thread...");
    std::thread::Builder::new()
        .name("odometry".into())
        .spawn({
            let bb = Arc::clone(&bb);
            let chassis = Arc::clone(&chassis);
            let applied_speeds = Arc::clone(&applied_speeds);
            let pose_topic = pose_topic.clone();
            let period = Duration::from_micros(1_000_000 / cfg.drive.odometry_rate_hz);
            move || {
                info!("Odometry thread started.");
                let sleeper = SpinSleeper::new(10_000);
                let dt = period.as_secs_f64();
                let mut pose = Pose::new(Point2::ORIGIN, 0.0);
                loop {
                    let speeds = applied_speeds.read().clone();
                    match state_estimation::dead_reckon(&chassis, &pose, &speeds, dt) {
                        Ok(next) => {
                            pose = next;
                            pose_topic.publish(pose);
                            bb.write().pose = pose;
                        }
                        Err(e) => {
                            // A degenerate chassis never becomes solvable;
                            // leave the estimate frozen and flag it once.
                            error!("Dead reckoning failed: {:?}", e);
                            raise_fault(&bb, "dead reckoning failed");
                            return;
                        }
                    }
                    sleeper.sleep(period);
                }
            }
        })?;

    info!("Starting async tasks (drive, watchdog)...");
    let drive_cfg = cfg.drive.clone();
    tokio::select! {
        result = drive_task(drive_cfg, Arc::clone(&chassis), Arc::clone(&bb), pose_rx_for_drive, motion_topic.clone()) => {
            info!("Drive task finished.");
            result?;
        }
        result = watchdog(Arc::clone(&bb)) => {
            result?;
        }
    }

    let final_state = snapshot(&bb);
    info!(pose = %final_state.pose, faults = ?final_state.faults, "Shutting down");
    Ok(())
}

/// Drive task: steers the chassis through the configured waypoints,
/// publishing motion commands at the control rate.
async fn drive_task(
    cfg: DriveConfig,
    chassis: Arc<Chassis>,
    bb: Blackboard,
    mut pose_rx: broadcast::Receiver<Arc<Pose>>,
    motion_tx: Topic<Motion>,
) -> anyhow::Result<()> {
    info!("Drive task started.");
    let mut ticker = time::interval(Duration::from_millis(1_000 / cfg.control_rate_hz));
    let mut current = snapshot(&bb).pose;
    let mut route: VecDeque<Pose> = cfg
        .waypoints
        .iter()
        .map(|&[x, y]| Pose::new(Point2::new(x, y), 0.0))
        .collect();
    // The chassis tells us what it can actually deliver; the P-controller
    // saturates against these rather than guessing.
    let max_translation = chassis.max_translation_speed();
    let max_rotation = chassis.max_rotation_speed();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let Some(target) = route.front() else {
                    motion_tx.publish(Motion::default());
                    info!("Route complete.");
                    return Ok(());
                };
                if current.distance_to(target) < cfg.position_tolerance_mm {
                    info!(waypoint = %target.position(), remaining = route.len() - 1, "Waypoint reached");
                    route.pop_front();
                    continue;
                }
                let motion = steer(&current, target, &cfg, max_translation, max_rotation);
                debug!(
                    vx = motion.translation.x,
                    vy = motion.translation.y,
                    omega = motion.rotation,
                    "Computed motion command"
                );
                motion_tx.publish(motion);
            }
            result = pose_rx.recv() => {
                match result {
                    Ok(new_pose) => {
                        current = *new_pose;
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("Pose receiver lagged by {} messages in drive task.", n);
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        error!("Pose channel closed. Drive task cannot continue.");
                        return Err(anyhow::anyhow!("Pose channel closed for drive task"));
                    }
                }
            }
        }
    }
}

/// Proportional steering towards a waypoint: translate straight at it in the
/// robot frame while turning to face it, both saturated at what the chassis
/// can deliver.
fn steer(
    current: &Pose,
    target: &Pose,
    cfg: &DriveConfig,
    max_translation: f64,
    max_rotation: f64,
) -> Motion {
    let toward = current.vector_to(target);
    let distance = toward.magnitude();
    let speed = (cfg.kp_linear * distance).min(max_translation);
    let translation = if distance > 0.0 {
        toward * (speed / distance)
    } else {
        Vector2::default()
    };
    let rotation = (cfg.kp_angular * current.bearing_to(target)).clamp(-max_rotation, max_rotation);
    Motion::new(translation, rotation)
}

async fn watchdog(bb: Blackboard) -> anyhow::Result<()> {
    info!("Watchdog task started.");
    let mut tick = time::interval(Duration::from_millis(25));
    loop {
        tick.tick().await;
        let last_cmd_ts = snapshot(&bb).last_cmd_ts;
        let age = Instant::now() - last_cmd_ts;
        if age > Duration::from_millis(250) {
            warn!(?age, "Motion command timeout! Triggering E-stop.");
            trigger_estop();
            raise_fault(&bb, "motion command timeout");
        }
    }
}

// Actuator seams: a real deployment forwards wheel speeds to the motor
// drivers here. The simulation loop closes through the odometry thread
// instead.
fn apply_wheel_speeds(_speeds: &[f64]) {}
fn trigger_estop() {}
