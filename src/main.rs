mod menu;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use common::config::load_config;
use common::ActionRequest;
use node::{spawn_reporters, ReporterHandles, RobotNode};
use serde_json::json;

fn main() {
    tracing_subscriber::fmt::init();

    println!("===========================================");
    println!("Welcome to the Robot Control Node");
    println!("===========================================");

    let config = load_config("configs/node_default.toml").expect("Failed to load config");
    println!(
        "Configuration: robot {}, move {}ms, gripper {}ms, poll every {}ms",
        config.robot_number,
        config.move_duration_ms,
        config.gripper_duration_ms,
        config.status_poll_period_ms
    );

    let rt = tokio::runtime::Runtime::new().unwrap();
    let node = Arc::new(RobotNode::new(config));
    node.startup().expect("Failed to connect to robot");

    let shutdown = Arc::new(AtomicBool::new(false));
    let reporters = {
        let _guard = rt.enter();
        let period = Duration::from_millis(node.config().status_poll_period_ms);
        spawn_reporters(Arc::clone(&node), period, Arc::clone(&shutdown))
    };

    loop {
        menu::show_menu();

        match menu::get_user_choice() {
            Ok(1) => rt.block_on(run_move_demo(&node)),
            Ok(2) => rt.block_on(run_gripper_demo(&node)),
            Ok(3) => poll_node(&node, &reporters),
            Ok(4) => rt.block_on(run_busy_rejection_demo(&node)),
            Ok(5) => {
                println!("Goodbye!");
                break;
            }
            _ => println!("Invalid choice. Please select 1-5."),
        }
    }

    shutdown.store(true, Ordering::Relaxed);
    node.shutdown();
}

async fn run_move_demo(node: &Arc<RobotNode>) {
    println!("\n=== Move Joints Demo ===");

    let angles = [0.5, -0.25, 1.0, 0.0];
    println!("Dispatching move_joints to {angles:?} (the arm takes a few seconds)...");

    let request =
        ActionRequest::new("move_joints").with_parameter("joint_angles", json!(angles));
    let result = node.dispatch(request).await;

    println!("Result: {result:?}");
    println!("State after move: {:?}", node.sample_state());

    menu::wait_for_enter();
}

async fn run_gripper_demo(node: &Arc<RobotNode>) {
    println!("\n=== Gripper Demo ===");

    let result = node.dispatch(ActionRequest::new("close_gripper")).await;
    println!("close_gripper: {result:?}");
    println!("Gripper closed: {:?}", node.sample_state().gripper_closed);

    let result = node.dispatch(ActionRequest::new("open_gripper")).await;
    println!("open_gripper: {result:?}");
    println!("Gripper closed: {:?}", node.sample_state().gripper_closed);

    menu::wait_for_enter();
}

fn poll_node(node: &Arc<RobotNode>, reporters: &ReporterHandles) {
    println!("\n=== Node State & Status ===");
    println!("On-demand state:  {:?}", node.sample_state());
    println!("On-demand status: {:?}", node.sample_status());
    println!("Last published state:  {:?}", *reporters.state.borrow());
    println!("Last published status: {:?}", *reporters.status.borrow());

    menu::wait_for_enter();
}

async fn run_busy_rejection_demo(node: &Arc<RobotNode>) {
    println!("\n=== Busy Rejection Demo ===");
    println!("Starting a long move, then immediately requesting a second one...");

    let worker = {
        let node = Arc::clone(node);
        tokio::spawn(async move {
            let request = ActionRequest::new("move_joints")
                .with_parameter("joint_angles", json!([1.0, 1.0, 1.0, 1.0]));
            node.dispatch(request).await
        })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    println!("Status mid-operation: {:?}", node.sample_status());

    let request = ActionRequest::new("move_joints")
        .with_parameter("joint_angles", json!([0.0, 0.0, 0.0, 0.0]));
    let rejected = node.dispatch(request).await;
    println!("Second request while busy: {rejected:?}");

    let first = worker.await.expect("move task panicked");
    println!("First request completed: {first:?}");

    menu::wait_for_enter();
}
