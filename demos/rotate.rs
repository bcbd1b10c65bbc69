//! Rotate a headless view with a simulated two-finger gesture.
//!
//! Run with: `RUST_LOG=spark_motion=debug cargo run --example rotate`

use spark_motion::{
    constraint, GestureEvent, HeadlessView, HostView, MotionRuntime, MotionState, RecognizerKind, Rotatable,
    Stateful, Stream, Togglable, View,
};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let runtime = MotionRuntime::new();
    let host = HeadlessView::new(1);
    let view = View::from_rc(host.clone());

    let rotatable = Rotatable::new();
    let limit = std::f64::consts::FRAC_PI_2;
    let installed = runtime.add(
        &rotatable,
        &view,
        Some(constraint(move |s: Stream<f64>| s.clamp(-limit, limit))),
    );
    println!("installed: {installed:?}");

    let Some(recognizer) = runtime.pool().recognizer_for(view.id(), RecognizerKind::Rotation) else {
        return;
    };

    let state = rotatable.state().clone();
    let _watch = state
        .state()
        .subscribe(|merged: MotionState| println!("  state -> {merged:?}"));

    println!("gesture 1");
    recognizer.deliver(GestureEvent::began(0.0));
    for step in 1..=5 {
        recognizer.deliver(GestureEvent::changed(step as f64 * 0.4));
        println!("  rotation = {:.3}", host.rotation());
    }
    recognizer.deliver(GestureEvent::ended(2.0));

    println!("gesture 2, disabled halfway");
    recognizer.deliver(GestureEvent::began(0.0));
    recognizer.deliver(GestureEvent::changed(-0.5));
    println!("  rotation = {:.3}", host.rotation());
    rotatable.enabled().write(false);
    recognizer.deliver(GestureEvent::changed(-1.0));
    println!("  rotation = {:.3} (ignored while disabled)", host.rotation());

    println!("{runtime:?}");
    runtime.teardown_view(view.id());
    println!("after teardown: {runtime:?}");
}
