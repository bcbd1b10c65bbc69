//! End-to-end rotation scenarios through the public API.

use std::cell::RefCell;
use std::rc::Rc;

use spark_motion::{
    GestureEvent, HeadlessView, HostView, Interaction, MotionRuntime, MotionState, ReactiveProperty,
    RecognizerKind, Rotatable, Stateful, Togglable, View,
};

fn trace(property: &ReactiveProperty<f64>) -> Rc<RefCell<Vec<f64>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    property.subscribe(move |value| sink.borrow_mut().push(*value));
    log
}

#[test]
fn shared_recognizer_drives_delta_rotation() {
    let runtime = MotionRuntime::new();
    let host = HeadlessView::new(1);
    let view = View::from_rc(host.clone());

    let first = runtime.pool().dequeue(&view, RecognizerKind::Rotation).unwrap();
    let second = runtime.pool().dequeue(&view, RecognizerKind::Rotation).unwrap();
    let recognizer = runtime.pool().recognizer(&first).unwrap();
    assert!(recognizer.ptr_eq(&runtime.pool().recognizer(&second).unwrap()));
    assert_eq!(runtime.pool().usage_count(view.id(), RecognizerKind::Rotation), 2);

    let rotation = runtime.get(&view).layer().rotation().clone();
    assert_eq!(rotation.read(), 0.0);
    let observed = trace(&rotation);

    let gesture = runtime.get(&recognizer);
    runtime.connect(&gesture.rotated_from(&rotation), &rotation);

    recognizer.deliver(GestureEvent::began(0.0));
    recognizer.deliver(GestureEvent::changed(0.5));
    recognizer.deliver(GestureEvent::changed(1.2));
    recognizer.deliver(GestureEvent::ended(1.2));

    assert_eq!(*observed.borrow(), vec![0.0, 0.0, 0.5, 1.2]);
    assert_eq!(host.rotation(), 1.2);

    assert!(runtime.pool().release(&first));
    assert_eq!(host.attached_count(), 1);
    assert!(runtime.pool().release(&second));
    assert_eq!(host.attached_count(), 0);
}

#[test]
fn rotatable_accumulates_across_gestures() {
    let runtime = MotionRuntime::new();
    let host = HeadlessView::new(7);
    let view = View::from_rc(host.clone());
    let rotatable = Rotatable::new();
    runtime.add(&rotatable, &view, None).unwrap();

    let recognizer = runtime
        .pool()
        .recognizer_for(view.id(), RecognizerKind::Rotation)
        .unwrap();

    recognizer.deliver(GestureEvent::began(0.0));
    recognizer.deliver(GestureEvent::changed(0.5));
    recognizer.deliver(GestureEvent::ended(0.5));

    // Second gesture rebases on the 0.5 left by the first.
    recognizer.deliver(GestureEvent::began(0.0));
    recognizer.deliver(GestureEvent::changed(0.25));
    recognizer.deliver(GestureEvent::ended(0.25));

    assert_eq!(host.rotation_writes(), vec![0.0, 0.5, 0.5, 0.75]);
    assert_eq!(rotatable.state().current(), MotionState::Idle);
}

#[test]
fn toggling_suppresses_then_resumes_with_fresh_values() {
    let runtime = MotionRuntime::new();
    let host = HeadlessView::new(2);
    let view = View::from_rc(host.clone());

    let source = ReactiveProperty::new(0.0);
    let enabled = ReactiveProperty::new(true);
    let rotation = runtime.get(&view).layer().rotation().clone();
    runtime.connect_enabled_by(&source.stream(), &rotation, Rc::new(enabled.clone()));

    source.write(1.0);
    enabled.write(false);
    source.write(2.0);
    source.write(3.0);
    enabled.write(true);
    assert_eq!(rotation.read(), 1.0);

    source.write(4.0);
    assert_eq!(rotation.read(), 4.0);
    assert_eq!(host.rotation_writes(), vec![0.0, 1.0, 4.0]);
}

#[test]
fn spark_signal_gates_connection() {
    use spark_signals::signal;

    let runtime = MotionRuntime::new();
    let view = View::from_rc(HeadlessView::new(3));
    let source = ReactiveProperty::new(0.0);
    let live = signal(false);
    let rotation = runtime.get(&view).layer().rotation().clone();

    runtime.connect_enabled_by(&source.stream(), &rotation, Rc::new(live.clone()));
    source.write(1.0);
    assert_eq!(rotation.read(), 0.0);

    live.set(true);
    source.write(2.0);
    assert_eq!(rotation.read(), 2.0);
}

#[test]
fn interaction_installs_directly_without_runtime_add() {
    let runtime = MotionRuntime::new();
    let host = HeadlessView::new(4);
    let view = View::from_rc(host.clone());
    let rotatable = Rotatable::new();

    let installation = rotatable.add(&view, &runtime, None).unwrap();
    assert_eq!(installation.view(), view.id());
    assert_eq!(installation.recognizers().len(), 1);
    assert_eq!(installation.connections().len(), 2);
    assert!(rotatable.enabled().read());
}

#[test]
fn runtime_drop_releases_host_resources() {
    let host = HeadlessView::new(5);
    let view = View::from_rc(host.clone());
    {
        let runtime = MotionRuntime::new();
        runtime.add(&Rotatable::new(), &view, None).unwrap();
        assert_eq!(host.attached_count(), 1);
    }
    assert_eq!(host.attached_count(), 0);
}
