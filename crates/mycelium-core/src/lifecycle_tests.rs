use super::*;
use async_trait::async_trait;
use mycelium_protocols::BoxError;
use parking_lot::Mutex;

#[derive(Default)]
struct RecordingListener {
    seen: Mutex<Vec<KernelEvent>>,
    fail_on: Option<KernelEvent>,
}

#[async_trait]
impl EventListener for RecordingListener {
    async fn on_event(&self, event: KernelEvent) -> Result<(), BoxError> {
        self.seen.lock().push(event);
        if self.fail_on == Some(event) {
            return Err(format!("listener refused {event}").into());
        }
        Ok(())
    }
}

#[test]
fn test_kernel_state_conversion() {
    assert_eq!(KernelState::from(0), KernelState::Created);
    assert_eq!(KernelState::from(2), KernelState::Running);
    assert_eq!(KernelState::from(3), KernelState::Stopping);
    assert_eq!(KernelState::from(99), KernelState::Created);
}

#[test]
fn test_shutdown_signal() {
    let signal = ShutdownSignal::new();
    let mut rx = signal.subscribe();

    signal.trigger();

    let result = rx.try_recv();
    assert!(result.is_ok());
}

#[test]
fn test_full_state_walk() {
    let manager = LifecycleManager::default();
    assert_eq!(manager.state(), KernelState::Created);

    manager.begin_start().unwrap();
    assert_eq!(manager.state(), KernelState::Starting);
    manager.finish_start().unwrap();
    assert!(manager.is_running());
    manager.begin_stop().unwrap();
    assert_eq!(manager.state(), KernelState::Stopping);
    manager.finish_stop().unwrap();
    assert_eq!(manager.state(), KernelState::Stopped);
}

#[test]
fn test_cannot_start_twice() {
    let manager = LifecycleManager::default();
    manager.begin_start().unwrap();

    let result = manager.begin_start();
    assert!(matches!(
        result,
        Err(KernelError::InvalidState { operation: "start", .. })
    ));
}

#[test]
fn test_cannot_stop_before_start() {
    let manager = LifecycleManager::default();
    let result = manager.begin_stop();
    assert!(result.is_err());
    assert_eq!(manager.state(), KernelState::Created);
}

#[test]
fn test_abort_is_terminal() {
    let manager = LifecycleManager::default();
    manager.begin_start().unwrap();
    manager.abort();

    assert_eq!(manager.state(), KernelState::Stopped);
    assert!(manager.begin_start().is_err());
}

#[tokio::test]
async fn test_emit_in_registration_order() {
    let first = Arc::new(RecordingListener::default());
    let second = Arc::new(RecordingListener::default());
    let manager = LifecycleManager::with_listeners(vec![first.clone() as Arc<dyn EventListener>]);
    manager.register_listener(second.clone()).await;
    assert_eq!(manager.listener_count().await, 2);

    manager.emit(KernelEvent::Starting).await.unwrap();
    manager.emit(KernelEvent::Started).await.unwrap();

    assert_eq!(
        *first.seen.lock(),
        vec![KernelEvent::Starting, KernelEvent::Started]
    );
    assert_eq!(*second.seen.lock(), *first.seen.lock());
}

#[tokio::test]
async fn test_failing_listener_stops_delivery() {
    let failing = Arc::new(RecordingListener {
        fail_on: Some(KernelEvent::Starting),
        ..Default::default()
    });
    let after = Arc::new(RecordingListener::default());
    let manager = LifecycleManager::with_listeners(vec![
        failing.clone() as Arc<dyn EventListener>,
        after.clone(),
    ]);

    let result = manager.emit(KernelEvent::Starting).await;

    assert!(matches!(result, Err(KernelError::Listener { .. })));
    assert!(after.seen.lock().is_empty());
}
