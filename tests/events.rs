use entity_database::connections::{CONNECTION_ERROR, CONNECTION_READY};
use entity_database::{
    ConnectionConfig, ConnectionEvent, ConnectionRegistry, DriverError, DriverEvent, EventBus,
    EventSink,
};
use std::sync::{Arc, Mutex};
use tokio::time::{timeout, Duration};

mod common;
use common::fake_driver::FakeDriver;
use common::init_test_logging;

/// Collects every fired event for later assertions.
#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<ConnectionEvent>>,
}

impl EventSink for RecordingSink {
    fn fire(&self, event: ConnectionEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[test]
fn driver_events_are_republished_with_the_connection_name() {
    init_test_logging();
    let driver = FakeDriver::new();
    let sink = Arc::new(RecordingSink::default());
    let registry = ConnectionRegistry::with_events(driver.clone(), sink.clone());

    registry
        .connect("main", &ConnectionConfig::new("app"), false)
        .unwrap();
    let remote = driver.remote(0);
    remote.emit(DriverEvent::Ready);
    remote.emit(DriverEvent::Error(DriverError::Other("socket closed".into())));

    let events = sink.events.lock().unwrap().clone();
    assert_eq!(
        events,
        vec![
            ConnectionEvent::Ready {
                connection: "main".into()
            },
            ConnectionEvent::Error {
                connection: "main".into(),
                err: DriverError::Other("socket closed".into()),
            },
        ]
    );
    assert_eq!(events[0].name(), CONNECTION_READY);
    assert_eq!(events[1].name(), CONNECTION_ERROR);
}

#[test]
fn without_a_sink_nothing_subscribes() {
    init_test_logging();
    let driver = FakeDriver::new();
    let registry = ConnectionRegistry::new(driver.clone());

    registry
        .connect("main", &ConnectionConfig::new("app"), false)
        .unwrap();

    let remote = driver.remote(0);
    assert_eq!(remote.listener_count(), 0);
    // Emitting with no listener is harmless.
    remote.emit(DriverEvent::Ready);
    assert_eq!(registry.connections(), vec!["main"]);
}

#[test]
fn closures_work_as_sinks() {
    init_test_logging();
    let driver = FakeDriver::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_by_sink = Arc::clone(&seen);
    let registry = ConnectionRegistry::with_events(
        driver.clone(),
        Arc::new(move |event: ConnectionEvent| {
            seen_by_sink
                .lock()
                .unwrap()
                .push(event.connection().to_string());
        }),
    );

    registry
        .connect("a", &ConnectionConfig::new("app"), false)
        .unwrap()
        .connect("b", &ConnectionConfig::new("app"), false)
        .unwrap();
    driver.remote(1).emit(DriverEvent::Ready);
    driver.remote(0).emit(DriverEvent::Ready);

    assert_eq!(*seen.lock().unwrap(), vec!["b", "a"]);
}

#[test]
fn events_after_disconnect_do_not_touch_the_registry() {
    init_test_logging();
    let driver = FakeDriver::new();
    let sink = Arc::new(RecordingSink::default());
    let registry = ConnectionRegistry::with_events(driver.clone(), sink.clone());

    registry
        .connect("main", &ConnectionConfig::new("app"), false)
        .unwrap();
    registry.disconnect(None).unwrap();
    driver
        .remote(0)
        .emit(DriverEvent::Error(DriverError::Other("late".into())));

    assert!(registry.is_empty());
    assert_eq!(sink.events.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn event_bus_fans_out_to_every_subscriber() {
    init_test_logging();
    let driver = FakeDriver::new();
    let bus = EventBus::default();
    let mut first = bus.subscribe();
    let mut second = bus.subscribe();
    let registry = ConnectionRegistry::with_events(driver.clone(), Arc::new(bus));

    registry
        .connect("main", &ConnectionConfig::new("app"), false)
        .unwrap();
    driver.remote(0).emit(DriverEvent::Ready);

    let expected = ConnectionEvent::Ready {
        connection: "main".into(),
    };
    for receiver in [&mut first, &mut second] {
        let event = timeout(Duration::from_millis(100), receiver.recv())
            .await
            .expect("timed out waiting for the event")
            .expect("event bus closed unexpectedly");
        assert_eq!(event, expected);
    }
}

#[test]
fn event_bus_without_subscribers_drops_events() {
    init_test_logging();
    let bus = EventBus::new(4);
    bus.fire(ConnectionEvent::Ready {
        connection: "main".into(),
    });

    // A subscriber joining later only sees what comes after it.
    let mut late = bus.subscribe();
    assert!(late.try_recv().is_err());
}

#[tokio::test]
async fn event_bus_with_zero_capacity_still_delivers() {
    init_test_logging();
    let bus = EventBus::new(0);
    let mut receiver = bus.subscribe();

    bus.fire(ConnectionEvent::Ready {
        connection: "main".into(),
    });

    let event = timeout(Duration::from_millis(100), receiver.recv())
        .await
        .expect("timed out waiting for the event")
        .expect("event bus closed unexpectedly");
    assert_eq!(event.connection(), "main");
}

#[tokio::test]
async fn handed_off_events_can_be_resolved_against_the_registry() {
    init_test_logging();
    let driver = FakeDriver::new();
    let bus = EventBus::default();
    let mut receiver = bus.subscribe();
    let registry = ConnectionRegistry::with_events(driver.clone(), Arc::new(bus));

    registry
        .connect("main", &ConnectionConfig::new("app"), false)
        .unwrap();
    driver.remote(0).emit(DriverEvent::Ready);

    // The sink only forwards; the registry is consulted outside `fire`.
    let event = timeout(Duration::from_millis(100), receiver.recv())
        .await
        .expect("timed out waiting for the event")
        .expect("event bus closed unexpectedly");
    let connection = registry
        .connection(Some(event.connection()))
        .expect("connection should still be registered");
    assert_eq!(connection.name(), "main");
}
