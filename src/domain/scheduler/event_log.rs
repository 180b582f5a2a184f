use std::fmt::Debug;
use std::sync::{Arc, Mutex, RwLock};

use tokio::sync::mpsc;

use crate::domain::scheduler::schedule_event::{ScheduleEvent, ScheduleEventKind};
use crate::domain::utils::id::{NodeId, TaskId};
use crate::domain::utils::statistics::ANALYTICS_TARGET;

/// Subscriber to the event stream of a scheduler.
pub trait EventListener: Debug + Send + Sync {
    fn on_schedule_event(&self, event: &ScheduleEvent);
}

/// Forwards every event into an unbounded tokio channel.
#[derive(Debug)]
pub struct ChannelListener {
    sender: mpsc::UnboundedSender<ScheduleEvent>,
}

impl ChannelListener {
    pub fn new(sender: mpsc::UnboundedSender<ScheduleEvent>) -> Self {
        Self { sender }
    }
}

impl EventListener for ChannelListener {
    fn on_schedule_event(&self, event: &ScheduleEvent) {
        if self.sender.send(event.clone()).is_err() {
            log::trace!("Event receiver dropped, discarding {:?}.", event.kind);
        }
    }
}

/// Ordered record of everything a scheduler decided.
///
/// Recording an event assigns its sequence number, writes the console line, emits a
/// structured analytics event and notifies all listeners, in that order.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<ScheduleEvent>>,
    listeners: RwLock<Vec<Arc<dyn EventListener>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: Arc<dyn EventListener>) {
        self.listeners.write().expect("EventLog listener lock poisoned").push(listener);
    }

    /// Returns a receiver that gets every event recorded from now on.
    pub fn subscribe_channel(&self) -> mpsc::UnboundedReceiver<ScheduleEvent> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.subscribe(Arc::new(ChannelListener::new(sender)));
        receiver
    }

    pub fn record(&self, kind: ScheduleEventKind, task_id: TaskId, node_id: Option<NodeId>) -> ScheduleEvent {
        let event = {
            let mut events = self.events.lock().expect("EventLog lock poisoned");
            let event = ScheduleEvent { sequence: events.len() as u64, kind, task_id, node_id };
            events.push(event.clone());
            event
        };

        if kind.is_failure() {
            log::warn!("{}", event);
        } else {
            log::info!("{}", event);
        }

        tracing::info!(
            target: ANALYTICS_TARGET,
            Sequence = event.sequence,
            Kind = %event.kind,
            TaskId = %event.task_id,
            NodeId = ?event.node_id.as_ref().map(|id| id.as_str()),
        );

        let listeners = self.listeners.read().expect("EventLog listener lock poisoned");
        for listener in listeners.iter() {
            listener.on_schedule_event(&event);
        }

        event
    }

    pub fn snapshot(&self) -> Vec<ScheduleEvent> {
        self.events.lock().expect("EventLog lock poisoned").clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().expect("EventLog lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[derive(Debug, Default)]
    struct CountingListener {
        seen: Mutex<Vec<ScheduleEventKind>>,
    }

    impl EventListener for CountingListener {
        fn on_schedule_event(&self, event: &ScheduleEvent) {
            self.seen.lock().unwrap().push(event.kind);
        }
    }

    #[test]
    fn record_assigns_sequence_and_notifies_listeners() {
        let log = EventLog::new();
        let listener = Arc::new(CountingListener::default());
        log.subscribe(listener.clone());

        let first = log.record(ScheduleEventKind::Scheduled, TaskId::new("a"), Some(NodeId::new("n0")));
        let second = log.record(ScheduleEventKind::Unschedulable, TaskId::new("b"), None);

        assert_eq!(first.sequence, 0);
        assert_eq!(second.sequence, 1);
        assert_eq!(first.to_string(), "Task a scheduled on Node n0");
        assert_eq!(second.to_string(), "Task b could not be scheduled (no available resources)");
        assert_eq!(*listener.seen.lock().unwrap(), vec![ScheduleEventKind::Scheduled, ScheduleEventKind::Unschedulable]);
        assert_eq!(log.len(), 2);
    }

    #[tokio::test]
    async fn channel_subscribers_receive_events_in_order() {
        let log = EventLog::new();
        let mut receiver = log.subscribe_channel();

        log.record(ScheduleEventKind::Waiting, TaskId::new("y"), None);
        log.record(ScheduleEventKind::Completed, TaskId::new("x"), Some(NodeId::new("n1")));

        assert_eq!(receiver.recv().await.unwrap().kind, ScheduleEventKind::Waiting);
        let completed = receiver.recv().await.unwrap();
        assert_eq!(completed.kind, ScheduleEventKind::Completed);
        assert_eq!(completed.node_id, Some(NodeId::new("n1")));
    }

    #[traced_test]
    #[test]
    fn events_are_emitted_on_the_analytics_target() {
        let log = EventLog::new();
        log.record(ScheduleEventKind::Reassigned, TaskId::new("task-42"), Some(NodeId::new("node-3")));

        assert!(logs_contain("task-42"));
        assert!(logs_contain("Reassigned"));
    }
}
