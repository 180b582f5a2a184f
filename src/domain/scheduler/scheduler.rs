use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::join_all;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::api::scheduler_dto::SchedulerDto;
use crate::domain::node::node::{Node, NodeDescriptor};
use crate::domain::node::node_pool::NodePool;
use crate::domain::scheduler::blocked_policy::BlockedPolicy;
use crate::domain::scheduler::event_log::{EventListener, EventLog};
use crate::domain::scheduler::node_selector::{NodeSelector, SelectorType};
use crate::domain::scheduler::pending_queue::{PendingEntry, PendingQueue};
use crate::domain::scheduler::schedule_event::{ScheduleEvent, ScheduleEventKind};
use crate::domain::simulator::simulator::{SystemSimulator, simulator_from_dto};
use crate::domain::task::task::{Task, TaskDescriptor, TaskKey};
use crate::domain::task::task_store::TaskStore;
use crate::domain::utils::id::{NodeId, TaskId};
use crate::error::{Error, Result};

/// Where a task currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskState {
    /// Waiting in the global pending queue.
    Pending,

    /// Failed the dependency gate and waits for re-admission.
    Blocked,

    /// Placed in the local queue of a node.
    Queued(NodeId),

    /// Taken from the local queue and executing.
    Running(NodeId),

    Completed,

    /// Could not be placed on any node and left the scheduler.
    Dropped,
}

/// Places tasks onto a fixed pool of nodes and drives their execution.
///
/// The scheduler is `Send + Sync`. Every mutable piece of state sits behind its own lock, so
/// a shared `Arc<Scheduler>` can admit and place tasks while nodes are executing.
#[derive(Debug)]
pub struct Scheduler {
    nodes: NodePool,
    task_store: TaskStore,
    pending: Mutex<PendingQueue>,
    blocked: Mutex<Vec<PendingEntry>>,
    selector: Box<dyn NodeSelector>,
    blocked_policy: BlockedPolicy,
    simulator: Arc<dyn SystemSimulator>,
    event_log: EventLog,
    shutdown: CancellationToken,
}

impl Scheduler {
    /// Creates a first-fit scheduler that re-admits blocked tasks when their dependencies complete.
    pub fn new(nodes: NodePool, simulator: Arc<dyn SystemSimulator>) -> Self {
        Self {
            nodes,
            task_store: TaskStore::new(),
            pending: Mutex::new(PendingQueue::new()),
            blocked: Mutex::new(Vec::new()),
            selector: SelectorType::default().get_instance(),
            blocked_policy: BlockedPolicy::default(),
            simulator,
            event_log: EventLog::new(),
            shutdown: CancellationToken::new(),
        }
    }

    /// Shorthand for building the node pool from descriptors.
    pub fn with_nodes(descriptors: Vec<NodeDescriptor>, simulator: Arc<dyn SystemSimulator>) -> Result<Self> {
        Ok(Self::new(NodePool::new(descriptors)?, simulator))
    }

    pub fn with_selector(mut self, selector: Box<dyn NodeSelector>) -> Self {
        self.selector = selector;
        self
    }

    pub fn with_blocked_policy(mut self, blocked_policy: BlockedPolicy) -> Self {
        self.blocked_policy = blocked_policy;
        self
    }

    fn pending(&self) -> MutexGuard<'_, PendingQueue> {
        self.pending.lock().expect("Pending queue lock poisoned")
    }

    fn blocked(&self) -> MutexGuard<'_, Vec<PendingEntry>> {
        self.blocked.lock().expect("Blocked list lock poisoned")
    }

    //--------------------
    // --- Admission ---
    //--------------------

    /// Validates the descriptor and puts the task into the pending queue.
    ///
    /// Malformed descriptors, duplicate ids and dependencies on unknown tasks are rejected here
    /// and never reach a scheduling pass.
    pub fn add_task(&self, descriptor: TaskDescriptor) -> Result<TaskKey> {
        let key = self.task_store.add(&descriptor)?;
        self.pending().push(key, descriptor.priority);

        log::debug!("Task {} admitted with priority {}.", descriptor.id, descriptor.priority);
        Ok(key)
    }

    //------------------------
    // --- Placement pass ---
    //------------------------

    /// Drains the pending queue once, in priority order.
    ///
    /// Tasks with an open dependency move to the blocked list and produce `Waiting`.
    /// Every other task is placed on the first node, in selector order, that accepts it
    /// (`Scheduled`) or is dropped (`Unschedulable`).
    pub fn schedule_pass(&self) -> Vec<ScheduleEvent> {
        if self.blocked_policy == BlockedPolicy::RequeueNextPass {
            self.requeue_all_blocked();
        }

        let mut events = Vec::new();

        loop {
            let Some(entry) = self.pending().pop() else {
                break;
            };

            let Some(task) = self.task_store.get(entry.key) else {
                log::error!("Pending entry {:?} has no task in the TaskStore. Skipping it.", entry.key);
                continue;
            };

            if self.block_if_gated(entry) {
                events.push(self.event_log.record(ScheduleEventKind::Waiting, task.id.clone(), None));
                continue;
            }

            match self.place(&task) {
                Some(node) => events.push(self.event_log.record(ScheduleEventKind::Scheduled, task.id.clone(), Some(node.id.clone()))),
                None => events.push(self.event_log.record(ScheduleEventKind::Unschedulable, task.id.clone(), None)),
            }
        }

        events
    }

    /// Runs the dependency gate and parks the entry on the blocked list if it fails.
    ///
    /// The blocked guard is held across the check and the push. A completion that slips in
    /// between either makes the gate pass here or waits for the guard in
    /// [`Scheduler::readmit_unblocked`] and then finds the entry.
    fn block_if_gated(&self, entry: PendingEntry) -> bool {
        let mut blocked = self.blocked();

        if self.task_store.dependencies_completed(entry.key) {
            return false;
        }

        blocked.push(entry);
        true
    }

    /// Allocates the task on the first node in selector order that has room for it.
    fn place(&self, task: &Task) -> Option<&Node> {
        for position in self.selector.candidate_order(&self.nodes, task) {
            let Some(node) = self.nodes.get(position) else {
                log::error!("Selector {} returned unknown node position {}.", self.selector.name(), position);
                continue;
            };

            if node.allocate(task) {
                return Some(node);
            }
        }
        None
    }

    fn requeue_all_blocked(&self) {
        let blocked = std::mem::take(&mut *self.blocked());
        if blocked.is_empty() {
            return;
        }

        log::debug!("Re-admitting {} blocked tasks for this pass.", blocked.len());

        let mut pending = self.pending();
        for entry in blocked {
            pending.push_entry(entry);
        }
    }

    /// Moves every blocked task whose dependencies are now all completed back into the pending queue.
    fn readmit_unblocked(&self) {
        let ready: Vec<PendingEntry> = {
            let mut blocked = self.blocked();
            let (ready, still_blocked): (Vec<PendingEntry>, Vec<PendingEntry>) =
                blocked.iter().copied().partition(|entry| self.task_store.dependencies_completed(entry.key));
            *blocked = still_blocked;
            ready
        };

        if ready.is_empty() {
            return;
        }

        let mut pending = self.pending();
        for entry in ready {
            log::debug!("Task {:?} unblocked, back in the pending queue.", self.task_store.get_name_for_key(entry.key));
            pending.push_entry(entry);
        }
    }

    //------------------------
    // --- Execution pass ---
    //------------------------

    /// Advances every node by one task.
    ///
    /// Nodes run concurrently. Each node suspends only itself while its task executes. Events
    /// are returned in node pool order. After [`Scheduler::shutdown`] no new execution is
    /// started and in-flight executions are interrupted.
    pub async fn execute_pass(&self) -> Vec<ScheduleEvent> {
        let runs = self.nodes.iter().map(|node| self.execute_on_node(node));
        join_all(runs).await.into_iter().flatten().collect()
    }

    async fn execute_on_node(&self, node: &Node) -> Vec<ScheduleEvent> {
        let mut events = Vec::new();

        if self.shutdown.is_cancelled() {
            log::debug!("Shutdown requested, Node {} does not start a new task.", node.id);
            return events;
        }

        let Some(task) = self.next_runnable(node) else {
            return events;
        };

        let duration = task.execution_time(node.compute_rate, node.latency);
        log::debug!("Task {} running on Node {} for {:?}.", task.id, node.id, duration);

        let cancelled = tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => true,
            _ = self.simulator.sleep(duration) => false,
        };

        if cancelled {
            node.requeue_front(&task);
            events.push(self.event_log.record(ScheduleEventKind::Cancelled, task.id.clone(), Some(node.id.clone())));
            return events;
        }

        self.task_store.mark_completed(task.key);
        node.release(&task);
        events.push(self.event_log.record(ScheduleEventKind::Completed, task.id.clone(), Some(node.id.clone())));

        if self.blocked_policy == BlockedPolicy::OnDependencyCompletion {
            self.readmit_unblocked();
        }

        // Checked against the just released task, so it only fires if the node filled up in between.
        if !node.has_capacity_for(&task) {
            events.push(self.reassign(&task));
        }

        events
    }

    /// Pops the head of the node queue, discarding entries of tasks that already completed.
    fn next_runnable(&self, node: &Node) -> Option<Task> {
        loop {
            let key = node.pop_next()?;

            let Some(task) = self.task_store.get(key) else {
                log::error!("Node {} held {:?}, which is not in the TaskStore. Releasing it.", node.id, key);
                node.release_key(key);
                continue;
            };

            if task.is_completed() {
                log::debug!("Task {} already completed, releasing its entry on Node {}.", task.id, node.id);
                node.release(&task);
                continue;
            }

            return Some(task);
        }
    }

    //----------------------
    // --- Reassignment ---
    //----------------------

    /// Books the task on the first node, in selector order, that accepts it.
    ///
    /// The dependency gate is not consulted.
    pub fn reassign(&self, task: &Task) -> ScheduleEvent {
        match self.place(task) {
            Some(node) => self.event_log.record(ScheduleEventKind::Reassigned, task.id.clone(), Some(node.id.clone())),
            None => self.event_log.record(ScheduleEventKind::Unassignable, task.id.clone(), None),
        }
    }

    //------------------
    // --- Driving ---
    //------------------

    /// Alternates placement and execution passes until nothing is pending or queued, the round
    /// limit is hit, or shutdown is requested.
    ///
    /// # Returns
    /// The number of rounds that were run.
    pub async fn run_until_idle(&self, max_rounds: usize) -> usize {
        let mut rounds = 0;

        while rounds < max_rounds && !self.is_idle() && !self.shutdown.is_cancelled() {
            self.schedule_pass();
            self.execute_pass().await;
            rounds += 1;
        }

        if !self.is_idle() {
            log::warn!("Scheduler stopped after {} rounds with work left.", rounds);
        } else {
            log::info!("Scheduler idle after {} rounds at {} ms.", rounds, self.simulator.get_current_time_in_ms());
        }

        rounds
    }

    /// Interrupts running executions and stops further ones. Interrupted tasks keep their
    /// memory and stay uncompleted at the head of their node queue.
    pub fn shutdown(&self) {
        log::info!("Scheduler shutdown requested.");
        self.shutdown.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    //--------------------
    // --- Inspection ---
    //--------------------

    pub fn subscribe(&self, listener: Arc<dyn EventListener>) {
        self.event_log.subscribe(listener);
    }

    pub fn subscribe_channel(&self) -> mpsc::UnboundedReceiver<ScheduleEvent> {
        self.event_log.subscribe_channel()
    }

    pub fn events(&self) -> Vec<ScheduleEvent> {
        self.event_log.snapshot()
    }

    pub fn nodes(&self) -> &NodePool {
        &self.nodes
    }

    pub fn task_store(&self) -> &TaskStore {
        &self.task_store
    }

    pub fn simulator(&self) -> &Arc<dyn SystemSimulator> {
        &self.simulator
    }

    pub fn selector_name(&self) -> &'static str {
        self.selector.name()
    }

    pub fn blocked_policy(&self) -> BlockedPolicy {
        self.blocked_policy
    }

    pub fn pending_len(&self) -> usize {
        self.pending().len()
    }

    /// Ids of the blocked tasks, in the order they failed their gate.
    pub fn blocked_tasks(&self) -> Vec<TaskId> {
        self.blocked().iter().filter_map(|entry| self.task_store.get_name_for_key(entry.key)).collect()
    }

    /// True when no task is pending and no node holds a task.
    pub fn is_idle(&self) -> bool {
        self.pending().is_empty() && self.nodes.iter().all(|node| node.is_idle())
    }

    pub fn task_state(&self, id: &TaskId) -> Option<TaskState> {
        let key = self.task_store.get_key(id)?;

        if self.task_store.is_completed(key) {
            return Some(TaskState::Completed);
        }
        if self.pending().contains(key) {
            return Some(TaskState::Pending);
        }
        if self.blocked().iter().any(|entry| entry.key == key) {
            return Some(TaskState::Blocked);
        }

        for node in self.nodes.iter() {
            if node.queued_tasks().contains(&key) {
                return Some(TaskState::Queued(node.id.clone()));
            }
            if node.running_tasks().contains(&key) {
                return Some(TaskState::Running(node.id.clone()));
            }
        }

        Some(TaskState::Dropped)
    }
}

impl TryFrom<SchedulerDto> for Scheduler {
    type Error = Error;

    /// Builds the node pool, selector, blocked policy and clock, then admits all tasks in
    /// document order.
    fn try_from(dto: SchedulerDto) -> Result<Self> {
        let selector_type: SelectorType = dto.selector_type.parse()?;
        let blocked_policy: BlockedPolicy = dto.blocked_policy.parse()?;
        let simulator = simulator_from_dto(&dto.simulator);

        let nodes = NodePool::new(dto.nodes.into_iter().map(NodeDescriptor::from).collect())?;

        let scheduler = Scheduler::new(nodes, simulator).with_selector(selector_type.get_instance()).with_blocked_policy(blocked_policy);

        for task_dto in dto.tasks {
            scheduler.add_task(task_dto.into())?;
        }

        log::info!(
            "Scheduler built with {} nodes, {} tasks, selector {} and blocked policy {:?}.",
            scheduler.nodes.len(),
            scheduler.task_store.len(),
            scheduler.selector_name(),
            scheduler.blocked_policy
        );

        Ok(scheduler)
    }
}
