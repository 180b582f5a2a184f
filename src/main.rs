use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use grid_task_scheduler::domain::scheduler::schedule_event::ScheduleEventKind;
use grid_task_scheduler::domain::scheduler::scheduler::Scheduler;
use grid_task_scheduler::domain::simulator::logical_simulator::LogicalSimulator;
use grid_task_scheduler::domain::simulator::simulator::{Simulator, SystemSimulator};
use grid_task_scheduler::domain::simulator::workload_generator::WorkloadGenerator;
use grid_task_scheduler::domain::utils::statistics::export_events_csv;
use grid_task_scheduler::{generate_scheduler, logger};

/// Places tasks on a pool of memory bounded nodes and simulates their execution.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// JSON file describing nodes, tasks and scheduler settings.
    #[arg(long, conflicts_with = "random", required_unless_present = "random")]
    config: Option<PathBuf>,

    /// Generate a random workload instead of reading a configuration.
    #[arg(long)]
    random: bool,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    #[arg(long, default_value_t = 3)]
    nodes: usize,

    #[arg(long, default_value_t = 10)]
    tasks: usize,

    /// Wait for real instead of advancing virtual time (random workloads only).
    #[arg(long)]
    real_time: bool,

    /// Upper bound of schedule/execute rounds.
    #[arg(long, default_value_t = 100)]
    rounds: usize,

    /// Write the event log to this file as `;` separated CSV.
    #[arg(long)]
    events_csv: Option<PathBuf>,
}

fn random_scheduler(cli: &Cli) -> anyhow::Result<Scheduler> {
    let mut generator = WorkloadGenerator::new(cli.seed);

    let simulator: Arc<dyn SystemSimulator> = if cli.real_time { Arc::new(Simulator::new()) } else { Arc::new(LogicalSimulator::new()) };

    let scheduler = Scheduler::with_nodes(generator.generate_nodes(cli.nodes), simulator)?;
    for task in generator.generate_tasks(cli.tasks) {
        scheduler.add_task(task)?;
    }

    log::info!("Generated {} nodes and {} tasks with seed {}.", cli.nodes, cli.tasks, cli.seed);
    Ok(scheduler)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logger::init();
    let cli = Cli::parse();

    let scheduler = match &cli.config {
        Some(path) => generate_scheduler(path).with_context(|| format!("loading configuration '{}'", path.display()))?,
        None => random_scheduler(&cli)?,
    };
    let scheduler = Arc::new(scheduler);

    let shutdown = scheduler.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupt received, cancelling running tasks.");
            shutdown.cancel();
        }
    });

    let rounds = scheduler.run_until_idle(cli.rounds).await;

    let events = scheduler.events();
    let count = |kind: ScheduleEventKind| events.iter().filter(|event| event.kind == kind).count();

    println!("Rounds:          {}", rounds);
    println!("Simulated time:  {} ms", scheduler.simulator().get_current_time_in_ms());
    println!("Scheduled:       {}", count(ScheduleEventKind::Scheduled));
    println!("Completed:       {}", count(ScheduleEventKind::Completed));
    println!("Waiting events:  {}", count(ScheduleEventKind::Waiting));
    println!("Unschedulable:   {}", count(ScheduleEventKind::Unschedulable));
    println!("Reassigned:      {}", count(ScheduleEventKind::Reassigned));
    println!("Unassignable:    {}", count(ScheduleEventKind::Unassignable));
    println!("Cancelled:       {}", count(ScheduleEventKind::Cancelled));
    println!("Still blocked:   {:?}", scheduler.blocked_tasks());

    if let Some(path) = &cli.events_csv {
        export_events_csv(path, &events).with_context(|| format!("writing events to '{}'", path.display()))?;
    }

    Ok(())
}
