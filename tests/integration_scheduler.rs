//! Scheduler integration tests
//!
//! Drives the public API with long deterministic operation streams and checks
//! the heap against a naive model after every step.

use std::collections::HashMap;

use taskheap::config::{Config, DuplicatePolicy};
use taskheap::error::Result;
use taskheap::scheduler::{Priority, Scheduler, SchedulerService, SharedScheduler, Task, TaskId};
use taskheap::script::{self, Outcome, Script};
use tempfile::TempDir;

/// Small linear congruential generator so runs are reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn below(&mut self, n: u64) -> i64 {
        (self.next() % n) as i64
    }
}

/// Naive reference: live priority and submission record per queued id.
#[derive(Default)]
struct Model {
    live: HashMap<TaskId, Priority>,
    submitted: HashMap<TaskId, Task>,
}

impl Model {
    fn max_priority(&self) -> Option<Priority> {
        self.live.values().copied().max()
    }
}

fn run_stream(seed: u64, steps: usize) -> Result<()> {
    let mut rng = Lcg(seed);
    let mut scheduler = Scheduler::new();
    let mut model = Model::default();
    let mut next_id: TaskId = 1;

    for _ in 0..steps {
        match rng.below(10) {
            0..=4 => {
                let task = Task::new(next_id, rng.below(50) - 25);
                next_id += 1;
                scheduler.add_task(task)?;
                model.live.insert(task.id, task.priority);
                model.submitted.insert(task.id, task);
            }
            5..=7 => {
                // Sometimes target ids that were never added or already left
                let id = rng.below(next_id as u64 + 5);
                let priority = rng.below(50) - 25;
                let expected = model.live.get(&id).is_some_and(|&p| p != priority);

                assert_eq!(scheduler.change_task_priority(id, priority), expected);
                if expected {
                    model.live.insert(id, priority);
                }
            }
            _ => {
                let max = model.max_priority();
                match scheduler.get_task() {
                    Some(task) => {
                        assert_eq!(model.live.remove(&task.id), max);
                        assert_eq!(model.submitted.remove(&task.id), Some(task));
                    }
                    None => assert!(model.live.is_empty()),
                }
            }
        }

        scheduler.check_invariants()?;
        assert_eq!(scheduler.len(), model.live.len());
        for (&id, &priority) in &model.live {
            assert_eq!(scheduler.current_priority(id), Some(priority));
            assert_eq!(scheduler.submitted(id), model.submitted.get(&id));
        }
    }

    Ok(())
}

#[test]
fn test_random_streams_hold_invariants() -> Result<()> {
    for seed in [1, 7, 42, 1234, 98765] {
        run_stream(seed, 2_000)?;
    }
    Ok(())
}

#[test]
fn test_count_conservation() -> Result<()> {
    let mut scheduler = Scheduler::new();
    for id in 0..100 {
        scheduler.add_task(Task::new(id, (id * 37) % 11))?;
    }
    for _ in 0..40 {
        assert!(scheduler.get_task().is_some());
    }
    assert_eq!(scheduler.len(), 60);
    scheduler.check_invariants()
}

#[test]
fn test_extraction_order_is_non_increasing_in_live_priority() -> Result<()> {
    let mut scheduler = Scheduler::new();
    for id in 0..64 {
        scheduler.add_task(Task::new(id, (id * 29) % 13))?;
    }
    for id in (0..64).step_by(3) {
        scheduler.change_task_priority(id, 100 - id);
    }

    let mut last = Priority::MAX;
    while let Some(top) = scheduler.peek().copied() {
        assert!(top.priority <= last);
        last = top.priority;
        let extracted = scheduler.get_task().unwrap();
        assert_eq!(extracted.id, top.id);
    }
    Ok(())
}

#[test]
fn test_empty_extraction_leaves_state_unchanged() {
    let mut scheduler = Scheduler::new();
    let before = scheduler.snapshot();
    assert_eq!(scheduler.get_task(), None);
    assert_eq!(scheduler.snapshot(), before);
}

#[test]
fn test_config_driven_scheduler() -> eyre::Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("taskheap.yml");
    std::fs::write(&path, "scheduler:\n  duplicate_policy: replace\n  initial_capacity: 4\n")?;

    let config = Config::load(Some(&path))?;
    let mut scheduler = Scheduler::from_config(&config.scheduler);
    assert_eq!(scheduler.policy(), DuplicatePolicy::Replace);

    scheduler.add_task(Task::new(1, 1))?;
    scheduler.add_task(Task::new(1, 9))?;
    assert_eq!(scheduler.len(), 1);
    assert_eq!(scheduler.get_task(), Some(Task::new(1, 9)));
    Ok(())
}

#[test]
fn test_script_file_replay() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("trace.yml");
    std::fs::write(
        &path,
        "- add: { id: 10, priority: 3 }\n- add: { id: 11, priority: 8 }\n- change: { id: 10, priority: 9 }\n- get\n- get\n- get\n",
    )?;

    let outcomes = Script::load(&path)?.run(&mut Scheduler::new())?;
    assert_eq!(
        &outcomes[3..],
        &[
            Outcome::Got {
                task: Some(Task::new(10, 3))
            },
            Outcome::Got {
                task: Some(Task::new(11, 8))
            },
            Outcome::Got { task: None },
        ]
    );
    Ok(())
}

#[test]
fn test_replay_file_with_config() -> eyre::Result<()> {
    let temp = TempDir::new()?;
    let config_path = temp.path().join("taskheap.yml");
    std::fs::write(&config_path, "scheduler:\n  duplicate_policy: replace\n")?;
    let script_path = temp.path().join("trace.yml");
    std::fs::write(
        &script_path,
        "\
- add: { id: 1, priority: 10 }
- add: { id: 2, priority: 20 }
- add: { id: 1, priority: 30 }
- peek
- get
- len
",
    )?;

    let config = Config::load(Some(&config_path))?;
    let replay = script::replay_file(&script_path, &config.scheduler)?;

    assert_eq!(replay.outcomes.len(), 6);
    assert_eq!(
        replay.outcomes[3],
        Outcome::Peeked {
            task: Some(Task::new(1, 30))
        }
    );
    assert_eq!(replay.outcomes[5], Outcome::Len { len: 1 });
    assert_eq!(replay.scheduler.peek(), Some(&Task::new(2, 20)));
    replay.scheduler.check_invariants()?;

    let lines = replay.json_lines()?;
    assert_eq!(lines.len(), replay.outcomes.len());
    for (line, outcome) in lines.iter().zip(&replay.outcomes) {
        let parsed: Outcome = serde_json::from_str(line)?;
        assert_eq!(&parsed, outcome);
    }
    Ok(())
}

#[test]
fn test_replay_file_duplicate_rejected_by_default() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("trace.yml");
    std::fs::write(&path, "- add: { id: 4, priority: 1 }\n- add: { id: 4, priority: 2 }\n").unwrap();

    let err = script::replay_file(&path, &Config::default().scheduler).unwrap_err();
    assert!(matches!(err, taskheap::TaskheapError::DuplicateTask(4)));
}

#[test]
fn test_shared_and_owned_agree() -> Result<()> {
    let shared = SharedScheduler::default();
    let mut owned = Scheduler::new();

    for id in 0..30 {
        let task = Task::new(id, (id * 7) % 10);
        shared.add_task(task)?;
        owned.add_task(task)?;
    }
    shared.change_task_priority(3, 42);
    owned.change_task_priority(3, 42);

    assert_eq!(shared.snapshot(), owned.snapshot());
    Ok(())
}

#[tokio::test]
async fn test_service_matches_direct_calls() -> Result<()> {
    let (handle, join) = SchedulerService::spawn(Scheduler::new(), 8);
    let mut direct = Scheduler::new();

    for id in 0..20 {
        let task = Task::new(id, (id * 13) % 7);
        handle.add_task(task).await?;
        direct.add_task(task)?;
    }
    assert!(handle.change_task_priority(5, 99).await?);
    direct.change_task_priority(5, 99);

    for _ in 0..20 {
        assert_eq!(handle.get_task().await?, direct.get_task());
    }

    handle.shutdown().await?;
    let scheduler = join.await.expect("scheduler service panicked");
    assert!(scheduler.is_empty());
    Ok(())
}
