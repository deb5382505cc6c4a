// Round scheduler and execution log tests

use forklang::ast::{Expr, Stmt};
use forklang::demos;
use forklang::interpreter::engine::{ExecutionStatus, ProgramState};
use forklang::interpreter::errors::RuntimeError;
use forklang::interpreter::scheduler::{Scheduler, SchedulerConfig};
use forklang::memory::value::{Type, Value};
use forklang::repository::{LogRepository, Repository};

fn ints(values: &[Value]) -> Vec<i64> {
    values.iter().filter_map(Value::as_int).collect()
}

fn scheduler_for(program: Stmt) -> Scheduler<LogRepository> {
    let mut scheduler = Scheduler::new(LogRepository::new(), SchedulerConfig::default());
    scheduler.add_program_state(ProgramState::new(program));
    scheduler
}

fn run_demo(number: usize) -> Vec<ProgramState> {
    let demo = demos::by_number(number).expect("demo exists");
    forklang::run(demo.program()).expect("demo failed")
}

#[test]
fn test_each_round_steps_every_state_once() {
    let mut scheduler = scheduler_for(Stmt::sequence([
        Stmt::print(Expr::int(1)),
        Stmt::print(Expr::int(2)),
        Stmt::print(Expr::int(3)),
    ]));

    assert!(scheduler.step_round().expect("round failed"));
    let states = scheduler.repository().active_states();
    assert_eq!(states.len(), 1);
    assert_eq!(states[0].stack().depth(), 2);
    assert!(states[0].output().is_empty());

    assert!(scheduler.step_round().expect("round failed"));
    assert_eq!(ints(scheduler.repository().active_states()[0].output()), vec![1]);
    assert_eq!(scheduler.rounds(), 2);
}

#[test]
fn test_forked_state_first_runs_next_round() {
    let mut scheduler = scheduler_for(Stmt::compound(
        Stmt::fork(Stmt::print(Expr::int(1))),
        Stmt::print(Expr::int(2)),
    ));

    // Round 1 splits the compound, round 2 executes the fork.
    assert!(scheduler.step_round().expect("round failed"));
    assert!(scheduler.step_round().expect("round failed"));

    let states = scheduler.repository().active_states();
    assert_eq!(states.len(), 2);
    let child = &states[1];
    assert_eq!(child.stack().depth(), 1);
    assert_eq!(
        child.stack().top().map(|s| s.to_string()),
        Some("print(1)".to_string())
    );
    assert!(child.output().is_empty());

    // Round 3 steps both; both finish.
    assert!(!scheduler.step_round().expect("round failed"));
    assert!(scheduler.repository().active_states().is_empty());
    assert_eq!(scheduler.retired().len(), 2);
    for state in scheduler.retired() {
        assert_eq!(state.status(), &ExecutionStatus::Completed);
        assert_eq!(state.output().len(), 1);
    }
}

#[test]
fn test_error_only_stops_the_failing_state() {
    let program = Stmt::sequence([
        Stmt::fork(Stmt::sequence([
            Stmt::print(Expr::int(1)),
            Stmt::print(Expr::int(2)),
            Stmt::print(Expr::int(3)),
        ])),
        Stmt::assign("missing", Expr::int(1)),
    ]);
    let mut scheduler = scheduler_for(program);
    let retired = scheduler.run_to_completion().expect("scheduler failed");
    assert_eq!(retired.len(), 2);

    let failed = retired
        .iter()
        .find(|s| matches!(s.status(), ExecutionStatus::Errored(_)))
        .expect("parent errored");
    assert_eq!(
        failed.status(),
        &ExecutionStatus::Errored(RuntimeError::UndefinedVariable {
            name: "missing".to_string()
        })
    );

    let survivor = retired
        .iter()
        .find(|s| s.status() == &ExecutionStatus::Completed)
        .expect("child completed");
    assert_eq!(ints(survivor.output()), vec![1, 2, 3]);
}

#[test]
fn test_empty_repository_finishes_immediately() {
    let mut scheduler = Scheduler::new(LogRepository::new(), SchedulerConfig::default());
    assert!(!scheduler.step_round().expect("round failed"));
    assert_eq!(scheduler.rounds(), 0);
    assert!(scheduler.run_to_completion().expect("run failed").is_empty());
}

#[test]
fn test_single_worker_gives_same_result() {
    let demo = demos::by_number(10).expect("fork demo");
    let mut scheduler = Scheduler::new(
        LogRepository::new(),
        SchedulerConfig { worker_threads: 1 },
    );
    scheduler.add_program_state(ProgramState::new(demo.program()));
    let mut outputs: Vec<Vec<i64>> = scheduler
        .run_to_completion()
        .expect("run failed")
        .iter()
        .map(|s| ints(s.output()))
        .collect();
    outputs.sort();
    assert_eq!(outputs, vec![vec![10, 30], vec![32, 30]]);
}

#[test]
fn test_demo_outputs() {
    let cases: [(usize, Vec<i64>); 7] = [
        (1, vec![2]),
        (2, vec![18]),
        (3, vec![2]),
        (6, vec![20, 25]),
        (7, vec![20, 35]),
        (8, vec![20]),
        (9, vec![4, 3, 2, 1, 0]),
    ];
    for (number, expected) in cases {
        let states = run_demo(number);
        assert_eq!(states.len(), 1, "demo {}", number);
        assert_eq!(states[0].status(), &ExecutionStatus::Completed);
        assert_eq!(ints(states[0].output()), expected, "demo {}", number);
    }
}

#[test]
fn test_fork_demo_interleaving() {
    let states = run_demo(10);
    assert_eq!(states.len(), 2);

    let parent = states.iter().min_by_key(|s| s.id()).expect("parent");
    let child = states.iter().max_by_key(|s| s.id()).expect("child");
    // Rounds act as barriers: the child's heap write lands before the
    // parent reads the cell back.
    assert_eq!(ints(parent.output()), vec![10, 30]);
    assert_eq!(ints(child.output()), vec![32, 30]);
}

#[test]
fn test_unreachable_cells_are_collected_between_rounds() {
    let program = Stmt::sequence([
        Stmt::declare("v", Type::reference(Type::Int)),
        Stmt::new_cell("v", Expr::int(1)),
        Stmt::new_cell("v", Expr::int(2)),
        Stmt::print(Expr::heap_read(Expr::var("v"))),
    ]);
    let states = forklang::run(program).expect("run failed");
    // The last collection ran before the final print, after the rebinding.
    assert_eq!(states[0].heap().len(), 1);
    assert_eq!(ints(states[0].output()), vec![2]);
}

#[test]
fn test_history_has_one_snapshot_per_round() {
    let mut scheduler = scheduler_for(demos::by_number(1).expect("demo").program());
    scheduler.run_to_completion().expect("run failed");
    let rounds = scheduler.rounds();
    let history = scheduler.into_repository().into_history();

    assert_eq!(rounds, 5);
    assert_eq!(history.len(), rounds);
    assert_eq!(history[0].round, 1);
    let last = &history[rounds - 1].threads[0];
    assert!(last.finished);
    assert_eq!(last.status, "completed");
    assert_eq!(last.output, vec!["2".to_string()]);
}

#[test]
fn test_log_file_records_every_state_twice_per_round() {
    let path = std::env::temp_dir().join(format!("forklang_log_{}.txt", std::process::id()));
    std::fs::remove_file(&path).ok();

    let mut scheduler = Scheduler::new(
        LogRepository::with_log_file(&path),
        SchedulerConfig::default(),
    );
    scheduler.add_program_state(ProgramState::new(
        demos::by_number(1).expect("demo").program(),
    ));
    scheduler.run_to_completion().expect("run failed");

    let log = std::fs::read_to_string(&path).expect("log file written");
    std::fs::remove_file(&path).ok();

    assert_eq!(log.matches("Execution Stack:\n").count(), 10);
    assert_eq!(log.matches("Symbol Table:\n").count(), 10);
    assert_eq!(log.matches(&format!("{}\n", "-".repeat(50))).count(), 10);
    assert!(log.contains("Heap:\n"));

    // Each record opens with a bare timestamp line, then the thread line.
    let mut lines = log.lines();
    let timestamp = lines.next().expect("record header");
    assert_eq!(timestamp.len(), "2024/01/01 00:00:00".len());
    assert_eq!(&timestamp[4..5], "/");
    assert!(!timestamp.contains("Thread"));
    assert!(lines.next().expect("thread line").starts_with("Thread "));
    assert_eq!(lines.next(), Some("Execution Stack:"));
    assert!(log.contains("Output:\n2\n"));
    assert!(log.contains("v -> 2\n"));
}

#[test]
fn test_log_write_failure_does_not_abort_run() {
    let path = std::env::temp_dir()
        .join(format!("forklang_no_such_dir_{}", std::process::id()))
        .join("run.log");

    let mut scheduler = Scheduler::new(
        LogRepository::with_log_file(&path),
        SchedulerConfig::default(),
    );
    scheduler.add_program_state(ProgramState::new(
        demos::by_number(1).expect("demo").program(),
    ));
    let retired = scheduler
        .run_to_completion()
        .expect("log failures must not stop the run");

    assert_eq!(retired.len(), 1);
    assert_eq!(retired[0].status(), &ExecutionStatus::Completed);
    assert_eq!(ints(retired[0].output()), vec![2]);
    assert!(!path.exists());
    assert_eq!(scheduler.into_repository().into_history().len(), 5);
}

/// `depth` levels of `(fork(P); P)`: 2^depth states reach `body` in the same round
fn fan_out(depth: u32, body: Stmt) -> Stmt {
    (0..depth).fold(body, |inner, _| {
        Stmt::compound(Stmt::fork(inner.clone()), inner)
    })
}

#[test]
fn test_parallel_allocations_get_distinct_surviving_cells() {
    let program = Stmt::compound(
        Stmt::declare("a", Type::reference(Type::Int)),
        fan_out(
            4,
            Stmt::compound(
                Stmt::new_cell("a", Expr::int(7)),
                Stmt::print(Expr::heap_read(Expr::var("a"))),
            ),
        ),
    );
    let mut scheduler = Scheduler::new(
        LogRepository::new(),
        SchedulerConfig { worker_threads: 4 },
    );
    scheduler.add_program_state(ProgramState::new(program));
    let retired = scheduler.run_to_completion().expect("run failed");
    assert_eq!(retired.len(), 16);

    let mut addresses: Vec<u64> = retired
        .iter()
        .map(|state| {
            state
                .symbols()
                .lookup("a")
                .ok()
                .and_then(Value::as_address)
                .expect("a holds a reference")
        })
        .collect();
    addresses.sort_unstable();
    addresses.dedup();
    assert_eq!(addresses.len(), 16, "every allocation got its own address");
    assert!(!addresses.contains(&0));

    // Each cell was still live when read back after the collection that
    // preceded the print round.
    for state in &retired {
        assert_eq!(state.status(), &ExecutionStatus::Completed);
        assert_eq!(ints(state.output()), vec![7]);
    }
    assert!(retired.iter().all(|s| s.heap().same_heap(retired[0].heap())));
}

#[test]
fn test_fan_out_allocations_share_one_round() {
    let program = Stmt::compound(
        Stmt::declare("a", Type::reference(Type::Int)),
        fan_out(
            3,
            Stmt::compound(Stmt::new_cell("a", Expr::int(1)), Stmt::Nop),
        ),
    );
    let mut scheduler = Scheduler::new(
        LogRepository::new(),
        SchedulerConfig { worker_threads: 4 },
    );
    scheduler.add_program_state(ProgramState::new(program));

    let mut previous_len = 0;
    let mut grew_by = Vec::new();
    while scheduler.step_round().expect("round failed") {
        let states = scheduler.repository().active_states();
        let len = states.first().map_or(0, |s| s.heap().len());
        if len != previous_len {
            grew_by.push(len.saturating_sub(previous_len));
            previous_len = len;
        }
    }
    // All eight allocations landed in a single round, none lost.
    assert_eq!(grew_by, vec![8]);
}
