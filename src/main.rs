// forklang: round-scheduled interpreter with fork and a shared heap

use std::io;
use std::path::PathBuf;

use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing_subscriber::EnvFilter;

use forklang::demos;
use forklang::interpreter::engine::{ExecutionStatus, ProgramState};
use forklang::interpreter::scheduler::{Scheduler, SchedulerConfig};
use forklang::repository::LogRepository;
use forklang::ui::App;

/// Parsed command line
struct Options {
    demo: usize,
    log_path: Option<PathBuf>,
    tui: bool,
    workers: Option<usize>,
}

fn print_usage(program_name: &str) {
    eprintln!("Usage: {} <demo> [--log <file>] [--workers <n>] [--no-tui]", program_name);
    eprintln!("       {} --list", program_name);
    eprintln!();
    eprintln!("Logging verbosity is read from FORKLANG_LOG (e.g. FORKLANG_LOG=debug).");
}

fn print_demos() {
    for (i, demo) in demos::all().iter().enumerate() {
        println!("{:>2}. {}", i + 1, demo.name);
        println!("    {}", demo.program());
    }
}

fn parse_args(args: &[String]) -> Result<Option<Options>, String> {
    let mut demo = None;
    let mut log_path = None;
    let mut tui = true;
    let mut workers = None;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--list" => {
                print_demos();
                return Ok(None);
            }
            "--log" => {
                let path = iter.next().ok_or("--log needs a file name")?;
                log_path = Some(PathBuf::from(path));
            }
            "--workers" => {
                let n = iter.next().ok_or("--workers needs a number")?;
                workers = Some(
                    n.parse::<usize>()
                        .map_err(|_| format!("invalid worker count '{}'", n))?,
                );
            }
            "--no-tui" => tui = false,
            other => {
                let n = other
                    .parse::<usize>()
                    .map_err(|_| format!("unknown argument '{}'", other))?;
                demo = Some(n);
            }
        }
    }

    let demo = demo.ok_or("no demo selected")?;
    Ok(Some(Options {
        demo,
        log_path,
        tui,
        workers,
    }))
}

fn report(states: &[ProgramState]) {
    for state in states {
        match state.status() {
            ExecutionStatus::Errored(e) => eprintln!("Thread {} failed: {}", state.id(), e),
            status => eprintln!("Thread {} {}", state.id(), status),
        }
        for value in state.output() {
            println!("[{}] {}", state.id(), value);
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("FORKLANG_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let program_name = args.first().map(|s| s.as_str()).unwrap_or("forklang");

    let options = match parse_args(&args) {
        Ok(Some(options)) => options,
        Ok(None) => return Ok(()),
        Err(message) => {
            eprintln!("Error: {}", message);
            eprintln!();
            print_usage(program_name);
            std::process::exit(1);
        }
    };

    let Some(demo) = demos::by_number(options.demo) else {
        eprintln!("Error: no demo number {}", options.demo);
        eprintln!("Run `{} --list` to see the available demos.", program_name);
        std::process::exit(1);
    };

    let repo = match &options.log_path {
        Some(path) => LogRepository::with_log_file(path),
        None => LogRepository::new(),
    };
    let mut config = SchedulerConfig::default();
    if let Some(workers) = options.workers {
        config.worker_threads = workers;
    }

    let program = demo.program();
    eprintln!("Running demo: {}", demo.name);
    eprintln!("  {}", program);

    let mut scheduler = Scheduler::new(repo, config);
    scheduler.add_program_state(ProgramState::new(program));
    let retired = scheduler.run_to_completion()?;
    eprintln!("Finished after {} round(s).", scheduler.rounds());
    report(&retired);

    if !options.tui {
        return Ok(());
    }

    let history = scheduler.into_repository().into_history();
    if history.is_empty() {
        return Ok(());
    }

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(history);
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}
