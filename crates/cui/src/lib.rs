mod actions;
mod advisor;
mod app;
mod input;
mod logger;
mod script;
mod view;

use advisor::{AdvisorCommand, ProcessAdvisor, DEFAULT_ADVISOR_TIMEOUT_MS};
use anyhow::{Context, Result};
use app::App;
use crossterm::event::{self, Event as CEvent, KeyEventKind};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{execute, ExecutableCommand};
use log::LevelFilter;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use script::load_script_file;
use std::io::{self, stdout, IsTerminal};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub advisor: Option<String>,
    pub advisor_timeout_ms: u64,
    pub script: Option<PathBuf>,
    pub log_level: LevelFilter,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            advisor: None,
            advisor_timeout_ms: DEFAULT_ADVISOR_TIMEOUT_MS,
            script: None,
            log_level: LevelFilter::Warn,
        }
    }
}

pub fn run(options: LaunchOptions) -> Result<()> {
    let log_buffer = match logger::install(options.log_level) {
        Ok(buffer) => Some(buffer),
        Err(err) => {
            eprintln!("oracle-cui: logger unavailable: {err}");
            None
        }
    };

    let timeout = Duration::from_millis(options.advisor_timeout_ms);
    let command = options
        .advisor
        .as_deref()
        .and_then(|line| AdvisorCommand::parse(line, timeout));
    let mut app = App::new(ProcessAdvisor::new(command), log_buffer);

    if let Some(path) = options.script.as_ref() {
        let commands = load_script_file(path)
            .with_context(|| format!("load script from {}", path.display()))?;
        app.apply_script(&commands);
    }

    ensure_interactive_terminal()?;

    enable_raw_mode().map_err(|err| {
        anyhow::anyhow!(
            "failed to enable raw mode; ensure the process owns an interactive terminal: {err}"
        )
    })?;
    let mut stdout = stdout();
    stdout
        .execute(EnterAlternateScreen)
        .context("enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let run_result = run_loop(&mut terminal, &mut app);
    restore_terminal(&mut terminal)?;
    run_result
}

pub fn run_with_args(args: &[String]) -> Result<()> {
    let options = parse_options(args, |key| std::env::var(key).ok());
    run(options)
}

fn parse_options(args: &[String], env: impl Fn(&str) -> Option<String>) -> LaunchOptions {
    let mut advisor = env("ORACLE_ADVISOR").filter(|value| !value.trim().is_empty());
    let mut advisor_timeout_ms = env("ORACLE_ADVISOR_TIMEOUT_MS")
        .and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_ADVISOR_TIMEOUT_MS);
    let mut script = None;
    let log_level = logger::parse_level(env("ORACLE_LOG").as_deref());
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "--advisor" | "-a" => {
                if let Some(value) = args.get(idx + 1) {
                    advisor = Some(value.clone());
                    idx += 1;
                }
            }
            "--advisor-timeout-ms" => {
                if let Some(value) = args.get(idx + 1) {
                    if let Ok(parsed) = value.parse::<u64>() {
                        advisor_timeout_ms = parsed;
                    }
                    idx += 1;
                }
            }
            "--script" | "--auto-json" => {
                if let Some(value) = args.get(idx + 1) {
                    script = Some(PathBuf::from(value));
                    idx += 1;
                }
            }
            _ => {}
        }
        idx += 1;
    }
    LaunchOptions {
        advisor,
        advisor_timeout_ms,
        script,
        log_level,
    }
}

fn run_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_millis(120);
    while !app.should_quit {
        terminal.draw(|frame| view::draw(frame, app))?;
        if event::poll(tick_rate)? {
            if let CEvent::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && !app.handle_picker_key(key) {
                    let action = input::map_key(key);
                    actions::dispatch(app, action);
                }
            }
        }
        app.on_tick();
    }
    Ok(())
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen).context("leave alternate screen")?;
    terminal.show_cursor().context("show cursor")?;
    Ok(())
}

fn ensure_interactive_terminal() -> Result<()> {
    if io::stdin().is_terminal() && io::stdout().is_terminal() {
        return Ok(());
    }
    anyhow::bail!(
        "oracle-cui requires an interactive TTY (run directly in a terminal, not a piped/headless shell)"
    );
}
