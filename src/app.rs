//! Main application orchestration and execution

use crate::{
    cli::Cli,
    config::{display_config_summary, load_config, validate_config, EnvManager, ValidationLevel},
    error::{AppError, Result, RunError},
    executor::{ChannelObserver, Orchestrator, RunEvent},
    logging::LoggerFactory,
    models::Config,
    output::{FinalStatus, JsonReport, OutputFormatter, OutputFormatterFactory, ProgressDisplay},
};
use std::io::IsTerminal;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// Keyboard command typed on stdin while a run is in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    TogglePause,
    Stop,
}

impl ControlCommand {
    /// Parse one input line; unknown input yields `None`
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "p" | "pause" | "r" | "resume" => Some(Self::TogglePause),
            "s" | "stop" | "q" | "quit" => Some(Self::Stop),
            _ => None,
        }
    }
}

/// How the event loop ended
enum DriveOutcome {
    /// The orchestrator delivered its final status
    Finished(Option<RunError>),
    /// A second interrupt arrived while draining
    Aborted,
}

/// Main application struct that coordinates all components
pub struct App {
    cli: Cli,
}

impl App {
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the application and return the process exit code
    pub async fn run(self) -> Result<i32> {
        if let Some(ref path) = self.cli.init_env {
            EnvManager::save_example_env_file(path)?;
            eprintln!("Wrote example configuration to {}", path.display());
            return Ok(0);
        }

        if self.cli.should_show_topic_help() {
            println!("{}", self.cli.display_help());
            return Ok(0);
        }

        self.cli.validate().map_err(AppError::validation)?;

        let config = load_config(self.cli.clone())?;
        self.report_configuration(&config)?;

        let formatter = OutputFormatterFactory::create_formatter(config.enable_color, config.verbose);
        let run_config = config.run_config();

        let loggers = LoggerFactory::new(config.clone());
        let (observer, mut events) = ChannelObserver::new();
        let orchestrator = Orchestrator::new(Arc::new(observer))
            .with_loggers(loggers.create_run_logger().await, loggers.create_probe_logger().await);

        let mut display = ProgressDisplay::for_stderr(true);
        let interactive = !self.cli.no_input && std::io::stdin().is_terminal();

        eprintln!(
            "Testing up to {} addresses from {} on port {} ({} workers, {}ms timeout)",
            run_config.target_count,
            run_config.source_path.display(),
            run_config.port,
            run_config.max_workers,
            run_config.timeout_ms
        );
        if interactive {
            eprintln!("Controls: p + Enter = pause/resume, s + Enter = stop, Ctrl-C = stop");
        }

        // Registered before the run starts so no interrupt is missed
        let interrupts = match spawn_interrupt_listener() {
            Ok(interrupts) => interrupts,
            Err(e) => {
                eprintln!("{}", formatter.format_warning(&format!("Cannot listen for Ctrl-C: {}", e))?);
                mpsc::unbounded_channel().1
            }
        };

        orchestrator.start(run_config.clone()).await?;

        let commands = spawn_command_reader(!self.cli.no_input);
        let outcome = match drive(&orchestrator, &mut events, commands, interrupts, formatter.as_ref(), &mut display).await? {
            DriveOutcome::Finished(outcome) => outcome,
            DriveOutcome::Aborted => {
                eprintln!("{}", formatter.format_error("Aborted before in-flight probes finished")?);
                return Ok(RunError::Cancelled.exit_code());
            }
        };

        let summary = orchestrator.summary().await;
        let status = FinalStatus::from_outcome(outcome.as_ref(), summary.responsive());

        if self.cli.json {
            println!("{}", JsonReport::new(&summary, &run_config, &status).to_json_pretty()?);
        } else {
            println!("{}", formatter.format_header("CIDR Speedtest Results")?);
            println!();
            println!("{}", formatter.format_results_table(&summary.results)?);
            println!();
            println!("{}", formatter.format_run_summary(&summary, &status)?);
            println!();
            println!("{}", formatter.format_status(&status));
        }

        Ok(status.exit_code())
    }

    /// Print debug details and validation warnings to stderr
    fn report_configuration(&self, config: &Config) -> Result<()> {
        if config.debug {
            eprintln!("{} v{}", crate::PKG_NAME, crate::VERSION);
            eprintln!("{}", self.cli.get_config_summary());
            eprintln!("Configuration Summary:\n{}", display_config_summary(config));
            for warning in EnvManager::validate_current_env() {
                eprintln!("{}", warning);
            }
            eprintln!();
        }

        for warning in validate_config(config)? {
            if warning.level == ValidationLevel::Warning || config.verbose {
                eprintln!("{}", warning.format(config.enable_color));
            }
        }

        Ok(())
    }
}

/// Forward keyboard commands from stdin until it closes
fn spawn_command_reader(enabled: bool) -> mpsc::UnboundedReceiver<ControlCommand> {
    let (sender, receiver) = mpsc::unbounded_channel();
    if !enabled {
        return receiver;
    }

    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if let Some(command) = ControlCommand::parse(&line) {
                if sender.send(command).is_err() {
                    break;
                }
            }
        }
    });

    receiver
}

/// Forward every interrupt signal into a channel.
///
/// One signal stream lives for the whole run, so an interrupt that arrives
/// while a command is being applied is queued rather than lost.
fn spawn_interrupt_listener() -> std::io::Result<mpsc::UnboundedReceiver<()>> {
    let (sender, receiver) = mpsc::unbounded_channel();

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut interrupts = signal(SignalKind::interrupt())?;
        tokio::spawn(async move {
            while interrupts.recv().await.is_some() {
                if sender.send(()).is_err() {
                    break;
                }
            }
        });
    }

    #[cfg(not(unix))]
    {
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                if sender.send(()).is_err() {
                    break;
                }
            }
        });
    }

    Ok(receiver)
}

/// Render progress and apply user controls until the run reports its final status
async fn drive(
    orchestrator: &Orchestrator,
    events: &mut mpsc::UnboundedReceiver<RunEvent>,
    mut commands: mpsc::UnboundedReceiver<ControlCommand>,
    mut interrupts: mpsc::UnboundedReceiver<()>,
    formatter: &dyn OutputFormatter,
    display: &mut ProgressDisplay,
) -> Result<DriveOutcome> {
    let mut interrupt_count = 0u32;

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(RunEvent::Progress(snapshot)) => display.update(formatter, &snapshot),
                Some(RunEvent::Finished(outcome)) => {
                    display.clear();
                    return Ok(DriveOutcome::Finished(outcome));
                }
                None => return Err(AppError::internal("run ended without reporting a final status")),
            },
            Some(command) = commands.recv() => {
                apply_command(orchestrator, command, formatter, display).await?;
            }
            Some(()) = interrupts.recv() => {
                interrupt_count += 1;
                if interrupt_count > 1 {
                    display.clear();
                    return Ok(DriveOutcome::Aborted);
                }
                apply_command(orchestrator, ControlCommand::Stop, formatter, display).await?;
            }
        }
    }
}

async fn apply_command(
    orchestrator: &Orchestrator,
    command: ControlCommand,
    formatter: &dyn OutputFormatter,
    display: &mut ProgressDisplay,
) -> Result<()> {
    let message = match command {
        ControlCommand::TogglePause => match orchestrator.pause().await {
            Ok(true) => formatter.format_warning("Paused, press p + Enter to resume")?,
            Ok(false) => formatter.format_success("Resumed")?,
            Err(e) => formatter.format_warning(&e.to_string())?,
        },
        ControlCommand::Stop => match orchestrator.stop().await {
            Ok(()) => formatter.format_warning("Stopping, waiting for in-flight probes")?,
            Err(e) => formatter.format_warning(&e.to_string())?,
        },
    };

    display.message(&message);
    Ok(())
}
