//! notemig
//!
//! Migrates a folder-based Markdown note workspace so that every local file
//! a note links to lives under `attachments/<note path>/`, with the links
//! rewritten to point there.

use anyhow::{Context, Result};
use clap::Parser;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input};
use notemig::cli::Cli;
use notemig::errors::{ActionableError, MigrationError};
use notemig::events::{EventSink, MigrationEvent};
use notemig::messages::Messages;
use notemig::migrate::{migrate_workspace, MigrationReport};
use notemig::output::{ExitCode, JsonError, JsonOutput, OutputContext};
use notemig::workspace::validate_root;
use std::io;
use tracing_subscriber::EnvFilter;

const COMMAND: &str = "migrate";

/// Renders migration events as console lines
struct ConsoleSink<'a> {
    output: &'a OutputContext,
    messages: Messages,
}

impl EventSink for ConsoleSink<'_> {
    fn notify(&self, event: &MigrationEvent) {
        match event {
            MigrationEvent::AttachmentCollision {
                source,
                destination,
                identical: false,
            } => {
                let _ = self
                    .output
                    .print_warning(self.messages.collision_warning(source, destination));
            }
            MigrationEvent::DocumentsFound { .. } => {
                let _ = self.output.print_info(self.messages.starting());
                let _ = self.output.print_info(self.messages.event(event));
            }
            _ => {
                let _ = self.output.print_info(self.messages.event(event));
            }
        }
    }
}

fn io_kind_to_exit_code(kind: io::ErrorKind) -> ExitCode {
    match kind {
        io::ErrorKind::NotFound => ExitCode::NotFound,
        io::ErrorKind::PermissionDenied => ExitCode::PermissionDenied,
        _ => ExitCode::ExternalError,
    }
}

/// Helper to determine exit code from the error chain
fn error_to_exit_code(error: &anyhow::Error) -> ExitCode {
    for cause in error.chain() {
        if let Some(migration_error) = cause.downcast_ref::<MigrationError>() {
            return match migration_error {
                MigrationError::InvalidWorkspace(_) => ExitCode::InvalidArgument,
                other => other
                    .io_kind()
                    .map(io_kind_to_exit_code)
                    .unwrap_or(ExitCode::ExternalError),
            };
        }
        if cause.downcast_ref::<ActionableError>().is_some() {
            return ExitCode::InvalidArgument;
        }
        if let Some(io_error) = cause.downcast_ref::<io::Error>() {
            return io_kind_to_exit_code(io_error.kind());
        }
    }
    ExitCode::GenericError
}

fn report_error(error: &anyhow::Error, exit_code: ExitCode, json: bool) {
    if json {
        let output = JsonError::new(exit_code, format!("{:#}", error), COMMAND);
        if let Ok(text) = output.to_json_string() {
            println!("{}", text);
        }
        return;
    }

    // Actionable errors carry their own "Error:" block with remedies
    let actionable = error.chain().find_map(|cause| {
        match cause.downcast_ref::<MigrationError>() {
            Some(MigrationError::InvalidWorkspace(inner)) => Some(inner),
            _ => cause.downcast_ref::<ActionableError>(),
        }
    });
    match actionable {
        Some(inner) => eprint!("{}", inner.to_error_message()),
        None => eprintln!("Error: {:#}", error),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let exit_code = match run(&cli) {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            let code = error_to_exit_code(&e);
            report_error(&e, code, cli.json);
            code
        }
    };

    if exit_code != ExitCode::Success {
        std::process::exit(exit_code.code());
    }
}

fn run(cli: &Cli) -> Result<()> {
    let output = OutputContext::new(cli.quiet, cli.json);
    let messages = Messages::new(cli.lang);
    cli.check()?;

    let raw_root = match &cli.workspace {
        Some(path) => path.clone(),
        None => Input::<String>::with_theme(&ColorfulTheme::default())
            .with_prompt(messages.prompt_workspace())
            .allow_empty(true)
            .interact_text()
            .context("Failed to read the workspace path")?,
    };
    let root = validate_root(&raw_root)?;

    if !cli.skip_confirmation() {
        let proceed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(messages.confirm_start(&root))
            .default(false)
            .interact()
            .context("Failed to read confirmation")?;
        if !proceed {
            output.print_info(messages.aborted())?;
            return Ok(());
        }
    }

    let options = cli.migrate_options();
    if options.dry_run {
        output.print_info(messages.dry_run_notice())?;
    } else if options.backup_dir.is_some() {
        output.print_info(messages.backing_up())?;
    }

    let sink = ConsoleSink {
        output: &output,
        messages,
    };
    let report = migrate_workspace(&root, &options, &sink)
        .with_context(|| format!("Migration of {} stopped", root.display()))?;

    if cli.json {
        let envelope = JsonOutput::success(&report, COMMAND);
        println!("{}", envelope.to_json_string()?);
        return Ok(());
    }

    print_plans(&output, &messages, &report)?;
    output.print_info(messages.summary(&report))?;
    output.print_info(messages.finished())?;
    Ok(())
}

fn print_plans(output: &OutputContext, messages: &Messages, report: &MigrationReport) -> Result<()> {
    for plan in &report.plans {
        output.print_data(messages.plan_header(&plan.document))?;
        for link in &plan.links {
            output.print_data(messages.planned_link(&link.original_target, &link.new_target))?;
        }
    }
    Ok(())
}
