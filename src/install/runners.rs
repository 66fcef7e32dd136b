//! Console front end for an installation run
//!
//! Prints a header, renders step progress with a spinner while the branch runs,
//! and finishes with a banner that tells the operator what to do next.

use std::io::Write;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use tokio::sync::mpsc;

use super::branch::Branch;
use super::orchestration::{Orchestrator, Outcome, RunSummary, SEED_STEP};
use super::progress::{InstallProgress, Progress, StepPhase};
use super::provisioner::Provisioner;
use super::seed::SeedOutcome;
use super::step::StepResult;

/// Run `branch` with console progress and print the final summary.
pub async fn run_install<P: Provisioner>(orchestrator: Orchestrator<P>, branch: Branch) -> RunSummary {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true));
    let _ = writeln!(stdout, "TreeDoc dependency installer");
    let _ = stdout.reset();
    let _ = writeln!(stdout, "Platform branch: {branch}");
    let _ = writeln!(stdout, "Project root: {}\n", orchestrator.locator().root().display());
    let _ = stdout.flush();

    let (tx, rx) = mpsc::channel::<InstallProgress>(100);
    let progress_task = tokio::spawn(render_progress(rx));

    let orchestrator = orchestrator.with_progress(Progress::channel(tx));
    let summary = orchestrator.run(branch).await;
    // Dropping the orchestrator closes the channel and lets the renderer finish.
    drop(orchestrator);
    progress_task.await.ok();

    print_summary(&summary);
    summary
}

async fn render_progress(mut rx: mpsc::Receiver<InstallProgress>) {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(Duration::from_millis(120));

    while let Some(event) = rx.recv().await {
        let line = format!("{:<18} {}", event.step, event.message);
        match event.phase {
            StepPhase::Probing | StepPhase::Installing | StepPhase::Verifying => {
                spinner.set_message(line);
            }
            StepPhase::AlreadyPresent | StepPhase::Installed | StepPhase::Seeded => {
                print_line(&spinner, format!("  ✓ {line}"));
            }
            StepPhase::Warning => print_line(&spinner, format!("  ⚠ {line}")),
            StepPhase::Failed => print_line(&spinner, format!("  ✗ {line}")),
            StepPhase::Skipped => print_line(&spinner, format!("  - {line}")),
        }
    }

    spinner.finish_and_clear();
}

/// indicatif drops output while hidden (stdout is not a terminal).
fn print_line(spinner: &ProgressBar, line: String) {
    if spinner.is_hidden() {
        println!("{line}");
    } else {
        spinner.println(line);
    }
}

fn print_summary(summary: &RunSummary) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let _ = writeln!(stdout);

    for step in &summary.steps {
        let status = match &step.result {
            StepResult::AlreadyPresent => "already present".to_string(),
            StepResult::InstalledSuccessfully => "installed".to_string(),
            StepResult::InstalledWithWarning(error) => format!("warning: {error}"),
            StepResult::Failed(error) => format!("FAILED: {error}"),
        };
        let _ = writeln!(stdout, "  {:<18} {status}", step.component.name());
    }
    for component in &summary.skipped {
        let _ = writeln!(stdout, "  {:<18} skipped", component.name());
    }
    let seeded = match &summary.seed {
        Ok(SeedOutcome::Created) => "created default document".to_string(),
        Ok(SeedOutcome::AlreadyPresent) => "existing document kept".to_string(),
        Err(error) => format!("FAILED: {error}"),
    };
    let _ = writeln!(stdout, "  {SEED_STEP:<18} {seeded}\n");

    let (color, banner) = match summary.outcome() {
        Outcome::Success => (Color::Green, "Installation complete"),
        Outcome::SuccessWithWarnings => (Color::Yellow, "Installation complete with warnings"),
        Outcome::Failure => (Color::Red, "Installation failed"),
    };
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
    let _ = writeln!(stdout, "{banner}");
    let _ = stdout.reset();

    if summary.outcome() == Outcome::Failure {
        let _ = writeln!(
            stdout,
            "Fix the problem reported above and run the installer again; completed steps will be skipped."
        );
    } else if summary.outcome() == Outcome::SuccessWithWarnings {
        let _ = writeln!(stdout, "Optional components are missing; the editor still runs without them.");
    }
    let _ = stdout.flush();
}
