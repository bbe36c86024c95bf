use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use tokio::sync::mpsc::UnboundedReceiver;

use ethos_application::{
    FeedbackDelivery, FeedbackReport, ResultRecorder, ScenarioController, SubmitOutcome,
};
use ethos_core::config::PracticeConfig;
use ethos_core::event::PracticeEvent;
use ethos_core::scenario::StartTarget;
use ethos_core::session::{SessionView, Turn};
use ethos_infrastructure::TomlResultCache;
use ethos_interaction::{HttpResultSink, HttpScenarioService};

use crate::repl::{COMMANDS, Input, PracticeHelper};

type PracticeEditor = Editor<PracticeHelper, DefaultHistory>;

/// Runs the interactive practice REPL.
pub async fn run(
    config: PracticeConfig,
    scenario: Option<String>,
    query: Option<String>,
) -> Result<()> {
    let service = Arc::new(HttpScenarioService::from_config(&config)?);
    let sink = Arc::new(HttpResultSink::from_config(&config)?);
    let recorder = ResultRecorder::new(sink).with_pending_store(Arc::new(TomlResultCache::new()?));

    match recorder.flush_pending().await {
        Ok(report) if report.saved > 0 => println!(
            "{}",
            format!("Saved {} result(s) from earlier sessions.", report.saved).bright_black()
        ),
        Ok(_) => {}
        Err(e) => tracing::warn!("Could not retry cached results: {}", e),
    }

    let (controller, mut events) = ScenarioController::new(service, recorder, config).with_events();

    let mut rl: PracticeEditor = Editor::new()?;
    rl.set_helper(Some(PracticeHelper::new()));

    println!("{}", "=== ETHOS Practice ===".bright_magenta().bold());

    let target = match (scenario, query) {
        (Some(id), _) => StartTarget::Scenario(id),
        (None, Some(query)) => StartTarget::Query(query),
        (None, None) => match rl.readline("What would you like to practice? ") {
            Ok(line) if !line.trim().is_empty() => StartTarget::Query(line.trim().to_string()),
            Ok(_) => return Ok(()),
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => return Ok(()),
            Err(e) => return Err(e).context("Failed to read topic"),
        },
    };

    let view = controller.start(target).await?;
    print_header(&view);
    render_events(&mut events);
    print_choices(&view);
    print_help();

    loop {
        let line = match rl.readline(">> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}", format!("Error: {:?}", e).red());
                break;
            }
        };

        let input = Input::parse(&line);
        if !matches!(input, Input::Empty) {
            let _ = rl.add_history_entry(line.trim());
        }

        match input {
            Input::Quit => break,
            Input::Empty => {}
            Input::Help => print_help(),
            Input::ShowChoices => {
                if let Some(view) = controller.view().await {
                    print_choices(&view);
                }
            }
            Input::Choice(index) => match controller.submit_choice(index).await {
                Ok(outcome) => {
                    render_events(&mut events);
                    match outcome {
                        SubmitOutcome::Advanced { .. } => {
                            if let Some(view) = controller.view().await {
                                print_choices(&view);
                            }
                        }
                        SubmitOutcome::Completed(_) => println!(
                            "{}",
                            "Type /feedback for a breakdown or /restart to try again.".bright_black()
                        ),
                        SubmitOutcome::Ignored { state } => println!(
                            "{}",
                            format!("Not accepting a choice right now ({}).", state).yellow()
                        ),
                        SubmitOutcome::Discarded => {}
                    }
                }
                Err(e) => report_error(&e),
            },
            Input::Feedback => match controller.request_feedback().await {
                Ok(delivery) => {
                    render_events(&mut events);
                    match delivery {
                        FeedbackDelivery::Report(report) => print_report(&report),
                        FeedbackDelivery::HandedOff { .. } => {}
                    }
                }
                Err(e) => report_error(&e),
            },
            Input::Restart => match controller.restart().await {
                Ok(view) => {
                    print_header(&view);
                    render_events(&mut events);
                    print_choices(&view);
                }
                Err(e) => report_error(&e),
            },
            Input::Unknown(text) => println!(
                "{}",
                format!("Unknown input '{}'. Type /help for commands.", text).bright_black()
            ),
        }
    }

    println!("{}", "Goodbye!".bright_green());
    Ok(())
}

fn report_error(error: &ethos_core::EthosError) {
    eprintln!("{}", format!("Error: {}", error).red());
    if error.is_retryable() {
        println!("{}", "You can try that again.".yellow());
    }
}

fn print_header(view: &SessionView) {
    println!();
    println!("{}", view.scenario.title.bright_white().bold());
    println!("{}", view.scenario.description);
    println!(
        "{}",
        format!(
            "Issue: {}  |  Manager: {}",
            view.scenario.issue, view.scenario.manager_type
        )
        .bright_black()
    );
    println!("{}", view.scenario.manager_type.description().bright_black());
    println!();
}

fn print_choices(view: &SessionView) {
    if view.is_complete || view.current_choices.is_empty() {
        return;
    }
    for choice in &view.current_choices {
        let line = format!("  {}. {}", choice.index + 1, choice.text);
        if view.choices_enabled {
            println!("{}", line.cyan());
        } else {
            println!("{}", line.bright_black());
        }
    }
}

fn print_help() {
    println!(
        "{}",
        format!(
            "Enter a choice number, {} or 'quit' to exit.",
            COMMANDS.join(", ")
        )
        .bright_black()
    );
}

fn render_events(events: &mut UnboundedReceiver<PracticeEvent>) {
    while let Ok(event) = events.try_recv() {
        match event {
            PracticeEvent::TurnAppended { turn, .. } => render_turn(&turn),
            PracticeEvent::ManagerTyping { .. } => {
                println!("{}", "Manager is typing...".bright_black().italic())
            }
            PracticeEvent::SessionCompleted { summary, .. } => {
                println!("{}", summary.headline().bright_magenta().bold());
            }
            PracticeEvent::PersistenceFailed { message, .. } => println!(
                "{}",
                format!("Could not save your result ({}). It will be retried later.", message)
                    .yellow()
            ),
            PracticeEvent::AssistantHandoff { prompt, .. } => {
                println!("{}", "--- Sent to your assistant ---".bright_magenta());
                for line in prompt.lines() {
                    println!("{}", line.bright_blue());
                }
            }
            PracticeEvent::SessionStarted { .. } | PracticeEvent::ChoicesReady { .. } => {}
        }
    }
}

fn render_turn(turn: &Turn) {
    match turn {
        Turn::Manager { text, .. } => {
            println!("{}", "[Manager]".bright_magenta());
            for line in text.lines() {
                println!("{}", line.bright_blue());
            }
        }
        Turn::User { text, .. } => println!("{}", format!("> {}", text).green()),
        Turn::Feedback {
            evs,
            category,
            message,
            ..
        } => {
            println!("{}", format!("  EVS {:+} | {}", evs, category).yellow());
            println!("{}", format!("  {}", message).yellow());
            println!();
        }
        Turn::FinalEvaluation { text } => {
            for line in text.lines() {
                println!("{}", line.bright_white().bold());
            }
        }
    }
}

fn print_report(report: &FeedbackReport) {
    println!();
    println!("{}", report.headline.bright_magenta().bold());
    println!("{}", report.summary.rating_description);
    println!();
    for choice in &report.choices {
        println!(
            "{}",
            format!("{}. \"{}\"", choice.step, choice.choice).green()
        );
        println!(
            "{}",
            format!(
                "   {} ({}) EVS {:+}",
                choice.category, choice.tactic_type, choice.evs
            )
            .yellow()
        );
        println!("   {}", choice.message);
    }
    if !report.summary.tactic_counts.is_empty() {
        println!();
        println!("{}", "Tactics used:".bright_white());
        for (tactic, count) in &report.summary.tactic_counts {
            println!("  {} x{}", tactic, count);
        }
    }
}
