//! The `eduplatform quiz` command: generate a quiz and take it against the
//! clock.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use eduplatform_core::assessment::{QuizCatalog, QuizSession, TickEvent};
use eduplatform_core::model::{Difficulty, Quiz, QuizRequest};
use eduplatform_core::quiz::{format_clock, FinishReason, Phase, QuizResults, Transition};
use eduplatform_core::session::Route;

use super::{api_error, App};

pub async fn execute(
    config_path: Option<&Path>,
    topic: String,
    difficulty: Option<Difficulty>,
    questions: Option<u32>,
) -> Result<()> {
    let app = App::signed_in(config_path, Route::Assessment).await?;

    let request = QuizRequest {
        topic,
        difficulty: difficulty.unwrap_or(app.config.default_difficulty),
        num_questions: questions.unwrap_or(app.config.default_num_questions),
    };

    let mut catalog = QuizCatalog::new(&app.session);
    println!(
        "Generating a {} quiz on \"{}\"...",
        request.difficulty, request.topic
    );
    let quiz = catalog.generate(&request).await.map_err(api_error)?.clone();

    println!(
        "{} questions, {} to complete, {}% to pass.",
        quiz.questions.len(),
        quiz.time_limit_label(),
        quiz.passing_score
    );
    println!("Type an option number to select it, Enter or `n` for the next question,");
    println!("`s` to submit early, `q` to abandon.\n");

    let mut session = QuizSession::new();
    session.start(quiz);
    if let Some(results) = take(&mut session).await? {
        print_results(&results, session.attempt().map(|a| a.quiz()));
    }
    Ok(())
}

/// Run the attempt until it finishes (`Some(results)`) or is abandoned.
async fn take(session: &mut QuizSession) -> Result<Option<QuizResults>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    show_question(session);

    while session.phase() == Phase::InProgress {
        tokio::select! {
            event = session.next_tick() => match event {
                TickEvent::Remaining(secs) => {
                    if secs % 60 == 0 || secs == 30 || secs <= 10 {
                        println!("  [{} left]", format_clock(secs));
                    }
                }
                TickEvent::TimedOut => println!("\nTime is up!"),
            },
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read input")? else {
                    // stdin closed: hand in what we have
                    session.submit()?;
                    break;
                };
                if !handle_input(session, line.trim())? {
                    session.reset();
                    println!("Quiz abandoned.");
                    return Ok(None);
                }
            }
        }
    }

    Ok(session.results())
}

/// Apply one line of input. Returns `false` when the user abandons.
fn handle_input(session: &mut QuizSession, input: &str) -> Result<bool> {
    match input {
        "q" | "quit" => return Ok(false),
        "s" | "submit" => {
            session.submit()?;
        }
        "" | "n" | "next" => {
            let answered = session
                .attempt()
                .is_some_and(|a| a.current_answer().is_some());
            if !answered {
                println!("Select an answer first.");
                return Ok(true);
            }
            if let Transition::NextQuestion(_) = session.advance()? {
                show_question(session);
            }
        }
        other => match other.parse::<usize>() {
            Ok(n) if n >= 1 => match session.answer(n - 1) {
                Ok(()) => println!("Selected {n}. Press Enter to continue."),
                Err(e) => println!("{e}"),
            },
            _ => println!("Unrecognised input: {other}"),
        },
    }
    Ok(true)
}

fn show_question(session: &QuizSession) {
    let Some(attempt) = session.attempt() else {
        return;
    };
    let quiz = attempt.quiz();
    let Some(question) = quiz.questions.get(attempt.cursor()) else {
        return;
    };

    println!(
        "Question {}/{}  [{:.0}%]  ({} left)",
        attempt.cursor() + 1,
        quiz.questions.len(),
        attempt.progress() * 100.0,
        format_clock(attempt.remaining_secs())
    );
    println!("{}", question.prompt);
    for (i, option) in question.options.iter().enumerate() {
        println!("  {}. {option}", i + 1);
    }
    print!("> ");
    let _ = std::io::stdout().flush();
}

fn print_results(results: &QuizResults, quiz: Option<&Quiz>) {
    let how = match results.finish {
        Some(FinishReason::TimedOut) => " (time ran out)",
        Some(FinishReason::Submitted) => " (submitted early)",
        _ => "",
    };
    println!("\nResults{how}");
    println!(
        "Score: {}%  ({}/{} correct, {}% needed)",
        results.score, results.correct, results.total, results.passing_score
    );
    if results.passed {
        println!("Passed. Well done!");
    } else {
        println!("Not passed this time. Keep practising!");
    }

    let Some(quiz) = quiz else {
        return;
    };
    for outcome in &results.outcomes {
        let Some(question) = quiz.questions.get(outcome.index) else {
            continue;
        };
        let mark = if outcome.is_correct { "✓" } else { "✗" };
        println!("\n{mark} {}. {}", outcome.index + 1, question.prompt);
        let chosen = outcome
            .selected
            .and_then(|i| question.options.get(i))
            .map_or("(no answer)", String::as_str);
        println!("   Your answer: {chosen}");
        if !outcome.is_correct {
            if let Some(correct) = question.options.get(outcome.correct_answer) {
                println!("   Correct answer: {correct}");
            }
        }
        if let Some(explanation) = &outcome.explanation {
            println!("   {explanation}");
        }
    }
}
