use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::fmt::time::ChronoLocal;

use mockdrill_core::registry::SessionRegistry;
use mockdrill_service::chat_oracle::ChatOracle;
use mockdrill_service::config::Config;
use mockdrill_service::vision::VisionAnalyzer;

/// Run one mock interview interactively in the terminal.
#[derive(Parser)]
struct Cli {
    /// The role to interview for: SDE, Sales, "Retail Associate", or HR
    role: String,
    /// Interviewer persona: Confused, Efficient, Chatty, Edge-case, or
    /// Adaptive
    #[arg(long, default_value = "Adaptive")]
    persona: String,
    /// Candidate display name
    #[arg(long, default_value = "Candidate")]
    name: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load application configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(ChronoLocal::rfc_3339())
        .init();

    tracing::info!("Configuration loaded successfully. Starting interview service...");

    // --- 3. Parse Command-Line Arguments ---
    let args = Cli::parse();

    // --- 4. Build Collaborators and the Registry ---
    let oracle = Arc::new(ChatOracle::new(
        config.api_key()?.to_string(),
        config.chat_model.clone(),
        config.endpoint().to_string(),
    ));
    let analyzer = Arc::new(VisionAnalyzer::new(config.analyzer_url.clone()));
    let registry = SessionRegistry::new(oracle, analyzer, config.registry_config());

    // --- 5. Run One Session Over Stdin ---
    let started = registry
        .start(&args.role, &args.persona, &args.name)
        .await?;
    tracing::info!(session = %started.id, "interview session started");

    println!("\n{}\n", started.greeting);
    println!("Q1: {}\n", started.first_question);

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    let mut question_number = 1u32;

    while let Some(line) = lines.next_line().await? {
        let answer = line.trim();
        if answer.is_empty() {
            continue;
        }
        if answer.eq_ignore_ascii_case("quit") || answer.eq_ignore_ascii_case("exit") {
            println!("\nEnding the interview early.");
            break;
        }

        let advance = registry.submit_answer(started.id, answer).await?;
        println!("\n{}\n", advance.acknowledgment);

        if advance.ended {
            println!("That was the last question — compiling your feedback now.\n");
            break;
        }
        if let Some(question) = advance.next_question {
            if advance.is_followup {
                println!("Follow-up: {question}\n");
            } else {
                question_number += 1;
                println!("Q{question_number}: {question}\n");
            }
        }
    }

    // --- 6. Compile and Print the Closing Report ---
    let report = registry.end(started.id).await?;
    let feedback = &report.feedback;

    println!("==== Interview Feedback ====");
    println!("Technical:     {}/10", feedback.technical_score);
    println!("Communication: {}/10", feedback.communication_score);
    println!("Confidence:    {}/10", feedback.confidence_score);
    println!("\n{}\n", feedback.overall_summary);

    if !feedback.strengths.is_empty() {
        println!("Strengths:");
        for item in &feedback.strengths {
            println!("  + {item}");
        }
    }
    if !feedback.weaknesses.is_empty() {
        println!("Weaknesses:");
        for item in &feedback.weaknesses {
            println!("  - {item}");
        }
    }
    if !feedback.recommendations.is_empty() {
        println!("Recommendations:");
        for item in &feedback.recommendations {
            println!("  * {item}");
        }
    }

    let cheating = &feedback.cheating_summary;
    if cheating.total_events > 0 {
        println!(
            "\nProctoring: {} events logged, risk score {}/100",
            cheating.total_events, cheating.risk_score
        );
    }

    Ok(())
}
