use std::io::{self, Write};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use ilm_agents::{
    parse_backend, parse_primary_language, parse_secondary_language, parse_timeout_ms,
    TutorAgent, TutorConfig,
};
use ilm_backend::OpenAiSettings;
use ilm_core::{
    classify_question, detect_language, normalize_text, AskInput, Category, CarefulTopic,
    Language, PlanRequest, TutorError,
};
use ilm_observability::{init_tracing, AppMetrics};
use serde::Serialize;

#[derive(Debug, Parser)]
#[command(name = "ilm")]
#[command(about = "Ilm Companion: sourced answers and memorization plans")]
struct Cli {
    #[command(flatten)]
    tutor: TutorArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct TutorArgs {
    /// `static` or `openai`.
    #[arg(long, global = true, env = "ILM_BACKEND", default_value = "static")]
    backend: String,

    #[arg(long, global = true, env = "ILM_BACKEND_TIMEOUT_MS", default_value = "8000")]
    timeout_ms: String,

    #[arg(long, global = true, env = "ILM_PRIMARY_LANGUAGE", default_value = "en")]
    primary_language: String,

    /// `none` disables the secondary block.
    #[arg(long, global = true, env = "ILM_SECONDARY_LANGUAGE", default_value = "ar")]
    secondary_language: String,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Answer one question.
    Ask {
        question: String,
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        user: Option<String>,
    },
    /// Build a weekly memorization plan.
    Plan {
        #[arg(long)]
        goal: Option<String>,
        #[arg(long)]
        days: i64,
        #[arg(long)]
        minutes: i64,
        #[arg(long)]
        review_ratio: f64,
        #[arg(long, default_value = "en")]
        language: String,
    },
    /// Show how a question would be routed, without calling a backend.
    Classify { question: String },
    Chat,
}

#[derive(Debug, Serialize)]
struct ClassifyOutput {
    category: Category,
    careful_topic: Option<CarefulTopic>,
    language: Language,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("ilm_cli");
    let cli = Cli::parse();

    match cli.command {
        Command::Classify { question } => {
            println!("{}", serde_json::to_string_pretty(&classify_output(&question))?);
        }
        Command::Ask {
            question,
            language,
            user,
        } => {
            let agent = build_agent(&cli.tutor)?;
            let answer = agent
                .ask(AskInput {
                    question,
                    user_id: user,
                    preferred_language: language,
                })
                .await?;
            println!("{}", serde_json::to_string_pretty(&answer)?);
        }
        Command::Plan {
            goal,
            days,
            minutes,
            review_ratio,
            language,
        } => {
            let agent = build_agent(&cli.tutor)?;
            let plan = agent.plan(PlanRequest {
                goal,
                days_per_week: days,
                minutes_per_day: minutes,
                review_ratio,
                base_language: language,
            })?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        Command::Chat => run_chat(build_agent(&cli.tutor)?).await?,
    }

    Ok(())
}

/// Never fails: every input, including an empty one, gets a category.
fn classify_output(question: &str) -> ClassifyOutput {
    let question = normalize_text(question);
    let classification = classify_question(&question);
    ClassifyOutput {
        category: classification.category,
        careful_topic: classification.careful_topic,
        language: detect_language(None, &question),
    }
}

async fn run_chat(agent: TutorAgent) -> Result<()> {
    println!(
        "Ilm Companion chat mode (backend: {}). type 'exit' to quit.",
        agent.backend_name()
    );

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }

        let message = line.trim();
        if message.eq_ignore_ascii_case("exit") || message.eq_ignore_ascii_case("quit") {
            break;
        }
        if message.is_empty() {
            continue;
        }

        let result = agent
            .ask(AskInput {
                question: message.to_string(),
                user_id: None,
                preferred_language: None,
            })
            .await;

        match result {
            Ok(answer) => println!("\n{}\n", serde_json::to_string_pretty(&answer)?),
            Err(error @ TutorError::InvalidInput { .. }) => println!("\n{error}\n"),
            Err(TutorError::Composition(_)) => {
                println!("\nthe answer could not be assembled; try rephrasing the question\n")
            }
        }
    }

    Ok(())
}

fn build_agent(args: &TutorArgs) -> Result<TutorAgent> {
    let config = TutorConfig {
        backend: parse_backend(&args.backend)?,
        backend_timeout: parse_timeout_ms(&args.timeout_ms)?,
        primary_language: parse_primary_language(&args.primary_language)?,
        secondary_language: parse_secondary_language(&args.secondary_language)?,
        openai: OpenAiSettings::from_env(),
    };

    TutorAgent::from_config(config, AppMetrics::shared())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_accepts_inputs_ask_would_reject() {
        let output = classify_output("");
        assert_eq!(output.category, Category::Quran);
        assert_eq!(output.language, Language::Unknown);

        let output = classify_output("?");
        assert_eq!(output.category, Category::Quran);

        let output = classify_output("  what is   qalqalah ");
        assert_eq!(output.category, Category::Tajwid);
        assert_eq!(output.language, Language::En);
    }
}
