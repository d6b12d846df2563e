mod cli;

use anyhow::Context;
use clap::Parser;
use exam_core::DefinitionParser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use services::{ExamService, ExamSession, SessionStore, placeholder_session};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, DemoArgs, LoadArgs};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn load(args: LoadArgs) -> anyhow::Result<ExamSession> {
    let parser = DefinitionParser::new().with_unknown_types(args.unknown_types());
    let service = ExamService::new(SessionStore::new(placeholder_session())).with_parser(parser);

    let overview = service
        .load_from_path(&args.definition, &args.details(), args.paper.as_deref())
        .await
        .with_context(|| format!("could not load {}", args.definition.display()))?;
    info!(
        definition = %args.definition.display(),
        sections = overview.sections,
        questions = overview.questions,
        "exam loaded"
    );
    Ok(service.store().snapshot())
}

fn demo(args: &DemoArgs) -> ExamSession {
    let service = ExamService::new(SessionStore::new(placeholder_session()));
    let overview = match args.seed {
        Some(seed) => service.reset_to_placeholder(&mut StdRng::seed_from_u64(seed)),
        None => service.reset_to_placeholder(&mut rand::rng()),
    };
    info!(seed = ?args.seed, questions = overview.questions, "mock exam ready");
    service.store().snapshot()
}

fn print_overview(session: &mut ExamSession) {
    let state = session.state();
    println!(
        "{} ({} min, {} questions)",
        state.test_name,
        state.total_duration_seconds / 60,
        session.question_count()
    );
    if let Some(paper) = session.question_paper() {
        println!("question paper: {}", paper.display());
    }

    let summary = session.refresh_summary().clone();
    for section in session.sections() {
        let questions = session.section_questions(&section.name).map_or(0, |q| q.len());
        let counts = summary.get(&section.name).copied().unwrap_or_default();
        println!(
            "  [{}] {:<24} {:>3} questions  answered {:>2}  marked {:>2}  not answered {:>2}",
            section.id,
            section.name,
            questions,
            counts.answered + counts.marked_answered,
            counts.marked + counts.marked_answered,
            counts.not_answered,
        );
    }

    match session.current_question() {
        Some(current) => println!(
            "current: {} Q{} (#{})",
            current.section, current.local_number, current.global_id
        ),
        None => println!("current: none"),
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let (mut session, json) = match cli.command {
        Command::Load(args) => {
            let json = args.json;
            (load(args).await?, json)
        }
        Command::Demo(args) => (demo(&args), args.json),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&session)?);
    } else {
        print_overview(&mut session);
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        error!("{err:#}");
        std::process::exit(2);
    }
}
