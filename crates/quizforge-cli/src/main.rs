//! quizforge CLI: admin and debug surface over the grading engine.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

mod commands;

#[derive(Parser)]
#[command(name = "quizforge", version, about = "Question type registry and grading engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Output format for `grade`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Table,
    Json,
    Markdown,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate question set files
    Validate {
        /// Path to a .json/.toml question set or a directory
        #[arg(long)]
        question_set: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Render questions the way a quiz would present them
    Show {
        /// Path to a .json/.toml question set
        #[arg(long)]
        question_set: PathBuf,

        /// Only show the question at this (1-based) position
        #[arg(long)]
        question: Option<usize>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Grade a response sheet against a question set
    Grade {
        /// Path to a .json/.toml question set
        #[arg(long)]
        question_set: PathBuf,

        /// Path to a JSON response sheet
        #[arg(long)]
        responses: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = ReportFormat::Table)]
        format: ReportFormat,

        /// Also save the full report as JSON to this path
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Convert legacy questions or responses to the tagged shape
    Migrate {
        /// Legacy JSON file
        #[arg(long)]
        input: PathBuf,

        /// Treat the input as a response sheet instead of a question set
        #[arg(long)]
        responses: bool,

        /// Write here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// List question types and their rollout status
    Types {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config and example question set
    Init,
}

fn main() {
    let directive = match "quizforge=info".parse::<tracing_subscriber::filter::Directive>() {
        Ok(directive) => directive,
        Err(e) => {
            eprintln!("Error: invalid log directive: {e}");
            process::exit(1);
        }
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(directive))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate {
            question_set,
            config,
        } => commands::validate::execute(question_set, config),
        Commands::Show {
            question_set,
            question,
            config,
        } => commands::show::execute(question_set, question, config),
        Commands::Grade {
            question_set,
            responses,
            format,
            output,
            config,
        } => commands::grade::execute(question_set, responses, format, output, config),
        Commands::Migrate {
            input,
            responses,
            output,
        } => commands::migrate::execute(input, responses, output),
        Commands::Types { json, config } => commands::types::execute(json, config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
