use clap::{Parser as ClapParser, Subcommand, ValueEnum};
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;
use wim_xpath::cli::{
    self, CliError, EvalOptions, OutputFormat, ParseOptions, PlanOptions,
};

#[derive(ClapParser)]
#[command(name = "wimxp")]
#[command(about = "wimxp - parse and plan federated entity search expressions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Tree,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => OutputFormat::Text,
            Format::Tree => OutputFormat::Tree,
            Format::Json => OutputFormat::Json,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an expression and show where each property is stored
    Parse {
        /// The search expression
        expression: String,

        /// JSON property mapping (enables location classification)
        #[arg(short, long)]
        mapping: Option<String>,

        /// Entity type assumed when the expression names none (repeatable)
        #[arg(short = 't', long = "type")]
        entity_types: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: Format,
    },

    /// Show how a search is split between the repository and look-aside store
    Plan {
        /// The search expression
        expression: String,

        /// JSON property mapping
        #[arg(short, long)]
        mapping: String,

        /// Entity type assumed when the expression names none (repeatable)
        #[arg(short = 't', long = "type")]
        entity_types: Vec<String>,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Filter a JSON array of entities with an expression
    Eval {
        /// The search expression
        expression: String,

        /// JSON input (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Parse {
            expression,
            mapping,
            entity_types,
            format,
        } => cli::execute_parse(&ParseOptions {
            expression,
            mapping,
            entity_types,
            format: format.into(),
        }),
        Commands::Plan {
            expression,
            mapping,
            entity_types,
            json,
        } => cli::execute_plan(&PlanOptions {
            expression,
            mapping: Some(mapping),
            entity_types,
            json,
        }),
        Commands::Eval {
            expression,
            input,
            pretty,
        } => run_eval(expression, input, pretty),
    };

    match result {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

fn run_eval(expression: String, input: Option<String>, pretty: bool) -> Result<String, CliError> {
    let input = match input {
        Some(s) => Some(s),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Some(buffer)
        }
        None => None,
    };

    cli::execute_eval(&EvalOptions {
        expression,
        input,
        pretty,
    })
}
