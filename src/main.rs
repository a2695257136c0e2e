extern crate clap;

mod errors;
mod flow;
mod openai;
mod terminal;
mod vocab;

use crate::errors::exit_codes;
use crate::flow::{ExerciseFlow, RemoteTutor};
use crate::openai::client::DEFAULT_MODEL;
use crate::openai::Client;
use crate::terminal::SessionController;
use crate::vocab::Proficiency;
use clap::Parser;
use clap_verbosity_flag::Verbosity;
use colored::Colorize;
use log::debug;
use std::env;
use std::io::{self, IsTerminal};
use std::process;

/// Environment variable holding the exercise service credential.
const CREDENTIAL_VAR: &str = "OPENAI_API_KEY";

/// Environment variable overriding the default model.
const MODEL_VAR: &str = "LINGODRILL_MODEL";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Topic to practice, answered instead of the first topic prompt
    #[arg(long, num_args = 1.., value_name = "WORDS")]
    topic: Option<Vec<String>>,

    /// Learner level used when sampling vocabulary
    #[arg(long, value_enum, default_value_t = Proficiency::Intermediate)]
    level: Proficiency,

    #[command(flatten)]
    verbosity: Verbosity,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.verbosity.log_level_filter())
        .init();

    let Ok(api_key) = env::var(CREDENTIAL_VAR) else {
        eprintln!(
            "{} {} is not set; it is required to reach the exercise service.",
            "Missing credential:".bold().red(),
            CREDENTIAL_VAR
        );
        process::exit(exit_codes::MISSING_CREDENTIAL);
    };

    let model = env::var(MODEL_VAR).unwrap_or_else(|_| DEFAULT_MODEL.to_string());
    debug!("using model {}", model);

    let interactive = io::stdin().is_terminal() && io::stdout().is_terminal();
    if !interactive {
        debug!("not a terminal; skipping raw mode and the busy indicator");
    }

    let topic = cli.topic.map(|words| words.join(" "));

    let mut tutor = RemoteTutor::new(
        Client::new(api_key, model),
        SessionController::new(interactive),
    );

    let stdin = io::stdin();
    let mut flow = ExerciseFlow::new(stdin.lock(), io::stdout(), topic, cli.level);
    flow.run(&mut tutor).await?;

    process::exit(exit_codes::SUCCESS);
}
