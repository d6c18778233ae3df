use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};

use contact_guard::config::{load_config, GuardConfig};
use contact_guard::guard::{
    Clock, ContactForm, FileAttemptStore, FormCapture, GuardDecision, HttpRelayClient,
    SubmissionOrchestrator, SubmissionState, SystemClock, TracingAnalytics,
};
use contact_guard::observability::logging;

#[derive(Parser)]
#[command(name = "guard-cli")]
#[command(about = "Submit and inspect contact forms through the submission guard", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the persisted attempt counter
    #[arg(long)]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full guard pipeline and send the form to the relay
    Submit {
        #[command(flatten)]
        form: FormArgs,

        /// Relay endpoint, overriding the configured one
        #[arg(long)]
        relay_url: Option<String>,
    },
    /// Validate a form offline and print the decision
    Check {
        #[command(flatten)]
        form: FormArgs,
    },
    /// Print the attempt counter for this device
    Status,
}

#[derive(Args)]
struct FormArgs {
    #[arg(long, default_value = "")]
    name: String,

    #[arg(long, default_value = "")]
    email: String,

    #[arg(long)]
    phone: Option<String>,

    /// One of: landing, corporate, shop, bot, complex
    #[arg(long, default_value = "")]
    service: String,

    #[arg(long, default_value = "")]
    message: String,

    /// Value for the hidden decoy field
    #[arg(long)]
    honeypot: Option<String>,

    /// Seconds spent filling the form
    #[arg(long, default_value_t = 30)]
    fill_secs: u64,
}

impl FormArgs {
    fn into_form(self) -> (ContactForm, u64) {
        let form = ContactForm {
            name: self.name,
            email: self.email,
            phone: self.phone,
            service: self.service,
            message: self.message,
            honeypot: self.honeypot,
            email_confirm: None,
        };
        (form, self.fill_secs.saturating_mul(1000))
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GuardConfig::default(),
    };
    if let Some(dir) = &cli.state_dir {
        config.client.state_dir = dir.display().to_string();
    }
    logging::init(&config.observability);

    match cli.command {
        Commands::Submit { form, relay_url } => {
            if let Some(url) = relay_url {
                config.client.relay_url = url;
            }
            let (form, fill_ms) = form.into_form();
            let mut orchestrator = orchestrator(&config);
            orchestrator.set_rendered_at(SystemClock.now_ms().saturating_sub(fill_ms));

            let state = orchestrator.submit(form).await;
            print_state(&state);
            Ok(if state.clears_form() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Commands::Check { form } => {
            let (form, fill_ms) = form.into_form();
            let orchestrator = orchestrator(&config);
            let decision = orchestrator.validate(&FormCapture::new(form, fill_ms));
            print_decision(&decision);
            Ok(if decision.is_allowed() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Commands::Status => {
            let orchestrator = orchestrator(&config);
            let record = orchestrator.limiter().snapshot();
            let check = orchestrator.can_submit();
            println!("key:           {}", orchestrator.limiter().key());
            println!("attempts:      {}/{}", record.count, config.rate_limit.max_attempts);
            println!("window start:  {} ms", record.window_start);
            match check.retry_after_ms {
                Some(ms) if !check.allowed => println!("status:        blocked for {ms} ms"),
                _ => println!("status:        open"),
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn orchestrator(config: &GuardConfig) -> SubmissionOrchestrator {
    let store = Arc::new(FileAttemptStore::new(&config.client.state_dir));
    let relay = Arc::new(HttpRelayClient::new(config.client.relay_url.clone()));
    SubmissionOrchestrator::builder(config, store, relay)
        .analytics(Arc::new(TracingAnalytics))
        .build()
}

fn print_state(state: &SubmissionState) {
    if let Some(message) = state.user_message() {
        println!("{message}");
    }
    if let SubmissionState::Invalid { field_errors } = state {
        for (field, message) in field_errors.iter() {
            println!("  {field}: {message}");
        }
    }
}

fn print_decision(decision: &GuardDecision) {
    println!("decision: {}", decision.label());
    match decision {
        GuardDecision::Rejected { field_errors } => {
            for (field, message) in field_errors.iter() {
                println!("  {field}: {message}");
            }
        }
        GuardDecision::Suspicious { reason } => println!("  reason: {reason}"),
        GuardDecision::RateLimited { retry_after_ms } => {
            println!("  retry after: {retry_after_ms} ms")
        }
        GuardDecision::Allowed => {}
    }
}
