use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use site_forms::{
    client::FormClient,
    config::get_configuration,
    domain::endpoint::Endpoint,
    domain::submission::{ContactForm, FormInput, FormKind, NewsletterForm},
    handler::FormHandler,
    page::PageContext,
    render::TerminalRenderer,
    store::{self, RecordStore},
    telemetry::get_subscriber,
};
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "site-forms", version, about = "Submit the site's newsletter and contact forms")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign up for the newsletter
    Newsletter {
        #[arg(long, default_value = "")]
        email: String,
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Send a message through the contact form
    Contact {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        subject: String,
        #[arg(long, default_value = "")]
        message: String,
        #[command(flatten)]
        target: TargetArgs,
    },
    /// List the records kept locally in demo mode
    Records { form: FormArg },
}

#[derive(Args)]
struct TargetArgs {
    /// Overrides the form's configured data endpoint
    #[arg(long)]
    endpoint: Option<String>,
    /// Page URL the form is submitted from, e.g. `https://example.org/?debug=1`
    #[arg(long)]
    page_url: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormArg {
    Newsletter,
    Contact,
}

impl From<FormArg> for FormKind {
    fn from(value: FormArg) -> Self {
        match value {
            FormArg::Newsletter => FormKind::Newsletter,
            FormArg::Contact => FormKind::Contact,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = get_configuration().expect("Failed to read configuration.");

    get_subscriber(&config.log_level, std::io::stderr).init();

    let record_store = store::from_settings(&config.storage)
        .await
        .context("Could not open the record store")?;

    let (input, target) = match cli.command {
        Command::Newsletter { email, target } => {
            (FormInput::Newsletter(NewsletterForm { email }), target)
        }
        Command::Contact {
            name,
            email,
            subject,
            message,
            target,
        } => (
            FormInput::Contact(ContactForm {
                name,
                email,
                subject,
                message,
            }),
            target,
        ),
        Command::Records { form } => {
            let kind = FormKind::from(form);
            let records = record_store
                .get(kind.storage_key())
                .await
                .with_context(|| format!("Could not read {kind} records"))?;
            println!(
                "{}",
                serde_json::to_string_pretty(&records).context("Could not render records")?
            );
            return Ok(ExitCode::SUCCESS);
        }
    };

    let settings = config.forms.get(input.kind());
    let endpoint = match target.endpoint {
        Some(endpoint) => Endpoint::resolve(Some(endpoint.as_str()), settings.action.as_deref()),
        None => settings.endpoint(),
    };
    let page = target
        .page_url
        .or(config.page_url)
        .map(|url| PageContext::from_url(&url))
        .unwrap_or_default();

    let client = FormClient::new(config.client.timeout()).context("Could not build HTTP client")?;
    let handler = FormHandler::new(client, record_store);

    tracing::info!(kind = %input.kind(), ?endpoint, "submitting form");
    let report = handler
        .submit(input, &endpoint, &page, &TerminalRenderer)
        .await;

    Ok(if report.outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
