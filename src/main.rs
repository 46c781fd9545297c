use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};

use apib_coverage::config::{ConfigProvider, OptionOverrides, ServerlessConfig, ValidatorOptions};
use apib_coverage::format::{self, OutputFormat};
use apib_coverage::model::{DeclaredEndpoint, ValidationResult};
use apib_coverage::parse::{parser_for, ParserKind};
use apib_coverage::sink::ConsoleSink;
use apib_coverage::source::FsDocumentSource;

#[derive(Parser, Debug)]
#[command(
    name = "apib-coverage",
    version,
    about = "Check that every HTTP function is documented in an API Blueprint",
    long_about = "Check that every HTTP function declared in a serverless.yml is documented \
        in an API Blueprint.\n\n\
        Options are read from the custom.apibValidator section of serverless.yml, \
        APIB_VALIDATOR_* environment variables and the flags below, in that order.\n\n\
        Examples:\n  \
        apib-coverage validate\n  \
        apib-coverage validate --base-path /v1 --format markdown\n  \
        apib-coverage lint --blueprint docs/api.apib\n  \
        apib-coverage endpoints --parser drafter\n  \
        apib-coverage functions --config service/serverless.yml"
)]
struct Cli {
    #[arg(
        long,
        global = true,
        default_value = "json",
        help = "Output format",
        long_help = "Output format.\n  json     - JSON (default, best for programmatic use)\n  markdown - Human-readable markdown"
    )]
    format: OutputFormat,

    #[arg(
        long,
        short,
        global = true,
        default_value = "serverless.yml",
        help = "Deployment configuration file"
    )]
    config: PathBuf,

    #[arg(long, short, global = true, help = "API Blueprint file (overrides blueprintFile)")]
    blueprint: Option<PathBuf>,

    #[arg(long, global = true, help = "Prefix added to declared paths (overrides basePath)")]
    base_path: Option<String>,

    #[arg(long, global = true, help = "Parser: native, refract or drafter")]
    parser: Option<ParserKind>,

    #[arg(long, global = true, help = "Program run by the drafter parser")]
    drafter: Option<String>,

    #[arg(long, short, global = true, help = "Log debug output to stderr")]
    verbose: bool,

    #[arg(long, short, global = true, conflicts_with = "verbose", help = "Only log errors")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the blueprint documents every HTTP function (exit code 1 = not covered)
    #[command(long_about = "Check that the blueprint documents every HTTP function.\n\n\
        Reads the functions of the deployment configuration, parses the blueprint and\n\
        matches every http event against the documented resources and actions.\n\
        Exit code 0 = valid, 1 = invalid.")]
    Validate,

    /// Parse the blueprint and fail on any parser annotation
    Lint,

    /// List the endpoints the blueprint documents
    Endpoints,

    /// List the HTTP functions the deployment configuration declares
    Functions,
}

impl Cli {
    fn overrides(&self) -> OptionOverrides {
        OptionOverrides {
            blueprint_file: self.blueprint.clone(),
            base_path: self.base_path.clone(),
            parser: self.parser,
            drafter: self.drafter.clone(),
        }
    }

    fn load_config(&self) -> anyhow::Result<ServerlessConfig> {
        ServerlessConfig::load(&self.config, &self.overrides())
            .with_context(|| format!("failed to load {}", self.config.display()))
    }

    /// Options for commands that only need the blueprint; the deployment
    /// configuration is optional for them.
    fn load_options(&self) -> anyhow::Result<ValidatorOptions> {
        if self.config.exists() {
            return Ok(self.load_config()?.options().clone());
        }
        tracing::debug!(config = %self.config.display(), "no deployment configuration, using defaults");
        Ok(ValidatorOptions::load(None, &self.overrides())?)
    }
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("APIB_COVERAGE_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.quiet, cli.verbose) {
        eprintln!("Error: {e:#}");
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Command::Validate => {
            let config = cli.load_config()?;
            let options = config.options();
            let parser = parser_for(options.parser, &options.drafter);
            tracing::debug!(
                parser = parser.name(),
                blueprint = %config.document_path().display(),
                "validating"
            );

            let mut sink = ConsoleSink::stdout(cli.format);
            let result =
                apib_coverage::run(&config, &FsDocumentSource, parser.as_ref(), &mut sink).await?;
            Ok(exit_code(&result))
        }

        Command::Lint => {
            let options = cli.load_options()?;
            let parser = parser_for(options.parser, &options.drafter);
            let result: ValidationResult = apib_coverage::check_document(
                &options.blueprint_file,
                &FsDocumentSource,
                parser.as_ref(),
            )
            .await
            .map(|_| ())
            .into();
            print_output(&cli.format, &result, format::lint)?;
            Ok(exit_code(&result))
        }

        Command::Endpoints => {
            let options = cli.load_options()?;
            let parser = parser_for(options.parser, &options.drafter);
            let result = apib_coverage::list_documented(
                &options.blueprint_file,
                &FsDocumentSource,
                parser.as_ref(),
            )
            .await?;
            print_output(&cli.format, &result, |r| format::endpoints(r))?;
            Ok(ExitCode::SUCCESS)
        }

        Command::Functions => {
            let config = cli.load_config()?;
            let declared: Vec<DeclaredEndpoint> =
                config.declared_endpoints().unwrap_or_default().to_vec();
            print_output(&cli.format, &declared, |d| format::functions(d))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn exit_code(result: &ValidationResult) -> ExitCode {
    if result.is_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

/// Print output in the requested format
fn print_output<T: serde::Serialize>(
    fmt: &OutputFormat,
    value: &T,
    markdown_fn: impl FnOnce(&T) -> String,
) -> anyhow::Result<()> {
    match fmt {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Markdown => print!("{}", markdown_fn(value)),
    }
    Ok(())
}
