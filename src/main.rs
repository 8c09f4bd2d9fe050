//! example-service
//!
//! Loads a configuration profile, initializes logging, and issues one
//! outbound call through the shared HTTP client. The response body is
//! written to stdout.
//!
//! ```text
//! example-service --profile example get https://httpbin.org/get -q name=ada
//! example-service post-json https://httpbin.org/post --data '{"id":7}'
//! example-service post-multipart https://httpbin.org/post --file doc=./report.pdf --field kind=report
//! ```

use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, CommandFactory, Parser, Subcommand};
use serde_json::Value;

use example_service::client::{Field, HttpClient, NamedFile, PartSource};
use example_service::config::{load_profile, ServiceConfig};
use example_service::observability::{init_logging, Logger, TracingLogger};

#[derive(Parser)]
#[command(name = "example-service")]
#[command(about = "Service scaffold with a generic outbound HTTP client", long_about = None)]
#[command(disable_version_flag = true)]
struct Cli {
    /// Show build information and exit
    #[arg(short = 'v', long = "version")]
    show_version: bool,

    /// Environment profile, loaded from <config-dir>/<profile>.toml
    #[arg(long, default_value = "example")]
    profile: String,

    /// Directory holding profile files
    #[arg(long, default_value = "config")]
    config_dir: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct RequestArgs {
    /// Target URL
    url: String,

    /// Extra header as `name: value` (repeatable)
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    headers: Vec<(String, String)>,
}

impl RequestArgs {
    /// Configured default headers, overridden by command-line headers.
    fn header_map(&self, config: &ServiceConfig) -> HashMap<String, String> {
        let mut headers: HashMap<String, String> = config
            .client
            .headers
            .iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value.clone()))
            .collect();
        for (name, value) in &self.headers {
            headers.insert(name.to_ascii_lowercase(), value.clone());
        }
        headers
    }
}

#[derive(Subcommand)]
enum Commands {
    /// GET with query parameters
    Get {
        #[command(flatten)]
        request: RequestArgs,

        /// Query parameter as `key=value` (repeatable)
        #[arg(short = 'q', long = "query", value_parser = parse_key_value)]
        query: Vec<(String, String)>,
    },
    /// POST a JSON document
    PostJson {
        #[command(flatten)]
        request: RequestArgs,

        /// JSON body
        #[arg(long)]
        data: String,
    },
    /// POST a URL-encoded form
    PostForm {
        #[command(flatten)]
        request: RequestArgs,

        /// Form field as `key=value` (repeatable)
        #[arg(short = 'f', long = "field", value_parser = parse_key_value)]
        fields: Vec<(String, String)>,
    },
    /// POST a multipart form of files and fields
    PostMultipart {
        #[command(flatten)]
        request: RequestArgs,

        /// File part as `name=path` (repeatable)
        #[arg(long = "file", value_parser = parse_key_value)]
        files: Vec<(String, String)>,

        /// Field part as `name=value` (repeatable)
        #[arg(long = "field", value_parser = parse_key_value)]
        fields: Vec<(String, String)>,
    },
    /// POST a file's raw bytes
    PostBinary {
        #[command(flatten)]
        request: RequestArgs,

        /// File to send
        #[arg(long)]
        file: PathBuf,
    },
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{}'", s)),
    }
}

fn parse_header(s: &str) -> Result<(String, String), String> {
    match s.split_once(':') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected 'name: value', got '{}'", s)),
    }
}

fn build_info() -> String {
    format!(
        "{}: {}\t{}",
        option_env!("EXAMPLE_BRANCH").unwrap_or("unknown"),
        option_env!("EXAMPLE_COMMIT").unwrap_or("unknown"),
        option_env!("EXAMPLE_BUILD_TIME").unwrap_or("unknown"),
    )
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    if cli.show_version {
        println!("{}", build_info());
        return Ok(());
    }
    eprintln!("using profile: {}", cli.profile);

    let config = match load_profile(&cli.config_dir, &cli.profile) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_logging(&config.log) {
        eprintln!("failed to initialize logging: {}", e);
        std::process::exit(1);
    }
    let logger: Arc<dyn Logger> = Arc::new(TracingLogger);

    tracing::info!(
        profile = %cli.profile,
        level = %config.log.level,
        "Configuration loaded"
    );

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let client = match HttpClient::new(logger.clone(), config.log.level) {
        Ok(client) => client,
        Err(e) => logger.fatal(format_args!("failed to initialize http client: {}", e)),
    };

    match run(&client, &config, command).await {
        Ok(body) => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&body)?;
            stdout.flush()?;
        }
        Err(e) => logger.fatal(format_args!("request failed: {}", e)),
    }

    Ok(())
}

async fn run(
    client: &HttpClient,
    config: &ServiceConfig,
    command: Commands,
) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let body = match command {
        Commands::Get { request, query } => {
            let params: HashMap<String, Value> = query
                .into_iter()
                .map(|(key, value)| (key, Value::String(value)))
                .collect();
            client
                .get(&request.url, &params, &request.header_map(config))
                .await?
        }
        Commands::PostJson { request, data } => {
            serde_json::from_str::<Value>(&data)?;
            client
                .post_json(&request.url, &request.header_map(config), data.into_bytes())
                .await?
        }
        Commands::PostForm { request, fields } => {
            let content: HashMap<String, String> = fields.into_iter().collect();
            client
                .post_form(&request.url, &request.header_map(config), &content)
                .await?
        }
        Commands::PostMultipart {
            request,
            files,
            fields,
        } => {
            let mut content: HashMap<String, Box<dyn PartSource>> = HashMap::new();
            for (name, path) in files {
                content.insert(name, Box::new(NamedFile::open(&path)?));
            }
            for (name, value) in fields {
                content.insert(name, Box::new(Field::text(value)));
            }
            client
                .post_multipart(&request.url, &request.header_map(config), content)
                .await?
        }
        Commands::PostBinary { request, file } => {
            let content = tokio::fs::read(&file).await?;
            client
                .post_binary(&request.url, &request.header_map(config), content)
                .await?
        }
    };
    Ok(body)
}
