use base64::Engine;
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser, Subcommand};
use sns_extended::{
    AttributeValue, DEFAULT_SIZE_THRESHOLD, ExtendedConfig, ExtendedPublisher, MessageAttributes,
    Published,
};
use sns_extended_aws::{S3BlobStore, SnsTransport};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::io::AsyncReadExt;

#[derive(Parser, Debug)]
#[command(name = "sns-extended")]
#[command(about = "Publish to SNS, offloading oversized payloads to S3")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Publish one message read from --message, --message-file or stdin.
    Publish(PublishArgs),
}

#[derive(clap::Args, Debug)]
struct PublishArgs {
    #[arg(long, env = "SNS_EXTENDED_TOPIC_ARN")]
    topic_arn: String,
    #[arg(long, env = "SNS_EXTENDED_BUCKET")]
    bucket: String,
    /// Largest body, in bytes, published inline.
    #[arg(long, env = "SNS_EXTENDED_SIZE_THRESHOLD", default_value_t = DEFAULT_SIZE_THRESHOLD)]
    size_threshold: u64,
    /// Accepts true/false, 1/0, yes/no, on/off.
    #[arg(
        long,
        env = "SNS_EXTENDED_ALWAYS_THROUGH_S3",
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new()
    )]
    always_through_s3: bool,
    /// Endpoint override, e.g. LocalStack. Unset means the regional AWS endpoint.
    #[arg(long, env = "SNS_EXTENDED_S3_ENDPOINT")]
    s3_endpoint: Option<String>,
    #[arg(long, env = "SNS_EXTENDED_SNS_ENDPOINT")]
    sns_endpoint: Option<String>,
    #[arg(long, env = "SNS_EXTENDED_STORAGE_TIMEOUT_MS")]
    storage_timeout_ms: Option<u64>,
    #[arg(long, env = "SNS_EXTENDED_PUBLISH_TIMEOUT_MS")]
    publish_timeout_ms: Option<u64>,
    #[arg(long, conflicts_with = "message_file")]
    message: Option<String>,
    #[arg(long)]
    message_file: Option<PathBuf>,
    /// NAME=TYPE:VALUE with TYPE one of String, Number, Binary (base64), or
    /// NAME=VALUE for a String attribute. Repeatable.
    #[arg(long = "attribute", value_parser = parse_attribute)]
    attributes: Vec<(String, AttributeValue)>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Publish(args) => publish_command(args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(1)
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn publish_command(args: PublishArgs) -> Result<(), String> {
    let message = read_message(args.message.as_deref(), args.message_file.as_ref()).await?;
    let config = ExtendedConfig {
        size_threshold: args.size_threshold,
        bucket: args.bucket,
        always_through_s3: args.always_through_s3,
        storage_timeout_ms: args.storage_timeout_ms,
        publish_timeout_ms: args.publish_timeout_ms,
    };
    tracing::debug!(
        s3_endpoint = args.s3_endpoint.as_deref().unwrap_or("aws"),
        sns_endpoint = args.sns_endpoint.as_deref().unwrap_or("aws"),
        size_threshold = config.size_threshold,
        always_through_s3 = config.always_through_s3,
        "publisher configured"
    );
    let publisher = ExtendedPublisher::new(
        config,
        S3BlobStore::connect(args.s3_endpoint.as_deref()).await,
        SnsTransport::connect(args.sns_endpoint.as_deref()).await,
    )
    .map_err(|error| error.to_string())?;

    let attributes: MessageAttributes = args.attributes.into_iter().collect();
    let published = publisher
        .publish(&message, &args.topic_arn, attributes)
        .await
        .map_err(|error| error.to_string())?;

    println!("{}", summary_line(&published));
    Ok(())
}

async fn read_message(
    inline: Option<&str>,
    file: Option<&PathBuf>,
) -> Result<String, String> {
    if let Some(message) = inline {
        return Ok(message.to_string());
    }
    if let Some(path) = file {
        return tokio::fs::read_to_string(path)
            .await
            .map_err(|error| format!("read {}: {error}", path.display()));
    }
    let mut message = String::new();
    tokio::io::stdin()
        .read_to_string(&mut message)
        .await
        .map_err(|error| format!("read stdin: {error}"))?;
    Ok(message)
}

fn summary_line(published: &Published) -> String {
    let message_id = published.message_id().unwrap_or("-");
    match published.key() {
        Some(key) => format!("offloaded key={key} message_id={message_id}"),
        None => format!("inline message_id={message_id}"),
    }
}

fn parse_attribute(raw: &str) -> Result<(String, AttributeValue), String> {
    let (name, rest) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE or NAME=TYPE:VALUE, got '{raw}'"))?;
    if name.trim().is_empty() {
        return Err(format!("attribute name must not be empty in '{raw}'"));
    }

    let typed = rest
        .split_once(':')
        .filter(|(data_type, _)| is_data_type(data_type));
    let value = match typed {
        None => AttributeValue::string(rest),
        Some((data_type, value)) if data_type.starts_with("Binary") => {
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(value)
                .map_err(|error| format!("attribute '{name}' is not valid base64: {error}"))?;
            AttributeValue {
                data_type: data_type.to_string(),
                string_value: None,
                binary_value: Some(bytes),
            }
        }
        Some((data_type, value)) if data_type.starts_with("Number") => {
            value
                .parse::<f64>()
                .map_err(|_| format!("attribute '{name}' is not a number: '{value}'"))?;
            AttributeValue::with_data_type(data_type, value)
        }
        Some((data_type, value)) => AttributeValue::with_data_type(data_type, value),
    };
    Ok((name.to_string(), value))
}

fn is_data_type(candidate: &str) -> bool {
    ["String", "Number", "Binary"].iter().any(|base| {
        candidate == *base
            || candidate
                .strip_prefix(base)
                .is_some_and(|suffix| suffix.len() > 1 && suffix.starts_with('.'))
    })
}
