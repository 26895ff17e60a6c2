use clap::Parser;
use reqwest::StatusCode;
use serde_json::{Map, Value};
use thiserror::Error;

use eti_router::calling::{encode_calling, CALLING_KEY};

#[derive(Parser)]
#[command(name = "eti-cli")]
#[command(about = "Send a remote call to an ETI router", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Method to invoke
    #[arg(short, long)]
    method: String,

    #[arg(short, long, default_value = "cli")]
    request_id: String,

    /// Token auth; mutually exclusive with product/operator ids
    #[arg(long, conflicts_with_all = ["product_id", "operator_id"])]
    token: Option<String>,

    #[arg(long, requires = "operator_id")]
    product_id: Option<String>,

    #[arg(long, requires = "product_id")]
    operator_id: Option<String>,

    /// Extra calling field, repeatable: --param key=value
    #[arg(short, long = "param", value_parser = parse_param)]
    params: Vec<(String, String)>,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("router returned status {status}: {body}")]
    Rejected { status: StatusCode, body: String },
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))
}

/// Params parse as JSON when they can (`n=3`, `flag=true`), otherwise stay strings.
fn param_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn build_calling(cli: &Cli) -> Map<String, Value> {
    let mut calling = Map::new();
    for (key, value) in &cli.params {
        calling.insert(key.clone(), param_value(value));
    }
    calling.insert("methodName".into(), Value::String(cli.method.clone()));
    calling.insert("requestID".into(), Value::String(cli.request_id.clone()));
    if let Some(token) = &cli.token {
        calling.insert("token".into(), Value::String(token.clone()));
    }
    if let (Some(product), Some(operator)) = (&cli.product_id, &cli.operator_id) {
        calling.insert("productID".into(), Value::String(product.clone()));
        calling.insert("operatorID".into(), Value::String(operator.clone()));
    }
    calling
}

async fn send(cli: &Cli) -> Result<Value, CliError> {
    let encoded = encode_calling(&build_calling(cli));

    let res = reqwest::Client::new()
        .post(&cli.url)
        .form(&[(CALLING_KEY, encoded.as_str())])
        .send()
        .await?;

    let status = res.status();
    let body = res.text().await?;
    if !status.is_success() {
        return Err(CliError::Rejected { status, body });
    }
    Ok(serde_json::from_str(&body).unwrap_or(Value::String(body)))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    match send(&cli).await {
        Ok(Value::String(text)) => println!("{}", text),
        Ok(json) => match serde_json::to_string_pretty(&json) {
            Ok(pretty) => println!("{}", pretty),
            Err(e) => {
                eprintln!("Error: {}", CliError::from(e));
                std::process::exit(1);
            }
        },
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
