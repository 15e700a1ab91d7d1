use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::AsyncReadExt;

use crate::api::{analyze_request_from_json, run_analysis, run_http_server, today};
use crate::config::{EngineArgs, ServerConfig};
use crate::error::{FieldIssue, RequestError};

#[derive(Parser, Debug)]
#[command(
    name = "payoff",
    version,
    about = "Debt payoff simulator: minimum-only baseline vs snowball vs avalanche"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the JSON API over HTTP
    Serve(ServerConfig),
    /// Analyze a request body read from a file and print the result as JSON
    Analyze(AnalyzeArgs),
}

#[derive(clap::Args, Debug)]
pub struct AnalyzeArgs {
    /// Path to a JSON request body, or `-` for stdin
    #[arg(long, short)]
    pub input: PathBuf,

    /// Monthly extra payment; overrides `extraPayment` in the input
    #[arg(long, allow_negative_numbers = true)]
    pub extra_payment: Option<f64>,

    /// Include the month-by-month schedule for every strategy
    #[arg(long)]
    pub include_schedule: bool,

    #[arg(long)]
    pub pretty: bool,

    #[command(flatten)]
    pub engine: EngineArgs,
}

pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Serve(config) => run_http_server(&config)
            .await
            .context("HTTP server failed"),
        Command::Analyze(args) => {
            let body = read_input(&args.input).await?;
            let output = analyze_to_json(&body, &args)?;
            println!("{output}");
            Ok(())
        }
    }
}

async fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut body = String::new();
        tokio::io::stdin()
            .read_to_string(&mut body)
            .await
            .context("failed to read request from stdin")?;
        return Ok(body);
    }
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))
}

fn analyze_to_json(body: &str, args: &AnalyzeArgs) -> Result<String> {
    let mut request = analyze_request_from_json(body, today())?;
    if let Some(extra) = args.extra_payment {
        if !extra.is_finite() || extra < 0.0 {
            let issue = FieldIssue::new("--extra-payment", "must be a finite number >= 0");
            return Err(RequestError::Invalid(vec![issue]).into());
        }
        request.simulation.extra_payment = extra;
    }
    request.simulation.include_schedule |= args.include_schedule;

    let analysis = run_analysis(&request, &args.engine.engine_config());
    let output = if args.pretty {
        serde_json::to_string_pretty(&analysis)?
    } else {
        serde_json::to_string(&analysis)?
    };
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze_args(extra: Option<f64>) -> AnalyzeArgs {
        let mut argv: Vec<String> = ["payoff", "analyze", "-i", "-"]
            .into_iter()
            .map(String::from)
            .collect();
        if let Some(extra) = extra {
            argv.push("--extra-payment".to_string());
            argv.push(extra.to_string());
        }
        match Cli::try_parse_from(argv).expect("cli parses").command {
            Command::Analyze(args) => args,
            Command::Serve(_) => panic!("expected analyze"),
        }
    }

    #[test]
    fn serve_subcommand_parses_port() {
        let cli = Cli::try_parse_from(["payoff", "serve", "--port", "9100"]).expect("parses");
        match cli.command {
            Command::Serve(config) => assert_eq!(config.port, 9100),
            Command::Analyze(_) => panic!("expected serve"),
        }
    }

    #[test]
    fn extra_payment_flag_overrides_body() {
        let body = r#"{ "extraPayment": 0, "debts": [
            { "id": "A", "balance": 1000, "apr": 20, "minPayment": 50 },
            { "id": "B", "balance": 2000, "apr": 10, "minPayment": 60 }
        ] }"#;
        let output = analyze_to_json(body, &analyze_args(Some(100.0))).expect("analysis runs");
        let value: serde_json::Value = serde_json::from_str(&output).expect("valid json");
        assert_eq!(value["extraPayment"], serde_json::json!(100.0));
        assert!(value["savings"]["months_saved_avalanche"].as_u64().unwrap_or(0) > 0);
    }

    #[test]
    fn negative_extra_payment_flag_is_rejected() {
        let body = r#"{ "debts": [] }"#;
        let err = analyze_to_json(body, &analyze_args(Some(-5.0))).expect_err("must reject");
        assert!(err.to_string().contains("--extra-payment"));
    }
}
