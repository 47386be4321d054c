use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use currencypal_agents::CurrencyAgent;
use currencypal_core::{parse_amount, CurrencyCode};
use currencypal_observability::{init_tracing, AppMetrics};
use currencypal_rates::{RateClient, RateClientConfig, RateSource, DEFAULT_RATES_URL};
use serde_json::json;

#[derive(Debug, Parser)]
#[command(name = "currencypal")]
#[command(about = "CurrencyPal currency conversion assistant")]
struct Cli {
    #[arg(long, env = "CURRENCYPAL_RATES_URL", default_value = DEFAULT_RATES_URL)]
    rates_url: String,

    #[arg(long, env = "CURRENCYPAL_RATES_TIMEOUT_SECONDS", default_value_t = 10)]
    timeout_seconds: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive chat; type 'exit' to quit.
    Chat,
    /// Answer a single message.
    Ask {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    Convert {
        amount: String,
        from: String,
        to: String,
    },
    /// Rates to NGN for the given codes, or the default set.
    Rates { codes: Vec<String> },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("currencypal_cli");
    let cli = Cli::parse();

    let agent = build_agent(&cli.rates_url, cli.timeout_seconds)?;

    match cli.command {
        Command::Chat => run_chat(agent).await?,
        Command::Ask { text } => {
            let reply = agent.process_message(&text.join(" ")).await;
            println!("{reply}");
        }
        Command::Convert { amount, from, to } => {
            let amount = parse_amount(&amount).context("invalid amount")?;
            let from = CurrencyCode::parse(&from).context("invalid source currency code")?;
            let to = CurrencyCode::parse(&to).context("invalid target currency code")?;

            match agent.rates().convert(&from, &to, amount).await {
                Ok(result) => println!("{}", serde_json::to_string_pretty(&result)?),
                Err(error) => println!("{}", serde_json::to_string_pretty(&error.to_body())?),
            }
        }
        Command::Rates { codes } => {
            let codes = codes
                .iter()
                .map(|code| {
                    CurrencyCode::parse(code)
                        .with_context(|| format!("invalid currency code: {code}"))
                })
                .collect::<Result<Vec<_>>>()?;
            let requested = if codes.is_empty() {
                None
            } else {
                Some(codes.as_slice())
            };

            match agent.rates().rates_to_base(requested).await {
                Ok(table) => {
                    let rates = table
                        .iter()
                        .map(|(code, entry)| {
                            json!({
                                "code": code,
                                "rate": entry.rate,
                                "formatted": entry.formatted,
                            })
                        })
                        .collect::<Vec<_>>();
                    println!("{}", serde_json::to_string_pretty(&rates)?);
                }
                Err(error) => println!("{}", serde_json::to_string_pretty(&error.to_body())?),
            }
        }
    }

    Ok(())
}

async fn run_chat(agent: CurrencyAgent<RateClient>) -> Result<()> {
    println!("CurrencyPal chat mode. type 'exit' to quit.");

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }

        let message = line.trim();
        if message.eq_ignore_ascii_case("exit") || message.eq_ignore_ascii_case("quit") {
            break;
        }

        if message.is_empty() {
            continue;
        }

        let reply = agent.process_message(message).await;
        println!("\n{reply}\n");
    }

    Ok(())
}

fn build_agent(rates_url: &str, timeout_seconds: u64) -> Result<CurrencyAgent<RateClient>> {
    if timeout_seconds == 0 {
        bail!("--timeout-seconds must be greater than zero");
    }

    let client = RateClient::new(RateClientConfig {
        base_url: rates_url.to_string(),
        timeout: Duration::from_secs(timeout_seconds),
    })
    .context("failed to build rates client")?;

    Ok(CurrencyAgent::new(Arc::new(client), AppMetrics::shared()))
}
