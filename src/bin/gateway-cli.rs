use booking_gateway::auth::{Role, TokenKeys};
use booking_gateway::rpc::RpcClient;
use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{Map, Value};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Developer CLI for the booking API gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the gateway answers
    Ping,
    /// Mint a development token
    Token {
        username: String,
        #[arg(short, long, default_value = "tourist")]
        role: Role,
        #[arg(long, default_value_t = 3600)]
        ttl: u64,
        #[arg(short, long, default_value = "your_secret_key")]
        secret: String,
    },
    /// GET a gateway path, optionally with a bearer token
    Get {
        path: String,
        #[arg(short, long)]
        token: Option<String>,
    },
    /// Issue a raw RPC call straight to a backend
    Rpc {
        /// Backend address (host:port)
        addr: String,
        method: String,
        /// JSON object with the call parameters
        #[arg(default_value = "{}")]
        params: String,
        #[arg(long, default_value_t = 10_000)]
        timeout_ms: u64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Ping => {
            let res = client.get(format!("{}/ping", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::Token {
            username,
            role,
            ttl,
            secret,
        } => {
            let token = TokenKeys::new(secret.as_bytes(), 0).issue(&username, role, ttl)?;
            println!("{}", token);
        }
        Commands::Get { path, token } => {
            let mut headers = HeaderMap::new();
            if let Some(token) = token {
                headers.insert(
                    AUTHORIZATION,
                    HeaderValue::from_str(&format!("Bearer {}", token))?,
                );
            }
            let res = client
                .get(format!("{}{}", cli.url, path))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Rpc {
            addr,
            method,
            params,
            timeout_ms,
        } => {
            let params: Map<String, Value> = serde_json::from_str(&params)?;
            let rpc = RpcClient::new(addr).with_deadline(Duration::from_millis(timeout_ms));
            match rpc.call(&method, params).await {
                Ok(result) => println!("{}", serde_json::to_string_pretty(&result)?),
                Err(e) => eprintln!("Error: {}", e),
            }
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        eprintln!("Response: {}", text);
        return Ok(());
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
