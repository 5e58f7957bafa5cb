use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "router-cli")]
#[command(about = "Inspect a running view-router dev server", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:5173")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the active route table
    Routes,
    /// Resolve a path as a given device would
    Resolve {
        path: String,

        #[arg(short = 'a', long)]
        user_agent: Option<String>,

        /// Viewport width sent as a client hint
        #[arg(short, long)]
        width: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Routes => {
            let res = client.get(format!("{}/__routes", base)).send().await?;
            let status = res.status();
            if !status.is_success() {
                eprintln!("Error: dev server returned status {}", status);
                return Ok(());
            }
            let json: Value = res.json().await?;
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        Commands::Resolve { path, user_agent, width } => {
            let mut headers = HeaderMap::new();
            if let Some(ua) = user_agent {
                headers.insert(USER_AGENT, HeaderValue::from_str(&ua)?);
            }
            if let Some(width) = width {
                headers.insert("sec-ch-viewport-width", HeaderValue::from(width));
            }

            let path = if path.starts_with('/') { path } else { format!("/{}", path) };
            let res = client.get(format!("{}{}", base, path)).headers(headers).send().await?;

            println!("status: {}", res.status());
            for name in ["x-route-name", "x-device-class"] {
                let value = res
                    .headers()
                    .get(name)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");
                println!("{}: {}", name, value);
            }
        }
    }

    Ok(())
}
