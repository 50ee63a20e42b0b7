use clap::{Parser, Subcommand};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde_json::{Value, json};

#[derive(Parser)]
#[command(name = "route-cli")]
#[command(about = "Control-plane CLI for the mutable router", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:8001")]
    url: String,

    /// Bearer token, if the control plane requires one.
    #[arg(short, long, env = "ROUTER_API_KEY")]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check router status
    Status,
    /// List the route table
    List,
    /// Register a route (`/foo/` for a prefix route, `/bar` for an exact route)
    Add {
        pattern: String,
        destination: String,
    },
    /// Remove a route
    Remove {
        pattern: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let routes_url = format!("{}/admin/routes", cli.url);

    let mut headers = HeaderMap::new();
    if let Some(key) = &cli.key {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", key))?,
        );
    }

    let res = match cli.command {
        Commands::Status => {
            client.get(format!("{}/admin/status", cli.url))
                .headers(headers)
                .send()
                .await?
        }
        Commands::List => {
            client.get(&routes_url)
                .headers(headers)
                .send()
                .await?
        }
        Commands::Add { pattern, destination } => {
            client.post(&routes_url)
                .headers(headers)
                .json(&json!({ "pattern": pattern, "destination": destination }))
                .send()
                .await?
        }
        Commands::Remove { pattern } => {
            client.delete(&routes_url)
                .headers(headers)
                .query(&[("pattern", pattern)])
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    let rendered = match serde_json::from_str::<Value>(&text) {
        Ok(json) => serde_json::to_string_pretty(&json)?,
        Err(_) => text,
    };

    if status.is_success() {
        println!("{}", rendered);
        Ok(())
    } else {
        eprintln!("Error: control plane returned status {}", status);
        eprintln!("{}", rendered);
        std::process::exit(1);
    }
}
