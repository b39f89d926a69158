use clap::{Parser, Subcommand};
use serde_json::{json, Map, Value};

#[derive(Parser)]
#[command(name = "ingest-cli")]
#[command(about = "Command-line client for the record-ingest service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:1880")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the service is reachable
    Health,
    /// Send a record
    Send {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        nome: String,
        #[arg(long)]
        valor: f64,
        #[arg(long)]
        categoria: Option<String>,
        #[arg(long)]
        fornecedor: Option<String>,
        #[arg(long)]
        estoque: Option<i64>,
        #[arg(long)]
        descricao: Option<String>,
    },
    /// Send a raw JSON record (the object placed under `data`)
    SendJson {
        json: String,
    },
    /// List every record, newest first
    List,
    /// Fetch one record by id
    Get { id: i64 },
    /// List records of a category with their total value
    Category { categoria: String },
    /// Most recent record of a category
    Latest { categoria: String },
    /// Records received within the configured recent window
    Recent,
    /// Records received between two RFC 3339 timestamps
    Period { inicio: String, fim: String },
    /// Aggregate statistics
    Stats,
    /// Case-insensitive search on record names
    Search { q: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Health => client.get(format!("{base}/health")).send().await?,
        Commands::Send {
            id,
            nome,
            valor,
            categoria,
            fornecedor,
            estoque,
            descricao,
        } => {
            let mut data = Map::new();
            data.insert("id".into(), json!(id));
            data.insert("nome".into(), json!(nome));
            data.insert("valor".into(), json!(valor));
            if let Some(categoria) = categoria {
                data.insert("categoria".into(), json!(categoria));
            }
            if let Some(fornecedor) = fornecedor {
                data.insert("fornecedor".into(), json!(fornecedor));
            }
            if let Some(estoque) = estoque {
                data.insert("estoque".into(), json!(estoque));
            }
            if let Some(descricao) = descricao {
                data.insert("descricao".into(), json!(descricao));
            }
            client
                .post(format!("{base}/api/receive"))
                .json(&json!({ "data": data }))
                .send()
                .await?
        }
        Commands::SendJson { json } => {
            let data: Value = serde_json::from_str(&json)?;
            client
                .post(format!("{base}/api/receive"))
                .json(&json!({ "data": data }))
                .send()
                .await?
        }
        Commands::List => client.get(format!("{base}/api/consultar")).send().await?,
        Commands::Get { id } => {
            client
                .get(format!("{base}/api/consultar/{id}"))
                .send()
                .await?
        }
        Commands::Category { categoria } => {
            client
                .get(segments_url(base, &["api", "consultar", "categoria", categoria.as_str()])?)
                .send()
                .await?
        }
        Commands::Latest { categoria } => {
            client
                .get(segments_url(
                    base,
                    &["api", "consultar", "categoria", categoria.as_str(), "ultimo"],
                )?)
                .send()
                .await?
        }
        Commands::Recent => {
            client
                .get(format!("{base}/api/consultar/recentes"))
                .send()
                .await?
        }
        Commands::Period { inicio, fim } => {
            client
                .get(format!("{base}/api/consultar/periodo"))
                .query(&[("inicio", inicio), ("fim", fim)])
                .send()
                .await?
        }
        Commands::Stats => client.get(format!("{base}/api/estatisticas")).send().await?,
        Commands::Search { q } => {
            client
                .get(format!("{base}/api/buscar"))
                .query(&[("q", q)])
                .send()
                .await?
        }
    };

    print_response(res).await
}

/// `base` with `segments` appended, each percent-encoded as one path segment.
fn segments_url(base: &str, segments: &[&str]) -> Result<reqwest::Url, Box<dyn std::error::Error>> {
    let mut url = reqwest::Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| format!("{base} cannot carry a path"))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    if !status.is_success() {
        eprintln!("Error: service returned status {}", status);
        if !text.is_empty() {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
