use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use yelp_client::{Params, YelpClient, endpoints};

#[derive(Debug, Parser)]
#[command(
    name = "yelp-cli",
    version,
    about = "Small async CLI for querying the Yelp Fusion API"
)]
struct Cli {
    /// Fusion API key sent as a bearer token.
    #[arg(long, env = "YELP_API_KEY")]
    api_key: Option<String>,

    /// Base URL for the API. Defaults to the production host.
    #[arg(long, env = "YELP_BASE_URL")]
    base_url: Option<String>,

    /// Per-request timeout in seconds. Omit to wait indefinitely.
    #[arg(long)]
    timeout_s: Option<u64>,

    /// Emit compact JSON instead of pretty-printed output.
    #[arg(long)]
    compact: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the supported API endpoints.
    Endpoints {
        /// Filter endpoints by substring match on name.
        #[arg(long)]
        filter: Option<String>,
    },
    /// Search businesses by term and location.
    Search(SearchArgs),
    /// Fetch one business by Yelp id.
    Business { id: String },
    /// Fetch review excerpts for a business.
    Reviews { id: String },
    /// Fetch one event by id.
    Event { id: String },
    /// Send a raw GET to an arbitrary API path.
    Query(QueryArgs),
}

#[derive(Debug, Args)]
struct SearchArgs {
    /// Search term, e.g. "ice cream".
    #[arg(long)]
    term: Option<String>,

    /// Location text, e.g. "austin, tx".
    #[arg(long)]
    location: Option<String>,

    #[arg(long)]
    latitude: Option<f64>,

    #[arg(long)]
    longitude: Option<f64>,

    /// Sort order: best_match, rating, review_count or distance.
    #[arg(long)]
    sort_by: Option<String>,

    #[arg(long)]
    limit: Option<u32>,

    /// Extra query parameter in form key=value. Repeat as needed.
    #[arg(long = "param", value_name = "KEY=VALUE")]
    param: Vec<String>,
}

#[derive(Debug, Args)]
struct QueryArgs {
    /// Request path (for example: v3/businesses/search).
    path: String,

    /// Query parameter in form key=value. Repeat as needed.
    #[arg(long = "param", value_name = "KEY=VALUE")]
    param: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // `endpoints` is metadata-only; it does not require credentials.
    if let Command::Endpoints { filter } = &cli.command {
        print_endpoints(filter.as_deref());
        return Ok(());
    }

    let api_key = cli
        .api_key
        .as_deref()
        .context("an API key is required (--api-key or YELP_API_KEY)")?;

    let mut client = YelpClient::new(api_key);
    if let Some(url) = &cli.base_url {
        client = client
            .with_base_url(url)
            .with_context(|| format!("failed to create client with base URL '{url}'"))?;
    }
    if let Some(seconds) = cli.timeout_s {
        client = client.with_timeout(std::time::Duration::from_secs(seconds));
    }

    let output = match &cli.command {
        Command::Endpoints { .. } => unreachable!("handled above"),
        Command::Search(args) => search(&client, args).await?,
        Command::Business { id } => client
            .business(id, &Params::new())
            .await
            .with_context(|| format!("business lookup failed for id '{id}'"))?,
        Command::Reviews { id } => client
            .reviews(id, &Params::new())
            .await
            .with_context(|| format!("reviews lookup failed for id '{id}'"))?,
        Command::Event { id } => client
            .event(id, &Params::new())
            .await
            .with_context(|| format!("event lookup failed for id '{id}'"))?,
        Command::Query(args) => {
            let params = parse_params(&args.param)?;
            client
                .query(&args.path, &params)
                .await
                .with_context(|| format!("request failed for path '{}'", args.path))?
        }
    };

    print_json(&output, cli.compact).context("failed to print JSON output")?;
    Ok(())
}

/// Prints the endpoint registry.
///
/// When `filter` is provided, only endpoint names containing that substring
/// are shown.
fn print_endpoints(filter: Option<&str>) {
    let filter = filter.map(str::to_ascii_lowercase);

    let listed: Vec<_> = endpoints()
        .iter()
        .filter(|endpoint| {
            filter
                .as_ref()
                .is_none_or(|needle| endpoint.name.to_ascii_lowercase().contains(needle))
        })
        .collect();

    let name_width = listed
        .iter()
        .fold(0usize, |max, endpoint| max.max(endpoint.name.len()));

    for endpoint in listed {
        println!("{:<name_width$}  {}", endpoint.name, endpoint.path_template);
    }
}

async fn search(client: &YelpClient, args: &SearchArgs) -> Result<Value> {
    let mut params = Params::new()
        .with_opt("term", args.term.as_deref())
        .with_opt("location", args.location.as_deref())
        .with_opt("latitude", args.latitude)
        .with_opt("longitude", args.longitude)
        .with_opt("sort_by", args.sort_by.as_deref())
        .with_opt("limit", args.limit);

    for (key, value) in parse_pairs(&args.param)? {
        params.insert(key, value);
    }

    client.search(&params).await.context("search failed")
}

fn parse_params(values: &[String]) -> Result<Params> {
    let mut params = Params::new();
    for (key, value) in parse_pairs(values)? {
        params.insert(key, value);
    }
    Ok(params)
}

/// Parses repeated `key=value` arguments into owned key/value pairs.
fn parse_pairs(values: &[String]) -> Result<Vec<(String, String)>> {
    let mut pairs = Vec::with_capacity(values.len());
    for item in values {
        let Some((key, value)) = item.split_once('=') else {
            bail!("invalid --param value '{item}': expected key=value");
        };
        if key.is_empty() {
            bail!("invalid --param value '{item}': empty key");
        }
        pairs.push((key.to_owned(), value.to_owned()));
    }
    Ok(pairs)
}

/// Prints a JSON value either compact or pretty-formatted.
fn print_json(value: &Value, compact: bool) -> Result<()> {
    if compact {
        println!(
            "{}",
            serde_json::to_string(value).context("failed to render JSON")?
        );
    } else {
        println!(
            "{}",
            serde_json::to_string_pretty(value).context("failed to render JSON")?
        );
    }
    Ok(())
}
