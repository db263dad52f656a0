//! wxmap - weather map dashboard: HTTP API and command line queries.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use wxmap_core::Config;
use wxmap_server::ServerState;
use wxmap_weather::units::format_dual_temperature;
use wxmap_weather::{catalog, ChartMetric, ChartModel, Coordinates, Dashboard, DashboardView};

#[derive(Parser)]
#[command(
    name = "wxmap",
    version,
    about = "Weather map dashboard backed by Open-Meteo"
)]
struct Cli {
    /// Config file (defaults to <config dir>/wxmap/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API
    Serve {
        /// Address to bind, overriding the config file
        #[arg(long)]
        bind: Option<SocketAddr>,
    },

    /// Current conditions at a location
    Current(LocationArgs),

    /// Full dashboard card: conditions, elevation, air quality, rain
    Card(LocationArgs),

    /// Chart data for the current year and previous years
    Chart {
        #[command(flatten)]
        location: LocationArgs,

        /// Metric id (see `wxmap metrics`)
        #[arg(long)]
        metric: Option<String>,

        /// Number of previous years
        #[arg(long)]
        years: Option<u32>,
    },

    /// List chart metrics
    Metrics,
}

#[derive(Args)]
struct LocationArgs {
    /// Latitude in degrees (defaults to the configured map centre)
    #[arg(long, allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Longitude in degrees (defaults to the configured map centre)
    #[arg(long, allow_negative_numbers = true)]
    lon: Option<f64>,
}

impl LocationArgs {
    fn resolve(&self, config: &Config) -> Result<Coordinates> {
        let coords = Coordinates::new(
            self.lat.unwrap_or(config.map.default_lat),
            self.lon.unwrap_or(config.map.default_lon),
        )?;
        Ok(coords)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    wxmap_core::init()?;

    let cli = Cli::parse();
    let (config, _) = Config::load_validated(cli.config.as_deref())?;

    match cli.command {
        Command::Serve { bind } => serve(&config, bind).await,
        Command::Current(location) => current(&config, &location, cli.json).await,
        Command::Card(location) => card(&config, &location, cli.json).await,
        Command::Chart {
            location,
            metric,
            years,
        } => chart(&config, &location, metric.as_deref(), years, cli.json).await,
        Command::Metrics => metrics(cli.json),
    }
}

async fn serve(config: &Config, bind: Option<SocketAddr>) -> Result<()> {
    let addr = match bind {
        Some(addr) => addr,
        None => config
            .server
            .bind
            .parse()
            .with_context(|| format!("Invalid bind address '{}'", config.server.bind))?,
    };
    let state = ServerState::from_config(config)?;

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
        }
    };
    wxmap_server::serve(state, addr, shutdown).await?;
    Ok(())
}

async fn current(config: &Config, location: &LocationArgs, json: bool) -> Result<()> {
    let coords = location.resolve(config)?;
    let dashboard = Dashboard::from_config(config)?;
    let current = dashboard
        .provider()
        .fetch_current(coords)
        .await
        .context("Failed to fetch current conditions")?;

    if json {
        return print_json(&current);
    }

    println!("{}", coords);
    println!(
        "{}  {}",
        format_dual_temperature(current.temperature_c),
        current.condition().description()
    );
    println!("Wind {:.1} km/h", current.wind_speed_kmh);
    println!("Local time {}", current.time.format("%a %H:%M"));
    Ok(())
}

async fn card(config: &Config, location: &LocationArgs, json: bool) -> Result<()> {
    let coords = location.resolve(config)?;
    let dashboard = Dashboard::from_config(config)?;
    let view = dashboard.handle_position(coords).await;

    if json {
        return print_json(&view);
    }
    print_card(&view);
    Ok(())
}

async fn chart(
    config: &Config,
    location: &LocationArgs,
    metric: Option<&str>,
    years: Option<u32>,
    json: bool,
) -> Result<()> {
    let coords = location.resolve(config)?;
    let dashboard = Dashboard::from_config(config)?;
    let metric = match metric {
        Some(id) => id.parse::<ChartMetric>()?,
        None => dashboard.metric(),
    };
    let years = years.unwrap_or_else(|| dashboard.years_back());

    let chart = dashboard
        .chart(metric, coords, years, None)
        .await
        .with_context(|| format!("Failed to build {} chart", metric))?;

    if json {
        return print_json(&chart);
    }
    print_chart(&chart);
    Ok(())
}

fn metrics(json: bool) -> Result<()> {
    let catalog = catalog();
    if json {
        return print_json(&catalog);
    }
    for info in catalog {
        let resolution = if info.hourly { "hourly" } else { "daily" };
        println!("{:<14} {:<24} {}", info.id, info.label, resolution);
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_card(view: &DashboardView) {
    let card = &view.card;
    if let Some(place) = &card.place {
        println!("{}", place);
    }
    println!("{}", card.coordinates);
    match card.condition {
        Some(condition) => println!("{}  {}", card.temperature, condition),
        None => println!("{}", card.temperature),
    }
    println!("{}", card.wind);
    println!("{}", card.timestamp);
    println!("{}", card.elevation);
    println!("{}", card.aqi);
    println!("{}", card.rain);
}

fn print_chart(chart: &ChartModel) {
    println!("{} ({})", chart.title, chart.range_label);

    let header: Vec<String> = chart.datasets.iter().map(|d| format!("{:>8}", d.label)).collect();
    println!("{:<10} {}", "date", header.join(""));

    for (i, date) in chart.labels.iter().enumerate() {
        let cells: Vec<String> = chart
            .datasets
            .iter()
            .map(|d| match d.data.get(i).copied().flatten() {
                Some(v) => format!("{:>8.1}", v),
                None => format!("{:>8}", "-"),
            })
            .collect();
        let marker = if *date == chart.today.date { " <" } else { "" };
        println!("{} {}{}", date.format("%Y-%m-%d"), cells.join(""), marker);
    }
}
