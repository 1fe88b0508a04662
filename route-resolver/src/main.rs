use route_resolver::config::{ResolverSettings, build_resolver, load_settings};
use route_resolver::domain::RouteRecord;
use route_resolver::resolver::Resolution;

/// Default settings file path.
const DEFAULT_SETTINGS_PATH: &str = "config/settings.json";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let callsigns: Vec<String> = std::env::args().skip(1).collect();
    if callsigns.is_empty() {
        eprintln!("Usage: route-resolver FLIGHT [FLIGHT ...]");
        eprintln!();
        eprintln!("Resolves each flight number (e.g. EK215, UAE215) to its route,");
        eprintln!("growing the local route database as new routes are discovered.");
        std::process::exit(2);
    }

    // Settings are optional: without them the resolver still serves
    // anything already in the local database.
    let settings_path = std::env::var("ROUTE_RESOLVER_CONFIG")
        .unwrap_or_else(|_| DEFAULT_SETTINGS_PATH.to_string());

    let settings = if std::path::Path::new(&settings_path).exists() {
        load_settings(&settings_path).expect("Failed to load settings")
    } else {
        eprintln!("Warning: {settings_path} not found. Using defaults (no API keys).");
        ResolverSettings::default()
    };

    let resolver = build_resolver(&settings).expect("Failed to build route resolver");
    println!(
        "Loaded {} routes from {}",
        resolver.store_len().await,
        settings.database_path.display()
    );

    for callsign in &callsigns {
        match resolver.resolve(callsign).await {
            Resolution::FromStore(record) => print_route(callsign, &record, "database"),
            Resolution::FromCache(record) => print_route(callsign, &record, "cache"),
            Resolution::FromProvider(record) => print_route(callsign, &record, "provider"),
            Resolution::NotFound => println!("{callsign}: no route found"),
        }
    }
}

fn print_route(callsign: &str, record: &RouteRecord, source: &str) {
    let mut line = format!("{callsign}: {} -> {}", record.origin, record.destination);

    if !record.origin_city.is_empty() || !record.destination_city.is_empty() {
        line.push_str(&format!(
            " ({} -> {})",
            place(&record.origin_city, &record.origin_country),
            place(&record.destination_city, &record.destination_country)
        ));
    }

    println!("{line} [{source}]");
}

fn place(city: &str, country: &str) -> String {
    if country.is_empty() {
        city.to_string()
    } else if city.is_empty() {
        country.to_string()
    } else {
        format!("{city}, {country}")
    }
}
