//! Env-driven CLI runner: one search per invocation, printed to stdout.
//!
//! Usage: `vitrine <kabum|pichau|profile-setup>`. Everything else comes from
//! the environment (optionally via `.env.dev` / `.env.prd`), mirroring how
//! the tool is driven from cron jobs and wrapper scripts.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use vitrine::browser::BrowserSession;
use vitrine::sites::pichau::{BASE_URL as PICHAU_BASE_URL, DEFAULT_PROFILE_DIR};
use vitrine::text::safe_truncate_chars;
use vitrine::{ClientConfig, KabumClient, PichauClient, ProductItem};

fn env_str(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_bool(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(v) => matches!(
            v.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "sim" | "y"
        ),
        Err(_) => default,
    }
}

fn env_u32(name: &str, default: u32) -> u32 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Load `.env.<ENV>` when present, falling back to `.env`.
fn load_environment() -> String {
    let env = std::env::var("ENV")
        .map(|v| v.trim().to_lowercase())
        .unwrap_or_default();
    let env = if env == "prd" { "prd" } else { "dev" }.to_string();

    for candidate in [format!(".env.{env}"), ".env".to_string()] {
        let path = Path::new(&candidate);
        if path.exists() {
            if let Err(e) = dotenvy::from_path_override(path) {
                eprintln!("failed to load {candidate}: {e}");
            }
            break;
        }
    }
    env
}

fn init_tracing() {
    let default_level = if env_bool("VERBOSE", false) {
        "debug".to_string()
    } else {
        env_str("LOG_LEVEL", "info").to_lowercase()
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn config_from_env(site: &str) -> Result<ClientConfig> {
    let mut builder = ClientConfig::builder()
        .headless(env_bool("HEADLESS", site == "kabum"))
        .debug_enabled(env_bool("DEBUG_ENABLED", true))
        .debug_dir(env_str("DEBUG_DIR", "logs/debug"))
        .zero_streak_stop(env_u32("ZERO_STREAK_STOP", 2))
        .retry_if_empty(env_u32("RETRY_IF_EMPTY", 1));

    builder = match site {
        "pichau" => builder
            .page_size(env_u32("PICHAU_PAGE_SIZE", 36))
            .stealth(env_bool("PICHAU_STEALTH", true))
            .profile_dir(env_str("PICHAU_PROFILE_DIR", DEFAULT_PROFILE_DIR)),
        _ => builder.page_size(env_u32("KABUM_PAGE_SIZE", 100)),
    };

    let user_agent = env_str("USER_AGENT", "");
    if !user_agent.is_empty() {
        builder = builder.user_agent(user_agent);
    }
    let chrome = env_str("CHROME", "");
    if !chrome.is_empty() {
        builder = builder.chrome_executable(chrome);
    }

    builder.build()
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_name = load_environment();
    init_tracing();

    let site = std::env::args().nth(1).unwrap_or_else(|| "kabum".to_string());
    info!(env = %env_name, site = %site, "vitrine starting");

    match site.as_str() {
        "kabum" | "pichau" => run_search(&site).await,
        "profile-setup" => profile_setup().await,
        _ => {
            eprintln!("usage: vitrine <kabum|pichau|profile-setup>");
            std::process::exit(2);
        }
    }
}

async fn run_search(site: &str) -> Result<()> {
    let query = env_str("QUERY", "controle playstation 5");
    let limit = env_usize("LIMIT", 10);
    let max_pages = env_u32("MAX_PAGES", 3);
    let config = config_from_env(site)?;

    let result = match site {
        "pichau" => PichauClient::new(config).search(&query, limit, max_pages).await,
        _ => KabumClient::new(config).search(&query, limit, max_pages).await,
    };

    let items = match result {
        Ok(items) => items,
        Err(e) => {
            error!(error = %e, "search failed");
            Vec::new()
        }
    };

    if env_str("OUTPUT", "text") == "json" {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    print_listing(site, &query, &items);
    Ok(())
}

fn print_listing(site: &str, query: &str, items: &[ProductItem]) {
    println!();
    println!("================ RESULTADOS ================");
    println!();
    println!("Site: {}", site.to_uppercase());
    println!("Busca: {query}");
    println!("Encontrados: {}", items.len());
    println!();
    for (idx, item) in items.iter().enumerate() {
        let price = item
            .price
            .map(|v| format!("R$ {v:.2}"))
            .unwrap_or_else(|| "N/A".to_string());
        println!(
            "{:02}. [{:>12}] (p{}) {:<60} | {}",
            idx + 1,
            price,
            item.page,
            safe_truncate_chars(&item.title, 60),
            item.url,
        );
    }
}

/// Open a headed browser on the persistent profile so the operator can pass
/// any human checks once; later `pichau` runs reuse the saved identity.
async fn profile_setup() -> Result<()> {
    let profile_dir = PathBuf::from(env_str("PICHAU_PROFILE_DIR", DEFAULT_PROFILE_DIR));
    std::fs::create_dir_all(&profile_dir)?;
    println!("Criando perfil persistente em: {}", profile_dir.display());

    let config = ClientConfig::builder()
        .headless(false)
        .profile_dir(&profile_dir)
        .build()?;
    let mut session = BrowserSession::launch_persistent(&config, &profile_dir).await?;

    let page = session.new_page().await?;
    let url = format!("{PICHAU_BASE_URL}/search?q=controle%20ps5");
    if let Err(e) = page.goto(url.as_str()).await {
        warn!(error = %e, "initial navigation failed, navigate manually in the window");
    }

    println!();
    println!("1. Resolva qualquer desafio exibido na janela do navegador.");
    println!("2. Navegue ate ver produtos na tela.");
    println!("3. Volte aqui e pressione ENTER para gravar o perfil e sair.");
    tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        let _ = std::io::stdin().read_line(&mut line);
    })
    .await?;

    session.close().await;
    println!("Perfil salvo em: {}", profile_dir.display());
    Ok(())
}
