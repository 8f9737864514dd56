use std::sync::Arc;

use abrowser::config::BrowserConfig;
use abrowser::extensions::ExtensionLoader;
use abrowser::navigation::{AddressResolver, Navigator};
use abrowser::page::{HeadlessPage, PageHost};
use abrowser::shell;
use tokio::io::BufReader;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing; stdout is reserved for state updates
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = BrowserConfig::from_env()?;

    eprintln!("ABrowser v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Home: {}", config.home);
    eprintln!("   Search: {}", config.search_endpoint);
    eprintln!("   Commands: back | forward | reload | ext <url> | quit");
    eprintln!("   Anything else is loaded as an address.\n");

    let page: Arc<dyn PageHost> = Arc::new(HeadlessPage::new());
    let loader = ExtensionLoader::from_config(&config)?;
    let resolver = AddressResolver::new(config.search_endpoint.clone());
    let (navigator, controller) = Navigator::spawn(page, resolver, loader);

    let printer = shell::spawn_state_printer(navigator.subscribe());

    for location in &config.extensions {
        match navigator.install_extension(location.clone()).await {
            Ok(ext) => tracing::info!(name = ext.name(), url = %location, "Startup extension installed"),
            Err(e) => tracing::warn!(url = %location, error = %e, "Startup extension skipped"),
        }
    }

    if let Err(e) = navigator.load_url(&config.home).await {
        tracing::warn!(home = %config.home, error = %e, "Failed to load home page");
    }

    shell::run(BufReader::new(tokio::io::stdin()), &navigator).await?;

    navigator.shutdown();
    controller.await?;
    printer.await?;

    Ok(())
}
