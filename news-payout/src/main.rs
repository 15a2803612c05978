use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use news_payout::console::{render_dashboard, run_console};
use news_payout::payout::{format_total, load_rate, total, update_rate};
use news_payout::session::load_user;
use news_payout::utils::today;
use news_payout::{
    AppConfig, AppContext, ChartKind, Dashboard, FileStore, FirebaseIdentity, IdentityProvider, IdpProvider,
    NewsApiFetcher, NewsSource,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "news-payout", version, about = "News search dashboard with per-article payout reports")]
struct Cli {
    /// Config file (defaults to $NEWS_PAYOUT_CONFIG or ./news-payout.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account and sign in
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign in with a token from a federated provider
    LoginWith {
        #[arg(long, value_enum)]
        provider: ProviderArg,
        #[arg(long)]
        id_token: String,
    },
    /// Forget the signed-in user
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Show or set the payout per article
    Rate { value: Option<String> },
    /// Fetch once, print the dashboard and optionally export
    Report {
        #[arg(long)]
        query: Option<String>,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
        #[arg(long, default_value = "")]
        author: String,
        #[arg(long, default_value = "line")]
        chart: ChartKind,
        #[arg(long)]
        csv: bool,
        #[arg(long)]
        pdf: bool,
    },
    /// Interactive dashboard reading commands from stdin
    Dashboard,
}

#[derive(Clone, Copy, ValueEnum)]
enum ProviderArg {
    Google,
    Github,
    Facebook,
}

impl From<ProviderArg> for IdpProvider {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::Google => IdpProvider::Google,
            ProviderArg::Github => IdpProvider::Github,
            ProviderArg::Facebook => IdpProvider::Facebook,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_store(config: &AppConfig) -> anyhow::Result<FileStore> {
    let store = match &config.storage.session_path {
        Some(path) => FileStore::open(path.clone()),
        None => FileStore::open_default(),
    }
    .context("opening session store")?;
    info!("Session store: {}", store.path().display());
    Ok(store)
}

fn news_fetcher(config: &AppConfig) -> anyhow::Result<NewsApiFetcher> {
    if config.news_api.api_key.is_empty() {
        warn!("No news API key configured (set NEWS_API_KEY); requests will be rejected");
    }
    NewsApiFetcher::new(config.news_api.clone()).context("building HTTP client")
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = AppConfig::load(cli.config.as_deref())?;
    let mut store = open_store(&config)?;

    match cli.command {
        Commands::Login { email, password } => {
            let provider = FirebaseIdentity::new(config.identity.clone())?;
            let outcome = provider.sign_in(&email, &password).await;
            finish_sign_in(store, outcome, "Login successful!")?;
        }
        Commands::Signup { email, password } => {
            let provider = FirebaseIdentity::new(config.identity.clone())?;
            let outcome = provider.sign_up(&email, &password).await;
            finish_sign_in(store, outcome, "Signup successful!")?;
        }
        Commands::LoginWith { provider, id_token } => {
            let identity = FirebaseIdentity::new(config.identity.clone())?;
            let outcome = identity.sign_in_with_popup(provider.into(), &id_token).await;
            finish_sign_in(store, outcome, "Provider login successful!")?;
        }
        Commands::Logout => {
            let mut ctx = AppContext::new(Box::new(store));
            ctx.logout()?;
            println!("Signed out");
        }
        Commands::Whoami => match load_user(&store) {
            Some(user) => println!(
                "{} ({}, via {})",
                user.email.as_deref().unwrap_or("no email"),
                user.uid,
                user.provider_id
            ),
            None => println!("Not signed in"),
        },
        Commands::Rate { value } => {
            let rate = match value {
                Some(value) => update_rate(&mut store, &value)?,
                None => load_rate(&store),
            };
            println!("Payout per article: ${}", rate);
        }
        Commands::Report {
            query,
            from,
            to,
            author,
            chart,
            csv,
            pdf,
        } => {
            let mut dashboard = Dashboard::new(AppContext::new(Box::new(store)), &config.dashboard)?;
            if let Some(query) = query {
                dashboard.set_query(query);
            }
            let today = today();
            dashboard.set_from(from, today)?;
            dashboard.set_to(to, today)?;

            let fetcher = news_fetcher(&config)?;
            let ticket = dashboard.begin_fetch(dashboard.params().clone());
            let articles = fetcher.fetch(&ticket.params).await;
            dashboard.complete_fetch(ticket, articles);
            dashboard.set_author_filter(author);
            dashboard.select_chart(chart);

            print!("{}", render_dashboard(&dashboard));
            if csv {
                let outcome = dashboard.export_csv()?;
                println!("Wrote {} rows to {}", outcome.rows, outcome.path.display());
            }
            if pdf {
                let outcome = dashboard.export_pdf()?;
                println!("Wrote {} rows to {}", outcome.rows, outcome.path.display());
            }
            info!(
                "Report: {} articles at ${} = ${}",
                dashboard.filtered().len(),
                dashboard.rate(),
                format_total(total(dashboard.filtered().len(), dashboard.rate()))
            );
        }
        Commands::Dashboard => {
            let dashboard = Dashboard::new(AppContext::new(Box::new(store)), &config.dashboard)
                .context("the dashboard needs a signed-in user; run `news-payout login` first")?;
            let source: Arc<dyn NewsSource> = Arc::new(news_fetcher(&config)?);
            info!("Starting dashboard with {}", source.source_name());

            let input = tokio::io::BufReader::new(tokio::io::stdin());
            run_console(
                dashboard,
                source,
                config.dashboard.debounce(),
                input,
                std::io::stdout(),
            )
            .await?;
        }
    }

    Ok(())
}

fn finish_sign_in(
    store: FileStore,
    outcome: Result<news_payout::Identity, news_payout::AuthError>,
    success: &str,
) -> anyhow::Result<()> {
    match outcome {
        Ok(identity) => {
            let mut ctx = AppContext::new(Box::new(store));
            ctx.sign_in(identity)?;
            println!("{}", success);
            Ok(())
        }
        Err(e) => {
            // Shown as-is; the caller can correct the input and try again.
            error!("Authentication failed: {}", e);
            eprintln!("{}", e.message);
            std::process::exit(1);
        }
    }
}
