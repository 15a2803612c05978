pub mod types;
pub mod utils;
pub mod config;
pub mod filter;
pub mod aggregator;
pub mod payout;
pub mod store;
pub mod debounce;
pub mod fetcher;
pub mod chart;
pub mod export;
pub mod session;
pub mod context;
pub mod auth;
pub mod dashboard;
pub mod console;

pub use types::*;
pub use config::AppConfig;
pub use fetcher::NewsApiFetcher;
pub use store::{ArticleStore, FetchTicket, StalePolicy};
pub use debounce::{schedule, QueryDebouncer, ScheduledTask};
pub use export::{ExportOutcome, ReportExporter};
pub use session::FileStore;
pub use context::{AppContext, ThemeMode};
pub use auth::FirebaseIdentity;
pub use dashboard::{ArticleCard, Dashboard};
