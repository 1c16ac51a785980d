pub mod ai;
pub mod config;
pub mod error;
pub mod format;
pub mod printout;
pub mod provider;
pub mod record;
pub mod report;
pub mod report_client;
pub mod state;
pub mod store;

// Re-export main types for convenience
pub use ai::{GeminiClient, OllamaClient, OpenAIClient};
pub use config::Config;
pub use error::ReportError;
pub use format::format_usd;
pub use provider::Provider;
pub use record::{sample_records, Category, NewSalesRecord, SaleStatus, SalesRecord, ValidationError};
pub use report::{AiReport, GenerationStatus};
pub use report_client::{Backend, ReportClient};
pub use state::{AppState, Completion, GenerationTicket, StartError};
pub use store::RecordStore;
