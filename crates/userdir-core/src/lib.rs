//! userdir Core Library
//!
//! This crate provides the client-side data pipeline of userdir, a console
//! for a user directory served by a REST API.
//!
//! # Architecture
//!
//! - **Transport**: one JSON request with per-attempt timeout, linear-backoff
//!   retry and error classification
//! - **Store**: canonical and working copies of the collection plus the
//!   derived view
//! - **Query/Pager/Validator**: pure transforms over the store's records
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let mut store = UserStore::from_config(&config)?;
//! store.load_all().await?;
//!
//! // Narrow and page the view
//! store.apply_search("doe");
//! let mut pager = Pager::from_config(&config.pagination);
//! pager.update_data(store.filtered_view().to_vec());
//! ```
//!
//! # Modules
//!
//! - `store`: Record store (main entry point)
//! - `api`: Typed operations on the users endpoints
//! - `transport`: HTTP handler seam, retry combinator, error taxonomy
//! - `query`: Search, filters and sorting
//! - `pager`: Page slicing and navigation window
//! - `validation`: Form rules and uniqueness checks
//! - `models`: Wire records and the editable form
//! - `config`: Application configuration

pub mod api;
pub mod config;
pub mod models;
pub mod pager;
pub mod query;
pub mod store;
pub mod transport;
pub mod validation;

pub use api::UsersApi;
pub use config::{ApiConfig, Config, PaginationConfig};
pub use models::{UserDraft, UserForm, UserRecord};
pub use pager::{PageLink, PageState, PageSummary, Pager, PagerError};
pub use query::{FilterCriteria, SortField, SortOrder, SortSpec};
pub use store::{FilterStatistics, Statistics, UserStore};
pub use transport::{ApiError, ErrorKind, Transport};
pub use validation::{Field, ValidationResult, ValidationRules, Validator, Violation};
