//! Record store
//!
//! The `UserStore` owns the user collection and keeps three sequences:
//! - canonical: records as last confirmed by the backing API
//! - working: the mutable copy the console reads from
//! - view: the working set filtered, searched and sorted
//!
//! Every mutator awaits its API call first and only then touches local
//! state, so a failed call leaves all three sequences untouched. On
//! success the view is recomputed before the mutator returns.
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = UserStore::from_config(&Config::load()?)?;
//! store.load_all().await?;
//!
//! store.apply_search("doe");
//! pager.update_data(store.filtered_view().to_vec());
//! ```

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

use crate::api::{fallback_id, UsersApi};
use crate::config::Config;
use crate::models::{UserForm, UserRecord};
use crate::query::{FilterCriteria, QueryState, SortField, SortOrder, SortSpec};
use crate::transport::{ApiResult, Transport};
use crate::validation::{ValidationResult, Validator};

/// Collection sizes for the status line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub total: usize,
    pub filtered: usize,
}

/// `Statistics` plus what is narrowing the view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FilterStatistics {
    pub total: usize,
    pub filtered: usize,
    pub filters_active: bool,
    pub active_filter_count: usize,
    pub search_active: bool,
}

/// In-memory user collection backed by the users API
pub struct UserStore {
    api: UsersApi,
    canonical: Vec<UserRecord>,
    working: Vec<UserRecord>,
    view: Vec<UserRecord>,
    query: QueryState,
}

impl UserStore {
    pub fn new(api: UsersApi) -> Self {
        Self {
            api,
            canonical: Vec::new(),
            working: Vec::new(),
            view: Vec::new(),
            query: QueryState::default(),
        }
    }

    /// Build a store talking to the API described by `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport = Transport::from_config(&config.api)?;
        Ok(Self::new(UsersApi::new(transport)))
    }

    pub fn api(&self) -> &UsersApi {
        &self.api
    }

    // ==================== Mutations ====================

    /// Replace the collection with a fresh fetch
    pub async fn load_all(&mut self) -> ApiResult<()> {
        let users = self.api.get_users().await?;
        info!(count = users.len(), "Loaded users");

        self.canonical = users.clone();
        self.working = users;
        self.refresh();
        Ok(())
    }

    /// Create a user from a form
    ///
    /// The form is expected to have passed validation already. When the
    /// API answers with an id that is already taken locally (the demo API
    /// hands out the same id for every create), a client-side id is used
    /// instead so ids stay unique.
    pub async fn create(&mut self, form: &UserForm) -> ApiResult<UserRecord> {
        let mut record = self.api.create_user(&form.to_draft()).await?;

        if self.contains(record.id) {
            let id = fallback_id();
            info!(server_id = record.id, id, "Created id already in use, using client-side id");
            record.id = id;
        }

        self.canonical.push(record.clone());
        self.working.push(record.clone());
        self.refresh();
        info!(id = record.id, username = %record.username, "Created user");
        Ok(record)
    }

    /// Update a user from a form
    ///
    /// Records with the id are replaced in both sets; a missing id leaves
    /// the sets as they are.
    pub async fn update(&mut self, id: i64, form: &UserForm) -> ApiResult<UserRecord> {
        let record = self.api.update_user(id, &form.to_draft()).await?;

        for set in [&mut self.canonical, &mut self.working] {
            if let Some(slot) = set.iter_mut().find(|u| u.id == id) {
                *slot = record.clone();
            }
        }
        self.refresh();
        info!(id, "Updated user");
        Ok(record)
    }

    /// Delete a user, returning its id
    pub async fn delete(&mut self, id: i64) -> ApiResult<i64> {
        let id = self.api.delete_user(id).await?;

        self.canonical.retain(|u| u.id != id);
        self.working.retain(|u| u.id != id);
        self.refresh();
        info!(id, "Deleted user");
        Ok(id)
    }

    // ==================== Reads ====================

    /// Exact id lookup in the working set
    pub fn get_by_id(&self, id: i64) -> Option<&UserRecord> {
        self.working.iter().find(|u| u.id == id)
    }

    /// Records as last confirmed by the API
    pub fn get_all(&self) -> &[UserRecord] {
        &self.canonical
    }

    pub fn working_set(&self) -> &[UserRecord] {
        &self.working
    }

    /// Working set after search, filters and sort
    pub fn filtered_view(&self) -> &[UserRecord] {
        &self.view
    }

    pub fn statistics(&self) -> Statistics {
        Statistics {
            total: self.working.len(),
            filtered: self.view.len(),
        }
    }

    pub fn filter_statistics(&self) -> FilterStatistics {
        FilterStatistics {
            total: self.working.len(),
            filtered: self.view.len(),
            filters_active: !self.query.filters.is_empty(),
            active_filter_count: self.query.filters.active_count(),
            search_active: !self.query.search.is_empty(),
        }
    }

    // ==================== Query ====================

    pub fn apply_search(&mut self, text: &str) {
        self.query.set_search(text);
        self.refresh();
    }

    pub fn apply_filters(&mut self, criteria: FilterCriteria) {
        self.query.filters = criteria;
        self.refresh();
    }

    /// Drop filters and search; sort is kept
    pub fn clear_filters(&mut self) {
        self.query.filters = FilterCriteria::default();
        self.query.search.clear();
        self.refresh();
    }

    pub fn sort(&mut self, field: SortField, order: SortOrder) {
        self.query.sort = SortSpec::new(field, order);
        self.refresh();
    }

    pub fn toggle_sort_order(&mut self) {
        self.query.sort.order = self.query.sort.order.toggled();
        self.refresh();
    }

    pub fn current_sort(&self) -> &SortSpec {
        &self.query.sort
    }

    pub fn current_filters(&self) -> &FilterCriteria {
        &self.query.filters
    }

    /// Normalized search text
    pub fn search_query(&self) -> &str {
        &self.query.search
    }

    pub fn has_active_filters(&self) -> bool {
        self.query.is_filtering()
    }

    /// Restore the working set from the canonical one and clear the query
    pub fn reset(&mut self) {
        self.working = self.canonical.clone();
        self.query = QueryState::default();
        self.refresh();
    }

    /// Check a candidate against the confirmed records
    pub fn validate(
        &self,
        validator: &Validator,
        form: &UserForm,
        exclude_id: Option<i64>,
    ) -> ValidationResult {
        validator.validate_form(form, &self.canonical, exclude_id)
    }

    fn contains(&self, id: i64) -> bool {
        self.canonical.iter().chain(&self.working).any(|u| u.id == id)
    }

    fn refresh(&mut self) {
        self.view = self.query.derive(&self.working);
        debug!(
            total = self.working.len(),
            filtered = self.view.len(),
            sort = %self.query.sort.field,
            order = %self.query.sort.order,
            "Recomputed view"
        );
    }
}
