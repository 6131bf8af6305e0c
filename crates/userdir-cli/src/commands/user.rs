//! User command handlers

use anyhow::{bail, Result};
use clap::Args;

use userdir_core::{
    Config, FilterCriteria, Pager, SortField, SortOrder, UserForm, UserRecord, UserStore,
    Validator,
};

use super::with_hint;
use crate::output::{Output, PageView};
use crate::prompt::confirm;

/// Query and page selection for `list`
pub struct ListArgs {
    pub search: String,
    pub filters: FilterCriteria,
    pub sort: SortField,
    pub order: SortOrder,
    pub page: usize,
    pub page_size: Option<usize>,
}

/// Form fields; on update, omitted fields keep their stored value
#[derive(Args, Debug, Default)]
pub struct FormArgs {
    /// First name
    #[arg(long)]
    pub first_name: Option<String>,
    /// Last name
    #[arg(long)]
    pub last_name: Option<String>,
    /// Username, unique ignoring case
    #[arg(long)]
    pub username: Option<String>,
    /// Email, unique ignoring case
    #[arg(long)]
    pub email: Option<String>,
    /// Phone number, digits with an optional leading +
    #[arg(long)]
    pub phone: Option<String>,
    /// Website URL
    #[arg(long)]
    pub website: Option<String>,
    /// Department ("Not specified" when empty)
    #[arg(long)]
    pub department: Option<String>,
}

impl FormArgs {
    /// Overwrite the fields of `form` that were given
    pub fn apply(self, form: &mut UserForm) {
        let fields = [
            (self.first_name, &mut form.first_name),
            (self.last_name, &mut form.last_name),
            (self.username, &mut form.username),
            (self.email, &mut form.email),
            (self.phone, &mut form.phone),
            (self.website, &mut form.website),
            (self.department, &mut form.department),
        ];
        for (value, slot) in fields {
            if let Some(value) = value {
                *slot = value;
            }
        }
    }
}

/// List one page of users
pub fn list(store: &mut UserStore, config: &Config, args: ListArgs, output: &Output) -> Result<()> {
    store.apply_search(&args.search);
    store.apply_filters(args.filters);
    store.sort(args.sort, args.order);

    let mut pager = Pager::from_config(&config.pagination);
    if let Some(size) = args.page_size {
        pager.change_page_size(size)?;
    }
    pager.update_data(store.filtered_view().to_vec());
    pager.go_to_page(args.page);

    output.print_page(&PageView {
        users: pager.current_page_items(),
        page: pager.summary(),
        window: pager.page_window(),
        statistics: store.filter_statistics(),
    });
    Ok(())
}

/// Show a single user
pub fn show(store: &UserStore, id: i64, output: &Output) -> Result<()> {
    let user = find(store, id)?;
    output.print_user(user);
    Ok(())
}

/// Create a user after validating the form
pub async fn create(
    store: &mut UserStore,
    config: &Config,
    fields: FormArgs,
    output: &Output,
) -> Result<()> {
    let mut form = UserForm::default();
    fields.apply(&mut form);

    let validator = Validator::new(config.validation.clone());
    let result = store.validate(&validator, &form, None);
    if !result.is_valid() {
        output.print_violations(&result);
        bail!("User not created: the form has {} invalid field(s)", result.errors().len());
    }

    let user = store
        .create(&form)
        .await
        .map_err(|e| with_hint(e, "Failed to create user"))?;

    output.success(&format!("Created user: {}", user.id));
    output.print_user(&user);
    Ok(())
}

/// Update a user; the stored record supplies omitted fields
pub async fn update(
    store: &mut UserStore,
    config: &Config,
    id: i64,
    fields: FormArgs,
    output: &Output,
) -> Result<()> {
    let mut form = UserForm::from_record(find(store, id)?);
    fields.apply(&mut form);

    let validator = Validator::new(config.validation.clone());
    let result = store.validate(&validator, &form, Some(id));
    if !result.is_valid() {
        output.print_violations(&result);
        bail!("User not updated: the form has {} invalid field(s)", result.errors().len());
    }

    let user = store
        .update(id, &form)
        .await
        .map_err(|e| with_hint(e, "Failed to update user"))?;

    output.success("User updated");
    output.print_user(&user);
    Ok(())
}

/// Delete a user
pub async fn delete(store: &mut UserStore, id: i64, yes: bool, output: &Output) -> Result<()> {
    let user = find(store, id)?;

    // Confirm deletion
    if !yes && output.should_prompt() {
        println!("Delete user: {} - {} ({})", user.id, user.name, user.username);
        if !confirm("Are you sure?")? {
            output.message("Cancelled.");
            return Ok(());
        }
    }

    store
        .delete(id)
        .await
        .map_err(|e| with_hint(e, "Failed to delete user"))?;

    output.success(&format!("Deleted user: {}", id));
    Ok(())
}

fn find(store: &UserStore, id: i64) -> Result<&UserRecord> {
    match store.get_by_id(id) {
        Some(user) => Ok(user),
        None => bail!("User not found: {}", id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_overrides_given_fields_only() {
        let record =
            UserRecord::new(4, "Patricia Lebsack", "Karianne", "Julianne.OConner@kory.org")
                .with_department("Robel-Corkery");
        let mut form = UserForm::from_record(&record);

        FormArgs {
            last_name: Some("Smith".into()),
            phone: Some("+15550100".into()),
            ..FormArgs::default()
        }
        .apply(&mut form);

        assert_eq!(form.first_name, "Patricia");
        assert_eq!(form.last_name, "Smith");
        assert_eq!(form.username, "Karianne");
        assert_eq!(form.phone, "+15550100");
        assert_eq!(form.department, "Robel-Corkery");
    }

    #[test]
    fn test_missing_create_fields_fail_validation() {
        let mut form = UserForm::default();
        FormArgs {
            first_name: Some("Ann".into()),
            ..FormArgs::default()
        }
        .apply(&mut form);

        let result = Validator::default().validate_form(&form, &[], None);
        assert!(!result.is_valid());
        assert_eq!(result.errors().len(), 3);
    }
}
