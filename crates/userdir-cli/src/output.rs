//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use serde::Serialize;

use userdir_core::{FilterStatistics, PageLink, PageSummary, UserRecord, ValidationResult};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// One page of the user list, as printed by `list`
#[derive(Serialize)]
pub struct PageView<'a> {
    pub users: &'a [UserRecord],
    pub page: PageSummary,
    pub window: Vec<PageLink>,
    pub statistics: FilterStatistics,
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print a single user
    pub fn print_user(&self, user: &UserRecord) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:         {}", user.id);
                println!("Name:       {}", user.name);
                println!("Username:   {}", user.username);
                println!("Email:      {}", user.email);
                if let Some(ref phone) = user.phone {
                    println!("Phone:      {}", phone);
                }
                if let Some(ref website) = user.website {
                    println!("Website:    {}", website);
                }
                if !user.department().is_empty() {
                    println!("Department: {}", user.department());
                }
            }
            OutputFormat::Json => print_json(user),
            OutputFormat::Quiet => {
                println!("{}", user.id);
            }
        }
    }

    /// Print one page of users with its navigation strip
    pub fn print_page(&self, view: &PageView<'_>) {
        match self.format {
            OutputFormat::Human => {
                if view.users.is_empty() {
                    println!("No users found.");
                } else {
                    for user in view.users {
                        println!(
                            "{:>4} | {:<24} | {:<16} | {:<28} | {}",
                            user.id,
                            truncate(&user.name, 24),
                            truncate(&user.username, 16),
                            truncate(&user.email, 28),
                            truncate(user.department(), 24)
                        );
                    }
                }
                println!();
                if !view.window.is_empty() {
                    println!("Pages: {}", format_window(&view.window, view.page.current_page));
                }
                println!(
                    "Showing {}–{} of {} (total {})",
                    view.page.start_item,
                    view.page.end_item,
                    view.statistics.filtered,
                    view.statistics.total
                );
            }
            OutputFormat::Json => print_json(view),
            OutputFormat::Quiet => {
                for user in view.users {
                    println!("{}", user.id);
                }
            }
        }
    }

    /// Print validation failures, every violation under its field
    pub fn print_violations(&self, result: &ValidationResult) {
        match self.format {
            OutputFormat::Human => {
                eprintln!("Please fix the following:");
                for (field, violations) in result.errors() {
                    for violation in violations {
                        eprintln!("  {:<11} {}", format!("{}:", field), violation);
                    }
                }
            }
            OutputFormat::Json => {
                print_json(&serde_json::json!({"status": "invalid", "errors": result}));
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize output: {}", e),
    }
}

/// Render the page strip, bracketing the current page
fn format_window(window: &[PageLink], current_page: usize) -> String {
    window
        .iter()
        .map(|link| match link {
            PageLink::Page(page) if *page == current_page => format!("[{}]", page),
            PageLink::Page(page) => page.to_string(),
            PageLink::Ellipsis => "…".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
