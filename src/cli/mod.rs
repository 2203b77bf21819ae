//! CLI module for the bookdesk command-line interface.
//!
//! Every screen of the library desk is a subcommand:
//! - `login` / `logout` / `status` - Session management
//! - `users`, `admins`, `teachers` - Account management
//! - `books`, `branches`, `downloads` - Catalogue and history
//! - `dashboard` / `calendar` - Overview widgets
//! - `config check` - Validate configuration file

use anyhow::{Context, Result};
use chrono::{Datelike, Local, Timelike, Utc};
use clap::{Parser, Subcommand};
use std::future::Future;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use crate::api::ApiClient;
use crate::auth::AuthService;
use crate::config::Config;
use crate::dashboard;
use crate::error::ClientError;
use crate::models::{Book, NewBook, NewBranch, NewStaff, RecordId, Resource, Role, User};
use crate::repository::{
    BooksRepository, BranchesRepository, DownloadsRepository, StaffKind, StaffRepository,
    UsersRepository,
};
use crate::session::{FileStore, SessionStore};
use crate::view::{CollectionView, ViewScope};

pub const LOGIN_REQUIRED: &str = "Not logged in or session expired. Run `bookdesk login`.";

/// CLI arguments structure
#[derive(Parser, Debug)]
#[command(name = "bookdesk")]
#[command(author, version, about = "Library desk for admins and teachers", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "bookdesk.toml")]
    pub config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Backend API URL (overrides api.base_url from the config file)
    #[arg(long, env = "BOOKDESK_API_URL")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and store the session token
    Login {
        /// Email address
        identifier: String,
        /// Password (read from stdin when omitted)
        #[arg(long, env = "BOOKDESK_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show the stored session and check it against the server
    Status,

    /// User accounts
    #[command(subcommand)]
    Users(UsersCommands),

    /// Admin accounts
    #[command(subcommand)]
    Admins(StaffCommands),

    /// Teacher accounts
    #[command(subcommand)]
    Teachers(StaffCommands),

    /// Book catalogue
    #[command(subcommand)]
    Books(BooksCommands),

    /// Academic branches
    #[command(subcommand)]
    Branches(BranchesCommands),

    /// Download history
    #[command(subcommand)]
    Downloads(DownloadsCommands),

    /// Counts, greeting and this month's calendar
    Dashboard,

    /// Print a month calendar
    Calendar {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        month: Option<u32>,
    },

    /// Configuration management commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
pub enum UsersCommands {
    /// List all users
    List,
    /// Show one user
    Show { id: String },
    /// Delete a user
    Delete { id: String },
    /// Show the logged-in account
    Me,
}

#[derive(Subcommand, Debug)]
pub enum StaffCommands {
    /// List accounts
    List,
    /// Create an account
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        /// Initial password (read from stdin when omitted)
        #[arg(long)]
        password: Option<String>,
        /// Branch ID
        #[arg(long)]
        branch: Option<String>,
    },
    /// Delete an account
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum BooksCommands {
    /// List all books
    List,
    /// Search books by title, author or keyword
    Search { query: String },
    /// Show one book
    Show { id: String },
    /// Upload a book file with its metadata
    Upload {
        /// PDF, EPUB, DOC or DOCX file
        file: PathBuf,
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
        /// Branch ID
        #[arg(long)]
        branch: Option<String>,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        summary: Option<String>,
    },
    /// Delete a book
    Delete { id: String },
    /// Download a book file
    Download {
        id: String,
        /// Target file or directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum BranchesCommands {
    /// List all branches
    List,
    /// Create a branch
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        code: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum DownloadsCommands {
    /// Show the download history
    History,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Validate configuration file
    Check,
}

// ============================================================================
// Command plumbing
// ============================================================================

/// Build the API client with a session persisted at `session.path`.
pub fn create_client(config: &Config) -> Result<ApiClient> {
    let store = FileStore::new(&config.session.path);
    let session = SessionStore::new(Arc::new(store));
    ApiClient::new(&config.api, session).context("Failed to create HTTP client")
}

/// True when `err` came from a missing or expired session.
pub fn needs_login(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<ClientError>()
            .map_or(false, ClientError::needs_login)
    })
}

/// Run a CLI command
pub async fn run_command(cli: &Cli, config: &Config) -> Result<()> {
    if let Commands::Config(ConfigCommands::Check) = &cli.command {
        return cmd_config_check(cli).await;
    }
    if let Commands::Calendar { year, month } = &cli.command {
        return cmd_calendar(*year, *month);
    }

    let client = create_client(config)?;
    match &cli.command {
        Commands::Login {
            identifier,
            password,
        } => cmd_login(&client, identifier, password.as_deref()).await,
        Commands::Logout => cmd_logout(&client),
        Commands::Status => cmd_status(&client).await,
        Commands::Users(UsersCommands::List) => cmd_users_list(&client).await,
        Commands::Users(UsersCommands::Show { id }) => cmd_users_show(&client, id).await,
        Commands::Users(UsersCommands::Delete { id }) => cmd_users_delete(&client, id).await,
        Commands::Users(UsersCommands::Me) => cmd_users_me(&client).await,
        Commands::Admins(cmd) => cmd_staff(&client, StaffKind::Admin, cmd).await,
        Commands::Teachers(cmd) => cmd_staff(&client, StaffKind::Teacher, cmd).await,
        Commands::Books(cmd) => cmd_books(&client, cmd).await,
        Commands::Branches(cmd) => cmd_branches(&client, cmd).await,
        Commands::Downloads(DownloadsCommands::History) => cmd_downloads_history(&client).await,
        Commands::Dashboard => cmd_dashboard(&client).await,
        // Handled before the client is built.
        Commands::Calendar { .. } | Commands::Config(_) => Ok(()),
    }
}

/// Run `fut` under `scope`, failing if the scope is cancelled first.
async fn scoped<F, T>(scope: &ViewScope, fut: F) -> Result<T>
where
    F: Future<Output = crate::error::Result<T>>,
{
    match scope.run(fut).await {
        Some(result) => Ok(result?),
        None => anyhow::bail!("Cancelled"),
    }
}

/// A scope that Ctrl+C cancels. Once installed, the Ctrl+C handler stays
/// for the rest of the process, so every step of a command must share it.
fn interruptible() -> ViewScope {
    let scope = ViewScope::new();
    scope.cancel_on_ctrl_c();
    scope
}

/// Fetch a listing into a fresh collection view.
async fn load_listing<T, F>(scope: &ViewScope, fetch: F) -> Result<CollectionView<T>>
where
    T: Resource,
    F: Future<Output = crate::error::Result<Vec<T>>>,
{
    let view = CollectionView::new();
    scoped(scope, view.refresh(fetch)).await?;
    Ok(view)
}

/// Load a listing, then delete `id` on the backend and from the listing,
/// both under `scope`.
async fn delete_listed<T, L, D>(
    scope: &ViewScope,
    list: L,
    id: &RecordId,
    delete: D,
) -> Result<CollectionView<T>>
where
    T: Resource,
    L: Future<Output = crate::error::Result<Vec<T>>>,
    D: Future<Output = crate::error::Result<()>>,
{
    let view = load_listing(scope, list).await?;
    scoped(scope, view.delete_and_remove(id, delete)).await?;
    Ok(view)
}

/// Refuse early when the stored role is known and lacks `allowed`.
fn require_role(client: &ApiClient, allowed: fn(&Role) -> bool, action: &str) -> Result<()> {
    match client.session().role() {
        Some(role) if !allowed(&role) => {
            anyhow::bail!("Your role ({}) is not allowed to {}", role, action)
        }
        _ => Ok(()),
    }
}

fn read_password() -> Result<String> {
    eprint!("Password: ");
    std::io::stderr().flush().ok();
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

// ============================================================================
// Session
// ============================================================================

async fn cmd_login(client: &ApiClient, identifier: &str, password: Option<&str>) -> Result<()> {
    let password = match password {
        Some(password) => password.to_string(),
        None => read_password()?,
    };

    let auth = AuthService::new(client.clone());
    let session = auth.login(identifier, &password).await?;

    println!("[OK] Logged in as {}", identifier.trim());
    if let Some(role) = &session.role {
        println!("Role:       {}", role);
    }
    if let Some(expiry) = session.expiry {
        println!("Expires:    {}", expiry.to_rfc3339());
    }
    Ok(())
}

fn cmd_logout(client: &ApiClient) -> Result<()> {
    AuthService::new(client.clone()).logout();
    println!("Logged out.");
    Ok(())
}

async fn cmd_status(client: &ApiClient) -> Result<()> {
    let session = client.session().session();

    println!();
    println!("=== bookdesk Session ===");
    println!();
    println!("Server:     {}", client.base_url());

    if !session.is_authenticated() {
        println!("Session:    [!!] Not logged in");
        println!();
        return Ok(());
    }

    let role = session.role.as_ref().map(Role::as_str).unwrap_or("-");
    println!("Role:       {}", role);
    match session.expiry {
        Some(expiry) if session.is_expired_at(Utc::now()) => {
            println!("Expires:    {} (expired)", expiry.to_rfc3339())
        }
        Some(expiry) => println!("Expires:    {}", expiry.to_rfc3339()),
        None => println!("Expires:    -"),
    }

    let auth = AuthService::new(client.clone());
    if auth.is_authenticated().await {
        println!("Session:    [OK] Active");
    } else {
        println!("Session:    [!!] Rejected by server");
    }
    println!();
    Ok(())
}

// ============================================================================
// Users and staff
// ============================================================================

fn print_users(users: &[User]) {
    if users.is_empty() {
        println!("No users found.");
        return;
    }

    println!();
    println!(
        "{:<24}  {:<24}  {:<30}  {:<10}  {:<16}",
        "ID", "NAME", "EMAIL", "ROLE", "BRANCH"
    );
    println!("{}", "-".repeat(112));
    for user in users {
        println!(
            "{:<24}  {:<24}  {:<30}  {:<10}  {:<16}",
            truncate(user.id.as_str(), 24),
            truncate(&user.name, 24),
            truncate(user.email.as_deref().unwrap_or("-"), 30),
            user.role.as_ref().map(Role::as_str).unwrap_or("-"),
            truncate(user.branch.as_ref().map(|b| b.label()).unwrap_or("-"), 16),
        );
    }
    println!();
}

fn print_user(user: &User) {
    println!();
    println!("=== User: {} ===", user.name);
    println!();
    println!("ID:         {}", user.id);
    println!("Email:      {}", user.email.as_deref().unwrap_or("-"));
    println!("Phone:      {}", user.phone.as_deref().unwrap_or("-"));
    println!(
        "Role:       {}",
        user.role.as_ref().map(Role::as_str).unwrap_or("-")
    );
    println!(
        "Branch:     {}",
        user.branch.as_ref().map(|b| b.label()).unwrap_or("-")
    );
    println!("Created:    {}", user.created_at.as_deref().unwrap_or("-"));
    println!();
}

async fn cmd_users_list(client: &ApiClient) -> Result<()> {
    let users = UsersRepository::new(client.clone());
    let view = load_listing(&interruptible(), users.list()).await?;
    print_users(&view.snapshot());
    Ok(())
}

async fn cmd_users_show(client: &ApiClient, id: &str) -> Result<()> {
    let users = UsersRepository::new(client.clone());
    let user = scoped(&ViewScope::new(), users.get(&RecordId::new(id))).await?;
    print_user(&user);
    Ok(())
}

async fn cmd_users_me(client: &ApiClient) -> Result<()> {
    let users = UsersRepository::new(client.clone());
    let user = scoped(&ViewScope::new(), users.me()).await?;
    print_user(&user);
    Ok(())
}

async fn cmd_users_delete(client: &ApiClient, id: &str) -> Result<()> {
    let users = UsersRepository::new(client.clone());
    let scope = interruptible();
    let view = load_listing(&scope, users.list()).await?;
    let id = RecordId::new(id);
    let name = view
        .snapshot()
        .into_iter()
        .find(|u| u.id == id)
        .map(|u| u.name);

    scoped(&scope, view.delete_and_remove(&id, users.delete(&id)))
        .await
        .with_context(|| format!("Failed to delete user {}", id))?;

    println!(
        "Deleted user {} ({} remaining)",
        name.as_deref().unwrap_or(id.as_str()),
        view.len()
    );
    Ok(())
}

async fn cmd_staff(client: &ApiClient, kind: StaffKind, cmd: &StaffCommands) -> Result<()> {
    let staff = StaffRepository::new(client.clone(), kind);
    match cmd {
        StaffCommands::List => {
            let view = load_listing(&interruptible(), staff.list()).await?;
            print_users(&view.snapshot());
        }
        StaffCommands::Create {
            name,
            email,
            phone,
            password,
            branch,
        } => {
            require_role(client, Role::can_manage_staff, "manage staff accounts")?;
            let password = match password {
                Some(password) => password.clone(),
                None => read_password()?,
            };
            let form = NewStaff {
                name: name.clone(),
                email: email.clone(),
                phone: phone.clone(),
                password,
                branch: branch.clone(),
            };
            let created = scoped(&ViewScope::new(), staff.create(&form)).await?;
            match created {
                Some(user) => println!("[OK] Created {} {} ({})", kind.label(), user.name, user.id),
                None => println!("[OK] Created {} {}", kind.label(), name),
            }
        }
        StaffCommands::Delete { id } => {
            require_role(client, Role::can_manage_staff, "manage staff accounts")?;
            let id = RecordId::new(id);
            let view = delete_listed(&interruptible(), staff.list(), &id, staff.delete(&id))
                .await
                .with_context(|| format!("Failed to delete {} {}", kind.label(), id))?;
            println!("Deleted {} {} ({} remaining)", kind.label(), id, view.len());
        }
    }
    Ok(())
}

// ============================================================================
// Books, branches and downloads
// ============================================================================

fn print_books(books: &[Book]) {
    if books.is_empty() {
        println!("No books found.");
        return;
    }

    println!();
    println!(
        "{:<24}  {:<32}  {:<22}  {:<6}  {:<16}  {:>9}",
        "ID", "TITLE", "AUTHOR", "YEAR", "BRANCH", "DOWNLOADS"
    );
    println!("{}", "-".repeat(120));
    for book in books {
        println!(
            "{:<24}  {:<32}  {:<22}  {:<6}  {:<16}  {:>9}",
            truncate(book.id.as_str(), 24),
            truncate(&book.title, 32),
            truncate(book.author.as_deref().unwrap_or("-"), 22),
            book.year.map(|y| y.to_string()).unwrap_or_else(|| "-".into()),
            truncate(book.branch.as_ref().map(|b| b.label()).unwrap_or("-"), 16),
            book.download_count,
        );
    }
    println!();
}

async fn cmd_books(client: &ApiClient, cmd: &BooksCommands) -> Result<()> {
    let books = BooksRepository::new(client.clone());
    match cmd {
        BooksCommands::List => {
            let view = load_listing(&interruptible(), books.list()).await?;
            print_books(&view.snapshot());
        }
        BooksCommands::Search { query } => {
            let view = load_listing(&interruptible(), books.search(query)).await?;
            print_books(&view.snapshot());
        }
        BooksCommands::Show { id } => {
            let book = scoped(&ViewScope::new(), books.require(&RecordId::new(id))).await?;
            println!();
            println!("=== Book: {} ===", book.title);
            println!();
            println!("ID:         {}", book.id);
            println!("Author:     {}", book.author.as_deref().unwrap_or("-"));
            println!(
                "Year:       {}",
                book.year.map(|y| y.to_string()).unwrap_or_else(|| "-".into())
            );
            println!(
                "Branch:     {}",
                book.branch.as_ref().map(|b| b.label()).unwrap_or("-")
            );
            println!(
                "Uploader:   {}",
                book.uploader.as_ref().map(|u| u.label()).unwrap_or("-")
            );
            println!("Downloads:  {}", book.download_count);
            println!("File:       {}", book.file.as_deref().unwrap_or("-"));
            if let Some(summary) = &book.summary {
                println!();
                println!("{}", summary);
            }
            println!();
        }
        BooksCommands::Upload {
            file,
            title,
            author,
            branch,
            year,
            summary,
        } => {
            require_role(client, Role::can_upload_books, "upload books")?;
            let form = NewBook {
                title: title.clone(),
                author: author.clone(),
                branch: branch.clone(),
                year: *year,
                summary: summary.clone(),
                file: file.clone(),
            };
            let created = scoped(&ViewScope::new(), books.upload(&form)).await?;
            match created {
                Some(book) => println!("[OK] Uploaded {} ({})", book.title, book.id),
                None => println!("[OK] Uploaded {}", title),
            }
        }
        BooksCommands::Delete { id } => {
            require_role(client, Role::can_upload_books, "delete books")?;
            let id = RecordId::new(id);
            let view = delete_listed(&interruptible(), books.list(), &id, books.delete(&id))
                .await
                .with_context(|| format!("Failed to delete book {}", id))?;
            println!("Deleted book {} ({} remaining)", id, view.len());
        }
        BooksCommands::Download { id, output } => {
            let file = scoped(&interruptible(), books.download(&RecordId::new(id), output)).await?;
            println!(
                "[OK] Saved {} ({})",
                file.path.display(),
                format_bytes(file.bytes)
            );
        }
    }
    Ok(())
}

async fn cmd_branches(client: &ApiClient, cmd: &BranchesCommands) -> Result<()> {
    let branches = BranchesRepository::new(client.clone());
    match cmd {
        BranchesCommands::List => {
            let view = load_listing(&interruptible(), branches.list()).await?;
            let items = view.snapshot();
            if items.is_empty() {
                println!("No branches found.");
                return Ok(());
            }
            println!();
            println!("{:<24}  {:<32}  {:<10}", "ID", "NAME", "CODE");
            println!("{}", "-".repeat(70));
            for branch in items {
                println!(
                    "{:<24}  {:<32}  {:<10}",
                    truncate(branch.id.as_str(), 24),
                    truncate(&branch.name, 32),
                    branch.code.as_deref().unwrap_or("-")
                );
            }
            println!();
        }
        BranchesCommands::Create { name, code } => {
            require_role(client, Role::can_manage_staff, "manage branches")?;
            let form = NewBranch {
                name: name.clone(),
                code: code.clone(),
            };
            let created = scoped(&ViewScope::new(), branches.create(&form)).await?;
            match created {
                Some(branch) => println!("[OK] Created branch {} ({})", branch.name, branch.id),
                None => println!("[OK] Created branch {}", name),
            }
        }
    }
    Ok(())
}

async fn cmd_downloads_history(client: &ApiClient) -> Result<()> {
    let downloads = DownloadsRepository::new(client.clone());
    let view = load_listing(&interruptible(), downloads.history()).await?;
    let items = view.snapshot();
    if items.is_empty() {
        println!("No downloads yet.");
        return Ok(());
    }

    println!();
    println!("{:<32}  {:<24}  {:<26}", "BOOK", "USER", "DOWNLOADED");
    println!("{}", "-".repeat(86));
    for download in items {
        println!(
            "{:<32}  {:<24}  {:<26}",
            truncate(download.book.as_ref().map(|b| b.label()).unwrap_or("-"), 32),
            truncate(download.user.as_ref().map(|u| u.label()).unwrap_or("-"), 24),
            download.downloaded_at.as_deref().unwrap_or("-"),
        );
    }
    println!();
    Ok(())
}

// ============================================================================
// Dashboard and calendar
// ============================================================================

async fn cmd_dashboard(client: &ApiClient) -> Result<()> {
    let scope = interruptible();

    let users = UsersRepository::new(client.clone());
    let (me, counts) = match scope
        .run(async { tokio::join!(users.me(), dashboard::load_counts(client)) })
        .await
    {
        Some(results) => results,
        None => anyhow::bail!("Cancelled"),
    };
    let counts = counts?;
    let name = me.ok().map(|user| user.name);

    let now = Local::now();
    println!();
    println!("{}", dashboard::greeting(name.as_deref(), now.hour()));
    println!();
    print_count("Users", counts.users);
    print_count("Teachers", counts.teachers);
    print_count("Admins", counts.admins);
    print_count("Books", counts.books);
    println!();

    let calendar = dashboard::month_calendar(now.year(), now.month(), Some(now.date_naive()))?;
    print!("{}", calendar.render());
    println!();
    Ok(())
}

fn print_count(label: &str, count: Option<usize>) {
    match count {
        Some(count) => println!("  {:<10} {}", label, count),
        None => println!("  {:<10} unavailable", label),
    }
}

fn cmd_calendar(year: Option<i32>, month: Option<u32>) -> Result<()> {
    let today = Local::now().date_naive();
    let calendar = dashboard::month_calendar(
        year.unwrap_or(today.year()),
        month.unwrap_or(today.month()),
        Some(today),
    )?;
    println!();
    print!("{}", calendar.render());
    println!();
    Ok(())
}

// ============================================================================
// Configuration
// ============================================================================

async fn cmd_config_check(cli: &Cli) -> Result<()> {
    let config_path = &cli.config;

    println!("Checking configuration file: {}", config_path.display());
    println!();

    if !config_path.exists() {
        println!(
            "[!!] Configuration file not found: {}",
            config_path.display()
        );
        println!();
        println!("The default configuration will be used.");
        return Ok(());
    }

    match Config::load(config_path) {
        Ok(config) => {
            println!("[OK] Configuration file is valid!");
            println!();
            println!("=== Configuration Summary ===");
            println!();
            println!("API:");
            println!("  Base URL:     {}", config.api.base_url);
            println!("  Timeout:      {}s", config.api.timeout_seconds);
            println!();
            println!("Session:");
            println!("  File:         {}", config.session.path.display());
            println!();
            println!("Logging:");
            println!("  Level:        {}", config.logging.level);
            println!();

            let mut warnings = Vec::new();
            if config.api.base_url.starts_with("http://")
                && !config.api.base_url.contains("localhost")
                && !config.api.base_url.contains("127.0.0.1")
            {
                warnings.push("Base URL is plain http - tokens will be sent unencrypted");
            }
            if let Some(api_url) = &cli.api_url {
                if api_url != &config.api.base_url {
                    warnings.push("--api-url / BOOKDESK_API_URL overrides api.base_url");
                }
            }

            if !warnings.is_empty() {
                println!("Warnings:");
                for warning in warnings {
                    println!("  [!] {}", warning);
                }
                println!();
            }

            Ok(())
        }
        Err(e) => {
            println!("[!!] Configuration file is invalid!");
            println!();
            println!("Error: {:#}", e);
            println!();
            anyhow::bail!("Invalid configuration file");
        }
    }
}

/// Format bytes to human-readable string
fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Truncate a string to max chars with ellipsis
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
