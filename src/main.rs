//! gojob - terminal front end for the Gojob store
//!
//! Restores the session, dispatches one action, waits for the store to settle
//! and prints the affected slice as JSON.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use gojob_client::constants::{APP_NAME, APP_VERSION, LOG_FILE_NAME};
use gojob_client::models::{
    ApplicationDraft, ApplicationStatus, DocumentKind, JobSearch, LoginPayload, OutgoingMessage,
    PasswordReset, PaymentDetails, PaymentIntentRequest, PaymentRequest, ProfileUpdate,
    RegisterPayload, Role, User,
};
use gojob_client::{
    Action, ClientConfig, DocumentCache, FileStore, HttpTransport, SliceId, Store, StoreSnapshot,
};

#[derive(Parser)]
#[command(name = "gojob", version = APP_VERSION)]
#[command(about = "Gojob marketplace client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path (default: <config dir>/gojob/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// API base URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Directory of the persisted session
    #[arg(long, global = true)]
    storage_dir: Option<PathBuf>,

    /// Request timeout in seconds, 0 to disable
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session
    Login {
        email: String,
        #[arg(long, env = "GOJOB_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account
    Register {
        name: String,
        email: String,
        #[arg(long, env = "GOJOB_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long, value_enum, default_value = "candidate")]
        role: RoleArg,
        #[arg(long)]
        phone: Option<String>,
    },

    /// Sign out and forget the stored session
    Logout,

    /// Show the signed-in user, fetched fresh from the server
    Whoami,

    /// Update profile fields
    Profile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        bio: Option<String>,
    },

    /// Exchange the refresh token for a new access token
    Refresh,

    /// Forgotten-password flow
    #[command(subcommand)]
    Password(PasswordCommand),

    #[command(subcommand)]
    Payments(PaymentsCommand),

    #[command(subcommand)]
    Subscriptions(SubscriptionsCommand),

    /// Employer statistics
    #[command(subcommand)]
    Stats(StatsCommand),

    #[command(subcommand)]
    Jobs(JobsCommand),

    /// Short-notice missions
    #[command(subcommand)]
    FlashJobs(FlashJobsCommand),

    #[command(subcommand)]
    Applications(ApplicationsCommand),

    /// Suggested offers and automatic applications
    #[command(subcommand)]
    ApplyAi(ApplyAiCommand),

    #[command(subcommand)]
    Messages(MessagesCommand),

    /// Locally cached payslips and contracts
    Documents {
        #[arg(value_enum)]
        kind: DocumentKindArg,
        #[command(subcommand)]
        command: DocumentsCommand,
    },
}

#[derive(Subcommand)]
enum PasswordCommand {
    /// Send a one-time code by email
    Forgot { email: String },
    Verify { email: String, otp: String },
    Reset {
        email: String,
        otp: String,
        #[arg(long, env = "GOJOB_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[derive(Subcommand)]
enum PaymentsCommand {
    History,
    Show { id: String },
    /// Pay for a package
    Pay {
        package_id: String,
        #[arg(long, default_value = "card")]
        method: String,
        #[arg(long)]
        card_number: Option<String>,
        #[arg(long)]
        card_name: Option<String>,
        #[arg(long)]
        expiry: Option<String>,
        #[arg(long)]
        cvc: Option<String>,
    },
    /// Fetch a client secret for the payment sheet
    Intent {
        plan_id: String,
        /// Amount in cents
        amount: u64,
        #[arg(long, default_value = "eur")]
        currency: String,
    },
}

#[derive(Subcommand)]
enum SubscriptionsCommand {
    List,
    Subscribe { package_id: String },
    Cancel { id: u64 },
}

#[derive(Subcommand)]
enum StatsCommand {
    Dashboard,
    Job { id: u64 },
}

#[derive(Subcommand)]
enum JobsCommand {
    List,
    Show { id: u64 },
    /// Offers published by the signed-in employer
    Mine,
    Search {
        #[arg(long)]
        keyword: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        contract_type: Option<String>,
        #[arg(long)]
        salary_min: Option<u64>,
        #[arg(long)]
        salary_max: Option<u64>,
        #[arg(long)]
        page: Option<u32>,
    },
    /// Publish an offer described by a JSON file
    Publish { file: PathBuf },
    Update { id: u64, file: PathBuf },
    Delete { id: u64 },
    Favorite { id: u64 },
    Favorites,
}

#[derive(Subcommand)]
enum FlashJobsCommand {
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        per_page: u32,
    },
    Search {
        #[arg(long)]
        location: Option<String>,
        /// Day of the mission, YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,
    },
    Show { id: u64 },
    /// Publish a mission described by a JSON file
    Publish { file: PathBuf },
    Update { id: u64, file: PathBuf },
    Delete { id: u64 },
    Apply { id: u64 },
}

#[derive(Subcommand)]
enum ApplyAiCommand {
    Suggestions,
    Apply { job_id: u64 },
    History,
    Config,
    /// Replace the preferences with a JSON file
    Configure { file: PathBuf },
    AutoApply {
        #[arg(value_enum)]
        state: Switch,
    },
}

#[derive(Subcommand)]
enum ApplicationsCommand {
    List,
    Apply {
        job_id: u64,
        #[arg(long)]
        cover_letter: Option<String>,
    },
    Status {
        id: u64,
        #[arg(value_enum)]
        status: StatusArg,
    },
    Withdraw { id: u64 },
}

#[derive(Subcommand)]
enum MessagesCommand {
    Conversations,
    Show { conversation_id: u64 },
    Send {
        receiver_id: u64,
        text: String,
        #[arg(long)]
        job_id: Option<u64>,
    },
}

#[derive(Subcommand)]
enum DocumentsCommand {
    List,
    Add { name: String, uri: String },
    Remove { id: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    Employer,
    Candidate,
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    Pending,
    Reviewed,
    Accepted,
    Rejected,
}

#[derive(Clone, Copy, ValueEnum)]
enum Switch {
    On,
    Off,
}

#[derive(Clone, Copy, ValueEnum)]
enum DocumentKindArg {
    Payslip,
    Contract,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ClientConfig::load(cli.config.as_deref())?;
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    if let Some(dir) = cli.storage_dir {
        config.storage_dir = dir;
    }
    if let Some(secs) = cli.timeout {
        config.timeout_secs = (secs > 0).then_some(secs);
    }

    let _guard = init_logging(&config.log_path(), cli.verbose)?;
    tracing::info!(api_url = %config.api_url, storage = %config.storage_dir.display(), "{} starting", APP_NAME);

    let storage = Arc::new(FileStore::new(&config.storage_dir));

    if let Commands::Documents { kind, command } = cli.command {
        return run_documents(DocumentCache::new(storage), kind.into(), command);
    }

    let transport = Arc::new(HttpTransport::from_config(&config));
    let store = Store::spawn(transport, storage);

    let session = store.snapshot();
    if matches!(cli.command, Commands::Whoami) && !session.is_authenticated() {
        store.shutdown().await;
        bail!("Not signed in");
    }
    let is_employer = session.auth.data.user.as_ref().map_or(false, User::is_employer);
    if session.is_authenticated() && employer_only(&cli.command) && !is_employer {
        store.shutdown().await;
        bail!("Only employer accounts can do this");
    }

    let action = to_action(cli.command)?;
    let slice = action.slice();
    store.dispatch(action);
    let snapshot = store.settled().await;
    store.shutdown().await;

    print_slice(&snapshot, slice)?;
    if let Some(error) = snapshot.error(slice) {
        bail!("{}", error);
    }
    Ok(())
}

/// Logs go to a file; stdout is reserved for the JSON output
fn init_logging(path: &Path, verbose: bool) -> Result<WorkerGuard> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| LOG_FILE_NAME.into());

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_env_filter(filter)
        .init();
    Ok(guard)
}

/// Commands the backend refuses to candidates
fn employer_only(command: &Commands) -> bool {
    matches!(
        command,
        Commands::Stats(_)
            | Commands::Jobs(
                JobsCommand::Mine
                    | JobsCommand::Publish { .. }
                    | JobsCommand::Update { .. }
                    | JobsCommand::Delete { .. }
            )
            | Commands::FlashJobs(
                FlashJobsCommand::Publish { .. }
                    | FlashJobsCommand::Update { .. }
                    | FlashJobsCommand::Delete { .. }
            )
    )
}

fn to_action(command: Commands) -> Result<Action> {
    let action = match command {
        Commands::Login { email, password } => Action::Login(LoginPayload { email, password }),
        Commands::Register { name, email, password, role, phone } => Action::Register(RegisterPayload {
            name,
            email,
            password_confirmation: password.clone(),
            password,
            role: role.into(),
            phone,
        }),
        Commands::Logout => Action::Logout,
        Commands::Whoami => Action::FetchProfile,
        Commands::Profile { name, phone, address, bio } => {
            Action::UpdateProfile(ProfileUpdate { name, phone, address, bio })
        }
        Commands::Refresh => Action::RefreshToken,
        Commands::Password(cmd) => match cmd {
            PasswordCommand::Forgot { email } => Action::ForgotPassword { email },
            PasswordCommand::Verify { email, otp } => Action::VerifyOtp { email, otp },
            PasswordCommand::Reset { email, otp, password } => Action::ResetPassword(PasswordReset {
                email,
                otp,
                password_confirmation: password.clone(),
                password,
            }),
        },

        Commands::Payments(cmd) => match cmd {
            PaymentsCommand::History => Action::FetchPaymentHistory,
            PaymentsCommand::Show { id } => Action::FetchPaymentDetails(id),
            PaymentsCommand::Pay { package_id, method, card_number, card_name, expiry, cvc } => {
                Action::ProcessPayment(PaymentRequest {
                    package_id,
                    payment_method: method,
                    payment_details: PaymentDetails {
                        number: card_number,
                        name: card_name,
                        expiry,
                        cvc,
                        ..Default::default()
                    },
                })
            }
            PaymentsCommand::Intent { plan_id, amount, currency } => {
                Action::CreatePaymentIntent(PaymentIntentRequest { plan_id, amount, currency })
            }
        },

        Commands::Subscriptions(cmd) => match cmd {
            SubscriptionsCommand::List => Action::FetchSubscriptions,
            SubscriptionsCommand::Subscribe { package_id } => Action::Subscribe { package_id },
            SubscriptionsCommand::Cancel { id } => Action::CancelSubscription(id),
        },

        Commands::Stats(cmd) => match cmd {
            StatsCommand::Dashboard => Action::FetchDashboard,
            StatsCommand::Job { id } => Action::FetchJobStats(id),
        },

        Commands::Jobs(cmd) => match cmd {
            JobsCommand::List => Action::FetchJobs,
            JobsCommand::Show { id } => Action::FetchJob(id),
            JobsCommand::Mine => Action::FetchEmployerJobs,
            JobsCommand::Search { keyword, location, contract_type, salary_min, salary_max, page } => {
                Action::SearchJobs(JobSearch {
                    keyword,
                    location,
                    contract_type,
                    salary_min,
                    salary_max,
                    page,
                    per_page: None,
                })
            }
            JobsCommand::Publish { file } => Action::PublishJob(read_json(&file)?),
            JobsCommand::Update { id, file } => Action::UpdateJob { id, draft: read_json(&file)? },
            JobsCommand::Delete { id } => Action::DeleteJob(id),
            JobsCommand::Favorite { id } => Action::ToggleFavorite(id),
            JobsCommand::Favorites => Action::FetchFavorites,
        },

        Commands::FlashJobs(cmd) => match cmd {
            FlashJobsCommand::List { page, per_page } => Action::FetchFlashJobs { page, per_page },
            FlashJobsCommand::Search { location, date } => Action::SearchFlashJobs { location, date },
            FlashJobsCommand::Show { id } => Action::FetchFlashJob(id),
            FlashJobsCommand::Publish { file } => Action::PublishFlashJob(read_json(&file)?),
            FlashJobsCommand::Update { id, file } => {
                Action::UpdateFlashJob { id, draft: read_json(&file)? }
            }
            FlashJobsCommand::Delete { id } => Action::DeleteFlashJob(id),
            FlashJobsCommand::Apply { id } => Action::ApplyFlashJob(id),
        },

        Commands::Applications(cmd) => match cmd {
            ApplicationsCommand::List => Action::FetchApplications,
            ApplicationsCommand::Apply { job_id, cover_letter } => {
                Action::CreateApplication(ApplicationDraft { job_id, cover_letter })
            }
            ApplicationsCommand::Status { id, status } => {
                Action::UpdateApplicationStatus { id, status: status.into() }
            }
            ApplicationsCommand::Withdraw { id } => Action::WithdrawApplication(id),
        },

        Commands::ApplyAi(cmd) => match cmd {
            ApplyAiCommand::Suggestions => Action::FetchAiSuggestions,
            ApplyAiCommand::Apply { job_id } => Action::AutoApply(job_id),
            ApplyAiCommand::History => Action::FetchAutoApplyHistory,
            ApplyAiCommand::Config => Action::FetchApplyAiConfig,
            ApplyAiCommand::Configure { file } => Action::UpdateApplyAiConfig(read_json(&file)?),
            ApplyAiCommand::AutoApply { state } => Action::SetAutoApply(matches!(state, Switch::On)),
        },

        Commands::Messages(cmd) => match cmd {
            MessagesCommand::Conversations => Action::FetchConversations,
            MessagesCommand::Show { conversation_id } => Action::FetchMessages(conversation_id),
            MessagesCommand::Send { receiver_id, text, job_id } => {
                Action::SendMessage(OutgoingMessage { receiver_id, text, job_id })
            }
        },

        Commands::Documents { .. } => bail!("documents are handled locally"),
    };
    Ok(action)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn run_documents(cache: DocumentCache, kind: DocumentKind, command: DocumentsCommand) -> Result<()> {
    let output = match command {
        DocumentsCommand::List => serde_json::to_value(cache.list(kind)?)?,
        DocumentsCommand::Add { name, uri } => serde_json::to_value(cache.add(kind, name, uri)?)?,
        DocumentsCommand::Remove { id } => match cache.remove(kind, &id)? {
            Some(removed) => serde_json::to_value(removed)?,
            None => bail!("No document with id {}", id),
        },
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_slice(snapshot: &StoreSnapshot, slice: SliceId) -> Result<()> {
    let value = snapshot.slice_json(slice)?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Employer => Role::Employer,
            RoleArg::Candidate => Role::Candidate,
        }
    }
}

impl From<StatusArg> for ApplicationStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Pending => ApplicationStatus::Pending,
            StatusArg::Reviewed => ApplicationStatus::Reviewed,
            StatusArg::Accepted => ApplicationStatus::Accepted,
            StatusArg::Rejected => ApplicationStatus::Rejected,
        }
    }
}

impl From<DocumentKindArg> for DocumentKind {
    fn from(kind: DocumentKindArg) -> Self {
        match kind {
            DocumentKindArg::Payslip => DocumentKind::Payslip,
            DocumentKindArg::Contract => DocumentKind::Contract,
        }
    }
}
