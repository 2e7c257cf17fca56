use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use outreach::api::leads::LeadInput;
use outreach::api::senders::SenderInput;
use outreach::api::templates::{NewTemplate, SequencePayload};
use outreach::api::Services;
use outreach::app::App;
use outreach::baas::{BaasClient, SessionStore};
use outreach::columns::{column_label, VisibleColumns, LEAD_COLUMNS};
use outreach::config::Config;
use outreach::logging;
use outreach::sequence::{validate_for_save, SaveTarget, SequenceSaver, SequenceStep, SequenceStore};

/// Password for `login` when not typed interactively
const PASSWORD_ENV: &str = "OUTREACH_PASSWORD";

#[derive(Parser)]
#[command(name = "outreach")]
#[command(about = "Email outreach sequences, leads and campaigns from the terminal")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the sequence editor (default)
    Edit {
        /// Sequence template to edit
        #[arg(short, long)]
        template: Option<String>,

        /// Start a new sequence with this name
        #[arg(short, long, conflicts_with = "template")]
        new: Option<String>,
    },

    /// Sign in to the hosted backend
    Login {
        email: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the signed-in account
    Whoami,

    /// Email templates
    Templates {
        #[command(subcommand)]
        action: TemplateAction,
    },

    /// Sequences stored on templates
    Sequence {
        #[command(subcommand)]
        action: SequenceCommand,
    },

    /// Leads and lead lists
    Leads {
        #[command(subcommand)]
        action: LeadAction,
    },

    /// Sender identities
    Senders {
        #[command(subcommand)]
        action: SenderAction,
    },

    /// Campaigns
    Campaigns {
        #[command(subcommand)]
        action: CampaignAction,
    },

    /// Account settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Sending statistics
    Stats {
        /// Daily breakdown range, e.g. 7d or 30d
        #[arg(short, long, default_value = "30d")]
        range: String,
    },

    /// Reply inbox
    Inbox {
        #[command(subcommand)]
        action: InboxAction,
    },

    /// Lead avatars
    Avatars {
        #[command(subcommand)]
        action: AvatarAction,
    },
}

#[derive(Subcommand)]
enum TemplateAction {
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        size: Option<u32>,
    },
    Show {
        id: String,
    },
    /// Print the rendered HTML
    Preview {
        id: String,
    },
    Create {
        name: String,
        #[arg(short, long)]
        subject: Option<String>,
        /// File with the HTML body
        #[arg(long)]
        content_file: Option<PathBuf>,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand)]
enum SequenceCommand {
    /// Print the steps of a template's sequence
    Show {
        template_id: String,
    },
    /// Check a stored sequence against the save rules
    Validate {
        template_id: String,
    },
    /// Write a template's sequence as JSON
    Export {
        template_id: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Save steps from a JSON file (`{"steps": [...]}` or a bare array)
    Import {
        file: PathBuf,
        #[arg(short, long)]
        template: Option<String>,
        #[arg(short, long, conflicts_with = "template")]
        new: Option<String>,
    },
}

#[derive(Subcommand)]
enum LeadAction {
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        size: Option<u32>,
    },
    /// Lead lists
    Lists,
    Add {
        email: String,
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        website: Option<String>,
        #[arg(long)]
        linkedin: Option<String>,
    },
    Delete {
        id: String,
    },
    /// Upload a CSV file
    Import {
        file: PathBuf,
        /// Put the imported leads in a new list
        #[arg(short, long)]
        list: Option<String>,
    },
    /// Show or toggle visible columns in `leads list`
    Columns {
        /// Column key to show/hide
        toggle: Option<String>,
    },
}

#[derive(Subcommand)]
enum SenderAction {
    List,
    Add {
        email: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        daily_quota: Option<u32>,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand)]
enum CampaignAction {
    List,
    Show { id: String },
    Delete { id: String },
}

#[derive(Subcommand)]
enum SettingsAction {
    Get,
    Set { key: String, value: String },
}

#[derive(Subcommand)]
enum InboxAction {
    List {
        /// Only unread mail
        #[arg(short, long)]
        unread: bool,
    },
    /// Mailboxes that received replies
    Recipients,
    Read { id: String },
    Unread { id: String },
}

#[derive(Subcommand)]
enum AvatarAction {
    /// Upload a ZIP with an avatars/ folder
    Import { zip: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;

    let is_tui_mode = matches!(cli.command, None | Some(Commands::Edit { .. }));
    let logging_handle = logging::init_logging(&config, is_tui_mode, cli.debug)?;

    match cli.command {
        None => run_editor(config, None, None, logging_handle.log_file_path).await?,
        Some(Commands::Edit { template, new }) => {
            run_editor(config, template, new, logging_handle.log_file_path).await?
        }
        Some(Commands::Login { email }) => cmd_login(&config, &email).await?,
        Some(Commands::Logout) => cmd_logout(&config)?,
        Some(Commands::Whoami) => cmd_whoami(&config),
        Some(Commands::Templates { action }) => cmd_templates(&config, action).await?,
        Some(Commands::Sequence { action }) => cmd_sequence(&config, action).await?,
        Some(Commands::Leads { action }) => cmd_leads(&config, action).await?,
        Some(Commands::Senders { action }) => cmd_senders(&config, action).await?,
        Some(Commands::Campaigns { action }) => cmd_campaigns(&config, action).await?,
        Some(Commands::Settings { action }) => cmd_settings(&config, action).await?,
        Some(Commands::Stats { range }) => cmd_stats(&config, &range).await?,
        Some(Commands::Inbox { action }) => cmd_inbox(&config, action).await?,
        Some(Commands::Avatars { action }) => cmd_avatars(&config, action).await?,
    }

    Ok(())
}

/// Connect and refuse to go on without credentials
async fn connect(config: &Config) -> Result<Services> {
    let services = Services::connect(config)
        .await
        .context("Failed to set up API clients")?;
    if !services.is_authenticated() && !config.api.dev_mode {
        bail!("Not signed in. Run `outreach login <email>` first");
    }
    Ok(services)
}

fn save_target(template: Option<String>, new: Option<String>) -> SaveTarget {
    match template {
        Some(template_id) => SaveTarget::Existing { template_id },
        None => SaveTarget::New {
            name: new.unwrap_or_default(),
        },
    }
}

async fn run_editor(
    config: Config,
    template: Option<String>,
    new: Option<String>,
    log_file_path: Option<PathBuf>,
) -> Result<()> {
    let services = connect(&config).await?;
    let mut app = App::open(config, services, save_target(template, new)).await?;
    let result = app.run().await;

    if let Some(log_path) = log_file_path {
        if let Ok(metadata) = log_path.metadata() {
            if metadata.len() > 0 {
                eprintln!("Session log: {}", log_path.display());
            }
        }
    }

    if app.editor().store().is_modified() {
        eprintln!("Exited with unsaved changes");
    }
    result
}

fn read_password() -> Result<String> {
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        return Ok(password);
    }
    print!("Password: ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

async fn cmd_login(config: &Config, email: &str) -> Result<()> {
    let client = BaasClient::from_config(&config.baas)
        .context("Set baas.url and baas.anon_key to sign in")?;
    let password = read_password()?;
    let session = client
        .sign_in(email, &password)
        .await
        .context("Sign in failed")?;

    let store = SessionStore::for_config(config);
    store.save(&session)?;
    println!("Signed in as {}", session.email().unwrap_or(email));
    Ok(())
}

fn cmd_logout(config: &Config) -> Result<()> {
    SessionStore::for_config(config).clear()?;
    println!("Signed out");
    Ok(())
}

fn cmd_whoami(config: &Config) {
    match SessionStore::for_config(config).load() {
        Some(session) => {
            let state = if session.is_expired() { " (expired)" } else { "" };
            println!("{}{}", session.email().unwrap_or("unknown user"), state);
        }
        None => println!("Not signed in"),
    }
}

async fn cmd_templates(config: &Config, action: TemplateAction) -> Result<()> {
    let services = connect(config).await?;
    let api = &services.api;

    match action {
        TemplateAction::List { page, size } => {
            let size = size.unwrap_or(config.api.page_size);
            let templates = api.list_templates(page, size).await?;
            for t in &templates.items {
                println!(
                    "{:<38} {:<10} {}",
                    t.id,
                    t.template_type.as_deref().unwrap_or("email"),
                    t.name
                );
            }
            println!(
                "Page {}/{} ({} templates)",
                templates.page,
                templates.page_count(),
                templates.total
            );
        }
        TemplateAction::Show { id } => {
            let t = api.get_template(&id).await?;
            println!("{}\nSubject: {}\n\n{}", t.name, t.subject, t.content);
        }
        TemplateAction::Preview { id } => {
            println!("{}", api.preview_template(&id).await?.html);
        }
        TemplateAction::Create {
            name,
            subject,
            content_file,
        } => {
            let content = match content_file {
                Some(path) => Some(
                    std::fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read {}", path.display()))?,
                ),
                None => None,
            };
            let created = api
                .create_template(&NewTemplate {
                    name,
                    subject,
                    content,
                    template_type: None,
                })
                .await?;
            println!("Created template {}", created.id);
        }
        TemplateAction::Delete { id } => {
            api.delete_template(&id).await?;
            println!("Deleted template {}", id);
        }
    }
    Ok(())
}

fn print_steps(steps: &[SequenceStep]) {
    if steps.is_empty() {
        println!("No steps");
        return;
    }
    for step in steps {
        let marker = if step.is_valid { "ok" } else { "!!" };
        println!("{:>3} [{}] {}", step.position, marker, step.step_type().label());
        for error in &step.errors {
            println!("         {}", error);
        }
    }
}

fn read_steps(path: &Path) -> Result<Vec<SequenceStep>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    if let Ok(payload) = serde_json::from_str::<SequencePayload>(&contents) {
        return Ok(payload.steps);
    }
    serde_json::from_str::<Vec<SequenceStep>>(&contents)
        .with_context(|| format!("{} is not a step list", path.display()))
}

async fn cmd_sequence(config: &Config, action: SequenceCommand) -> Result<()> {
    let services = connect(config).await?;

    match action {
        SequenceCommand::Show { template_id } => {
            let store = SequenceStore::with_steps(services.api.get_sequence(&template_id).await?);
            print_steps(store.steps());
        }
        SequenceCommand::Validate { template_id } => {
            let store = SequenceStore::with_steps(services.api.get_sequence(&template_id).await?);
            let mut problems: Vec<String> = store
                .steps()
                .iter()
                .flat_map(|s| {
                    s.errors
                        .iter()
                        .map(move |e| format!("Step {}: {}", s.position + 1, e))
                })
                .collect();
            problems.extend(validate_for_save(store.steps()));
            if problems.is_empty() {
                println!("Sequence is valid ({} steps)", store.steps().len());
            } else {
                for problem in &problems {
                    println!("{}", problem);
                }
                bail!("{} problem(s) found", problems.len());
            }
        }
        SequenceCommand::Export {
            template_id,
            output,
        } => {
            let steps = services.api.get_sequence(&template_id).await?;
            let json = serde_json::to_string_pretty(&SequencePayload { steps })?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Wrote {}", path.display());
                }
                None => println!("{}", json),
            }
        }
        SequenceCommand::Import {
            file,
            template,
            new,
        } => {
            let mut store = SequenceStore::new();
            store.set_steps(read_steps(&file)?);
            store.mark_modified();

            let mut saver = SequenceSaver::new();
            let outcome = saver
                .save(&mut store, &services.api, save_target(template, new))
                .await?;
            println!(
                "Saved {} step(s) to template {}{}",
                outcome.step_count,
                outcome.template_id,
                if outcome.created { " (new)" } else { "" }
            );
        }
    }
    Ok(())
}

async fn cmd_leads(config: &Config, action: LeadAction) -> Result<()> {
    if let LeadAction::Columns { toggle } = &action {
        let mut columns = VisibleColumns::for_config(config);
        if let Some(key) = toggle {
            if column_label(key).is_none() {
                bail!("Unknown column '{}'", key);
            }
            columns.toggle(key)?;
        }
        for (key, label) in LEAD_COLUMNS {
            let mark = if columns.is_visible(key) { "x" } else { " " };
            println!("[{}] {:<12} {}", mark, key, label);
        }
        return Ok(());
    }

    let services = connect(config).await?;
    let api = &services.api;

    match action {
        LeadAction::List { page, size } => {
            let columns = VisibleColumns::for_config(config);
            let leads = api
                .list_leads(page, size.unwrap_or(config.api.page_size))
                .await?;
            let header: Vec<&str> = columns
                .columns()
                .iter()
                .map(|c| column_label(c).unwrap_or(c.as_str()))
                .collect();
            println!("{}", header.join(" | "));
            for lead in &leads.items {
                let row: Vec<&str> = columns
                    .columns()
                    .iter()
                    .map(|c| lead.column_value(c))
                    .collect();
                println!("{}", row.join(" | "));
            }
            if columns.hidden_count() > 0 {
                println!("({} column(s) hidden)", columns.hidden_count());
            }
            println!("Page {}/{} ({} leads)", leads.page, leads.page_count(), leads.total);
        }
        LeadAction::Lists => {
            for list in api.list_lead_lists().await? {
                println!(
                    "{:<38} {:<30} {}",
                    list.id,
                    list.name,
                    list.lead_count.unwrap_or(0)
                );
            }
        }
        LeadAction::Add {
            email,
            company,
            website,
            linkedin,
        } => {
            let lead = api
                .create_lead(&LeadInput {
                    email: Some(email),
                    bedrijf: company,
                    website,
                    linkedin,
                })
                .await?;
            println!("Created lead {}", lead.id);
        }
        LeadAction::Delete { id } => {
            api.delete_lead(&id).await?;
            println!("Deleted lead {}", id);
        }
        LeadAction::Import { file, list } => {
            let summary = api.import_leads(&file, list.as_deref()).await?;
            println!("Imported {} lead(s), skipped {}", summary.imported, summary.skipped);
            for error in &summary.errors {
                eprintln!("  {}", error);
            }
        }
        LeadAction::Columns { .. } => {}
    }
    Ok(())
}

async fn cmd_senders(config: &Config, action: SenderAction) -> Result<()> {
    let services = connect(config).await?;
    let api = &services.api;

    match action {
        SenderAction::List => {
            for sender in api.list_senders().await? {
                let quota = sender
                    .daily_quota
                    .map(|q| format!("{}/day", q))
                    .unwrap_or_default();
                println!("{:<38} {:<40} {}", sender.id, sender.label(), quota);
            }
        }
        SenderAction::Add {
            email,
            name,
            daily_quota,
        } => {
            let sender = api
                .create_sender(&SenderInput {
                    name,
                    email: Some(email),
                    daily_quota,
                })
                .await?;
            println!("Created sender {}", sender.id);
        }
        SenderAction::Delete { id } => {
            api.delete_sender(&id).await?;
            println!("Deleted sender {}", id);
        }
    }
    Ok(())
}

async fn cmd_campaigns(config: &Config, action: CampaignAction) -> Result<()> {
    let services = connect(config).await?;
    let api = &services.api;

    match action {
        CampaignAction::List => {
            for c in api.list_campaigns().await? {
                println!(
                    "{:<38} {:<10} {}",
                    c.id,
                    c.status.as_deref().unwrap_or("draft"),
                    c.name
                );
            }
        }
        CampaignAction::Show { id } => {
            let c = api.get_campaign(&id).await?;
            println!("{}", serde_json::to_string_pretty(&c)?);
        }
        CampaignAction::Delete { id } => {
            api.delete_campaign(&id).await?;
            println!("Deleted campaign {}", id);
        }
    }
    Ok(())
}

async fn cmd_settings(config: &Config, action: SettingsAction) -> Result<()> {
    let services = connect(config).await?;
    let api = &services.api;

    match action {
        SettingsAction::Get => {
            println!("{}", serde_json::to_string_pretty(&api.get_settings().await?)?);
        }
        SettingsAction::Set { key, value } => {
            let mut settings = api.get_settings().await?;
            settings.set(&key, &value).map_err(anyhow::Error::msg)?;
            api.update_settings(&settings).await?;
            println!("Updated {}", key);
        }
    }
    Ok(())
}

async fn cmd_stats(config: &Config, range: &str) -> Result<()> {
    let services = connect(config).await?;
    let overview = services.api.stats_overview().await?;
    println!(
        "Leads {}  Campaigns {} ({} active)",
        overview.leads, overview.campaigns, overview.active_campaigns
    );
    println!(
        "Opens {} ({:.1}%)  Replies {} ({:.1}%)  Delivered {:.1}%",
        overview.opens,
        overview.open_rate * 100.0,
        overview.replies,
        overview.reply_rate * 100.0,
        overview.delivery_rate * 100.0
    );

    println!();
    for day in services.api.stats_daily(range).await? {
        println!(
            "{}  sent {:>5}  opens {:>5}  clicks {:>5}  replies {:>5}",
            day.date, day.sent, day.opens, day.clicks, day.replies
        );
    }
    Ok(())
}

async fn cmd_inbox(config: &Config, action: InboxAction) -> Result<()> {
    let services = connect(config).await?;
    let baas = services.baas()?;

    match action {
        InboxAction::List { unread } => {
            for email in baas.list_inbox().await? {
                if unread && email.is_read {
                    continue;
                }
                let mark = if email.is_read { " " } else { "*" };
                println!(
                    "{} {:<38} {:<30} {}",
                    mark, email.id, email.sender_email, email.subject
                );
            }
        }
        InboxAction::Recipients => {
            for recipient in baas.inbox_recipients().await? {
                println!("{}", recipient);
            }
        }
        InboxAction::Read { id } => baas.set_inbox_read(&id, true).await?,
        InboxAction::Unread { id } => baas.set_inbox_read(&id, false).await?,
    }
    Ok(())
}

async fn cmd_avatars(config: &Config, action: AvatarAction) -> Result<()> {
    let services = connect(config).await?;
    let baas = services.baas()?;

    match action {
        AvatarAction::Import { zip } => {
            let bytes = std::fs::read(&zip)
                .with_context(|| format!("Failed to read {}", zip.display()))?;
            let report = baas.import_avatars(bytes).await?;
            println!("{}", report.summary());
            for error in &report.errors {
                eprintln!("  {}", error);
            }
        }
    }
    Ok(())
}
