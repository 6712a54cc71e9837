use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use odoo_portal::actions::{ActionOutcome, PollPolicy, run_instance_action};
use odoo_portal::billing::{format_price, trial_label};
use odoo_portal::models::{BillingPeriod, CurrentUser, InstanceAction, InstanceType, PhaseType};
use odoo_portal::provision::{FlowEffects, Notice, PaymentModal, Route, SubmitOutcome};
use odoo_portal::scope::PageScope;
use odoo_portal::session::MemorySession;
use odoo_portal::{Config, CreateInstancePage, PortalBackend, PortalClient};

#[derive(Parser)]
#[command(name = "odoo-portal", version, about = "Customer portal client for managed Odoo instances")]
struct Cli {
    /// Backend API base URL (overrides PORTAL_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Bearer token (overrides PORTAL_AUTH_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Customer to act for (overrides PORTAL_CUSTOMER_ID)
    #[arg(long, global = true)]
    customer_id: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List plans as the customer would see them
    Plans {
        #[arg(long)]
        period: Option<BillingPeriod>,
    },
    /// Check whether a subdomain is free
    CheckSubdomain { subdomain: String },
    /// Create an instance with a new subscription
    Create {
        #[arg(long)]
        plan: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        subdomain: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        admin_email: Option<String>,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        database_name: Option<String>,
        #[arg(long)]
        odoo_version: Option<String>,
        #[arg(long, default_value = "production")]
        instance_type: InstanceType,
        #[arg(long)]
        demo_data: bool,
        #[arg(long = "addon")]
        addons: Vec<String>,
        /// Skip the trial even when one is offered
        #[arg(long)]
        paid: bool,
    },
    /// Start, stop, restart or back up an instance and wait for it to settle
    InstanceAction {
        instance_id: String,
        action: InstanceAction,
    },
}

/// Prints workflow effects to the terminal.
struct ConsoleEffects;

impl FlowEffects for ConsoleEffects {
    fn navigate(&mut self, route: Route) {
        match route {
            Route::Instances => println!("→ Your instances: run `odoo-portal instance-action` to manage them"),
            Route::Billing => println!("→ Billing: review your subscription and invoices in the portal"),
        }
    }

    fn open_payment_modal(&mut self, modal: PaymentModal) {
        let invoice = &modal.invoice;
        println!("Payment required for subscription {}", modal.subscription_id);
        println!(
            "  Invoice {}: {} {}",
            invoice.id,
            format_price(invoice.amount_due),
            invoice.currency.as_deref().unwrap_or("USD")
        );
        if let Some(due) = invoice.due_date {
            println!("  Due {}", due.format("%b %d, %Y"));
        }
    }

    fn notify(&mut self, notice: Notice) {
        println!("{}", notice.text());
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "odoo_portal=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(url) = cli.api_url {
        config.api_url = url.trim_end_matches('/').to_string();
    }
    if let Some(id) = cli.customer_id {
        config.customer_id = Some(id);
    }
    let token = cli.token.or_else(|| config.auth_token.clone());
    let session = match token {
        Some(token) => MemorySession::with_token(&token),
        None => MemorySession::new(),
    };

    let client = Arc::new(PortalClient::new(&config, Arc::new(session))?);

    match cli.command {
        Command::Plans { period } => list_plans(client, &config, period).await,
        Command::CheckSubdomain { subdomain } => {
            let check = client.check_subdomain(&subdomain).await?;
            let verdict = if check.available { "available" } else { "taken" };
            println!("{}: {} {}", subdomain, verdict, check.message);
            Ok(())
        }
        Command::Create {
            plan,
            name,
            subdomain,
            email,
            admin_email,
            description,
            database_name,
            odoo_version,
            instance_type,
            demo_data,
            addons,
            paid,
        } => {
            let customer_id = require_customer(&config)?;
            let user = CurrentUser::new(customer_id, email);
            let mut page = CreateInstancePage::new(client, user, &config);

            let catalog = page.load().await;
            if let Some(error) = catalog.page_error() {
                bail!("Could not load plans: {}", error);
            }
            if !page.select_plan(&plan) {
                bail!("Unknown plan '{}'", plan);
            }

            page.form.name = name;
            page.form.description = description;
            if let Some(admin_email) = admin_email {
                page.form.admin_email = admin_email;
            }
            if let Some(database_name) = database_name {
                page.form.database_name = database_name;
            }
            if let Some(version) = odoo_version {
                page.form.odoo_version = version;
            }
            page.form.instance_type = instance_type;
            page.form.demo_data = demo_data;
            page.form.custom_addons = addons;
            page.form.phase_toggle = if paid { PhaseType::Evergreen } else { PhaseType::Trial };

            page.set_subdomain(&subdomain);
            page.subdomain_settled().await;

            let mut effects = ConsoleEffects;
            match page.submit(&mut effects).await {
                SubmitOutcome::Blocked(reason) => bail!("{}", reason),
                SubmitOutcome::Failed(message) => bail!("{}", message),
                SubmitOutcome::Cancelled => bail!("Cancelled"),
                SubmitOutcome::AwaitingPayment(_) => {
                    page.close_payment_modal(&mut effects);
                    Ok(())
                }
                SubmitOutcome::TrialStarted(_) | SubmitOutcome::Completed(_) => Ok(()),
            }
        }
        Command::InstanceAction {
            instance_id,
            action,
        } => {
            let policy = PollPolicy {
                max_attempts: config.poll_max_attempts,
                ..PollPolicy::default()
            };
            let outcome =
                run_instance_action(client.as_ref(), &PageScope::new(), &instance_id, action, &policy)
                    .await?;
            match outcome {
                ActionOutcome::Completed(instance) => {
                    println!("{} is now {}", instance.name, instance.status.as_ref());
                    Ok(())
                }
                ActionOutcome::Failed(instance) => bail!(
                    "{} failed: {}",
                    instance.name,
                    instance.error_message.unwrap_or_else(|| "unknown error".to_string())
                ),
                ActionOutcome::TimedOut(status) => bail!(
                    "Gave up waiting; instance is still {}",
                    status.as_ref()
                ),
            }
        }
    }
}

async fn list_plans(
    client: Arc<PortalClient>,
    config: &Config,
    period: Option<BillingPeriod>,
) -> anyhow::Result<()> {
    let customer_id = require_customer(config)?;
    let mut page = CreateInstancePage::new(client, CurrentUser::new(customer_id, ""), config);

    let catalog = page.load().await;
    if let Some(error) = catalog.page_error() {
        bail!("Could not load plans: {}", error);
    }

    let periods = page.billing_periods();
    let period = match period {
        Some(p) => p,
        None => *periods.first().context("No plans available")?,
    };
    page.select_period(period);

    println!(
        "Billing periods: {}",
        periods.iter().map(|p| p.display_name()).collect::<Vec<_>>().join(", ")
    );

    for display in page.display_plans() {
        let plan = &display.plan;
        let Some(summary) = page.price_summary(&plan.name) else {
            continue;
        };

        let mut line = format!("{:<24} {:>10} / {}", plan.name, summary.price, summary.period);
        if let Some(monthly) = &summary.monthly_equivalent {
            line.push_str(&format!("  ({} /mo", monthly));
            if summary.savings_percent > 0 {
                line.push_str(&format!(", save {}%", summary.savings_percent));
            }
            line.push(')');
        }
        if display.display_trial {
            line.push_str(&format!(
                "  {} free trial",
                trial_label(plan.trial_length, plan.trial_time_unit)
            ));
        }
        println!("{}", line);
        println!(
            "    {} CPU, {} RAM, {} storage",
            plan.cpu_limit, plan.memory_limit, plan.storage_limit
        );
    }
    Ok(())
}

fn require_customer(config: &Config) -> anyhow::Result<String> {
    config
        .customer_id
        .clone()
        .context("No customer id: pass --customer-id or set PORTAL_CUSTOMER_ID")
}
