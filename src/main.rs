mod cli;
mod ui;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use cli::{Cli, Command, SerialAction};
use rentflow::Portal;
use rentflow::config::RentflowConfig;
use rentflow::outbox::Notification;
use rentflow::workflow::NewAgreement;
use ui::Printer;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    let mut config = RentflowConfig::load()?;
    if let Some(path) = cli.store {
        config.store_path = path;
    }
    tracing::debug!(store = %config.store_path.display(), "opening document");

    let portal = Portal::open(&config);
    let printer = Printer::new(cli.json);

    if let Err(err) = run(cli.command, &portal, &config, &printer) {
        printer.error(&err);
        std::process::exit(1);
    }
    Ok(())
}

fn run(
    command: Command,
    portal: &Portal,
    config: &RentflowConfig,
    printer: &Printer,
) -> rentflow::Result<()> {
    match command {
        Command::Create {
            id,
            kind,
            tenant,
            landlord,
            property,
            contact,
        } => {
            let agreement = portal.create(NewAgreement {
                id,
                kind: kind.into(),
                tenant_id: tenant,
                landlord_id: landlord,
                property_id: property,
                tenant_contact: contact,
            })?;
            printer.agreement(&agreement);
        }
        Command::Show { id } => printer.agreement(&portal.get(&id)?),
        Command::List => printer.agreements(&portal.list()?),
        Command::Transition {
            id,
            event,
            actor,
            note,
        } => {
            let actor = actor.unwrap_or_else(|| config.system_actor.clone());
            let agreement = portal.transition(&id, &event, &actor, note.as_deref())?;
            printer.agreement(&agreement);
        }
        Command::Serial { action } => match action {
            SerialAction::Next { prefix } => printer.value(portal.next_serial(&prefix)?),
            SerialAction::Peek { prefix } => printer.value(portal.peek_serial(&prefix)?),
            SerialAction::Reset { prefix, value } => {
                printer.value(portal.reset_counter(&prefix, value)?)
            }
        },
        Command::Thread { id, text, author } => {
            printer.thread_item(&portal.append_thread(&id, author.as_deref(), &text)?);
        }
        Command::Enqueue {
            channel,
            to,
            subject,
            task,
            text,
        } => {
            let item = portal.enqueue(Notification {
                channel,
                to,
                subject,
                text,
                task_id: task,
            })?;
            printer.outbox(std::slice::from_ref(&item));
        }
        Command::Outbox { limit } => printer.outbox(&portal.list_outbox(limit)?),
        Command::Mark { id, status, error } => {
            let item = portal.mark_outbox(&id, status.into(), error)?;
            printer.outbox(std::slice::from_ref(&item));
        }
    }
    Ok(())
}
