//! Service CLI commands
//!
//! Implements CLI commands for service record management.

use clap::{Args, Subcommand};

use super::{parse_date, parse_leg};
use crate::config::settings::Settings;
use crate::display::record::{format_service_details, format_service_list};
use crate::error::CashflowResult;
use crate::events::ChangeBus;
use crate::services::{RecordService, ServiceFields};
use crate::storage::Storage;

/// Record fields shared by `add` and `edit`
#[derive(Args, Debug, Default)]
pub struct ServiceArgs {
    /// Client first name
    #[arg(long)]
    pub first: Option<String>,
    /// Client last name
    #[arg(long)]
    pub last: Option<String>,
    /// Kind of service rendered
    #[arg(short = 't', long = "type")]
    pub service_type: Option<String>,
    /// Free-form notes
    #[arg(short, long)]
    pub notes: Option<String>,
    /// Gross sales price receivable (e.g. "1,250.00")
    #[arg(long)]
    pub gspr: Option<String>,
    /// GSPR due date (YYYY-MM-DD)
    #[arg(long)]
    pub gspr_due: Option<String>,
    /// Gross sales amount the commission is computed on
    #[arg(long)]
    pub commissionable: Option<String>,
    /// Commission rate in percent (e.g. "10")
    #[arg(long)]
    pub percent: Option<String>,
    /// Commission due date (YYYY-MM-DD)
    #[arg(long)]
    pub comm_due: Option<String>,
    /// Cost of sales payable
    #[arg(long)]
    pub cosp: Option<String>,
    /// COSP due date (YYYY-MM-DD)
    #[arg(long)]
    pub cosp_due: Option<String>,
    /// Agent the commission is collected from
    #[arg(long)]
    pub agent: Option<String>,
    /// Revenue share payable
    #[arg(long)]
    pub rev_share: Option<String>,
    /// Revenue share due date (YYYY-MM-DD)
    #[arg(long)]
    pub rev_share_due: Option<String>,
    /// Who the revenue share is owed to
    #[arg(long = "rev-share-to")]
    pub rev_share_to: Option<String>,
}

impl ServiceArgs {
    fn into_fields(self) -> CashflowResult<ServiceFields> {
        Ok(ServiceFields {
            client_first_name: self.first,
            client_last_name: self.last,
            service_type: self.service_type,
            notes: self.notes,
            agent: self.agent,
            gross_sales_price_receivable: self.gspr,
            gross_sales_commissionable: self.commissionable,
            commission_percent: self.percent,
            cost_of_sales_payable: self.cosp,
            gspr_due_date: self.gspr_due.as_deref().map(parse_date).transpose()?,
            comm_due_date: self.comm_due.as_deref().map(parse_date).transpose()?,
            cosp_due_date: self.cosp_due.as_deref().map(parse_date).transpose()?,
            revenue_share_payable: self.rev_share,
            rev_share_due_date: self.rev_share_due.as_deref().map(parse_date).transpose()?,
            rev_share_counterparty: self.rev_share_to,
            clear_legs: Vec::new(),
            clear_rev_share: false,
        })
    }
}

/// Service subcommands
#[derive(Subcommand)]
pub enum ServiceCommands {
    /// Record a new service
    Add {
        #[command(flatten)]
        fields: ServiceArgs,
    },
    /// List all services
    List,
    /// Show service details
    Show {
        /// Service ID (e.g. svc-1a2b3c4d)
        service: String,
    },
    /// Edit a service
    Edit {
        /// Service ID
        service: String,
        #[command(flatten)]
        fields: ServiceArgs,
        /// Remove a leg's amounts and due date (gspr, commission, cosp, revshare)
        #[arg(long = "remove-leg")]
        remove_legs: Vec<String>,
    },
    /// Delete a service
    Remove {
        /// Service ID
        service: String,
    },
    /// Mark a leg or the revenue share as collected, received or paid
    Clear {
        /// Service ID
        service: String,
        /// What to clear (gspr, commission, cosp, revshare)
        #[arg(short, long)]
        leg: String,
        /// Mark the leg as outstanding again
        #[arg(long)]
        undo: bool,
    },
}

/// Handle a service command
pub fn handle_service_command(
    storage: &Storage,
    settings: &Settings,
    bus: &ChangeBus,
    cmd: ServiceCommands,
) -> CashflowResult<()> {
    let service = RecordService::new(storage, bus);

    match cmd {
        ServiceCommands::Add { fields } => {
            let record = service.create(fields.into_fields()?)?;

            println!("Created service: {}", record.id);
            if !record.client_name().is_empty() {
                println!("  Client: {}", record.client_name());
            }
            for leg in record.legs() {
                println!("  {} due {}", leg.kind, leg.due_date.format(&settings.date_format));
            }
            if let Some(due) = record.rev_share_due_date {
                println!("  Revenue share due {}", due.format(&settings.date_format));
            }
        }

        ServiceCommands::List => {
            let records = service.list()?;
            print!("{}", format_service_list(&records, &settings.date_format));
        }

        ServiceCommands::Show { service: query } => {
            let record = service.find(&query)?;
            print!("{}", format_service_details(&record, &settings.date_format));
        }

        ServiceCommands::Edit {
            service: query,
            fields,
            remove_legs,
        } => {
            let found = service.find(&query)?;

            let mut fields = fields.into_fields()?;
            for name in &remove_legs {
                match parse_leg(name)?.leg() {
                    Some(leg) => fields.clear_legs.push(leg),
                    None => fields.clear_rev_share = true,
                }
            }

            let updated = service.update(found.id, fields)?;
            if updated.updated_at == found.updated_at {
                println!("No changes specified.");
            } else {
                println!("Updated service: {}", updated.id);
            }
        }

        ServiceCommands::Remove { service: query } => {
            let found = service.find(&query)?;
            let removed = service.delete(found.id)?;
            println!("Deleted service: {}", removed.id);
        }

        ServiceCommands::Clear {
            service: query,
            leg,
            undo,
        } => {
            let kind = parse_leg(&leg)?;
            let found = service.find(&query)?;
            service.set_due_cleared(found.id, kind, !undo)?;

            let status = match (undo, kind.is_receivable()) {
                (true, _) => "outstanding",
                (false, true) => "received",
                (false, false) => "paid",
            };
            println!("Marked {} of {} as {}", kind, found.id, status);
        }
    }

    Ok(())
}
