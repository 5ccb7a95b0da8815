//! Service record display formatting
//!
//! Formats service records for terminal output in table and detail views.

use chrono::NaiveDate;

use super::currency::format_currency;
use crate::models::{parse_amount, LegKind, ServiceRecord};

fn format_due(date: Option<NaiveDate>, date_format: &str) -> String {
    date.map(|d| d.format(date_format).to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn leg_status(record: &ServiceRecord, kind: LegKind) -> &'static str {
    match (record.due_date(kind), record.is_leg_cleared(kind)) {
        (None, _) => "",
        (Some(_), true) if kind.is_inflow() => "received",
        (Some(_), true) => "paid",
        (Some(_), false) => "open",
    }
}

fn rev_share_status(record: &ServiceRecord) -> &'static str {
    match (record.rev_share_due_date, record.rev_share_paid) {
        (None, _) => "",
        (Some(_), true) => "paid",
        (Some(_), false) => "open",
    }
}

/// Format a list of service records as a table
pub fn format_service_list(records: &[ServiceRecord], date_format: &str) -> String {
    if records.is_empty() {
        return "No services found.".to_string();
    }

    let client_width = records
        .iter()
        .map(|r| r.client_name().len())
        .max()
        .unwrap_or(6)
        .max(6);

    let type_width = records
        .iter()
        .map(|r| r.service_type.len())
        .max()
        .unwrap_or(7)
        .max(7);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<12}  {:<client_width$}  {:<type_width$}  {:>12}  {:>12}  {:>12}\n",
        "ID",
        "Client",
        "Service",
        "GSPR",
        "Commission",
        "COSP",
        client_width = client_width,
        type_width = type_width,
    ));
    output.push_str(&format!(
        "{:-<12}  {:-<client_width$}  {:-<type_width$}  {:->12}  {:->12}  {:->12}\n",
        "",
        "",
        "",
        "",
        "",
        "",
        client_width = client_width,
        type_width = type_width,
    ));

    for record in records {
        output.push_str(&format!(
            "{:<12}  {:<client_width$}  {:<type_width$}  {:>12}  {:>12}  {:>12}\n",
            record.id.short(),
            record.client_name(),
            record.service_type,
            format_currency(record.gspr_amount()),
            format_currency(record.commission_amount()),
            format_currency(record.cosp_amount()),
            client_width = client_width,
            type_width = type_width,
        ));

        let dues: Vec<String> = LegKind::ALL
            .iter()
            .filter(|&&kind| record.due_date(kind).is_some())
            .map(|&kind| {
                format!(
                    "{} {} ({})",
                    kind,
                    format_due(record.due_date(kind), date_format),
                    leg_status(record, kind)
                )
            })
            .collect();
        let dues: Vec<String> = dues
            .into_iter()
            .chain(record.rev_share_due_date.map(|due| {
                format!(
                    "Rev share {} ({})",
                    format_due(Some(due), date_format),
                    rev_share_status(record)
                )
            }))
            .collect();
        if !dues.is_empty() {
            output.push_str(&format!("{:<12}  due: {}\n", "", dues.join(", ")));
        }
    }

    output
}

/// Format a single service record's details
pub fn format_service_details(record: &ServiceRecord, date_format: &str) -> String {
    let mut output = String::new();

    let title = if record.client_name().is_empty() {
        "(no client)".to_string()
    } else {
        record.client_name()
    };
    output.push_str(&format!("Service: {}\n", title));
    output.push_str(&format!("  ID:           {}\n", record.id.as_uuid()));
    if !record.service_type.is_empty() {
        output.push_str(&format!("  Type:         {}\n", record.service_type));
    }
    output.push('\n');

    output.push_str(&format!(
        "  GSPR:         {:>14}  due {:<10}  {}\n",
        format_currency(record.gspr_amount()),
        format_due(record.gspr_due_date, date_format),
        leg_status(record, LegKind::Gspr)
    ));
    output.push_str(&format!(
        "  Commission:   {:>14}  due {:<10}  {}\n",
        format_currency(record.commission_amount()),
        format_due(record.comm_due_date, date_format),
        leg_status(record, LegKind::Commission)
    ));
    if record.gross_sales_commissionable.is_some() || record.commission_percent.is_some() {
        output.push_str(&format!(
            "    on {} at {}%\n",
            format_currency(parse_amount(record.gross_sales_commissionable.as_deref())),
            record.commission_percent.as_deref().unwrap_or("0").trim()
        ));
    }
    if !record.agent.is_empty() {
        output.push_str(&format!("    agent {}\n", record.agent));
    }
    output.push_str(&format!(
        "  COSP:         {:>14}  due {:<10}  {}\n",
        format_currency(record.cosp_amount()),
        format_due(record.cosp_due_date, date_format),
        leg_status(record, LegKind::Cosp)
    ));
    if record.revenue_share_payable.is_some() || record.rev_share_due_date.is_some() {
        output.push_str(&format!(
            "  Rev share:    {:>14}  due {:<10}  {}\n",
            format_currency(record.rev_share_amount()),
            format_due(record.rev_share_due_date, date_format),
            rev_share_status(record)
        ));
        if !record.rev_share_counterparty.is_empty() {
            output.push_str(&format!("    to {}\n", record.rev_share_counterparty));
        }
    }

    if !record.notes.is_empty() {
        output.push('\n');
        output.push_str(&format!("  Notes: {}\n", record.notes));
    }

    output.push('\n');
    output.push_str(&format!(
        "  Created:  {}\n",
        record.created_at.format("%Y-%m-%d %H:%M UTC")
    ));
    output.push_str(&format!(
        "  Modified: {}\n",
        record.updated_at.format("%Y-%m-%d %H:%M UTC")
    ));

    output
}
