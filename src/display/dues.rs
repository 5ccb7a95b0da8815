//! Outstanding dues display formatting

use super::currency::format_currency;
use crate::services::dues::{totals, DueItem};

/// Format outstanding items as a table with receivable/payable totals
pub fn format_due_list(items: &[DueItem], date_format: &str) -> String {
    if items.is_empty() {
        return "Nothing outstanding.".to_string();
    }

    let kind_width = items
        .iter()
        .map(|i| i.kind.to_string().len())
        .max()
        .unwrap_or(4)
        .max(4);

    let client_width = items
        .iter()
        .map(|i| i.client.len())
        .max()
        .unwrap_or(6)
        .max(6);

    let party_width = items
        .iter()
        .map(|i| i.counterparty.len())
        .max()
        .unwrap_or(12)
        .max(12);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<10}  {:<kind_width$}  {:<client_width$}  {:<party_width$}  {:>14}  {:<12}\n",
        "Due",
        "Kind",
        "Client",
        "Counterparty",
        "Amount",
        "ID",
        kind_width = kind_width,
        client_width = client_width,
        party_width = party_width,
    ));
    output.push_str(&format!(
        "{:-<10}  {:-<kind_width$}  {:-<client_width$}  {:-<party_width$}  {:->14}  {:-<12}\n",
        "",
        "",
        "",
        "",
        "",
        "",
        kind_width = kind_width,
        client_width = client_width,
        party_width = party_width,
    ));

    for item in items {
        output.push_str(&format!(
            "{:<10}  {:<kind_width$}  {:<client_width$}  {:<party_width$}  {:>14}  {:<12}\n",
            item.due_date.format(date_format).to_string(),
            item.kind.to_string(),
            item.client,
            item.counterparty,
            format_currency(item.amount),
            item.record_id.short(),
            kind_width = kind_width,
            client_width = client_width,
            party_width = party_width,
        ));
    }

    let (receivable, payable) = totals(items);
    output.push('\n');
    output.push_str(&format!("Receivable: {}\n", format_currency(receivable)));
    output.push_str(&format!("Payable:    {}\n", format_currency(payable)));

    output
}
