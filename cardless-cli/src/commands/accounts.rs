//! Account commands - details, balances and transactions

use anyhow::Result;
use colored::Colorize;
use comfy_table::Cell;

use cardless_core::{Direction, Money, Transaction};

use super::{get_client, print_json};
use crate::output;

pub fn show(id: &str, json: bool) -> Result<()> {
    let client = get_client()?;
    let account = client.account(id)?;

    if json {
        return print_json(&account);
    }

    println!("{}", account.label().bold());
    println!();

    let mut table = output::create_table();
    table.add_row(vec!["ID", account.id.as_str()]);
    table.add_row(vec!["Institution", account.institution_id.as_str()]);
    table.add_row(vec!["Status", output::or_dash(account.status.as_deref())]);
    table.add_row(vec!["IBAN", output::or_dash(account.iban.as_deref())]);
    table.add_row(vec!["BBAN", output::or_dash(account.bban.as_deref())]);
    table.add_row(vec!["Owner", output::or_dash(account.owner_name.as_deref())]);
    let created = account.created_at.as_ref().map(output::format_timestamp);
    table.add_row(vec!["Created", output::or_dash(created.as_deref())]);
    let accessed = account.last_accessed_at.as_ref().map(output::format_timestamp);
    table.add_row(vec!["Last accessed", output::or_dash(accessed.as_deref())]);
    println!("{}", table);
    Ok(())
}

pub fn balances(account_id: &str, json: bool) -> Result<()> {
    let client = get_client()?;
    let balances = client.balances(account_id)?;

    if json {
        return print_json(&balances);
    }

    if balances.is_empty() {
        output::warning("No balances reported for this account");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["Type", "Amount", "Reference date"]);
    for balance in &balances {
        table.add_row(vec![
            Cell::new(&balance.balance_type),
            output::money_cell(&balance.amount),
            Cell::new(output::format_date(balance.reference_date)),
        ]);
    }
    println!("{}", table);
    Ok(())
}

pub fn transactions(account_id: &str, json: bool) -> Result<()> {
    let client = get_client()?;
    let transactions = client.transactions(account_id)?;

    if json {
        return print_json(&transactions);
    }

    if transactions.is_empty() {
        output::warning("No transactions reported for this account");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["Status", "Date", "Amount", "Counterparty", "Description"]);
    for transaction in transactions.iter() {
        let (status, date, counterparty) = match &transaction {
            Transaction::Booked(booked) => {
                let arrow = match booked.direction() {
                    Direction::Incoming => "from",
                    Direction::Outgoing => "to",
                };
                let counterparty = booked
                    .counterparty_name
                    .as_deref()
                    .map(|name| format!("{} {}", arrow, name));
                ("booked", booked.booking_date.or(booked.value_date), counterparty)
            }
            Transaction::Pending(pending) => ("pending", pending.value_date, None),
        };
        table.add_row(vec![
            Cell::new(status),
            Cell::new(output::format_date(date)),
            output::money_cell(transaction.amount()),
            Cell::new(counterparty.as_deref().unwrap_or("-")),
            Cell::new(output::or_dash(transaction.description())),
        ]);
    }
    println!("{}", table);

    print_totals(&transactions.booked.iter().map(|t| &t.amount).collect::<Vec<_>>());
    if !transactions.pending.is_empty() {
        output::info(&format!("{} pending", transactions.pending.len()));
    }
    Ok(())
}

/// Net booked amount per currency
fn print_totals(amounts: &[&Money]) {
    let mut totals: Vec<Money> = Vec::new();
    for amount in amounts {
        match totals
            .iter_mut()
            .find(|t| t.currency_code == amount.currency_code)
        {
            Some(total) => {
                if let Some(sum) = total.checked_add(amount) {
                    *total = sum;
                }
            }
            None => totals.push((*amount).clone()),
        }
    }
    for total in totals {
        println!("Net booked: {}", total);
    }
}
