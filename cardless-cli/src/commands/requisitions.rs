//! Requisition commands - create, inspect and delete bank links

use anyhow::{anyhow, Result};
use colored::Colorize;
use serde_json::json;
use url::Url;

use cardless_core::{Requisition, RequisitionsPage};

use super::{get_client, print_json};
use crate::output;

pub fn list(limit: u32, offset: u32, all: bool, json: bool) -> Result<()> {
    let client = get_client()?;

    let requisitions: Vec<Requisition> = if all {
        let pages = client
            .requisition_pages(limit)
            .collect::<cardless_core::Result<Vec<RequisitionsPage>>>()?;
        pages.into_iter().flat_map(|page| page.items).collect()
    } else {
        let page = client.requisitions(limit, offset)?;
        if json {
            return print_json(&page);
        }
        if let Some(next) = &page.next_page_token {
            output::info(&format!("{} requisitions in total, more at {}", page.total_count, next));
        }
        page.items
    };

    if json {
        return print_json(&requisitions);
    }

    if requisitions.is_empty() {
        output::warning("No requisitions found");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["ID", "Created", "Status", "Institution", "Accounts", "Reference"]);
    for requisition in &requisitions {
        table.add_row(vec![
            requisition.id.clone(),
            output::format_timestamp(&requisition.created_at),
            requisition.status.clone(),
            requisition.institution_id.clone(),
            requisition.account_ids.len().to_string(),
            requisition.reference.clone(),
        ]);
    }
    println!("{}", table);
    Ok(())
}

pub fn show(id: &str, json: bool) -> Result<()> {
    let client = get_client()?;
    let requisition = client.requisition(id)?;

    if json {
        return print_json(&requisition);
    }

    print_requisition(&requisition);
    Ok(())
}

pub fn create(institution_id: &str, redirect: &str, json: bool) -> Result<()> {
    let redirect = Url::parse(redirect)
        .map_err(|e| anyhow!("Invalid redirect URL '{}': {}", redirect, e))?;

    let client = get_client()?;
    let requisition = client.create_requisition(institution_id, &redirect)?;

    if json {
        return print_json(&requisition);
    }

    output::success(&format!("Created requisition {}", requisition.id));
    print_requisition(&requisition);
    println!();
    println!("Open this link to give consent: {}", requisition.consent_link.bold());
    Ok(())
}

pub fn delete(id: &str, json: bool) -> Result<()> {
    let client = get_client()?;
    client.delete_requisition(id)?;

    if json {
        return print_json(&json!({ "deleted": id }));
    }

    output::success(&format!("Deleted requisition {}", id));
    Ok(())
}

fn print_requisition(requisition: &Requisition) {
    let status = if requisition.is_linked() {
        requisition.status.green()
    } else {
        requisition.status.yellow()
    };

    let mut table = output::create_table();
    table.add_row(vec!["ID", requisition.id.as_str()]);
    table.add_row(vec!["Created", &output::format_timestamp(&requisition.created_at)]);
    table.add_row(vec!["Status", &status.to_string()]);
    table.add_row(vec!["Institution", requisition.institution_id.as_str()]);
    table.add_row(vec!["Agreement", requisition.agreement_id.as_str()]);
    table.add_row(vec!["Reference", requisition.reference.as_str()]);
    table.add_row(vec!["Redirect", requisition.redirect_uri.as_str()]);
    table.add_row(vec!["Accounts", &requisition.account_ids.join(", ")]);
    println!("{}", table);
}
