//! Institution commands - browse the banks available per country

use anyhow::Result;
use colored::Colorize;

use cardless_core::Institution;

use super::{get_client, print_json};
use crate::output;

fn days(value: Option<u32>) -> String {
    value.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
}

pub fn list(country: &str, json: bool) -> Result<()> {
    let client = get_client()?;
    let institutions = client.institutions(country)?;

    if json {
        return print_json(&institutions);
    }

    if institutions.is_empty() {
        output::warning(&format!("No institutions found for country '{}'", country));
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["ID", "Name", "BIC", "History (days)", "Access (days)"]);
    for institution in &institutions {
        table.add_row(vec![
            institution.id.clone(),
            institution.name.clone(),
            institution.bic.clone(),
            days(institution.transaction_total_days),
            days(institution.max_access_valid_for_days),
        ]);
    }

    println!("{}", table);
    println!("{} institutions", institutions.len());
    Ok(())
}

pub fn show(id: &str, json: bool) -> Result<()> {
    let client = get_client()?;
    let institution = client.institution(id)?;

    if json {
        return print_json(&institution);
    }

    print_institution(&institution);
    Ok(())
}

fn print_institution(institution: &Institution) {
    println!("{}", institution.name.bold());
    println!();

    let mut table = output::create_table();
    table.add_row(vec!["ID", institution.id.as_str()]);
    table.add_row(vec!["BIC", institution.bic.as_str()]);
    table.add_row(vec!["Transaction history (days)", &days(institution.transaction_total_days)]);
    table.add_row(vec!["Max access (days)", &days(institution.max_access_valid_for_days)]);
    table.add_row(vec!["Countries", &institution.countries.join(", ")]);
    table.add_row(vec!["Logo", output::or_dash(institution.logo_url.as_deref())]);
    println!("{}", table);
}
