//! Response decoder - JSON payloads to domain entities
//!
//! Pure functions over already-parsed JSON. Optional fields that are missing
//! or `null` decode to `None`; a missing required field is a contract
//! violation, since it means the API changed shape.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;

use crate::domain::result::{Error, Result};
use crate::domain::{
    AccessGrant, Account, Balance, BookedTransaction, CounterpartyAccount, Credential, Direction,
    Institution, Money, PendingTransaction, Requisition, RequisitionsPage, TransactionsResult,
};

// =============================================================================
// API Response Models
// =============================================================================

/// Response of the secret-credential exchange
#[derive(Debug, Deserialize)]
struct TokenPairResponse {
    access: String,
    access_expires: i64,
    refresh: String,
    refresh_expires: i64,
}

/// Response of the token refresh
#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    access: String,
    access_expires: i64,
}

#[derive(Debug, Deserialize)]
struct InstitutionResponse {
    id: String,
    name: String,
    bic: String,
    #[serde(default, deserialize_with = "deserialize_optional_days")]
    transaction_total_days: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_optional_days")]
    max_access_valid_for_days: Option<u32>,
    #[serde(default)]
    logo: Option<String>,
    #[serde(default)]
    countries: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct RequisitionResponse {
    id: String,
    created: DateTime<FixedOffset>,
    redirect: String,
    status: String,
    institution_id: String,
    agreement: String,
    reference: String,
    #[serde(default)]
    accounts: Option<Vec<String>>,
    link: String,
}

#[derive(Debug, Deserialize)]
struct RequisitionsPageResponse {
    count: u64,
    #[serde(default)]
    next: Option<String>,
    #[serde(default)]
    previous: Option<String>,
    results: Vec<JsonValue>,
}

#[derive(Debug, Deserialize)]
struct AccountResponse {
    id: String,
    #[serde(default)]
    created: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    last_accessed: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    iban: Option<String>,
    #[serde(default)]
    bban: Option<String>,
    #[serde(default)]
    status: Option<String>,
    institution_id: String,
    #[serde(default)]
    owner_name: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BalancesResponse {
    balances: Vec<JsonValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BalanceResponse {
    balance_amount: AmountResponse,
    balance_type: String,
    #[serde(default)]
    reference_date: Option<NaiveDate>,
}

/// Currency + amount pair; the amount is kept as an exact decimal
#[derive(Debug, Deserialize)]
struct AmountResponse {
    currency: String,
    #[serde(deserialize_with = "deserialize_amount")]
    amount: Decimal,
}

#[derive(Debug, Deserialize)]
struct TransactionsResponse {
    transactions: TransactionsSection,
}

#[derive(Debug, Deserialize)]
struct TransactionsSection {
    #[serde(default)]
    booked: Option<Vec<JsonValue>>,
    #[serde(default)]
    pending: Option<Vec<JsonValue>>,
}

/// Remittance fields shared by booked and pending records
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemittanceInformation {
    #[serde(default)]
    remittance_information_unstructured: Option<String>,
    #[serde(default)]
    remittance_information_structured: Option<String>,
    #[serde(default)]
    remittance_information_unstructured_array: Option<JsonValue>,
    #[serde(default)]
    remittance_information_structured_array: Option<JsonValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookedTransactionResponse {
    #[serde(default)]
    transaction_id: Option<String>,
    #[serde(default)]
    internal_transaction_id: Option<String>,
    transaction_amount: AmountResponse,
    #[serde(default)]
    booking_date: Option<NaiveDate>,
    #[serde(default)]
    value_date: Option<NaiveDate>,
    #[serde(default)]
    debtor_name: Option<String>,
    #[serde(default)]
    debtor_account: Option<JsonValue>,
    #[serde(default)]
    creditor_name: Option<String>,
    #[serde(default)]
    creditor_account: Option<JsonValue>,
    #[serde(default)]
    additional_information: Option<String>,
    #[serde(flatten)]
    remittance: RemittanceInformation,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PendingTransactionResponse {
    transaction_amount: AmountResponse,
    #[serde(default)]
    value_date: Option<NaiveDate>,
    #[serde(default)]
    additional_information: Option<String>,
    #[serde(flatten)]
    remittance: RemittanceInformation,
}

/// Deserialize an amount from its decimal string
///
/// JSON numbers are rejected: by the time serde_json hands them over they
/// are already `f64` and may have lost digits.
fn deserialize_amount<'de, D>(deserializer: D) -> std::result::Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let value: JsonValue = Deserialize::deserialize(deserializer)?;
    match value {
        JsonValue::String(s) => s
            .trim()
            .parse::<Decimal>()
            .map_err(|e| D::Error::custom(format!("invalid decimal '{}': {}", s, e))),
        JsonValue::Number(n) => Err(D::Error::custom(format!(
            "amount must be a decimal string, got number {}",
            n
        ))),
        _ => Err(D::Error::custom("expected a decimal string for amount")),
    }
}

/// Deserialize a day count that can be number, numeric string, or null
fn deserialize_optional_days<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let value: Option<JsonValue> = Option::deserialize(deserializer)?;
    match value {
        Some(JsonValue::Number(n)) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid day count: {}", n))),
        Some(JsonValue::String(s)) if s.trim().is_empty() => Ok(None),
        Some(JsonValue::String(s)) => s
            .trim()
            .parse::<u32>()
            .map(Some)
            .map_err(|e| D::Error::custom(format!("invalid day count '{}': {}", s, e))),
        Some(JsonValue::Null) | None => Ok(None),
        _ => Err(D::Error::custom("expected number or string for day count")),
    }
}

fn parse<'a, T: Deserialize<'a>>(json: &'a JsonValue, entity: &str) -> Result<T> {
    T::deserialize(json)
        .map_err(|e| Error::contract(format!("Unexpected {} payload: {}", entity, e), Some(e)))
}

// =============================================================================
// Decoders
// =============================================================================

/// Decode the secret-credential exchange response into a credential issued at `issued_at`
pub fn credential(json: &JsonValue, issued_at: DateTime<Utc>) -> Result<Credential> {
    let token: TokenPairResponse = parse(json, "token")?;
    Ok(Credential::new(
        token.access,
        lifetime(token.access_expires, "access_expires")?,
        token.refresh,
        lifetime(token.refresh_expires, "refresh_expires")?,
        issued_at,
    ))
}

/// Decode the refresh endpoint response
pub fn access_grant(json: &JsonValue) -> Result<AccessGrant> {
    let token: AccessTokenResponse = parse(json, "access token")?;
    Ok(AccessGrant {
        access_token: token.access,
        access_expires: lifetime(token.access_expires, "access_expires")?,
    })
}

/// Token lifetime in seconds; values chrono cannot represent are rejected
fn lifetime(seconds: i64, field: &str) -> Result<Duration> {
    Duration::try_seconds(seconds)
        .ok_or_else(|| Error::contract(format!("{} out of range: {}", field, seconds), None))
}

pub fn money(json: &JsonValue) -> Result<Money> {
    let amount: AmountResponse = parse(json, "amount")?;
    Ok(map_amount(amount))
}

fn map_amount(amount: AmountResponse) -> Money {
    Money::new(amount.currency, amount.amount)
}

pub fn institution(json: &JsonValue) -> Result<Institution> {
    let inst: InstitutionResponse = parse(json, "institution")?;
    Ok(Institution {
        id: inst.id,
        name: inst.name,
        bic: inst.bic,
        transaction_total_days: inst.transaction_total_days,
        max_access_valid_for_days: inst.max_access_valid_for_days,
        logo_url: inst.logo,
        countries: inst.countries.unwrap_or_default(),
    })
}

/// Decode the institution listing, a bare JSON array
pub fn institutions(json: &JsonValue) -> Result<Vec<Institution>> {
    let items = json
        .as_array()
        .ok_or_else(|| Error::contract("Expected an array of institutions", None))?;
    items.iter().map(institution).collect()
}

pub fn requisition(json: &JsonValue) -> Result<Requisition> {
    let req: RequisitionResponse = parse(json, "requisition")?;
    Ok(Requisition {
        id: req.id,
        created_at: req.created,
        redirect_uri: req.redirect,
        status: req.status,
        institution_id: req.institution_id,
        agreement_id: req.agreement,
        reference: req.reference,
        account_ids: req.accounts.unwrap_or_default(),
        consent_link: req.link,
    })
}

pub fn requisitions_page(json: &JsonValue) -> Result<RequisitionsPage> {
    let page: RequisitionsPageResponse = parse(json, "requisitions page")?;
    let items = page
        .results
        .iter()
        .map(requisition)
        .collect::<Result<Vec<_>>>()?;
    Ok(RequisitionsPage {
        total_count: page.count,
        next_page_token: page.next,
        previous_page_token: page.previous,
        items,
    })
}

pub fn account(json: &JsonValue) -> Result<Account> {
    let acc: AccountResponse = parse(json, "account")?;
    Ok(Account {
        id: acc.id,
        created_at: acc.created,
        last_accessed_at: acc.last_accessed,
        iban: acc.iban,
        bban: acc.bban,
        status: acc.status,
        institution_id: acc.institution_id,
        owner_name: acc.owner_name,
        display_name: acc.name,
    })
}

/// Decode `{"balances": [...]}`
pub fn balances(json: &JsonValue) -> Result<Vec<Balance>> {
    let response: BalancesResponse = parse(json, "balances")?;
    response.balances.iter().map(balance).collect()
}

fn balance(json: &JsonValue) -> Result<Balance> {
    let bal: BalanceResponse = parse(json, "balance")?;
    Ok(Balance {
        amount: map_amount(bal.balance_amount),
        balance_type: bal.balance_type,
        reference_date: bal.reference_date,
    })
}

/// Decode `{"transactions": {"booked": [...], "pending": [...]}}`
pub fn transactions(json: &JsonValue) -> Result<TransactionsResult> {
    let response: TransactionsResponse = parse(json, "transactions")?;
    let booked = response
        .transactions
        .booked
        .unwrap_or_default()
        .iter()
        .map(booked_transaction)
        .collect::<Result<Vec<_>>>()?;
    let pending = response
        .transactions
        .pending
        .unwrap_or_default()
        .iter()
        .map(pending_transaction)
        .collect::<Result<Vec<_>>>()?;
    Ok(TransactionsResult { booked, pending })
}

/// Decode one record of the `booked` section
///
/// Banks fill either the debtor or the creditor side. Money received
/// (positive amount) takes the debtor as counterparty, anything else the
/// creditor.
pub fn booked_transaction(json: &JsonValue) -> Result<BookedTransaction> {
    let tx: BookedTransactionResponse = parse(json, "booked transaction")?;

    let transaction_id = tx
        .transaction_id
        .or(tx.internal_transaction_id)
        .ok_or_else(|| Error::contract("Booked transaction without transactionId", None))?;

    let amount = map_amount(tx.transaction_amount);
    let direction = Direction::of(&amount);
    let (counterparty_name, counterparty_account) = match direction {
        Direction::Incoming => (tx.debtor_name, tx.debtor_account),
        Direction::Outgoing => (tx.creditor_name, tx.creditor_account),
    };

    Ok(BookedTransaction {
        transaction_id,
        counterparty_name,
        counterparty_account: counterparty_account.as_ref().and_then(counterparty),
        counterparty_role: direction.counterparty_role(),
        amount,
        booking_date: tx.booking_date,
        value_date: tx.value_date,
        description: description(tx.remittance),
        additional_info: tx.additional_information,
    })
}

/// Decode one record of the `pending` section
pub fn pending_transaction(json: &JsonValue) -> Result<PendingTransaction> {
    let tx: PendingTransactionResponse = parse(json, "pending transaction")?;
    Ok(PendingTransaction {
        amount: map_amount(tx.transaction_amount),
        value_date: tx.value_date,
        description: description(tx.remittance),
        additional_info: tx.additional_information,
    })
}

/// Account reference; anything other than an object is treated as absent
fn counterparty(json: &JsonValue) -> Option<CounterpartyAccount> {
    let object = json.as_object()?;
    let iban = object
        .get("iban")
        .and_then(JsonValue::as_str)
        .map(str::to_string);
    Some(CounterpartyAccount { iban })
}

/// Pick the description; order matters:
/// unstructured, structured, then the JSON text of either array form.
fn description(remittance: RemittanceInformation) -> Option<String> {
    remittance
        .remittance_information_unstructured
        .or(remittance.remittance_information_structured)
        .or_else(|| {
            remittance
                .remittance_information_unstructured_array
                .or(remittance.remittance_information_structured_array)
                .map(|array| array.to_string())
        })
}
