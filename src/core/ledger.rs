//! Ledger records and read access to the document store that owns them.
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::{fs, path::Path};
use tokio::sync::RwLock;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Bank,
    CreditCard,
    Cash,
    Investment,
    Loan,
    Asset,
}

impl AccountType {
    /// Liability accounts hold an amount owed rather than a balance.
    pub fn is_liability(&self) -> bool {
        match self {
            AccountType::CreditCard | AccountType::Loan => true,
            AccountType::Bank | AccountType::Cash | AccountType::Investment | AccountType::Asset => {
                false
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AccountType::Bank => "Bank",
            AccountType::CreditCard => "Credit Card",
            AccountType::Cash => "Cash",
            AccountType::Investment => "Investment",
            AccountType::Loan => "Loan",
            AccountType::Asset => "Asset",
        }
    }
}

impl Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub account_type: AccountType,
    pub balance: Decimal,
    pub currency: String,
    #[serde(default)]
    pub is_business: bool,
}

impl Account {
    /// Signed contribution of this account to net worth, in its own currency.
    pub fn net_worth_contribution(&self) -> Decimal {
        if self.account_type.is_liability() {
            -self.balance.abs()
        } else {
            self.balance
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Income,
    Expense,
    Transfer,
}

impl TransactionType {
    pub fn label(&self) -> &'static str {
        match self {
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expense",
            TransactionType::Transfer => "Transfer",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub account_id: String,
    #[serde(default)]
    pub category_id: Option<String>,
    pub amount: Decimal,
    pub currency: String,
    pub kind: TransactionType,
    pub occurred_at: DateTime<Utc>,
    #[serde(default)]
    pub is_business: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryType {
    Income,
    Expense,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub kind: CategoryType,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: String,
    pub category_id: String,
    pub amount: Decimal,
    pub currency: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub name: String,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub currency: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub is_completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Pending,
    Overdue,
    Paid,
    Void,
}

impl InvoiceStatus {
    pub fn is_terminal(&self) -> bool {
        match self {
            InvoiceStatus::Paid | InvoiceStatus::Void => true,
            InvoiceStatus::Draft | InvoiceStatus::Pending | InvoiceStatus::Overdue => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub client_id: String,
    #[serde(default)]
    pub number: Option<String>,
    pub status: InvoiceStatus,
    pub total: Decimal,
    pub currency: String,
}

fn default_true() -> bool {
    true
}

/// Criteria for a transaction range query. `None` fields match everything;
/// the time range is half-open, `[from, to)`.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub category_id: Option<String>,
    pub account_id: Option<String>,
    pub kind: Option<TransactionType>,
}

impl TransactionFilter {
    pub fn between(from: DateTime<Utc>, to: Option<DateTime<Utc>>) -> Self {
        Self {
            from: Some(from),
            to,
            ..Self::default()
        }
    }

    pub fn matches(&self, transaction: &Transaction) -> bool {
        self.from.is_none_or(|from| transaction.occurred_at >= from)
            && self.to.is_none_or(|to| transaction.occurred_at < to)
            && self
                .category_id
                .as_ref()
                .is_none_or(|id| transaction.category_id.as_ref() == Some(id))
            && self
                .account_id
                .as_ref()
                .is_none_or(|id| &transaction.account_id == id)
            && self.kind.is_none_or(|kind| transaction.kind == kind)
    }
}

/// Read-only access to ledger records.
#[async_trait]
pub trait LedgerReader: Send + Sync {
    async fn list_accounts(&self) -> Result<Vec<Account>>;
    async fn list_transactions(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>>;
    async fn list_categories(&self) -> Result<Vec<Category>>;
    async fn list_budgets(&self) -> Result<Vec<Budget>>;
    async fn list_goals(&self) -> Result<Vec<Goal>>;
    async fn list_clients(&self) -> Result<Vec<Client>>;
    async fn list_invoices(&self) -> Result<Vec<Invoice>>;
}

/// Category writes needed for first-use seeding.
#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// Inserts `category` unless one with the same name and kind exists.
    /// Returns whether it was inserted.
    async fn insert_category_if_absent(&self, category: Category) -> Result<bool>;
}

/// A full copy of every ledger collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerSnapshot {
    pub accounts: Vec<Account>,
    pub transactions: Vec<Transaction>,
    pub categories: Vec<Category>,
    pub budgets: Vec<Budget>,
    pub goals: Vec<Goal>,
    pub clients: Vec<Client>,
    pub invoices: Vec<Invoice>,
}

impl LedgerSnapshot {
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let ledger_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read ledger file: {}", path.as_ref().display()))?;

        let snapshot: Self = serde_yaml::from_str(&ledger_str)
            .with_context(|| format!("Failed to parse ledger file: {}", path.as_ref().display()))?;
        debug!(
            accounts = snapshot.accounts.len(),
            transactions = snapshot.transactions.len(),
            "Loaded ledger"
        );
        Ok(snapshot)
    }
}

/// Process-local ledger holding a snapshot behind a lock.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    data: RwLock<LedgerSnapshot>,
}

impl MemoryLedger {
    pub fn new(snapshot: LedgerSnapshot) -> Self {
        Self {
            data: RwLock::new(snapshot),
        }
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        LedgerSnapshot::load_from_path(path).map(Self::new)
    }
}

#[async_trait]
impl LedgerReader for MemoryLedger {
    async fn list_accounts(&self) -> Result<Vec<Account>> {
        Ok(self.data.read().await.accounts.clone())
    }

    async fn list_transactions(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
        let data = self.data.read().await;
        Ok(data
            .transactions
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect())
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        Ok(self.data.read().await.categories.clone())
    }

    async fn list_budgets(&self) -> Result<Vec<Budget>> {
        Ok(self.data.read().await.budgets.clone())
    }

    async fn list_goals(&self) -> Result<Vec<Goal>> {
        Ok(self.data.read().await.goals.clone())
    }

    async fn list_clients(&self) -> Result<Vec<Client>> {
        Ok(self.data.read().await.clients.clone())
    }

    async fn list_invoices(&self) -> Result<Vec<Invoice>> {
        Ok(self.data.read().await.invoices.clone())
    }
}

#[async_trait]
impl CategoryStore for MemoryLedger {
    async fn insert_category_if_absent(&self, category: Category) -> Result<bool> {
        let mut data = self.data.write().await;
        let exists = data
            .categories
            .iter()
            .any(|c| c.kind == category.kind && c.name.eq_ignore_ascii_case(&category.name));
        if exists {
            return Ok(false);
        }
        data.categories.push(category);
        Ok(true)
    }
}

const DEFAULT_CATEGORIES: &[(&str, &str, CategoryType, &str)] = &[
    ("cat-salary", "Salary", CategoryType::Income, "#22c55e"),
    ("cat-freelance", "Freelance", CategoryType::Income, "#10b981"),
    ("cat-investments", "Investments", CategoryType::Income, "#14b8a6"),
    ("cat-other-income", "Other Income", CategoryType::Income, "#06b6d4"),
    ("cat-housing", "Housing", CategoryType::Expense, "#ef4444"),
    ("cat-food", "Food & Dining", CategoryType::Expense, "#f97316"),
    ("cat-transport", "Transportation", CategoryType::Expense, "#f59e0b"),
    ("cat-utilities", "Utilities", CategoryType::Expense, "#eab308"),
    ("cat-entertainment", "Entertainment", CategoryType::Expense, "#8b5cf6"),
    ("cat-healthcare", "Healthcare", CategoryType::Expense, "#ec4899"),
    ("cat-shopping", "Shopping", CategoryType::Expense, "#6366f1"),
    ("cat-other-expense", "Other Expenses", CategoryType::Expense, "#64748b"),
];

pub fn default_categories() -> Vec<Category> {
    DEFAULT_CATEGORIES
        .iter()
        .map(|(id, name, kind, color)| Category {
            id: id.to_string(),
            name: name.to_string(),
            kind: *kind,
            color: color.to_string(),
        })
        .collect()
}

/// Inserts every default category that is not already present.
///
/// Safe to call repeatedly; returns the number of categories inserted.
pub async fn seed_default_categories(store: &dyn CategoryStore) -> Result<usize> {
    let mut inserted = 0;
    for category in default_categories() {
        if store.insert_category_if_absent(category).await? {
            inserted += 1;
        }
    }
    if inserted > 0 {
        info!("Seeded {} default categories", inserted);
    }
    Ok(inserted)
}
