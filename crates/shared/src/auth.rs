//! Authentication types: JWT claims, user roles and the route access table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::UserId;

/// JWT claims for access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: Uuid,
    /// User's role.
    pub role: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user.
    #[must_use]
    pub fn new(user_id: Uuid, role: Role, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            role: role.as_str().to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the user ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        UserId::from_uuid(self.sub)
    }

    /// Parses the role claim. Unknown roles yield `None`.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.role.parse().ok()
    }
}

/// Application roles. Each role gets its own dashboard and route set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Free-tier user.
    Regular,
    /// Paid-tier user.
    Premium,
    /// Platform administrator.
    Admin,
    /// Reviews loan applications on behalf of a bank.
    BankManager,
    /// Disburses approved loans.
    LoanDistributor,
    /// Advises clients on their finances.
    FinancialAdvisor,
}

/// Path prefixes that hold a user's own finance data.
const PERSONAL_FINANCE_PREFIXES: &[&str] = &["/transactions", "/budgets", "/users/me"];

impl Role {
    /// Returns the wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Premium => "premium",
            Self::Admin => "admin",
            Self::BankManager => "bank_manager",
            Self::LoanDistributor => "loan_distributor",
            Self::FinancialAdvisor => "financial_advisor",
        }
    }

    /// Path prefixes this role may reach. `"/"` grants everything.
    #[must_use]
    pub const fn allowed_prefixes(self) -> &'static [&'static str] {
        match self {
            Self::Admin => &["/"],
            Self::Regular | Self::Premium => PERSONAL_FINANCE_PREFIXES,
            Self::BankManager | Self::LoanDistributor | Self::FinancialAdvisor => &[],
        }
    }

    /// Returns true if the role may access `path`.
    ///
    /// A prefix matches only on a segment boundary, so `/budgets` covers
    /// `/budgets/summary` but not `/budgetsx`.
    #[must_use]
    pub fn can_access(self, path: &str) -> bool {
        self.allowed_prefixes().iter().any(|prefix| {
            if *prefix == "/" {
                return true;
            }
            path.strip_prefix(prefix)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        })
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "regular" => Ok(Self::Regular),
            "premium" => Ok(Self::Premium),
            "admin" => Ok(Self::Admin),
            "bank_manager" => Ok(Self::BankManager),
            "loan_distributor" => Ok(Self::LoanDistributor),
            "financial_advisor" => Ok(Self::FinancialAdvisor),
            other => Err(format!("unknown role: {other}")),
        }
    }
}
