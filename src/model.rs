use serde::{Deserialize, Serialize};
use ts_rs::TS;

pub const GENERIC_FAIL: &str = "GENERIC/FAIL";
pub const GENERIC_FAIL_MESSAGE: &str = "Something went wrong. Please try again.";

pub const AUTH_INVALID_EMAIL: &str = "AUTH/INVALID_EMAIL";
pub const AUTH_EMAIL_TAKEN: &str = "AUTH/EMAIL_TAKEN";
pub const AUTH_WEAK_PASSWORD: &str = "AUTH/WEAK_PASSWORD";
pub const AUTH_INVALID_CREDENTIALS: &str = "AUTH/INVALID_CREDENTIALS";

pub const HOUSEHOLD_NOT_FOUND: &str = "HOUSEHOLD/NOT_FOUND";
pub const HOUSEHOLD_ROLE_REQUIRED: &str = "HOUSEHOLD/ROLE_REQUIRED";
pub const HOUSEHOLD_LAST_OWNER: &str = "HOUSEHOLD/LAST_OWNER";
pub const HOUSEHOLD_MEMBER_MISSING: &str = "HOUSEHOLD/MEMBER_NOT_FOUND";

pub const VALIDATION_HOUSEHOLD_MISMATCH: &str = "VALIDATION/HOUSEHOLD_MISMATCH";

pub const ONBOARDING_NAME_REQUIRED: &str = "ONBOARDING/NAME_REQUIRED";

pub const TASKS_TITLE_REQUIRED: &str = "TASKS/TITLE_REQUIRED";
pub const TASKS_NOT_FOUND: &str = "TASKS/NOT_FOUND";

pub const CALENDAR_TITLE_REQUIRED: &str = "CALENDAR/TITLE_REQUIRED";
pub const CALENDAR_NOT_FOUND: &str = "CALENDAR/NOT_FOUND";
pub const CALENDAR_INVALID_MONTH: &str = "CALENDAR/INVALID_MONTH";

pub const BUDGET_INVALID_RANGE: &str = "BUDGET/INVALID_RANGE";
pub const BUDGET_INVALID_AMOUNT: &str = "BUDGET/INVALID_AMOUNT";
pub const BUDGET_NOT_FOUND: &str = "BUDGET/NOT_FOUND";

pub const INVITES_DUPLICATE: &str = "INVITES/DUPLICATE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Role {
    Owner,
    Member,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Member => "member",
        }
    }

    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "owner" => Some(Role::Owner),
            "member" => Some(Role::Member),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub full_name: Option<String>,
    pub onboard_success: bool,
    #[ts(type = "number")]
    pub created_at: i64,
    #[ts(type = "number")]
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Household {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub created_by: Option<String>,
    #[ts(type = "number")]
    pub created_at: i64,
    #[ts(type = "number")]
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Membership {
    pub household_id: String,
    pub user_id: String,
    pub role: Role,
    #[ts(type = "number")]
    pub created_at: i64,
}

/// Membership row joined with the user's profile, as the account screen lists it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MemberProfile {
    pub user_id: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub full_name: Option<String>,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Task {
    pub id: String,
    pub household_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional, type = "number")]
    pub due_date: Option<i64>,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub assigned_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub status: Option<String>,
    #[ts(type = "number")]
    pub created_at: i64,
    #[ts(type = "number")]
    pub updated_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional, type = "number")]
    pub deleted_at: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "dueDate")]
    pub due_date: Option<i64>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Field edits from the task dialog; `None` leaves the column untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<Option<String>>,
    #[serde(default, alias = "dueDate")]
    pub due_date: Option<Option<i64>>,
    #[serde(default)]
    pub priority: Option<Option<String>>,
    #[serde(default)]
    pub status: Option<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CalendarEvent {
    pub id: String,
    pub household_id: String,
    pub title: String,
    #[ts(type = "number")]
    pub event_date: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub event_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub created_by: Option<String>,
    #[ts(type = "number")]
    pub created_at: i64,
    #[ts(type = "number")]
    pub updated_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional, type = "number")]
    pub deleted_at: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewEvent {
    pub title: String,
    #[serde(alias = "eventDate")]
    pub event_date: i64,
    #[serde(default, alias = "eventLocation")]
    pub event_location: Option<String>,
    #[serde(default, alias = "createdBy")]
    pub created_by: Option<String>,
}

/// One month of the shared calendar: tasks due plus events scheduled.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CalendarMonth {
    pub tasks: Vec<Task>,
    pub events: Vec<CalendarEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Budget {
    pub id: String,
    pub household_id: String,
    pub name: String,
    /// Inclusive period bounds, `YYYY-MM-DD`.
    pub start_date: String,
    pub end_date: String,
    pub total_amount: f64,
    #[ts(type = "number")]
    pub created_at: i64,
    #[ts(type = "number")]
    pub updated_at: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BudgetInput {
    pub name: String,
    #[serde(alias = "startDate")]
    pub start_date: String,
    #[serde(alias = "endDate")]
    pub end_date: String,
    #[serde(alias = "totalAmount")]
    pub total_amount: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum TransactionType {
    Bill,
    Contribution,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Bill => "bill",
            TransactionType::Contribution => "contribution",
        }
    }

    pub fn parse(value: &str) -> Option<TransactionType> {
        match value {
            "bill" => Some(TransactionType::Bill),
            "contribution" => Some(TransactionType::Contribution),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Transaction {
    pub id: String,
    pub household_id: String,
    pub transaction_type: TransactionType,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub created_by: Option<String>,
    #[ts(type = "number")]
    pub created_at: i64,
}

/// Active budget with the ledger totals computed in one place.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BudgetSummary {
    pub budget: Budget,
    pub total_bills: f64,
    pub total_contributions: f64,
    pub remaining: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Declined,
}

impl InvitationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Accepted => "accepted",
            InvitationStatus::Declined => "declined",
        }
    }

    pub fn parse(value: &str) -> Option<InvitationStatus> {
        match value {
            "pending" => Some(InvitationStatus::Pending),
            "accepted" => Some(InvitationStatus::Accepted),
            "declined" => Some(InvitationStatus::Declined),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Invitation {
    pub id: String,
    pub household_id: String,
    pub invitee_email: String,
    pub inviter_id: String,
    pub status: InvitationStatus,
    #[ts(type = "number")]
    pub created_at: i64,
    #[ts(type = "number")]
    pub updated_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_text() {
        assert_eq!(Role::parse(Role::Owner.as_str()), Some(Role::Owner));
        assert_eq!(Role::parse(Role::Member.as_str()), Some(Role::Member));
        assert_eq!(Role::parse("admin"), None);
    }

    #[test]
    fn transaction_type_serializes_lowercase() {
        let json = serde_json::to_string(&TransactionType::Bill).unwrap();
        assert_eq!(json, "\"bill\"");
        let back: TransactionType = serde_json::from_str("\"contribution\"").unwrap();
        assert_eq!(back, TransactionType::Contribution);
    }

    #[test]
    fn invitation_status_defaults_parse() {
        assert_eq!(
            InvitationStatus::parse("pending"),
            Some(InvitationStatus::Pending)
        );
        assert_eq!(InvitationStatus::parse("expired"), None);
    }
}
