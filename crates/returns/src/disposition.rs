//! Per-item disposition sub-records and their transitions.
//!
//! A returned line item is resolved either by a replacement unit or by a
//! refund. The two paths carry disjoint data, so they are modelled as variants
//! of [`Disposition`] rather than one record with optional fields.

use core::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use storefront_core::{DispositionId, DomainError, DomainResult, Money};

/// Which resolution path a line item takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DispositionType {
    Replacement,
    Refund,
}

impl core::fmt::Display for DispositionType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DispositionType::Replacement => f.write_str("Replacement"),
            DispositionType::Refund => f.write_str("Refund"),
        }
    }
}

impl FromStr for DispositionType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "replacement" => Ok(DispositionType::Replacement),
            "refund" => Ok(DispositionType::Refund),
            other => Err(DomainError::validation(format!(
                "disposition type must be one of: Replacement, Refund (got '{other}')"
            ))),
        }
    }
}

/// Replacement lifecycle. Ordered: a status may only move to a greater one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ReplacementStatus {
    Pending,
    Processing,
    Completed,
}

impl core::fmt::Display for ReplacementStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            ReplacementStatus::Pending => "Pending",
            ReplacementStatus::Processing => "Processing",
            ReplacementStatus::Completed => "Completed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplacementDisposition {
    pub id: DispositionId,
    pub created_date: NaiveDate,
    pub status: ReplacementStatus,
    /// Whether the replacement was a new unit (false: refurbished). Meaningful once Completed.
    pub is_new_unit: bool,
}

impl ReplacementDisposition {
    pub fn new(created_date: NaiveDate) -> Self {
        Self {
            id: DispositionId::new(),
            created_date,
            status: ReplacementStatus::Pending,
            is_new_unit: false,
        }
    }

    /// Move to `Processing`.
    ///
    /// Returns `Ok(false)` when already processing (nothing changed).
    pub fn mark_processing(&mut self) -> DomainResult<bool> {
        match self.status {
            ReplacementStatus::Pending => {
                self.status = ReplacementStatus::Processing;
                Ok(true)
            }
            ReplacementStatus::Processing => Ok(false),
            ReplacementStatus::Completed => Err(DomainError::invalid_transition(
                "replacement is already Completed and cannot return to Processing",
            )),
        }
    }

    /// Move to the terminal `Completed` status, recording the unit kind.
    pub fn mark_completed(&mut self, is_new_unit: bool) -> DomainResult<()> {
        if self.status == ReplacementStatus::Completed {
            return Err(DomainError::invalid_transition("replacement is already Completed"));
        }
        self.status = ReplacementStatus::Completed;
        self.is_new_unit = is_new_unit;
        Ok(())
    }
}

/// Accepted refund payment methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RefundMethod {
    Cash,
    #[serde(rename = "Credit Card")]
    CreditCard,
    #[serde(rename = "Bank Transfer")]
    BankTransfer,
    Cheque,
}

impl RefundMethod {
    pub const ALL: [RefundMethod; 4] = [
        RefundMethod::Cash,
        RefundMethod::CreditCard,
        RefundMethod::BankTransfer,
        RefundMethod::Cheque,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RefundMethod::Cash => "Cash",
            RefundMethod::CreditCard => "Credit Card",
            RefundMethod::BankTransfer => "Bank Transfer",
            RefundMethod::Cheque => "Cheque",
        }
    }
}

impl core::fmt::Display for RefundMethod {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RefundMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        RefundMethod::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                DomainError::validation(format!(
                    "refund method must be one of: Cash, Credit Card, Bank Transfer, Cheque (got '{wanted}')"
                ))
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundDisposition {
    pub id: DispositionId,
    pub created_date: NaiveDate,
    pub amount: Money,
    /// `None` until the refund is recorded.
    pub method: Option<RefundMethod>,
}

impl RefundDisposition {
    /// Zero-amount placeholder created when the return order is committed.
    pub fn placeholder(created_date: NaiveDate) -> Self {
        Self {
            id: DispositionId::new(),
            created_date,
            amount: Money::ZERO,
            method: None,
        }
    }

    /// Set (or edit) the refunded amount and method.
    pub fn record(&mut self, amount: Money, method: RefundMethod) -> DomainResult<()> {
        if amount.is_negative() {
            return Err(DomainError::validation("refund amount cannot be negative"));
        }
        self.amount = amount;
        self.method = Some(method);
        Ok(())
    }

    pub fn is_recorded(&self) -> bool {
        self.method.is_some()
    }
}

/// Disposition sub-record, tagged by type.
///
/// Serialized as `{"dispositionType": "...", "disposition": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "dispositionType", content = "disposition")]
pub enum Disposition {
    Replacement(ReplacementDisposition),
    Refund(RefundDisposition),
}

impl Disposition {
    /// Fresh sub-record in the initial status for `ty`.
    pub fn initial(ty: DispositionType, created_date: NaiveDate) -> Self {
        match ty {
            DispositionType::Replacement => Disposition::Replacement(ReplacementDisposition::new(created_date)),
            DispositionType::Refund => Disposition::Refund(RefundDisposition::placeholder(created_date)),
        }
    }

    pub fn disposition_type(&self) -> DispositionType {
        match self {
            Disposition::Replacement(_) => DispositionType::Replacement,
            Disposition::Refund(_) => DispositionType::Refund,
        }
    }

    pub fn id(&self) -> DispositionId {
        match self {
            Disposition::Replacement(r) => r.id,
            Disposition::Refund(r) => r.id,
        }
    }

    /// Nothing has happened since the sub-record was created.
    pub fn is_initial(&self) -> bool {
        match self {
            Disposition::Replacement(r) => r.status == ReplacementStatus::Pending,
            Disposition::Refund(r) => !r.is_recorded(),
        }
    }

    /// No further action is expected on this item.
    pub fn is_settled(&self) -> bool {
        match self {
            Disposition::Replacement(r) => r.status == ReplacementStatus::Completed,
            Disposition::Refund(r) => r.is_recorded(),
        }
    }

    pub fn as_replacement_mut(&mut self) -> DomainResult<&mut ReplacementDisposition> {
        match self {
            Disposition::Replacement(r) => Ok(r),
            Disposition::Refund(_) => Err(DomainError::invalid_transition(
                "line item is routed to Refund, not Replacement",
            )),
        }
    }

    pub fn as_refund_mut(&mut self) -> DomainResult<&mut RefundDisposition> {
        match self {
            Disposition::Refund(r) => Ok(r),
            Disposition::Replacement(_) => Err(DomainError::invalid_transition(
                "line item is routed to Replacement, not Refund",
            )),
        }
    }
}
