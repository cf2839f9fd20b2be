//! Two-party settlement
//!
//! A pure function of the record set: nothing is cached and the result can be
//! re-derived from the ledger on every read.
//!
//! For every shared record in the base currency paid by one of the parties,
//! the amount is divided by the record's split weights (first party's share
//! is rounded to the cent, the second party gets the remainder). The balance
//! is what the first party paid minus what the first party should have paid.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::models::{CurrencyCode, ExpenseRecord, Money, Parties, Side};

/// Totals for one party
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PartyTotals {
    /// Everything this party paid in the base currency, shared or not
    pub paid_total: Money,
    /// Number of records behind `paid_total`
    pub record_count: usize,
    /// What this party paid for shared expenses
    pub shared_paid: Money,
    /// This party's fair share of all shared expenses
    pub fair_share: Money,
}

/// Who owes whom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SettlementOutcome {
    Settled,
    Owes {
        debtor: Side,
        creditor: Side,
        amount: Money,
    },
}

/// Result of settling a set of records
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settlement {
    pub currency: CurrencyCode,
    pub first: PartyTotals,
    pub second: PartyTotals,
    /// Base-currency totals for payers outside the two parties
    pub other_payers: BTreeMap<String, Money>,
    /// `first.shared_paid - first.fair_share`
    pub balance: Money,
    pub outcome: SettlementOutcome,
    /// Shared records that entered the balance
    pub shared_records: usize,
    /// Shared records left out (foreign currency or unknown payer)
    pub excluded_records: usize,
}

impl Settlement {
    pub fn totals(&self, side: Side) -> &PartyTotals {
        match side {
            Side::First => &self.first,
            Side::Second => &self.second,
        }
    }

    fn totals_mut(&mut self, side: Side) -> &mut PartyTotals {
        match side {
            Side::First => &mut self.first,
            Side::Second => &mut self.second,
        }
    }

    /// Fold one record into the totals
    ///
    /// Returns `false` and leaves every total untouched when any of them
    /// would overflow.
    fn add_record(&mut self, record: &ExpenseRecord, side: Option<Side>, in_base: bool) -> bool {
        if !in_base {
            return true;
        }
        let side = match side {
            Some(side) => side,
            None => {
                let other = self.other_payers.get(&record.payer).copied().unwrap_or_default();
                return match other.checked_add(record.amount) {
                    Some(total) => {
                        self.other_payers.insert(record.payer.clone(), total);
                        true
                    }
                    None => false,
                };
            }
        };

        let Some(paid_total) = self.totals(side).paid_total.checked_add(record.amount) else {
            return false;
        };
        if !record.shared {
            self.totals_mut(side).paid_total = paid_total;
            self.totals_mut(side).record_count += 1;
            return true;
        }

        let (first_weight, second_weight) = record.split.weights();
        let (first_weight, second_weight) = (u64::from(first_weight), u64::from(second_weight));
        let first_share = record.amount.share(first_weight, first_weight + second_weight);
        let shared = (
            self.totals(side).shared_paid.checked_add(record.amount),
            self.first.fair_share.checked_add(first_share),
            record
                .amount
                .checked_sub(first_share)
                .and_then(|second_share| self.second.fair_share.checked_add(second_share)),
        );
        let (Some(shared_paid), Some(first_fair), Some(second_fair)) = shared else {
            return false;
        };

        let totals = self.totals_mut(side);
        totals.paid_total = paid_total;
        totals.record_count += 1;
        totals.shared_paid = shared_paid;
        self.first.fair_share = first_fair;
        self.second.fair_share = second_fair;
        self.shared_records += 1;
        true
    }

    pub fn is_settled(&self) -> bool {
        self.outcome == SettlementOutcome::Settled
    }

    /// One-line summary, e.g. "Bob owes Alice 50.00 HKD"
    pub fn describe(&self, parties: &Parties) -> String {
        match self.outcome {
            SettlementOutcome::Settled if self.shared_records == 0 => {
                "Settled: no shared expenses to reconcile".to_string()
            }
            SettlementOutcome::Settled => "Settled: nobody owes anything".to_string(),
            SettlementOutcome::Owes {
                debtor,
                creditor,
                amount,
            } => format!(
                "{} owes {} {} {}",
                parties.name(debtor),
                parties.name(creditor),
                amount,
                self.currency
            ),
        }
    }
}

/// Settle `records` between `parties`, counting only amounts in `base`
pub fn settle(records: &[ExpenseRecord], parties: &Parties, base: &CurrencyCode) -> Settlement {
    let mut settlement = Settlement {
        currency: base.clone(),
        first: PartyTotals::default(),
        second: PartyTotals::default(),
        other_payers: BTreeMap::new(),
        balance: Money::zero(),
        outcome: SettlementOutcome::Settled,
        shared_records: 0,
        excluded_records: 0,
    };

    for record in records {
        let side = parties.side_of(&record.payer);
        let in_base = record.is_in(base);

        if !settlement.add_record(record, side, in_base) {
            warn!(
                payer = %record.payer,
                amount = %record.amount,
                "record left out of settlement, totals would overflow"
            );
            if record.shared {
                settlement.excluded_records += 1;
            }
            continue;
        }

        if record.shared && !(in_base && side.is_some()) {
            debug!(
                payer = %record.payer,
                currency = %record.currency,
                "shared record left out of settlement"
            );
            settlement.excluded_records += 1;
        }
    }

    settlement.balance = settlement.first.shared_paid - settlement.first.fair_share;
    settlement.outcome = if settlement.balance.is_zero() {
        SettlementOutcome::Settled
    } else {
        let creditor = if settlement.balance.is_positive() {
            Side::First
        } else {
            Side::Second
        };
        SettlementOutcome::Owes {
            debtor: creditor.other(),
            creditor,
            amount: settlement.balance.abs(),
        }
    };

    settlement
}
