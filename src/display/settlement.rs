//! Settlement display formatting

use crate::models::{Parties, Side};
use crate::services::{PartyTotals, Settlement};

use super::format::{format_header, separator};

const WIDTH: usize = 48;

fn totals_row(name: &str, totals: &PartyTotals) -> String {
    format!(
        "{:<14} {:>10} {:>10} {:>10}\n",
        name,
        totals.paid_total.to_string(),
        totals.shared_paid.to_string(),
        totals.fair_share.to_string()
    )
}

/// Format per-party totals and the outcome
pub fn format_settlement(settlement: &Settlement, parties: &Parties) -> String {
    let mut output = String::new();

    output.push_str(&format_header(
        &format!("Settlement ({})", settlement.currency),
        WIDTH,
    ));
    output.push('\n');
    output.push_str(&format!(
        "{:<14} {:>10} {:>10} {:>10}\n",
        "Party", "Paid", "Shared", "Fair share"
    ));
    output.push_str(&separator(WIDTH));
    output.push('\n');
    for side in [Side::First, Side::Second] {
        output.push_str(&totals_row(parties.name(side), settlement.totals(side)));
    }
    for (payer, paid) in &settlement.other_payers {
        output.push_str(&format!("{:<14} {:>10}\n", payer, paid.to_string()));
    }
    output.push_str(&separator(WIDTH));
    output.push('\n');

    output.push_str(&format!(
        "Shared expenses: {}\n",
        settlement.shared_records
    ));
    if settlement.excluded_records > 0 {
        output.push_str(&format!(
            "Left out:        {} (not in {} or unknown payer)\n",
            settlement.excluded_records, settlement.currency
        ));
    }
    output.push('\n');
    output.push_str(&settlement.describe(parties));
    output.push('\n');

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CurrencyCode, ExpenseRecord, Money};
    use crate::services::settle;
    use chrono::NaiveDate;

    #[test]
    fn test_format_settlement() {
        let parties = Parties::new("Alice", "Bob");
        let mut record = ExpenseRecord::new(
            "Alice",
            "Taxi",
            Money::from_cents(10000),
            CurrencyCode::from_static("HKD"),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        );
        record.shared = true;
        let mut foreign = record.clone();
        foreign.currency = CurrencyCode::from_static("EUR");

        let settlement = settle(&[record, foreign], &parties, &CurrencyCode::from_static("HKD"));
        let text = format_settlement(&settlement, &parties);

        assert!(text.contains("Settlement (HKD)"));
        assert!(text.contains("100.00"));
        assert!(text.contains("Left out:        1"));
        assert!(text.trim_end().ends_with("Bob owes Alice 50.00 HKD"));
    }
}
