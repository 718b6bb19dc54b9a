//! Matching strategies: pure scoring functions over one transaction and
//! one invoice
//!
//! Three independent heuristics (exact, fuzzy, partial-payment) keep each
//! rule auditable; the orchestrator keeps the single best-scoring result
//! across all of them.

use bigdecimal::{BigDecimal, ToPrimitive};

use crate::types::*;

/// Fractional payment ratios customers commonly settle in
const COMMON_PAYMENT_RATIOS: [f64; 11] = [
    0.5, 0.6, 0.4, 0.3, 0.2, 0.7, 0.8, 0.25, 0.75, 0.33, 0.67,
];

/// A scoring strategy over one transaction/invoice pair
type Strategy = fn(&BankTransaction, &Invoice, &MatchPolicy) -> Option<MatchScore>;

/// Evaluation order doubles as tie-break priority
const STRATEGIES: [Strategy; 3] = [exact_match, fuzzy_match, partial_payment_match];

/// Tunable thresholds and windows for the matching strategies
#[derive(Debug, Clone)]
pub struct MatchPolicy {
    /// Minimum confidence at which the orchestrator auto-settles
    pub settlement_threshold: f64,
    /// Maximum date gap for an exact match, in days
    pub exact_date_window_days: i64,
    /// Maximum date gap for a fuzzy match, in days
    pub fuzzy_date_window_days: i64,
    /// Maximum relative amount deviation for a fuzzy match
    pub fuzzy_amount_band: f64,
    /// Days after the invoice date a partial payment counts as on time
    pub partial_on_time_days: i64,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            settlement_threshold: 0.70,
            exact_date_window_days: 1,
            fuzzy_date_window_days: 5,
            fuzzy_amount_band: 0.01,
            partial_on_time_days: 90,
        }
    }
}

/// Score and classification produced by a strategy for one pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchScore {
    pub confidence: f64,
    pub match_type: MatchType,
}

/// An invoice paired with the best score any strategy gave it
#[derive(Debug, Clone)]
pub struct MatchCandidate<'a> {
    pub invoice: &'a Invoice,
    pub score: MatchScore,
}

/// Direction pre-filter: customers pay the company (credit in) against
/// sales invoices; the company pays suppliers (debit out) against
/// purchase invoices.
pub fn direction_eligible(transaction: &BankTransaction, invoice: &Invoice) -> bool {
    match transaction.direction {
        TransactionDirection::Credit => invoice.invoice_type == InvoiceType::Sales,
        TransactionDirection::Debit => invoice.invoice_type == InvoiceType::Purchase,
    }
}

/// Exact match: amount to the cent, dates adjacent
///
/// Confidence 0.98 when the bank reference and invoice number overlap,
/// 0.95 on amount and date alone.
pub fn exact_match(
    transaction: &BankTransaction,
    invoice: &Invoice,
    policy: &MatchPolicy,
) -> Option<MatchScore> {
    if !amounts_match(&transaction.amount, &invoice.amount) {
        return None;
    }

    if let Some(invoice_date) = invoice.invoice_date {
        let gap = (transaction.date - invoice_date).num_days().abs();
        if gap > policy.exact_date_window_days {
            return None;
        }
    }

    if let Some(reference) = transaction.reference.as_deref() {
        if contains_either_way(reference, &invoice.invoice_number) {
            return Some(MatchScore {
                confidence: 0.98,
                match_type: MatchType::Exact,
            });
        }
    }

    Some(MatchScore {
        confidence: 0.95,
        match_type: MatchType::Exact,
    })
}

/// Fuzzy match: amount within 1%, date within 5 days
///
/// The trailing 0.85 factor caps fuzzy confidence below the exact-match
/// ceiling, so fuzzy never outranks a true exact match on the same pair.
pub fn fuzzy_match(
    transaction: &BankTransaction,
    invoice: &Invoice,
    policy: &MatchPolicy,
) -> Option<MatchScore> {
    if invoice.amount <= BigDecimal::from(0) {
        return None;
    }

    let diff_ratio = ratio(
        &(&transaction.amount - &invoice.amount).abs(),
        &invoice.amount,
    )?;
    if diff_ratio > policy.fuzzy_amount_band {
        return None;
    }

    let date_confidence = match invoice.invoice_date {
        Some(invoice_date) => {
            let gap = (transaction.date - invoice_date).num_days().abs();
            if gap > policy.fuzzy_date_window_days {
                return None;
            }
            1.0 - (gap as f64 / policy.fuzzy_date_window_days as f64) * 0.2
        }
        None => 0.5,
    };

    let amount_confidence = 1.0 - diff_ratio * 10.0;
    let confidence = (amount_confidence * 0.7 + date_confidence * 0.3) * 0.85;

    Some(MatchScore {
        confidence,
        match_type: MatchType::Fuzzy,
    })
}

/// Partial-payment match: the transaction covers part of the invoice and
/// the narration names the invoice
///
/// Reported as `Fuzzy`; the partial semantics are carried through the
/// settlement amount rather than a distinct stored match type.
pub fn partial_payment_match(
    transaction: &BankTransaction,
    invoice: &Invoice,
    policy: &MatchPolicy,
) -> Option<MatchScore> {
    if invoice.amount <= BigDecimal::from(0) || transaction.amount >= invoice.amount {
        return None;
    }

    let via_reference = transaction
        .reference
        .as_deref()
        .is_some_and(|r| mentions_invoice(r, &invoice.invoice_number));
    let via_description = transaction
        .description
        .as_deref()
        .is_some_and(|d| mentions_invoice(d, &invoice.invoice_number));

    let reference_confidence = if via_reference {
        0.95
    } else if via_description {
        0.85
    } else {
        return None;
    };

    let date_confidence = match invoice.invoice_date {
        Some(invoice_date) => {
            let days = (transaction.date - invoice_date).num_days();
            if days < 0 {
                // Advance payment, penalized
                0.7
            } else if days <= policy.partial_on_time_days {
                1.0
            } else {
                let late = (days - policy.partial_on_time_days) as f64;
                (0.7 - (late / 275.0) * 0.2).max(0.5)
            }
        }
        None => 0.7,
    };

    let payment_ratio = ratio(&transaction.amount, &invoice.amount)?;
    let amount_confidence = if COMMON_PAYMENT_RATIOS
        .iter()
        .any(|r| (payment_ratio - r).abs() <= 0.01)
    {
        0.9
    } else {
        0.75
    };

    let confidence =
        (reference_confidence * 0.5 + amount_confidence * 0.3 + date_confidence * 0.2) * 0.85;

    Some(MatchScore {
        confidence,
        match_type: MatchType::Fuzzy,
    })
}

/// Best score across all strategies for one pair
///
/// Strategies are tried exact, fuzzy, partial; a later strategy replaces
/// an earlier one only on a strictly higher score, so exact wins ties.
pub fn score_pair(
    transaction: &BankTransaction,
    invoice: &Invoice,
    policy: &MatchPolicy,
) -> Option<MatchScore> {
    STRATEGIES
        .iter()
        .filter_map(|strategy| strategy(transaction, invoice, policy))
        .fold(None, |best: Option<MatchScore>, score| match best {
            Some(b) if score.confidence <= b.confidence => Some(b),
            _ => Some(score),
        })
}

/// Best candidate across all direction-eligible invoices, as a pure
/// reduction: first-found wins ties
pub fn best_candidate<'a>(
    transaction: &BankTransaction,
    invoices: &'a [Invoice],
    policy: &MatchPolicy,
) -> Option<MatchCandidate<'a>> {
    invoices
        .iter()
        .filter(|invoice| direction_eligible(transaction, invoice))
        .filter_map(|invoice| {
            score_pair(transaction, invoice, policy).map(|score| MatchCandidate { invoice, score })
        })
        .fold(None, |best: Option<MatchCandidate<'a>>, candidate| {
            match best {
                Some(b) if candidate.score.confidence <= b.score.confidence => Some(b),
                _ => Some(candidate),
            }
        })
}

/// Case-insensitive substring containment in either direction
fn contains_either_way(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    a.contains(&b) || b.contains(&a)
}

/// Whether free text names an invoice, either by full number or by the
/// number's prefix before a `-`/`_` separator. Prefixes shorter than
/// three characters match nearly anything and are ignored.
fn mentions_invoice(text: &str, invoice_number: &str) -> bool {
    if contains_either_way(text, invoice_number) {
        return true;
    }

    let prefix = invoice_number
        .split(['-', '_'])
        .next()
        .unwrap_or_default();
    prefix.len() >= 3 && contains_either_way(text, prefix)
}

/// Relative value of `num` against `den` as a float, when representable
fn ratio(num: &BigDecimal, den: &BigDecimal) -> Option<f64> {
    let num = num.to_f64()?;
    let den = den.to_f64()?;
    if den == 0.0 {
        return None;
    }
    Some(num / den)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tax::gst::GstBreakdown;
    use crate::types::Party;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sales_invoice(amount: i64, number: &str, invoice_date: NaiveDate) -> Invoice {
        Invoice::sales(
            format!("inv-{number}"),
            "co1",
            Party::new("b1", "Kiran Enterprises"),
            number,
            BigDecimal::from(amount),
            BigDecimal::from(amount),
            GstBreakdown::none(),
        )
        .with_invoice_date(invoice_date)
    }

    fn credit_txn(amount: i64, txn_date: NaiveDate) -> BankTransaction {
        BankTransaction::new(
            "t1",
            "co1",
            txn_date,
            BigDecimal::from(amount),
            TransactionDirection::Credit,
        )
    }

    #[test]
    fn exact_match_on_amount_and_date() {
        let invoice = sales_invoice(11800, "INV-001", date(2024, 3, 1));
        let txn = credit_txn(11800, date(2024, 3, 1));
        let score = exact_match(&txn, &invoice, &MatchPolicy::default()).unwrap();
        assert_eq!(score.match_type, MatchType::Exact);
        assert_eq!(score.confidence, 0.95);
    }

    #[test]
    fn exact_match_with_reference_overlap() {
        let invoice = sales_invoice(11800, "INV-001", date(2024, 3, 1));
        let txn = credit_txn(11800, date(2024, 3, 2)).with_reference("payment inv-001 march");
        let score = exact_match(&txn, &invoice, &MatchPolicy::default()).unwrap();
        assert_eq!(score.confidence, 0.98);
    }

    #[test]
    fn exact_match_rejects_wide_date_gap() {
        let invoice = sales_invoice(11800, "INV-001", date(2024, 3, 1));
        let txn = credit_txn(11800, date(2024, 3, 5));
        assert!(exact_match(&txn, &invoice, &MatchPolicy::default()).is_none());
    }

    #[test]
    fn exact_match_rejects_amount_off_by_a_rupee() {
        let invoice = sales_invoice(11800, "INV-001", date(2024, 3, 1));
        let txn = credit_txn(11799, date(2024, 3, 1));
        assert!(exact_match(&txn, &invoice, &MatchPolicy::default()).is_none());
    }

    #[test]
    fn fuzzy_match_near_amount_and_date() {
        // 0.42% amount deviation, 3 day gap
        let invoice = sales_invoice(11800, "INV-001", date(2024, 3, 1));
        let txn = credit_txn(11750, date(2024, 3, 4));
        let score = fuzzy_match(&txn, &invoice, &MatchPolicy::default()).unwrap();
        assert_eq!(score.match_type, MatchType::Fuzzy);
        assert!((score.confidence - 0.794).abs() < 0.005);
    }

    #[test]
    fn fuzzy_confidence_stays_below_exact_floor() {
        let invoice = sales_invoice(10000, "INV-001", date(2024, 3, 1));
        let txn = credit_txn(10000, date(2024, 3, 1));
        let score = fuzzy_match(&txn, &invoice, &MatchPolicy::default()).unwrap();
        assert!(score.confidence < 0.95);
    }

    #[test]
    fn fuzzy_match_rejects_amount_beyond_band() {
        let invoice = sales_invoice(10000, "INV-001", date(2024, 3, 1));
        let txn = credit_txn(9800, date(2024, 3, 1));
        assert!(fuzzy_match(&txn, &invoice, &MatchPolicy::default()).is_none());
    }

    #[test]
    fn fuzzy_match_without_invoice_date_uses_neutral_confidence() {
        let mut invoice = sales_invoice(10000, "INV-001", date(2024, 3, 1));
        invoice.invoice_date = None;
        let txn = credit_txn(10000, date(2024, 3, 20));
        let score = fuzzy_match(&txn, &invoice, &MatchPolicy::default()).unwrap();
        // (1.0 * 0.7 + 0.5 * 0.3) * 0.85
        assert!((score.confidence - 0.7225).abs() < 1e-9);
    }

    #[test]
    fn partial_match_on_common_ratio_with_reference() {
        let invoice = sales_invoice(10000, "INV-2024-001", date(2024, 3, 1));
        let txn = credit_txn(5000, date(2024, 3, 10)).with_reference("INV-2024-001 part 1");
        let score = partial_payment_match(&txn, &invoice, &MatchPolicy::default()).unwrap();
        assert_eq!(score.match_type, MatchType::Fuzzy);
        // (0.95*0.5 + 0.9*0.3 + 1.0*0.2) * 0.85
        assert!((score.confidence - 0.80325).abs() < 1e-9);
    }

    #[test]
    fn partial_match_via_description_scores_lower() {
        let invoice = sales_invoice(10000, "INV-2024-001", date(2024, 3, 1));
        let with_ref = credit_txn(5000, date(2024, 3, 10)).with_reference("INV-2024-001");
        let with_desc = credit_txn(5000, date(2024, 3, 10)).with_description("INV-2024-001 part");

        let ref_score = partial_payment_match(&with_ref, &invoice, &MatchPolicy::default())
            .unwrap()
            .confidence;
        let desc_score = partial_payment_match(&with_desc, &invoice, &MatchPolicy::default())
            .unwrap()
            .confidence;
        assert!(ref_score > desc_score);
    }

    #[test]
    fn partial_match_accepts_invoice_number_prefix() {
        let invoice = sales_invoice(10000, "INV2024-001", date(2024, 3, 1));
        let txn = credit_txn(5000, date(2024, 3, 10)).with_reference("NEFT INV2024 PART");
        assert!(partial_payment_match(&txn, &invoice, &MatchPolicy::default()).is_some());
    }

    #[test]
    fn partial_match_requires_textual_evidence() {
        let invoice = sales_invoice(10000, "INV-2024-001", date(2024, 3, 1));
        let txn = credit_txn(5000, date(2024, 3, 10));
        assert!(partial_payment_match(&txn, &invoice, &MatchPolicy::default()).is_none());
    }

    #[test]
    fn partial_match_rejects_amount_at_or_above_invoice() {
        let invoice = sales_invoice(10000, "INV-2024-001", date(2024, 3, 1));
        let txn = credit_txn(10000, date(2024, 3, 10)).with_reference("INV-2024-001");
        assert!(partial_payment_match(&txn, &invoice, &MatchPolicy::default()).is_none());
    }

    #[test]
    fn partial_match_penalizes_advance_payment() {
        let invoice = sales_invoice(10000, "INV-2024-001", date(2024, 3, 10));
        let on_time = credit_txn(5000, date(2024, 3, 20)).with_reference("INV-2024-001");
        let advance = credit_txn(5000, date(2024, 3, 1)).with_reference("INV-2024-001");

        let on_time_score = partial_payment_match(&on_time, &invoice, &MatchPolicy::default())
            .unwrap()
            .confidence;
        let advance_score = partial_payment_match(&advance, &invoice, &MatchPolicy::default())
            .unwrap()
            .confidence;
        assert!(on_time_score > advance_score);
    }

    #[test]
    fn partial_match_decays_for_very_late_payment() {
        let invoice = sales_invoice(10000, "INV-2024-001", date(2024, 1, 1));
        let late = credit_txn(5000, date(2024, 8, 1)).with_reference("INV-2024-001");
        let very_late = credit_txn(5000, date(2025, 6, 1)).with_reference("INV-2024-001");

        let late_score = partial_payment_match(&late, &invoice, &MatchPolicy::default())
            .unwrap()
            .confidence;
        let very_late_score = partial_payment_match(&very_late, &invoice, &MatchPolicy::default())
            .unwrap()
            .confidence;
        assert!(late_score < 0.80325);
        assert!(very_late_score < late_score);
        // Floor at 0.5 date confidence
        assert!((very_late_score - (0.95 * 0.5 + 0.9 * 0.3 + 0.5 * 0.2) * 0.85).abs() < 1e-9);
    }

    #[test]
    fn uncommon_ratio_scores_lower_than_common() {
        let invoice = sales_invoice(10000, "INV-2024-001", date(2024, 3, 1));
        let half = credit_txn(5000, date(2024, 3, 10)).with_reference("INV-2024-001");
        let odd = credit_txn(4321, date(2024, 3, 10)).with_reference("INV-2024-001");

        let half_score = partial_payment_match(&half, &invoice, &MatchPolicy::default())
            .unwrap()
            .confidence;
        let odd_score = partial_payment_match(&odd, &invoice, &MatchPolicy::default())
            .unwrap()
            .confidence;
        assert!(half_score > odd_score);
    }

    #[test]
    fn direction_prefilter_blocks_credit_against_purchase() {
        let purchase = Invoice::purchase(
            "inv-p",
            "co1",
            Party::new("v1", "Sharma Supplies"),
            "PUR-1",
            BigDecimal::from(1000),
            BigDecimal::from(1000),
            GstBreakdown::none(),
        );
        let txn = credit_txn(1000, date(2024, 3, 1));
        assert!(!direction_eligible(&txn, &purchase));
        assert!(best_candidate(&txn, &[purchase], &MatchPolicy::default()).is_none());
    }

    #[test]
    fn score_pair_prefers_exact_over_fuzzy() {
        let invoice = sales_invoice(10000, "INV-001", date(2024, 3, 1));
        let txn = credit_txn(10000, date(2024, 3, 1));
        let score = score_pair(&txn, &invoice, &MatchPolicy::default()).unwrap();
        assert_eq!(score.match_type, MatchType::Exact);
        assert_eq!(score.confidence, 0.95);
    }

    #[test]
    fn best_candidate_picks_highest_confidence() {
        let exact = sales_invoice(10000, "INV-A", date(2024, 3, 1));
        let fuzzy = sales_invoice(10040, "INV-B", date(2024, 3, 1));
        let txn = credit_txn(10000, date(2024, 3, 1));

        let invoices = vec![fuzzy, exact];
        let best = best_candidate(&txn, &invoices, &MatchPolicy::default()).unwrap();
        assert_eq!(best.invoice.invoice_number, "INV-A");
        assert_eq!(best.score.match_type, MatchType::Exact);
    }

    #[test]
    fn best_candidate_keeps_first_on_tie() {
        let first = sales_invoice(10000, "INV-A", date(2024, 3, 1));
        let second = sales_invoice(10000, "INV-B", date(2024, 3, 1));
        let txn = credit_txn(10000, date(2024, 3, 1));

        let invoices = vec![first, second];
        let best = best_candidate(&txn, &invoices, &MatchPolicy::default()).unwrap();
        assert_eq!(best.invoice.invoice_number, "INV-A");
    }
}
