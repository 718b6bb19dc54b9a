//! GST (Goods and Services Tax) component amounts for Indian tax compliance

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::types::{amount_tolerance, ReconcileError, ReconcileResult};

/// GST component amounts carried by an invoice
///
/// Indian GST rule: an inter-state invoice carries IGST alone, an
/// intra-state invoice carries CGST and SGST together (in equal halves).
/// The two forms are mutually exclusive on a single invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GstBreakdown {
    /// Integrated GST amount (inter-state)
    pub igst_amount: BigDecimal,
    /// Central GST amount (intra-state)
    pub cgst_amount: BigDecimal,
    /// State GST amount (intra-state)
    pub sgst_amount: BigDecimal,
}

impl GstBreakdown {
    /// An invoice with no GST component
    pub fn none() -> Self {
        Self {
            igst_amount: BigDecimal::from(0),
            cgst_amount: BigDecimal::from(0),
            sgst_amount: BigDecimal::from(0),
        }
    }

    /// Inter-state breakdown: the whole GST amount is IGST
    pub fn inter_state(total_gst: BigDecimal) -> Self {
        Self {
            igst_amount: total_gst,
            cgst_amount: BigDecimal::from(0),
            sgst_amount: BigDecimal::from(0),
        }
    }

    /// Intra-state breakdown: the GST amount is split equally into CGST + SGST
    pub fn intra_state(total_gst: BigDecimal) -> Self {
        let half = &total_gst / BigDecimal::from(2);
        Self {
            igst_amount: BigDecimal::from(0),
            cgst_amount: half.clone(),
            sgst_amount: half,
        }
    }

    /// Explicit component amounts, as extracted from the invoice
    pub fn from_components(
        igst_amount: BigDecimal,
        cgst_amount: BigDecimal,
        sgst_amount: BigDecimal,
    ) -> Self {
        Self {
            igst_amount,
            cgst_amount,
            sgst_amount,
        }
    }

    /// Total GST amount across all components
    pub fn total(&self) -> BigDecimal {
        &self.igst_amount + &self.cgst_amount + &self.sgst_amount
    }

    /// Whether any component is populated
    pub fn has_any(&self) -> bool {
        self.total() > BigDecimal::from(0)
    }

    /// Whether the invoice is an inter-state supply (IGST populated)
    pub fn is_inter_state(&self) -> bool {
        self.igst_amount > BigDecimal::from(0)
    }

    /// Validate the mutual-exclusivity rule between IGST and CGST/SGST
    pub fn validate(&self) -> ReconcileResult<()> {
        let zero = BigDecimal::from(0);

        if self.igst_amount < zero || self.cgst_amount < zero || self.sgst_amount < zero {
            return Err(ReconcileError::Validation(
                "GST component amounts must not be negative".to_string(),
            ));
        }

        if self.igst_amount > zero && (self.cgst_amount > zero || self.sgst_amount > zero) {
            return Err(ReconcileError::Validation(
                "Invoice cannot carry IGST together with CGST/SGST".to_string(),
            ));
        }

        // CGST and SGST are equal halves of the intra-state rate
        if (&self.cgst_amount - &self.sgst_amount).abs() > amount_tolerance() {
            return Err(ReconcileError::Validation(format!(
                "CGST and SGST must be equal for intra-state invoices: {} != {}",
                self.cgst_amount, self.sgst_amount
            )));
        }

        Ok(())
    }
}

impl Default for GstBreakdown {
    fn default() -> Self {
        Self::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inter_state_breakdown() {
        let gst = GstBreakdown::inter_state(BigDecimal::from(180));
        assert_eq!(gst.igst_amount, BigDecimal::from(180));
        assert_eq!(gst.cgst_amount, BigDecimal::from(0));
        assert_eq!(gst.sgst_amount, BigDecimal::from(0));
        assert_eq!(gst.total(), BigDecimal::from(180));
        assert!(gst.is_inter_state());
        assert!(gst.validate().is_ok());
    }

    #[test]
    fn intra_state_breakdown() {
        let gst = GstBreakdown::intra_state(BigDecimal::from(180));
        assert_eq!(gst.igst_amount, BigDecimal::from(0));
        assert_eq!(gst.cgst_amount, BigDecimal::from(90));
        assert_eq!(gst.sgst_amount, BigDecimal::from(90));
        assert_eq!(gst.total(), BigDecimal::from(180));
        assert!(!gst.is_inter_state());
        assert!(gst.validate().is_ok());
    }

    #[test]
    fn mixed_components_rejected() {
        let gst = GstBreakdown::from_components(
            BigDecimal::from(100),
            BigDecimal::from(50),
            BigDecimal::from(50),
        );
        assert!(gst.validate().is_err());
    }

    #[test]
    fn unequal_cgst_sgst_rejected() {
        let gst = GstBreakdown::from_components(
            BigDecimal::from(0),
            BigDecimal::from(90),
            BigDecimal::from(80),
        );
        assert!(gst.validate().is_err());
    }

    #[test]
    fn no_gst_is_valid() {
        let gst = GstBreakdown::none();
        assert!(!gst.has_any());
        assert!(gst.validate().is_ok());
    }
}
