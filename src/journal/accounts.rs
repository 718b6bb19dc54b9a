//! Chart-of-account constants used by engine postings

/// A posting target in the chart of accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Account {
    pub code: &'static str,
    pub name: &'static str,
}

pub const BANK: Account = Account {
    code: "1200",
    name: "Bank A/c",
};

pub const SALES: Account = Account {
    code: "4100",
    name: "Sales A/c",
};

pub const PURCHASE_EXPENSES: Account = Account {
    code: "5100",
    name: "Purchase Expenses",
};

pub const IGST_PAYABLE: Account = Account {
    code: "2310",
    name: "IGST Payable A/c",
};

pub const CGST_PAYABLE: Account = Account {
    code: "2320",
    name: "CGST Payable A/c",
};

pub const SGST_PAYABLE: Account = Account {
    code: "2330",
    name: "SGST Payable A/c",
};

pub const IGST_INPUT: Account = Account {
    code: "2311",
    name: "IGST Input A/c",
};

pub const CGST_INPUT: Account = Account {
    code: "2321",
    name: "CGST Input A/c",
};

pub const SGST_INPUT: Account = Account {
    code: "2331",
    name: "SGST Input A/c",
};

pub const IGST_SETTLEMENT: Account = Account {
    code: "2340",
    name: "IGST Settlement A/c",
};

pub const CGST_SGST_SETTLEMENT: Account = Account {
    code: "2350",
    name: "CGST/SGST Settlement A/c",
};

/// Fallback for settlement allocation when an invoice carries no GST
pub const SUSPENSE: Account = Account {
    code: "2999",
    name: "Suspense A/c",
};

/// Control account for amounts receivable from a buyer
pub fn debtors_account(party_name: &str) -> (&'static str, String) {
    ("1100", format!("Debtors – {party_name}"))
}

/// Control account for amounts payable to a vendor
pub fn creditors_account(party_name: &str) -> (&'static str, String) {
    ("2100", format!("Creditors – {party_name}"))
}
