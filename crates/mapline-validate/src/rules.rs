//! Rule sets for the known target tables.

/// A field whose values must come from a closed set.
#[derive(Debug, Clone, Copy)]
pub struct AllowedValues {
    pub field: &'static str,
    /// Plural noun used in the warning, e.g. "order statuses".
    pub label: &'static str,
    pub values: &'static [&'static str],
}

/// A numeric field with a lower bound.
#[derive(Debug, Clone, Copy)]
pub struct RangeRule {
    pub field: &'static str,
    /// Values strictly below zero are flagged; with `allow_zero` false, zero
    /// is flagged too.
    pub allow_zero: bool,
    /// Warning template; `{count}` and `{field}` are substituted.
    pub message: &'static str,
}

/// A field whose values should be unique.
#[derive(Debug, Clone, Copy)]
pub struct UniqueRule {
    pub field: &'static str,
    /// Plural noun used in the warning, e.g. "order IDs".
    pub label: &'static str,
}

/// Everything checked for one target table.
#[derive(Debug, Clone, Copy)]
pub struct TableRules {
    pub table: &'static str,
    pub required: &'static [&'static str],
    pub unique: &'static [UniqueRule],
    pub allowed: &'static [AllowedValues],
    pub ranges: &'static [RangeRule],
}

pub const ORDER_STATUSES: &[&str] = &[
    "pending",
    "confirmed",
    "in_preparation",
    "ready",
    "out_for_delivery",
    "delivered",
    "cancelled",
    "refunded",
];

pub const PAYMENT_METHODS: &[&str] = &["cash", "card", "upi", "wallet", "net_banking"];

const NEGATIVE_IN: &str = "Found {count} negative values in {field}";

pub static TABLE_RULES: &[TableRules] = &[
    TableRules {
        table: "orders",
        required: &["order_id", "order_date", "order_status"],
        unique: &[UniqueRule {
            field: "order_id",
            label: "order IDs",
        }],
        allowed: &[AllowedValues {
            field: "order_status",
            label: "order statuses",
            values: ORDER_STATUSES,
        }],
        ranges: &[],
    },
    TableRules {
        table: "order_items",
        required: &["order_id", "item_name", "quantity", "unit_price"],
        unique: &[],
        allowed: &[],
        ranges: &[
            RangeRule {
                field: "quantity",
                allow_zero: false,
                message: "Found {count} items with invalid quantity (<= 0)",
            },
            RangeRule {
                field: "unit_price",
                allow_zero: true,
                message: "Found {count} items with negative unit price",
            },
        ],
    },
    TableRules {
        table: "payments",
        required: &[
            "payment_id",
            "order_id",
            "payment_method",
            "payment_status",
            "amount",
        ],
        unique: &[],
        allowed: &[AllowedValues {
            field: "payment_method",
            label: "payment methods",
            values: PAYMENT_METHODS,
        }],
        ranges: &[RangeRule {
            field: "amount",
            allow_zero: true,
            message: "Found {count} payments with negative amounts",
        }],
    },
    TableRules {
        table: "settlement_reports",
        required: &["settlement_id", "settlement_date", "total_amount"],
        unique: &[],
        allowed: &[],
        ranges: &[
            RangeRule {
                field: "total_amount",
                allow_zero: true,
                message: NEGATIVE_IN,
            },
            RangeRule {
                field: "commission_amount",
                allow_zero: true,
                message: NEGATIVE_IN,
            },
            RangeRule {
                field: "settlement_amount",
                allow_zero: true,
                message: NEGATIVE_IN,
            },
        ],
    },
    TableRules {
        table: "invoices",
        required: &["invoice_number", "invoice_date", "total_amount"],
        unique: &[UniqueRule {
            field: "invoice_number",
            label: "invoice numbers",
        }],
        allowed: &[],
        ranges: &[],
    },
];

/// Rules registered for a target table, if any.
pub fn rules_for(table: &str) -> Option<&'static TableRules> {
    let wanted = table.trim();
    TABLE_RULES
        .iter()
        .find(|rules| rules.table.eq_ignore_ascii_case(wanted))
}

/// Names of every table with registered rules.
pub fn known_tables() -> Vec<&'static str> {
    TABLE_RULES.iter().map(|rules| rules.table).collect()
}
