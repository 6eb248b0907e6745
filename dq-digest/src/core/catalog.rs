//! The two datasets the digest knows about and the rules declared for them.

use super::{ColumnType, Rule};

/// Everything the pipeline needs to load and validate one dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetDefinition {
    /// Short dataset name used in logs and outcomes.
    pub name: String,
    /// Source table, qualified by the configured schema at load time.
    pub table: String,
    /// Name of the persisted rule set.
    pub suite_name: String,
    /// Title of the report section.
    pub section_title: String,
    /// Rules in declaration order.
    pub rules: Vec<Rule>,
}

impl DatasetDefinition {
    pub fn new(
        name: impl Into<String>,
        table: impl Into<String>,
        suite_name: impl Into<String>,
        section_title: impl Into<String>,
        rules: Vec<Rule>,
    ) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            suite_name: suite_name.into(),
            section_title: section_title.into(),
            rules,
        }
    }

    /// The sales dataset.
    pub fn sales() -> Self {
        Self::new(
            "sales",
            "Sales",
            "sales_expectation_suite",
            "Sales Validation Results",
            vec![
                Rule::between("Total_Revenue", Some(0.0), None),
                Rule::not_null("Total_Cost"),
                Rule::between("Unit_Price", Some(0.0), Some(10000.0)),
                Rule::not_null("Units_Sold"),
                Rule::length_equals("Order_ID", 9),
                Rule::in_set("Order_Priority", ["H", "L", "C", "M"]),
                Rule::in_set("Sales_Channel", ["offline", "online"]),
                Rule::of_type("Country", ColumnType::Varchar),
                Rule::of_type("Region", ColumnType::Varchar),
            ],
        )
    }

    /// The customers dataset.
    pub fn customers() -> Self {
        Self::new(
            "customers",
            "Customers",
            "customer_expectation_suite",
            "Customer Validation Results",
            vec![
                Rule::not_null("Customer_Id"),
                Rule::length_between("Customer_Id", 1, 15),
                Rule::of_type("Customer_Id", ColumnType::Varchar),
                Rule::of_type("Index", ColumnType::Integer),
                Rule::of_type("First_Name", ColumnType::Varchar),
                Rule::of_type("Last_Name", ColumnType::Varchar),
                Rule::of_type("Subscription_Date", ColumnType::Date),
            ],
        )
    }
}
