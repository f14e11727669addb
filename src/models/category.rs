use crate::models::transaction::TransactionType;

pub const INCOME_CATEGORIES: &[&str] = &[
    "Salary",
    "Freelance",
    "Business",
    "Investment",
    "Gift",
    "Other Income",
];

pub const EXPENSE_CATEGORIES: &[&str] = &[
    "Food",
    "Travel",
    "Bills",
    "Shopping",
    "Entertainment",
    "Healthcare",
    "Education",
    "Rent",
    "Investment",
    "EMI",
    "Grocery",
    "Household",
    "Personal",
    "Other Expense",
];

pub fn categories_for(transaction_type: TransactionType) -> &'static [&'static str] {
    match transaction_type {
        TransactionType::Income => INCOME_CATEGORIES,
        TransactionType::Expense => EXPENSE_CATEGORIES,
    }
}

/// Income categories followed by expense categories, each name listed once.
pub fn all_categories() -> Vec<&'static str> {
    let mut all: Vec<&'static str> = Vec::new();
    for category in INCOME_CATEGORIES.iter().chain(EXPENSE_CATEGORIES.iter()) {
        if !all.contains(category) {
            all.push(category);
        }
    }
    all
}

pub fn is_known_category(transaction_type: TransactionType, category: &str) -> bool {
    categories_for(transaction_type)
        .iter()
        .any(|known| known.eq_ignore_ascii_case(category))
}
