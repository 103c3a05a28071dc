//! Fixed demo dataset
//!
//! The identity directories, the general perk list and the partner
//! catalog are a frozen external dataset consumed by the core. They are
//! expressed as in-code seed tables; swapping them for a real user table
//! or a partner CMS would not change any service contract.

use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::models::{DashboardRecord, Deal, Partner, Perk, UserRecord};

/// Starting reward balance for users not present in the directory.
pub fn default_starting_balance() -> Decimal {
    Decimal::ZERO
}

/// Starting balance for a user id: the directory value for known users,
/// zero for everyone else.
pub fn initial_balance(user_id: &str) -> Decimal {
    USERS
        .get(user_id)
        .map(|u| u.starting_balance)
        .unwrap_or_else(default_starting_balance)
}

/// End-user directory (single hard-coded entry; extensible to a real
/// user table without changing the login contract).
pub static USERS: Lazy<HashMap<&'static str, UserRecord>> = Lazy::new(|| {
    HashMap::from([(
        "user",
        UserRecord {
            user_id: "user".to_string(),
            name: "Jack".to_string(),
            password: "password".to_string(),
            starting_balance: Decimal::new(5675, 2), // 56.75
        },
    )])
});

/// Partner-dashboard directory. The display name doubles as the managed
/// partner's slug.
pub static DASHBOARD_USERS: Lazy<HashMap<&'static str, DashboardRecord>> = Lazy::new(|| {
    HashMap::from([(
        "admin",
        DashboardRecord {
            dash_id: "admin".to_string(),
            name: "aldi".to_string(),
            password: "admin".to_string(),
        },
    )])
});

fn perk(id: u32, name: &str, cost: i64, icon: &str, category: &str, description: &str) -> Perk {
    Perk {
        id,
        name: name.to_string(),
        cost: Decimal::new(cost, 0),
        icon: icon.to_string(),
        category: category.to_string(),
        description: description.to_string(),
    }
}

fn deal(id: u32, title: &str, description: &str, icon: &str, full_description: &str) -> Deal {
    Deal {
        id,
        title: title.to_string(),
        description: description.to_string(),
        full_description: full_description.to_string(),
        icon: icon.to_string(),
    }
}

/// General perks, redeemable against the reward balance.
pub static GENERAL_PERKS: Lazy<Vec<Perk>> = Lazy::new(|| {
    vec![
        perk(1, "Coffee Voucher", 5, "coffee", "Food & Drink", "£5 off at Costa Coffee"),
        perk(2, "Gym Pass", 15, "dumbbell", "Fitness", "1 month free gym access"),
        perk(3, "Shopping Discount", 10, "shopping-bag", "Shopping", "10% off at ASOS"),
        perk(4, "Rent Discount", 25, "home", "Housing", "£25 off next rent payment"),
        perk(5, "Premium Perks Box", 50, "gift", "Special", "Mystery box of student essentials"),
        perk(6, "Entertainment Pass", 20, "sparkles", "Entertainment", "Cinema tickets for 2"),
    ]
});

/// Partner catalog with static deals. Aldi carries the pinned 10,000
/// views total; its per-deal view counters are rebalanced on every deal
/// addition so the sum stays exact.
pub static PARTNERS: Lazy<Vec<Partner>> = Lazy::new(|| {
    vec![
        Partner {
            id: 1,
            name: "Aldi".to_string(),
            slug: "aldi".to_string(),
            logo: "/images/partners/aldi-logo.png".to_string(),
            route: "/perks/aldi".to_string(),
            pinned_total_views: Some(10_000),
            deals: vec![
                deal(
                    1,
                    "Off-Peak Saver",
                    "5% cashback on weekday shops",
                    "percent",
                    "Shop on any weekday (Mon-Fri) to get 5% cashback on your entire shop.",
                ),
                deal(
                    2,
                    "Study-Session Bundle",
                    "15% off on Drinks, Snacks & Easy Meals",
                    "coffee",
                    "Get 15% off when you buy one item from each category: Drinks, Snacks, and Easy Meals.",
                ),
                deal(
                    3,
                    "Flatmate Feast Bonus",
                    "Free pizza with £60+ spend",
                    "pizza",
                    "Spend over £60 in one group transaction and get a free pizza for the flat.",
                ),
                deal(
                    4,
                    "End-of-Loan Recipe Challenge",
                    "Scan 3 pantry items to get a recipe and 25% off the missing ingredients.",
                    "chef-hat",
                    "Scan 3 pantry items to get a recipe and 25% off the missing ingredients.",
                ),
                deal(
                    5,
                    "Fresh Start Challenge",
                    "Buy 5 different fresh produce items on a Monday or Tuesday to get £2 cashback.",
                    "leaf",
                    "Buy 5 different fresh produce items on a Monday or Tuesday to get £2 cashback.",
                ),
            ],
        },
        Partner {
            id: 2,
            name: "Lidl".to_string(),
            slug: "lidl".to_string(),
            logo: "/images/partners/lidl-logo.png".to_string(),
            route: "/perks/lidl".to_string(),
            pinned_total_views: None,
            deals: vec![
                deal(
                    1,
                    "Bakery Boost",
                    "10% off all bakery items",
                    "coffee",
                    "Get 10% off all bakery items when you shop at Lidl.",
                ),
                deal(
                    2,
                    "Snack Attack",
                    "Buy 2 get 1 free on snacks",
                    "gift",
                    "Buy 2 get 1 free on selected snacks and treats.",
                ),
                deal(
                    3,
                    "Weekly Saver",
                    "£5 off £30 weekly shop",
                    "percent",
                    "Spend £30 or more in a single transaction and get £5 cashback.",
                ),
            ],
        },
        Partner {
            id: 3,
            name: "Morrisons".to_string(),
            slug: "morrisons".to_string(),
            logo: "/images/partners/morrisons-logo.png".to_string(),
            route: "/perks/morrisons".to_string(),
            pinned_total_views: None,
            deals: vec![
                deal(
                    1,
                    "Meal Deal Magic",
                    "20% off all meal deals",
                    "shopping-bag",
                    "Get 20% off all meal deals when you shop at Morrisons.",
                ),
                deal(
                    2,
                    "Breakfast Buddy",
                    "Free coffee with breakfast purchase",
                    "coffee",
                    "Get a free coffee when you purchase any breakfast item.",
                ),
                deal(
                    3,
                    "Sunday Special",
                    "Extra student discount on Sundays",
                    "percent",
                    "Get an extra 10% student discount on all purchases every Sunday.",
                ),
            ],
        },
        Partner {
            id: 4,
            name: "Co-op".to_string(),
            slug: "coop".to_string(),
            logo: "/images/partners/coop-logo.png".to_string(),
            route: "/perks/coop".to_string(),
            pinned_total_views: None,
            deals: vec![
                deal(
                    1,
                    "Tuesday Treat",
                    "Double points every Tuesday",
                    "sparkles",
                    "Earn double reward points on all purchases made on Tuesdays.",
                ),
                deal(
                    2,
                    "Own Brand Bonus",
                    "15% off Co-op own-brand products",
                    "percent",
                    "Get 15% off all Co-op own-brand products.",
                ),
                deal(
                    3,
                    "Fresh Five",
                    "Buy 5 fresh items, get £2 cashback",
                    "apple",
                    "Buy 5 different fresh produce items and get £2 cashback.",
                ),
            ],
        },
    ]
});
