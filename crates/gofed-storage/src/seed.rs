//! Seed catalog shared by the products and users services.

use gofed_domain::model::{Product, User};

/// Returns the seed users, ordered by id.
pub fn users() -> Vec<User> {
    [
        ("1", "Alice"),
        ("2", "Bob"),
        ("3", "Charlie"),
        ("4", "Diana"),
        ("5", "Eve"),
        ("6", "Frank"),
        ("7", "Grace"),
    ]
    .into_iter()
    .map(|(id, name)| {
        User::new(
            id,
            name,
            format!("{}@example.com", name.to_ascii_lowercase()),
        )
    })
    .collect()
}

/// Returns the seed products, ordered by id.
pub fn products() -> Vec<Product> {
    let owners = users();
    let owner = |id: &str| {
        owners
            .iter()
            .find(|user| user.id == id)
            .cloned()
            .unwrap_or_else(|| User::new(id, "Unknown", "unknown@example.com"))
    };

    [
        ("1", "iPhone 15 Pro", "Apple smartphone with A17 Pro chip", 999.99, "Electronics", "1"),
        ("2", "MacBook Air M2", "Apple notebook with M2 chip", 1199.99, "Electronics", "2"),
        ("3", "Nike Air Max", "Nike running shoes", 129.99, "Sports", "1"),
        ("4", "Coffee Maker", "Automatic coffee machine", 89.99, "Home", "3"),
        ("5", "Gaming Mouse", "RGB gaming mouse", 79.99, "Electronics", "4"),
        ("6", "Yoga Mat", "Premium yoga mat", 45.99, "Sports", "5"),
        ("7", "Bluetooth Speaker", "Portable Bluetooth speaker", 129.99, "Electronics", "6"),
        ("8", "Smart Watch", "Smart watch with heart rate monitor", 299.99, "Electronics", "7"),
    ]
    .into_iter()
    .map(|(id, name, description, price, category, owner_id)| Product {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        price,
        category: category.to_string(),
        owner: owner(owner_id),
    })
    .collect()
}
