//! Validation rules for the GlobalMarket collections.

use super::CollectionValidator;
use bson::{doc, Document};

pub const COLLECTIONS: [&str; 4] = ["products", "users", "reviews", "sales"];

pub const CURRENCIES: [&str; 4] = ["INR", "USD", "EUR", "GBP"];

pub const PAYMENT_METHODS: [&str; 5] = [
    "credit_card",
    "debit_card",
    "upi",
    "cash_on_delivery",
    "net_banking",
];

pub const ORDER_STATUSES: [&str; 6] = [
    "pending",
    "processing",
    "shipped",
    "delivered",
    "completed",
    "cancelled",
];

pub const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";
pub const URL_PATTERN: &str = "^https?://";
pub const SALE_ID_PATTERN: &str = r"^SALE-\d{4}-\d{6}$";
pub const POSTAL_CODE_PATTERN: &str = r"^\d{6}$";

/// One strict validator per collection, in [`COLLECTIONS`] order.
pub fn validators() -> Vec<CollectionValidator> {
    vec![
        CollectionValidator::strict("products", products_schema()),
        CollectionValidator::strict("users", users_schema()),
        CollectionValidator::strict("reviews", reviews_schema()),
        CollectionValidator::strict("sales", sales_schema()),
    ]
}

/// Prices and discounts are non-negative, the main category is mandatory and the
/// average rating stays within 0..=5.
pub fn products_schema() -> Document {
    doc! {
        "bsonType": "object",
        "required": ["product_id", "name", "category", "pricing", "rating"],
        "properties": {
            "product_id": {
                "bsonType": "string",
                "description": "Unique product identifier (PK).",
            },
            "name": {
                "bsonType": "string",
                "minLength": 3,
                "maxLength": 500,
                "description": "Commercial product name.",
            },
            "category": {
                "bsonType": "object",
                "required": ["main"],
                "properties": {
                    "main": {
                        "bsonType": "string",
                        "description": "Main taxonomy category.",
                    },
                    "sub": { "bsonType": "array", "items": { "bsonType": "string" } },
                },
            },
            "pricing": {
                "bsonType": "object",
                "required": ["discounted_price", "actual_price"],
                "properties": {
                    "discounted_price": {
                        "bsonType": "number",
                        "minimum": 0,
                        "description": "Final sale price. Must be >= 0.",
                    },
                    "actual_price": {
                        "bsonType": "number",
                        "minimum": 0,
                        "description": "Original list price.",
                    },
                    "discount_percentage": {
                        "bsonType": "number",
                        "minimum": 0,
                        "maximum": 100,
                        "description": "Computed discount percentage.",
                    },
                    "currency": {
                        "enum": CURRENCIES.to_vec(),
                        "description": "ISO 4217 currency code.",
                    },
                },
            },
            "rating": {
                "bsonType": "object",
                "properties": {
                    "average": {
                        "bsonType": "number",
                        "minimum": 0,
                        "maximum": 5,
                        "description": "Weighted average score (0-5).",
                    },
                    "count": {
                        "bsonType": "int",
                        "minimum": 0,
                        "description": "Total number of ratings.",
                    },
                },
            },
            "images": {
                "bsonType": "object",
                "properties": {
                    "thumbnail": { "bsonType": "string", "pattern": URL_PATTERN },
                    "main": { "bsonType": "string", "pattern": URL_PATTERN },
                },
            },
            "created_at": { "bsonType": "string" },
            "updated_at": { "bsonType": "string" },
        },
    }
}

/// A user needs an id, a non-empty name and an address matching [`EMAIL_PATTERN`].
pub fn users_schema() -> Document {
    doc! {
        "bsonType": "object",
        "required": ["user_id", "name", "email"],
        "properties": {
            "user_id": {
                "bsonType": "string",
                "description": "Unique user identifier.",
            },
            "name": {
                "bsonType": "string",
                "minLength": 1,
                "maxLength": 100,
                "description": "Customer full name.",
            },
            "email": {
                "bsonType": "string",
                "pattern": EMAIL_PATTERN,
                "description": "Valid email address.",
            },
            "total_reviews": { "bsonType": "int", "minimum": 0 },
            "average_rating_given": { "bsonType": "number", "minimum": 0, "maximum": 5 },
        },
    }
}

/// Reviews reference a product and a user and carry an integer rating from 1 to 5.
pub fn reviews_schema() -> Document {
    doc! {
        "bsonType": "object",
        "required": ["review_id", "product_id", "user_id", "rating"],
        "properties": {
            "review_id": { "bsonType": "string" },
            "product_id": {
                "bsonType": "string",
                "description": "FK: referenced product.",
            },
            "user_id": {
                "bsonType": "string",
                "description": "FK: referenced user.",
            },
            "title": { "bsonType": "string", "maxLength": 200 },
            "content": { "bsonType": "string", "maxLength": 5000 },
            "rating": {
                "bsonType": "int",
                "minimum": 1,
                "maximum": 5,
                "description": "User rating (Likert scale 1-5).",
            },
            "helpful_count": { "bsonType": "int", "minimum": 0 },
            "verified_purchase": { "bsonType": "bool" },
            "images": {
                "bsonType": "array",
                "items": { "bsonType": "string", "pattern": URL_PATTERN },
            },
        },
    }
}

/// Order ids follow `SALE-YYYY-NNNNNN`; payment methods and statuses are closed sets.
pub fn sales_schema() -> Document {
    doc! {
        "bsonType": "object",
        "required": ["sale_id", "product_id", "user_id", "total_amount", "sale_date"],
        "properties": {
            "sale_id": {
                "bsonType": "string",
                "pattern": SALE_ID_PATTERN,
                "description": "Formatted order number.",
            },
            "product_id": { "bsonType": "string" },
            "user_id": { "bsonType": "string" },
            "quantity": { "bsonType": "int", "minimum": 1 },
            "total_amount": {
                "bsonType": "number",
                "minimum": 0,
                "description": "Total monetary value of the transaction.",
            },
            "sale_date": { "bsonType": "string" },
            "payment_method": {
                "enum": PAYMENT_METHODS.to_vec(),
                "description": "Payment gateway used.",
            },
            "status": {
                "enum": ORDER_STATUSES.to_vec(),
                "description": "Current order lifecycle status.",
            },
            "shipping": {
                "bsonType": "object",
                "properties": {
                    "city": { "bsonType": "string" },
                    "country": { "bsonType": "string" },
                    "postal_code": { "bsonType": "string", "pattern": POSTAL_CODE_PATTERN },
                },
            },
        },
    }
}
