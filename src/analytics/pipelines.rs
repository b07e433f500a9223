use super::AnalyticsPipeline;
use bson::doc;

/// Every analytics pipeline, ordered by number.
pub fn pipelines() -> Vec<AnalyticsPipeline> {
    vec![
        sales_by_category_and_month(),
        top_rated_products(),
        price_range_distribution(),
        vip_customers(),
        sales_by_city(),
    ]
}

/// Monthly revenue, units and transaction counts per main product category.
pub fn sales_by_category_and_month() -> AnalyticsPipeline {
    AnalyticsPipeline {
        number: 1,
        title: "Sales by category and month".into(),
        collection: "sales".into(),
        stages: vec![
            doc! {
                "$lookup": {
                    "from": "products",
                    "localField": "product_id",
                    "foreignField": "product_id",
                    "as": "product_info",
                },
            },
            doc! { "$unwind": "$product_info" },
            doc! {
                "$addFields": {
                    "sale_date_obj": { "$toDate": "$sale_date" },
                    "year": { "$year": { "$toDate": "$sale_date" } },
                    "month": { "$month": { "$toDate": "$sale_date" } },
                },
            },
            doc! {
                "$group": {
                    "_id": {
                        "category": "$product_info.category.main",
                        "year": "$year",
                        "month": "$month",
                    },
                    "total_sales": { "$sum": "$total_amount" },
                    "total_units": { "$sum": "$quantity" },
                    "num_transactions": { "$sum": 1 },
                    "avg_sale_amount": { "$avg": "$total_amount" },
                },
            },
            doc! {
                "$sort": {
                    "_id.category": 1,
                    "_id.year": -1,
                    "_id.month": -1,
                },
            },
            doc! {
                "$project": {
                    "_id": 0,
                    "category": "$_id.category",
                    "period": {
                        "$concat": [
                            { "$toString": "$_id.year" },
                            "-",
                            {
                                "$cond": [
                                    { "$lt": ["$_id.month", 10] },
                                    { "$concat": ["0", { "$toString": "$_id.month" }] },
                                    { "$toString": "$_id.month" },
                                ],
                            },
                        ],
                    },
                    "metrics": {
                        "total_sales": { "$round": ["$total_sales", 2] },
                        "total_units": "$total_units",
                        "num_transactions": "$num_transactions",
                        "avg_sale_amount": { "$round": ["$avg_sale_amount", 2] },
                    },
                },
            },
            doc! { "$limit": 20 },
        ],
    }
}

/// Products with more than 50 ratings, ranked by `average * ln(count)`.
pub fn top_rated_products() -> AnalyticsPipeline {
    AnalyticsPipeline {
        number: 2,
        title: "Top rated products (more than 50 reviews)".into(),
        collection: "products".into(),
        stages: vec![
            doc! { "$match": { "rating.count": { "$gt": 50 } } },
            doc! {
                "$lookup": {
                    "from": "reviews",
                    "localField": "product_id",
                    "foreignField": "product_id",
                    "as": "detailed_reviews",
                },
            },
            doc! {
                "$addFields": {
                    "review_count_actual": { "$size": "$detailed_reviews" },
                    "avg_detailed_rating": { "$avg": "$detailed_reviews.rating" },
                    "discount_amount": {
                        "$subtract": ["$pricing.actual_price", "$pricing.discounted_price"],
                    },
                    "rating_score": {
                        "$multiply": ["$rating.average", { "$ln": "$rating.count" }],
                    },
                },
            },
            doc! { "$sort": { "rating_score": -1 } },
            doc! {
                "$project": {
                    "_id": 0,
                    "product_id": 1,
                    "name": 1,
                    "category": "$category.main",
                    "rating": {
                        "average": "$rating.average",
                        "count": "$rating.count",
                        "score": { "$round": ["$rating_score", 2] },
                    },
                    "pricing": {
                        "current": "$pricing.discounted_price",
                        "original": "$pricing.actual_price",
                        "savings": { "$round": ["$discount_amount", 2] },
                        "discount_pct": "$pricing.discount_percentage",
                    },
                    "review_stats": {
                        "atlas_count": "$rating.count",
                        "actual_count": "$review_count_actual",
                        "avg_rating": { "$round": ["$avg_detailed_rating", 2] },
                    },
                },
            },
            doc! { "$limit": 10 },
        ],
    }
}

/// Bucket pattern over the discounted price.
pub fn price_range_distribution() -> AnalyticsPipeline {
    AnalyticsPipeline {
        number: 3,
        title: "Product distribution by price range".into(),
        collection: "products".into(),
        stages: vec![
            doc! {
                "$project": {
                    "product_id": 1,
                    "name": 1,
                    "price": "$pricing.discounted_price",
                    "category": "$category.main",
                    "rating": "$rating.average",
                },
            },
            doc! {
                "$bucket": {
                    "groupBy": "$price",
                    "boundaries": [0, 500, 1000, 2000, 5000, 10000, 50000],
                    "default": "50000+",
                    "output": {
                        "count": { "$sum": 1 },
                        "products": {
                            "$push": {
                                "id": "$product_id",
                                "name": "$name",
                                "price": "$price",
                                "category": "$category",
                            },
                        },
                        "avg_price": { "$avg": "$price" },
                        "avg_rating": { "$avg": "$rating" },
                        "min_price": { "$min": "$price" },
                        "max_price": { "$max": "$price" },
                    },
                },
            },
            doc! {
                "$addFields": {
                    "price_range_label": {
                        "$switch": {
                            "branches": [
                                { "case": { "$eq": ["$_id", 0] }, "then": "Budget (₹0-500)" },
                                { "case": { "$eq": ["$_id", 500] }, "then": "Economy (₹500-1000)" },
                                { "case": { "$eq": ["$_id", 1000] }, "then": "Mid-Range (₹1000-2000)" },
                                { "case": { "$eq": ["$_id", 2000] }, "then": "Premium (₹2000-5000)" },
                                { "case": { "$eq": ["$_id", 5000] }, "then": "Luxury (₹5000-10000)" },
                                { "case": { "$eq": ["$_id", 10000] }, "then": "Ultra-Luxury (₹10000-50000)" },
                            ],
                            "default": "Ultra-Premium (₹50000+)",
                        },
                    },
                },
            },
            doc! {
                "$project": {
                    "_id": 0,
                    "price_range": "$price_range_label",
                    "statistics": {
                        "total_products": "$count",
                        "avg_price": { "$round": ["$avg_price", 2] },
                        "avg_rating": { "$round": ["$avg_rating", 2] },
                        "price_span": {
                            "min": { "$round": ["$min_price", 2] },
                            "max": { "$round": ["$max_price", 2] },
                        },
                    },
                    "sample_products": { "$slice": ["$products", 3] },
                },
            },
            doc! { "$sort": { "statistics.avg_price": 1 } },
        ],
    }
}

/// Customers with at least three purchases, ranked by spend weighted by frequency.
pub fn vip_customers() -> AnalyticsPipeline {
    AnalyticsPipeline {
        number: 4,
        title: "Top VIP customers".into(),
        collection: "sales".into(),
        stages: vec![
            doc! {
                "$group": {
                    "_id": "$user_id",
                    "total_spent": { "$sum": "$total_amount" },
                    "total_purchases": { "$sum": 1 },
                    "avg_order_value": { "$avg": "$total_amount" },
                    "products_bought": { "$addToSet": "$product_id" },
                    "first_purchase": { "$min": "$sale_date" },
                    "last_purchase": { "$max": "$sale_date" },
                },
            },
            doc! {
                "$lookup": {
                    "from": "users",
                    "localField": "_id",
                    "foreignField": "user_id",
                    "as": "user_info",
                },
            },
            doc! {
                "$unwind": {
                    "path": "$user_info",
                    "preserveNullAndEmptyArrays": true,
                },
            },
            doc! {
                "$addFields": {
                    "unique_products": { "$size": "$products_bought" },
                    "customer_lifetime_days": {
                        "$dateDiff": {
                            "startDate": { "$toDate": "$first_purchase" },
                            "endDate": { "$toDate": "$last_purchase" },
                            "unit": "day",
                        },
                    },
                    "vip_score": {
                        "$multiply": [
                            "$total_spent",
                            { "$add": [1, { "$divide": ["$total_purchases", 10] }] },
                        ],
                    },
                },
            },
            doc! { "$match": { "total_purchases": { "$gte": 3 } } },
            doc! { "$sort": { "vip_score": -1 } },
            doc! {
                "$project": {
                    "_id": 0,
                    "user_id": "$_id",
                    "user_name": "$user_info.name",
                    "user_email": "$user_info.email",
                    "metrics": {
                        "total_spent": { "$round": ["$total_spent", 2] },
                        "total_purchases": "$total_purchases",
                        "avg_order_value": { "$round": ["$avg_order_value", 2] },
                        "unique_products": "$unique_products",
                        "vip_score": { "$round": ["$vip_score", 2] },
                    },
                    "engagement": {
                        "first_purchase": "$first_purchase",
                        "last_purchase": "$last_purchase",
                        "lifetime_days": "$customer_lifetime_days",
                    },
                },
            },
            doc! { "$limit": 15 },
        ],
    }
}

/// Revenue, order counts and completion rate per shipping city.
pub fn sales_by_city() -> AnalyticsPipeline {
    let completed_in_city = doc! {
        "$size": {
            "$filter": {
                "input": "$status_distribution",
                "as": "status",
                "cond": { "$in": ["$$status", ["completed", "delivered"]] },
            },
        },
    };

    AnalyticsPipeline {
        number: 5,
        title: "Sales trends by city".into(),
        collection: "sales".into(),
        stages: vec![
            doc! { "$match": { "shipping.city": { "$exists": true } } },
            doc! {
                "$group": {
                    "_id": "$shipping.city",
                    "total_sales": { "$sum": "$total_amount" },
                    "total_orders": { "$sum": 1 },
                    "avg_order_value": { "$avg": "$total_amount" },
                    "payment_methods": { "$addToSet": "$payment_method" },
                    "status_distribution": { "$push": "$status" },
                },
            },
            doc! {
                "$addFields": {
                    "completed_orders": completed_in_city.clone(),
                    "completion_rate": {
                        "$multiply": [
                            { "$divide": [completed_in_city, { "$size": "$status_distribution" }] },
                            100,
                        ],
                    },
                },
            },
            doc! { "$sort": { "total_sales": -1 } },
            doc! {
                "$project": {
                    "_id": 0,
                    "city": "$_id",
                    "metrics": {
                        "total_sales": { "$round": ["$total_sales", 2] },
                        "total_orders": "$total_orders",
                        "avg_order_value": { "$round": ["$avg_order_value", 2] },
                        "completion_rate": { "$round": ["$completion_rate", 1] },
                    },
                    "payment_methods": 1,
                    "completed_orders": 1,
                },
            },
            doc! { "$limit": 10 },
        ],
    }
}
