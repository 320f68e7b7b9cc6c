//! Pure mapping from raw Browse API item summaries to canonical listings.
//!
//! Every rule in here is total: missing or malformed upstream fields fall
//! back to a neutral default (`None`, zero, or an `Unknown` enum member)
//! rather than failing the item. No I/O happens in this module.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use chrono::Utc;
use serde_json::Value;

use crate::models::{
    Condition, Listing, Price, RawData, Returns, Seller, Shipping, ShippingMethod, Signals,
    Source, Specs,
};

const MAX_KEY_TERMS: usize = 10;

/// Normalize at most `max_results` raw items, preserving upstream order.
pub fn normalize_all(items: &[Value], max_results: usize) -> Vec<Listing> {
    items
        .iter()
        .take(max_results)
        .map(normalize_listing)
        .collect()
}

pub fn normalize_listing(item: &Value) -> Listing {
    let title = item.get("title").and_then(Value::as_str).unwrap_or("");
    let condition_id = string_field(item, "conditionId");

    let id = item
        .get("itemId")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| fallback_id(title));

    let code_note: &str = if condition_id.is_empty() {
        "none"
    } else {
        &condition_id
    };

    Listing {
        id,
        source: Source::Ebay,
        title: item
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or("Unknown Item")
            .to_string(),
        url: item
            .get("itemWebUrl")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
        image_url: item
            .get("image")
            .and_then(|i| i.get("imageUrl"))
            .and_then(Value::as_str)
            .map(str::to_string),
        price: parse_price(item),
        condition: parse_condition(item),
        shipping: parse_shipping(item),
        returns: parse_returns(item),
        seller: parse_seller(item),
        specs: extract_specs(title),
        signals: Signals {
            // Presence checks: the ad id and the per-buyer quantity cap
            // carry signal by existing at all, whatever their value.
            sponsored: item.get("adId").is_some_and(|v| !v.is_null()),
            low_stock: item
                .get("quantityLimitPerBuyer")
                .is_some_and(|v| !v.is_null()),
        },
        raw: RawData {
            captured_at: Utc::now(),
            notes: format!("conditionId: {}", code_note),
        },
    }
}

/// Ordered guard list, first match wins. Text and code checks are
/// interleaved: a title condition containing "new" beats a used-range
/// condition id, because it is tested first.
fn parse_condition(item: &Value) -> Condition {
    let text = match item.get("condition") {
        Some(Value::Object(obj)) => obj
            .get("conditionDisplayName")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_lowercase(),
        Some(Value::String(s)) => s.to_lowercase(),
        _ => String::new(),
    };
    let code = string_field(item, "conditionId");

    if text.contains("new") || matches!(code.as_str(), "1000" | "1500") {
        Condition::New
    } else if text.contains("refurbished")
        || text.contains("renewed")
        || matches!(code.as_str(), "2000" | "2010" | "2020" | "2030")
    {
        Condition::Refurb
    } else if matches!(code.as_str(), "3000" | "4000" | "5000" | "6000" | "7000") {
        Condition::Used
    } else if text.contains("used") || text.contains("pre-owned") {
        Condition::Used
    } else {
        Condition::Unknown
    }
}

fn parse_price(item: &Value) -> Price {
    let price_info = item.get("price");
    Price {
        value: price_info
            .and_then(|p| p.get("value"))
            .and_then(number)
            .unwrap_or(0.0),
        currency: price_info
            .and_then(|p| p.get("currency"))
            .and_then(Value::as_str)
            .unwrap_or("USD")
            .to_string(),
    }
}

fn parse_shipping(item: &Value) -> Shipping {
    let Some(option) = item
        .get("shippingOptions")
        .and_then(Value::as_array)
        .and_then(|options| options.first())
    else {
        return Shipping::default();
    };

    let cost = option
        .get("shippingCost")
        .filter(|c| c.as_object().map_or(!c.is_null(), |o| !o.is_empty()))
        .map(|c| c.get("value").and_then(number).unwrap_or(0.0));

    let min_days = option.get("minEstimatedDeliveryDays").and_then(number);
    let max_days = option.get("maxEstimatedDeliveryDays").and_then(number);
    let eta_days = match (min_days, max_days) {
        (Some(min), Some(max)) => Some(((min + max) / 2.0) as i64),
        (min, max) => min.or(max).map(|days| days as i64),
    };

    let service = option
        .get("shippingServiceCode")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_lowercase();
    let method = if service.contains("expedited") || service.contains("express") {
        ShippingMethod::Expedited
    } else if service.contains("standard") || service.contains("economy") {
        ShippingMethod::Standard
    } else {
        ShippingMethod::Unknown
    };

    Shipping {
        cost,
        eta_days,
        method,
    }
}

fn parse_returns(item: &Value) -> Returns {
    let Some(terms) = item
        .get("returnTerms")
        .filter(|t| t.as_object().is_some_and(|o| !o.is_empty()))
    else {
        return Returns::unknown();
    };

    let available = terms
        .get("returnsAccepted")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let period = terms.get("returnPeriod");
    // A zero-length period carries no window.
    let value = period
        .and_then(|p| p.get("value"))
        .and_then(number)
        .map(|v| v as i64)
        .filter(|v| *v != 0);
    let unit = period
        .and_then(|p| p.get("unit"))
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_uppercase();

    let window_days = value.and_then(|v| match unit.as_str() {
        "DAY" => Some(v),
        "MONTH" => Some(v * 30),
        _ => None,
    });

    Returns {
        available,
        window_days,
        unknown: false,
    }
}

fn parse_seller(item: &Value) -> Seller {
    let seller = item.get("seller");
    let field = |key: &str| seller.and_then(|s| s.get(key));

    Seller {
        name: field("username")
            .and_then(Value::as_str)
            .map(str::to_string),
        // Zero feedback values come through as "not provided" upstream.
        rating: field("feedbackPercentage")
            .and_then(number)
            .filter(|r| *r != 0.0),
        reviews: field("feedbackScore")
            .and_then(number)
            .map(|n| n as i64)
            .filter(|n| *n != 0),
        is_official: field("sellerAccountType").and_then(Value::as_str) == Some("BUSINESS"),
    }
}

fn extract_specs(title: &str) -> Specs {
    let brand = title.split_whitespace().next().map(str::to_string);

    let key_terms = title
        .replace('-', " ")
        .split_whitespace()
        .filter(|word| word.len() > 2)
        .map(str::to_lowercase)
        .take(MAX_KEY_TERMS)
        .collect();

    Specs {
        brand,
        // Summary payloads carry no reliable model signal.
        model: None,
        key_terms,
    }
}

/// Deterministic stand-in id for items the API returns without one.
/// Identical titles collide, which is accepted.
fn fallback_id(title: &str) -> String {
    let mut hasher = DefaultHasher::new();
    title.hash(&mut hasher);
    format!("ebay-{:x}", hasher.finish())
}

/// Numeric coercion for a payload that mixes JSON numbers with numeric
/// strings ("29.99") for the same fields.
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn string_field(item: &Value, key: &str) -> String {
    match item.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_item_normalizes_to_neutral_defaults() {
        let listing = normalize_listing(&json!({}));

        assert_eq!(listing.title, "Unknown Item");
        assert_eq!(listing.url, "");
        assert!(listing.id.starts_with("ebay-"));
        assert_eq!(listing.image_url, None);
        assert_eq!(listing.price.value, 0.0);
        assert_eq!(listing.price.currency, "USD");
        assert_eq!(listing.condition, Condition::Unknown);
        assert_eq!(listing.shipping, Shipping::default());
        assert_eq!(listing.returns, Returns::unknown());
        assert_eq!(listing.seller.name, None);
        assert_eq!(listing.seller.rating, None);
        assert_eq!(listing.seller.reviews, None);
        assert!(!listing.seller.is_official);
        assert_eq!(listing.specs.brand, None);
        assert!(listing.specs.key_terms.is_empty());
        assert!(!listing.signals.sponsored);
        assert!(!listing.signals.low_stock);
        assert_eq!(listing.raw.notes, "conditionId: none");
    }

    #[test]
    fn condition_new_code_wins_over_used_text() {
        // "used" text plus a NEW-range code: the code check in the first
        // guard fires before the text check for "used" is ever reached.
        let item = json!({"condition": "Used", "conditionId": "1000"});
        assert_eq!(parse_condition(&item), Condition::New);
    }

    #[test]
    fn condition_from_display_name_object() {
        let item = json!({"condition": {"conditionDisplayName": "Certified - Refurbished"}});
        assert_eq!(parse_condition(&item), Condition::Refurb);
    }

    #[test]
    fn condition_code_ranges() {
        assert_eq!(parse_condition(&json!({"conditionId": "1500"})), Condition::New);
        assert_eq!(parse_condition(&json!({"conditionId": "2030"})), Condition::Refurb);
        assert_eq!(parse_condition(&json!({"conditionId": "5000"})), Condition::Used);
        assert_eq!(parse_condition(&json!({"conditionId": "9999"})), Condition::Unknown);
    }

    #[test]
    fn condition_from_text_only() {
        assert_eq!(parse_condition(&json!({"condition": "Pre-Owned"})), Condition::Used);
        assert_eq!(parse_condition(&json!({"condition": "Brand New"})), Condition::New);
    }

    #[test]
    fn price_coerces_string_values() {
        let item = json!({"price": {"value": "29.99", "currency": "EUR"}});
        let price = parse_price(&item);
        assert_eq!(price.value, 29.99);
        assert_eq!(price.currency, "EUR");
    }

    #[test]
    fn shipping_eta_averages_min_and_max() {
        let item = json!({"shippingOptions": [{
            "minEstimatedDeliveryDays": 2,
            "maxEstimatedDeliveryDays": 4
        }]});
        assert_eq!(parse_shipping(&item).eta_days, Some(3));
    }

    #[test]
    fn shipping_eta_uses_single_bound() {
        let min_only = json!({"shippingOptions": [{"minEstimatedDeliveryDays": 2}]});
        assert_eq!(parse_shipping(&min_only).eta_days, Some(2));

        let max_only = json!({"shippingOptions": [{"maxEstimatedDeliveryDays": 6}]});
        assert_eq!(parse_shipping(&max_only).eta_days, Some(6));
    }

    #[test]
    fn shipping_method_classification() {
        let expedited = json!({"shippingOptions": [{"shippingServiceCode": "eBayExpeditedShipping"}]});
        assert_eq!(parse_shipping(&expedited).method, ShippingMethod::Expedited);

        let economy = json!({"shippingOptions": [{"shippingServiceCode": "EconomyShippingFromOutsideUS"}]});
        assert_eq!(parse_shipping(&economy).method, ShippingMethod::Standard);

        let other = json!({"shippingOptions": [{"shippingServiceCode": "Pickup"}]});
        assert_eq!(parse_shipping(&other).method, ShippingMethod::Unknown);
    }

    #[test]
    fn shipping_cost_from_first_option() {
        let item = json!({"shippingOptions": [
            {"shippingCost": {"value": "5.50", "currency": "USD"}},
            {"shippingCost": {"value": "20.00", "currency": "USD"}}
        ]});
        assert_eq!(parse_shipping(&item).cost, Some(5.5));

        let no_options = json!({"shippingOptions": []});
        assert_eq!(parse_shipping(&no_options).cost, None);
    }

    #[test]
    fn returns_month_window_converts_to_days() {
        let item = json!({"returnTerms": {
            "returnsAccepted": true,
            "returnPeriod": {"value": 2, "unit": "MONTH"}
        }});
        let returns = parse_returns(&item);
        assert!(returns.available);
        assert_eq!(returns.window_days, Some(60));
        assert!(!returns.unknown);
    }

    #[test]
    fn returns_day_window_converts_one_to_one() {
        let item = json!({"returnTerms": {
            "returnsAccepted": true,
            "returnPeriod": {"value": 14, "unit": "DAY"}
        }});
        assert_eq!(parse_returns(&item).window_days, Some(14));
    }

    #[test]
    fn missing_return_terms_is_unknown_not_rejected() {
        assert_eq!(parse_returns(&json!({})), Returns::unknown());
        assert_eq!(parse_returns(&json!({"returnTerms": {}})), Returns::unknown());
    }

    #[test]
    fn unrecognized_return_unit_yields_no_window() {
        let item = json!({"returnTerms": {
            "returnsAccepted": true,
            "returnPeriod": {"value": 1, "unit": "YEAR"}
        }});
        let returns = parse_returns(&item);
        assert!(returns.available);
        assert_eq!(returns.window_days, None);
    }

    #[test]
    fn seller_zero_feedback_treated_as_absent() {
        let item = json!({"seller": {
            "username": "techdeals",
            "feedbackPercentage": "0",
            "feedbackScore": 0,
            "sellerAccountType": "BUSINESS"
        }});
        let seller = parse_seller(&item);
        assert_eq!(seller.name, Some("techdeals".to_string()));
        assert_eq!(seller.rating, None);
        assert_eq!(seller.reviews, None);
        assert!(seller.is_official);
    }

    #[test]
    fn seller_feedback_coerced_from_strings() {
        let item = json!({"seller": {
            "feedbackPercentage": "99.5",
            "feedbackScore": 1234,
            "sellerAccountType": "INDIVIDUAL"
        }});
        let seller = parse_seller(&item);
        assert_eq!(seller.rating, Some(99.5));
        assert_eq!(seller.reviews, Some(1234));
        assert!(!seller.is_official);
    }

    #[test]
    fn key_terms_order_length_and_cap() {
        let specs = extract_specs("A Big-Red Hat For Sale");
        assert_eq!(specs.brand, Some("A".to_string()));
        assert_eq!(specs.key_terms, vec!["big", "red", "hat", "for", "sale"]);

        let long_title = "one two three four five six seven eight nine ten eleven twelve";
        let capped = extract_specs(long_title);
        assert_eq!(capped.key_terms.len(), 10);
        assert_eq!(capped.key_terms[0], "one");
        // "two" and "six" are filtered out before the cap applies.
        assert!(!capped.key_terms.contains(&"two".to_string()));
    }

    #[test]
    fn key_terms_keep_duplicates() {
        let specs = extract_specs("red shirt red shirt");
        assert_eq!(specs.key_terms, vec!["red", "shirt", "red", "shirt"]);
    }

    #[test]
    fn fallback_id_is_deterministic_per_title() {
        let a = normalize_listing(&json!({"title": "Acme Widget"}));
        let b = normalize_listing(&json!({"title": "Acme Widget"}));
        let c = normalize_listing(&json!({"title": "Other Widget"}));
        assert_eq!(a.id, b.id);
        assert_ne!(a.id, c.id);
    }

    #[test]
    fn signals_are_presence_checks() {
        let item = json!({"adId": "abc123", "quantityLimitPerBuyer": 1});
        let listing = normalize_listing(&item);
        assert!(listing.signals.sponsored);
        assert!(listing.signals.low_stock);

        // JSON null counts as absent.
        let null_ad = normalize_listing(&json!({"adId": null}));
        assert!(!null_ad.signals.sponsored);
    }

    #[test]
    fn notes_carry_raw_condition_id() {
        let listing = normalize_listing(&json!({"conditionId": "3000"}));
        assert_eq!(listing.raw.notes, "conditionId: 3000");
    }
}
