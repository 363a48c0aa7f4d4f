// src/listings/normalize.rs

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

use super::models::{NormalizedListing, RawListing};

pub const UNKNOWN_STATUS: &str = "Unknown";

/// Maps one GraphQL item onto the canonical listing shape.
///
/// Never fails: a malformed JSON-encoded sub-field becomes `None` and the
/// rest of the record is still populated. Identity comes straight from
/// `ListingId`; callers skip items without one before getting here.
pub fn normalize(raw: &RawListing) -> NormalizedListing {
    let listing_id = raw.listing_id.clone().unwrap_or_default();
    let media = raw.media.as_ref().and_then(decode_media);

    let preferred_photo = raw
        .preferred_photo
        .clone()
        .or_else(|| media.as_ref().and_then(|m| m.first().cloned()));

    let address = raw.unparsed_address.clone().or_else(|| compose_address(raw));

    NormalizedListing {
        id: listing_id.clone(),
        listing_id,
        status: resolve_status(raw.mls_status.as_deref(), raw.standard_status.as_deref()),

        list_price: raw.list_price,
        sold_price: raw.close_price,
        original_list_price: raw.original_list_price,

        address,
        street_number: raw.street_number.clone(),
        street_name: raw.street_name.clone(),
        street_suffix: raw.street_suffix.clone(),
        unit_number: raw.unit_number.clone(),
        city: raw.city.clone(),
        state: raw.state_or_province.clone(),
        zip_code: raw.postal_code.clone(),
        county: raw.county_or_parish.clone(),
        subdivision_name: raw.subdivision_name.clone(),

        property_type: raw.property_type.clone(),
        property_sub_type: raw.property_sub_type.clone(),
        bedrooms: raw.bedrooms_total,
        bathrooms_total: raw.bathrooms_total_integer,
        bathrooms_full: raw.bathrooms_full,
        bathrooms_half: raw.bathrooms_half,
        bathrooms_three_quarter: raw.bathrooms_three_quarter,
        square_feet: raw.living_area,
        lot_size_acres: raw.lot_size_acres,
        year_built: raw.year_built,
        days_on_market: raw.days_on_market,
        garage_spaces: raw.garage_spaces,

        listing_date: raw.listing_contract_date.as_deref().and_then(iso_date),
        close_date: raw.close_date.as_deref().and_then(iso_date),
        modification_timestamp: raw.modification_timestamp.clone(),

        preferred_photo,
        media,

        latitude: raw.latitude,
        longitude: raw.longitude,

        list_agent_id: raw.list_agent_mls_id.clone(),
        list_agent_name: raw.list_agent_full_name.clone(),
        list_office_id: raw.list_office_mls_id.clone(),
        list_office_name: raw.list_office_name.clone(),
        buyer_agent_id: raw.buyer_agent_mls_id.clone(),
        buyer_office_id: raw.buyer_office_mls_id.clone(),

        public_remarks: raw.public_remarks.clone(),

        cooling: raw.cooling.as_ref().and_then(decode_string_array),
        heating: raw.heating.as_ref().and_then(decode_string_array),
        laundry_features: raw.laundry_features.as_ref().and_then(decode_string_array),
        parking_features: raw.parking_features.as_ref().and_then(decode_string_array),
        association_amenities: raw
            .association_amenities
            .as_ref()
            .and_then(decode_string_array),
    }
}

/// `MlsStatus`, then `StandardStatus`, then the `"Unknown"` sentinel.
pub fn resolve_status(mls_status: Option<&str>, standard_status: Option<&str>) -> String {
    [mls_status, standard_status]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_STATUS)
        .to_string()
}

/// Decodes a JSON-encoded array sub-document.
///
/// Accepts a string holding JSON or an already-decoded array. Returns `None`
/// when the string does not parse or the result is not an array. Non-string
/// elements are dropped.
pub fn decode_string_array(value: &Value) -> Option<Vec<String>> {
    decode_array(value).map(|items| {
        items
            .iter()
            .filter_map(|item| item.as_str())
            .map(str::to_string)
            .collect()
    })
}

/// Like `decode_string_array`, but media entries may also be objects that
/// carry the photo URL under `MediaURL` (RESO) or `url`.
pub fn decode_media(value: &Value) -> Option<Vec<String>> {
    decode_array(value).map(|items| {
        items
            .iter()
            .filter_map(|item| match item {
                Value::String(url) => Some(url.clone()),
                Value::Object(obj) => obj
                    .get("MediaURL")
                    .or_else(|| obj.get("url"))
                    .and_then(Value::as_str)
                    .map(str::to_string),
                _ => None,
            })
            .collect()
    })
}

fn decode_array(value: &Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(items) => Some(items.clone()),
        Value::String(encoded) => match serde_json::from_str::<Value>(encoded) {
            Ok(Value::Array(items)) => Some(items),
            _ => None,
        },
        _ => None,
    }
}

/// Reduces an upstream date or timestamp to `YYYY-MM-DD`.
pub fn iso_date(raw: &str) -> Option<String> {
    let raw = raw.trim();

    let date = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.date()))
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()?;

    Some(date.format("%Y-%m-%d").to_string())
}

fn compose_address(raw: &RawListing) -> Option<String> {
    let street: Vec<&str> = [&raw.street_number, &raw.street_name, &raw.street_suffix]
        .into_iter()
        .filter_map(|part| part.as_deref())
        .collect();

    if street.is_empty() {
        return None;
    }

    let mut line = street.join(" ");
    if let Some(unit) = &raw.unit_number {
        line.push_str(&format!(" #{unit}"));
    }

    let state_zip: Vec<&str> = [&raw.state_or_province, &raw.postal_code]
        .into_iter()
        .filter_map(|part| part.as_deref())
        .collect();

    let mut parts = vec![line];
    if let Some(city) = &raw.city {
        parts.push(city.clone());
    }
    if !state_zip.is_empty() {
        parts.push(state_zip.join(" "));
    }

    Some(parts.join(", "))
}
