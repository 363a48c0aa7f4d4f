use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::lenient;

// RawListing (AppSync item, PascalCase)
//  ├── identity      ListingId, MlsStatus, StandardStatus
//  ├── pricing       ListPrice, ClosePrice, OriginalListPrice
//  ├── address       UnparsedAddress, Street*, UnitNumber, City, StateOrProvince, PostalCode
//  ├── physical      Bedrooms*, Bathrooms*, LivingArea, LotSizeAcres
//  ├── dates         ListingContractDate, CloseDate, ModificationTimestamp
//  ├── media         PreferredPhoto, Media (JSON string)
//  └── amenities     Cooling, Heating, LaundryFeatures, ParkingFeatures,
//                    AssociationAmenities (JSON strings)

/// Selection set requested from `listListings`. Kept in the same order as
/// the `RawListing` fields.
pub const RAW_LISTING_FIELDS: &[&str] = &[
    "ListingId",
    "MlsStatus",
    "StandardStatus",
    "ListPrice",
    "ClosePrice",
    "OriginalListPrice",
    "UnparsedAddress",
    "StreetNumber",
    "StreetName",
    "StreetSuffix",
    "UnitNumber",
    "City",
    "StateOrProvince",
    "PostalCode",
    "CountyOrParish",
    "SubdivisionName",
    "PropertyType",
    "PropertySubType",
    "BedroomsTotal",
    "BathroomsTotalInteger",
    "BathroomsFull",
    "BathroomsHalf",
    "BathroomsThreeQuarter",
    "LivingArea",
    "LotSizeAcres",
    "YearBuilt",
    "DaysOnMarket",
    "GarageSpaces",
    "ListingContractDate",
    "CloseDate",
    "ModificationTimestamp",
    "PreferredPhoto",
    "Media",
    "Latitude",
    "Longitude",
    "ListAgentMlsId",
    "ListAgentFullName",
    "ListOfficeMlsId",
    "ListOfficeName",
    "BuyerAgentMlsId",
    "BuyerOfficeMlsId",
    "PublicRemarks",
    "Cooling",
    "Heating",
    "LaundryFeatures",
    "ParkingFeatures",
    "AssociationAmenities",
];

/// One item of the GraphQL `listListings` connection.
///
/// Every field decodes leniently: a value of the wrong JSON type becomes
/// `None` so a single bad field never rejects the record.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RawListing {
    #[serde(deserialize_with = "lenient::opt_string")]
    pub listing_id: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub mls_status: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub standard_status: Option<String>,

    #[serde(deserialize_with = "lenient::opt_f64")]
    pub list_price: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub close_price: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub original_list_price: Option<f64>,

    #[serde(deserialize_with = "lenient::opt_string")]
    pub unparsed_address: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub street_number: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub street_name: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub street_suffix: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub unit_number: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub city: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub state_or_province: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub postal_code: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub county_or_parish: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub subdivision_name: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub property_type: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub property_sub_type: Option<String>,

    #[serde(deserialize_with = "lenient::opt_i64")]
    pub bedrooms_total: Option<i64>,
    #[serde(deserialize_with = "lenient::opt_i64")]
    pub bathrooms_total_integer: Option<i64>,
    #[serde(deserialize_with = "lenient::opt_i64")]
    pub bathrooms_full: Option<i64>,
    #[serde(deserialize_with = "lenient::opt_i64")]
    pub bathrooms_half: Option<i64>,
    #[serde(deserialize_with = "lenient::opt_i64")]
    pub bathrooms_three_quarter: Option<i64>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub living_area: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub lot_size_acres: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_i64")]
    pub year_built: Option<i64>,
    #[serde(deserialize_with = "lenient::opt_i64")]
    pub days_on_market: Option<i64>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub garage_spaces: Option<f64>,

    #[serde(deserialize_with = "lenient::opt_string")]
    pub listing_contract_date: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub close_date: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub modification_timestamp: Option<String>,

    #[serde(deserialize_with = "lenient::opt_string")]
    pub preferred_photo: Option<String>,
    #[serde(deserialize_with = "lenient::opt_raw")]
    pub media: Option<Value>,

    #[serde(deserialize_with = "lenient::opt_f64")]
    pub latitude: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub longitude: Option<f64>,

    #[serde(deserialize_with = "lenient::opt_string")]
    pub list_agent_mls_id: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub list_agent_full_name: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub list_office_mls_id: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub list_office_name: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub buyer_agent_mls_id: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub buyer_office_mls_id: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub public_remarks: Option<String>,

    #[serde(deserialize_with = "lenient::opt_raw")]
    pub cooling: Option<Value>,
    #[serde(deserialize_with = "lenient::opt_raw")]
    pub heating: Option<Value>,
    #[serde(deserialize_with = "lenient::opt_raw")]
    pub laundry_features: Option<Value>,
    #[serde(deserialize_with = "lenient::opt_raw")]
    pub parking_features: Option<Value>,
    #[serde(deserialize_with = "lenient::opt_raw")]
    pub association_amenities: Option<Value>,
}

/// The canonical listing shape. Rows from the relational view deserialize
/// into it directly; GraphQL items get here through `normalize`.
///
/// All `Option` fields serialize as `null`, so consumers can rely on every
/// key being present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizedListing {
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(deserialize_with = "lenient::string")]
    pub listing_id: String,
    #[serde(deserialize_with = "lenient::string")]
    pub status: String,

    #[serde(deserialize_with = "lenient::opt_f64")]
    pub list_price: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub sold_price: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub original_list_price: Option<f64>,

    // Address
    #[serde(deserialize_with = "lenient::opt_string")]
    pub address: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub street_number: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub street_name: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub street_suffix: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub unit_number: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub city: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub state: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub zip_code: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub county: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub subdivision_name: Option<String>,

    // Details
    #[serde(deserialize_with = "lenient::opt_string")]
    pub property_type: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub property_sub_type: Option<String>,
    #[serde(deserialize_with = "lenient::opt_i64")]
    pub bedrooms: Option<i64>,
    #[serde(deserialize_with = "lenient::opt_i64")]
    pub bathrooms_total: Option<i64>,
    #[serde(deserialize_with = "lenient::opt_i64")]
    pub bathrooms_full: Option<i64>,
    #[serde(deserialize_with = "lenient::opt_i64")]
    pub bathrooms_half: Option<i64>,
    #[serde(deserialize_with = "lenient::opt_i64")]
    pub bathrooms_three_quarter: Option<i64>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub square_feet: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub lot_size_acres: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_i64")]
    pub year_built: Option<i64>,
    #[serde(deserialize_with = "lenient::opt_i64")]
    pub days_on_market: Option<i64>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub garage_spaces: Option<f64>,

    // Dates (YYYY-MM-DD)
    #[serde(deserialize_with = "lenient::opt_string")]
    pub listing_date: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub close_date: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub modification_timestamp: Option<String>,

    // Media
    #[serde(deserialize_with = "lenient::opt_string")]
    pub preferred_photo: Option<String>,
    #[serde(deserialize_with = "lenient::string_array")]
    pub media: Option<Vec<String>>,

    #[serde(deserialize_with = "lenient::opt_f64")]
    pub latitude: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub longitude: Option<f64>,

    // Agent / office
    #[serde(deserialize_with = "lenient::opt_string")]
    pub list_agent_id: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub list_agent_name: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub list_office_id: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub list_office_name: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub buyer_agent_id: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub buyer_office_id: Option<String>,

    #[serde(deserialize_with = "lenient::opt_string")]
    pub public_remarks: Option<String>,

    // Amenities
    #[serde(deserialize_with = "lenient::string_array")]
    pub cooling: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient::string_array")]
    pub heating: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient::string_array")]
    pub laundry_features: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient::string_array")]
    pub parking_features: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient::string_array")]
    pub association_amenities: Option<Vec<String>>,
}

impl NormalizedListing {
    /// Rows from the relational view may omit `id` or carry a blank status.
    /// Returns `false` when the row has no usable identity at all.
    pub fn ensure_identity(&mut self) -> bool {
        if self.listing_id.is_empty() {
            if self.id.is_empty() {
                return false;
            }
            self.listing_id = self.id.clone();
        }
        self.id = self.listing_id.clone();

        if self.status.trim().is_empty() {
            self.status = super::normalize::UNKNOWN_STATUS.to_string();
        }
        true
    }
}

/// One page of a filtered, sorted listing set.
#[derive(Debug, Clone, Serialize)]
pub struct ListingPage {
    pub items: Vec<NormalizedListing>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

impl ListingPage {
    pub fn empty(page: usize, page_size: usize) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page,
            page_size,
            total_pages: 0,
        }
    }
}
