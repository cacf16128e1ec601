// Copyright 2025 Memophor Labs
// SPDX-License-Identifier: Apache-2.0

//! Data models for the upstream ComLine payload and the public product API.
//!
//! Upstream types mirror the ComLine JSON keys; public types are what callers of
//! `/api/v1/products/{identifier}` receive.

use chrono::{DateTime, FixedOffset, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Top-level document returned by the ComLine API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamEnvelope {
    #[serde(default)]
    pub artikeldaten: Option<UpstreamProductRecord>,
    #[serde(default)]
    pub kundendaten: Option<UpstreamCustomerData>,
    #[serde(default)]
    pub checksum: Option<String>,
}

/// Product record (`artikeldaten`). Every field is optional on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpstreamProductRecord {
    #[serde(rename = "comline_artikelnummer")]
    pub identifier: Option<String>,
    #[serde(rename = "comline_artikelbezeichnung")]
    pub name: Option<String>,
    #[serde(rename = "comline_artikelbeschreibung")]
    pub description: Option<String>,

    /// Dealer purchase price, net
    #[serde(rename = "haendler_ek_netto")]
    pub dealer_net_price: Option<Decimal>,
    /// POS sales price, gross
    #[serde(rename = "pos_vk_brutto")]
    pub retail_gross_price: Option<Decimal>,
    /// POS sales price, net
    #[serde(rename = "pos_vk")]
    pub retail_net_price: Option<Decimal>,
    /// Recommended retail price, net
    #[serde(rename = "uvp_netto")]
    pub rrp_net_price: Option<Decimal>,

    #[serde(rename = "hersteller_artikelnummer")]
    pub manufacturer_part_number: Option<String>,
    pub ean: Option<String>,

    /// Dimensions in metres
    #[serde(rename = "artikel_laenge")]
    pub length: Option<f64>,
    #[serde(rename = "artikel_breite")]
    pub width: Option<f64>,
    #[serde(rename = "artikel_hoehe")]
    pub height: Option<f64>,

    /// Weights in kilograms
    #[serde(rename = "gewicht_netto")]
    pub net_weight: Option<f64>,
    #[serde(rename = "gewicht_brutto")]
    pub gross_weight: Option<f64>,

    #[serde(rename = "liefertermin")]
    pub delivery_date: Option<DateTime<FixedOffset>>,
    #[serde(rename = "url_bild")]
    pub image_url: Option<String>,
    #[serde(rename = "referenz_artikel")]
    pub reference_article: Option<String>,
}

/// Customer block (`kundendaten`) echoed back by ComLine. Decoded but not exposed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpstreamCustomerData {
    pub person_vorname: Option<String>,
    pub person_nachname: Option<String>,
    pub person_email: Option<String>,
    pub referenz_mid: Option<String>,
    pub referenz_p2: Option<String>,
    pub referenz_p3: Option<String>,
    pub ctopos_titel: Option<String>,
}

/// Product as exposed by this service.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProduct {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::arbitrary_precision_option"
    )]
    pub database_price: Option<Decimal>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::arbitrary_precision_option"
    )]
    pub retail_price: Option<Decimal>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::arbitrary_precision_option"
    )]
    pub recommended_retail_price: Option<Decimal>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::arbitrary_precision_option"
    )]
    pub gross_price: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer_product_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ean: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_weight: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_image: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,
}

/// Structured view of the free-text product description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_configuration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_adapter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyboard: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub legal: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub other: Vec<String>,
}

impl Attributes {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    #[serde(default, rename = "accessToken")]
    pub access_token: Option<String>,
}
