//! Conversion from the upstream record to the public product.

use url::{ParseError, Url};

use crate::attributes;
use crate::model::{PublicProduct, UpstreamProductRecord};

impl From<UpstreamProductRecord> for PublicProduct {
    fn from(record: UpstreamProductRecord) -> Self {
        let image = record.image_url.as_deref().and_then(normalize_image_url);
        let attributes = Some(attributes::parse(record.description.as_deref()))
            .filter(|attrs| !attrs.is_empty());

        PublicProduct {
            product_identifier: record.identifier,
            name: record.name,
            description: record.description,
            database_price: record.dealer_net_price,
            retail_price: record.retail_net_price,
            recommended_retail_price: record.rrp_net_price,
            gross_price: record.retail_gross_price,
            manufacturer_product_number: record.manufacturer_part_number,
            ean: record.ean,
            length: record.length,
            width: record.width,
            height: record.height,
            net_weight: record.net_weight,
            product_weight: record.gross_weight,
            delivery_date: record.delivery_date.map(|at| at.date_naive()),
            url: image.clone(),
            product_image: image,
            attributes,
        }
    }
}

/// Normalize an upstream image reference.
///
/// Protocol-relative references get an `https:` scheme. Absolute URLs and
/// relative references are kept as given; anything malformed is dropped.
pub fn normalize_image_url(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let candidate = if raw.starts_with("//") {
        format!("https:{raw}")
    } else {
        raw.to_string()
    };

    let parsed = match Url::parse(&candidate) {
        Err(ParseError::RelativeUrlWithoutBase) => {
            Url::parse(RELATIVE_BASE).and_then(|base| base.join(&candidate))
        }
        other => other,
    };

    match parsed {
        Ok(_) => {
            if candidate != raw {
                tracing::debug!(original = raw, url = %candidate, "converted protocol-relative url");
            }
            Some(candidate)
        }
        Err(error) => {
            tracing::warn!(url = raw, %error, "dropping invalid image url");
            None
        }
    }
}

// Only used to validate relative references; never part of the output.
const RELATIVE_BASE: &str = "https://relative.invalid/";
