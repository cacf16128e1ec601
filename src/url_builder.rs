// Copyright 2025 Memophor Labs
// SPDX-License-Identifier: Apache-2.0

//! Upstream request URL construction.
//!
//! Credentials travel as query parameters, so every URL that reaches a log line
//! must go through [`sanitize_for_logging`] first.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::config::ComlineApiConfig;

pub const MID_PARAM: &str = "mid";
pub const ACTION_PARAM: &str = "action";
pub const CUSTOMER_NUMBER_PARAM: &str = "kdnr";
pub const PASSWORD_PARAM: &str = "pwd";
pub const ACCESS_TOKEN_PARAM: &str = "accesstoken";
pub const PRODUCT_ID_PARAM: &str = "cto_nr";

const MASK: &str = "***";

static SECRET_PARAMS: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(
        r"(?P<key>[?&](?:{}|{})=)[^&#]*",
        regex::escape(PASSWORD_PARAM),
        regex::escape(ACCESS_TOKEN_PARAM)
    );
    Regex::new(&pattern).expect("secret parameter pattern is valid")
});

/// Builds ComLine product URLs from the static account settings.
#[derive(Debug, Clone)]
pub struct ProductUrlBuilder {
    base: Url,
    mid: String,
    action: String,
    customer_number: String,
    password: String,
}

impl ProductUrlBuilder {
    pub fn new(config: &ComlineApiConfig) -> Result<Self, url::ParseError> {
        Ok(Self {
            base: Url::parse(&config.base_url)?,
            mid: config.mid.clone(),
            action: config.action.clone(),
            customer_number: config.customer_number.clone(),
            password: config.password.clone(),
        })
    }

    /// Request URL for one product, parameters in the order ComLine documents them.
    pub fn build(&self, product_id: &str, access_token: &str) -> String {
        let mut url = self.base.clone();
        url.query_pairs_mut()
            .append_pair(MID_PARAM, &self.mid)
            .append_pair(ACTION_PARAM, &self.action)
            .append_pair(CUSTOMER_NUMBER_PARAM, &self.customer_number)
            .append_pair(PASSWORD_PARAM, &self.password)
            .append_pair(ACCESS_TOKEN_PARAM, access_token)
            .append_pair(PRODUCT_ID_PARAM, product_id);
        url.into()
    }
}

/// Mask the password and access token values of a request URL.
pub fn sanitize_for_logging(url: &str) -> Cow<'_, str> {
    SECRET_PARAMS.replace_all(url, format!("${{key}}{MASK}").as_str())
}
