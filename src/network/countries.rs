use serde::Deserialize;

use crate::common::Country;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
struct RestCountry {
    name: RestName,
    #[serde(default)]
    idd: Option<RestIdd>,
    #[serde(default)]
    flags: Option<RestFlags>,
}

#[derive(Debug, Deserialize)]
struct RestName {
    common: String,
}

#[derive(Debug, Deserialize)]
struct RestIdd {
    #[serde(default)]
    root: Option<String>,
    #[serde(default)]
    suffixes: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RestFlags {
    #[serde(default)]
    svg: String,
}

/// Used when the country service is unreachable.
pub fn fallback_countries() -> Vec<Country> {
    [
        ("United States", "+1", "🇺🇸"),
        ("India", "+91", "🇮🇳"),
        ("United Kingdom", "+44", "🇬🇧"),
        ("Canada", "+1", "🇨🇦"),
        ("Australia", "+61", "🇦🇺"),
    ]
    .into_iter()
    .map(|(name, dial_code, flag)| Country {
        name: name.to_string(),
        dial_code: dial_code.to_string(),
        flag: flag.to_string(),
    })
    .collect()
}

fn into_countries(raw: Vec<RestCountry>) -> Vec<Country> {
    let mut countries: Vec<Country> = raw
        .into_iter()
        .filter_map(|country| {
            let idd = country.idd?;
            let root = idd.root.filter(|root| !root.is_empty())?;
            let suffix = idd.suffixes.into_iter().next().unwrap_or_default();
            Some(Country {
                name: country.name.common,
                dial_code: format!("{root}{suffix}"),
                flag: country.flags.map(|flags| flags.svg).unwrap_or_default(),
            })
        })
        .collect();
    countries.sort_by(|a, b| a.name.cmp(&b.name));
    countries
}

async fn request_countries(http: &reqwest::Client, url: &str) -> Result<Vec<Country>, ApiError> {
    let raw = http
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json::<Vec<RestCountry>>()
        .await?;
    Ok(into_countries(raw))
}

/// Dialing codes sorted by country name, or the fallback list on any failure.
pub async fn fetch_countries(http: &reqwest::Client, url: &str) -> Vec<Country> {
    match request_countries(http, url).await {
        Ok(countries) if !countries.is_empty() => countries,
        Ok(_) => {
            log::warn!("Country service returned no dialing codes; using fallback list");
            fallback_countries()
        }
        Err(err) => {
            log::warn!("Error fetching countries ({err}); using fallback list");
            fallback_countries()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_countries_with_root_and_sorts_by_name() {
        let raw: Vec<RestCountry> = serde_json::from_str(
            r#"[
                {"name": {"common": "Norway"}, "idd": {"root": "+4", "suffixes": ["7"]}, "flags": {"svg": "no.svg"}},
                {"name": {"common": "Antarctica"}, "idd": {}, "flags": {"svg": "aq.svg"}},
                {"name": {"common": "Germany"}, "idd": {"root": "+4", "suffixes": ["9"]}, "flags": {"svg": "de.svg"}},
                {"name": {"common": "Kosovo"}, "idd": {"root": "+383"}}
            ]"#,
        )
        .unwrap();

        let countries = into_countries(raw);
        let codes: Vec<_> = countries
            .iter()
            .map(|c| (c.name.as_str(), c.dial_code.as_str()))
            .collect();
        assert_eq!(codes, vec![("Germany", "+49"), ("Kosovo", "+383"), ("Norway", "+47")]);
    }

    #[test]
    fn fallback_has_five_entries() {
        let fallback = fallback_countries();
        assert_eq!(fallback.len(), 5);
        assert_eq!(fallback[1].dial_code, "+91");
    }
}
