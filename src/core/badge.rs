//! Embeddable uptime badge construction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Badge error types.
#[derive(Error, Debug, PartialEq)]
pub enum BadgeError {
    #[error("period '{0}' is not available on your plan")]
    InvalidPeriod(BadgePeriod),
    #[error("unknown badge period '{0}'")]
    UnknownPeriod(String),
}

/// Time window an uptime badge reports over.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum BadgePeriod {
    #[serde(rename = "24h")]
    H24,
    #[serde(rename = "7d")]
    D7,
    #[serde(rename = "30d")]
    D30,
    #[serde(rename = "90d")]
    D90,
}

impl BadgePeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            BadgePeriod::H24 => "24h",
            BadgePeriod::D7 => "7d",
            BadgePeriod::D30 => "30d",
            BadgePeriod::D90 => "90d",
        }
    }
}

impl fmt::Display for BadgePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BadgePeriod {
    type Err = BadgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "24h" => Ok(BadgePeriod::H24),
            "7d" => Ok(BadgePeriod::D7),
            "30d" => Ok(BadgePeriod::D30),
            "90d" => Ok(BadgePeriod::D90),
            other => Err(BadgeError::UnknownPeriod(other.to_string())),
        }
    }
}

/// Copy-to-clipboard badge material for one monitor and period.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BadgeArtifact {
    pub image_url: String,
    pub markdown_snippet: String,
    pub html_snippet: String,
    pub period: BadgePeriod,
}

/// Build the badge artifact for a monitor.
///
/// `allowed` is the caller's tier-gated period set; a period outside it is
/// an error so callers can show an upgrade prompt instead of silently
/// rendering a different window. Output is byte-identical for identical
/// input, since the snippets back copy-to-clipboard affordances.
pub fn build_badge(
    origin: &str,
    slug: &str,
    period: BadgePeriod,
    allowed: &[BadgePeriod],
) -> Result<BadgeArtifact, BadgeError> {
    if !allowed.contains(&period) {
        return Err(BadgeError::InvalidPeriod(period));
    }

    let image_url = format!("{}/badge/{}/{}.svg", origin, slug, period);
    let page_url = format!("{}/status/{}", origin, slug);

    Ok(BadgeArtifact {
        markdown_snippet: format!("[![uptime]({})]({})", image_url, page_url),
        html_snippet: format!(
            r#"<a href="{}"><img src="{}" alt="uptime"></a>"#,
            page_url, image_url
        ),
        image_url,
        period,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::resolve_policy;

    const ALL: [BadgePeriod; 4] = [
        BadgePeriod::H24,
        BadgePeriod::D7,
        BadgePeriod::D30,
        BadgePeriod::D90,
    ];

    #[test]
    fn test_badge_snippets() {
        let badge = build_badge("https://statusdeck.io", "my-api", BadgePeriod::D7, &ALL).unwrap();

        assert_eq!(badge.image_url, "https://statusdeck.io/badge/my-api/7d.svg");
        assert_eq!(
            badge.markdown_snippet,
            "[![uptime](https://statusdeck.io/badge/my-api/7d.svg)](https://statusdeck.io/status/my-api)"
        );
        assert_eq!(
            badge.html_snippet,
            r#"<a href="https://statusdeck.io/status/my-api"><img src="https://statusdeck.io/badge/my-api/7d.svg" alt="uptime"></a>"#
        );
        assert_eq!(badge.period, BadgePeriod::D7);
    }

    #[test]
    fn test_badge_is_idempotent() {
        let a = build_badge("https://statusdeck.io", "my-api", BadgePeriod::H24, &ALL).unwrap();
        let b = build_badge("https://statusdeck.io", "my-api", BadgePeriod::H24, &ALL).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_disallowed_period_is_rejected_not_clamped() {
        let free = resolve_policy("free");
        let err = build_badge("https://statusdeck.io", "my-api", BadgePeriod::D90, &free.badge_periods)
            .unwrap_err();
        assert_eq!(err, BadgeError::InvalidPeriod(BadgePeriod::D90));
    }

    #[test]
    fn test_business_tier_allows_all_periods() {
        let business = resolve_policy("business");
        for period in ALL {
            assert!(build_badge("http://localhost:8080", "x", period, &business.badge_periods).is_ok());
        }
    }

    #[test]
    fn test_period_parse() {
        assert_eq!("24h".parse::<BadgePeriod>().unwrap(), BadgePeriod::H24);
        assert_eq!("90d".parse::<BadgePeriod>().unwrap(), BadgePeriod::D90);
        assert_eq!(
            "1y".parse::<BadgePeriod>(),
            Err(BadgeError::UnknownPeriod("1y".to_string()))
        );
    }
}
