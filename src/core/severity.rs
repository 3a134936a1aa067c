//! Severity banding for uptime ratios, certificate expiry, and live status.

use serde::{Deserialize, Serialize};

/// Severity band for an uptime percentage.
///
/// One canonical four-band scale, used for day coloring and the live
/// badge alike.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum UptimeBand {
    Critical,
    Warning,
    Good,
    Excellent,
}

impl UptimeBand {
    /// Human label shown next to the colored bar.
    pub fn label(&self) -> &'static str {
        match self {
            UptimeBand::Excellent => "Excellent",
            UptimeBand::Good => "Good",
            UptimeBand::Warning => "Fair",
            UptimeBand::Critical => "Critical",
        }
    }

}

/// Classify an uptime percentage into its severity band.
///
/// Inclusive lower bounds, evaluated high to low: >= 99, >= 95, >= 90.
pub fn classify_uptime(percentage: f64) -> UptimeBand {
    if percentage >= 99.0 {
        UptimeBand::Excellent
    } else if percentage >= 95.0 {
        UptimeBand::Good
    } else if percentage >= 90.0 {
        UptimeBand::Warning
    } else {
        UptimeBand::Critical
    }
}

/// Severity band for days until certificate expiry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum CertBand {
    Expired,
    Urgent,
    Soon,
    Valid,
}

/// Classify days-until-expiry into its severity band.
///
/// `None` means the certificate state is still pending or not applicable
/// (plain-HTTP endpoint) and is distinct from every real band.
pub fn classify_certificate_expiry(days_remaining: Option<i64>) -> Option<CertBand> {
    let days = days_remaining?;
    Some(if days <= 0 {
        CertBand::Expired
    } else if days <= 7 {
        CertBand::Urgent
    } else if days <= 30 {
        CertBand::Soon
    } else {
        CertBand::Valid
    })
}

/// Map an HTTP status code to the live-status label shown on the page.
pub fn status_code_label(code: u16) -> &'static str {
    match code {
        200 | 201 => "up",
        301 | 302 => "redirect",
        400 => "bad request",
        401 => "unauthorized",
        403 => "forbidden",
        404 => "not found",
        500 => "server error",
        502 => "bad gateway",
        503 => "service unavailable",
        504 => "gateway timeout",
        _ => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uptime_band_boundaries() {
        assert_eq!(classify_uptime(100.0), UptimeBand::Excellent);
        assert_eq!(classify_uptime(99.0), UptimeBand::Excellent);
        assert_eq!(classify_uptime(98.999), UptimeBand::Good);
        assert_eq!(classify_uptime(95.0), UptimeBand::Good);
        assert_eq!(classify_uptime(94.999), UptimeBand::Warning);
        assert_eq!(classify_uptime(90.0), UptimeBand::Warning);
        assert_eq!(classify_uptime(89.999), UptimeBand::Critical);
        assert_eq!(classify_uptime(0.0), UptimeBand::Critical);
    }

    #[test]
    fn test_band_labels() {
        assert_eq!(classify_uptime(99.5).label(), "Excellent");
        assert_eq!(classify_uptime(92.0).label(), "Fair");
        assert_eq!(classify_uptime(10.0).label(), "Critical");
    }

    #[test]
    fn test_uptime_band_ordering() {
        assert!(UptimeBand::Critical < UptimeBand::Warning);
        assert!(UptimeBand::Warning < UptimeBand::Good);
        assert!(UptimeBand::Good < UptimeBand::Excellent);
    }

    #[test]
    fn test_cert_band_boundaries() {
        assert_eq!(classify_certificate_expiry(None), None);
        assert_eq!(classify_certificate_expiry(Some(-3)), Some(CertBand::Expired));
        assert_eq!(classify_certificate_expiry(Some(0)), Some(CertBand::Expired));
        assert_eq!(classify_certificate_expiry(Some(1)), Some(CertBand::Urgent));
        assert_eq!(classify_certificate_expiry(Some(7)), Some(CertBand::Urgent));
        assert_eq!(classify_certificate_expiry(Some(8)), Some(CertBand::Soon));
        assert_eq!(classify_certificate_expiry(Some(30)), Some(CertBand::Soon));
        assert_eq!(classify_certificate_expiry(Some(31)), Some(CertBand::Valid));
        assert_eq!(classify_certificate_expiry(Some(365)), Some(CertBand::Valid));
    }

    #[test]
    fn test_classification_is_stable() {
        for pct in [0.0, 89.999, 90.0, 95.0, 99.0, 100.0] {
            assert_eq!(classify_uptime(pct), classify_uptime(pct));
        }
    }

    #[test]
    fn test_status_code_labels() {
        assert_eq!(status_code_label(200), "up");
        assert_eq!(status_code_label(201), "up");
        assert_eq!(status_code_label(302), "redirect");
        assert_eq!(status_code_label(503), "service unavailable");
        assert_eq!(status_code_label(418), "unknown");
    }
}
