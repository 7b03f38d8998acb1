//! UPnP device descriptor parsing and matching.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::net::IpAddr;

use roxmltree::Document;
use url::Url;

use crate::error::Result;

// ============================================================================
// Constants
// ============================================================================

/// Placeholder for a missing `friendlyName` or `modelName`.
pub const UNKNOWN: &str = "Unknown";

/// Default vendor token.
pub const DEFAULT_VENDOR: &str = "LG";

/// Default platform token.
pub const DEFAULT_PLATFORM: &str = "webOS";

// ============================================================================
// DeviceInfo
// ============================================================================

/// Fields read from a descriptor document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceInfo {
    /// `manufacturer` element.
    pub manufacturer: Option<String>,
    /// `modelName` element.
    pub model_name: Option<String>,
    /// `friendlyName` element.
    pub friendly_name: Option<String>,
}

impl DeviceInfo {
    /// Parses a descriptor document.
    ///
    /// Elements are looked up among all descendants in the root element's
    /// namespace, or in no namespace when the root has none.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Xml`](crate::Error::Xml) if the document is not well-formed.
    pub fn parse(xml: &str) -> Result<Self> {
        let document = Document::parse(xml)?;
        let namespace = document.root_element().tag_name().namespace();

        let field = |name: &str| {
            document
                .descendants()
                .find(|node| {
                    node.is_element()
                        && node.tag_name().name() == name
                        && node.tag_name().namespace() == namespace
                })
                .and_then(|node| node.text())
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map(str::to_string)
        };

        Ok(Self {
            manufacturer: field("manufacturer"),
            model_name: field("modelName"),
            friendly_name: field("friendlyName"),
        })
    }

    /// Builds the public descriptor, defaulting missing names.
    #[must_use]
    pub fn into_descriptor(self, ip: IpAddr, location: Url) -> DeviceDescriptor {
        DeviceDescriptor {
            ip,
            friendly_name: self.friendly_name.unwrap_or_else(|| UNKNOWN.to_string()),
            model_name: self.model_name.unwrap_or_else(|| UNKNOWN.to_string()),
            manufacturer: self.manufacturer.unwrap_or_else(|| UNKNOWN.to_string()),
            location,
        }
    }
}

// ============================================================================
// DeviceDescriptor
// ============================================================================

/// A discovered TV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    /// Source address of the SSDP reply.
    pub ip: IpAddr,
    /// `friendlyName`, or `"Unknown"`.
    pub friendly_name: String,
    /// `modelName`, or `"Unknown"`.
    pub model_name: String,
    /// `manufacturer`.
    pub manufacturer: String,
    /// Descriptor document address.
    pub location: Url,
}

impl fmt::Display for DeviceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) at {}", self.friendly_name, self.model_name, self.ip)
    }
}

// ============================================================================
// DeviceMatcher
// ============================================================================

/// Accepts descriptors by vendor and platform substrings.
///
/// The vendor token is searched in `manufacturer`, the platform token in
/// `modelName`. A missing field never matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceMatcher {
    /// Token expected in `manufacturer`.
    pub vendor: String,
    /// Token expected in `modelName`.
    pub platform: String,
    /// Compare with exact case.
    pub case_sensitive: bool,
}

impl Default for DeviceMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_VENDOR, DEFAULT_PLATFORM)
    }
}

impl DeviceMatcher {
    /// Creates a case-sensitive matcher.
    #[must_use]
    pub fn new(vendor: impl Into<String>, platform: impl Into<String>) -> Self {
        Self {
            vendor: vendor.into(),
            platform: platform.into(),
            case_sensitive: true,
        }
    }

    /// Sets case sensitivity.
    #[inline]
    #[must_use]
    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Returns `true` if `info` describes a wanted device.
    #[must_use]
    pub fn matches(&self, info: &DeviceInfo) -> bool {
        let contains = |field: &Option<String>, token: &str| {
            field.as_deref().is_some_and(|value| {
                if self.case_sensitive {
                    value.contains(token)
                } else {
                    value.to_lowercase().contains(&token.to_lowercase())
                }
            })
        };

        contains(&info.manufacturer, &self.vendor) && contains(&info.model_name, &self.platform)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::net::Ipv4Addr;

    const NAMESPACED: &str = r#"<?xml version="1.0"?>
<root xmlns="urn:schemas-upnp-org:device-1-0" xmlns:dlna="urn:schemas-dlna-org:device-1-0">
  <specVersion><major>1</major><minor>0</minor></specVersion>
  <device>
    <deviceType>urn:schemas-upnp-org:device:Basic:1</deviceType>
    <friendlyName>Living Room TV</friendlyName>
    <manufacturer>LG Electronics</manufacturer>
    <modelName>webOSTV 6.0</modelName>
  </device>
</root>"#;

    fn info(manufacturer: &str, model_name: &str) -> DeviceInfo {
        DeviceInfo {
            manufacturer: Some(manufacturer.into()),
            model_name: Some(model_name.into()),
            friendly_name: None,
        }
    }

    #[test]
    fn test_parse_namespaced_descriptor() {
        let info = DeviceInfo::parse(NAMESPACED).expect("parse");
        assert_eq!(info.manufacturer.as_deref(), Some("LG Electronics"));
        assert_eq!(info.model_name.as_deref(), Some("webOSTV 6.0"));
        assert_eq!(info.friendly_name.as_deref(), Some("Living Room TV"));
    }

    #[test]
    fn test_parse_without_namespace() {
        let xml = "<root><device><manufacturer> LG </manufacturer>\
                   <modelName>webOS</modelName></device></root>";
        let info = DeviceInfo::parse(xml).expect("parse");
        assert_eq!(info.manufacturer.as_deref(), Some("LG"));
        assert_eq!(info.model_name.as_deref(), Some("webOS"));
        assert_eq!(info.friendly_name, None);
    }

    #[test]
    fn test_other_namespace_is_ignored() {
        let xml = r#"<root xmlns="urn:a" xmlns:b="urn:b"><b:manufacturer>LG</b:manufacturer></root>"#;
        let info = DeviceInfo::parse(xml).expect("parse");
        assert_eq!(info.manufacturer, None);
    }

    #[test]
    fn test_malformed_xml() {
        assert!(DeviceInfo::parse("<root><device>").is_err());
    }

    #[test]
    fn test_descriptor_defaults_unknown() {
        let descriptor = DeviceInfo::default().into_descriptor(
            IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5)),
            Url::parse("http://10.0.0.5:1400/desc.xml").expect("url"),
        );
        assert_eq!(descriptor.friendly_name, UNKNOWN);
        assert_eq!(descriptor.model_name, UNKNOWN);
        assert_eq!(descriptor.to_string(), "Unknown (Unknown) at 10.0.0.5");
    }

    #[test]
    fn test_default_matcher_is_case_sensitive() {
        let matcher = DeviceMatcher::default();
        assert!(matcher.matches(&info("LG Electronics", "webOSTV 6.0")));
        assert!(!matcher.matches(&info("lg electronics", "webOSTV 6.0")));
        assert!(!matcher.matches(&info("LG Electronics", "WEBOS TV")));
        assert!(!matcher.matches(&info("Samsung", "Tizen")));
    }

    #[test]
    fn test_case_insensitive_matcher() {
        let matcher = DeviceMatcher::default().with_case_sensitive(false);
        assert!(matcher.matches(&info("lg electronics", "WEBOS TV")));
        assert!(matcher.matches(&info("LG Electronics", "webOSTV 6.0")));
        assert!(!matcher.matches(&info("Sony", "Bravia")));
    }

    #[test]
    fn test_missing_field_never_matches() {
        let matcher = DeviceMatcher::default().with_case_sensitive(false);
        let partial = DeviceInfo {
            manufacturer: Some("LG".into()),
            ..DeviceInfo::default()
        };
        assert!(!matcher.matches(&partial));
    }

    #[test]
    fn test_custom_tokens() {
        let matcher = DeviceMatcher::new("Sony", "Bravia");
        assert!(matcher.matches(&info("Sony Corporation", "Bravia KD-55")));
        assert!(!matcher.matches(&info("LG Electronics", "webOSTV 6.0")));
    }
}
