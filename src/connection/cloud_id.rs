use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;

use crate::error::{Error, Result};

const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decoded Elastic Cloud identifier.
///
/// The wire form is `<deployment-name>:<base64(parent_dn[:port]$es_uuid$kibana_uuid)>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudId {
    pub name: String,
    /// `<es_uuid>.<parent_dn>`
    pub host: String,
    /// Port embedded in the id, `None` when absent or 443.
    pub port: Option<u16>,
}

impl CloudId {
    pub fn parse(cloud_id: &str) -> Result<Self> {
        let malformed = || Error::ImproperlyConfigured("'cloud_id' is not properly formatted".into());

        let mut parts = cloud_id.split(':');
        let (name, encoded) = match (parts.next(), parts.next(), parts.next()) {
            (Some(name), Some(encoded), None) => (name, encoded),
            _ => return Err(malformed()),
        };

        let decoded = LENIENT_BASE64
            .decode(encoded.trim().as_bytes())
            .map_err(|_| malformed())?;
        let decoded = String::from_utf8(decoded).map_err(|_| malformed())?;

        let mut segments = decoded.split('$');
        let (parent_dn, es_uuid) = match (segments.next(), segments.next()) {
            (Some(dn), Some(uuid)) => (dn, uuid),
            _ => return Err(malformed()),
        };

        let (parent_dn, port) = match parent_dn.rsplit_once(':') {
            Some((dn, "443")) => (dn, None),
            Some((dn, port)) => (dn, Some(port.parse::<u16>().map_err(|_| malformed())?)),
            None => (parent_dn, None),
        };

        Ok(Self {
            name: name.to_string(),
            host: format!("{es_uuid}.{parent_dn}"),
            port,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(s: &str) -> String {
        base64::engine::general_purpose::STANDARD.encode(s)
    }

    #[test]
    fn test_parse_without_port() {
        let id = format!("cluster:{}", encode("us-east-1.aws.found.io$es123$kb456"));
        let cloud = CloudId::parse(&id).unwrap();
        assert_eq!(cloud.name, "cluster");
        assert_eq!(cloud.host, "es123.us-east-1.aws.found.io");
        assert_eq!(cloud.port, None);
    }

    #[test]
    fn test_parse_with_embedded_port() {
        let id = format!("cluster:{}", encode("westeurope.azure.elastic-cloud.com:9243$abc$def"));
        let cloud = CloudId::parse(&id).unwrap();
        assert_eq!(cloud.host, "abc.westeurope.azure.elastic-cloud.com");
        assert_eq!(cloud.port, Some(9243));
    }

    #[test]
    fn test_port_443_is_dropped() {
        let id = format!("c:{}", encode("example.com:443$abc$def"));
        assert_eq!(CloudId::parse(&id).unwrap().port, None);
    }

    #[test]
    fn test_missing_padding_is_accepted() {
        let encoded = encode("example.com$abc$def");
        let id = format!("c:{}", encoded.trim_end_matches('='));
        assert_eq!(CloudId::parse(&id).unwrap().host, "abc.example.com");
    }

    #[test]
    fn test_malformed_ids() {
        for bad in [
            "no-colon".to_string(),
            "a:b:c".to_string(),
            "c:!!!not-base64!!!".to_string(),
            format!("c:{}", encode("only-one-segment")),
            format!("c:{}", encode("example.com:notaport$abc$def")),
        ] {
            let err = CloudId::parse(&bad).unwrap_err();
            assert!(matches!(err, Error::ImproperlyConfigured(_)), "{bad}");
        }
    }
}
