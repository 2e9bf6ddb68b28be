//! Interface descriptor file loading.
//!
//! The MAS host agent writes a JSON array describing every interface it
//! provisioned on the host:
//!
//! ```json
//! [
//!   {
//!     "MacAddress": "000D3A6E1825",
//!     "IsPrimary": true,
//!     "IPSubnets": [
//!       {
//!         "Prefix": "1.0.0.0/12",
//!         "IPAddresses": [
//!           { "Address": "1.0.0.4", "IsPrimary": true },
//!           { "Address": "1.0.0.5", "IsPrimary": false }
//!         ]
//!       }
//!     ]
//!   }
//! ]
//! ```

use crate::error::{IpamError, IpamResult};
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// A declared interface and the subnets assigned to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InterfaceDescriptor {
    /// Hardware address in any case and separator style.
    #[serde(default)]
    pub mac_address: Option<String>,

    /// Interface name, consulted only when no MAC address is given.
    #[serde(default)]
    pub name: Option<String>,

    /// True for the host's primary interface.
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_primary: bool,

    #[serde(rename = "IPSubnets", default, deserialize_with = "null_as_default")]
    pub subnets: Vec<SubnetDescriptor>,
}

/// A subnet declared on an interface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SubnetDescriptor {
    /// CIDR notation, host bits allowed.
    #[serde(default, deserialize_with = "null_as_default")]
    pub prefix: String,

    #[serde(rename = "IPAddresses", default, deserialize_with = "null_as_default")]
    pub addresses: Vec<AddressDescriptor>,
}

/// An address declared inside a subnet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AddressDescriptor {
    #[serde(default, deserialize_with = "null_as_default")]
    pub address: String,

    /// Host-reserved addresses are never pooled.
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_primary: bool,
}

impl InterfaceDescriptor {
    /// Returns the MAC address if present and non-empty.
    pub fn mac_address(&self) -> Option<&str> {
        self.mac_address.as_deref().filter(|mac| !mac.is_empty())
    }

    /// Returns the interface name if present and non-empty.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }
}

/// Reads JSON `null` as the field's zero value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Parses descriptor content already held in memory.
pub fn parse_descriptors(content: &str) -> serde_json::Result<Vec<InterfaceDescriptor>> {
    serde_json::from_str(content)
}

/// Reads and parses the descriptor file at `path`.
///
/// Both failures are fatal to the caller; nothing is returned from a partially
/// readable or partially valid file.
pub fn load_descriptors(path: &Path) -> IpamResult<Vec<InterfaceDescriptor>> {
    let content = fs::read_to_string(path).map_err(|source| IpamError::DescriptorRead {
        path: path.to_path_buf(),
        source,
    })?;

    let descriptors = parse_descriptors(&content).map_err(|source| IpamError::DescriptorParse {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(
        path = %path.display(),
        count = descriptors.len(),
        "Loaded interface descriptors"
    );

    Ok(descriptors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const SAMPLE: &str = r#"[
        {
            "Name": "eth0",
            "IsPrimary": false,
            "IPSubnets": [
                {
                    "Prefix": "10.240.0.0/12",
                    "IPAddresses": [
                        { "Address": "10.240.0.4", "IsPrimary": true },
                        { "Address": "10.240.0.5", "IsPrimary": false }
                    ]
                }
            ]
        },
        {
            "MacAddress": "000D3A6E1825",
            "IsPrimary": true,
            "IPSubnets": [
                {
                    "Prefix": "1.0.0.0/12",
                    "IPAddresses": [
                        { "Address": "1.0.0.4", "IsPrimary": true },
                        { "Address": "1.0.0.5", "IsPrimary": false }
                    ]
                }
            ]
        }
    ]"#;

    #[test]
    fn test_parse_sample() {
        let descriptors = parse_descriptors(SAMPLE).unwrap();

        let expected = vec![
            InterfaceDescriptor {
                mac_address: None,
                name: Some("eth0".to_string()),
                is_primary: false,
                subnets: vec![SubnetDescriptor {
                    prefix: "10.240.0.0/12".to_string(),
                    addresses: vec![
                        AddressDescriptor {
                            address: "10.240.0.4".to_string(),
                            is_primary: true,
                        },
                        AddressDescriptor {
                            address: "10.240.0.5".to_string(),
                            is_primary: false,
                        },
                    ],
                }],
            },
            InterfaceDescriptor {
                mac_address: Some("000D3A6E1825".to_string()),
                name: None,
                is_primary: true,
                subnets: vec![SubnetDescriptor {
                    prefix: "1.0.0.0/12".to_string(),
                    addresses: vec![
                        AddressDescriptor {
                            address: "1.0.0.4".to_string(),
                            is_primary: true,
                        },
                        AddressDescriptor {
                            address: "1.0.0.5".to_string(),
                            is_primary: false,
                        },
                    ],
                }],
            },
        ];

        assert_eq!(descriptors, expected);
    }

    #[test]
    fn test_missing_and_null_fields_default() {
        let descriptors =
            parse_descriptors(r#"[{"Name": "eth1", "IPSubnets": null}, {"Unknown": 1}]"#).unwrap();

        assert_eq!(descriptors.len(), 2);
        assert_eq!(descriptors[0].name(), Some("eth1"));
        assert!(!descriptors[0].is_primary);
        assert!(descriptors[0].subnets.is_empty());
        assert_eq!(descriptors[1], InterfaceDescriptor::default());
    }

    #[test]
    fn test_null_scalars_default() {
        let descriptors = parse_descriptors(
            r#"[{
                "MacAddress": null,
                "Name": "eth0",
                "IsPrimary": null,
                "IPSubnets": [
                    {"Prefix": null, "IPAddresses": null},
                    {
                        "Prefix": "10.0.0.0/24",
                        "IPAddresses": [
                            {"Address": null, "IsPrimary": null},
                            {"Address": "10.0.0.5"}
                        ]
                    }
                ]
            }]"#,
        )
        .unwrap();

        let descriptor = &descriptors[0];
        assert_eq!(descriptor.mac_address(), None);
        assert!(!descriptor.is_primary);
        assert_eq!(descriptor.subnets[0], SubnetDescriptor::default());
        assert_eq!(
            descriptor.subnets[1].addresses,
            vec![
                AddressDescriptor::default(),
                AddressDescriptor {
                    address: "10.0.0.5".to_string(),
                    is_primary: false,
                },
            ]
        );
    }

    #[test]
    fn test_empty_strings_are_absent() {
        let descriptor = InterfaceDescriptor {
            mac_address: Some(String::new()),
            name: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(descriptor.mac_address(), None);
        assert_eq!(descriptor.name(), None);
    }

    #[test]
    fn test_parse_rejects_non_list() {
        assert!(parse_descriptors(r#"{"Name": "eth0"}"#).is_err());
        assert!(parse_descriptors("not json").is_err());
        assert!(parse_descriptors(r#"[{"Name": "eth0""#).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let descriptors = load_descriptors(file.path()).unwrap();
        assert_eq!(descriptors.len(), 2);
        assert_eq!(descriptors[1].mac_address(), Some("000D3A6E1825"));
    }

    #[test]
    fn test_load_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"// not a descriptor file").unwrap();

        match load_descriptors(file.path()) {
            Err(IpamError::DescriptorParse { path, .. }) => assert_eq!(path, file.path()),
            other => panic!("Expected DescriptorParse error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_nonexistent_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad");

        match load_descriptors(&path) {
            Err(IpamError::DescriptorRead { source, .. }) => {
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("Expected DescriptorRead error, got {:?}", other),
        }
    }
}
