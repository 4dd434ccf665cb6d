use crate::record::LineItem;

/// Canonical vendor name and the manufacturer spellings that map to it.
///
/// Matching is case-insensitive on the trimmed manufacturer name.
static VENDOR_ALIASES: &[(&str, &[&str])] = &[
    ("Cisco", &["cisco", "cisco systems", "meraki", "cisco meraki"]),
    (
        "HP",
        &[
            "hp",
            "hewlett-packard",
            "hpe",
            "hewlett packard",
            "aruba",
            "aruba networks",
            "hewlett packard enterprise",
        ],
    ),
    ("Juniper", &["juniper", "juniper networks"]),
    ("Ubiquiti", &["ubiquiti", "ubnt", "ubiquiti networks"]),
    ("Arista", &["arista", "arista networks"]),
    ("Fortinet", &["fortinet", "fortigate"]),
    ("Ruckus", &["ruckus", "ruckus wireless", "commscope ruckus"]),
    ("Netgear", &["netgear"]),
    ("Dell", &["dell", "dell emc", "dell technologies"]),
    ("Extreme", &["extreme", "extreme networks"]),
    ("Allied", &["allied", "allied telesis"]),
    ("Adtran", &["adtran"]),
    ("SonicWall", &["sonicwall"]),
    ("WatchGuard", &["watchguard", "watch guard technologies"]),
    ("Palo Alto", &["palo alto", "palo alto networks"]),
];

/// Returns the canonical vendor for a tracked network-equipment manufacturer.
pub fn standardize(manufacturer: &str) -> Option<&'static str> {
    let needle = manufacturer.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    VENDOR_ALIASES
        .iter()
        .find(|(_, aliases)| aliases.contains(&needle.as_str()))
        .map(|(vendor, _)| *vendor)
}

/// Which line items survive into aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VendorFilter {
    /// Only manufacturers listed in the vendor alias table.
    #[default]
    NetworkEquipment,
    /// Every line item.
    All,
}

impl VendorFilter {
    pub fn accepts(&self, item: &LineItem) -> bool {
        match self {
            VendorFilter::NetworkEquipment => standardize(&item.manufacturer).is_some(),
            VendorFilter::All => true,
        }
    }

    /// Short label for report headings.
    pub fn describe(&self) -> &'static str {
        match self {
            VendorFilter::NetworkEquipment => "Network equipment vendors",
            VendorFilter::All => "All vendors",
        }
    }
}
