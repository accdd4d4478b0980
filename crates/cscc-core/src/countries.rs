//! Country display labels, keyed by ISO3 code.

use crate::CountryCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountryEntry {
    pub code: &'static str,
    pub label: &'static str,
}

impl CountryEntry {
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim().to_ascii_lowercase();
        if query.is_empty() {
            return true;
        }

        self.code.to_ascii_lowercase().contains(&query)
            || self.label.to_lowercase().contains(&query)
    }

    /// Lower rank sorts first: exact label, label prefix, code, substring.
    fn rank(&self, query: &str) -> u8 {
        let label = self.label.to_lowercase();
        if label == query {
            0
        } else if label.starts_with(query) {
            1
        } else if self.code.eq_ignore_ascii_case(query) {
            2
        } else {
            3
        }
    }
}

const COUNTRY_CATALOG: [CountryEntry; 164] = [
    CountryEntry {
        code: "WLD",
        label: "World",
    },
    CountryEntry {
        code: "AFG",
        label: "Afghanistan",
    },
    CountryEntry {
        code: "ALB",
        label: "Albania",
    },
    CountryEntry {
        code: "DZA",
        label: "Algeria",
    },
    CountryEntry {
        code: "AGO",
        label: "Angola",
    },
    CountryEntry {
        code: "ARG",
        label: "Argentina",
    },
    CountryEntry {
        code: "ARM",
        label: "Armenia",
    },
    CountryEntry {
        code: "AUS",
        label: "Australia",
    },
    CountryEntry {
        code: "AUT",
        label: "Austria",
    },
    CountryEntry {
        code: "AZE",
        label: "Azerbaijan",
    },
    CountryEntry {
        code: "BHS",
        label: "Bahamas",
    },
    CountryEntry {
        code: "BGD",
        label: "Bangladesh",
    },
    CountryEntry {
        code: "BLR",
        label: "Belarus",
    },
    CountryEntry {
        code: "BEL",
        label: "Belgium",
    },
    CountryEntry {
        code: "BLZ",
        label: "Belize",
    },
    CountryEntry {
        code: "BEN",
        label: "Benin",
    },
    CountryEntry {
        code: "BTN",
        label: "Bhutan",
    },
    CountryEntry {
        code: "BOL",
        label: "Bolivia",
    },
    CountryEntry {
        code: "BIH",
        label: "Bosnia and Herz.",
    },
    CountryEntry {
        code: "BWA",
        label: "Botswana",
    },
    CountryEntry {
        code: "BRA",
        label: "Brazil",
    },
    CountryEntry {
        code: "BRN",
        label: "Brunei",
    },
    CountryEntry {
        code: "BGR",
        label: "Bulgaria",
    },
    CountryEntry {
        code: "BFA",
        label: "Burkina Faso",
    },
    CountryEntry {
        code: "BDI",
        label: "Burundi",
    },
    CountryEntry {
        code: "KHM",
        label: "Cambodia",
    },
    CountryEntry {
        code: "CMR",
        label: "Cameroon",
    },
    CountryEntry {
        code: "CAN",
        label: "Canada",
    },
    CountryEntry {
        code: "CAF",
        label: "Central African Rep.",
    },
    CountryEntry {
        code: "TCD",
        label: "Chad",
    },
    CountryEntry {
        code: "CHL",
        label: "Chile",
    },
    CountryEntry {
        code: "CHN",
        label: "China",
    },
    CountryEntry {
        code: "COL",
        label: "Colombia",
    },
    CountryEntry {
        code: "COG",
        label: "Congo",
    },
    CountryEntry {
        code: "CRI",
        label: "Costa Rica",
    },
    CountryEntry {
        code: "CIV",
        label: "Côte d'Ivoire",
    },
    CountryEntry {
        code: "HRV",
        label: "Croatia",
    },
    CountryEntry {
        code: "CUB",
        label: "Cuba",
    },
    CountryEntry {
        code: "CZE",
        label: "Czechia",
    },
    CountryEntry {
        code: "COD",
        label: "Dem. Rep. Congo",
    },
    CountryEntry {
        code: "DNK",
        label: "Denmark",
    },
    CountryEntry {
        code: "DJI",
        label: "Djibouti",
    },
    CountryEntry {
        code: "DOM",
        label: "Dominican Rep.",
    },
    CountryEntry {
        code: "ECU",
        label: "Ecuador",
    },
    CountryEntry {
        code: "EGY",
        label: "Egypt",
    },
    CountryEntry {
        code: "SLV",
        label: "El Salvador",
    },
    CountryEntry {
        code: "GNQ",
        label: "Eq. Guinea",
    },
    CountryEntry {
        code: "ERI",
        label: "Eritrea",
    },
    CountryEntry {
        code: "EST",
        label: "Estonia",
    },
    CountryEntry {
        code: "SWZ",
        label: "eSwatini",
    },
    CountryEntry {
        code: "ETH",
        label: "Ethiopia",
    },
    CountryEntry {
        code: "FJI",
        label: "Fiji",
    },
    CountryEntry {
        code: "FIN",
        label: "Finland",
    },
    CountryEntry {
        code: "FRA",
        label: "France",
    },
    CountryEntry {
        code: "GAB",
        label: "Gabon",
    },
    CountryEntry {
        code: "GMB",
        label: "Gambia",
    },
    CountryEntry {
        code: "GEO",
        label: "Georgia",
    },
    CountryEntry {
        code: "DEU",
        label: "Germany",
    },
    CountryEntry {
        code: "GHA",
        label: "Ghana",
    },
    CountryEntry {
        code: "GRC",
        label: "Greece",
    },
    CountryEntry {
        code: "GTM",
        label: "Guatemala",
    },
    CountryEntry {
        code: "GIN",
        label: "Guinea",
    },
    CountryEntry {
        code: "GNB",
        label: "Guinea-Bissau",
    },
    CountryEntry {
        code: "GUY",
        label: "Guyana",
    },
    CountryEntry {
        code: "HTI",
        label: "Haiti",
    },
    CountryEntry {
        code: "HND",
        label: "Honduras",
    },
    CountryEntry {
        code: "HUN",
        label: "Hungary",
    },
    CountryEntry {
        code: "ISL",
        label: "Iceland",
    },
    CountryEntry {
        code: "IND",
        label: "India",
    },
    CountryEntry {
        code: "IDN",
        label: "Indonesia",
    },
    CountryEntry {
        code: "IRN",
        label: "Iran",
    },
    CountryEntry {
        code: "IRQ",
        label: "Iraq",
    },
    CountryEntry {
        code: "IRL",
        label: "Ireland",
    },
    CountryEntry {
        code: "ISR",
        label: "Israel",
    },
    CountryEntry {
        code: "ITA",
        label: "Italy",
    },
    CountryEntry {
        code: "JAM",
        label: "Jamaica",
    },
    CountryEntry {
        code: "JPN",
        label: "Japan",
    },
    CountryEntry {
        code: "JOR",
        label: "Jordan",
    },
    CountryEntry {
        code: "KAZ",
        label: "Kazakhstan",
    },
    CountryEntry {
        code: "KEN",
        label: "Kenya",
    },
    CountryEntry {
        code: "KWT",
        label: "Kuwait",
    },
    CountryEntry {
        code: "KGZ",
        label: "Kyrgyzstan",
    },
    CountryEntry {
        code: "LAO",
        label: "Laos",
    },
    CountryEntry {
        code: "LVA",
        label: "Latvia",
    },
    CountryEntry {
        code: "LBN",
        label: "Lebanon",
    },
    CountryEntry {
        code: "LSO",
        label: "Lesotho",
    },
    CountryEntry {
        code: "LBR",
        label: "Liberia",
    },
    CountryEntry {
        code: "LBY",
        label: "Libya",
    },
    CountryEntry {
        code: "LTU",
        label: "Lithuania",
    },
    CountryEntry {
        code: "LUX",
        label: "Luxembourg",
    },
    CountryEntry {
        code: "MKD",
        label: "Macedonia",
    },
    CountryEntry {
        code: "MDG",
        label: "Madagascar",
    },
    CountryEntry {
        code: "MWI",
        label: "Malawi",
    },
    CountryEntry {
        code: "MYS",
        label: "Malaysia",
    },
    CountryEntry {
        code: "MLI",
        label: "Mali",
    },
    CountryEntry {
        code: "MRT",
        label: "Mauritania",
    },
    CountryEntry {
        code: "MEX",
        label: "Mexico",
    },
    CountryEntry {
        code: "MDA",
        label: "Moldova",
    },
    CountryEntry {
        code: "MNG",
        label: "Mongolia",
    },
    CountryEntry {
        code: "MNE",
        label: "Montenegro",
    },
    CountryEntry {
        code: "MAR",
        label: "Morocco",
    },
    CountryEntry {
        code: "MOZ",
        label: "Mozambique",
    },
    CountryEntry {
        code: "MMR",
        label: "Myanmar",
    },
    CountryEntry {
        code: "CYP",
        label: "N. Cyprus",
    },
    CountryEntry {
        code: "NAM",
        label: "Namibia",
    },
    CountryEntry {
        code: "NPL",
        label: "Nepal",
    },
    CountryEntry {
        code: "NLD",
        label: "Netherlands",
    },
    CountryEntry {
        code: "NCL",
        label: "New Caledonia",
    },
    CountryEntry {
        code: "NZL",
        label: "New Zealand",
    },
    CountryEntry {
        code: "NIC",
        label: "Nicaragua",
    },
    CountryEntry {
        code: "NER",
        label: "Niger",
    },
    CountryEntry {
        code: "NGA",
        label: "Nigeria",
    },
    CountryEntry {
        code: "NOR",
        label: "Norway",
    },
    CountryEntry {
        code: "OMN",
        label: "Oman",
    },
    CountryEntry {
        code: "PAK",
        label: "Pakistan",
    },
    CountryEntry {
        code: "PAN",
        label: "Panama",
    },
    CountryEntry {
        code: "PNG",
        label: "Papua New Guinea",
    },
    CountryEntry {
        code: "PRY",
        label: "Paraguay",
    },
    CountryEntry {
        code: "PER",
        label: "Peru",
    },
    CountryEntry {
        code: "PHL",
        label: "Philippines",
    },
    CountryEntry {
        code: "POL",
        label: "Poland",
    },
    CountryEntry {
        code: "PRT",
        label: "Portugal",
    },
    CountryEntry {
        code: "QAT",
        label: "Qatar",
    },
    CountryEntry {
        code: "ROU",
        label: "Romania",
    },
    CountryEntry {
        code: "RUS",
        label: "Russia",
    },
    CountryEntry {
        code: "RWA",
        label: "Rwanda",
    },
    CountryEntry {
        code: "SAU",
        label: "Saudi Arabia",
    },
    CountryEntry {
        code: "SEN",
        label: "Senegal",
    },
    CountryEntry {
        code: "SRB",
        label: "Serbia",
    },
    CountryEntry {
        code: "SLE",
        label: "Sierra Leone",
    },
    CountryEntry {
        code: "SVK",
        label: "Slovakia",
    },
    CountryEntry {
        code: "SVN",
        label: "Slovenia",
    },
    CountryEntry {
        code: "SLB",
        label: "Solomon Is.",
    },
    CountryEntry {
        code: "SOM",
        label: "Somalia",
    },
    CountryEntry {
        code: "ZAF",
        label: "South Africa",
    },
    CountryEntry {
        code: "KOR",
        label: "South Korea",
    },
    CountryEntry {
        code: "ESP",
        label: "Spain",
    },
    CountryEntry {
        code: "LKA",
        label: "Sri Lanka",
    },
    CountryEntry {
        code: "SDN",
        label: "Sudan",
    },
    CountryEntry {
        code: "SUR",
        label: "Suriname",
    },
    CountryEntry {
        code: "SWE",
        label: "Sweden",
    },
    CountryEntry {
        code: "CHE",
        label: "Switzerland",
    },
    CountryEntry {
        code: "SYR",
        label: "Syria",
    },
    CountryEntry {
        code: "TJK",
        label: "Tajikistan",
    },
    CountryEntry {
        code: "TZA",
        label: "Tanzania",
    },
    CountryEntry {
        code: "THA",
        label: "Thailand",
    },
    CountryEntry {
        code: "TGO",
        label: "Togo",
    },
    CountryEntry {
        code: "TTO",
        label: "Trinidad and Tobago",
    },
    CountryEntry {
        code: "TUN",
        label: "Tunisia",
    },
    CountryEntry {
        code: "TUR",
        label: "Turkey",
    },
    CountryEntry {
        code: "TKM",
        label: "Turkmenistan",
    },
    CountryEntry {
        code: "UGA",
        label: "Uganda",
    },
    CountryEntry {
        code: "UKR",
        label: "Ukraine",
    },
    CountryEntry {
        code: "ARE",
        label: "United Arab Emirates",
    },
    CountryEntry {
        code: "GBR",
        label: "United Kingdom",
    },
    CountryEntry {
        code: "USA",
        label: "United States of America",
    },
    CountryEntry {
        code: "URY",
        label: "Uruguay",
    },
    CountryEntry {
        code: "UZB",
        label: "Uzbekistan",
    },
    CountryEntry {
        code: "VUT",
        label: "Vanuatu",
    },
    CountryEntry {
        code: "VEN",
        label: "Venezuela",
    },
    CountryEntry {
        code: "VNM",
        label: "Vietnam",
    },
    CountryEntry {
        code: "YEM",
        label: "Yemen",
    },
    CountryEntry {
        code: "ZMB",
        label: "Zambia",
    },
    CountryEntry {
        code: "ZWE",
        label: "Zimbabwe",
    },
];

/// All known countries, world first.
pub fn countries() -> &'static [CountryEntry] {
    &COUNTRY_CATALOG
}

/// Display label for a code, if the catalog knows it.
pub fn country_label(code: CountryCode) -> Option<&'static str> {
    COUNTRY_CATALOG
        .iter()
        .find(|entry| entry.code == code.as_str())
        .map(|entry| entry.label)
}

/// Case-insensitive picker search. An empty query returns the whole catalog in
/// table order; otherwise matches are ordered by [`CountryEntry::rank`] and
/// then by table order.
pub fn search_countries(query: &str) -> Vec<&'static CountryEntry> {
    let needle = query.trim().to_lowercase();
    let mut hits: Vec<&'static CountryEntry> = COUNTRY_CATALOG
        .iter()
        .filter(|entry| entry.matches_query(&needle))
        .collect();
    if !needle.is_empty() {
        hits.sort_by_key(|entry| entry.rank(&needle));
    }
    hits
}
