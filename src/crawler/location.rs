// Location extraction from video descriptions

use once_cell::sync::Lazy;
use regex::Regex;

// Placeholder coordinates (lon/lat, Beijing) until a geocoding service
// resolves the captured place name. TODO: wire up a geocoder and drop these.
const PLACEHOLDER_LONGITUDE: f64 = 116.4074;
const PLACEHOLDER_LATITUDE: f64 = 39.9042;

// Descriptions tag their location with a marker word followed by a
// full-width or ASCII colon, e.g. "地点：外滩" or "位于: 中山公园".
static LOCATION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?:在|于|位于|地点|位置|地址)[：:]\s*([^，。\n]+)").expect("valid location regex"),
        Regex::new(r"(?:地点|位置|地址)[：:]\s*([^，。\n]+)").expect("valid location regex"),
    ]
});

/// A place mention pulled out of a video description
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedLocation {
    pub place_name: String,
    pub longitude: f64,
    pub latitude: f64,
}

/// Scans a description for a location marker. The first matching pattern
/// wins; the captured place name is kept so it can be geocoded later.
pub fn extract_location(description: &str) -> Option<ExtractedLocation> {
    for pattern in LOCATION_PATTERNS.iter() {
        if let Some(captures) = pattern.captures(description) {
            if let Some(place) = captures.get(1) {
                let place_name: &str = place.as_str().trim();
                if place_name.is_empty() {
                    continue;
                }

                return Some(ExtractedLocation {
                    place_name: place_name.to_string(),
                    longitude: PLACEHOLDER_LONGITUDE,
                    latitude: PLACEHOLDER_LATITUDE,
                });
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_place_after_fullwidth_colon() {
        let loc: ExtractedLocation = extract_location("今天去玩了！地点：外滩").unwrap();
        assert_eq!(loc.place_name, "外滩");
        assert_eq!(loc.longitude, 116.4074);
        assert_eq!(loc.latitude, 39.9042);
    }

    #[test]
    fn extracts_place_after_ascii_colon() {
        let loc: ExtractedLocation = extract_location("位于: 中山公园，风景很好").unwrap();
        assert_eq!(loc.place_name, "中山公园");
    }

    #[test]
    fn stops_at_chinese_punctuation() {
        let loc: ExtractedLocation = extract_location("地址：南京路步行街。推荐！").unwrap();
        assert_eq!(loc.place_name, "南京路步行街");
    }

    #[test]
    fn stops_at_newline() {
        let loc: ExtractedLocation = extract_location("位置：杭州西湖\n第二行无关内容").unwrap();
        assert_eq!(loc.place_name, "杭州西湖");
    }

    #[test]
    fn returns_none_without_marker() {
        assert!(extract_location("随便聊聊日常，没有地理信息").is_none());
        assert!(extract_location("").is_none());
    }

    #[test]
    fn returns_none_for_marker_with_empty_value() {
        assert!(extract_location("地点：").is_none());
    }
}
