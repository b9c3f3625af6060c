use crate::selection::domain::{LocCode, CANADA};
use crate::tables::{GeoLocation, LocType, Location, ReferenceData};

/// Whether `location` lies inside the zone named by `geo`.
pub fn is_in_loc(location: &Location, geo: &GeoLocation) -> bool {
    let code = geo.code.as_str();
    match geo.loc_type {
        LocType::Area => location.area == code,
        LocType::SubArea => location.sub_area == code,
        LocType::Nation => location.nation == code,
        LocType::State => location.state.as_deref() == Some(code),
        LocType::City => location.city == code || location.code == code,
    }
}

/// Resolve `code` through the location table first; unknown codes never match.
pub fn is_code_in_loc(tables: &dyn ReferenceData, code: &LocCode, geo: &GeoLocation) -> bool {
    tables
        .location(code)
        .map(|location| is_in_loc(location, geo))
        .unwrap_or(false)
}

pub fn is_canada(location: &Location) -> bool {
    location.nation == CANADA
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::InMemoryReferenceData;

    fn london() -> Location {
        Location::airport("LHR", "LON", "GB")
            .in_zone("2", "21")
            .in_state("ENG")
    }

    #[test]
    fn matches_each_location_type() {
        let lhr = london();
        assert!(is_in_loc(&lhr, &GeoLocation::new(LocType::Area, "2")));
        assert!(is_in_loc(&lhr, &GeoLocation::new(LocType::SubArea, "21")));
        assert!(is_in_loc(&lhr, &GeoLocation::new(LocType::Nation, "GB")));
        assert!(is_in_loc(&lhr, &GeoLocation::new(LocType::State, "ENG")));
        assert!(is_in_loc(&lhr, &GeoLocation::new(LocType::City, "LON")));
        assert!(is_in_loc(&lhr, &GeoLocation::new(LocType::City, "LHR")));
        assert!(!is_in_loc(&lhr, &GeoLocation::new(LocType::Nation, "BR")));
        assert!(!is_in_loc(&lhr, &GeoLocation::new(LocType::Area, "1")));
    }

    #[test]
    fn unknown_codes_never_match() {
        let tables = InMemoryReferenceData::new().with_location(london());
        let nation = GeoLocation::new(LocType::Nation, "GB");
        assert!(is_code_in_loc(&tables, &LocCode::new("LHR"), &nation));
        assert!(!is_code_in_loc(&tables, &LocCode::new("XXX"), &nation));
    }
}
