//! Pure validation of submissions before they reach the store.
//!
//! Empty text fields are accepted as-is. Coordinates must be finite and
//! inside [-90, 90] for latitude and [-180, 180] for longitude.

use grid_client::{
    domain::{
        check_latitude, check_longitude, NewCustomer, NewOutage, NewPointAsset, NewPowerLine,
        Value,
    },
    GridError,
};

pub fn validate_point_asset(asset: &NewPointAsset) -> Result<(), GridError> {
    check_latitude("latitude", asset.latitude)?;
    check_longitude("longitude", asset.longitude)
}

/// All four endpoint coordinates are required for a submitted line.
pub fn validate_power_line(line: &NewPowerLine) -> Result<(), GridError> {
    check_latitude("start_latitude", line.start_latitude)?;
    check_longitude("start_longitude", line.start_longitude)?;
    check_latitude("end_latitude", line.end_latitude)?;
    check_longitude("end_longitude", line.end_longitude)
}

/// Customer coordinates are optional; whichever is present must be valid.
pub fn validate_customer(customer: &NewCustomer) -> Result<(), GridError> {
    if let Some(lat) = customer.latitude {
        check_latitude("latitude", lat)?;
    }
    if let Some(lon) = customer.longitude {
        check_longitude("longitude", lon)?;
    }
    Ok(())
}

pub fn validate_outage(outage: &NewOutage) -> Result<(), GridError> {
    check_latitude("latitude", outage.latitude)?;
    check_longitude("longitude", outage.longitude)
}

/// Range-check the coordinate cells of one imported row. Cells are matched
/// to columns by position; NULL cells are allowed.
pub fn validate_row(columns: &[&str], row: &[Value]) -> Result<(), GridError> {
    for (name, value) in columns.iter().zip(row) {
        let Some(v) = value.as_f64() else { continue };
        if is_latitude_column(name) {
            check_latitude(name, v)?;
        } else if is_longitude_column(name) {
            check_longitude(name, v)?;
        }
    }
    Ok(())
}

fn is_latitude_column(name: &str) -> bool {
    name == "latitude" || name.ends_with("_latitude")
}

fn is_longitude_column(name: &str) -> bool {
    name == "longitude" || name.ends_with("_longitude")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line() -> NewPowerLine {
        NewPowerLine {
            start_location: "Kiambere".to_string(),
            start_latitude: -0.64,
            start_longitude: 37.89,
            end_location: "Embakasi".to_string(),
            end_latitude: -1.32,
            end_longitude: 36.9,
            line_id: "L-220".to_string(),
        }
    }

    #[test]
    fn point_asset_with_empty_text_is_accepted() {
        let asset = NewPointAsset {
            location: String::new(),
            latitude: 0.0,
            longitude: 0.0,
            external_id: String::new(),
        };
        assert!(validate_point_asset(&asset).is_ok());
    }

    #[test]
    fn point_asset_latitude_out_of_range_is_rejected() {
        let asset = NewPointAsset {
            location: "Mombasa".to_string(),
            latitude: 95.0,
            longitude: 39.66,
            external_id: "M-4".to_string(),
        };
        let res = validate_point_asset(&asset);
        assert!(matches!(res, Err(GridError::InvalidCoordinate { .. })));
    }

    #[test]
    fn power_line_needs_finite_end_coordinates() {
        assert!(validate_power_line(&line()).is_ok());

        let mut bad = line();
        bad.end_longitude = f64::INFINITY;
        let err = validate_power_line(&bad).unwrap_err();
        assert!(matches!(err, GridError::InvalidCoordinate { ref field, .. } if field == "end_longitude"));
    }

    #[test]
    fn customer_without_coordinates_is_fine() {
        assert!(validate_customer(&NewCustomer::default()).is_ok());

        let customer = NewCustomer { longitude: Some(-200.0), ..NewCustomer::default() };
        assert!(validate_customer(&customer).is_err());
    }

    #[test]
    fn row_check_skips_nulls_and_other_columns() {
        let columns = ["start_latitude", "end_latitude", "line_id"];
        let row = [Value::Real(-1.0), Value::Null, Value::Text("L".to_string())];
        assert!(validate_row(&columns, &row).is_ok());

        let row = [Value::Real(-91.0), Value::Null, Value::Text("L".to_string())];
        assert!(validate_row(&columns, &row).is_err());
    }
}
