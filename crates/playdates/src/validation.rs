//! Input checks shared by the services. All run before any store mutation.

use entities::{AgeRange, Coordinates, DEFAULT_AGE_RANGE, MAX_CHILD_AGE};

use crate::{PlaydateError, PlaydateResult};

/// Trims `value` and rejects it if nothing is left.
pub(crate) fn required(field: &str, value: &str) -> PlaydateResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PlaydateError::validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// Trims an optional free-text field, mapping blank to `None`.
pub(crate) fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub(crate) fn child_age(age: u32) -> PlaydateResult<u32> {
    if age > MAX_CHILD_AGE {
        return Err(PlaydateError::validation(format!(
            "Age must be between 0 and {MAX_CHILD_AGE}"
        )));
    }
    Ok(age)
}

/// Most children one family can bring to a playdate.
pub const MAX_CHILDREN_PER_FAMILY: u32 = 20;

/// Validates a raw children count received from an outer surface.
pub fn children_count(raw: i64) -> PlaydateResult<u32> {
    let count = u32::try_from(raw)
        .map_err(|_| PlaydateError::validation("Children count must be a non-negative number"))?;
    bounded_children_count(count)
}

pub(crate) fn bounded_children_count(count: u32) -> PlaydateResult<u32> {
    if count > MAX_CHILDREN_PER_FAMILY {
        return Err(PlaydateError::validation(format!(
            "Children count must be at most {MAX_CHILDREN_PER_FAMILY}"
        )));
    }
    Ok(count)
}

/// Fills in the default bounds and checks `min <= max <= 18`.
pub(crate) fn age_range(min: Option<u32>, max: Option<u32>) -> PlaydateResult<AgeRange> {
    let range = AgeRange::new(
        min.unwrap_or(DEFAULT_AGE_RANGE.min),
        max.unwrap_or(DEFAULT_AGE_RANGE.max),
    );
    if range.max > MAX_CHILD_AGE {
        return Err(PlaydateError::validation(format!(
            "Age range must be within 0 and {MAX_CHILD_AGE}"
        )));
    }
    if range.min > range.max {
        return Err(PlaydateError::validation(
            "Minimum age cannot be greater than maximum age",
        ));
    }
    Ok(range)
}

pub(crate) fn coordinates(coordinates: Coordinates) -> PlaydateResult<Coordinates> {
    if !coordinates.is_valid() {
        return Err(PlaydateError::validation("Location coordinates are out of range"));
    }
    Ok(coordinates)
}

pub(crate) fn max_participants(max: Option<u32>) -> PlaydateResult<Option<u32>> {
    match max {
        Some(0) => Err(PlaydateError::validation(
            "Maximum participants must be at least 1",
        )),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_trims() {
        assert_eq!(required("Title", "  Park  ").unwrap(), "Park");
        assert!(matches!(required("Title", "   "), Err(PlaydateError::Validation(_))));
    }

    #[test]
    fn test_optional_blank_is_none() {
        assert_eq!(optional(Some("  ")), None);
        assert_eq!(optional(Some(" hi ")), Some("hi".to_string()));
        assert_eq!(optional(None), None);
    }

    #[test]
    fn test_child_age_bounds() {
        assert!(child_age(0).is_ok());
        assert!(child_age(18).is_ok());
        assert!(child_age(19).is_err());
    }

    #[test]
    fn test_children_count() {
        assert_eq!(children_count(0).unwrap(), 0);
        assert_eq!(children_count(2).unwrap(), 2);
        assert!(matches!(children_count(-1), Err(PlaydateError::Validation(_))));
        assert_eq!(children_count(20).unwrap(), MAX_CHILDREN_PER_FAMILY);
        assert!(matches!(children_count(21), Err(PlaydateError::Validation(_))));
        assert!(children_count(i64::from(u32::MAX)).is_err());
    }

    #[test]
    fn test_age_range_defaults() {
        assert_eq!(age_range(None, None).unwrap(), AgeRange::new(0, 10));
        assert_eq!(age_range(Some(2), None).unwrap(), AgeRange::new(2, 10));
        assert_eq!(age_range(Some(12), Some(15)).unwrap(), AgeRange::new(12, 15));
        // A minimum above the default maximum needs an explicit maximum
        assert!(age_range(Some(12), None).is_err());
        assert!(age_range(Some(5), Some(2)).is_err());
        assert!(age_range(None, Some(19)).is_err());
    }

    #[test]
    fn test_max_participants() {
        assert_eq!(max_participants(None).unwrap(), None);
        assert_eq!(max_participants(Some(4)).unwrap(), Some(4));
        assert!(max_participants(Some(0)).is_err());
    }
}
