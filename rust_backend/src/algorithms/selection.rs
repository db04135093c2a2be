use crate::core::domain::NormalizedRecord;
use crate::error::{VisitError, VisitResult};
use crate::time;

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Pick the records on `date` closest in time to `target_minute`.
///
/// Adults and children are chosen independently: up to `adults` adult
/// records and up to `children` child records, each ordered by distance
/// between their time of day and the target (ties keep input order). The
/// picks are returned adults first; removing them is left to the caller.
///
/// # Errors
///
/// Returns [`VisitError::InvalidInput`] when `date` is not `YYYY-MM-DD` or
/// `target_minute` is past the end of the day.
pub fn select_for_removal(
    records: &[NormalizedRecord],
    date: &str,
    target_minute: u32,
    adults: usize,
    children: usize,
) -> VisitResult<Vec<NormalizedRecord>> {
    let Some(date) = time::parse_date(date) else {
        return Err(VisitError::InvalidInput(format!("Invalid date '{}'", date)));
    };
    if target_minute >= MINUTES_PER_DAY {
        return Err(VisitError::InvalidInput(format!(
            "Target minute {} is outside 0..{}",
            target_minute, MINUTES_PER_DAY
        )));
    }

    let mut candidates: Vec<&NormalizedRecord> =
        records.iter().filter(|r| r.date == date).collect();
    candidates.sort_by_key(|r| {
        let minute = time::minute_of_day(r.timestamp.time());
        (minute.abs_diff(target_minute), r.sequence_index)
    });

    let picked_adults = candidates.iter().filter(|r| !r.is_child).take(adults);
    let picked_children = candidates.iter().filter(|r| r.is_child).take(children);
    let picked: Vec<NormalizedRecord> = picked_adults
        .chain(picked_children)
        .map(|r| (*r).clone())
        .collect();

    let requested = adults.saturating_add(children);
    if picked.len() < requested {
        log::warn!(
            "Only {} of {} requested records available on {}",
            picked.len(),
            requested,
            date
        );
    }

    Ok(picked)
}
