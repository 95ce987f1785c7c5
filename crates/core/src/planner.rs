use crate::error::TutorError;
use crate::models::{PlanRequest, PlanResponse};
use crate::schema::{validate_plan_request, validate_plan_response};

/// Review offsets in calendar days, before scaling to the weekly cadence.
const REVIEW_OFFSETS_DAYS: [i64; 3] = [1, 3, 7];
const MINUTES_PER_NEW_LINE: i64 = 5;

const REMINDERS: [&str; 2] = [
    "Close every session with a dua asking Allah to make what you learned firm in your heart, and renew your intention (ikhlas).",
    "Consistency beats intensity: keep your daily slot even on busy days, shortening the session rather than skipping it.",
];

/// Pure and deterministic: identical inputs give byte-identical plans.
pub fn generate_plan(request: &PlanRequest) -> Result<PlanResponse, TutorError> {
    validate_plan_request(request).map_err(TutorError::rejected)?;

    let days = request.days_per_week;
    let minutes = request.minutes_per_day;
    let review_minutes = (minutes as f64 * request.review_ratio).round() as i64;
    let new_minutes = minutes - review_minutes;
    let offsets = session_offsets(days);
    let unit = content_unit(request.goal.as_deref());

    let daily_plan = (1..=days)
        .map(|day| {
            format!(
                "Day {day}: {} | {}",
                new_material_entry(new_minutes, &unit),
                review_entry(day, review_minutes, &offsets)
            )
        })
        .collect::<Vec<_>>();

    let review_percent = (review_minutes * 100 + minutes / 2) / minutes;
    let summary = format!(
        "{} minutes per week over {days} day(s): {review_percent}% review / {}% new material{} (base language: {}).",
        minutes * days,
        100 - review_percent,
        request
            .goal
            .as_deref()
            .map(str::trim)
            .filter(|goal| !goal.is_empty())
            .map(|goal| format!(" toward {goal}"))
            .unwrap_or_default(),
        request.base_language.trim(),
    );

    let response = PlanResponse {
        summary,
        daily_plan,
        reminders: REMINDERS.iter().map(|r| r.to_string()).collect(),
    };
    // Only reachable through a defect in this module.
    validate_plan_response(&response, days as usize).map_err(TutorError::Composition)?;
    Ok(response)
}

/// Scales the {1, 3, 7} day offsets to study sessions for a cadence of
/// `days` sessions per week: `ceil(offset * days / 7)`, at least 1, deduplicated.
pub fn session_offsets(days: i64) -> Vec<i64> {
    let mut offsets = REVIEW_OFFSETS_DAYS
        .iter()
        .map(|offset| ((offset * days + 6) / 7).max(1))
        .collect::<Vec<_>>();
    offsets.dedup();
    offsets
}

fn content_unit(goal: Option<&str>) -> String {
    match goal.map(str::trim).filter(|goal| !goal.is_empty()) {
        Some(goal) => format!("the next portion of {goal}"),
        None => "the next portion of your chosen surah".to_string(),
    }
}

fn new_material_entry(new_minutes: i64, unit: &str) -> String {
    if new_minutes == 0 {
        return "0 min new material (review-only day)".to_string();
    }
    let lines = (new_minutes / MINUTES_PER_NEW_LINE).max(1);
    format!("{new_minutes} min new material: {unit} (about {lines} line(s))")
}

fn review_entry(day: i64, review_minutes: i64, offsets: &[i64]) -> String {
    if review_minutes == 0 {
        return "0 min review (no review scheduled)".to_string();
    }
    let earlier = offsets
        .iter()
        .filter(|offset| **offset < day)
        .map(|offset| (day - offset).to_string())
        .collect::<Vec<_>>();

    if earlier.is_empty() {
        format!("{review_minutes} min review: recite today's new portion from memory before closing")
    } else {
        format!(
            "{review_minutes} min review: revisit material from day(s) {} (spaced repetition)",
            earlier.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(days: i64, minutes: i64, ratio: f64) -> PlanRequest {
        PlanRequest {
            goal: Some("Al-Baqarah".to_string()),
            days_per_week: days,
            minutes_per_day: minutes,
            review_ratio: ratio,
            base_language: "en".to_string(),
        }
    }

    #[test]
    fn al_baqarah_scenario() {
        let plan = generate_plan(&request(5, 30, 0.5)).unwrap();
        assert_eq!(plan.daily_plan.len(), 5);
        for entry in &plan.daily_plan {
            assert!(entry.contains("15 min new material"));
            assert!(entry.contains("15 min review"));
        }
        assert!(plan.summary.contains("150"));
        assert!(plan.summary.contains("50% review / 50% new"));
        assert!(plan.summary.contains("Al-Baqarah"));
        assert_eq!(plan.reminders.len(), 2);
    }

    #[test]
    fn offsets_scale_with_cadence() {
        assert_eq!(session_offsets(7), vec![1, 3, 7]);
        assert_eq!(session_offsets(5), vec![1, 3, 5]);
        assert_eq!(session_offsets(3), vec![1, 2, 3]);
        assert_eq!(session_offsets(1), vec![1]);
    }

    #[test]
    fn review_cues_only_point_backwards() {
        let plan = generate_plan(&request(7, 20, 0.25)).unwrap();
        assert!(plan.daily_plan[0].contains("recite today's new portion"));
        assert!(plan.daily_plan[1].contains("day(s) 1 "));
        assert!(plan.daily_plan[3].contains("day(s) 3, 1 "));
    }

    #[test]
    fn length_and_minute_split_hold_across_inputs() {
        for days in 1..=7 {
            for minutes in [1, 7, 15, 33, 60, 1440] {
                for ratio in [0.0, 0.1, 0.33, 0.5, 0.77, 1.0] {
                    let plan = generate_plan(&request(days, minutes, ratio)).unwrap();
                    assert_eq!(plan.daily_plan.len(), days as usize);

                    let review = (minutes as f64 * ratio).round() as i64;
                    let new = minutes - review;
                    assert_eq!(review + new, minutes);
                    assert!(plan.daily_plan[0].starts_with("Day 1: "));
                    assert!(plan.daily_plan[0].contains(&format!("{new} min new material")));
                    assert!(plan.daily_plan[0].contains(&format!("{review} min review")));
                }
            }
        }
    }

    #[test]
    fn deterministic_output() {
        let first = generate_plan(&request(4, 45, 0.4)).unwrap();
        let second = generate_plan(&request(4, 45, 0.4)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn rejects_out_of_range_without_clamping() {
        for (req, parameter) in [
            (request(0, 30, 0.5), "days_per_week"),
            (request(8, 30, 0.5), "days_per_week"),
            (request(5, 0, 0.5), "minutes_per_day"),
            (request(5, 30, 1.5), "review_ratio"),
            (request(5, 30, -0.1), "review_ratio"),
        ] {
            match generate_plan(&req) {
                Err(TutorError::InvalidInput { parameter: got, .. }) => assert_eq!(got, parameter),
                other => panic!("expected invalid input for {parameter}, got {other:?}"),
            }
        }
    }

    #[test]
    fn generic_unit_without_goal() {
        let mut req = request(2, 10, 0.0);
        req.goal = Some("   ".to_string());
        let plan = generate_plan(&req).unwrap();
        assert!(plan.daily_plan[0].contains("your chosen surah"));
        assert!(plan.daily_plan[0].contains("no review scheduled"));
        assert!(!plan.summary.contains("toward"));
    }
}
