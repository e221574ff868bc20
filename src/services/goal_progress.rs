use crate::models::goal::{Goal, GoalSummary};

/// Progress percentage as stored and reported: `round(current / target * 100)`.
///
/// The value is not clamped, so an over-achieved goal reports more than 100.
/// A non-positive target yields 0.
pub fn progress_percent(current: f64, target: f64) -> i64 {
    if target <= 0.0 || !target.is_finite() || !current.is_finite() {
        return 0;
    }
    ((current / target) * 100.0).round() as i64
}

/// Human readable amount for a goal value.
///
/// `steps` goals print the bare number with thousands separators; every
/// other unit is appended after a space.
pub fn format_amount(value: f64, unit: &str) -> String {
    match unit {
        "steps" => group_thousands(&format_number(value)),
        "" => format_number(value),
        _ => format!("{} {}", format_number(value), unit),
    }
}

pub fn summarize(goal: &Goal) -> GoalSummary {
    GoalSummary {
        id: goal.id,
        name: goal.name.clone(),
        status: goal.status,
        progress: progress_percent(goal.current_value, goal.target_value),
        target: format_amount(goal.target_value, &goal.unit),
        current: format_amount(goal.current_value, &goal.unit),
    }
}

/// Integral values print without a fractional part.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

fn group_thousands(number: &str) -> String {
    let (sign, rest) = match number.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", number),
    };
    let (int_part, frac_part) = match rest.split_once('.') {
        Some((int_part, frac)) => (int_part, Some(frac)),
        None => (rest, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}
