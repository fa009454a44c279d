//! Game constants: stat bounds, action magnitudes, calendar checkpoints.
//!
//! Plain `const` values with no runtime dependency. The engine, the
//! content tables and the headless harness all read from here.

pub mod stats {
    pub const MIN_STAT: i32 = 50;
    pub const MAX_STAT: i32 = 100;
    pub const MAX_ENERGY: i32 = 100;

    // Starting values before faculty buff and random points
    pub const BASE_KNOWLEDGE: i32 = 60;
    pub const BASE_SKILL: i32 = 60;
    pub const BASE_SOCIAL: i32 = 60;
    pub const BASE_HEALTH: i32 = 90;
    pub const START_ENERGY: i32 = 100;

    /// Single points scattered over the four attributes at game start.
    pub const RANDOM_POINTS: u32 = 10;
}

/// Magnitudes of the ordinary term-time actions (major-phase values).
pub mod action_major {
    pub const COST: i32 = 30;
    pub const COST_LOW: i32 = 20;
    pub const RECOVER: i32 = 40;
    pub const GAIN_STAT: i32 = 2;
    pub const GAIN_SOCIAL: i32 = 4;
    pub const GAIN_HEALTH: i32 = 8;
    pub const EFFORT: i32 = 20;
    pub const HEALTH_COST: i32 = 4;
    pub const MONEY: i32 = 1000;
}

pub mod intern {
    pub const COST: i32 = 30;
    pub const GAIN_SKILL: i32 = 4;
    pub const GAIN_SOCIAL: i32 = 2;
    pub const MONEY: i32 = 1500;
    pub const HEALTH_COST: i32 = 5;
    /// Months locked after the confirming month (which pays out immediately).
    pub const LOCK_MONTHS: u8 = 2;
}

pub mod holiday {
    pub const PREVIEW_COST: i32 = 30;
    pub const PREVIEW_GAIN: i32 = 2;
    pub const PREVIEW_EFFORT: i32 = 20;
    pub const PRACTICE_COST: i32 = 30;
    pub const PRACTICE_GAIN: i32 = 2;
    pub const REST_RECOVER: i32 = 50;
    pub const REST_HEALTH: i32 = 6;
    pub const TRAVEL_COST: i32 = 20;
    pub const TRAVEL_SOCIAL: i32 = 4;
    pub const TRAVEL_HEALTH: i32 = 4;
}

pub mod senior {
    pub const THESIS_COST: i32 = 30;
    pub const THESIS_PROGRESS: i32 = 30;
    pub const JOB_COST: i32 = 20;
    pub const JOB_GAIN: i32 = 2;
    pub const JOB_HEALTH: i32 = 4;
}

/// Semester GPA formula: `2.4 + 1.3 * log10(effort) - 0.01 * (100 - knowledge) - health penalty`.
pub mod gpa {
    pub const BASE: f64 = 2.4;
    pub const MAX: f64 = 5.0;
    pub const LOG_FACTOR: f64 = 1.3;
    pub const KNOWLEDGE_FACTOR: f64 = 0.01;
    pub const HEALTH_PENALTY_80: f64 = 0.1;
    pub const HEALTH_PENALTY_70: f64 = 0.1;
    /// Semester GPA at or above this is reported as excellent.
    pub const EXCELLENT: f64 = 4.0;
    /// Baoyan threshold for a faculty with no entry.
    pub const DEFAULT_BAOYAN_THRESHOLD: f64 = 4.5;
}

pub mod calendar {
    pub const START_YEAR: i32 = 2021;
    pub const START_MONTH: u8 = 9;
    pub const FINAL_GRADE: u8 = 4;

    /// Months without classes.
    pub const HOLIDAY_MONTHS: [u8; 3] = [2, 7, 8];
    /// Semesters are settled when leaving these months.
    pub const SETTLEMENT_MONTHS: [u8; 2] = [1, 6];
    /// Semesters open when entering these months.
    pub const SEMESTER_START_MONTHS: [u8; 2] = [9, 3];
    /// Last calendar year in which a semester can open.
    pub const LAST_TEACHING_YEAR: i32 = 2024;
    pub const SEMESTER_COUNT: usize = 6;

    /// (year, month) checkpoints.
    pub const DIVERSION: (i32, u8) = (2022, 1);
    pub const BAOYAN: (i32, u8) = (2024, 9);
    pub const GRADUATION: (i32, u8) = (2025, 7);

    pub fn is_holiday(month: u8) -> bool {
        HOLIDAY_MONTHS.contains(&month)
    }
}

pub mod hospital {
    /// Health below this forces hospitalization on the next advance.
    pub const THRESHOLD: i32 = 50;
    pub const FEE: i64 = 3000;
    pub const HEALTH_AFTER: i32 = 60;
    pub const ENERGY_AFTER: i32 = 50;
}

pub mod events {
    pub const TRIGGER_CHANCE: f64 = 0.5;
    /// Forced every September while eligible.
    pub const SEPTEMBER_EVENT: &str = "freshman_election";
    /// Slope applied to a normalized stat when weighting event categories.
    pub const CATEGORY_GAIN: f64 = 1.2;
    pub const LAST_EVENT_GRADE: u8 = 3;
}

pub mod thesis {
    pub const COMPLETE: i32 = 100;
    pub const GOOD: i32 = 120;
    pub const EXCELLENT: i32 = 150;
}

pub mod endings {
    pub const LOW_HEALTH: i32 = 80;
    pub const VERY_LOW_HEALTH: i32 = 70;
    pub const LOW_SOCIAL: i32 = 60;
    pub const LOW_SKILL: i32 = 60;
    pub const STANDOUT: i32 = 90;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_holiday_months() {
        assert!(calendar::is_holiday(2));
        assert!(calendar::is_holiday(7));
        assert!(calendar::is_holiday(8));
        assert!(!calendar::is_holiday(9));
        assert!(!calendar::is_holiday(1));
    }

    #[test]
    fn test_checkpoints_are_ordered() {
        assert!(calendar::DIVERSION < calendar::BAOYAN);
        assert!(calendar::BAOYAN < calendar::GRADUATION);
        assert!(calendar::LAST_TEACHING_YEAR < calendar::GRADUATION.0);
    }
}
