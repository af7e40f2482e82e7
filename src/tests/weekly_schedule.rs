#[cfg(test)]
mod test {

    use chrono::{TimeZone, Utc, Weekday};

    use crate::config::settings::ScheduleConfig;
    use crate::report::scheduler::WeeklySchedule;

    #[test]
    fn default_schedule_fires_saturday_midnight_utc() {
        let schedule = WeeklySchedule::from_config(&ScheduleConfig::default()).unwrap();

        // Friday 2026-10-16 15:00
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 15, 0, 0).unwrap();
        assert_eq!(
            schedule.next_after(now),
            Utc.with_ymd_and_hms(2026, 10, 17, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn trigger_instant_itself_schedules_the_following_week() {
        let schedule = WeeklySchedule::new(Weekday::Sat, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 10, 17, 0, 0, 0).unwrap();

        assert_eq!(
            schedule.next_after(now),
            Utc.with_ymd_and_hms(2026, 10, 24, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn later_the_same_weekday_rolls_over() {
        let schedule = WeeklySchedule::new(Weekday::Mon, 9, 30).unwrap();

        let before = Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap();
        assert_eq!(
            schedule.next_after(before),
            Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap()
        );

        let after = Utc.with_ymd_and_hms(2026, 10, 19, 9, 31, 0).unwrap();
        assert_eq!(
            schedule.next_after(after),
            Utc.with_ymd_and_hms(2026, 10, 26, 9, 30, 0).unwrap()
        );
    }

    #[test]
    fn out_of_range_time_is_rejected() {
        assert!(WeeklySchedule::new(Weekday::Sat, 24, 0).is_err());
        assert!(WeeklySchedule::new(Weekday::Sat, 0, 60).is_err());
    }
}
