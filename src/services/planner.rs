//! Reminder / Schedule Planning
//!
//! 요일 목록(0 = Sunday)을 가진 리마인더와 일정에 대한 계산.
//! 요일 목록이 비어 있으면 매일 적용된다.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use serde::Serialize;

use crate::db::{Reminder, Schedule};

/// 다가오는 리마인더 최대 개수
pub const UPCOMING_LIMIT: usize = 10;

/// 0 = Sunday ... 6 = Saturday
pub fn weekday_index(date: NaiveDate) -> i16 {
    date.weekday().num_days_from_sunday() as i16
}

/// 해당 요일에 적용되는지
pub fn applies_on(days_of_week: &[i16], weekday: i16) -> bool {
    days_of_week.is_empty() || days_of_week.contains(&weekday)
}

// ============ Reminders ============

/// 다음 알림까지 남은 일 수 (0-7)
///
/// 오늘 적용되고 아직 시간이 지나지 않았으면 0, 그 외에는 다음 적용 요일까지의
/// 일 수. 오늘만 적용되는데 시간이 지났으면 7 (다음 주 같은 요일).
pub fn days_until(days_of_week: &[i16], reminder_time: NaiveTime, today: i16, now: NaiveTime) -> u32 {
    if applies_on(days_of_week, today) && reminder_time > now {
        return 0;
    }

    (1..7)
        .find(|offset| applies_on(days_of_week, (today + *offset as i16) % 7))
        .unwrap_or(7)
}

/// 다가오는 리마인더 (`days_until` 포함)
#[derive(Debug, Clone, Serialize)]
pub struct UpcomingReminder {
    #[serde(flatten)]
    pub reminder: Reminder,
    pub days_until: u32,
}

/// 활성 리마인더를 다음 알림 순서로 정렬해 최대 10개 반환
pub fn upcoming_reminders(
    reminders: Vec<Reminder>,
    today: i16,
    now: NaiveTime,
) -> Vec<UpcomingReminder> {
    let mut upcoming: Vec<UpcomingReminder> = reminders
        .into_iter()
        .filter(|r| r.is_active)
        .map(|r| UpcomingReminder {
            days_until: days_until(&r.days_of_week, r.reminder_time, today, now),
            reminder: r,
        })
        .collect();

    upcoming.sort_by(|a, b| {
        a.days_until
            .cmp(&b.days_until)
            .then(a.reminder.reminder_time.cmp(&b.reminder.reminder_time))
    });
    upcoming.truncate(UPCOMING_LIMIT);
    upcoming
}

// ============ Schedules ============

/// 해당 요일의 활성 일정 (시작 시각 순)
pub fn schedules_for_day(schedules: &[Schedule], weekday: i16) -> Vec<Schedule> {
    let mut day: Vec<Schedule> = schedules
        .iter()
        .filter(|s| s.is_active && applies_on(&s.days_of_week, weekday))
        .cloned()
        .collect();
    day.sort_by_key(|s| s.start_time);
    day
}

/// 요일(0-6)별 일정 묶음
pub fn weekly_schedule(schedules: &[Schedule]) -> BTreeMap<i16, Vec<Schedule>> {
    (0..7)
        .map(|weekday| (weekday, schedules_for_day(schedules, weekday)))
        .collect()
}

/// 1시간 단위 타임라인 칸
#[derive(Debug, Clone, Serialize)]
pub struct TimeSlot {
    pub time: String,
    pub hour: u32,
    pub activities: Vec<Schedule>,
}

/// 하루 24칸 타임라인
///
/// 일정은 시작 시각의 hour부터 종료 시각의 hour 직전까지 차지한다.
/// 종료 시각이 없으면 한 칸만 차지한다.
pub fn timeline(day_schedules: &[Schedule]) -> Vec<TimeSlot> {
    (0..24)
        .map(|hour| TimeSlot {
            time: format!("{:02}:00", hour),
            hour,
            activities: day_schedules
                .iter()
                .filter(|s| {
                    let start = s.start_time.hour();
                    let end = s.end_time.map(|t| t.hour()).unwrap_or(start + 1);
                    hour >= start && hour < end
                })
                .cloned()
                .collect(),
        })
        .collect()
}

/// 일정 통계
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleStats {
    pub total: usize,
    pub active: usize,
    pub by_type: BTreeMap<String, usize>,
    /// 요일(0-6)별 활성 일정 수
    pub by_day: [usize; 7],
}

pub fn schedule_stats(schedules: &[Schedule]) -> ScheduleStats {
    let mut stats = ScheduleStats {
        total: schedules.len(),
        ..Default::default()
    };

    for schedule in schedules {
        *stats
            .by_type
            .entry(schedule.activity_type.clone())
            .or_insert(0) += 1;

        if schedule.is_active {
            stats.active += 1;
            for (weekday, count) in stats.by_day.iter_mut().enumerate() {
                if applies_on(&schedule.days_of_week, weekday as i16) {
                    *count += 1;
                }
            }
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn reminder(id: i64, at: NaiveTime, days: &[i16]) -> Reminder {
        Reminder {
            id,
            user_id: 1,
            title: format!("reminder {id}"),
            description: None,
            reminder_time: at,
            days_of_week: days.to_vec(),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn schedule(kind: &str, start: NaiveTime, end: Option<NaiveTime>, days: &[i16]) -> Schedule {
        Schedule {
            id: 1,
            user_id: 1,
            activity_name: kind.to_string(),
            activity_type: kind.to_string(),
            start_time: start,
            end_time: end,
            days_of_week: days.to_vec(),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_weekday_index_starts_on_sunday() {
        // 2024-06-02 is a Sunday
        assert_eq!(weekday_index(NaiveDate::from_ymd_opt(2024, 6, 2).unwrap()), 0);
        assert_eq!(weekday_index(NaiveDate::from_ymd_opt(2024, 6, 8).unwrap()), 6);
    }

    #[test]
    fn test_empty_days_means_every_day() {
        for day in 0..7 {
            assert!(applies_on(&[], day));
        }
        assert!(applies_on(&[1, 3], 3));
        assert!(!applies_on(&[1, 3], 2));
    }

    #[test]
    fn test_days_until() {
        let now = time(12, 0);
        // 오늘(수=3) 이후 시각
        assert_eq!(days_until(&[3], time(18, 0), 3, now), 0);
        // 오늘 지나감 → 다음 주
        assert_eq!(days_until(&[3], time(8, 0), 3, now), 7);
        // 토요일 → 3일 후
        assert_eq!(days_until(&[6], time(8, 0), 3, now), 3);
        // 일요일 (wrap around)
        assert_eq!(days_until(&[0], time(8, 0), 3, now), 4);
        // 매일
        assert_eq!(days_until(&[], time(8, 0), 3, now), 1);
        assert_eq!(days_until(&[], time(13, 0), 3, now), 0);
    }

    #[test]
    fn test_upcoming_order_and_limit() {
        let now = time(12, 0);
        let mut reminders = vec![
            reminder(1, time(9, 0), &[4]),
            reminder(2, time(18, 0), &[3]),
            reminder(3, time(7, 0), &[4]),
        ];
        let mut inactive = reminder(4, time(13, 0), &[3]);
        inactive.is_active = false;
        reminders.push(inactive);

        let ids: Vec<_> = upcoming_reminders(reminders, 3, now)
            .iter()
            .map(|u| (u.reminder.id, u.days_until))
            .collect();
        assert_eq!(ids, vec![(2, 0), (3, 1), (1, 1)]);

        let many: Vec<_> = (0..15).map(|i| reminder(i, time(8, 0), &[])).collect();
        assert_eq!(upcoming_reminders(many, 3, now).len(), UPCOMING_LIMIT);
    }

    #[test]
    fn test_weekly_grouping() {
        let schedules = vec![
            schedule("work", time(9, 0), Some(time(17, 0)), &[1, 2, 3, 4, 5]),
            schedule("sleep", time(22, 0), None, &[]),
        ];
        let weekly = weekly_schedule(&schedules);

        assert_eq!(weekly.len(), 7);
        assert_eq!(weekly[&0].len(), 1);
        assert_eq!(weekly[&1].len(), 2);
        assert_eq!(weekly[&1][0].activity_type, "work");
    }

    #[test]
    fn test_timeline_spans_hours() {
        let day = vec![
            schedule("work", time(9, 30), Some(time(12, 0)), &[]),
            schedule("lunch", time(12, 15), None, &[]),
        ];
        let slots = timeline(&day);

        assert_eq!(slots.len(), 24);
        assert_eq!(slots[8].activities.len(), 0);
        assert_eq!(slots[9].time, "09:00");
        assert_eq!(slots[9].activities.len(), 1);
        assert_eq!(slots[11].activities.len(), 1);
        assert_eq!(slots[12].activities[0].activity_type, "lunch");
        assert_eq!(slots[13].activities.len(), 0);
    }

    #[test]
    fn test_schedule_stats() {
        let mut off = schedule("exercise", time(6, 0), None, &[0]);
        off.is_active = false;
        let schedules = vec![
            schedule("work", time(9, 0), None, &[1, 2]),
            schedule("work", time(14, 0), None, &[1]),
            off,
        ];
        let stats = schedule_stats(&schedules);

        assert_eq!(stats.total, 3);
        assert_eq!(stats.active, 2);
        assert_eq!(stats.by_type["work"], 2);
        assert_eq!(stats.by_type["exercise"], 1);
        assert_eq!(stats.by_day, [0, 2, 1, 0, 0, 0, 0]);
    }
}
