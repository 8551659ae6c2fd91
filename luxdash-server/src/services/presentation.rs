use std::collections::VecDeque;

use luxdash_api::{
    Group, LampState, LightGroupSummary, LightTile, Notification, NotificationLevel,
    SensorHistory, SensorReading,
};
use time::OffsetDateTime;

use crate::configs::DeviceRegistry;

struct SensorSeries {
    id: String,
    name: String,
    color: String,
    values: VecDeque<f64>,
}

/// Rolling per-sensor readings for charting.
pub struct SensorHistoryBuffer {
    capacity: usize,
    series: Vec<SensorSeries>,
}

impl SensorHistoryBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            series: Vec::new(),
        }
    }

    /// Append one poll worth of readings. Placeholder readings are skipped
    /// so an unreachable sensor does not draw a drop to zero.
    pub fn record(&mut self, sensors: &[SensorReading], registry: &DeviceRegistry) {
        for (index, reading) in sensors.iter().enumerate() {
            if reading.fallback {
                continue;
            }

            let position = match self.series.iter().position(|s| s.id == reading.id) {
                Some(position) => position,
                None => {
                    self.series.push(SensorSeries {
                        id: reading.id.clone(),
                        name: reading.name.clone(),
                        color: registry.sensor_color(&reading.id, index),
                        values: VecDeque::with_capacity(self.capacity),
                    });
                    self.series.len() - 1
                }
            };

            let series = &mut self.series[position];
            series.name = reading.name.clone();
            series.values.push_back(reading.value);
            while series.values.len() > self.capacity {
                series.values.pop_front();
            }
        }
    }

    pub fn series(&self) -> Vec<SensorHistory> {
        self.series
            .iter()
            .map(|series| SensorHistory {
                id: series.id.clone(),
                name: series.name.clone(),
                color: series.color.clone(),
                value: series.values.back().copied().unwrap_or(0.0),
                history: series.values.iter().copied().collect(),
            })
            .collect()
    }
}

/// Bounded notification feed, oldest first.
pub struct NotificationFeed {
    capacity: usize,
    next_id: u64,
    entries: VecDeque<Notification>,
}

impl NotificationFeed {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            next_id: 1,
            entries: VecDeque::new(),
        }
    }

    pub fn push(&mut self, level: NotificationLevel, message: impl Into<String>) -> Notification {
        let notification = Notification {
            id: self.next_id,
            level,
            message: message.into(),
            timestamp: OffsetDateTime::now_utc(),
        };

        self.next_id += 1;
        self.entries.push_back(notification.clone());
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }

        notification
    }

    pub fn entries(&self) -> Vec<Notification> {
        self.entries.iter().cloned().collect()
    }
}

/// Lamps grouped by physical zone with their rounded average brightness.
///
/// Lamps missing from the registry land in the middle group, labelled by
/// name or id.
pub fn summarize_groups(lights: &[LampState], registry: &DeviceRegistry) -> Vec<LightGroupSummary> {
    let mut summaries: Vec<LightGroupSummary> = Group::ALL
        .iter()
        .map(|group| LightGroupSummary {
            group: *group,
            label: group.short_label().to_string(),
            average: 0,
            lights: Vec::new(),
        })
        .collect();

    for light in lights {
        let (group, tile) = match registry.light(&light.id) {
            Some(entry) => (
                entry.group,
                LightTile {
                    id: light.id.clone(),
                    label: entry.label.clone(),
                    brightness: light.value,
                    unmapped: false,
                },
            ),
            None => {
                tracing::debug!("light {} has no registry entry", light.id);
                let label = if light.name.is_empty() { light.id.clone() } else { light.name.clone() };
                (
                    Group::WallMiddle,
                    LightTile {
                        id: light.id.clone(),
                        label,
                        brightness: light.value,
                        unmapped: true,
                    },
                )
            }
        };

        if let Some(summary) = summaries.iter_mut().find(|s| s.group == group) {
            summary.lights.push(tile);
        }
    }

    for summary in summaries.iter_mut() {
        summary.average = average_brightness(&summary.lights);
    }

    summaries
}

fn average_brightness(lights: &[LightTile]) -> u8 {
    if lights.is_empty() {
        return 0;
    }

    let total: u32 = lights.iter().map(|light| u32::from(light.brightness)).sum();

    (total as f64 / lights.len() as f64).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configs::{LightEntry, SensorEntry};

    fn registry() -> DeviceRegistry {
        DeviceRegistry::from_entries(
            vec![
                LightEntry {
                    id: String::from("a"),
                    label: String::from("L1"),
                    group: Group::WallLeft,
                },
                LightEntry {
                    id: String::from("b"),
                    label: String::from("L2"),
                    group: Group::WallLeft,
                },
            ],
            vec![SensorEntry {
                id: String::from("s1"),
                name: String::from("Front"),
                color: Some(String::from("#111111")),
            }],
        )
        .unwrap()
    }

    fn lamp(id: &str, name: &str, value: u8) -> LampState {
        LampState {
            id: id.to_string(),
            name: name.to_string(),
            value,
            fallback: false,
        }
    }

    fn sensor(id: &str, value: f64, fallback: bool) -> SensorReading {
        SensorReading {
            id: id.to_string(),
            name: id.to_uppercase(),
            value,
            fallback,
        }
    }

    #[test]
    fn test_group_summary() {
        let lights = vec![lamp("a", "L1", 30), lamp("b", "L2", 45), lamp("x", "", 80)];

        let summaries = summarize_groups(&lights, &registry());

        assert_eq!(summaries.len(), 3);
        assert_eq!(summaries[0].group, Group::WallLeft);
        assert_eq!(summaries[0].average, 38);
        assert_eq!(summaries[1].group, Group::WallMiddle);
        assert_eq!(summaries[1].lights[0].label, "x");
        assert!(summaries[1].lights[0].unmapped);
        assert_eq!(summaries[1].average, 80);
        assert_eq!(summaries[2].average, 0);
        assert!(summaries[2].lights.is_empty());
    }

    #[test]
    fn test_history_is_bounded() {
        let registry = registry();
        let mut history = SensorHistoryBuffer::new(3);

        for value in 1..=5 {
            history.record(&[sensor("s1", value as f64, false)], &registry);
        }

        let series = history.series();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].history, vec![3.0, 4.0, 5.0]);
        assert_eq!(series[0].value, 5.0);
        assert_eq!(series[0].color, "#111111");
    }

    #[test]
    fn test_history_skips_placeholders() {
        let registry = registry();
        let mut history = SensorHistoryBuffer::new(20);

        history.record(&[sensor("s1", 100.0, false), sensor("s2", 0.0, true)], &registry);
        history.record(&[sensor("s1", 0.0, true), sensor("s2", 250.0, false)], &registry);

        let series = history.series();
        assert_eq!(series[0].history, vec![100.0]);
        assert_eq!(series[1].id, "s2");
        assert_eq!(series[1].history, vec![250.0]);
        assert_eq!(series[1].color, "#f97316");
    }

    #[test]
    fn test_notification_feed_is_bounded() {
        let mut feed = NotificationFeed::new(2);

        feed.push(NotificationLevel::Info, "one");
        feed.push(NotificationLevel::Warning, "two");
        let last = feed.push(NotificationLevel::Success, "three");

        let entries = feed.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "two");
        assert_eq!(entries[1].id, 3);
        assert_eq!(last.level, NotificationLevel::Success);
    }
}
