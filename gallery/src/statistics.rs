//! Usage statistics over the stored images

use std::collections::HashMap;

use chrono::{Days, NaiveDate};

use crate::media_storage::BlobInfo;

/// Number of calendar days covered by the upload histogram, today included
pub const UPLOAD_HISTORY_DAYS: u64 = 30;

/// Number of uploads on a single UTC calendar day
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCountPerDay {
    /// Calendar day (UTC)
    pub date: NaiveDate,
    /// Images created on that day
    pub count: usize,
}

/// Aggregate usage figures for the statistics page
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticsSnapshot {
    /// Number of stored images
    pub total_images: usize,
    /// Sum of all image sizes in bytes
    pub total_disk_space: u64,
    /// Sum of all like counts
    pub total_likes: u64,
    /// Mean image size in bytes, `0.0` without images
    pub average_image_size: f64,
    /// One entry per day for the last [`UPLOAD_HISTORY_DAYS`] days, oldest first
    pub uploads_per_day: Vec<UploadCountPerDay>,
}

impl StatisticsSnapshot {
    /// Computes the snapshot as seen on `today`
    #[must_use]
    pub fn compute(blobs: &[BlobInfo], likes: &HashMap<String, u64>, today: NaiveDate) -> Self {
        let total_images = blobs.len();
        let total_disk_space: u64 = blobs.iter().map(|blob| blob.size).sum();
        let total_likes: u64 = likes.values().sum();

        #[allow(clippy::cast_precision_loss)]
        let average_image_size = if total_images == 0 {
            0.0
        } else {
            total_disk_space as f64 / total_images as f64
        };

        let mut per_day: HashMap<NaiveDate, usize> = HashMap::new();
        for created_on in blobs.iter().filter_map(|blob| blob.created_on) {
            *per_day.entry(created_on.date_naive()).or_default() += 1;
        }

        let uploads_per_day = (0..UPLOAD_HISTORY_DAYS)
            .rev()
            .filter_map(|offset| today.checked_sub_days(Days::new(offset)))
            .map(|date| UploadCountPerDay {
                date,
                count: per_day.get(&date).copied().unwrap_or(0),
            })
            .collect();

        Self {
            total_images,
            total_disk_space,
            total_likes,
            average_image_size,
            uploads_per_day,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};

    use super::*;

    fn blob(name: &str, size: u64, created_on: Option<DateTime<Utc>>) -> BlobInfo {
        BlobInfo {
            name: name.to_string(),
            size,
            created_on,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[test]
    fn test_snapshot_over_known_images() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 0).unwrap();
        let oldest = Utc.with_ymd_and_hms(2024, 2, 15, 23, 59, 59).unwrap();
        let blobs = vec![
            blob("a.jpg", 100, Some(now)),
            blob("b.jpg", 200, Some(now)),
            blob("c.jpg", 300, Some(oldest)),
        ];
        let likes = HashMap::from([("a.jpg".to_string(), 4), ("c.jpg".to_string(), 1)]);

        let snapshot = StatisticsSnapshot::compute(&blobs, &likes, today());

        assert_eq!(snapshot.total_images, 3);
        assert_eq!(snapshot.total_disk_space, 600);
        assert_eq!(snapshot.total_likes, 5);
        assert!((snapshot.average_image_size - 200.0).abs() < f64::EPSILON);

        let days = &snapshot.uploads_per_day;
        assert_eq!(days.len(), 30);
        assert_eq!(days.iter().map(|day| day.count).sum::<usize>(), 3);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2024, 2, 15).unwrap());
        assert_eq!(days[0].count, 1);
        assert_eq!(days[29].date, today());
        assert_eq!(days[29].count, 2);
        assert!(days[1..29].iter().all(|day| day.count == 0));
    }

    #[test]
    fn test_histogram_is_ordered_oldest_to_newest() {
        let snapshot = StatisticsSnapshot::compute(&[], &HashMap::new(), today());

        assert!(snapshot
            .uploads_per_day
            .windows(2)
            .all(|pair| pair[0].date < pair[1].date));
    }

    #[test]
    fn test_empty_gallery() {
        let snapshot = StatisticsSnapshot::compute(&[], &HashMap::new(), today());

        assert_eq!(snapshot.total_images, 0);
        assert_eq!(snapshot.total_disk_space, 0);
        assert_eq!(snapshot.total_likes, 0);
        assert!(snapshot.average_image_size.abs() < f64::EPSILON);
        assert_eq!(snapshot.uploads_per_day.len(), 30);
        assert!(snapshot.uploads_per_day.iter().all(|day| day.count == 0));
    }

    #[test]
    fn test_old_and_undated_images_count_only_towards_totals() {
        let too_old = Utc.with_ymd_and_hms(2024, 2, 14, 12, 0, 0).unwrap();
        let blobs = vec![blob("old.jpg", 50, Some(too_old)), blob("undated.jpg", 150, None)];

        let snapshot = StatisticsSnapshot::compute(&blobs, &HashMap::new(), today());

        assert_eq!(snapshot.total_images, 2);
        assert_eq!(snapshot.total_disk_space, 200);
        assert!(snapshot.uploads_per_day.iter().all(|day| day.count == 0));
    }
}
