//! HTML pages rendered with askama templates

use askama::Template;

use crate::statistics::StatisticsSnapshot;

/// Renders a page to a string
///
/// # Errors
///
/// Returns `askama::Error` if the template fails to render
pub fn render<T: Template>(page: &T) -> askama::Result<String> {
    page.render()
}

/// An image with its like count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageView {
    /// Public URI of the image
    pub uri: String,
    /// Image id derived from the URI
    pub image_id: String,
    /// Current like count
    pub likes: u64,
}

/// Gallery listing
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexPage {
    /// Images in listing order
    pub images: Vec<ImageView>,
}

/// One bar of the uploads histogram
#[derive(Debug, Clone)]
pub struct UploadBar {
    /// `YYYY-MM-DD`
    pub date: String,
    /// Uploads on that day
    pub count: usize,
    /// Bar height relative to the busiest day
    pub height_percent: usize,
}

/// Usage statistics
#[derive(Template)]
#[template(path = "statistics.html")]
pub struct StatisticsPage {
    /// Number of stored images
    pub total_images: usize,
    /// Disk usage, human readable
    pub total_disk_space: String,
    /// Sum of all like counts
    pub total_likes: u64,
    /// Mean image size, human readable
    pub average_image_size: String,
    /// Uploads per day, oldest first
    pub uploads_per_day: Vec<UploadBar>,
}

impl From<&StatisticsSnapshot> for StatisticsPage {
    fn from(snapshot: &StatisticsSnapshot) -> Self {
        let busiest = snapshot
            .uploads_per_day
            .iter()
            .map(|day| day.count)
            .max()
            .unwrap_or(0)
            .max(1);
        #[allow(clippy::cast_precision_loss)]
        let total_disk_space = snapshot.total_disk_space as f64;

        Self {
            total_images: snapshot.total_images,
            total_disk_space: format_bytes(total_disk_space),
            total_likes: snapshot.total_likes,
            average_image_size: format_bytes(snapshot.average_image_size),
            uploads_per_day: snapshot
                .uploads_per_day
                .iter()
                .map(|day| UploadBar {
                    date: day.date.format("%Y-%m-%d").to_string(),
                    count: day.count,
                    height_percent: day.count * 100 / busiest,
                })
                .collect(),
        }
    }
}

/// Privacy notice
#[derive(Template)]
#[template(path = "privacy.html")]
pub struct PrivacyPage {}

/// Error page, used both for failed requests and the standalone error route
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorPage {
    /// Id of the request that failed
    pub request_id: Option<String>,
    /// Error message
    pub message: Option<String>,
    /// Error followed by its causes
    pub trace: Option<String>,
}

/// Formats a byte count with a binary unit
#[must_use]
pub fn format_bytes(bytes: f64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    let mut value = bytes;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{value:.0} {}", UNITS[unit])
    } else {
        format!("{value:.2} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0.0), "0 B");
        assert_eq!(format_bytes(200.0), "200 B");
        assert_eq!(format_bytes(1536.0), "1.50 KB");
        assert_eq!(format_bytes(5.0 * 1024.0 * 1024.0), "5.00 MB");
    }

    #[test]
    fn test_index_page_lists_images() {
        let page = IndexPage {
            images: vec![ImageView {
                uri: "http://images.test/gallery/cat.png".to_string(),
                image_id: "cat.png".to_string(),
                likes: 7,
            }],
        };

        let html = render(&page).unwrap();

        assert!(html.contains(r#"data-image-id="cat.png""#));
        assert!(html.contains(r#"data-likes="7""#));
    }

    #[test]
    fn test_index_page_without_images() {
        let html = render(&IndexPage { images: vec![] }).unwrap();

        assert!(html.contains("No images yet"));
        assert!(!html.contains("data-image-id"));
    }

    #[test]
    fn test_statistics_page_scales_bars_to_busiest_day() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let mut snapshot = StatisticsSnapshot::compute(&[], &HashMap::new(), today);
        snapshot.uploads_per_day[28].count = 2;
        snapshot.uploads_per_day[29].count = 4;

        let page = StatisticsPage::from(&snapshot);

        assert_eq!(page.uploads_per_day.len(), 30);
        assert_eq!(page.uploads_per_day[28].height_percent, 50);
        assert_eq!(page.uploads_per_day[29].height_percent, 100);
        assert_eq!(page.uploads_per_day[29].date, "2024-03-15");
        assert_eq!(page.uploads_per_day[0].height_percent, 0);
    }
}
