//! Center-wide weekly summary

use std::collections::BTreeSet;
use tracing::warn;

use super::{inline_error, ChatTurn, TextGenerator};
use crate::scoring::{Rubric, ScoreSheet};

/// Returned without calling the model when there is nothing to summarize.
pub const NO_DATA_MESSAGE: &str = "⚠️ Không có dữ liệu để phân tích.";

/// Aggregates the summary prompt is built from.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreStats {
    pub average: f64,
    pub min: i64,
    pub max: i64,
    pub class_count: usize,
}

impl ScoreStats {
    /// `None` when the sheet has no rows.
    pub fn from_sheet(sheet: &ScoreSheet, rubric: &Rubric) -> Option<Self> {
        let rows = sheet.score_rows(rubric);
        let totals: Vec<i64> = rows.iter().map(|r| r.total).collect();
        let min = *totals.iter().min()?;
        let max = *totals.iter().max()?;
        let average = totals.iter().map(|t| *t as f64).sum::<f64>() / totals.len() as f64;
        let class_count = rows
            .iter()
            .map(|r| r.class_name.as_str())
            .filter(|c| !c.is_empty())
            .collect::<BTreeSet<_>>()
            .len();

        Some(Self {
            average,
            min,
            max,
            class_count,
        })
    }

    pub fn prompt(&self) -> String {
        format!(
            "Bạn là trợ lý ảo của Ban Giám Đốc Trung tâm, giúp tổng hợp báo cáo học tập \
và nề nếp của tất cả các lớp trong tuần.

Số liệu tổng hợp:
- Điểm trung bình toàn Trung tâm: {:.1}
- Điểm cao nhất: {}
- Điểm thấp nhất: {}
- Tổng số lớp được ghi nhận: {}

Viết một đoạn nhận xét 8-10 câu bằng tiếng Việt gồm: lời chào và tổng quan tuần học; \
đánh giá tinh thần học tập, kỷ luật và phong trào, nêu điểm sáng và hạn chế; \
lời động viên và định hướng tuần tới.
Giọng văn chuyên nghiệp, khách quan, ấm áp. Không xưng \"tôi\", chỉ dùng \
\"nhà Trung tâm\", \"Ban Giám Đốc\" hoặc \"thầy cô\".",
            self.average, self.max, self.min, self.class_count
        )
    }
}

/// Summarize the sheet. Generation failures come back as an inline message.
pub async fn summarize<G: TextGenerator>(
    generator: &G,
    sheet: &ScoreSheet,
    rubric: &Rubric,
) -> String {
    let Some(stats) = ScoreStats::from_sheet(sheet, rubric) else {
        return NO_DATA_MESSAGE.to_string();
    };

    match generator.generate(&[ChatTurn::user(stats.prompt())]).await {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "summary generation failed");
            inline_error(&e)
        }
    }
}
