//! The fixed scoring rubric: weighted violations and merits.

use serde::Serialize;
use std::collections::BTreeMap;

/// One scoring item. `aliases` are normalized header tokens used to find the
/// item's column in a sheet whose headers have drifted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RubricItem {
    pub key: String,
    pub label: String,
    pub weight: i64,
    pub aliases: Vec<String>,
}

impl RubricItem {
    pub fn new(key: &str, label: &str, weight: i64, aliases: &[&str]) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            weight,
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// (key, label, weight, aliases)
type ItemSpec = (&'static str, &'static str, i64, &'static [&'static str]);

const STANDARD_ITEMS: &[ItemSpec] = &[
    ("poor_hygiene", "Vệ sinh chưa tốt", -5, &["ve sinh chua tot"]),
    (
        "gambling_smoking_drinking",
        "Cờ bạc, hút thuốc, uống rượu, bia",
        -20,
        &["co bac", "hut thuoc", "ruou bia"],
    ),
    ("skipping_class", "Cúp tiết, SHDC, SHL", -5, &["cup tiet"]),
    (
        "no_helmet",
        "Không đội nón bảo hiểm hoặc sai quy cách",
        -5,
        &["non bao hiem", "sai quy cach"],
    ),
    (
        "improper_haircut",
        "Tóc dài hoặc cắt kiểu không phù hợp",
        -2,
        &["toc dai", "cat kieu"],
    ),
    (
        "legal_violation",
        "Vi phạm pháp luật ( ATGT, ANTT,…..)",
        -20,
        &["vi pham phap luat"],
    ),
    ("exam_violation", "Vi phạm kiểm tra", -5, &["vi pham kiem tra"]),
    ("property_damage", "Phá hoại tài sản", -20, &["pha hoai tai san"]),
    ("disrespect_fighting", "Vô lễ, đánh nhau", -20, &["vo le", "danh nhau"]),
    ("phone_in_class", "Sử dụng điện thoại trong giờ học", -3, &["dien thoai"]),
    ("unexcused_absence", "Nghỉ học không phép", -4, &["nghi hoc khong phep"]),
    ("study_violation", "Vi phạm học tập", -3, &["hoc tap"]),
    ("disorder", "Mất trật tự", -3, &["mat trat tu"]),
    (
        "dyed_hair_makeup",
        "Nhuộm tóc, son môi, sơn móng",
        -3,
        &["nhuom toc", "son moi"],
    ),
    ("profanity", "Nói tục", -3, &["noi tuc"]),
    ("late_arrival", "Đi trễ", -2, &["di tre"]),
    (
        "no_uniform",
        "Không đồng phục, phù hiệu, huy hiệu",
        -2,
        &["dong phuc", "phu hieu"],
    ),
    (
        "leaving_by_staff_gate",
        "Đi cổng giáo viên, bỏ ra khỏi Trung tâm",
        -2,
        &["di cong giao vien"],
    ),
    (
        "riding_in_yard",
        "Chạy xe trong sân, để xe sai quy định",
        -2,
        &["chay xe", "de xe"],
    ),
    ("flip_flops", "Mang dép lào", -2, &["dep lao"]),
    ("excused_absence", "Nghỉ học có phép", -1, &["nghi hoc co phep"]),
    ("grade_8", "Điểm 8", 3, &["diem 8"]),
    ("grade_9", "Điểm 9", 4, &["diem 9"]),
    ("grade_10", "Điểm 10", 5, &["diem 10"]),
    (
        "good_lesson",
        "Tiết học tốt  (đạt/tổng đăng ký)",
        50,
        &["tiet hoc tot"],
    ),
    (
        "skipped_activities",
        "Không tham gia các hoạt động phong trào (Mỗi tuần một câu chuyện hay...)",
        -20,
        &["khong tham gia phong trao"],
    ),
    ("bonus_points", "Điểm cộng", 1, &["diem cong"]),
    ("reward_points", "Điểm thưởng", 1, &["diem thuong"]),
];

/// Ordered catalog of scoring items. Order is the canonical column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rubric {
    items: Vec<RubricItem>,
}

impl Rubric {
    pub fn new(items: Vec<RubricItem>) -> Self {
        Self { items }
    }

    /// The center's standard catalog.
    pub fn standard() -> Self {
        Self::new(
            STANDARD_ITEMS
                .iter()
                .map(|(key, label, weight, aliases)| RubricItem::new(key, label, *weight, aliases))
                .collect(),
        )
    }

    pub fn items(&self) -> &[RubricItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&RubricItem> {
        self.items.iter().find(|item| item.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.key.as_str())
    }

    /// Weighted sum over every rubric item; keys missing from `counts` count as 0
    /// and keys outside the rubric are ignored.
    pub fn total(&self, counts: &BTreeMap<String, i64>) -> i64 {
        self.items
            .iter()
            .map(|item| {
                counts
                    .get(&item.key)
                    .copied()
                    .unwrap_or(0)
                    .saturating_mul(item.weight)
            })
            .fold(0i64, i64::saturating_add)
    }
}

impl Default for Rubric {
    fn default() -> Self {
        Self::standard()
    }
}
