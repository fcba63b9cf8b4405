//! Data-grounded chat with a persisted history

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, warn};

use super::{inline_error, ChatTurn, TextGenerator};
use crate::{
    core::{remove_file_if_exists, try_read_to_string, write_string},
    scoring::{row_total, Rubric, ScoreSheet},
    Result,
};

/// Rows of the score table shared with the model.
pub const CHAT_DATA_ROWS: usize = 300;

const INSTRUCTION: &str = "Bạn là trợ lý ảo của Ban Giám Hiệu, giúp giáo viên phân tích dữ liệu \
học tập và nề nếp học sinh. Hãy đọc dữ liệu bảng điểm sau đây và ghi nhớ nó để trả lời các câu \
hỏi tiếp theo dựa trên dữ liệu thật của trường.";

/// The first `limit` rows as JSON objects, with the total as a number.
pub fn score_records(sheet: &ScoreSheet, rubric: &Rubric, limit: usize) -> Vec<Map<String, Value>> {
    sheet
        .table
        .to_records()
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(row, mut record)| {
            let total = row_total(&sheet.table, row, &sheet.columns, rubric);
            record.insert(sheet.columns.total.clone(), Value::from(total));
            record
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatHistory {
    turns: Vec<ChatTurn>,
}

impl ChatHistory {
    /// A fresh conversation primed with the instruction and the score data.
    pub fn seeded(sheet: &ScoreSheet, rubric: &Rubric) -> Result<Self> {
        let records = score_records(sheet, rubric, CHAT_DATA_ROWS);
        let data = serde_json::to_string(&records)?;
        Ok(Self {
            turns: vec![
                ChatTurn::user(INSTRUCTION).hidden(),
                ChatTurn::user(format!(
                    "Dưới đây là dữ liệu bảng điểm (JSON):\n{}\nHãy ghi nhớ và sử dụng khi trả lời các câu hỏi.",
                    data
                ))
                .hidden(),
            ],
        })
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    /// Turns meant for display: everything except the seed.
    pub fn visible_turns(&self) -> impl Iterator<Item = &ChatTurn> {
        self.turns.iter().filter(|t| !t.hidden)
    }

    /// Ask a question and record the reply. A failed generation is recorded
    /// and returned as an inline error message.
    pub async fn ask<G: TextGenerator>(&mut self, generator: &G, question: &str) -> String {
        self.turns.push(ChatTurn::user(question.trim()));

        let reply = match generator.generate(&self.turns).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "chat generation failed");
                inline_error(&e)
            }
        };
        self.turns.push(ChatTurn::model(reply.clone()));
        reply
    }

    /// Stored history, or `None` when there is none yet.
    pub fn load_from(path: &Path) -> Result<Option<Self>> {
        match try_read_to_string(path) {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        write_string(path, &serde_json::to_string(self)?)?;
        debug!(path = %path.display(), turns = self.turns.len(), "saved chat history");
        Ok(())
    }

    pub fn discard(path: &Path) -> Result<bool> {
        Ok(remove_file_if_exists(path)?)
    }
}
